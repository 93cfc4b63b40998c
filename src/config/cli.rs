use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parent_dirs_and_reads_back() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_string_lossy().into_owned());

        storage.write_file("reports/output - ads.csv", b"2021/01/05,USA,1,0\n").unwrap();

        assert_eq!(
            storage.read_file("reports/output - ads.csv").unwrap(),
            b"2021/01/05,USA,1,0\n"
        );
    }

    #[test]
    fn test_absolute_paths_ignore_base() {
        let temp_dir = TempDir::new().unwrap();
        let absolute = temp_dir.path().join("ads.csv");
        fs::write(&absolute, b"x").unwrap();

        let storage = LocalStorage::new("does-not-exist".to_string());
        assert_eq!(storage.read_file(&absolute.to_string_lossy()).unwrap(), b"x");
    }

    #[test]
    fn test_read_missing_file() {
        let storage = LocalStorage::new(".".to_string());
        assert!(storage.read_file("no such file.csv").is_err());
    }
}
