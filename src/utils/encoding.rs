use crate::utils::error::{EtlError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Which decoder produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf16,
}

/// Decode raw file bytes, trying UTF-8 first and UTF-16 second.
///
/// UTF-16 input without a byte order mark is read as little-endian.
pub fn decode_input(bytes: &[u8], path: &str) -> Result<(String, TextEncoding)> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(body) {
        Ok(text) => Ok((text.to_string(), TextEncoding::Utf8)),
        Err(e) => {
            tracing::debug!("'{}' is not valid UTF-8 ({}), retrying as UTF-16", path, e);
            decode_utf16(bytes, path).map(|text| (text, TextEncoding::Utf16))
        }
    }
}

fn decode_utf16(bytes: &[u8], path: &str) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(EtlError::DecodeError {
            path: path.to_string(),
        });
    }

    // BOM sniffing switches to big-endian when the file asks for it.
    let (text, _, had_errors) = encoding_rs::UTF_16LE.decode(bytes);
    if had_errors {
        return Err(EtlError::DecodeError {
            path: path.to_string(),
        });
    }
    Ok(text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le_with_bom(text: &str) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_utf8_passes_through() {
        let (text, encoding) = decode_input("2021-01-05,Fāryāb,10,1%\n".as_bytes(), "a.csv").unwrap();
        assert_eq!(encoding, TextEncoding::Utf8);
        assert!(text.contains("Fāryāb"));
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"2021-01-05,Texas,10,1%\n");
        let (text, _) = decode_input(&bytes, "a.csv").unwrap();
        assert!(text.starts_with("2021"));
    }

    #[test]
    fn test_utf16_fallback() {
        let bytes = utf16le_with_bom("2021-01-05,Bayern,10,1%\n");
        let (text, encoding) = decode_input(&bytes, "a.csv").unwrap();
        assert_eq!(encoding, TextEncoding::Utf16);
        assert_eq!(text, "2021-01-05,Bayern,10,1%\n");
    }

    #[test]
    fn test_utf16_big_endian_bom() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "2021-01-05,Ohio,1,1%".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        let (text, _) = decode_input(&bytes, "a.csv").unwrap();
        assert_eq!(text, "2021-01-05,Ohio,1,1%");
    }

    #[test]
    fn test_undecodable_bytes() {
        let err = decode_input(&[0xFF, 0xFE, 0x41], "bad.csv").unwrap_err();
        assert!(matches!(err, EtlError::DecodeError { .. }));
    }
}
