use anyhow::Context;
use clap::Parser;
use ctr_report::utils::{logger, validation::Validate};
use ctr_report::{generate_report, CliConfig, EtlError, TomlConfig};
use std::io::{self, BufRead, Write};

fn prompt_for_input() -> anyhow::Result<String> {
    println!("Please enter name of your csv file followed by '.csv'.");
    println!("It should be placed in the current working directory.");
    io::stdout().flush().context("failed to flush prompt")?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read the file name from stdin")?;
    Ok(line.trim().to_string())
}

fn exit_with(e: &EtlError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("{}", e.user_friendly_message());
    std::process::exit(e.severity().exit_code());
}

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let file_config = match &cli.config {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => None,
    };

    let verbose = cli.verbose || file_config.as_ref().is_some_and(|c| c.logging.verbose);
    let json_logs = cli.json_logs || file_config.as_ref().is_some_and(|c| c.logging.json);
    if json_logs {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    if let Some(config) = &file_config {
        if let Err(e) = config.validate() {
            exit_with(&e);
        }
    }

    let input = match cli.input.clone() {
        Some(input) => input,
        None => prompt_for_input()?,
    };

    let settings = cli.into_settings(input, file_config.as_ref());
    tracing::debug!("Settings: {:?}", settings);
    if let Err(e) = settings.validate() {
        exit_with(&e);
    }

    let reference = match settings.load_reference() {
        Ok(reference) => reference,
        Err(e) => exit_with(&e),
    };

    match generate_report(&settings, reference) {
        Ok(output_path) => {
            println!("Successfully created '{}' file.", output_path);
            Ok(())
        }
        Err(e) => exit_with(&e),
    }
}
