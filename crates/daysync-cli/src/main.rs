use std::path::PathBuf;

use clap::Parser;
use daysync_core::{pipeline, AppConfig, ConsoleAnswers, CredentialManager, GoogleCalendar};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Publishes day templates from a JSON folder to Google Calendar.
///
/// Configured entirely through the environment (a `.env` file is read
/// first when present): JSON_FOLDER, TOKEN_PATH, CREDENTIALS_PATH,
/// ANALYTICS_CONFIG_PATH, and optionally DAYSYNC_CALENDAR_ID,
/// DAYSYNC_TIME_ZONE and DAYSYNC_ENV_FILE.
#[derive(Parser)]
#[command(name = "daysync", version, about)]
struct Cli {}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn load_dotenv() -> Result<(), Box<dyn std::error::Error>> {
    match std::env::var_os("DAYSYNC_ENV_FILE") {
        Some(path) => {
            let path = PathBuf::from(path);
            dotenvy::from_path(&path)
                .map_err(|e| format!("failed to load env file {}: {e}", path.display()))?;
        }
        None => {
            let local = PathBuf::from(".env");
            if local.exists() {
                dotenvy::from_path(&local)?;
            }
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    load_dotenv()?;
    let config = AppConfig::from_env()?;

    info!("JSON_FOLDER: {}", config.json_folder.display());
    info!("TOKEN_PATH: {}", config.token_path.display());
    info!("CREDENTIALS_PATH: {}", config.credentials_path.display());
    info!("ANALYTICS_CONFIG_PATH: {}", config.analytics_config_path.display());

    let credentials = CredentialManager::from_config(&config).acquire().await?;
    let calendar = GoogleCalendar::new(&credentials);

    if let Some(summary) = pipeline::run(&config, &calendar, &mut ConsoleAnswers).await? {
        print!("{}", summary.report);
    }
    Ok(())
}

fn main() {
    let _cli = Cli::parse();
    init_tracing();

    let result = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(run()),
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
