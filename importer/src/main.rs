//! Komodo Import - Entry Point
//!
//! Scans a host's workload directories once, prints the generated Stack
//! resources as a Resource Sync file and exits.

use std::env;
use std::process::ExitCode;

use komodo_import::app::run::run;
use komodo_import::app::settings::Settings;
use komodo_import::logs::{init_logging, LogLevel, LogOptions};
use komodo_import::utils::version_info;

use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let version = version_info();
    if env::args().skip(1).any(|arg| arg == "--version") {
        match serde_json::to_string_pretty(&version) {
            Ok(v) => println!("{v}"),
            Err(e) => eprintln!("Failed to print version: {e}"),
        }
        return ExitCode::SUCCESS;
    }

    // a missing .env file is normal
    let dotenv_result = dotenvy::dotenv();

    let settings = Settings::from_env();
    let log_options = settings.log_options().unwrap_or_else(|e| {
        eprintln!("{e}, falling back to default log options");
        LogOptions::default()
    });
    let debug_mode = log_options.log_level == LogLevel::Debug;
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }

    if let Err(e) = dotenv_result {
        if !e.not_found() {
            warn!("Failed to load .env file: {}", e);
        }
    }

    info!("Debug Mode: {}", if debug_mode { "YES" } else { "NO" });
    info!(
        "Version: {} (commit {}, built {})",
        version.version, version.git_hash, version.build_time
    );

    let options = match settings.into_options() {
        Ok(options) => options,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(options).await {
        Ok(summary) => {
            if summary.failed > 0 {
                warn!("{} folders could not be turned into Stacks", summary.failed);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Exited with uncaught error: {}", e);
            ExitCode::FAILURE
        }
    }
}
