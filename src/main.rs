mod config;
mod fetch;
mod ingest;
mod model;
mod storage;
mod validate;

use std::io::Write;
use std::process;

use config::Config;
use fetch::{Fetcher, HttpTransport};
use storage::Storage;

fn main() {
    // The project's .env is the source of truth, even over the shell environment.
    let dotenv = dotenvy::dotenv_override();
    init_logging();

    match dotenv {
        Ok(path) => log::info!("Loaded environment variables from {}", path.display()),
        Err(e) if e.not_found() => log::debug!("No .env file found; using process environment."),
        Err(e) => log::warn!("Ignoring unreadable .env file: {e}"),
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            process::exit(1);
        }
    };
    log::info!("All required environment variables are loaded and validated.");

    log::info!("Application starting...");
    let storage = Storage::new(&config.database_path);
    match HttpTransport::new(&config.api_url) {
        Ok(transport) => {
            ingest::run_logged(&storage, &Fetcher::new(transport));
        }
        Err(e) => log::error!(
            "An unhandled error occurred during the ingestion process: {}",
            ingest::error_chain(&e)
        ),
    }
    log::info!("Application finished.");
}

/// Logs to stdout as `<timestamp> - [<LEVEL>] - <module> - <message>`.
///
/// Defaults to `info`; `RUST_LOG` overrides.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - [{}] - {} - {}",
                buf.timestamp_millis(),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
