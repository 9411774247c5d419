use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;

use matchpulse::core::web_server::start_web_server;
use matchpulse::core::{init_logger, Config};
use matchpulse::storage::create_pool;
use matchpulse::telegram::{HandlerDeps, TelegramGateway};

/// Main entry point for the bot.
///
/// # Errors
/// Returns an error if initialization fails (configuration, logging,
/// database, gateway construction).
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();

    let config = Config::from_env()?;
    init_logger(&config.log_file_path)?;

    // Log panics from request tasks instead of losing them
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    let db = Arc::new(create_pool(&config.database_path)?);
    log::info!("Database ready at {}", config.database_path);

    let config = Arc::new(config);
    let gateway = TelegramGateway::new(&config)?;
    let deps = HandlerDeps {
        db,
        gateway,
        config: Arc::clone(&config),
    };

    start_web_server(config.port, deps).await?;

    Ok(())
}
