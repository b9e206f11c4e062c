//! coingrid - live crypto portfolio grid.
//!
//! Polls Binance for every configured row, recomputes profit and net value,
//! and keeps the in-memory grid current until Ctrl-C.

use anyhow::Context;
use coingrid::config::{self, LoggingConfig};
use coingrid::{App, Config};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load_or_default().context("failed to load configuration")?;

    // Initialize logging; the guard flushes the file writer on exit
    let _guard = init_logging(&config.logging)?;

    // Run the application
    let mut app = App::new(config).context("failed to start coingrid")?;
    app.run().await?;

    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.filter))
        .context("invalid log filter")?;

    let (file_layer, guard) = if logging.file {
        let dir = config::log_dir()?;
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
        let appender = tracing_appender::rolling::daily(dir, "coingrid.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(file_layer)
        .init();

    Ok(guard)
}
