use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use medialib_core::config::{AppConfig, LoggingConfig};

/// Install the global subscriber: stderr always, plus a daily log file when
/// enabled. `RUST_LOG` wins over the configured filter.
///
/// Keep the returned guard alive until exit or buffered file lines are lost.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>, String> {
    let filter = || {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.filter))
            .unwrap_or_else(|_| EnvFilter::new("medialib=info"))
    };

    let stderr = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter());

    let (file, guard) = if config.file {
        let dir = AppConfig::log_dir();
        std::fs::create_dir_all(&dir)
            .map_err(|e| format!("cannot create log dir {}: {e}", dir.display()))?;
        let appender = tracing_appender::rolling::daily(&dir, "medialib.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(filter());
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(stderr)
        .with(file)
        .try_init()
        .map_err(|e| e.to_string())?;

    Ok(guard)
}
