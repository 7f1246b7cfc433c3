//! Per-session structured logging: one `tracing::Dispatch` per `Session`
//! rather than a process-wide `static` subscriber, so that multiple
//! sessions in the same process never collide on a shared log sink.
//! Layers (console + rolling file) are composed through
//! `tracing_subscriber::registry()`; the `WorkerGuard` for the file
//! layer lives on `Session` rather than behind a global `OnceLock`.

use tracing::Dispatch;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::Layer;

use diskforge_config::{LogLevel, LoggingConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn make_layer<W>(writer: W, json_format: bool) -> BoxedLayer
where
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    if json_format {
        Box::new(tracing_subscriber::fmt::layer().with_writer(writer).json())
    } else {
        Box::new(tracing_subscriber::fmt::layer().with_writer(writer))
    }
}

fn level_filter(level: &LogLevel) -> LevelFilter {
    match level {
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warning => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Critical => LevelFilter::ERROR,
    }
}

/// Build a dispatch scoped to one session. `session_short_id` names the
/// session's log file when file logging is enabled. Returns the
/// `WorkerGuard` the caller must hold for as long as file logging should
/// flush — dropping it stops the background writer thread.
pub fn build_dispatch(config: &LoggingConfig, session_short_id: &str) -> (Dispatch, Option<WorkerGuard>) {
    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guard = None;

    if config.console_enabled {
        layers.push(make_layer(std::io::stdout, config.json_format));
    }

    if config.file_enabled {
        if std::fs::create_dir_all(&config.log_directory).is_ok() {
            let file_name = format!("session_{session_short_id}.log");
            let appender = tracing_appender::rolling::never(&config.log_directory, file_name);
            let (writer, worker_guard) = tracing_appender::non_blocking(appender);
            layers.push(make_layer(writer, config.json_format));
            guard = Some(worker_guard);
        }
    }

    let subscriber = Registry::default().with(level_filter(&config.level)).with(layers);
    (Dispatch::new(subscriber), guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_dispatch_with_console_only() {
        let config = LoggingConfig {
            file_enabled: false,
            console_enabled: true,
            ..LoggingConfig::default()
        };
        let (_dispatch, guard) = build_dispatch(&config, "abcd1234");
        assert!(guard.is_none());
    }

    #[test]
    fn file_logging_yields_a_worker_guard() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            file_enabled: true,
            console_enabled: false,
            log_directory: dir.path().to_path_buf(),
            ..LoggingConfig::default()
        };
        let (_dispatch, guard) = build_dispatch(&config, "abcd1234");
        assert!(guard.is_some());
    }
}
