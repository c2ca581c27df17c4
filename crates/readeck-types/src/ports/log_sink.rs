/// Severity recorded alongside each extraction log line (spec.md §4.D:
/// "if at ERROR level or above, also appended to `Extractor.Errors`").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Caller-supplied logging sink. `readeck-engine`'s `ProcessMessage` logger
/// forwards every record both into `Extractor::logs`/`errors` and through
/// this trait, so a host process can mirror extraction logs into its own
/// `tracing` subscriber without the engine depending on a concrete logger.
///
/// Implementations must serialize concurrent calls: the Archiver's
/// subresource fan-out (spec.md §5) logs from multiple tasks at once.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, step: &str, message: &str);
}

/// A `LogSink` that forwards to `tracing`, matching the teacher's default
/// choice of `tracing`/`tracing-subscriber` for structured logging.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, level: LogLevel, step: &str, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(step, "{message}"),
            LogLevel::Info => tracing::info!(step, "{message}"),
            LogLevel::Warn => tracing::warn!(step, "{message}"),
            LogLevel::Error => tracing::error!(step, "{message}"),
        }
    }
}
