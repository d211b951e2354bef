use clap::ValueEnum;
use tracing::level_filters::LevelFilter;

/// Rendering of diagnostics written to stderr.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One human-readable line per event.
    Text,
    /// Text without timestamps or targets.
    Compact,
    /// One JSON object per event.
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Install the stderr subscriber for the codec events. Stdout stays reserved
/// for converted documents.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let filter = LevelFilter::from(level);
    if filter == LevelFilter::OFF {
        return;
    }

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(filter)
        .with_ansi(false);

    // A subscriber may already be installed when running under a test harness.
    let _ = match format {
        LogFormat::Text => builder.with_target(true).try_init(),
        LogFormat::Compact => builder.without_time().with_target(false).compact().try_init(),
        LogFormat::Json => builder.json().with_current_span(false).try_init(),
    };
}
