use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use vavilon_core::LoggingConfig;

const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const DEFAULT_LOG_DIR: &str = "./logs";
const DEFAULT_FILE_PREFIX: &str = "vavilon.log";

/// Console and daily rolling file output, each switched on separately.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// The date is appended, e.g. `vavilon.log.2024-05-01`.
    file_prefix: String,
    log_dir: PathBuf,
    time_format: String,
    level: String,
    console: bool,
    file: bool,
    ansi: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            level: "INFO".to_string(),
            console: true,
            file: false,
            ansi: true,
        }
    }
}

impl From<&LoggingConfig> for LoggerConfig {
    fn from(section: &LoggingConfig) -> Self {
        Self::new()
            .level(&section.level)
            .enable_console(section.console)
            .enable_file(section.file)
            .log_dir(&section.log_dir)
            .file_prefix(&section.file_prefix)
            .time_format(&section.time_format)
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    /// See `chrono::format::strftime`.
    pub fn time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    /// Also accepts directives such as `vavilon_core=debug`.
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn enable_console(mut self, enable: bool) -> Self {
        self.console = enable;
        self
    }

    pub fn enable_file(mut self, enable: bool) -> Self {
        self.file = enable;
        self
    }

    pub fn enable_ansi(mut self, enable: bool) -> Self {
        self.ansi = enable;
        self
    }

    /// `RUST_LOG` first, then `level`, then INFO.
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(self.level.to_lowercase()))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }

    /// Installs the global subscriber. Returns `None` without changing
    /// anything if one is already set. Hold the returned guard until exit or
    /// buffered file output is lost.
    pub fn init(self) -> Option<WorkerGuard> {
        let console_layer = self.build_console_layer();
        let (file_layer, guard) = self.build_file_layer();

        Registry::default()
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .ok()?;

        tracing::debug!(
            console = self.console,
            file = self.file,
            log_dir = %self.log_dir.display(),
            "Logger initialized"
        );
        guard
    }

    fn build_console_layer<S>(&self) -> Option<impl Layer<S>>
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    {
        self.console.then(|| {
            fmt::layer()
                .with_timer(ChronoLocal::new(self.time_format.clone()))
                .with_ansi(self.ansi)
                .with_writer(std::io::stdout)
                .with_filter(self.filter())
        })
    }

    fn build_file_layer<S>(&self) -> (Option<impl Layer<S>>, Option<WorkerGuard>)
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    {
        if !self.file {
            return (None, None);
        }

        let file_appender = tracing_appender::rolling::daily(&self.log_dir, &self.file_prefix);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let layer = fmt::layer()
            .with_timer(ChronoLocal::new(self.time_format.clone()))
            .with_ansi(false)
            .with_writer(non_blocking)
            .with_filter(self.filter());

        (Some(layer), Some(guard))
    }
}
