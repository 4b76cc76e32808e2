use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use spdlog::sink::{RotatingFileSink, RotationPolicy, StdStream, StdStreamSink};
use spdlog::{Level, LevelFilter, Logger, LoggerBuilder};

use crate::config::{Config, LogLevel};

impl From<LogLevel> for Level {
    fn from(value: LogLevel) -> Self {
        use LogLevel::*;
        match value {
            Critical => Level::Critical,
            Error => Level::Error,
            Warn => Level::Warn,
            Info => Level::Info,
            Debug => Level::Debug,
            Trace => Level::Trace,
        }
    }
}

fn console_sink(stream: StdStream, filter: LevelFilter) -> spdlog::Result<Arc<StdStreamSink>> {
    Ok(Arc::new(StdStreamSink::builder()
        .std_stream(stream)
        .level_filter(filter)
        .build()?))
}

/// Progress goes to stdout, warnings and errors to stderr.
fn add_console_sinks(builder: &mut LoggerBuilder) -> spdlog::Result<()> {
    builder
        .sink(console_sink(StdStream::Stdout, LevelFilter::MoreVerbose(Level::Warn))?)
        .sink(console_sink(StdStream::Stderr, LevelFilter::MoreSevereEqual(Level::Warn))?);
    Ok(())
}

/// Location of the daily log file when `[log]` is present without a `location`.
pub fn default_log_location() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("folio").join("log").join("folio.log"))
}

/// Effective level: the `debug` flag wins over `[log].level`, Info otherwise.
pub fn effective_level(config: &Config) -> Level {
    if config.site.debug {
        return Level::Debug;
    }
    match config.log {
        Some(ref log) => log.level.into(),
        None => Level::Info,
    }
}

pub fn configure_logger(config: &Config) -> spdlog::Result<()> {
    let mut builder = Logger::builder();
    let mut console = true;

    if let Some(ref log) = config.log {
        console = log.log_to_console;
        if let Some(location) = log.location.clone().or_else(default_log_location) {
            let daily_sink = Arc::new(RotatingFileSink::builder()
                .base_path(location)
                .rotation_policy(RotationPolicy::Daily { hour: 0, minute: 0 })
                .max_files(30)
                .rotate_on_open(false)
                .build()?);
            builder.sink(daily_sink);
        } else {
            // nowhere to write a file, keep the output visible
            console = true;
        }
    }

    if console {
        add_console_sinks(&mut builder)?;
    }

    let logger = Arc::new(builder.build()?);
    logger.set_flush_level_filter(LevelFilter::MoreSevereEqual(Level::Info));
    logger.set_flush_period(Some(Duration::from_secs(2)));
    logger.set_level_filter(LevelFilter::MoreSevereEqual(effective_level(config)));

    spdlog::set_default_logger(logger);

    Ok(())
}
