use crate::config::LoggerConfig;
use crate::error::Result;
use crate::guards::WorkerGuards;
use crate::writer;
use arbor_ioc::Component;
use std::collections::HashMap;
use std::fmt;
use tracing::level_filters::LevelFilter;
use tracing::{Dispatch, Level};

/// An injectable logger.
///
/// Every event at or above the configured level is formatted by the sink for its level:
/// the dedicated writer from `level_writers` when there is one, the default writer
/// otherwise. The logger does not touch the global subscriber, so several loggers (and
/// several applications) can coexist in one process.
///
/// ```no_run
/// use arbor_logging::{Logger, LoggerConfig};
/// use tracing::Level;
///
/// let logger = Logger::new(&LoggerConfig::default()).unwrap();
/// logger.info("service started");
///
/// // Structured fields go through the usual `tracing` macros.
/// logger.in_scope(Level::WARN, || {
///   tracing::warn!(queue = "emails", depth = 1204, "queue is backing up");
/// });
/// ```
pub struct Logger {
  level: LevelFilter,
  default: Dispatch,
  by_level: HashMap<Level, Dispatch>,
  // Dropped last so sinks flush on drop.
  guards: WorkerGuards,
}

impl Logger {
  pub fn new(config: &LoggerConfig) -> Result<Self> {
    let mut guards = WorkerGuards::default();
    let default = writer::make_sink(&config.writer, config.level, config.ansi, &mut guards)?;

    let mut by_level = HashMap::new();
    for (level, writer_config) in &config.level_writers {
      let sink = writer::make_sink(writer_config, config.level, config.ansi, &mut guards)?;
      by_level.insert(*level, sink);
    }

    Ok(Self {
      level: config.level,
      default,
      by_level,
      guards,
    })
  }

  pub fn level(&self) -> LevelFilter {
    self.level
  }

  /// Whether events at `level` are written at all.
  pub fn enabled(&self, level: Level) -> bool {
    level <= self.level
  }

  fn sink(&self, level: Level) -> &Dispatch {
    self.by_level.get(&level).unwrap_or(&self.default)
  }

  /// Runs `f` with the sink for `level` as the current dispatcher, so `tracing` events
  /// emitted inside reach this logger's writer.
  pub fn in_scope<T>(&self, level: Level, f: impl FnOnce() -> T) -> T {
    tracing::dispatcher::with_default(self.sink(level), f)
  }

  pub fn log(&self, level: Level, message: &str) {
    if !self.enabled(level) {
      return;
    }
    // Event levels must be constants.
    self.in_scope(level, || {
      if level == Level::ERROR {
        tracing::error!("{}", message);
      } else if level == Level::WARN {
        tracing::warn!("{}", message);
      } else if level == Level::INFO {
        tracing::info!("{}", message);
      } else if level == Level::DEBUG {
        tracing::debug!("{}", message);
      } else {
        tracing::trace!("{}", message);
      }
    });
  }

  pub fn trace(&self, message: &str) {
    self.log(Level::TRACE, message);
  }

  pub fn debug(&self, message: &str) {
    self.log(Level::DEBUG, message);
  }

  pub fn info(&self, message: &str) {
    self.log(Level::INFO, message);
  }

  pub fn warn(&self, message: &str) {
    self.log(Level::WARN, message);
  }

  pub fn error(&self, message: &str) {
    self.log(Level::ERROR, message);
  }
}

impl Component for Logger {}

impl fmt::Debug for Logger {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut routed: Vec<String> = self.by_level.keys().map(|level| level.to_string()).collect();
    routed.sort();
    f.debug_struct("Logger")
      .field("level", &self.level)
      .field("routed_levels", &routed)
      .field("guards", &self.guards)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn enabled_follows_the_level_filter() {
    let logger = Logger::new(&LoggerConfig::new(LevelFilter::WARN)).unwrap();
    assert!(logger.enabled(Level::ERROR));
    assert!(logger.enabled(Level::WARN));
    assert!(!logger.enabled(Level::INFO));
    assert!(!logger.enabled(Level::TRACE));
  }

  #[test]
  fn off_disables_everything() {
    let logger = Logger::new(&LoggerConfig::new(LevelFilter::OFF)).unwrap();
    assert!(!logger.enabled(Level::ERROR));
  }

  #[test]
  fn console_sinks_hold_no_guards() {
    let logger = Logger::new(&LoggerConfig::default()).unwrap();
    assert_eq!(logger.guards.len(), 0);
  }
}
