use crate::config::raw::{LoggerConfigRaw, WriterConfigRaw};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_appender::rolling::Rotation;

/// Which standard stream a console writer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleStream {
  #[default]
  Stdout,
  Stderr,
}

/// Where a sink writes.
#[derive(Debug, Clone, PartialEq)]
pub enum WriterConfig {
  Console(ConsoleStream),
  /// Appends to a single file, creating parent directories as needed.
  File { path: PathBuf },
  /// Time-rotated files named `<file_name_prefix>.<date>` under `directory`.
  RollingFile {
    directory: PathBuf,
    file_name_prefix: String,
    rotation: Rotation,
  },
}

impl WriterConfig {
  pub fn stdout() -> Self {
    WriterConfig::Console(ConsoleStream::Stdout)
  }

  pub fn stderr() -> Self {
    WriterConfig::Console(ConsoleStream::Stderr)
  }

  pub fn file(path: impl Into<PathBuf>) -> Self {
    WriterConfig::File { path: path.into() }
  }

  pub fn rolling_file(
    directory: impl Into<PathBuf>,
    file_name_prefix: impl Into<String>,
    rotation: Rotation,
  ) -> Self {
    WriterConfig::RollingFile {
      directory: directory.into(),
      file_name_prefix: file_name_prefix.into(),
      rotation,
    }
  }

  pub(crate) fn is_console(&self) -> bool {
    matches!(self, WriterConfig::Console(_))
  }
}

/// Validated logger configuration.
///
/// Events at or above `level` go to `writer`, unless `level_writers` names a dedicated writer
/// for the event's level.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggerConfig {
  pub level: LevelFilter,
  pub writer: WriterConfig,
  pub level_writers: HashMap<Level, WriterConfig>,
  /// Colors console output. File writers never use ANSI codes.
  pub ansi: bool,
}

impl Default for LoggerConfig {
  fn default() -> Self {
    Self {
      level: LevelFilter::INFO,
      writer: WriterConfig::stdout(),
      level_writers: HashMap::new(),
      ansi: true,
    }
  }
}

impl LoggerConfig {
  pub fn new(level: LevelFilter) -> Self {
    Self {
      level,
      ..Self::default()
    }
  }

  pub fn with_writer(mut self, writer: WriterConfig) -> Self {
    self.writer = writer;
    self
  }

  pub fn with_level_writer(mut self, level: Level, writer: WriterConfig) -> Self {
    self.level_writers.insert(level, writer);
    self
  }

  pub fn with_ansi(mut self, ansi: bool) -> Self {
    self.ansi = ansi;
    self
  }

  /// Parses and validates a YAML document.
  pub fn from_yaml_str(yaml: &str) -> Result<Self> {
    let raw: LoggerConfigRaw =
      serde_yaml::from_str(yaml).map_err(|e| Error::ConfigParse(e.to_string()))?;
    process_raw_config(raw)
  }

  /// Reads, parses and validates a YAML file.
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let file = File::open(path.as_ref())?;
    let raw: LoggerConfigRaw = serde_yaml::from_reader(io::BufReader::new(file))
      .map_err(|e| Error::ConfigParse(e.to_string()))?;
    process_raw_config(raw)
  }
}

// --- Conversion and Validation Logic ---

fn process_raw_config(raw_config: LoggerConfigRaw) -> Result<LoggerConfig> {
  let level = parse_level_filter(&raw_config.level, "level")?;

  let writer = match raw_config.writer {
    Some(raw_writer) => process_writer_config_raw(raw_writer, "writer")?,
    None => WriterConfig::stdout(),
  };

  let mut level_writers = HashMap::new();
  for (level_name, raw_writer) in raw_config.level_writers {
    let field = format!("level_writers.{}", level_name);
    let level = level_name.to_uppercase().parse::<Level>().map_err(|_| Error::InvalidConfigValue {
      field: field.clone(),
      message: format!(
        "Invalid level '{}'. Expected TRACE, DEBUG, INFO, WARN, or ERROR.",
        level_name
      ),
    })?;
    let writer = process_writer_config_raw(raw_writer, &field)?;
    if level_writers.insert(level, writer).is_some() {
      return Err(Error::InvalidConfigValue {
        field,
        message: format!("Level {} has more than one writer.", level),
      });
    }
  }

  Ok(LoggerConfig {
    level,
    writer,
    level_writers,
    ansi: raw_config.ansi,
  })
}

fn process_writer_config_raw(raw_writer: WriterConfigRaw, field: &str) -> Result<WriterConfig> {
  match raw_writer {
    WriterConfigRaw::Console(raw_console) => {
      let stream = match raw_console.stream.as_deref().map(str::to_lowercase).as_deref() {
        None | Some("stdout") => ConsoleStream::Stdout,
        Some("stderr") => ConsoleStream::Stderr,
        Some(other) => {
          return Err(Error::InvalidConfigValue {
            field: format!("{}.stream", field),
            message: format!("Unknown stream '{}'. Expected 'stdout' or 'stderr'.", other),
          })
        }
      };
      Ok(WriterConfig::Console(stream))
    }
    WriterConfigRaw::File(raw_file) => {
      if raw_file.path.is_empty() {
        return Err(Error::InvalidConfigValue {
          field: format!("{}.path", field),
          message: "File writer path cannot be empty.".to_string(),
        });
      }
      Ok(WriterConfig::File {
        path: PathBuf::from(raw_file.path),
      })
    }
    WriterConfigRaw::RollingFile(raw_rolling) => {
      let rotation = match raw_rolling.rotation.to_lowercase().as_str() {
        "minutely" => Rotation::MINUTELY,
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        "never" => Rotation::NEVER,
        other => {
          return Err(Error::InvalidConfigValue {
            field: format!("{}.rotation", field),
            message: format!(
              "Unknown rotation '{}'. Expected 'minutely', 'hourly', 'daily', or 'never'.",
              other
            ),
          })
        }
      };
      if raw_rolling.file_name_prefix.is_empty() {
        return Err(Error::InvalidConfigValue {
          field: format!("{}.file_name_prefix", field),
          message: "Rolling file prefix cannot be empty.".to_string(),
        });
      }
      Ok(WriterConfig::RollingFile {
        directory: PathBuf::from(raw_rolling.directory),
        file_name_prefix: raw_rolling.file_name_prefix,
        rotation,
      })
    }
  }
}

fn parse_level_filter(level_str: &str, field: &str) -> Result<LevelFilter> {
  // "OFF" is a filter, not a `tracing::Level`
  if level_str.to_uppercase() == "OFF" {
    return Ok(LevelFilter::OFF);
  }

  level_str
    .to_uppercase()
    .parse::<Level>()
    .map(LevelFilter::from_level)
    .map_err(|_| Error::InvalidConfigValue {
      field: field.to_string(),
      message: format!(
        "Invalid log level string '{}'. Expected TRACE, DEBUG, INFO, WARN, ERROR, or OFF.",
        level_str
      ),
    })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_level_filter_accepts_off_and_any_case() {
    assert_eq!(parse_level_filter("off", "level").unwrap(), LevelFilter::OFF);
    assert_eq!(parse_level_filter("Warn", "level").unwrap(), LevelFilter::WARN);
    assert!(matches!(
      parse_level_filter("loud", "level"),
      Err(Error::InvalidConfigValue { .. })
    ));
  }

  #[test]
  fn empty_document_yields_defaults() {
    let config = LoggerConfig::from_yaml_str("{}").unwrap();
    assert_eq!(config, LoggerConfig::default());
  }

  #[test]
  fn builders_compose() {
    let config = LoggerConfig::new(LevelFilter::DEBUG)
      .with_writer(WriterConfig::stderr())
      .with_level_writer(Level::ERROR, WriterConfig::file("errors.log"))
      .with_ansi(false);

    assert_eq!(config.level, LevelFilter::DEBUG);
    assert!(config.writer.is_console());
    assert_eq!(
      config.level_writers.get(&Level::ERROR),
      Some(&WriterConfig::File {
        path: PathBuf::from("errors.log")
      })
    );
    assert!(!config.ansi);
  }
}
