use crate::config::{ConsoleStream, WriterConfig};
use crate::error::{Error, Result};
use crate::guards::WorkerGuards;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use tracing::level_filters::LevelFilter;
use tracing::Dispatch;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

fn describe(writer: &WriterConfig) -> String {
  match writer {
    WriterConfig::Console(ConsoleStream::Stdout) => "stdout".to_string(),
    WriterConfig::Console(ConsoleStream::Stderr) => "stderr".to_string(),
    WriterConfig::File { path } => path.display().to_string(),
    WriterConfig::RollingFile {
      directory,
      file_name_prefix,
      ..
    } => directory.join(file_name_prefix).display().to_string(),
  }
}

fn ensure_directory(directory: &Path, writer: &WriterConfig) -> Result<()> {
  if directory.as_os_str().is_empty() || directory.exists() {
    return Ok(());
  }
  std::fs::create_dir_all(directory).map_err(|e| Error::WriterSetup {
    writer: describe(writer),
    reason: format!("Failed to create directory {:?}: {}", directory, e),
  })
}

/// Builds the writer for `config`. File writers are non-blocking; their guards are added
/// to `guards`.
pub(crate) fn make_writer(config: &WriterConfig, guards: &mut WorkerGuards) -> Result<BoxMakeWriter> {
  match config {
    WriterConfig::Console(ConsoleStream::Stdout) => Ok(BoxMakeWriter::new(io::stdout)),
    WriterConfig::Console(ConsoleStream::Stderr) => Ok(BoxMakeWriter::new(io::stderr)),
    WriterConfig::File { path } => {
      if let Some(parent) = path.parent() {
        ensure_directory(parent, config)?;
      }
      let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::WriterSetup {
          writer: describe(config),
          reason: format!("Failed to open file {:?}: {}", path, e),
        })?;
      let (non_blocking, guard) = tracing_appender::non_blocking(file);
      guards.add(guard);
      Ok(BoxMakeWriter::new(non_blocking))
    }
    WriterConfig::RollingFile {
      directory,
      file_name_prefix,
      rotation,
    } => {
      ensure_directory(directory, config)?;
      let appender = RollingFileAppender::builder()
        .rotation(rotation.clone())
        .filename_prefix(file_name_prefix)
        .build(directory)
        .map_err(|e| Error::WriterSetup {
          writer: describe(config),
          reason: e.to_string(),
        })?;
      let (non_blocking, guard) = tracing_appender::non_blocking(appender);
      guards.add(guard);
      Ok(BoxMakeWriter::new(non_blocking))
    }
  }
}

/// A dispatcher that formats every event at or above `level` onto `writer`.
pub(crate) fn make_sink(
  config: &WriterConfig,
  level: LevelFilter,
  ansi: bool,
  guards: &mut WorkerGuards,
) -> Result<Dispatch> {
  let writer = make_writer(config, guards)?;
  let subscriber = tracing_subscriber::fmt()
    .with_writer(writer)
    .with_max_level(level)
    .with_ansi(ansi && config.is_console())
    .finish();
  Ok(Dispatch::new(subscriber))
}
