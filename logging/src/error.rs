use thiserror::Error;

/// The main error type for the `arbor_logging` library.
#[derive(Debug, Error)]
pub enum Error {
  #[error("Failed to read configuration file: {0}")]
  ConfigRead(#[from] std::io::Error),

  #[error("Failed to parse configuration: {0}")]
  ConfigParse(String),

  #[error("Invalid configuration value for '{field}': {message}")]
  InvalidConfigValue { field: String, message: String },

  #[error("Writer setup failed for '{writer}': {reason}")]
  WriterSetup { writer: String, reason: String },
}

/// A specialized `Result` type for `arbor_logging` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
