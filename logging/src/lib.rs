//! # Arbor Logging
//!
//! A configuration-driven [`Logger`] bean for `arbor_ioc` applications.
//!
//! The logger formats events with `tracing-subscriber` and writes them to the console, a
//! file, or a rolling file managed by `tracing-appender`. A separate writer can be
//! configured per level, so errors can go to their own file while everything else goes to
//! the console.
//!
//! ```yaml
//! level: debug
//! writer:
//!   kind: console
//! level_writers:
//!   error:
//!     kind: rolling_file
//!     directory: logs
//!     file_name_prefix: errors.log
//!     rotation: daily
//! ```
//!
//! ```no_run
//! use arbor_logging::LoggerConfig;
//!
//! let config = LoggerConfig::from_file("logging.yaml").unwrap();
//! let module = arbor_logging::configuration::<()>(config);
//! // app.import(module)?;
//! # drop(module);
//! ```

mod config;
mod error;
mod guards;
mod logger;
mod module;
mod writer;

pub use config::{ConsoleStream, LoggerConfig, WriterConfig};
pub use error::{Error, Result};
pub use logger::Logger;
pub use module::configuration;

// Re-exported for building configurations in code.
pub use tracing::level_filters::LevelFilter;
pub use tracing::Level;
pub use tracing_appender::rolling::Rotation;
