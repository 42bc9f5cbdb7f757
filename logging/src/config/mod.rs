// Configuration parsing and validation.

mod processed;
mod raw;

pub use processed::{ConsoleStream, LoggerConfig, WriterConfig};
