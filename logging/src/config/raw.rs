use serde::Deserialize;
use std::collections::HashMap;

// --- Top Level Config ---
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoggerConfigRaw {
  #[serde(default = "default_level")]
  pub level: String,
  #[serde(default)] // Console when absent
  pub writer: Option<WriterConfigRaw>,
  #[serde(default)]
  pub level_writers: HashMap<String, WriterConfigRaw>,
  #[serde(default = "default_ansi")]
  pub ansi: bool,
}

fn default_level() -> String {
  "info".to_string()
}

fn default_ansi() -> bool {
  true
}

// --- Writer Config ---
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum WriterConfigRaw {
  Console(ConsoleWriterConfigRaw),
  File(FileWriterConfigRaw),
  RollingFile(RollingFileWriterConfigRaw),
}

#[derive(Debug, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConsoleWriterConfigRaw {
  /// "stdout" or "stderr".
  #[serde(default)]
  pub stream: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileWriterConfigRaw {
  pub path: String,
}

fn default_file_name_prefix() -> String {
  "arbor.log".to_string()
}

fn default_rotation() -> String {
  "daily".to_string()
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RollingFileWriterConfigRaw {
  pub directory: String,
  #[serde(default = "default_file_name_prefix")]
  pub file_name_prefix: String,
  /// Expected values: "minutely", "hourly", "daily", or "never".
  #[serde(default = "default_rotation")]
  pub rotation: String,
}
