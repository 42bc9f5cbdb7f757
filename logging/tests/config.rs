use arbor_logging::{ConsoleStream, Error, Level, LevelFilter, LoggerConfig, Rotation, WriterConfig};
use pretty_assertions::assert_eq;
use std::io::Write;
use std::path::PathBuf;

#[test]
fn test_full_document() {
  let yaml = r#"
level: debug
ansi: false
writer:
  kind: console
  stream: stderr
level_writers:
  error:
    kind: rolling_file
    directory: logs
    file_name_prefix: errors.log
    rotation: hourly
  WARN:
    kind: file
    path: logs/warnings.log
"#;

  let config = LoggerConfig::from_yaml_str(yaml).unwrap();
  let expected = LoggerConfig::new(LevelFilter::DEBUG)
    .with_ansi(false)
    .with_writer(WriterConfig::Console(ConsoleStream::Stderr))
    .with_level_writer(
      Level::ERROR,
      WriterConfig::rolling_file("logs", "errors.log", Rotation::HOURLY),
    )
    .with_level_writer(Level::WARN, WriterConfig::file("logs/warnings.log"));
  assert_eq!(config, expected);
}

#[test]
fn test_rolling_file_defaults() {
  let yaml = r#"
writer:
  kind: rolling_file
  directory: /var/log/app
"#;

  let config = LoggerConfig::from_yaml_str(yaml).unwrap();
  assert_eq!(config.level, LevelFilter::INFO);
  assert_eq!(
    config.writer,
    WriterConfig::RollingFile {
      directory: PathBuf::from("/var/log/app"),
      file_name_prefix: "arbor.log".to_string(),
      rotation: Rotation::DAILY,
    }
  );
}

#[test]
fn test_unknown_fields_are_rejected() {
  let err = LoggerConfig::from_yaml_str("level: info\ncolour: true\n").unwrap_err();
  assert!(matches!(err, Error::ConfigParse(_)));

  let err = LoggerConfig::from_yaml_str("writer:\n  kind: syslog\n").unwrap_err();
  assert!(matches!(err, Error::ConfigParse(_)));
}

#[test]
fn test_invalid_values_name_the_field() {
  let cases = [
    ("level: loud\n", "level"),
    ("writer:\n  kind: file\n  path: ''\n", "writer.path"),
    (
      "writer:\n  kind: rolling_file\n  directory: logs\n  rotation: weekly\n",
      "writer.rotation",
    ),
    ("writer:\n  kind: console\n  stream: printer\n", "writer.stream"),
    ("level_writers:\n  off:\n    kind: console\n", "level_writers.off"),
  ];

  for (yaml, expected_field) in cases {
    match LoggerConfig::from_yaml_str(yaml) {
      Err(Error::InvalidConfigValue { field, .. }) => assert_eq!(field, expected_field),
      other => panic!("expected an invalid value for {expected_field}, got {other:?}"),
    }
  }
}

#[test]
fn test_from_file() {
  let mut file = tempfile::NamedTempFile::new().unwrap();
  writeln!(file, "level: warn").unwrap();
  writeln!(file, "writer:").unwrap();
  writeln!(file, "  kind: file").unwrap();
  writeln!(file, "  path: app.log").unwrap();

  let config = LoggerConfig::from_file(file.path()).unwrap();
  assert_eq!(config.level, LevelFilter::WARN);
  assert_eq!(config.writer, WriterConfig::file("app.log"));
}

#[test]
fn test_missing_file() {
  let dir = tempfile::tempdir().unwrap();
  let err = LoggerConfig::from_file(dir.path().join("absent.yaml")).unwrap_err();
  assert!(matches!(err, Error::ConfigRead(_)));
}
