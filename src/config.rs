use crate::error::StampbakError;
use crate::Result;
use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

/// File name looked up in the current directory when no path is given
pub const SETTINGS_FILE_NAME: &str = "appsettings.json";

/// Format of the run timestamp, which names both the backup directory and the log file
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H.%M.%S";

/// Minimum level written to the run log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogLevel {
    #[serde(alias = "Trace")]
    Verbose,
    Debug,
    #[default]
    #[serde(alias = "Info")]
    Information,
    #[serde(alias = "Warn")]
    Warning,
    Error,
    Fatal,
}

impl LogLevel {
    pub fn level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Verbose => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Information => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error | LogLevel::Fatal => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Settings {
    #[serde(default)]
    pub source_paths: Vec<String>,
    #[serde(default)]
    pub target_path: String,
    #[serde(default, alias = "LogLevel")]
    pub log_event_level: LogLevel,
}

/// Top-level document: everything lives under a `Settings` section
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AppSettings {
    settings: Option<Settings>,
}

/// Path of the settings file in the current working directory
pub fn default_settings_path() -> Result<PathBuf> {
    let cwd = std::env::current_dir()
        .map_err(|e| StampbakError::config(format!("Could not determine current directory: {e}")))?;
    Ok(cwd.join(SETTINGS_FILE_NAME))
}

/// Load settings from a JSON document
pub fn load_settings(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path).map_err(|e| {
        StampbakError::config(format!("Failed to read {}: {e}", path.display()))
    })?;
    parse_settings(&content).map_err(|e| match e {
        StampbakError::Config { message } => {
            StampbakError::config(format!("{message} ({})", path.display()))
        }
        other => other,
    })
}

/// Parse the `Settings` section out of a JSON document
pub fn parse_settings(content: &str) -> Result<Settings> {
    let app: AppSettings = serde_json::from_str(content)
        .map_err(|e| StampbakError::config(format!("Failed to parse settings: {e}")))?;
    app.settings
        .ok_or_else(|| StampbakError::config("Missing \"Settings\" section"))
}

/// Timestamp for a run started now, in local time
pub fn timestamp() -> String {
    format_timestamp(&Local::now())
}

fn format_timestamp<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Create a sample settings file
pub fn create_sample_settings() -> String {
    r#"{
  "Settings": {
    "SourcePaths": [
      "/home/user/Documents",
      "/home/user/Pictures"
    ],
    "TargetPath": "/mnt/backups",
    "LogEventLevel": "Information"
  }
}
"#
    .to_string()
}

/// Display the settings a run would use
pub fn dump_settings(settings: &Settings, path: &Path) {
    println!("stampbak Settings");
    println!("=================");
    println!();
    println!("Settings file: {}", path.display());
    println!();
    println!("TargetPath    = {}", settings.target_path);
    println!("LogEventLevel = {:?}", settings.log_event_level);
    println!("SourcePaths   ({}):", settings.source_paths.len());
    for source in &settings.source_paths {
        println!("  - {source}");
    }
    println!();
    println!("Backups land in: {}/<timestamp>/<source name>", settings.target_path);
    println!("Timestamp format: {TIMESTAMP_FORMAT}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    #[test]
    fn test_parse_settings() {
        let settings = parse_settings(
            r#"{
                "Settings": {
                    "SourcePaths": ["/data/photos", "/data/music"],
                    "TargetPath": "/backups",
                    "LogEventLevel": "Debug"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(settings.source_paths, vec!["/data/photos", "/data/music"]);
        assert_eq!(settings.target_path, "/backups");
        assert_eq!(settings.log_event_level, LogLevel::Debug);
    }

    #[test]
    fn test_parse_settings_defaults() {
        let settings = parse_settings(r#"{ "Settings": { "TargetPath": "/backups" } }"#).unwrap();

        assert!(settings.source_paths.is_empty());
        assert_eq!(settings.log_event_level, LogLevel::Information);
    }

    #[test]
    fn test_parse_settings_level_aliases() {
        let settings =
            parse_settings(r#"{ "Settings": { "LogLevel": "Info" } }"#).unwrap();
        assert_eq!(settings.log_event_level, LogLevel::Information);

        let settings =
            parse_settings(r#"{ "Settings": { "LogEventLevel": "Verbose" } }"#).unwrap();
        assert_eq!(settings.log_event_level.level_filter(), LevelFilter::TRACE);
    }

    #[test]
    fn test_parse_settings_missing_section() {
        let err = parse_settings(r#"{ "Other": {} }"#).unwrap_err();
        assert!(matches!(err, StampbakError::Config { .. }));
        assert!(err.to_string().contains("Settings"));
    }

    #[test]
    fn test_parse_settings_malformed() {
        assert!(parse_settings("{ not json").is_err());
        assert!(parse_settings(r#"{ "Settings": { "LogEventLevel": "Loud" } }"#).is_err());
        assert!(parse_settings(r#"{ "Settings": { "SourcePaths": "/data" } }"#).is_err());
    }

    #[test]
    fn test_load_settings_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, create_sample_settings()).unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.target_path, "/mnt/backups");
        assert_eq!(settings.source_paths.len(), 2);
        assert_eq!(settings.log_event_level, LogLevel::Information);
    }

    #[test]
    fn test_load_settings_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_settings(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn test_level_filters() {
        assert_eq!(LogLevel::Debug.level_filter(), LevelFilter::DEBUG);
        assert_eq!(LogLevel::Information.level_filter(), LevelFilter::INFO);
        assert_eq!(LogLevel::Warning.level_filter(), LevelFilter::WARN);
        assert_eq!(LogLevel::Fatal.level_filter(), LevelFilter::ERROR);
    }

    #[test]
    fn test_format_timestamp() {
        let time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_timestamp(&time), "2024-01-01_00.00.00");

        let time = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 7).unwrap();
        assert_eq!(format_timestamp(&time), "2023-12-31_23.59.07");
    }

    #[test]
    fn test_timestamp_shape() {
        let stamp = timestamp();
        assert_eq!(stamp.len(), "2024-01-01_00.00.00".len());
        assert_eq!(stamp.as_bytes()[10], b'_');
    }

    #[test]
    fn test_default_settings_path() {
        let path = default_settings_path().unwrap();
        assert!(path.ends_with(SETTINGS_FILE_NAME));
    }
}
