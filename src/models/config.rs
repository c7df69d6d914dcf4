use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Application configuration from `countries.yaml`.
///
/// Every field has a default, so an empty or missing file is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub logging: LoggingSettings,
}

/// Country data service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://restcountries.com/v2".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub log_dir: Utf8PathBuf,
    pub log_prefix: String,
    pub debug_mode: bool,
    /// Mirror log output to stderr.
    pub console_output: bool,
    /// Write JSON lines to the log file instead of plain text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_dir: Utf8PathBuf::from("logs"),
            log_prefix: "countries".to_string(),
            debug_mode: false,
            console_output: false,
            json: false,
        }
    }
}
