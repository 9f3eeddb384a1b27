use std::path::Path;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
pub const BASE_URL_ENV_VAR: &str = "RUST_CODER_BASE_URL";
const APP_DIR: &str = "rust-coder";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub logging: LoggingConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextIngestRoute {
    #[default]
    Text,
    Legacy,
}

impl TextIngestRoute {
    pub fn path(self) -> &'static str {
        match self {
            Self::Text => "/api/ingest/text",
            Self::Legacy => "/api/ingest",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub text_ingest_route: TextIngestRoute,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            text_ingest_route: TextIngestRoute::default(),
        }
    }
}

impl BackendConfig {
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn resolved_file(&self) -> PathBuf {
        self.file.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(APP_DIR)
                .join("rust-coder.log")
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct UiConfig {
    pub syntax_theme: String,
    pub log_capacity: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            syntax_theme: "base16-ocean.dark".to_string(),
            log_capacity: 2_000,
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

impl Config {
    /// An explicit path must exist; the default location is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(BASE_URL_ENV_VAR).filter(|value| !value.trim().is_empty()) {
            self.backend.base_url = base_url;
        }
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(base_url) = base_url {
            self.backend.base_url = base_url;
        }
        self
    }

    pub fn validate(mut self) -> Result<Self, ConfigError> {
        let trimmed = self.backend.base_url.trim().trim_end_matches('/').to_string();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://"))
            || trimmed.ends_with("://")
        {
            return Err(ConfigError::InvalidBaseUrl(self.backend.base_url));
        }
        self.backend.base_url = trimmed;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn endpoint_joins_with_exactly_one_slash() {
        let backend = BackendConfig {
            base_url: "http://127.0.0.1:3000//".to_string(),
            ..BackendConfig::default()
        };
        assert_eq!(
            backend.endpoint("/api/query"),
            "http://127.0.0.1:3000/api/query"
        );
        assert_eq!(backend.endpoint("api/query"), "http://127.0.0.1:3000/api/query");
    }

    #[test]
    fn defaults_point_at_local_backend() {
        let config = Config::default();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:3000");
        assert_eq!(config.backend.text_ingest_route, TextIngestRoute::Text);
        assert_eq!(
            config.backend.endpoint("/api/query"),
            "http://127.0.0.1:3000/api/query"
        );
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[backend]\nbase_url = \"http://10.0.0.5:8080/\"\ntext_ingest_route = \"legacy\"\n"
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap().validate().unwrap();
        assert_eq!(config.backend.base_url, "http://10.0.0.5:8080");
        assert_eq!(config.backend.text_ingest_route.path(), "/api/ingest");
        assert_eq!(config.logging.filter, "info");
        assert_eq!(config.ui.log_capacity, 2_000);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[backend\nbase_url = 3").unwrap();
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn flag_wins_over_env_which_wins_over_file() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| {
            (key == BASE_URL_ENV_VAR).then(|| "http://env:1".to_string())
        });
        assert_eq!(config.backend.base_url, "http://env:1");

        let config = config.with_base_url(Some("https://flag:2".to_string()));
        assert_eq!(config.backend.base_url, "https://flag:2");
    }

    #[test]
    fn blank_env_value_is_ignored() {
        let mut config = Config::default();
        config.apply_env_overrides(|_| Some("   ".to_string()));
        assert_eq!(config.backend.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn validate_rejects_non_http_urls() {
        for bad in ["", "localhost:3000", "ftp://host", "http://"] {
            let config = Config::default().with_base_url(Some(bad.to_string()));
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidBaseUrl(_))),
                "{bad} should be rejected"
            );
        }
    }
}
