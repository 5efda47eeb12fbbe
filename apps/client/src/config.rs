//! Client configuration read from the environment.

use std::path::PathBuf;

pub const DEFAULT_AUTHORITY: &str = "org.symptomtracker.provider";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingValue(&'static str),

    #[error("Invalid {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub database_path: PathBuf,
    pub authority: String,
    pub backend_url: Option<String>,
    pub api_token: Option<String>,
    pub patient_id: Option<String>,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_path = get("SYMPTOM_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let authority = get("SYMPTOM_AUTHORITY").unwrap_or_else(|| DEFAULT_AUTHORITY.to_string());
        if authority.contains('/') {
            return Err(ConfigError::InvalidValue {
                name: "SYMPTOM_AUTHORITY",
                reason: "must not contain '/'".to_string(),
            });
        }

        let backend_url = get("SYMPTOM_BACKEND_URL");
        if let Some(url) = &backend_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue {
                    name: "SYMPTOM_BACKEND_URL",
                    reason: format!("expected an http(s) URL, got {}", url),
                });
            }
        }

        Ok(Self {
            database_path,
            authority,
            backend_url,
            api_token: get("SYMPTOM_API_TOKEN"),
            patient_id: get("SYMPTOM_PATIENT_ID"),
        })
    }

    pub fn require_backend_url(&self) -> Result<&str, ConfigError> {
        self.backend_url
            .as_deref()
            .ok_or(ConfigError::MissingValue("SYMPTOM_BACKEND_URL"))
    }

    pub fn require_patient_id(&self) -> Result<&str, ConfigError> {
        self.patient_id
            .as_deref()
            .ok_or(ConfigError::MissingValue("SYMPTOM_PATIENT_ID"))
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("symptom-tracker")
        .join("symptoms.db")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.authority, DEFAULT_AUTHORITY);
        assert!(config.database_path.ends_with("symptom-tracker/symptoms.db"));
        assert_eq!(config.backend_url, None);
        assert_eq!(
            config.require_patient_id(),
            Err(ConfigError::MissingValue("SYMPTOM_PATIENT_ID"))
        );
    }

    #[test]
    fn reads_all_values() {
        let config = config(&[
            ("SYMPTOM_DB_PATH", "/tmp/s.db"),
            ("SYMPTOM_AUTHORITY", "test.provider"),
            ("SYMPTOM_BACKEND_URL", "https://api.example.org"),
            ("SYMPTOM_API_TOKEN", "secret"),
            ("SYMPTOM_PATIENT_ID", "p1"),
        ])
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/s.db"));
        assert_eq!(config.authority, "test.provider");
        assert_eq!(config.require_backend_url(), Ok("https://api.example.org"));
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.require_patient_id(), Ok("p1"));
    }

    #[test]
    fn empty_values_are_unset() {
        let config = config(&[("SYMPTOM_AUTHORITY", " "), ("SYMPTOM_PATIENT_ID", "")]).unwrap();
        assert_eq!(config.authority, DEFAULT_AUTHORITY);
        assert_eq!(config.patient_id, None);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            config(&[("SYMPTOM_AUTHORITY", "a/b")]),
            Err(ConfigError::InvalidValue { name: "SYMPTOM_AUTHORITY", .. })
        ));
        assert!(matches!(
            config(&[("SYMPTOM_BACKEND_URL", "ftp://host")]),
            Err(ConfigError::InvalidValue { name: "SYMPTOM_BACKEND_URL", .. })
        ));
    }
}
