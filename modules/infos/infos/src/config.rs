use serde::{Deserialize, Serialize};

/// Configuration for the infos module
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct InfosConfig {
    pub storage: StorageConfig,
    pub geocoder: GeocoderConfig,
    pub filter: FilterConfig,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Process-local map, lost on restart.
    Memory,
    /// Relational database reached through `dsn`.
    #[default]
    Database,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Connection string, e.g. `sqlite://reminders.db?mode=rwc` or `postgres://...`.
    pub dsn: String,
    /// Apply schema migrations on startup.
    pub migrate: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Database,
            dsn: "sqlite://reminders.db?mode=rwc".to_owned(),
            migrate: true,
        }
    }
}

/// US Census one-line-address geocoder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub benchmark: String,
    pub timeout_ms: u64,
    /// Outbound proxy, e.g. a recording cache used by tests.
    pub proxy: Option<String>,
    pub user_agent: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://geocoding.geo.census.gov".to_owned(),
            benchmark: "Public_AR_Current".to_owned(),
            timeout_ms: 10_000,
            proxy: None,
            user_agent: concat!("reminders/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Keys rejected in filters and request bodies on top of the built-in
    /// `__proto__` and `constructor.prototype`.
    pub prohibited_keys: Vec<String>,
    pub max_limit: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            prohibited_keys: Vec::new(),
            max_limit: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: InfosConfig = serde_json::from_str(
            r#"{"storage":{"backend":"memory"},"filter":{"prohibited_keys":["badKey"]}}"#,
        )
        .unwrap();

        assert_eq!(cfg.storage.backend, StorageBackend::Memory);
        assert!(cfg.storage.migrate);
        assert_eq!(cfg.filter.prohibited_keys, vec!["badKey".to_owned()]);
        assert_eq!(cfg.filter.max_limit, 1000);
        assert_eq!(cfg.geocoder.benchmark, "Public_AR_Current");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res = serde_json::from_str::<InfosConfig>(r#"{"storage":{"path":"x"}}"#);
        assert!(res.is_err());
    }
}
