//! Layered application configuration.
//!
//! Order of precedence (lowest first): built-in defaults, the YAML file,
//! `APP__*` environment variables, command-line overrides.

use std::path::Path;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use infos::config::{InfosConfig, StorageBackend};
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "APP__";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub infos: InfosConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Upper bound for a whole request, geocoding included.
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_owned(),
            port: 8087,
            request_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `infos=debug,sqlx=warn`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

/// Command-line values that take precedence over every other layer.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub verbose: u8,
    pub mock: bool,
}

impl AppConfig {
    /// Defaults, then `path` (if any), then the environment.
    ///
    /// # Errors
    /// Fails on a missing file, unreadable YAML, unknown keys or mistyped values.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
        if let Some(path) = path {
            if !path.is_file() {
                anyhow::bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| match path {
                Some(p) => format!("invalid configuration in {}", p.display()),
                None => "invalid configuration".to_owned(),
            })
    }

    pub fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        match cli.verbose {
            0 => {}
            1 => "info".clone_into(&mut self.logging.level),
            2 => "debug".clone_into(&mut self.logging.level),
            _ => "trace".clone_into(&mut self.logging.level),
        }
        if cli.mock {
            self.infos.storage.backend = StorageBackend::Memory;
        }
    }

    /// `bind_addr:port`, ready for `TcpListener::bind`.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind_addr, self.server.port)
    }

    /// # Errors
    /// Serialization failures only.
    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("failed to render configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_without_file() {
        Jail::expect_with(|_jail| {
            let cfg = AppConfig::load_or_default(None).unwrap();
            assert_eq!(cfg, AppConfig::default());
            assert_eq!(cfg.listen_addr(), "127.0.0.1:8087");
            Ok(())
        });
    }

    #[test]
    fn yaml_overrides_defaults_and_env_overrides_yaml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "reminders.yaml",
                r#"
server:
  port: 9000
logging:
  format: json
infos:
  storage:
    backend: memory
  filter:
    prohibited_keys: ["badKey"]
"#,
            )?;
            jail.set_env("APP__SERVER__PORT", "9100");
            jail.set_env("APP__INFOS__GEOCODER__TIMEOUT_MS", "250");

            let cfg = AppConfig::load_or_default(Some(Path::new("reminders.yaml"))).unwrap();
            assert_eq!(cfg.server.port, 9100);
            assert_eq!(cfg.server.bind_addr, "127.0.0.1");
            assert_eq!(cfg.logging.format, LogFormat::Json);
            assert_eq!(cfg.infos.storage.backend, StorageBackend::Memory);
            assert_eq!(cfg.infos.filter.prohibited_keys, vec!["badKey".to_owned()]);
            assert_eq!(cfg.infos.geocoder.timeout_ms, 250);
            Ok(())
        });
    }

    #[test]
    fn unknown_keys_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("bad.yaml", "server:\n  prot: 1\n")?;
            assert!(AppConfig::load_or_default(Some(Path::new("bad.yaml"))).is_err());
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");
        assert!(AppConfig::load_or_default(Some(&missing)).is_err());
    }

    #[test]
    fn cli_overrides_win() {
        let mut cfg = AppConfig::default();
        cfg.apply_cli_overrides(&CliOverrides {
            port: Some(1234),
            verbose: 2,
            mock: true,
        });
        assert_eq!(cfg.server.port, 1234);
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.infos.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn renders_as_json() {
        let json = AppConfig::default().to_json().unwrap();
        let back: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AppConfig::default());
    }
}
