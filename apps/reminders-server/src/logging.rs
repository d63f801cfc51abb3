use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// `RUST_LOG` wins over the configured level when it is set.
///
/// # Errors
/// Returns an error if the level directive cannot be parsed.
pub fn build_filter(cfg: &LoggingConfig) -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&cfg.level)
        .with_context(|| format!("invalid logging level directive: {}", cfg.level))
}

/// Install the global subscriber: human-readable text or one JSON object
/// per line.
///
/// # Errors
/// Returns an error on a bad level directive or if a global subscriber is
/// already installed.
pub fn init_logging(cfg: &LoggingConfig) -> anyhow::Result<()> {
    let filter = build_filter(cfg)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match cfg.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_module_directives() {
        let cfg = LoggingConfig {
            level: "info,infos=debug,sea_orm=warn".to_owned(),
            format: LogFormat::Text,
        };
        assert!(build_filter(&cfg).is_ok());
    }

    #[test]
    fn rejects_garbage_levels() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let cfg = LoggingConfig {
            level: "infos=loud".to_owned(),
            format: LogFormat::Json,
        };
        assert!(build_filter(&cfg).is_err());
    }
}
