//! Infrastructure storage layer: persistence backends for `InfosRepository`.
//!
//! - `entity/` - `SeaORM` entity for the `infos` table
//! - `mapper.rs` - entity to SDK model conversion
//! - `filter_mapper.rs` - `WhereNode`/`OrderKey` to `SeaORM` conditions
//! - `migrations/` - database schema migrations
//! - `sea_orm_repo.rs` / `memory_repo.rs` - the two backends
//!
//! [`connect_repository`] is the startup factory choosing a backend from config.

use std::sync::Arc;

use anyhow::Context;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;

use crate::config::{StorageBackend, StorageConfig};
use crate::domain::repo::InfosRepository;

pub mod entity;
pub mod filter_mapper;
pub mod mapper;
pub mod memory_repo;
pub mod migrations;
pub mod sea_orm_repo;

pub use memory_repo::InMemoryInfosRepository;
pub use sea_orm_repo::OrmInfosRepository;

/// Build the repository selected by `cfg.backend`.
///
/// # Errors
/// Fails when the database cannot be reached or migrations fail.
pub async fn connect_repository(cfg: &StorageConfig) -> anyhow::Result<Arc<dyn InfosRepository>> {
    match cfg.backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory infos storage");
            Ok(Arc::new(InMemoryInfosRepository::new()))
        }
        StorageBackend::Database => {
            tracing::info!(dsn = %redact_dsn(&cfg.dsn), "Connecting infos database");
            let db = Database::connect(cfg.dsn.as_str())
                .await
                .with_context(|| format!("failed to connect to {}", redact_dsn(&cfg.dsn)))?;

            if cfg.migrate {
                tracing::info!("Running infos database migrations");
                migrations::Migrator::up(&db, None)
                    .await
                    .context("infos migrations failed")?;
            }
            Ok(Arc::new(OrmInfosRepository::new(db)))
        }
    }
}

/// Drop credentials from a DSN before it reaches logs.
fn redact_dsn(dsn: &str) -> String {
    match url::Url::parse(dsn) {
        Ok(mut url) if url.password().is_some() => {
            // set_password only fails for cannot-be-a-base URLs, which carry no password
            let _ = url.set_password(Some("***"));
            url.to_string()
        }
        _ => dsn.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_password_only() {
        assert_eq!(
            redact_dsn("postgres://app:secret@db:5432/reminders"),
            "postgres://app:***@db:5432/reminders"
        );
        assert_eq!(redact_dsn("sqlite::memory:"), "sqlite::memory:");
    }
}
