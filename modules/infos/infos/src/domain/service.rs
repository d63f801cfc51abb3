//! Domain service: business rules for reminders.
//!
//! The service owns the create-with-geocode workflow and turns repository
//! "missing" answers into `NotFound`. It never imports the API layer.

use std::sync::Arc;

use infos_sdk::{Info, InfoFilter, InfoPatch, NewInfo, WhereNode};

use crate::domain::error::DomainError;
use crate::domain::ports::GeocoderPort;
use crate::domain::repo::{InfoQuery, InfosRepository};

/// Largest `limit`/`offset` a storage backend can bind (`i64::MAX`).
pub const MAX_PAGE_VALUE: u64 = i64::MAX.unsigned_abs();

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_limit: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { max_limit: 1000 }
    }
}

pub struct Service {
    repo: Arc<dyn InfosRepository>,
    geocoder: Arc<dyn GeocoderPort>,
    config: ServiceConfig,
}

impl Service {
    #[must_use]
    pub fn new(
        repo: Arc<dyn InfosRepository>,
        geocoder: Arc<dyn GeocoderPort>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            geocoder,
            config,
        }
    }

    /// # Errors
    /// `Validation` for a supplied `id`/`remind_at_geo` or an empty title,
    /// `AddressNotFound` or a geocoder error when the address cannot be
    /// resolved; nothing is stored in those cases.
    pub async fn create_info(&self, mut new_info: NewInfo) -> Result<Info, DomainError> {
        tracing::info!("Creating new info");

        if new_info.id.is_some() {
            return Err(DomainError::validation("id", "must not be provided on create"));
        }
        if new_info.remind_at_geo.is_some() {
            return Err(DomainError::validation(
                "remindAtGeo",
                "is derived from remindAtAddress",
            ));
        }
        validate_title(&new_info.title)?;

        if let Some(address) = new_info.remind_at_address.as_deref() {
            new_info.remind_at_geo = Some(self.resolve_address(address).await?);
        }

        let info = self.repo.create(new_info).await?;
        tracing::info!(id = info.id, "Successfully created info");
        Ok(info)
    }

    /// # Errors
    /// `NotFound` when the id does not exist.
    pub async fn get_info(&self, id: i64) -> Result<Info, DomainError> {
        tracing::debug!(id, "Getting info by id");
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(id))
    }

    /// # Errors
    /// `InvalidFilter` when `limit` exceeds the configured maximum.
    pub async fn list_infos(&self, filter: &InfoFilter) -> Result<Vec<Info>, DomainError> {
        tracing::debug!("Listing infos");

        let max_limit = self.config.max_limit.min(MAX_PAGE_VALUE);
        if let Some(limit) = filter.limit {
            if limit > max_limit {
                return Err(DomainError::invalid_filter(format!(
                    "limit {limit} exceeds the maximum of {max_limit}"
                )));
            }
        }
        if let Some(offset) = filter.offset {
            if offset > MAX_PAGE_VALUE {
                return Err(DomainError::invalid_filter(format!(
                    "offset {offset} exceeds the maximum of {MAX_PAGE_VALUE}"
                )));
            }
        }

        let query = InfoQuery {
            where_clause: filter.where_clause.clone(),
            order: filter.order.clone(),
            limit: filter.limit,
            offset: filter.offset,
        };
        let infos = self.repo.find(&query).await?;
        tracing::debug!("Successfully listed {} infos", infos.len());
        Ok(infos)
    }

    /// Full overwrite. `remind_at_geo` is re-derived from the new address.
    ///
    /// # Errors
    /// `NotFound` when the id does not exist; validation and geocoder errors
    /// as for create.
    pub async fn replace_info(&self, mut info: Info) -> Result<(), DomainError> {
        tracing::info!(id = info.id, "Replacing info");
        validate_title(&info.title)?;

        let existing = self.get_info(info.id).await?;
        info.remind_at_geo = match info.remind_at_address.as_deref() {
            None => None,
            Some(address) if existing.remind_at_address.as_deref() == Some(address) => {
                existing.remind_at_geo
            }
            Some(address) => Some(self.resolve_address(address).await?),
        };

        let id = info.id;
        if !self.repo.replace(info).await? {
            return Err(DomainError::not_found(id));
        }
        Ok(())
    }

    /// # Errors
    /// `NotFound` when the id does not exist; `Validation` for an empty
    /// title or a supplied `remind_at_geo`.
    pub async fn update_info(&self, id: i64, mut patch: InfoPatch) -> Result<(), DomainError> {
        tracing::info!(id, "Updating info");
        validate_patch(&patch)?;

        let existing = self.get_info(id).await?;
        if patch.is_empty() {
            return Ok(());
        }

        if let Some(address) = &patch.remind_at_address {
            let unchanged = address.as_deref() == existing.remind_at_address.as_deref();
            if !unchanged {
                patch.remind_at_geo = Some(match address.as_deref() {
                    Some(a) => Some(self.resolve_address(a).await?),
                    None => None,
                });
            }
        }

        if !self.repo.update(id, &patch).await? {
            return Err(DomainError::not_found(id));
        }
        Ok(())
    }

    /// # Errors
    /// `NotFound` when the id does not exist.
    pub async fn delete_info(&self, id: i64) -> Result<(), DomainError> {
        tracing::info!(id, "Deleting info");
        if !self.repo.delete(id).await? {
            return Err(DomainError::not_found(id));
        }
        Ok(())
    }

    /// # Errors
    /// Storage failures only.
    pub async fn count_infos(&self, filter: Option<&WhereNode>) -> Result<u64, DomainError> {
        self.repo.count(filter).await
    }

    /// # Errors
    /// `Validation` as for single updates, geocoder errors when the patch
    /// sets an address.
    pub async fn update_all_infos(
        &self,
        mut patch: InfoPatch,
        filter: Option<&WhereNode>,
    ) -> Result<u64, DomainError> {
        tracing::info!("Updating all matching infos");
        validate_patch(&patch)?;

        if let Some(address) = &patch.remind_at_address {
            patch.remind_at_geo = Some(match address.as_deref() {
                Some(a) => Some(self.resolve_address(a).await?),
                None => None,
            });
        }

        let count = if patch.is_empty() {
            self.repo.count(filter).await?
        } else {
            self.repo.update_all(&patch, filter).await?
        };
        tracing::info!(count, "Bulk update finished");
        Ok(count)
    }

    async fn resolve_address(&self, address: &str) -> Result<String, DomainError> {
        let points = self.geocoder.geocode(address).await.map_err(|e| {
            tracing::warn!(error = %e, "Geocoding failed");
            DomainError::from(e)
        })?;

        let Some(best) = points.first() else {
            tracing::debug!(address, "Geocoder returned no candidates");
            return Err(DomainError::address_not_found(address));
        };
        Ok(best.to_geo_string())
    }
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.is_empty() {
        return Err(DomainError::validation("title", "must not be empty"));
    }
    Ok(())
}

fn validate_patch(patch: &InfoPatch) -> Result<(), DomainError> {
    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    if patch.remind_at_geo.is_some() {
        return Err(DomainError::validation(
            "remindAtGeo",
            "is derived from remindAtAddress",
        ));
    }
    Ok(())
}
