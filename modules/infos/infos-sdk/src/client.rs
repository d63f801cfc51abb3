//! Object-safe client boundary for the `infos` module.
//!
//! Consumers hold it as `Arc<dyn InfosClient>`; the module ships a local
//! implementation that calls the domain service directly.

use async_trait::async_trait;

use crate::errors::InfosError;
use crate::filter::{InfoFilter, WhereNode};
use crate::models::{Info, InfoPatch, NewInfo};

/// Object-safe client for in-process consumption.
#[async_trait]
pub trait InfosClient: Send + Sync {
    /// Create a reminder. A set `remind_at_address` is geocoded first.
    async fn create_info(&self, new_info: NewInfo) -> Result<Info, InfosError>;

    /// Get a single reminder by ID.
    async fn get_info(&self, id: i64) -> Result<Info, InfosError>;

    /// List reminders matching `filter`.
    ///
    /// The `fields` projection only shapes transport responses; typed
    /// results are always complete.
    async fn list_infos(&self, filter: InfoFilter) -> Result<Vec<Info>, InfosError>;

    /// Overwrite every field of an existing reminder.
    async fn replace_info(&self, info: Info) -> Result<(), InfosError>;

    /// Merge `patch` into an existing reminder.
    async fn update_info(&self, id: i64, patch: InfoPatch) -> Result<(), InfosError>;

    /// Delete a reminder by ID.
    async fn delete_info(&self, id: i64) -> Result<(), InfosError>;

    /// Count reminders matching `filter` (all when `None`).
    async fn count_infos(&self, filter: Option<WhereNode>) -> Result<u64, InfosError>;

    /// Merge `patch` into every matching reminder; returns the number updated.
    async fn update_all_infos(
        &self,
        patch: InfoPatch,
        filter: Option<WhereNode>,
    ) -> Result<u64, InfosError>;
}
