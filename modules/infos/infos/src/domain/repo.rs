use async_trait::async_trait;
use infos_sdk::{Info, InfoPatch, NewInfo, OrderKey, WhereNode};

use crate::domain::error::DomainError;

/// Storage-level query: the parts of a filter a backend evaluates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoQuery {
    pub where_clause: Option<WhereNode>,
    pub order: Vec<OrderKey>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Repository trait for Info persistence.
///
/// Backends must agree on filter semantics: see [`infos_sdk::Predicate`] for
/// comparison rules. Results are ordered by `order` followed by `id` ascending.
#[async_trait]
pub trait InfosRepository: Send + Sync {
    /// Store a new record; assigns an id when `info.id` is `None`.
    /// Fails with `DuplicateId` when the id is taken.
    async fn create(&self, info: NewInfo) -> Result<Info, DomainError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Info>, DomainError>;

    async fn find(&self, query: &InfoQuery) -> Result<Vec<Info>, DomainError>;

    /// Overwrite every field. Returns `false` when the id does not exist.
    async fn replace(&self, info: Info) -> Result<bool, DomainError>;

    /// Merge the touched fields. Returns `false` when the id does not exist.
    async fn update(&self, id: i64, patch: &InfoPatch) -> Result<bool, DomainError>;

    /// Returns `false` when the id does not exist.
    async fn delete(&self, id: i64) -> Result<bool, DomainError>;

    /// Merge `patch` into every matching record; returns how many matched.
    async fn update_all(
        &self,
        patch: &InfoPatch,
        filter: Option<&WhereNode>,
    ) -> Result<u64, DomainError>;

    async fn count(&self, filter: Option<&WhereNode>) -> Result<u64, DomainError>;
}
