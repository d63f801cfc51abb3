use std::sync::Arc;

use async_trait::async_trait;
use infos_sdk::{Info, InfoFilter, InfoPatch, InfosClient, InfosError, NewInfo, WhereNode};

use crate::domain::service::Service;

/// Local implementation of the object-safe `InfosClient`.
///
/// Acts as the SDK boundary adapter: converts `DomainError` into `InfosError`.
#[derive(Clone)]
pub struct InfosLocalClient {
    service: Arc<Service>,
}

impl InfosLocalClient {
    #[must_use]
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl InfosClient for InfosLocalClient {
    async fn create_info(&self, new_info: NewInfo) -> Result<Info, InfosError> {
        self.service
            .create_info(new_info)
            .await
            .map_err(InfosError::from)
    }

    async fn get_info(&self, id: i64) -> Result<Info, InfosError> {
        self.service.get_info(id).await.map_err(InfosError::from)
    }

    async fn list_infos(&self, filter: InfoFilter) -> Result<Vec<Info>, InfosError> {
        self.service
            .list_infos(&filter)
            .await
            .map_err(InfosError::from)
    }

    async fn replace_info(&self, info: Info) -> Result<(), InfosError> {
        self.service
            .replace_info(info)
            .await
            .map_err(InfosError::from)
    }

    async fn update_info(&self, id: i64, patch: InfoPatch) -> Result<(), InfosError> {
        self.service
            .update_info(id, patch)
            .await
            .map_err(InfosError::from)
    }

    async fn delete_info(&self, id: i64) -> Result<(), InfosError> {
        self.service.delete_info(id).await.map_err(InfosError::from)
    }

    async fn count_infos(&self, filter: Option<WhereNode>) -> Result<u64, InfosError> {
        self.service
            .count_infos(filter.as_ref())
            .await
            .map_err(InfosError::from)
    }

    async fn update_all_infos(
        &self,
        patch: InfoPatch,
        filter: Option<WhereNode>,
    ) -> Result<u64, InfosError> {
        self.service
            .update_all_infos(patch, filter.as_ref())
            .await
            .map_err(InfosError::from)
    }
}
