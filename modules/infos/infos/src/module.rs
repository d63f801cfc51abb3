use std::sync::Arc;

use axum::Router;
use infos_sdk::InfosClient;
use tracing::{debug, info, warn};

use crate::api::rest::query::KeyGuard;
use crate::api::rest::routes;
use crate::config::InfosConfig;
use crate::domain::local_client::InfosLocalClient;
use crate::domain::ports::GeocoderPort;
use crate::domain::repo::InfosRepository;
use crate::domain::service::{MAX_PAGE_VALUE, Service, ServiceConfig};
use crate::infra::geocoding::CensusGeocoder;
use crate::infra::storage::connect_repository;

/// Composition root of the infos module: storage, geocoder, service, REST
/// router and the in-process client.
#[derive(Clone)]
pub struct InfosModule {
    service: Arc<Service>,
    guard: Arc<KeyGuard>,
}

impl InfosModule {
    /// Build the module from configuration: connects (and migrates) the
    /// storage backend and prepares the Census geocoder.
    ///
    /// # Errors
    /// Fails when storage cannot be reached or migrated, or when the
    /// geocoder settings are invalid.
    pub async fn init(cfg: &InfosConfig) -> anyhow::Result<Self> {
        info!("Initializing infos module");
        debug!(
            backend = ?cfg.storage.backend,
            max_limit = cfg.filter.max_limit,
            "Loaded infos config"
        );

        let repo = connect_repository(&cfg.storage).await?;
        let geocoder: Arc<dyn GeocoderPort> = Arc::new(CensusGeocoder::new(&cfg.geocoder)?);
        let module = Self::from_parts(repo, geocoder, cfg);

        info!("Infos module initialized");
        Ok(module)
    }

    /// Assemble the module from ready-made adapters.
    #[must_use]
    pub fn from_parts(
        repo: Arc<dyn InfosRepository>,
        geocoder: Arc<dyn GeocoderPort>,
        cfg: &InfosConfig,
    ) -> Self {
        if cfg.filter.max_limit > MAX_PAGE_VALUE {
            warn!(
                configured = cfg.filter.max_limit,
                cap = MAX_PAGE_VALUE,
                "filter.max_limit is too large, capping"
            );
        }
        let service_config = ServiceConfig {
            max_limit: cfg.filter.max_limit.min(MAX_PAGE_VALUE),
        };
        Self {
            service: Arc::new(Service::new(repo, geocoder, service_config)),
            guard: Arc::new(KeyGuard::new(&cfg.filter.prohibited_keys)),
        }
    }

    /// Router serving the `/infos` REST API.
    #[must_use]
    pub fn router(&self) -> Router {
        routes::register_routes(Router::new(), self.service.clone(), self.guard.clone())
    }

    /// Object-safe client for in-process consumers.
    #[must_use]
    pub fn client(&self) -> Arc<dyn InfosClient> {
        Arc::new(InfosLocalClient::new(self.service.clone()))
    }

    #[must_use]
    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }
}
