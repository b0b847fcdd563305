use std::sync::Arc;

use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::UsersInfoConfig;
use crate::contract::client::UsersInfoApi;
use crate::domain::repo::UsersRepository;
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::UsersInfoLocalClient;
use crate::infra::storage::InMemoryUsersRepository;

/// Users module: owns its store and service, hands out the REST router,
/// the OpenAPI document and an in-process client.
#[derive(Clone)]
pub struct UsersInfo {
    service: Arc<Service>,
    config: UsersInfoConfig,
}

impl Default for UsersInfo {
    fn default() -> Self {
        Self::new(UsersInfoConfig::default())
    }
}

impl UsersInfo {
    /// Wire the module on a fresh, empty in-memory store.
    pub fn new(config: UsersInfoConfig) -> Self {
        Self::with_repository(config, Arc::new(InMemoryUsersRepository::new()))
    }

    /// Wire the module on any repository implementation.
    pub fn with_repository(config: UsersInfoConfig, repo: Arc<dyn UsersRepository>) -> Self {
        info!("Initializing users_info module");
        debug!(
            "Loaded users_info config: default_limit={}, max_limit={:?}, enforce_unique_ids={}, expose_debug_routes={}",
            config.default_limit,
            config.max_limit,
            config.enforce_unique_ids,
            config.expose_debug_routes
        );

        let service_config = ServiceConfig {
            default_limit: config.default_limit,
            max_limit: config.max_limit,
            enforce_unique_ids: config.enforce_unique_ids,
        };
        let service = Arc::new(Service::new(repo, service_config));
        Self { service, config }
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// Local in-process client over the same service.
    pub fn client(&self) -> Arc<dyn UsersInfoApi> {
        Arc::new(UsersInfoLocalClient::new(self.service.clone()))
    }

    pub fn router(&self) -> axum::Router {
        info!("Registering users_info REST routes");
        routes::register_routes(
            axum::Router::new(),
            self.service.clone(),
            self.config.expose_debug_routes,
        )
    }

    pub fn openapi(&self) -> utoipa::openapi::OpenApi {
        routes::openapi(self.config.expose_debug_routes)
    }
}
