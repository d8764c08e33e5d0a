use std::sync::Arc;

use tracing::{debug, info};

use crate::api::rest::{error::ErrorPolicy, routes};
use crate::config::UsersConfig;
use crate::contract::client::UsersApi;
use crate::domain::service::Service;
use crate::gateways::local::UsersLocalClient;
use crate::infra::storage::InMemoryUsersRepository;

/// Users module: wires the in-memory store, the domain service, the
/// in-process client and the REST routes together.
#[derive(Clone)]
pub struct UsersModule {
    service: Arc<Service>,
    errors: ErrorPolicy,
}

impl UsersModule {
    /// Build the module with an empty store and the system clock.
    pub fn new(cfg: UsersConfig) -> anyhow::Result<Self> {
        info!("Initializing users module");
        let repo = Arc::new(InMemoryUsersRepository::new());
        Self::with_service(Arc::new(Service::with_system_clock(repo)), cfg)
    }

    /// Build the module around an existing service (custom store or clock).
    pub fn with_service(service: Arc<Service>, cfg: UsersConfig) -> anyhow::Result<Self> {
        let errors = ErrorPolicy::from_config(&cfg)?;
        debug!(
            "Loaded users config: not_found_status={}",
            errors.not_found.as_u16()
        );
        Ok(Self { service, errors })
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// Local in-process client implementation.
    pub fn client(&self) -> Arc<dyn UsersApi> {
        Arc::new(UsersLocalClient::new(self.service.clone()))
    }

    pub fn register_rest(&self, router: axum::Router) -> anyhow::Result<axum::Router> {
        info!("Registering users REST routes");
        let router = routes::register_routes(router, self.service.clone(), self.errors)?;
        info!("Users REST routes registered successfully");
        Ok(router)
    }
}
