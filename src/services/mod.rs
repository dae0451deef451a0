//! Business logic services

pub mod auth;
pub mod imports;
pub mod visits;

use std::sync::Arc;

use crate::{
    config::AuthConfig,
    repository::{Repository, VisitsStore},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub visits: visits::VisitsService,
    pub imports: imports::ImportService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        let store: Arc<dyn VisitsStore> = Arc::new(repository.clone());
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            visits: visits::VisitsService::new(store.clone()),
            imports: imports::ImportService::new(store),
            repository,
        }
    }
}
