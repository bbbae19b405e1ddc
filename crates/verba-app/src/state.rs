use std::sync::Arc;

use tokio::sync::RwLock;

use verba_config::Config;
use verba_services::ServiceRegistry;

use crate::select::PendingSelections;
use crate::session::Sessions;

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub sessions: Sessions,
    pub registry: ServiceRegistry,
    pub pending: Arc<PendingSelections>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let registry = ServiceRegistry::new(config.services.clone());
        Self {
            config: Arc::new(RwLock::new(config)),
            sessions: Sessions::new(),
            registry,
            pending: Arc::new(PendingSelections::new()),
        }
    }
}
