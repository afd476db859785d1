use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::gateway::Gateway;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
    pub dashboard: Arc<Mutex<Dashboard>>,
}

impl AppState {
    pub fn new(gateway: Gateway, dashboard: Dashboard) -> Self {
        Self {
            gateway,
            dashboard: Arc::new(Mutex::new(dashboard)),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Gateway::from_config(config),
            Dashboard::new(config.delete_password.clone()),
        )
    }
}
