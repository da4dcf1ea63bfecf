use std::sync::Arc;
use crate::config::Config;
use crate::db::Database;
use crate::services::{AuthService, ReportService};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub reports: Arc<ReportService>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires both services onto the same store.
    pub fn new(db: Database, config: Arc<Config>) -> Self {
        AppState {
            auth: Arc::new(AuthService::new(db.clone(), &config)),
            reports: Arc::new(ReportService::new(db)),
            config,
        }
    }
}
