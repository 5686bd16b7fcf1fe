//! Shared server state

use crate::config::Config;
use crate::persistence::TransactionStore;

/// Shared application state for the HTTP service
pub struct AppState {
    pub config: Config,
    pub store: TransactionStore,
}

impl AppState {
    pub fn new(config: Config, store: TransactionStore) -> Self {
        Self { config, store }
    }

    /// Year assumed for SMS timestamps without one
    pub fn default_year(&self) -> Option<i32> {
        self.config.parser.default_year
    }
}
