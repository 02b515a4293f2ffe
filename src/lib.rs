pub mod chat;
pub mod config;
pub mod error;
pub mod provider;
pub mod rest;
pub mod storage;
pub mod tasks;

use std::sync::Arc;

use config::Config;
use provider::ModelBackend;
use storage::Storage;

/// Shared application state handed to every request handler.
pub struct AppContext {
    pub config: Arc<Config>,
    pub storage: Arc<Storage>,
    pub model: Arc<dyn ModelBackend>,
    pub started_at: std::time::Instant,
}
