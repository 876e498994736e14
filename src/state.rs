//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::{config::Config, db::DbPool, services::chat_hub::ChatHub};

/// State extracted by handlers via `State<AppState>`.
///
/// Cloning is cheap: the pool and hub are reference counted.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub chat: ChatHub,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> Self {
        Self {
            pool,
            chat: ChatHub::new(config.chat_channel_capacity),
            config: Arc::new(config),
        }
    }
}
