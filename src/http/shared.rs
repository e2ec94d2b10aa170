//! Process-wide client handle
//!
//! The MCP server must be able to start and list tools before the controller
//! is reachable, so the client is built on first use and then shared.

use super::client::UnifiClient;
use crate::config::UnifiConfig;
use crate::error::Result;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Lazily constructed `UnifiClient`
#[derive(Debug)]
pub struct SharedClient {
    config: UnifiConfig,
    client: OnceCell<Arc<UnifiClient>>,
}

impl SharedClient {
    /// Store the configuration; nothing is built yet
    pub fn new(config: UnifiConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    /// The configuration the client is (or will be) built from
    pub fn config(&self) -> &UnifiConfig {
        &self.config
    }

    /// Build the client on first access and return the same handle afterwards
    pub fn client(&self) -> Result<Arc<UnifiClient>> {
        self.client
            .get_or_try_init(|| UnifiClient::new(&self.config).map(Arc::new))
            .cloned()
    }

    /// The client, if it was already built
    pub fn get(&self) -> Option<&Arc<UnifiClient>> {
        self.client.get()
    }

    /// Log out if a client was ever built
    pub async fn close(&self) {
        if let Some(client) = self.client.get() {
            client.close().await;
        }
    }
}
