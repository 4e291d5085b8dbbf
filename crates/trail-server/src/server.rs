use std::sync::Arc;

use tokio::net::TcpListener;
use trail_store::{LedgerStore, SqliteLedgerStore};

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::router::build_router;
use crate::state::AppState;

/// The datatrail composition root.
///
/// Owns the store lifecycle: opened here at startup, closed when serving
/// ends. Handlers receive the store through [`AppState`], never through
/// process-global state.
pub struct TrailServer {
    config: ServerConfig,
}

impl TrailServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build a router over an already-open store (useful for testing).
    pub fn router(store: Arc<dyn LedgerStore>) -> axum::Router {
        build_router(AppState::new(store))
    }

    /// Open the store, bind, and serve requests until the task is stopped.
    pub async fn serve(self) -> ServerResult<()> {
        let store = Arc::new(SqliteLedgerStore::open(&self.config.db_path).await?);
        let app = Self::router(Arc::clone(&store) as Arc<dyn LedgerStore>);

        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            db = %self.config.db_path.display(),
            "datatrail server listening"
        );
        let result = axum::serve(listener, app).await;
        store.close().await;
        Ok(result?)
    }
}
