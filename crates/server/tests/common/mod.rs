//! # Common Test Utilities
//!
//! `TestApp` spawns a real server on a random port around a caller-built
//! `AppState`, so each test picks its own catalog and storage.

// Not every test file uses every helper.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use reqwest::Client;
use slotql::Storage;
use slotql_server::{config::AppConfig, router, state::AppState};
use slotql_test_utils::{fixture_engine, MockStorage, FIXTURE_TABLE_REF};
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, task::JoinHandle};

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub app_state: AppState,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns a server over the fixture engine with no storage configured.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_state(AppState::new(test_config(), fixture_engine(), None)).await
    }

    /// Spawns a server over the fixture engine backed by `storage`.
    pub async fn spawn_with_storage(storage: MockStorage) -> Result<Self> {
        let storage: Arc<dyn Storage> = Arc::new(storage);
        Self::spawn_with_state(AppState::new(test_config(), fixture_engine(), Some(storage))).await
    }

    pub async fn spawn_with_state(app_state: AppState) -> Result<Self> {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .with_test_writer()
            .try_init();

        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Ok(Self {
            address,
            client: Client::new(),
            app_state: app_state_for_harness,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// A configuration matching the fixture engine, loaded from no file.
pub fn test_config() -> AppConfig {
    let mut config: AppConfig =
        serde_json::from_str("{}").expect("defaults must deserialize from an empty object");
    config.engine.table_ref = FIXTURE_TABLE_REF.to_string();
    config.engine.categories = vec!["gold".to_string(), "silver".to_string()];
    config
}
