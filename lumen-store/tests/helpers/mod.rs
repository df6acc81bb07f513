//! Test Helper Utilities
//!
//! Shared utilities for testing lumen-store

#![allow(dead_code)]

pub mod scripted_transport;

pub use scripted_transport::ScriptedTransport;

use lumen_common::config::StoreConfig;
use lumen_store::{
    ApiClient, Lumen, MemoryCredentialStore, Normalizer, RecordingSleeper, RetryPolicy, RootStore,
};
use std::sync::Arc;
use std::time::Duration;

pub const ASSET_BASE: &str = "http://assets.test/";

/// App context over a scripted transport, in-memory credentials and a
/// recording sleeper
pub struct TestApp {
    pub app: Lumen,
    pub transport: Arc<ScriptedTransport>,
    pub credentials: Arc<MemoryCredentialStore>,
    pub sleeper: RecordingSleeper,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store_config(&StoreConfig::default())
    }

    pub fn with_store_config(config: &StoreConfig) -> Self {
        init_test_logging();

        let transport = Arc::new(ScriptedTransport::new());
        let credentials = Arc::new(MemoryCredentialStore::new());
        let sleeper = RecordingSleeper::new();
        let retry = RetryPolicy::new(3, Duration::from_millis(1000), Duration::from_millis(10_000))
            .with_sleeper(Arc::new(sleeper.clone()));

        let app = Lumen::new(
            RootStore::new(config),
            ApiClient::new(transport.clone()),
            Normalizer::new(ASSET_BASE).unwrap(),
            retry,
            credentials.clone(),
        );

        Self {
            app,
            transport,
            credentials,
            sleeper,
        }
    }

    pub fn store(&self) -> &RootStore {
        self.app.store()
    }
}

/// Route test output through the libtest writer; repeated calls are no-ops
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
