// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `reportbin serve` command - Start the HTTP server.
//!
//! Builds the store handle once and hands it to the writer and reader.

use std::net::SocketAddr;
use std::sync::Arc;

use reportbin_core::{
    Config, ConfigLoader, KvStore, MemoryStore, Port, ReportReader, ReportWriter, StoreBackend,
};

use crate::gateway::{self, GatewayState};
use crate::upstash::UpstashStore;

pub async fn execute(
    config_path: Option<&str>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Fail fast on invalid config
    let mut config = match config_path {
        Some(path) => {
            tracing::info!(config = %path, "Loading configuration");
            ConfigLoader::load_file(path)?
        }
        None => ConfigLoader::from_env()?,
    };

    if let Some(port) = port_override {
        config.server.port = Port::new(port)?;
    }

    tracing::info!(
        backend = config.store.name(),
        ttl = %config.reports.ttl,
        "Configuration validated successfully"
    );

    let store = build_store(&config)?;
    let state = GatewayState::new(
        ReportWriter::new(Arc::clone(&store), config.reports.ttl),
        ReportReader::new(store),
    );

    let app = gateway::router(state, config.server.max_body_bytes, config.server.metrics);
    let addr = SocketAddr::new(config.server.bind, config.server.port.value());

    gateway::start_gateway(addr, app)
        .await
        .map_err(|e| e as Box<dyn std::error::Error>)?;

    tracing::info!("Server stopped");
    Ok(())
}

fn build_store(config: &Config) -> Result<Arc<dyn KvStore>, Box<dyn std::error::Error>> {
    match &config.store {
        StoreBackend::Memory { sweep_interval } => {
            tracing::warn!("Using in-memory store; reports do not survive a restart");
            let store = MemoryStore::new_shared();
            // Runs for the life of the process
            store.spawn_sweeper(*sweep_interval);
            Ok(store as Arc<dyn KvStore>)
        }
        StoreBackend::Upstash { url, token } => {
            tracing::info!(endpoint = %url, "Using Upstash REST store");
            let store = UpstashStore::new(url.clone(), token.clone())?;
            Ok(Arc::new(store) as Arc<dyn KvStore>)
        }
    }
}
