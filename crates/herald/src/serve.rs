// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `herald serve` command implementation.
//!
//! Opens storage (running migrations), wires the pipeline components,
//! starts the worker pool and the HTTP API, and runs until SIGINT/SIGTERM,
//! then stops claiming work and drains in-flight invocations.

use std::sync::Arc;
use std::time::Duration;

use herald_config::HeraldConfig;
use herald_core::{Blacklist, DeliveryLog, DispatchQueue, HeraldError, RequestStore};
use herald_dispatch::{install_signal_handler, Intake, Processor, WorkerPool};
use herald_gateway::{GatewayState, ServerConfig};
use herald_provider::HttpSmsProvider;
use herald_storage::{
    Database, SqliteBlacklist, SqliteDeliveryLog, SqliteDispatchQueue, SqliteRequestStore,
};
use tracing::{info, warn};

/// Runs the `herald serve` command.
pub async fn run_serve(config: HeraldConfig) -> Result<(), HeraldError> {
    info!("starting herald serve");

    // Open storage, creating the data directory on first run.
    if let Some(parent) = std::path::Path::new(&config.storage.path).parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| HeraldError::Storage { source: Box::new(e) })?;
    }
    let db = Database::open(&config.storage.path).await?;
    info!(path = %config.storage.path, "storage opened");

    let store: Arc<dyn RequestStore> = Arc::new(SqliteRequestStore::new(db.clone()));
    let blacklist: Arc<dyn Blacklist> =
        Arc::new(SqliteBlacklist::new(db.clone(), config.blacklist.ttl_days));
    let queue: Arc<dyn DispatchQueue> = Arc::new(SqliteDispatchQueue::new(
        db.clone(),
        config.dispatch.max_attempts,
    ));
    let delivery_log: Arc<dyn DeliveryLog> = Arc::new(SqliteDeliveryLog::new(db.clone()));

    let provider = Arc::new(HttpSmsProvider::new(
        config.provider.base_url.clone(),
        config.provider.api_key.clone(),
        Duration::from_secs(config.provider.timeout_secs),
    )?);

    let intake = Arc::new(Intake::new(store.clone(), queue.clone()));
    let processor = Arc::new(Processor::new(
        store.clone(),
        blacklist.clone(),
        provider,
        delivery_log.clone(),
    ));

    let cancel = install_signal_handler();

    let pool = WorkerPool::new(
        queue,
        processor,
        config.dispatch.workers,
        Duration::from_millis(config.dispatch.poll_interval_ms),
    );
    let workers = pool.start(cancel.clone());

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let state = GatewayState {
        intake,
        store,
        blacklist,
        delivery_log,
    };

    // The server runs until the cancellation token fires.
    let server_result = herald_gateway::start_server(&server_config, state, cancel.clone()).await;

    // A server failure (e.g. bind error) also takes the workers down.
    cancel.cancel();
    if let Err(e) = workers.await {
        warn!(error = %e, "worker pool join failed");
    }

    db.close().await?;
    info!("herald stopped");

    server_result
}
