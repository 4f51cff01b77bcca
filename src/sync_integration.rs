use crate::connectivity::ConnectivityMonitor;
use crate::engine::SyncEngine;
use crate::error::{KeepsakeError, Result};
use crate::model::DrainReport;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Integration wrapper tying the sync engine to the connectivity signal.
///
/// Owns the background task that drains the queue opportunistically on every
/// reconnect, and exposes a manual trigger for a UI "retry now" action. The
/// engine's single-flight guard makes overlapping triggers harmless.
pub struct SyncIntegration {
    engine: Arc<SyncEngine>,
    monitor: RwLock<Option<ConnectivityMonitor>>,
    running: Arc<RwLock<bool>>,
    stats: Arc<RwLock<SyncIntegrationStats>>,
    shutdown: CancellationToken,
}

/// Cumulative statistics across all drain passes
#[derive(Debug, Clone, Default)]
pub struct SyncIntegrationStats {
    pub start_time: Option<SystemTime>,
    pub total_drains: u64,
    pub total_processed: u64,
    pub total_failed: u64,
    pub last_report: Option<DrainReport>,
}

/// Builder for SyncIntegration
pub struct SyncIntegrationBuilder {
    engine: Option<Arc<SyncEngine>>,
    monitor: Option<ConnectivityMonitor>,
}

impl SyncIntegrationBuilder {
    pub fn new() -> Self {
        Self {
            engine: None,
            monitor: None,
        }
    }

    pub fn with_engine(mut self, engine: Arc<SyncEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn with_connectivity(mut self, monitor: ConnectivityMonitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn build(self) -> Result<SyncIntegration> {
        let engine = self.engine.ok_or_else(|| {
            KeepsakeError::component("sync_integration", "Sync engine is required")
        })?;

        let monitor = self.monitor.ok_or_else(|| {
            KeepsakeError::component("sync_integration", "Connectivity monitor is required")
        })?;

        Ok(SyncIntegration {
            engine,
            monitor: RwLock::new(Some(monitor)),
            running: Arc::new(RwLock::new(false)),
            stats: Arc::new(RwLock::new(SyncIntegrationStats::default())),
            shutdown: CancellationToken::new(),
        })
    }
}

impl Default for SyncIntegrationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncIntegration {
    pub fn builder() -> SyncIntegrationBuilder {
        SyncIntegrationBuilder::new()
    }

    /// Start the background reconnect listener.
    ///
    /// Drains immediately if connectivity is already present, then once per
    /// disconnected-to-connected edge until stopped.
    pub async fn start(&self) -> Result<()> {
        {
            let mut running = self.running.write().await;
            if *running {
                return Err(KeepsakeError::component(
                    "sync_integration",
                    "Already running",
                ));
            }
            *running = true;
        }

        {
            let mut stats = self.stats.write().await;
            stats.start_time = Some(SystemTime::now());
        }

        let monitor = self.monitor.write().await.take();
        let mut monitor = match monitor {
            Some(monitor) => monitor,
            None => {
                *self.running.write().await = false;
                return Err(KeepsakeError::component(
                    "sync_integration",
                    "Listener was already started once",
                ));
            }
        };

        info!("Starting sync integration");

        let engine = Arc::clone(&self.engine);
        let stats = Arc::clone(&self.stats);
        let running = Arc::clone(&self.running);
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            if monitor.is_connected() {
                debug!("Already connected on start; draining queue");
                let report = engine.drain().await;
                Self::record_report(&stats, report).await;
            }

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        debug!("Sync integration listener shutting down");
                        break;
                    }
                    edge = monitor.wait_for_reconnect() => {
                        match edge {
                            Some(()) => {
                                let report = engine.drain().await;
                                Self::record_report(&stats, report).await;
                            }
                            None => {
                                warn!("Connectivity signal dropped; stopping listener");
                                break;
                            }
                        }
                    }
                }
            }

            *running.write().await = false;
        });

        info!("Sync integration started");
        Ok(())
    }

    /// Manual drain trigger (e.g. a "retry now" button). Coalesces into a
    /// no-op if a drain is already in flight.
    pub async fn drain_now(&self) -> DrainReport {
        let report = self.engine.drain().await;
        Self::record_report(&self.stats, report).await;
        report
    }

    async fn record_report(stats: &Arc<RwLock<SyncIntegrationStats>>, report: DrainReport) {
        let mut stats = stats.write().await;
        stats.total_drains += 1;
        stats.total_processed += report.processed as u64;
        stats.total_failed += report.failed as u64;
        stats.last_report = Some(report);
    }

    pub async fn stats(&self) -> SyncIntegrationStats {
        self.stats.read().await.clone()
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Stop the background listener. Idempotent.
    pub async fn stop(&self) {
        if !self.is_running().await {
            return;
        }
        info!("Stopping sync integration");
        self.shutdown.cancel();
    }
}
