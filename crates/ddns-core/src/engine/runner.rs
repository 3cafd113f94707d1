//! Run loop around the engine
//!
//! A cycle is: resolve the public IP, verify provider access (first cycle
//! only), reconcile. [`RunMode::Once`] runs one cycle. [`RunMode::Repeat`]
//! runs a cycle immediately and then once per interval until shutdown. The
//! interval is measured between cycle starts.
//!
//! In repeat mode a failed cycle is logged and the loop keeps going, unless
//! the error is fatal ([`crate::Error::is_fatal`]), which ends the loop. The idle
//! wait between cycles is interrupted as soon as the shutdown signal fires.
//! A cycle that is already running is never interrupted.

use super::{DdnsEngine, ReconcileReport};
use crate::error::Result;
use crate::resolver::IpResolver;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

/// How often reconciliation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Run one cycle and return
    Once,
    /// Run a cycle now and then every `interval` until shutdown
    Repeat {
        interval: Duration,
    },
}

/// Totals over all cycles of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Cycles that completed
    pub cycles: usize,
    /// Cycles that ended with a non-fatal error
    pub failed_cycles: usize,
    /// Changes made over all completed cycles
    pub changes: usize,
}

impl RunSummary {
    fn record(&mut self, report: &ReconcileReport) {
        self.cycles += 1;
        self.changes += report.changes.len();
    }
}

/// Drives the resolver and the engine according to a [`RunMode`]
pub struct Runner {
    resolver: IpResolver,
    engine: DdnsEngine,
    mode: RunMode,
}

impl Runner {
    pub fn new(resolver: IpResolver, engine: DdnsEngine, mode: RunMode) -> Self {
        Self {
            resolver,
            engine,
            mode,
        }
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Run until done (once mode) or until `shutdown` fires (repeat mode)
    ///
    /// Dropping the sender half of `shutdown` counts as a shutdown signal.
    pub async fn run_with_shutdown(&self, shutdown: oneshot::Receiver<()>) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut verified = false;

        let interval = match self.mode {
            RunMode::Once => {
                let report = self.cycle(&mut verified).await?;
                summary.record(&report);
                return Ok(summary);
            }
            RunMode::Repeat { interval } => interval,
        };

        info!("Running every {:?}", interval);
        let mut shutdown = shutdown;

        // Period runs from cycle start to cycle start
        let mut ticker = time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            match self.cycle(&mut verified).await {
                Ok(report) => summary.record(&report),
                Err(e) if e.is_fatal() => {
                    error!("Fatal error, stopping: {}", e);
                    return Err(e);
                }
                Err(e) => {
                    error!("Reconciliation cycle failed: {}", e);
                    summary.failed_cycles += 1;
                }
            }

            debug!("Waiting for the next tick");
            tokio::select! {
                _ = ticker.tick() => {}
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        info!(
            "Stopped after {} cycle(s), {} failed, {} change(s)",
            summary.cycles, summary.failed_cycles, summary.changes
        );
        Ok(summary)
    }

    async fn cycle(&self, verified: &mut bool) -> Result<ReconcileReport> {
        let ip = self.resolver.resolve().await?;

        if !*verified {
            let provider = self.engine.provider();
            provider.verify_access().await?;
            info!("{} access verified", provider.provider_name());
            *verified = true;
        }

        self.engine.reconcile(ip).await
    }
}
