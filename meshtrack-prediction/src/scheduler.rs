//! Periodic reprojection: on every tick, prune idle peers and recompute the
//! rest so predictions stay current between samples.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::batch::CancelToken;
use crate::engine::PredictionEngine;

/// Spawn the reprojection loop on the current tokio runtime, ticking at
/// [`PredictionEngine::reprojection_interval`].
///
/// The batch itself runs on the blocking pool. Setting `shutdown` to `true`
/// (or dropping its sender) cancels an in-flight batch and ends the loop;
/// other updates to the watch are ignored.
pub fn spawn_reprojection(
    engine: Arc<PredictionEngine>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let period = engine.reprojection_interval();
    tokio::spawn(async move {
        info!(period_ms = period.as_millis() as u64, "reprojection task started");
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        'run: loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if shutdown_requested(changed, &shutdown) {
                        break 'run;
                    }
                }
                _ = ticker.tick() => {
                    let cancel = CancelToken::new();
                    let batch_engine = Arc::clone(&engine);
                    let batch_cancel = cancel.clone();
                    let mut batch = tokio::task::spawn_blocking(move || {
                        let now = Utc::now();
                        batch_engine.prune(now);
                        batch_engine.recompute_all(now, &batch_cancel)
                    });

                    loop {
                        tokio::select! {
                            result = &mut batch => {
                                match result {
                                    Ok(outcome) => debug!(
                                        recomputed = outcome.recomputed,
                                        total = outcome.total,
                                        "reprojection tick"
                                    ),
                                    Err(err) => warn!(error = %err, "reprojection batch failed"),
                                }
                                break;
                            }
                            changed = shutdown.changed() => {
                                if shutdown_requested(changed, &shutdown) {
                                    cancel.cancel();
                                    let _ = batch.await;
                                    break 'run;
                                }
                            }
                        }
                    }
                }
            }
        }
        info!("reprojection task stopped");
    })
}

fn shutdown_requested(
    changed: Result<(), watch::error::RecvError>,
    shutdown: &watch::Receiver<bool>,
) -> bool {
    changed.is_err() || *shutdown.borrow()
}
