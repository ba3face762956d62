use std::sync::Arc;
use std::time::Duration;
use wd_core::TaskRegistry;

const SWEEP_INTERVAL_SECS: u64 = 3600;

/// Evicts expired terminal tasks on a fixed interval for the life of the
/// process. Spawned once at startup.
pub async fn run(registry: Arc<TaskRegistry>) {
    let mut interval = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        registry.sweep().await;
    }
}
