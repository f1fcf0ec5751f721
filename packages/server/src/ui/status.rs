//! Periodic status log line.

use std::{sync::Arc, time::Duration};

use tokio::{runtime::Handle, task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use crate::relay::Room;

/// How often the status line is logged.
pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Spawn the status reporter. It logs once immediately, then every `period`,
/// until `cancel` fires. Await the handle to make sure it has stopped.
pub fn spawn_status_reporter(
    room: Arc<Room>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    tracing::info!(
                        "Sessions: {}, Tasks: {}",
                        room.session_count(),
                        live_task_count()
                    );
                }
            }
        }
        tracing::debug!("Status reporter stopped");
    })
}

/// Number of tasks alive on the current runtime, 0 outside a runtime.
pub fn live_task_count() -> usize {
    Handle::try_current()
        .map(|handle| handle.metrics().num_alive_tasks())
        .unwrap_or(0)
}
