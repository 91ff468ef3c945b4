use crate::server::AppState;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{error, info, trace};

use std::time::Duration;

/// Drives the simulation clock: every `tick`, advance and broadcast whatever
/// the charts now show.
///
/// Runs until the process exits.
pub async fn run(state: AppState, tick: Duration) {
    let mut interval = time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(tick_ms = tick.as_millis() as u64, "playback started");

    let mut last = Instant::now();
    loop {
        let now = interval.tick().await;
        let elapsed = now.saturating_duration_since(last);
        last = now;

        let frames = match state.dashboard() {
            Ok(mut dashboard) => dashboard.tick(elapsed),
            Err(err) => {
                error!(error = %err, "playback stopped");
                return;
            }
        };

        for frame in frames {
            trace!(surface = %frame.surface, revision = frame.revision, "frame");
            // Nobody listening is fine.
            let _ = state.frames.send(frame);
        }
    }
}
