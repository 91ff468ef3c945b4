pub mod clock;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod playback;
pub mod routes;

use crate::chart::ChartFrame;
use dashboard::Dashboard;
use db::DatabaseCtx;
use error::ApiError;
use tokio::sync::broadcast;

use std::sync::{Arc, Mutex, MutexGuard};

// Frames a slow WebSocket client may fall behind by before it starts skipping.
const FRAME_BACKLOG: usize = 256;

#[derive(Clone)]
pub struct AppState {
    dashboard: Arc<Mutex<Dashboard>>,
    pub db: Arc<DatabaseCtx>,
    pub frames: broadcast::Sender<ChartFrame>,
}

impl AppState {
    pub fn new(dashboard: Dashboard, db: DatabaseCtx) -> Self {
        let (frames, _) = broadcast::channel(FRAME_BACKLOG);

        Self {
            dashboard: Arc::new(Mutex::new(dashboard)),
            db: Arc::new(db),
            frames,
        }
    }

    /// Never hold this across an `.await`.
    pub fn dashboard(&self) -> Result<MutexGuard<'_, Dashboard>, ApiError> {
        self.dashboard.lock().map_err(|_| ApiError::Poisoned)
    }
}
