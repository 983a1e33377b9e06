use crowd_core::{Alert, AlertFeed, AlertPolicy, VideoFile};
use crowd_metrics::DashboardMetrics;
use crowd_telemetry::{AnalysisContext, OverlayFrame, SubscriptionId, TelemetryUpdate, VideoOverlay};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Everything one visit to the dashboard owns: the analysis run, the alert
/// list derived from it and the decorative video timer. Closing the session
/// releases all three.
pub struct DashboardSession {
    id: Uuid,
    file: VideoFile,
    run_id: u64,
    alerts: Arc<Mutex<AlertFeed>>,
    subscription: SubscriptionId,
    overlay: VideoOverlay,
}

impl DashboardSession {
    /// Subscribes the alert feed, starts the generator and the overlay timer.
    /// On failure nothing is left registered.
    pub fn open(
        ctx: &AnalysisContext,
        metrics: &Arc<DashboardMetrics>,
        file: VideoFile,
        policy: AlertPolicy,
        overlay_interval: Duration,
    ) -> Result<Self, crowd_telemetry::TelemetryError> {
        let alerts = Arc::new(Mutex::new(AlertFeed::new(policy)));
        let subscription = {
            let alerts = Arc::clone(&alerts);
            let metrics = Arc::clone(metrics);
            ctx.store().subscribe(move |update| {
                if let TelemetryUpdate::Snapshot { risk, .. } = update {
                    let mut feed = lock(&alerts);
                    if let Some(alert) = feed.observe(risk.level(), chrono::Utc::now()) {
                        debug!("alert #{} raised: {}", alert.id, alert.kind);
                        metrics.observe_alert(alert);
                    }
                }
            })
        };

        let run_id = match ctx.start_analysis(&file) {
            Ok(run_id) => run_id,
            Err(e) => {
                ctx.store().unsubscribe(subscription);
                return Err(e);
            }
        };

        let overlay = VideoOverlay::new();
        overlay.start(ctx.scheduler().as_ref(), overlay_interval);

        let id = Uuid::new_v4();
        info!("session {id} opened for {:?} (run {run_id})", file.name);
        Ok(Self {
            id,
            file,
            run_id,
            alerts,
            subscription,
            overlay,
        })
    }

    /// Stops the run and cancels every timer the session registered.
    pub fn close(self, ctx: &AnalysisContext) {
        ctx.stop_analysis();
        self.overlay.stop();
        ctx.store().unsubscribe(self.subscription);
        info!("session {} closed (run {})", self.id, self.run_id);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn file(&self) -> &VideoFile {
        &self.file
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Newest first.
    pub fn alerts(&self) -> Vec<Alert> {
        lock(&self.alerts).to_vec()
    }

    pub fn frame(&self) -> OverlayFrame {
        self.overlay.frame()
    }

    pub fn toggle_playback(&self) -> bool {
        self.overlay.toggle_playback()
    }

    pub fn overlay_running(&self) -> bool {
        self.overlay.is_running()
    }
}
