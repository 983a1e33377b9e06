use crate::config::ServiceConfig;
use crate::error::ServiceResult;
use crate::session::DashboardSession;
use crowd_core::{Alert, VideoFile};
use crowd_metrics::DashboardMetrics;
use crowd_telemetry::{AnalysisContext, OverlayFrame, Scheduler, TelemetryView};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Shared state behind every request.
pub struct App {
    config: ServiceConfig,
    context: AnalysisContext,
    metrics: Arc<DashboardMetrics>,
    session: Mutex<Option<DashboardSession>>,
}

/// What the dashboard page needs, captured under one lock.
#[derive(Clone, Debug)]
pub struct DashboardState {
    pub session_id: Uuid,
    pub file: VideoFile,
    pub telemetry: TelemetryView,
    pub alerts: Vec<Alert>,
    pub frame: OverlayFrame,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Health {
    pub status: &'static str,
    pub live: bool,
    pub session: Option<String>,
}

impl App {
    pub fn new(config: ServiceConfig, scheduler: Arc<dyn Scheduler>) -> ServiceResult<Self> {
        let context = AnalysisContext::new(scheduler, config.generator_config());
        Self::with_context(config, context)
    }

    /// Builds the app around an existing context, e.g. one with a seeded rng.
    pub fn with_context(config: ServiceConfig, context: AnalysisContext) -> ServiceResult<Self> {
        let metrics = Arc::new(DashboardMetrics::new()?);
        metrics.attach(context.store());
        Ok(Self {
            config,
            context,
            metrics,
            session: Mutex::new(None),
        })
    }

    fn session(&self) -> MutexGuard<'_, Option<DashboardSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn context(&self) -> &AnalysisContext {
        &self.context
    }

    pub fn metrics(&self) -> &DashboardMetrics {
        &self.metrics
    }

    /// Replaces any current session with a fresh one for `file`.
    pub fn begin_session(&self, file: VideoFile) -> ServiceResult<Uuid> {
        let mut slot = self.session();
        if let Some(previous) = slot.take() {
            previous.close(&self.context);
        }
        let session = DashboardSession::open(
            &self.context,
            &self.metrics,
            file,
            self.config.alert_policy,
            self.config.overlay_interval,
        )?;
        let id = session.id();
        *slot = Some(session);
        Ok(id)
    }

    /// Returns whether a session was open.
    pub fn end_session(&self) -> bool {
        let previous = self.session().take();
        match previous {
            Some(session) => {
                session.close(&self.context);
                true
            }
            None => false,
        }
    }

    pub fn has_session(&self) -> bool {
        self.session().is_some()
    }

    /// New playing state, or `None` without a session.
    pub fn toggle_playback(&self) -> Option<bool> {
        self.session().as_ref().map(DashboardSession::toggle_playback)
    }

    pub fn dashboard_state(&self) -> Option<DashboardState> {
        let slot = self.session();
        let session = slot.as_ref()?;
        Some(DashboardState {
            session_id: session.id(),
            file: session.file().clone(),
            telemetry: self.context.view(),
            alerts: session.alerts(),
            frame: session.frame(),
        })
    }

    pub fn health(&self) -> Health {
        Health {
            status: "ok",
            live: self.context.store().is_connected(),
            session: self.session().as_ref().map(|s| s.id().to_string()),
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.end_session();
    }
}
