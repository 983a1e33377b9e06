use crowd_core::{Alert, SafetyActionsSnapshot};
use crowd_telemetry::{SubscriptionId, TelemetryStore, TelemetryUpdate};
use prometheus::{
    Encoder, Gauge, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
    #[error("metrics output is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

pub struct DashboardMetrics {
    registry: Registry,
    pub risk_level: IntGauge,
    pub detections: IntGauge,
    pub confidence: Gauge,
    pub live_connected: IntGauge,
    pub ticks_total: IntCounter,
    pub alerts_total: IntCounterVec,
    pub resources: IntGaugeVec,
}

impl DashboardMetrics {
    /// Registers every collector on a private registry so several instances
    /// can coexist in one process.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let risk_level = IntGauge::new(
            "crowd_risk_level",
            "Current risk level index (0=good .. 3=stampede)",
        )?;
        let detections = IntGauge::new("crowd_detections", "Persons detected on the latest tick")?;
        let confidence = Gauge::new(
            "crowd_risk_confidence",
            "Confidence of the current risk assessment",
        )?;
        let live_connected = IntGauge::new(
            "crowd_live_connected",
            "1 while the analysis feed is live",
        )?;
        let ticks_total = IntCounter::new("crowd_ticks_total", "Telemetry snapshots published")?;
        let alerts_total = IntCounterVec::new(
            Opts::new("crowd_alerts_total", "Alerts raised on the dashboard"),
            &["type"],
        )?;
        let resources = IntGaugeVec::new(
            Opts::new("crowd_resources", "Field resources by kind and status"),
            &["kind", "status"],
        )?;

        registry.register(Box::new(risk_level.clone()))?;
        registry.register(Box::new(detections.clone()))?;
        registry.register(Box::new(confidence.clone()))?;
        registry.register(Box::new(live_connected.clone()))?;
        registry.register(Box::new(ticks_total.clone()))?;
        registry.register(Box::new(alerts_total.clone()))?;
        registry.register(Box::new(resources.clone()))?;

        Ok(Self {
            registry,
            risk_level,
            detections,
            confidence,
            live_connected,
            ticks_total,
            alerts_total,
            resources,
        })
    }

    pub fn observe_update(&self, update: &TelemetryUpdate) {
        match update {
            TelemetryUpdate::Snapshot { risk, actions, .. } => {
                self.risk_level.set(risk.level().index() as i64);
                self.detections.set(i64::from(risk.detections));
                self.confidence.set(risk.current.confidence);
                self.ticks_total.inc();
                self.observe_resources(actions);
            }
            TelemetryUpdate::Connectivity(live) => {
                self.live_connected.set(i64::from(*live));
            }
        }
    }

    pub fn observe_alert(&self, alert: &Alert) {
        self.alerts_total
            .with_label_values(&[alert.kind.as_str()])
            .inc();
    }

    fn observe_resources(&self, actions: &SafetyActionsSnapshot) {
        // Statuses change wholesale per tick; stale label pairs must not linger.
        self.resources.reset();
        for officer in &actions.officers {
            self.resources
                .with_label_values(&["officer", officer.status.as_str()])
                .inc();
        }
        for barricade in &actions.barricades {
            self.resources
                .with_label_values(&["barricade", barricade.status.as_str()])
                .inc();
        }
        for unit in &actions.medical {
            self.resources
                .with_label_values(&["medical", unit.status.as_str()])
                .inc();
        }
    }

    /// Subscribes these metrics to `store`.
    pub fn attach(self: &Arc<Self>, store: &TelemetryStore) -> SubscriptionId {
        let metrics = Arc::clone(self);
        store.subscribe(move |update| metrics.observe_update(update))
    }

    /// Prometheus text exposition of every registered collector.
    pub fn render(&self) -> Result<String, MetricsError> {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            warn!("metrics encoding failed: {e}");
            return Err(e.into());
        }
        Ok(String::from_utf8(buf)?)
    }
}
