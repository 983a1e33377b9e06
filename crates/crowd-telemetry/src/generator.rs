use crate::error::TelemetryError;
use crate::scheduler::{lock, Scheduler, TimerToken};
use crate::store::TelemetryStore;
use crowd_core::{GeoPoint, RiskLevel, RiskSnapshot, SafetyActionsSnapshot, VideoFile};
use tracing::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

/// Where and how many of one resource kind to scatter per tick.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResourceLayout {
    pub count: usize,
    pub anchor: GeoPoint,
    /// Full width of the square jitter window, in degrees.
    pub spread: f64,
}

impl ResourceLayout {
    fn scatter<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<GeoPoint> {
        (0..self.count)
            .map(|_| {
                let d_lat = (rng.gen::<f64>() - 0.5) * self.spread;
                let d_lon = (rng.gen::<f64>() - 0.5) * self.spread;
                self.anchor.offset(d_lat, d_lon)
            })
            .collect()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeneratorConfig {
    pub tick_interval: Duration,
    pub demo_duration: Duration,
    pub detections: Range<u32>,
    pub officers: ResourceLayout,
    pub barricades: ResourceLayout,
    pub medical: ResourceLayout,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(2_000),
            demo_duration: Duration::from_millis(30_000),
            detections: 50..250,
            officers: ResourceLayout {
                count: 5,
                anchor: GeoPoint::VENUE,
                spread: 0.01,
            },
            barricades: ResourceLayout {
                count: 3,
                anchor: GeoPoint::new(28.6145, 77.2095),
                spread: 0.008,
            },
            medical: ResourceLayout {
                count: 2,
                anchor: GeoPoint::new(28.6142, 77.2088),
                spread: 0.006,
            },
        }
    }
}

/// Draws one synthetic risk snapshot.
///
/// The current level is uniform over the table. The 10-minute outlook steps
/// zero or one level upward and saturates at stampede; the 30-minute outlook
/// is drawn independently of the current level.
pub fn generate_risk<R: Rng + ?Sized>(rng: &mut R, detections: Range<u32>) -> RiskSnapshot {
    let current = RiskLevel::ALL[rng.gen_range(0..RiskLevel::ALL.len())];
    let detections = if detections.is_empty() {
        detections.start
    } else {
        rng.gen_range(detections)
    };
    let drift = rng.gen_range(0..=1usize);
    let next_10_min = RiskLevel::from_index_saturating(current.index() + drift);
    let next_30_min = RiskLevel::ALL[rng.gen_range(0..RiskLevel::ALL.len())];
    RiskSnapshot::new(current, detections, next_10_min, next_30_min)
}

pub fn generate_safety_actions<R: Rng + ?Sized>(
    rng: &mut R,
    level: RiskLevel,
    config: &GeneratorConfig,
) -> SafetyActionsSnapshot {
    let officers = config.officers.scatter(rng);
    let barricades = config.barricades.scatter(rng);
    let medical = config.medical.scatter(rng);
    SafetyActionsSnapshot::for_level(level, officers, barricades, medical)
}

struct ActiveRun {
    id: u64,
    file: VideoFile,
    tick: TimerToken,
    auto_stop: TimerToken,
    ticks: u64,
}

#[derive(Default)]
struct RunState {
    active: Option<ActiveRun>,
    next_id: u64,
}

struct GeneratorInner {
    config: GeneratorConfig,
    store: TelemetryStore,
    scheduler: Arc<dyn Scheduler>,
    rng: Mutex<StdRng>,
    run: Mutex<RunState>,
}

/// Simulated analysis feed. Publishes into a [`TelemetryStore`] on a timer
/// and stops itself once the demo duration elapses.
#[derive(Clone)]
pub struct TelemetryGenerator {
    inner: Arc<GeneratorInner>,
}

impl TelemetryGenerator {
    pub fn new(
        store: TelemetryStore,
        scheduler: Arc<dyn Scheduler>,
        config: GeneratorConfig,
    ) -> Self {
        Self::with_rng(store, scheduler, config, StdRng::from_entropy())
    }

    pub fn with_rng(
        store: TelemetryStore,
        scheduler: Arc<dyn Scheduler>,
        config: GeneratorConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            inner: Arc::new(GeneratorInner {
                config,
                store,
                scheduler,
                rng: Mutex::new(rng),
                run: Mutex::new(RunState::default()),
            }),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.inner.config
    }

    /// Begins a run for `file`. A second call while running is rejected and
    /// leaves the existing timers untouched.
    pub fn start(&self, file: &VideoFile) -> Result<u64, TelemetryError> {
        let inner = &self.inner;
        let mut run = lock(&inner.run);
        if let Some(active) = &run.active {
            return Err(TelemetryError::AlreadyRunning {
                file: active.file.name.clone(),
            });
        }

        run.next_id += 1;
        let run_id = run.next_id;
        let connected = inner.store.set_connected(true);

        let weak: Weak<GeneratorInner> = Arc::downgrade(inner);
        let tick = inner.scheduler.schedule_every(
            inner.config.tick_interval,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.tick(run_id);
                }
            }),
        );

        let weak: Weak<GeneratorInner> = Arc::downgrade(inner);
        let auto_stop = inner.scheduler.schedule_once(
            inner.config.demo_duration,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    if inner.finish(Some(run_id)) {
                        info!("analysis run {run_id} reached demo duration, feed stopped");
                    }
                }
            }),
        );

        info!(
            "analysis run {run_id} started for {} ({}, {:.1} MB)",
            file.name,
            file.mime_type,
            file.size_megabytes()
        );
        run.active = Some(ActiveRun {
            id: run_id,
            file: file.clone(),
            tick,
            auto_stop,
            ticks: 0,
        });
        drop(run);

        if let Some(update) = connected {
            inner.store.notify(&update);
        }
        Ok(run_id)
    }

    /// Cancels pending timers and drops connectivity. No-op when idle.
    pub fn stop(&self) {
        if self.inner.finish(None) {
            info!("analysis feed stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.inner.run).active.is_some()
    }

    pub fn current_file(&self) -> Option<VideoFile> {
        lock(&self.inner.run)
            .active
            .as_ref()
            .map(|run| run.file.clone())
    }

    /// Ticks published by the active run, zero when idle.
    pub fn ticks(&self) -> u64 {
        lock(&self.inner.run)
            .active
            .as_ref()
            .map_or(0, |run| run.ticks)
    }
}

impl GeneratorInner {
    fn tick(&self, run_id: u64) {
        // The store is written under the run lock so no snapshot can land
        // after a stop. Listeners are called after the lock is released and
        // may call back into the generator.
        let update = {
            let mut run = lock(&self.run);
            let Some(active) = run.active.as_mut().filter(|a| a.id == run_id) else {
                return;
            };

            let (risk, actions) = {
                let mut rng = lock(&self.rng);
                let risk = generate_risk(&mut *rng, self.config.detections.clone());
                let actions = generate_safety_actions(&mut *rng, risk.level(), &self.config);
                (risk, actions)
            };
            active.ticks += 1;
            debug!(
                "run {run_id} tick {}: level={} detections={}",
                active.ticks,
                risk.level(),
                risk.detections
            );
            self.store.publish(risk, actions)
        };
        self.store.notify(&update);
    }

    /// Ends the active run, restricted to `only` when given. Returns whether a
    /// run was ended.
    fn finish(&self, only: Option<u64>) -> bool {
        let update = {
            let mut run = lock(&self.run);
            let matches = match (&run.active, only) {
                (Some(active), Some(id)) => active.id == id,
                (Some(_), None) => true,
                (None, _) => false,
            };
            if !matches {
                return false;
            }
            if let Some(active) = run.active.take() {
                active.tick.cancel();
                active.auto_stop.cancel();
            }
            self.store.set_connected(false)
        };
        if let Some(update) = update {
            self.store.notify(&update);
        }
        true
    }
}
