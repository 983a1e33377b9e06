use crate::error::TelemetryError;
use crate::generator::{GeneratorConfig, TelemetryGenerator};
use crate::scheduler::Scheduler;
use crate::store::{TelemetryStore, TelemetryView};
use crowd_core::VideoFile;
use rand::rngs::StdRng;
use std::sync::Arc;

/// Application-wide telemetry context handed to the view layer: the store to
/// read from and the entry point that starts an analysis run.
#[derive(Clone)]
pub struct AnalysisContext {
    store: TelemetryStore,
    generator: TelemetryGenerator,
    scheduler: Arc<dyn Scheduler>,
}

impl AnalysisContext {
    pub fn new(scheduler: Arc<dyn Scheduler>, config: GeneratorConfig) -> Self {
        let store = TelemetryStore::new();
        let generator = TelemetryGenerator::new(store.clone(), Arc::clone(&scheduler), config);
        Self {
            store,
            generator,
            scheduler,
        }
    }

    /// Deterministic variant for tests and replays.
    pub fn with_rng(scheduler: Arc<dyn Scheduler>, config: GeneratorConfig, rng: StdRng) -> Self {
        let store = TelemetryStore::new();
        let generator =
            TelemetryGenerator::with_rng(store.clone(), Arc::clone(&scheduler), config, rng);
        Self {
            store,
            generator,
            scheduler,
        }
    }

    pub fn store(&self) -> &TelemetryStore {
        &self.store
    }

    pub fn generator(&self) -> &TelemetryGenerator {
        &self.generator
    }

    pub fn scheduler(&self) -> Arc<dyn Scheduler> {
        Arc::clone(&self.scheduler)
    }

    pub fn view(&self) -> TelemetryView {
        self.store.view()
    }

    pub fn start_analysis(&self, file: &VideoFile) -> Result<u64, TelemetryError> {
        self.generator.start(file)
    }

    pub fn stop_analysis(&self) {
        self.generator.stop();
    }
}
