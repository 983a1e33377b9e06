use crowd_core::{
    AlertFeed, AlertKind, AlertPolicy, BarricadeStatus, MedicalStatus, OfficerStatus, VideoFile,
};
use crowd_telemetry::{
    AnalysisContext, GeneratorConfig, ManualScheduler, Scheduler, TelemetryError, TelemetryUpdate,
    TokioScheduler,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn clip() -> VideoFile {
    VideoFile::accept("north-gate.mp4", "video/mp4", 12 * 1024 * 1024, u64::MAX).unwrap()
}

fn context(seed: u64) -> (ManualScheduler, AnalysisContext) {
    let scheduler = ManualScheduler::new();
    let shared: Arc<dyn Scheduler> = Arc::new(scheduler.clone());
    let ctx = AnalysisContext::with_rng(
        shared,
        GeneratorConfig::default(),
        StdRng::seed_from_u64(seed),
    );
    (scheduler, ctx)
}

#[test]
fn store_is_empty_and_offline_before_start() {
    let (_clock, ctx) = context(1);
    let view = ctx.view();
    assert!(view.risk.is_none());
    assert!(view.actions.is_none());
    assert!(!view.connected);
    assert_eq!(view.sequence, 0);
}

#[test]
fn start_connects_and_ticks_publish_paired_snapshots() {
    let (clock, ctx) = context(2);
    ctx.start_analysis(&clip()).unwrap();
    assert!(ctx.store().is_connected());
    assert!(ctx.view().risk.is_none());

    clock.advance(Duration::from_millis(1_999));
    assert!(ctx.view().risk.is_none());

    clock.advance(Duration::from_millis(1));
    let view = ctx.view();
    let risk = view.risk.expect("risk after first tick");
    let actions = view.actions.expect("actions after first tick");
    assert_eq!(view.sequence, 1);
    assert_eq!(actions.level, risk.level());
    assert!(actions
        .officers
        .iter()
        .all(|o| o.status == OfficerStatus::for_level(risk.level())));
    assert!(actions
        .barricades
        .iter()
        .all(|b| b.status == BarricadeStatus::for_level(risk.level())));
    assert!(actions
        .medical
        .iter()
        .all(|m| m.status == MedicalStatus::for_level(risk.level())));
    assert_eq!(ctx.generator().ticks(), 1);
}

#[test]
fn second_start_is_rejected_without_a_second_timer() {
    let (clock, ctx) = context(3);
    ctx.start_analysis(&clip()).unwrap();
    let pending = clock.pending();

    let err = ctx.start_analysis(&clip()).unwrap_err();
    assert_eq!(
        err,
        TelemetryError::AlreadyRunning {
            file: "north-gate.mp4".into()
        }
    );
    assert_eq!(clock.pending(), pending);

    clock.advance(Duration::from_millis(10_000));
    assert_eq!(ctx.view().sequence, 5);
}

#[test]
fn stop_is_idempotent() {
    let (clock, ctx) = context(4);
    ctx.start_analysis(&clip()).unwrap();
    clock.advance(Duration::from_millis(4_000));

    let updates = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&updates);
    ctx.store().subscribe(move |u| {
        if let TelemetryUpdate::Connectivity(c) = u {
            sink.lock().unwrap().push(*c);
        }
    });

    ctx.stop_analysis();
    let after_first = ctx.view();
    ctx.stop_analysis();
    let after_second = ctx.view();

    assert!(!after_second.connected);
    assert_eq!(after_first.sequence, after_second.sequence);
    assert_eq!(*updates.lock().unwrap(), vec![false]);
    assert_eq!(clock.pending(), 0);
}

#[test]
fn demo_duration_stops_feed_and_publishing() {
    let (clock, ctx) = context(5);
    ctx.start_analysis(&clip()).unwrap();

    clock.advance(Duration::from_millis(30_000));
    let view = ctx.view();
    assert!(!view.connected);
    assert!(!ctx.generator().is_running());
    // The tick due at 30s shares its deadline with auto-stop, which was
    // registered first and cancels it.
    assert_eq!(view.sequence, 14);

    clock.advance(Duration::from_millis(60_000));
    assert_eq!(ctx.view().sequence, 14);
    assert_eq!(clock.pending(), 0);
}

#[test]
fn restart_after_stop_begins_a_fresh_run() {
    let (clock, ctx) = context(6);
    let first = ctx.start_analysis(&clip()).unwrap();
    clock.advance(Duration::from_millis(2_000));
    ctx.stop_analysis();

    let second = ctx.start_analysis(&clip()).unwrap();
    assert!(second > first);
    assert!(ctx.store().is_connected());

    // The first run's auto-stop must not end the second run.
    clock.advance(Duration::from_millis(29_000));
    assert!(ctx.store().is_connected());
    clock.advance(Duration::from_millis(1_000));
    assert!(!ctx.store().is_connected());
}

#[test]
fn subscribers_see_every_snapshot_and_feed_alerts() {
    let (clock, ctx) = context(8);
    let feed = Arc::new(Mutex::new(AlertFeed::new(AlertPolicy::OnTransition)));
    let seen = Arc::new(Mutex::new(Vec::new()));

    let f = Arc::clone(&feed);
    let s = Arc::clone(&seen);
    let id = ctx.store().subscribe(move |update| {
        if let TelemetryUpdate::Snapshot { risk, .. } = update {
            s.lock().unwrap().push(risk.level());
            f.lock().unwrap().observe(risk.level(), chrono_now());
        }
    });

    ctx.start_analysis(&clip()).unwrap();
    clock.advance(Duration::from_millis(30_000));

    let levels = seen.lock().unwrap().clone();
    assert_eq!(levels.len(), 14);

    let mut expected = AlertFeed::new(AlertPolicy::OnTransition);
    for level in &levels {
        expected.observe(*level, chrono_now());
    }
    let kinds: Vec<AlertKind> = feed.lock().unwrap().alerts().map(|a| a.kind).collect();
    let expected_kinds: Vec<AlertKind> = expected.alerts().map(|a| a.kind).collect();
    assert_eq!(kinds, expected_kinds);
    assert!(kinds.len() <= 5);

    assert!(ctx.store().unsubscribe(id));
    assert!(!ctx.store().unsubscribe(id));
}

#[test]
fn listeners_may_call_back_into_the_generator() {
    let (clock, ctx) = context(11);
    let observed = Arc::new(Mutex::new(Vec::new()));

    let handle = ctx.clone();
    let o = Arc::clone(&observed);
    let id = ctx.store().subscribe(move |update| {
        if let TelemetryUpdate::Snapshot { .. } = update {
            let ticks = handle.generator().ticks();
            o.lock().unwrap().push((ticks, handle.generator().is_running()));
            if ticks == 3 {
                handle.stop_analysis();
            }
        }
    });

    ctx.start_analysis(&clip()).unwrap();
    clock.advance(Duration::from_millis(10_000));

    assert_eq!(
        *observed.lock().unwrap(),
        vec![(1, true), (2, true), (3, true)]
    );
    assert_eq!(ctx.view().sequence, 3);
    assert!(!ctx.store().is_connected());
    assert!(!ctx.generator().is_running());
    assert_eq!(clock.pending(), 0);
    assert!(ctx.store().unsubscribe(id));
}

fn chrono_now() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc::now()
}

#[tokio::test(start_paused = true)]
async fn tokio_scheduler_drives_a_real_run() {
    let scheduler: Arc<dyn Scheduler> = Arc::new(TokioScheduler::current());
    let config = GeneratorConfig {
        tick_interval: Duration::from_millis(200),
        demo_duration: Duration::from_millis(1_000),
        ..GeneratorConfig::default()
    };
    let ctx = AnalysisContext::with_rng(scheduler, config, StdRng::seed_from_u64(10));
    ctx.start_analysis(&clip()).unwrap();

    tokio::time::sleep(Duration::from_millis(450)).await;
    assert!(ctx.store().is_connected());
    assert_eq!(ctx.view().sequence, 2);

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert!(!ctx.store().is_connected());
    let settled = ctx.view().sequence;
    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(ctx.view().sequence, settled);
}
