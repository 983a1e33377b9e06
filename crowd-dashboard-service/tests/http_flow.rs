use bytes::Bytes;
use crowd_core::{AlertPolicy, RiskLevel, ALERT_FEED_CAPACITY};
use crowd_dashboard_service::routes::{handle, HttpResponse};
use crowd_dashboard_service::{App, ServiceConfig};
use crowd_telemetry::{AnalysisContext, ManualScheduler, Scheduler};
use http_body_util::{BodyExt, Full};
use hyper::{Request, StatusCode};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;

fn app_with(config: ServiceConfig) -> (ManualScheduler, Arc<App>) {
    let clock = ManualScheduler::new();
    let scheduler: Arc<dyn Scheduler> = Arc::new(clock.clone());
    let ctx = AnalysisContext::with_rng(
        scheduler,
        config.generator_config(),
        StdRng::seed_from_u64(99),
    );
    let app = App::with_context(config, ctx).unwrap();
    (clock, Arc::new(app))
}

fn app() -> (ManualScheduler, Arc<App>) {
    app_with(ServiceConfig {
        upload_delay: Duration::ZERO,
        ..ServiceConfig::default()
    })
}

async fn send(app: &Arc<App>, req: Request<Full<Bytes>>) -> HttpResponse {
    handle(Arc::clone(app), req).await.unwrap()
}

async fn get(app: &Arc<App>, path: &str) -> HttpResponse {
    send(
        app,
        Request::get(path).body(Full::new(Bytes::new())).unwrap(),
    )
    .await
}

async fn post(app: &Arc<App>, path: &str) -> HttpResponse {
    send(
        app,
        Request::post(path).body(Full::new(Bytes::new())).unwrap(),
    )
    .await
}

async fn upload(app: &Arc<App>, mime: &str, name: &str, body: &'static [u8]) -> HttpResponse {
    let req = Request::post("/upload")
        .header("content-type", mime)
        .header("x-file-name", name)
        .body(Full::new(Bytes::from_static(body)))
        .unwrap();
    send(app, req).await
}

async fn text(resp: HttpResponse) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn alert_entries(body: &str) -> usize {
    body.matches("class=\"alert alert-").count()
}

fn alert_counts(metrics: &str) -> u64 {
    metrics
        .lines()
        .filter(|line| line.starts_with("crowd_alerts_total{"))
        .filter_map(|line| line.rsplit(' ').next()?.parse::<u64>().ok())
        .sum()
}

fn location(resp: &HttpResponse) -> &str {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn landing_page_lists_features_and_upload() {
    let (_clock, app) = app();
    let resp = get(&app, "/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = text(resp).await;
    for needle in ["Real-Time Analysis", "Predictive Analytics", "Proactive Response"] {
        assert!(body.contains(needle), "missing {needle}");
    }
    assert!(body.contains("accept=\"video/*\""));
}

#[tokio::test]
async fn image_upload_is_rejected_without_state_change() {
    let (clock, app) = app();
    let resp = upload(&app, "image/png", "photo.png", b"\x89PNG").await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(text(resp).await, "Please select a valid video file.");

    assert!(!app.has_session());
    assert!(!app.context().store().is_connected());
    assert_eq!(clock.pending(), 0);

    let resp = get(&app, "/dashboard").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let (_clock, app) = app_with(ServiceConfig {
        upload_delay: Duration::ZERO,
        max_upload_bytes: 4,
        ..ServiceConfig::default()
    });
    let resp = upload(&app, "video/mp4", "big.mp4", b"0123456789").await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(!app.has_session());
}

#[tokio::test]
async fn video_upload_opens_a_live_dashboard() {
    let (clock, app) = app();
    let resp = upload(&app, "video/mp4", "north%20gate.mp4", b"fake-video").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/dashboard");
    assert!(app.context().store().is_connected());

    let before_tick = text(get(&app, "/dashboard").await).await;
    assert!(before_tick.contains("Waiting for analysis..."));
    assert!(before_tick.contains("north gate.mp4"));

    clock.advance(Duration::from_millis(2_000));
    let resp = get(&app, "/dashboard").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = text(resp).await;
    assert!(body.contains("Crowd Risk Dashboard"));
    assert!(body.contains("Live Analysis"));
    assert!(body.contains("Confidence:"));
    assert!(body.contains("active measures"));
    assert!(body.contains("Live Updates: Active"));
    assert!(body.contains("http-equiv=\"refresh\""));
}

#[tokio::test]
async fn demo_goes_offline_after_its_duration() {
    let (clock, app) = app();
    upload(&app, "video/webm", "clip.webm", b"x").await;
    clock.advance(Duration::from_millis(30_000));

    assert!(!app.context().store().is_connected());
    assert!(!app.context().generator().is_running());
    let published = app.context().view().sequence;
    assert_eq!(published, 14);
    clock.advance(Duration::from_millis(10_000));
    assert_eq!(app.context().view().sequence, published);

    let body = text(get(&app, "/dashboard").await).await;
    assert!(body.contains("Disconnected"));
    assert!(!body.contains("http-equiv=\"refresh\""));
}

#[tokio::test]
async fn back_navigation_cancels_every_timer() {
    let (clock, app) = app();
    upload(&app, "video/mp4", "a.mp4", b"x").await;
    clock.advance(Duration::from_millis(4_000));
    assert!(clock.pending() > 0);

    let resp = post(&app, "/session/stop").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    assert_eq!(clock.pending(), 0);
    assert!(!app.has_session());
    assert!(!app.context().store().is_connected());
    // Only the metrics listener remains.
    assert_eq!(app.context().store().subscriber_count(), 1);
}

#[tokio::test]
async fn second_upload_replaces_the_session() {
    let (clock, app) = app();
    upload(&app, "video/mp4", "first.mp4", b"x").await;
    let first = app.health().session;
    clock.advance(Duration::from_millis(2_000));

    let resp = upload(&app, "video/mp4", "second.mp4", b"x").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let second = app.health().session;
    assert!(second.is_some());
    assert_ne!(first, second);

    let ticks = app.context().generator().ticks();
    clock.advance(Duration::from_millis(2_000));
    assert_eq!(app.context().generator().ticks(), ticks + 1);
    assert_eq!(app.context().store().subscriber_count(), 2);
}

#[tokio::test]
async fn video_toggle_flips_playback() {
    let (_clock, app) = app();
    let resp = post(&app, "/video/toggle").await;
    assert_eq!(location(&resp), "/");

    upload(&app, "video/mp4", "a.mp4", b"x").await;
    let resp = post(&app, "/video/toggle").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/dashboard");
    let body = text(get(&app, "/dashboard").await).await;
    assert!(body.contains(">Play</button>"));
}

#[tokio::test]
async fn health_metrics_and_not_found() {
    let (clock, app) = app();
    let health: serde_json::Value =
        serde_json::from_str(&text(get(&app, "/health").await).await).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["live"], false);
    assert!(health["session"].is_null());

    upload(&app, "video/mp4", "a.mp4", b"x").await;
    clock.advance(Duration::from_millis(4_000));
    let metrics = text(get(&app, "/metrics").await).await;
    assert!(metrics.contains("crowd_ticks_total 2"));
    assert!(metrics.contains("crowd_live_connected 1"));

    let resp = get(&app, "/nowhere").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn elevated_tick_raises_a_dashboard_alert() {
    let (clock, app) = app();
    upload(&app, "video/mp4", "plaza.mp4", b"x").await;

    let mut level = None;
    for _ in 0..14 {
        clock.advance(Duration::from_millis(2_000));
        let current = app.context().view().risk.map(|risk| risk.level());
        if current.is_some_and(|l| l.is_elevated()) {
            level = current;
            break;
        }
    }
    let kind = match level.expect("seeded run reaches an elevated level") {
        RiskLevel::Stampede => "emergency",
        _ => "warning",
    };

    let body = text(get(&app, "/dashboard").await).await;
    assert!(body.contains(&format!("alert-{kind}")));
    let entries = alert_entries(&body);
    assert!((1..=ALERT_FEED_CAPACITY).contains(&entries), "{entries} entries");

    let metrics = text(get(&app, "/metrics").await).await;
    assert!(
        metrics.contains(&format!("crowd_alerts_total{{type=\"{kind}\"}} 1")),
        "{metrics}"
    );
}

#[tokio::test]
async fn alert_list_is_capped_while_counter_keeps_every_alert() {
    let (clock, app) = app_with(ServiceConfig {
        upload_delay: Duration::ZERO,
        alert_policy: AlertPolicy::EveryElevatedTick,
        ..ServiceConfig::default()
    });
    upload(&app, "video/mp4", "plaza.mp4", b"x").await;

    let mut elevated = 0;
    for _ in 0..14 {
        clock.advance(Duration::from_millis(2_000));
        let risk = app.context().view().risk;
        if risk.is_some_and(|risk| risk.level().is_elevated()) {
            elevated += 1;
        }
    }
    assert_eq!(app.context().view().sequence, 14);

    let body = text(get(&app, "/dashboard").await).await;
    assert_eq!(alert_entries(&body), elevated.min(ALERT_FEED_CAPACITY));
    let metrics = text(get(&app, "/metrics").await).await;
    assert_eq!(alert_counts(&metrics), elevated as u64);
}
