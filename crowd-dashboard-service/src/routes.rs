use crate::app::App;
use crate::components::upload_panel::FILE_NAME_HEADER;
use crate::pages::{dashboard, landing};
use bytes::Bytes;
use chrono::Local;
use crowd_core::{UploadError, VideoFile};
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use hyper::{Method, Request, Response, StatusCode};
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, error, warn};

pub type HttpResponse = Response<Full<Bytes>>;

const HTML: &str = "text/html; charset=utf-8";
const TEXT: &str = "text/plain; charset=utf-8";

fn respond(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> HttpResponse {
    let mut resp = Response::new(Full::new(body.into()));
    *resp.status_mut() = status;
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    resp
}

fn see_other(location: &'static str) -> HttpResponse {
    let mut resp = respond(StatusCode::SEE_OTHER, TEXT, Bytes::new());
    resp.headers_mut()
        .insert(LOCATION, HeaderValue::from_static(location));
    resp
}

/// Routes one request. Never fails; errors become status codes.
pub async fn handle<B>(app: Arc<App>, req: Request<B>) -> Result<HttpResponse, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Display,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    debug!("{method} {path}");

    let resp = match (method, path.as_str()) {
        (Method::GET, "/") => respond(
            StatusCode::OK,
            HTML,
            landing::render(app.config().max_upload_bytes),
        ),
        (Method::POST, "/upload") => upload(&app, req).await,
        (Method::GET, "/dashboard") => match app.dashboard_state() {
            Some(state) => respond(
                StatusCode::OK,
                HTML,
                dashboard::render(&state, Local::now(), app.config().tick_interval),
            ),
            None => see_other("/"),
        },
        (Method::POST, "/session/stop") => {
            app.end_session();
            see_other("/")
        }
        (Method::POST, "/video/toggle") => match app.toggle_playback() {
            Some(_) => see_other("/dashboard"),
            None => see_other("/"),
        },
        (Method::GET, "/health") => match serde_json::to_vec(&app.health()) {
            Ok(body) => respond(StatusCode::OK, "application/json", body),
            Err(e) => {
                error!("health encoding failed: {e}");
                respond(StatusCode::INTERNAL_SERVER_ERROR, TEXT, "health unavailable")
            }
        },
        (Method::GET, "/metrics") => match app.metrics().render() {
            Ok(text) => respond(StatusCode::OK, "text/plain; version=0.0.4", text),
            Err(e) => {
                error!("metrics render failed: {e}");
                respond(StatusCode::INTERNAL_SERVER_ERROR, TEXT, "metrics unavailable")
            }
        },
        _ => respond(StatusCode::NOT_FOUND, TEXT, "not found"),
    };
    Ok(resp)
}

async fn upload<B>(app: &App, req: Request<B>) -> HttpResponse
where
    B: Body<Data = Bytes>,
    B::Error: Display,
{
    let headers = req.headers();
    let mime_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let name = headers
        .get(FILE_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|raw| percent_decode_str(raw).decode_utf8_lossy().into_owned())
        .unwrap_or_default();
    let declared_len = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    if let Err(e) = VideoFile::check_mime(&mime_type) {
        warn!("upload rejected: {e}");
        return rejection(&e);
    }

    let limit = app.config().max_upload_bytes;
    if declared_len.is_some_and(|len| len > limit) {
        let e = UploadError::TooLarge { limit };
        warn!("upload rejected: {e}");
        return rejection(&e);
    }

    let size = match drain_body(req.into_body(), limit).await {
        Ok(size) => size,
        Err(BodyFailure::TooLarge) => {
            let e = UploadError::TooLarge { limit };
            warn!("upload rejected: {e}");
            return rejection(&e);
        }
        Err(BodyFailure::Read(msg)) => {
            warn!("upload body read failed: {msg}");
            return respond(StatusCode::BAD_REQUEST, TEXT, "upload interrupted");
        }
    };

    let file = match VideoFile::accept(name, mime_type, size, limit) {
        Ok(file) => file,
        Err(e) => {
            warn!("upload rejected: {e}");
            return rejection(&e);
        }
    };

    let delay = app.config().upload_delay;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    match app.begin_session(file) {
        Ok(_) => see_other("/dashboard"),
        Err(e) => {
            error!("could not start analysis: {e}");
            respond(StatusCode::INTERNAL_SERVER_ERROR, TEXT, "analysis could not start")
        }
    }
}

fn rejection(e: &UploadError) -> HttpResponse {
    let status = match e {
        UploadError::NotVideo { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
    };
    respond(status, TEXT, e.user_message())
}

enum BodyFailure {
    TooLarge,
    Read(String),
}

/// Counts body bytes without keeping them. Stops once `limit` is exceeded.
async fn drain_body<B>(body: B, limit: u64) -> Result<u64, BodyFailure>
where
    B: Body<Data = Bytes>,
    B::Error: Display,
{
    let mut body = Box::pin(body);
    let mut total: u64 = 0;
    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|e| BodyFailure::Read(e.to_string()))?;
        if let Some(data) = frame.data_ref() {
            total = total.saturating_add(data.len() as u64);
            if total > limit {
                return Err(BodyFailure::TooLarge);
            }
        }
    }
    Ok(total)
}
