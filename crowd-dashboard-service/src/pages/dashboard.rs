use crate::app::DashboardState;
use crate::components::{actions_panel, alerts_panel, map_panel, risk_panel, video_panel};
use crate::html::page;
use chrono::{DateTime, Local};
use std::time::Duration;

/// Renders the dashboard. While the feed is live the page asks the browser
/// to reload every `refresh` so each tick shows up.
pub fn render(state: &DashboardState, now: DateTime<Local>, refresh: Duration) -> String {
    let view = &state.telemetry;
    let risk = view.risk.as_deref();
    let actions = view.actions.as_deref();

    let (status_class, status_label) = if view.connected {
        ("live", "Live Analysis")
    } else {
        ("offline", "Disconnected")
    };

    let body = format!(
        "<header><div><form method=\"post\" action=\"/session/stop\" style=\"display:inline\">\
         <button type=\"submit\">Back</button></form> <strong>Crowd Risk Dashboard</strong></div>\
         <div><span class=\"badge {status_class}\">{status_label}</span> \
         <span class=\"clock\">{clock}</span></div></header>\
         <main class=\"grid\"><div>{video}{alerts}</div><div>{risk}{actions}</div><div>{map}</div></main>",
        clock = now.format("%H:%M:%S"),
        video = video_panel::render(&state.file, &state.frame),
        alerts = alerts_panel::render(&state.alerts),
        risk = risk_panel::render(risk),
        actions = actions_panel::render(actions, risk.map(|r| r.level())),
        map = map_panel::render(risk, actions),
    );

    let refresh = view.connected.then_some(refresh);
    page("Crowd Risk Dashboard", refresh, &body)
}
