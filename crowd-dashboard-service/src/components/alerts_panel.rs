use crate::html::{escape, panel};
use chrono::Local;
use crowd_core::Alert;
use std::fmt::Write as _;

/// Alerts are rendered in the order given, newest first.
pub fn render(alerts: &[Alert]) -> String {
    let mut body = format!("<div class=\"muted\">{} active</div>", alerts.len());
    if alerts.is_empty() {
        body.push_str("<p class=\"muted\">No active alerts</p>");
    }
    for alert in alerts {
        let _ = write!(
            body,
            "<div class=\"alert alert-{kind}\" data-id=\"{id}\"><div>{message}</div>\
             <small>{time}</small></div>",
            kind = alert.kind.as_str(),
            id = alert.id,
            message = escape(&alert.message),
            time = alert.timestamp.with_timezone(&Local).format("%H:%M:%S"),
        );
    }
    panel("alerts", "Live Alerts", &body)
}
