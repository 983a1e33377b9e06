//! Minimal markup helpers shared by components and pages.

use std::fmt::Write as _;
use std::time::Duration;

/// Escapes text for element content and double-quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Full HTML document. `refresh` adds a meta refresh so the page re-renders
/// from the store on the client's clock.
pub fn page(title: &str, refresh: Option<Duration>, body: &str) -> String {
    let mut head = String::new();
    let _ = write!(head, "<meta charset=\"utf-8\"><title>{}</title>", escape(title));
    if let Some(every) = refresh {
        let secs = every.as_secs().max(1);
        let _ = write!(head, "<meta http-equiv=\"refresh\" content=\"{secs}\">");
    }
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head>{head}<style>{STYLE}</style></head>\
         <body>{body}</body></html>\n"
    )
}

/// Wraps `inner` in a titled panel card.
pub fn panel(class: &str, title: &str, inner: &str) -> String {
    format!(
        "<section class=\"panel {class}\"><h2>{}</h2>{inner}</section>",
        escape(title)
    )
}

const STYLE: &str = "\
body{margin:0;font-family:system-ui,sans-serif;background:#0f172a;color:#e2e8f0}\
header{display:flex;justify-content:space-between;align-items:center;padding:12px 24px;background:#1e293b}\
main{padding:24px}\
.grid{display:grid;grid-template-columns:repeat(auto-fit,minmax(320px,1fr));gap:16px}\
.panel{background:#1e293b;border-radius:8px;padding:16px}\
.panel h2{margin-top:0;font-size:1.1rem}\
.level-good{color:#22c55e}.level-moderate{color:#eab308}\
.level-overcrowd{color:#f97316}.level-stampede{color:#ef4444}\
.badge{display:inline-block;padding:2px 8px;border-radius:9999px;font-size:.8rem}\
.live{background:#16a34a}.offline{background:#64748b}\
.trend{display:flex;align-items:flex-end;gap:3px;height:48px}\
.trend span{flex:1;background:#334155}\
.directive{padding:6px 8px;margin:4px 0;border-left:4px solid #64748b}\
.priority-high{border-color:#f97316}.priority-critical{border-color:#ef4444;background:#450a0a}\
.banner{background:#7f1d1d;padding:8px;border-radius:6px;font-weight:600}\
.alert{padding:8px;margin:6px 0;border-radius:6px}\
.alert-emergency{background:#7f1d1d}.alert-warning{background:#78350f}.alert-info{background:#1e3a8a}\
.video{position:relative;height:240px;background:#020617;border-radius:6px;overflow:hidden}\
.video .box{position:absolute;border:2px solid #22c55e}\
.progress{height:4px;background:#334155}.progress div{height:4px;background:#38bdf8}\
.cards{display:flex;gap:8px;margin-top:8px}.cards div{flex:1;background:#0f172a;padding:8px;border-radius:6px}\
.features{display:grid;grid-template-columns:repeat(3,1fr);gap:16px}\
.error{color:#f87171}\
button{background:#2563eb;color:white;border:0;border-radius:6px;padding:6px 14px;cursor:pointer}\
";
