use crate::components::upload_panel;
use crate::html::{escape, page};

const FEATURES: [(&str, &str); 3] = [
    (
        "Real-Time Analysis",
        "YOLO-powered crowd detection with instant risk assessment",
    ),
    (
        "Predictive Analytics",
        "10-minute and 30-minute crowd behavior forecasting",
    ),
    (
        "Proactive Response",
        "Automated safety measures and resource deployment",
    ),
];

pub fn render(max_upload_bytes: u64) -> String {
    let features: String = FEATURES
        .iter()
        .map(|(title, blurb)| {
            format!(
                "<div class=\"panel\"><h3>{}</h3><p class=\"muted\">{}</p></div>",
                escape(title),
                escape(blurb)
            )
        })
        .collect();

    let body = format!(
        "<header><strong>AI Crowd Risk Predictor</strong>\
         <span class=\"muted\">Emergency Response System</span></header>\
         <main><h1>Real-Time Crowd Analysis &amp; Risk Prediction</h1>\
         <p>Advanced AI-powered system for proactive crowd management, safety predictions, \
         and emergency response coordination</p>\
         <div class=\"features\">{features}</div>{upload}</main>",
        upload = upload_panel::render(max_upload_bytes),
    );
    page("AI Crowd Risk Predictor", None, &body)
}
