use super::level_class;
use crate::html::{escape, panel};
use crowd_core::{RiskReading, RiskSnapshot};
use std::fmt::Write as _;

pub const TREND_BARS: usize = 12;

pub fn render(risk: Option<&RiskSnapshot>) -> String {
    let Some(risk) = risk else {
        return panel(
            "risk",
            "Risk Analysis",
            "<p class=\"muted\">Waiting for analysis...</p>",
        );
    };

    let current = &risk.current;
    let band = risk.density_band();
    let mut body = String::new();
    let _ = write!(
        body,
        "<div class=\"current {class}\"><h3>Current Status</h3>\
         <div class=\"category\">{category}</div>\
         <div>Confidence: {confidence:.1}% &middot; Detections: {detections}</div>\
         <div>Density band: <span class=\"{band_class}\">{band}</span></div></div>",
        class = level_class(current.level),
        category = escape(&current.category),
        confidence = current.confidence_percent(),
        detections = risk.detections,
        band_class = level_class(band),
        band = band.as_str(),
    );

    body.push_str("<h3>Predictions</h3>");
    body.push_str(&prediction("Next 10 minutes", &risk.next_10_min));
    body.push_str(&prediction("Next 30 minutes", &risk.next_30_min));

    body.push_str("<div class=\"trend-wrap\"><div>Risk Trend</div><div class=\"trend\">");
    for (i, height) in trend_heights(risk.detections).iter().enumerate() {
        let colour = match i {
            0..=3 => "#22c55e",
            4..=7 => "#eab308",
            _ => "#f97316",
        };
        let _ = write!(
            body,
            "<span style=\"height:{height}%;background:{colour}\"></span>"
        );
    }
    body.push_str("</div></div>");

    panel("risk", "Risk Analysis", &body)
}

fn prediction(label: &str, reading: &RiskReading) -> String {
    format!(
        "<div class=\"prediction\"><span>{label}</span> \
         <span class=\"badge {class}\">{confidence:.0}%</span>\
         <div class=\"{class}\">{category}</div></div>",
        class = level_class(reading.level),
        confidence = reading.confidence_percent(),
        category = escape(&reading.category),
    )
}

/// Decorative bar heights in percent, 20..=100. Seeded from the head count so
/// the strip shifts between ticks without carrying state.
pub fn trend_heights(seed: u32) -> [u32; TREND_BARS] {
    let mut heights = [0u32; TREND_BARS];
    let mut x = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    for h in heights.iter_mut() {
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        *h = 20 + x % 81;
    }
    heights
}
