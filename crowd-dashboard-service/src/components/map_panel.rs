use crate::html::{escape, panel};
use crowd_core::{
    BarricadeStatus, GeoPoint, MedicalStatus, RiskLevel, RiskSnapshot, SafetyActionsSnapshot,
};
use std::fmt::Write as _;

const METRES_PER_DEGREE: f64 = 111_320.0;
/// Half-width of the rendered area around the venue.
const VIEW_RADIUS_M: f64 = 600.0;
const VIEW_PX: f64 = 400.0;

pub fn zone_radius_m(level: RiskLevel) -> u32 {
    match level {
        RiskLevel::Good => 200,
        RiskLevel::Moderate => 300,
        RiskLevel::Overcrowd => 400,
        RiskLevel::Stampede => 500,
    }
}

pub fn zone_colour(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Good => "#10B981",
        RiskLevel::Moderate => "#F59E0B",
        RiskLevel::Overcrowd => "#F97316",
        RiskLevel::Stampede => "#EF4444",
    }
}

/// Equirectangular projection onto the panel's square canvas.
fn project(point: GeoPoint) -> (f64, f64) {
    let centre = GeoPoint::VENUE;
    let north = (point.lat - centre.lat) * METRES_PER_DEGREE;
    let east = (point.lon - centre.lon) * METRES_PER_DEGREE * centre.lat.to_radians().cos();
    let scale = VIEW_PX / (2.0 * VIEW_RADIUS_M);
    (VIEW_PX / 2.0 + east * scale, VIEW_PX / 2.0 - north * scale)
}

fn marker(out: &mut String, point: GeoPoint, fill: &str, tooltip: &str) {
    let (x, y) = project(point);
    let _ = write!(
        out,
        "<circle class=\"marker\" cx=\"{x:.1}\" cy=\"{y:.1}\" r=\"6\" fill=\"{fill}\">\
         <title>{}</title></circle>",
        escape(tooltip)
    );
}

pub fn render(risk: Option<&RiskSnapshot>, actions: Option<&SafetyActionsSnapshot>) -> String {
    let mut svg = format!(
        "<svg viewBox=\"0 0 {VIEW_PX} {VIEW_PX}\" width=\"100%\" role=\"img\" \
         aria-label=\"Live safety map\"><rect width=\"100%\" height=\"100%\" fill=\"#0b1622\"/>"
    );

    if let Some(risk) = risk {
        let level = risk.level();
        let colour = zone_colour(level);
        let (cx, cy) = project(GeoPoint::VENUE);
        let r = f64::from(zone_radius_m(level)) * VIEW_PX / (2.0 * VIEW_RADIUS_M);
        let _ = write!(
            svg,
            "<circle class=\"zone\" cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"{r:.1}\" stroke=\"{colour}\" \
             stroke-width=\"3\" fill=\"{colour}\" fill-opacity=\"0.2\" data-radius-m=\"{}\">\
             <title>Risk Zone\nStatus: {}\nConfidence: {:.1}%</title></circle>",
            zone_radius_m(level),
            escape(&risk.current.category),
            risk.current.confidence_percent(),
        );
    }

    if let Some(actions) = actions {
        for officer in &actions.officers {
            let tip = format!(
                "Officer {}\nStatus: {}\nPosition: {:.4}, {:.4}",
                officer.ordinal(),
                officer.status,
                officer.position.lat,
                officer.position.lon
            );
            marker(&mut svg, officer.position, "#3B82F6", &tip);
        }
        for barricade in &actions.barricades {
            let mut tip = format!(
                "Barricade {}\nStatus: {}",
                barricade.ordinal(),
                barricade.status
            );
            if barricade.status == BarricadeStatus::Closed {
                tip.push_str("\nAccess Restricted");
            }
            marker(&mut svg, barricade.position, "#F97316", &tip);
        }
        for unit in &actions.medical {
            let mut tip = format!("Medical Unit {}\nStatus: {}", unit.ordinal(), unit.status);
            if unit.status == MedicalStatus::Active {
                tip.push_str("\nEmergency Response");
            }
            marker(&mut svg, unit.position, "#10B981", &tip);
        }
    }
    svg.push_str("</svg>");

    let body = format!(
        "<div class=\"legend\"><span style=\"color:#3B82F6\">Officers</span> \
         <span style=\"color:#F97316\">Barricades</span> \
         <span style=\"color:#10B981\">Medical</span></div>{svg}\
         <div class=\"muted\">Live Updates: {} &middot; Assets: {}</div>",
        if actions.is_some() { "Active" } else { "Standby" },
        actions.map_or(0, SafetyActionsSnapshot::total_resources),
    );
    panel("map", "Live Safety Map", &body)
}
