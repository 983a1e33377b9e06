use crate::html::{escape, panel};
use crowd_core::{DirectivePriority, RiskLevel, SafetyActionsSnapshot};
use std::fmt::Write as _;

fn priority_class(priority: DirectivePriority) -> &'static str {
    match priority {
        DirectivePriority::Normal => "priority-normal",
        DirectivePriority::High => "priority-high",
        DirectivePriority::Critical => "priority-critical",
    }
}

/// `level` is the current risk level; it gates the emergency banner.
pub fn render(actions: Option<&SafetyActionsSnapshot>, level: Option<RiskLevel>) -> String {
    let Some(actions) = actions else {
        return panel(
            "actions",
            "Safety Actions",
            "<p class=\"muted\">No actions required</p>",
        );
    };

    let mut body = String::new();
    let _ = write!(
        body,
        "<div class=\"muted\">{} active measures</div>",
        actions.actions.len()
    );

    for directive in &actions.actions {
        let priority = DirectivePriority::classify(directive);
        let _ = write!(
            body,
            "<div class=\"directive {}\"><div>{}</div>",
            priority_class(priority),
            escape(directive)
        );
        if priority == DirectivePriority::Critical {
            body.push_str("<div class=\"muted\">Immediate response required</div>");
        }
        body.push_str("</div>");
    }

    let _ = write!(
        body,
        "<div class=\"cards\">\
         <div><div class=\"muted\">Officers</div><span class=\"{officer_state}\">{officers} Active</span></div>\
         <div><div class=\"muted\">Barricades</div>{closed} Closed</div>\
         <div><div class=\"muted\">Medical</div><span class=\"{medical_state}\">{medical} Units</span></div>\
         </div>",
        officer_state = if actions.any_officer_deployed() { "level-overcrowd" } else { "level-good" },
        officers = actions.officers.len(),
        closed = actions.closed_barricades(),
        medical_state = if actions.any_medical_active() { "level-stampede" } else { "level-good" },
        medical = actions.medical.len(),
    );

    if level == Some(RiskLevel::Stampede) {
        body.push_str(
            "<div class=\"banner\">Emergency Protocol Active<p>All emergency services have been \
             notified. Evacuation procedures may be initiated.</p></div>",
        );
    }

    panel("actions", "Proactive Safety Measures", &body)
}
