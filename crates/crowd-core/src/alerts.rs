use crate::level::RiskLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Number of alerts the dashboard keeps on screen.
pub const ALERT_FEED_CAPACITY: usize = 5;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Emergency,
    Warning,
    Info,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::Emergency => "emergency",
            AlertKind::Warning => "warning",
            AlertKind::Info => "info",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub id: u64,
    pub kind: AlertKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// When an elevated level produces an alert.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AlertPolicy {
    /// Only when the level changes into overcrowd or stampede.
    #[default]
    OnTransition,
    /// On every observation at an elevated level.
    EveryElevatedTick,
}

impl FromStr for AlertPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "transition" | "on-transition" => Ok(AlertPolicy::OnTransition),
            "every-tick" | "every-elevated-tick" => Ok(AlertPolicy::EveryElevatedTick),
            other => Err(format!("unknown alert policy: {other}")),
        }
    }
}

/// Bounded, newest-first alert list derived from a stream of risk levels.
#[derive(Clone, Debug)]
pub struct AlertFeed {
    policy: AlertPolicy,
    capacity: usize,
    alerts: VecDeque<Alert>,
    last_level: Option<RiskLevel>,
    next_id: u64,
}

impl AlertFeed {
    pub fn new(policy: AlertPolicy) -> Self {
        Self::with_capacity(policy, ALERT_FEED_CAPACITY)
    }

    pub fn with_capacity(policy: AlertPolicy, capacity: usize) -> Self {
        Self {
            policy,
            capacity: capacity.max(1),
            alerts: VecDeque::with_capacity(capacity),
            last_level: None,
            next_id: 1,
        }
    }

    pub fn policy(&self) -> AlertPolicy {
        self.policy
    }

    /// Feeds one observed level. Returns the alert raised, if any.
    pub fn observe(&mut self, level: RiskLevel, now: DateTime<Utc>) -> Option<&Alert> {
        let previous = self.last_level.replace(level);
        if !level.is_elevated() {
            return None;
        }
        if self.policy == AlertPolicy::OnTransition && previous == Some(level) {
            return None;
        }

        let (kind, message) = match level {
            RiskLevel::Stampede => (
                AlertKind::Emergency,
                "EMERGENCY: Stampede risk detected! Immediate action required.",
            ),
            _ => (
                AlertKind::Warning,
                "WARNING: Overcrowding detected. Increased monitoring recommended.",
            ),
        };
        let alert = Alert {
            id: self.next_id,
            kind,
            message: message.to_string(),
            timestamp: now,
        };
        self.next_id += 1;

        if self.alerts.len() == self.capacity {
            self.alerts.pop_back();
        }
        self.alerts.push_front(alert);
        self.alerts.front()
    }

    /// Newest first.
    pub fn alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    pub fn to_vec(&self) -> Vec<Alert> {
        self.alerts.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

impl Default for AlertFeed {
    fn default() -> Self {
        Self::new(AlertPolicy::default())
    }
}
