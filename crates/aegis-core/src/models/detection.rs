//! Detection output types: severity bands, recommended actions, scan results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Escalation tier assigned by a detector's threshold bands.
///
/// Ordered: `Warning < Critical < Severe`. Classification is monotonic in
/// the metric value, so the derived `Ord` is load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Critical,
    Severe,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Critical => "critical",
            Severity::Severe => "severe",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "warning" => Some(Severity::Warning),
            "critical" => Some(Severity::Critical),
            "severe" => Some(Severity::Severe),
            _ => None,
        }
    }
}

/// What a detector recommends the suspension manager do about a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    None,
    Warning,
    Investigate,
    Suspend,
}

impl RecommendedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendedAction::None => "none",
            RecommendedAction::Warning => "warning",
            RecommendedAction::Investigate => "investigate",
            RecommendedAction::Suspend => "suspend",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(RecommendedAction::None),
            "warning" => Some(RecommendedAction::Warning),
            "investigate" => Some(RecommendedAction::Investigate),
            "suspend" => Some(RecommendedAction::Suspend),
            _ => None,
        }
    }
}

/// Which detector produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    ErrorRate,
    Spike,
    Pattern,
}

impl DetectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::ErrorRate => "error_rate",
            DetectorKind::Spike => "spike",
            DetectorKind::Pattern => "pattern",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "error_rate" => Some(DetectorKind::ErrorRate),
            "spike" => Some(DetectorKind::Spike),
            "pattern" => Some(DetectorKind::Pattern),
            _ => None,
        }
    }
}

/// Output of one detector run against one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub project_id: String,
    pub detector: DetectorKind,
    pub detected: bool,
    /// The computed metric: error-rate percentage, spike ratio percentage,
    /// or flagged-pattern frequency, depending on the detector.
    pub metric_value: f64,
    /// `None` when nothing was detected (below the first band or below the
    /// sample gate).
    pub severity: Option<Severity>,
    pub recommended_action: RecommendedAction,
    pub detected_at: DateTime<Utc>,
    pub details: String,
}

impl DetectionResult {
    /// A clean result: nothing detected for this project.
    pub fn clean(project_id: &str, detector: DetectorKind, metric_value: f64) -> Self {
        Self {
            project_id: project_id.to_string(),
            detector,
            detected: false,
            metric_value,
            severity: None,
            recommended_action: RecommendedAction::None,
            detected_at: Utc::now(),
            details: String::new(),
        }
    }

    /// Whether the suspension manager should be handed this result.
    pub fn is_actionable(&self) -> bool {
        self.detected && self.recommended_action != RecommendedAction::None
    }
}
