//! Check records built from dashboard panels

use serde::Serialize;
use serde_json::Value;

use super::threshold::extract_thresholds;
use crate::dashboard::{Panel, PanelEntry};

/// Alerting check as sent to the backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Check {
    /// Remote identifier, empty for a check that was never created
    #[serde(skip)]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub target: String,
    pub warn: String,
    pub error: String,
    pub enabled: bool,
    pub live: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
}

impl Check {
    /// Build a check from a graph panel
    pub fn from_panel(panel: &Panel) -> Result<Self, BuildError> {
        if !panel.is_graph() {
            return Err(BuildError::NotAGraph(panel.kind.clone()));
        }

        let grid = panel
            .grid
            .as_ref()
            .ok_or_else(|| BuildError::Malformed("panel has no grid".to_string()))?;

        let thresholds = extract_thresholds(grid);
        if thresholds.len() < 2 {
            return Err(BuildError::NoThresholds(thresholds.len()));
        }

        let name = panel.title.clone();
        Ok(Self {
            id: panel.alert_id.clone().unwrap_or_default(),
            description: format!("Check added from grafana for '{}'", name),
            name,
            target: extract_target(panel.targets.as_deref().unwrap_or_default()),
            // First threshold warns, second errors
            warn: format_threshold(thresholds[0]),
            error: format_threshold(thresholds[1]),
            enabled: true,
            live: false,
            from: None,
            until: None,
        })
    }

    /// Build a check from a panel slot, treating unreadable elements as ineligible
    pub fn from_entry(entry: &PanelEntry) -> Result<Self, BuildError> {
        match entry {
            PanelEntry::Panel(panel) => Self::from_panel(panel),
            PanelEntry::Malformed(value) => match value.get("type").and_then(Value::as_str) {
                Some(kind) if kind != "graph" => Err(BuildError::NotAGraph(kind.to_string())),
                _ => Err(BuildError::Malformed(describe_shape(value))),
            },
        }
    }

    /// Whether this check already exists on the backend
    pub fn is_registered(&self) -> bool {
        !self.id.is_empty()
    }
}

/// First non-empty `target` string; one target per graph.
fn extract_target(targets: &[Value]) -> String {
    targets
        .iter()
        .filter_map(|t| t.get("target").and_then(Value::as_str))
        .find(|t| !t.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn format_threshold(value: f64) -> String {
    format!("{:.6}", value)
}

fn describe_shape(value: &Value) -> String {
    match value {
        Value::Object(obj) if !obj.contains_key("type") => "panel has no type".to_string(),
        Value::Object(_) => "panel fields have unexpected types".to_string(),
        Value::Null => "panel is null".to_string(),
        Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
            "panel is not an object".to_string()
        }
    }
}

/// Reasons a panel does not produce a check
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("Not a graph (panel type '{0}')")]
    NotAGraph(String),

    #[error("Need at least 2 thresholds, found {0}")]
    NoThresholds(usize),

    #[error("Malformed panel: {0}")]
    Malformed(String),
}
