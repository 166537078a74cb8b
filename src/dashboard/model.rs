//! Typed view over a saved dashboard document
//!
//! Dashboards arrive as loosely shaped JSON. Rows and panels are parsed into
//! tagged variants with a raw fallback, so one odd element never prevents the
//! rest of the tree from being read. Fields this crate does not interpret are
//! kept in `extra` and written back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Dashboard document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dashboard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(default)]
    pub rows: Vec<RowEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dashboard {
    /// Parse a dashboard from a JSON document
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Convert back into a JSON document
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Iterate over every well-formed panel in every row
    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.rows
            .iter()
            .filter_map(RowEntry::as_row)
            .flat_map(|row| row.panels.iter())
            .filter_map(PanelEntry::as_panel)
    }
}

/// A row of the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowEntry {
    /// Row carrying a panel list
    Row(Row),
    /// Anything else (no `panels`, or not an object at all)
    Other(Value),
}

impl RowEntry {
    pub fn as_row(&self) -> Option<&Row> {
        match self {
            RowEntry::Row(row) => Some(row),
            RowEntry::Other(_) => None,
        }
    }

    /// Title of the row, when one can be read
    pub fn title(&self) -> Option<&str> {
        match self {
            RowEntry::Row(row) => row.title(),
            RowEntry::Other(value) => value.get("title").and_then(Value::as_str),
        }
    }
}

/// Row with a panel list; every other field, title included, stays raw
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    pub panels: Vec<PanelEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Row {
    pub fn title(&self) -> Option<&str> {
        self.extra.get("title").and_then(Value::as_str)
    }
}

/// A panel slot inside a row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PanelEntry {
    Panel(Panel),
    /// Element that could not be read as a panel
    Malformed(Value),
}

impl PanelEntry {
    pub fn as_panel(&self) -> Option<&Panel> {
        match self {
            PanelEntry::Panel(panel) => Some(panel),
            PanelEntry::Malformed(_) => None,
        }
    }

    /// Best-effort title used in diagnostics
    pub fn title(&self) -> &str {
        match self {
            PanelEntry::Panel(panel) => &panel.title,
            PanelEntry::Malformed(value) => value
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or("<untitled>"),
        }
    }
}

/// Visual panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Panel {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    /// Axis/grid settings, including `thresholdN` entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<Map<String, Value>>,
    /// Series specs, each expected to carry a `target` string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<Value>>,
    /// Identifier of the remote check tracking this panel
    #[serde(rename = "alertID", default, skip_serializing_if = "Option::is_none")]
    pub alert_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Panel {
    pub fn is_graph(&self) -> bool {
        self.kind == "graph"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_rows_and_panels() {
        let doc = json!({
            "title": "Ops",
            "rows": [
                {
                    "title": "graphs",
                    "panels": [
                        {"type": "graph", "title": "cpu", "grid": {"threshold1": 5}, "alertID": "7"},
                        {"title": "no type"},
                        42
                    ]
                },
                {"title": "collapsed"},
                "garbage"
            ]
        });

        let dashboard = Dashboard::from_value(doc).unwrap();
        assert_eq!(dashboard.rows.len(), 3);

        let row = dashboard.rows[0].as_row().unwrap();
        assert!(matches!(row.panels[0], PanelEntry::Panel(_)));
        assert!(matches!(row.panels[1], PanelEntry::Malformed(_)));
        assert!(matches!(row.panels[2], PanelEntry::Malformed(_)));
        assert_eq!(row.panels[1].title(), "no type");
        assert_eq!(row.panels[2].title(), "<untitled>");

        assert!(dashboard.rows[1].as_row().is_none());
        assert_eq!(dashboard.rows[1].title(), Some("collapsed"));
        assert!(matches!(dashboard.rows[2], RowEntry::Other(_)));

        let panels: Vec<&Panel> = dashboard.panels().collect();
        assert_eq!(panels.len(), 1);
        assert_eq!(panels[0].alert_id.as_deref(), Some("7"));
        assert!(panels[0].is_graph());
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let doc = json!({
            "title": "Ops",
            "refresh": "10s",
            "rows": [{
                "height": "250px",
                "panels": [{
                    "type": "graph",
                    "title": "cpu",
                    "span": 6,
                    "grid": {"threshold1": 5, "threshold1Color": "red"}
                }]
            }]
        });

        let dashboard = Dashboard::from_value(doc).unwrap();
        let value = dashboard.to_value().unwrap();

        assert_eq!(value["refresh"], "10s");
        assert_eq!(value["rows"][0]["height"], "250px");
        assert_eq!(value["rows"][0]["panels"][0]["span"], 6);
        assert_eq!(value["rows"][0]["panels"][0]["grid"]["threshold1Color"], "red");
        assert!(value["rows"][0]["panels"][0].get("alertID").is_none());
    }

    #[test]
    fn test_odd_row_fields_keep_the_panels() {
        let doc = json!({
            "title": "Ops",
            "rows": [{
                "title": 7,
                "collapse": "maybe",
                "panels": [{"type": "graph", "title": "cpu", "grid": {}}]
            }]
        });

        let dashboard = Dashboard::from_value(doc).unwrap();
        let row = dashboard.rows[0].as_row().unwrap();
        assert_eq!(row.panels.len(), 1);
        assert_eq!(row.title(), None);
        assert_eq!(dashboard.panels().count(), 1);

        let value = dashboard.to_value().unwrap();
        assert_eq!(value["rows"][0]["title"], 7);
    }

    #[test]
    fn test_rows_must_be_a_list() {
        let doc = json!({"title": "bad", "rows": {"panels": []}});
        assert!(Dashboard::from_value(doc).is_err());
    }
}
