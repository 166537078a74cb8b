//! In-memory dashboard store

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request to save a dashboard
#[derive(Debug, Clone, Deserialize)]
pub struct SaveCommand {
    pub dashboard: Value,
    #[serde(default)]
    pub overwrite: bool,
}

/// A stored dashboard
#[derive(Debug, Clone, Serialize)]
pub struct SavedDashboard {
    pub id: i64,
    pub slug: String,
    pub version: i64,
    pub updated: DateTime<Utc>,
    pub data: Value,
}

/// Dashboards indexed by slug
pub struct DashboardStore {
    dashboards: RwLock<HashMap<String, SavedDashboard>>,
    next_id: AtomicI64,
}

impl DashboardStore {
    pub fn new() -> Self {
        Self {
            dashboards: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Save a dashboard, assigning an id on first save and bumping the version
    pub fn save(&self, cmd: SaveCommand) -> Result<SavedDashboard, StoreError> {
        let SaveCommand {
            dashboard: mut data,
            overwrite,
        } = cmd;

        let title = data
            .get("title")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .ok_or(StoreError::MissingTitle)?
            .to_string();
        let slug = slugify(&title);
        let incoming_id = data.get("id").and_then(Value::as_i64);
        let incoming_version = data.get("version").and_then(Value::as_i64);

        let mut dashboards = self.dashboards.write();

        let existing = match incoming_id {
            Some(id) => {
                let found = dashboards
                    .values()
                    .find(|d| d.id == id)
                    .cloned()
                    .ok_or(StoreError::NotFound(id.to_string()))?;

                if !overwrite {
                    if let Some(version) = incoming_version {
                        if version < found.version {
                            return Err(StoreError::VersionMismatch {
                                stored: found.version,
                                given: version,
                            });
                        }
                    }
                }
                Some(found)
            }
            None => None,
        };

        if let Some(same_name) = dashboards.get(&slug) {
            let is_self = existing.as_ref().map(|e| e.id) == Some(same_name.id);
            if !is_self && !overwrite {
                return Err(StoreError::NameExists(slug));
            }
        }

        // Renames leave the old slug behind
        if let Some(ref previous) = existing {
            if previous.slug != slug {
                dashboards.remove(&previous.slug);
            }
        }

        let id = existing
            .as_ref()
            .map(|e| e.id)
            .unwrap_or_else(|| self.next_id.fetch_add(1, Ordering::SeqCst));
        let version = existing.as_ref().map(|e| e.version + 1).unwrap_or(1);

        if let Some(obj) = data.as_object_mut() {
            obj.insert("id".to_string(), Value::from(id));
            obj.insert("version".to_string(), Value::from(version));
        }

        let saved = SavedDashboard {
            id,
            slug: slug.clone(),
            version,
            updated: Utc::now(),
            data,
        };
        dashboards.insert(slug, saved.clone());

        tracing::debug!(slug = %saved.slug, version = saved.version, "Dashboard saved");
        Ok(saved)
    }

    pub fn get(&self, slug: &str) -> Option<SavedDashboard> {
        self.dashboards.read().get(slug).cloned()
    }

    pub fn delete(&self, slug: &str) -> Result<SavedDashboard, StoreError> {
        self.dashboards
            .write()
            .remove(slug)
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))
    }

    /// All stored dashboards, ordered by slug
    pub fn list(&self) -> Vec<SavedDashboard> {
        let mut all: Vec<SavedDashboard> = self.dashboards.read().values().cloned().collect();
        all.sort_by(|a, b| a.slug.cmp(&b.slug));
        all
    }
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercased title with runs of non-alphanumerics collapsed to `-`
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Dashboard title is required")]
    MissingTitle,

    #[error("A dashboard with the same name already exists: {0}")]
    NameExists(String),

    #[error("Dashboard version mismatch (stored {stored}, given {given})")]
    VersionMismatch { stored: i64, given: i64 },

    #[error("Dashboard not found: {0}")]
    NotFound(String),
}
