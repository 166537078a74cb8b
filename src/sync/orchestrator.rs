//! Create-or-replace sync of panel checks

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use super::config::SyncConfig;
use crate::alerting::{AlertingClient, ClientError};
use crate::checks::{BuildError, Check};
use crate::dashboard::{Dashboard, PanelEntry, RowEntry};

/// Result of syncing one panel
#[derive(Debug)]
pub enum SyncOutcome {
    /// Check created; `replaced` holds the id of the check deleted first
    Synced {
        panel: String,
        id: String,
        replaced: Option<String>,
    },
    /// Panel does not describe a check
    Skipped { panel: String, reason: BuildError },
    /// Backend refused or could not be reached
    Failed { panel: String, error: ClientError },
}

impl SyncOutcome {
    pub fn panel(&self) -> &str {
        match self {
            SyncOutcome::Synced { panel, .. }
            | SyncOutcome::Skipped { panel, .. }
            | SyncOutcome::Failed { panel, .. } => panel,
        }
    }

    pub fn is_synced(&self) -> bool {
        matches!(self, SyncOutcome::Synced { .. })
    }

    /// New check id, when one was created
    pub fn id(&self) -> Option<&str> {
        match self {
            SyncOutcome::Synced { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// Syncs dashboard panels to the alerting backend
pub struct SyncOrchestrator {
    /// `None` when no backend is configured
    client: Option<AlertingClient>,
    /// Bounds sync passes in flight
    permits: Arc<Semaphore>,
}

impl SyncOrchestrator {
    pub fn new(config: &SyncConfig) -> Result<Self, ClientError> {
        let client = match config.base_url.as_deref() {
            Some(url) => {
                let client = AlertingClient::new(url, config.credentials(), config.timeout)?;
                tracing::info!(
                    url = %client.base_url(),
                    max_concurrent = config.max_concurrent_syncs,
                    "Check sync enabled"
                );
                Some(client)
            }
            None => {
                tracing::info!("No alerting backend URL configured, check sync disabled");
                None
            }
        };

        Ok(Self {
            client,
            permits: Arc::new(Semaphore::new(config.max_concurrent_syncs.max(1))),
        })
    }

    pub fn disabled() -> Self {
        Self {
            client: None,
            permits: Arc::new(Semaphore::new(1)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Run a sync pass over a copy of `document` in the background.
    ///
    /// Returns `None` without doing anything when sync is disabled. The pass
    /// waits for a free slot before touching the backend; its outcomes are
    /// only logged.
    pub fn spawn(self: &Arc<Self>, document: Value) -> Option<JoinHandle<()>> {
        if !self.is_enabled() {
            return None;
        }

        let this = Arc::clone(self);
        Some(tokio::spawn(async move {
            let Ok(_permit) = Arc::clone(&this.permits).acquire_owned().await else {
                return;
            };

            let mut dashboard = match Dashboard::from_value(document) {
                Ok(dashboard) => dashboard,
                Err(e) => {
                    tracing::warn!(error = %e, "Dashboard cannot be read, skipping check sync");
                    return;
                }
            };

            let outcomes = this.sync(&mut dashboard).await;
            let synced = outcomes.iter().filter(|o| o.is_synced()).count();
            let failed = outcomes
                .iter()
                .filter(|o| matches!(o, SyncOutcome::Failed { .. }))
                .count();
            tracing::info!(
                dashboard = %dashboard.title,
                synced,
                failed,
                skipped = outcomes.len() - synced - failed,
                "Check sync finished"
            );
        }))
    }

    /// Sync every panel of `dashboard`, writing new check ids into the panels.
    ///
    /// Each panel is handled on its own; a failure never stops the pass.
    pub async fn sync(&self, dashboard: &mut Dashboard) -> Vec<SyncOutcome> {
        let Some(client) = self.client.as_ref() else {
            return Vec::new();
        };

        let mut outcomes = Vec::new();
        for entry in dashboard.rows.iter_mut() {
            let row = match entry {
                RowEntry::Row(row) => row,
                RowEntry::Other(value) => {
                    log_skipped_row(value);
                    continue;
                }
            };

            for panel in row.panels.iter_mut() {
                outcomes.push(sync_panel(client, panel).await);
            }
        }
        outcomes
    }
}

async fn sync_panel(client: &AlertingClient, entry: &mut PanelEntry) -> SyncOutcome {
    let title = entry.title().to_string();

    let check = match Check::from_entry(entry) {
        Ok(check) => check,
        Err(reason) => {
            tracing::debug!(panel = %title, reason = %reason, "Panel has no check, moving on");
            return SyncOutcome::Skipped {
                panel: title,
                reason,
            };
        }
    };

    let replaced = if check.is_registered() {
        tracing::info!(panel = %title, check_id = %check.id, "Deleting the existing check");
        match client.delete(&check).await {
            Ok(status) => tracing::info!(check_id = %check.id, status = %status, "Delete status"),
            Err(e) => tracing::warn!(check_id = %check.id, error = %e, "Failed to delete check"),
        }
        Some(check.id.clone())
    } else {
        None
    };

    match client.create(&check).await {
        Ok(id) => {
            if let PanelEntry::Panel(panel) = entry {
                panel.alert_id = Some(id.clone());
            }
            tracing::info!(panel = %title, check_id = %id, "Check synced");
            SyncOutcome::Synced {
                panel: title,
                id,
                replaced,
            }
        }
        Err(error) => {
            tracing::error!(panel = %title, error = %error, "Failed to create check");
            SyncOutcome::Failed {
                panel: title,
                error,
            }
        }
    }
}

fn log_skipped_row(row: &Value) {
    let title = row.get("title").and_then(Value::as_str).unwrap_or("<untitled>");
    if row.get("panels").is_some() {
        tracing::warn!(row = %title, "Row panels are not a list, ignoring row");
    } else {
        tracing::debug!(row = %title, "Row has no panels, ignoring");
    }
}
