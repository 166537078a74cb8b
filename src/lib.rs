//! checksync: dashboard threshold to alerting check sync
//!
//! Graph panels on a dashboard carry `thresholdN` values in their grid
//! settings. Whenever a dashboard is saved, checksync turns each eligible
//! panel into a check on a Seyren-style alerting backend, replacing the check
//! the panel pointed at before, and records the new check id on the panel.
//!
//! # Features
//!
//! - **Lenient Parsing**: Malformed rows and panels are skipped, never fatal
//! - **Create-or-Replace**: Existing checks are deleted before re-creation
//! - **Failure Isolation**: Each panel succeeds or fails on its own
//! - **Detached Sync**: Saves never wait on the alerting backend
//!
//! # Example
//!
//! ```no_run
//! use checksync::dashboard::Dashboard;
//! use checksync::sync::{SyncConfig, SyncOrchestrator};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let sync = SyncOrchestrator::new(&SyncConfig::new("http://seyren:8080"))?;
//!
//! let mut dashboard = Dashboard::from_value(serde_json::json!({
//!     "title": "Ops",
//!     "rows": [{"panels": [{
//!         "type": "graph",
//!         "title": "cpu",
//!         "grid": {"threshold1": 70, "threshold2": 90},
//!         "targets": [{"target": "servers.*.cpu"}]
//!     }]}]
//! }))?;
//!
//! for outcome in sync.sync(&mut dashboard).await {
//!     println!("{}: {:?}", outcome.panel(), outcome.id());
//! }
//! # Ok(())
//! # }
//! ```

pub mod alerting;
pub mod api;
pub mod checks;
pub mod dashboard;
pub mod sync;

// Re-export commonly used types
pub use alerting::{AlertingClient, ClientError};
pub use checks::{BuildError, Check};
pub use dashboard::{Dashboard, DashboardStore};
pub use sync::{SyncConfig, SyncOrchestrator, SyncOutcome};
