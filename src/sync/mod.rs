//! Dashboard-to-alerting sync
//!
//! Every saved dashboard gets a background pass that turns eligible graph
//! panels into checks on the alerting backend and records the assigned check
//! ids on the panels of the pass's own copy of the document.

pub mod config;
pub mod orchestrator;

pub use config::SyncConfig;
pub use orchestrator::{SyncOrchestrator, SyncOutcome};
