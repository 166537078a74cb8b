//! Dashboard documents and their storage

pub mod model;
pub mod store;

pub use model::{Dashboard, Panel, PanelEntry, Row, RowEntry};
pub use store::{DashboardStore, SaveCommand, SavedDashboard, StoreError};
