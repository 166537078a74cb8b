//! Alerting checks derived from dashboard panels
//!
//! A graph panel with at least two `thresholdN` grid entries becomes a
//! [`Check`]: the first threshold is the warn level, the second the error
//! level, and the panel's first target is the monitored series.

pub mod builder;
pub mod threshold;

pub use builder::{BuildError, Check};
pub use threshold::extract_thresholds;
