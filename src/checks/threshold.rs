//! Threshold extraction from a panel's grid settings

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

fn threshold_key() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"threshold\d+$").expect("threshold pattern is valid"))
}

/// Collect the numeric values of every `thresholdN` key, in map order.
///
/// Null and non-numeric values are skipped. Keys such as `threshold1Color`
/// do not match since the digits must end the key.
pub fn extract_thresholds(grid: &Map<String, Value>) -> Vec<f64> {
    grid.iter()
        .filter(|(key, _)| threshold_key().is_match(key))
        .filter_map(|(key, value)| {
            let number = value.as_f64();
            if number.is_none() && !value.is_null() {
                tracing::debug!(key = %key, value = %value, "Ignoring non-numeric threshold");
            }
            number
        })
        .collect()
}
