//! Alerting backend integration

pub mod client;
#[cfg(test)]
pub(crate) mod testing;

pub use client::{AlertingClient, ClientError, Credentials};
