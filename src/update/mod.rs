//! Update layer
//!
//! - [`orchestrator`]: resolves the latest version of every service concurrently
//! - [`summary`]: reports changed versions and warnings after a run

pub mod orchestrator;
pub mod summary;

pub use orchestrator::update_services;
pub use summary::{Summary, SummaryEntry};
