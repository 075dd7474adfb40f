//! Types for recording training metrics.
//!
//! * [`Record`] - A container of key-value pairs, returned by optimization steps
//!   and built from episode summaries.
//! * [`RecordValue`] - The values a record can hold.
//! * [`MetricsRecorder`] - Per-episode history of a run, exported as CSV for
//!   external plotting.
//!
//! # Basic Usage
//!
//! ```rust
//! use tractor_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("loss", 0.25);
//! record.insert("episode", RecordValue::Scalar(4.0));
//! assert_eq!(record.get_scalar("loss").unwrap(), 0.25);
//! ```
mod base;
mod metrics;

pub use base::{Record, RecordValue};
pub use metrics::{EpisodeSummary, MetricsRecorder, WindowStats};
