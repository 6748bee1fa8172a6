//! Daily ranked match reports.
//!
//! For every configured player the crate resolves the Riot account, lists the ranked
//! matches of the last day, reduces each match to one row and exports the rows to an
//! `.xlsx` file.

pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod riot;
pub mod stats;

pub use config::{Config, FailurePolicy, PlayerSpec};
pub use error::AppError;
pub use pipeline::{ReportJob, RunSummary, TracingProgress};
