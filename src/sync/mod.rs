//! Note/tracker reconciliation.
//!
//! [`SyncOrchestrator`] runs a [`Reconciler`] per configured provider and
//! collects one [`Report`] each. Note bodies are split and rebuilt by the
//! functions in [`merge`].

pub mod merge;
mod orchestrator;
mod reconciler;
mod report;

#[cfg(test)]
pub(crate) mod fake_provider;

pub use merge::{build_body, split_body, MergeError, SplitBody, SYNC_MARKER};
pub use orchestrator::SyncOrchestrator;
pub use reconciler::{Reconciler, SyncError};
pub use report::{Outcome, Report, ReportBuilder};
