//! Application status workflow: the canonical status vocabulary, who may move an
//! application out of its initial state, and the per-account listings built on top.
//!
//! Legality is enforced by the backend; the checks here keep the client from
//! offering or sending actions it already knows are invalid.

pub mod board;
pub mod gateway;
pub mod policy;
pub mod service;
pub mod statistics;
pub mod status;

#[cfg(test)]
mod tests;

pub use board::ApplicationBoard;
pub use gateway::ApplicationGateway;
pub use policy::{ApplicationAction, ApplicationPolicy, PolicyDenial};
pub use service::{ApplicationWorkflow, WorkflowError};
pub use statistics::{ReconciledStatistics, StatisticsMismatch, StatusCounts};
pub use status::{ApplicationStatus, Locale, RecordedStatus, StatusFilter, StatusVocabulary};
