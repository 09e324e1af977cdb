//! Core business logic - framework-agnostic budget, assignment and plan operations.
//!
//! Every operation takes the database connection and, where ownership matters,
//! the acting user explicitly.

/// Acting user identity and role
pub mod actor;
/// Assignment activation and deletion cascade
pub mod assignment;
/// Orphaned plan row detection
pub mod audit;
/// Budget templates and their typed content
pub mod budget;
/// Aggregated plan history per subject
pub mod history;
/// Leads and customers
pub mod people;
/// Plan kinds and generic plan table access
pub mod plans;
/// Lead-or-customer subject reference
pub mod subject;
/// Budget to plan synchronization
pub mod sync;
/// Workout templates
pub mod workout;
