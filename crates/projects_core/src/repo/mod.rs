//! Record access layer.
//!
//! # Responsibility
//! - Define the project data access contract.
//! - Keep SQL and transaction handling out of the service and menu layers.
//!
//! # Invariants
//! - Repository APIs report absence through `Option`/`bool`; only store
//!   failures are errors.

pub mod project_repo;
