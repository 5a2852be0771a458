//! Use-case services over the repository layer.
//!
//! # Responsibility
//! - Turn "no such row" results into explicit not-found errors.
//! - Keep the menu loop decoupled from storage details.

pub mod project_service;
