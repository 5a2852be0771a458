//! Domain records for projects and their read-only children.

pub mod project;
