//! Domain model for the freelancer directory.
//!
//! # Responsibility
//! - Define the flat profile shape shared by repository, service and CLI.
//!
//! # Invariants
//! - Every profile is identified by a stable `FreelancerId`.
//! - Removal is represented by the archive flag, never by hard delete.

pub mod freelancer;
