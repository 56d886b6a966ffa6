//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return the semantic `NotFound` outcome separately from
//!   DB transport errors.

pub mod freelancer_repo;
