//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into boundary-level APIs.
//! - Keep CLI/UI layers decoupled from storage details.

pub mod directory_service;
pub mod patch;
