//! Core domain logic for the freelancer directory.
//! This crate is the single source of truth for profile invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, DirectoryConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config};
pub use model::freelancer::{Freelancer, FreelancerId, TagKind};
pub use repo::freelancer_repo::{
    FreelancerRepository, RepoError, RepoResult, SqliteFreelancerRepository,
};
pub use service::directory_service::{DirectoryService, ServiceError, ServiceResult};
pub use service::patch::{apply_patch, parse_patch_document, PatchError, PatchOperation};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
