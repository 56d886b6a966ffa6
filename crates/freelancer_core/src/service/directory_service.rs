//! Directory use-case service.
//!
//! # Responsibility
//! - Expose the list/get/create/update/archive/search/patch boundary over any
//!   `FreelancerRepository`.
//! - Reject blank search queries before they reach storage.
//! - Emit one metadata-only log event per use-case call.
//!
//! # Invariants
//! - Not-found is reported as `ServiceError::NotFound`, never as a fatal error.
//! - Patch is fetch + in-memory edit + full update; it never writes partially.
//! - Log events carry ids and counts, never profile field values.

use crate::model::freelancer::{Freelancer, FreelancerId};
use crate::repo::freelancer_repo::{FreelancerRepository, RepoError};
use crate::service::patch::{apply_patch, PatchError, PatchOperation};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Service error for directory use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Search query is empty or whitespace only.
    EmptyQuery,
    /// Target profile does not exist.
    NotFound(FreelancerId),
    /// Patch document could not be applied.
    InvalidPatch(PatchError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl ServiceError {
    /// Returns whether the caller supplied unusable input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::EmptyQuery | Self::InvalidPatch(_))
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyQuery => write!(f, "search query cannot be empty"),
            Self::NotFound(id) => write!(f, "freelancer not found: {id}"),
            Self::InvalidPatch(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPatch(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<PatchError> for ServiceError {
    fn from(value: PatchError) -> Self {
        Self::InvalidPatch(value)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Directory service facade over repository implementations.
pub struct DirectoryService<R: FreelancerRepository> {
    repo: R,
}

impl<R: FreelancerRepository> DirectoryService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists every active profile.
    pub fn list_freelancers(&self) -> ServiceResult<Vec<Freelancer>> {
        let started_at = Instant::now();
        let result = self.repo.list_active().map_err(ServiceError::from);
        log_outcome("freelancer_list", started_at, &result, |items| {
            format!("count={}", items.len())
        });
        result
    }

    /// Gets one profile by id, archived or not.
    pub fn get_freelancer(&self, id: FreelancerId) -> ServiceResult<Freelancer> {
        let started_at = Instant::now();
        let result = self
            .repo
            .get(id)
            .map_err(ServiceError::from)
            .and_then(|found| found.ok_or(ServiceError::NotFound(id)));
        log_outcome("freelancer_get", started_at, &result, |_| format!("id={id}"));
        result
    }

    /// Creates a profile; any client-supplied id or archive flag is ignored.
    pub fn create_freelancer(&mut self, freelancer: &Freelancer) -> ServiceResult<Freelancer> {
        let started_at = Instant::now();
        let result = self.repo.create(freelancer).map_err(ServiceError::from);
        log_outcome("freelancer_create", started_at, &result, |created| {
            format!(
                "id={} skills={} hobbies={}",
                created.id,
                created.skills.len(),
                created.hobbies.len()
            )
        });
        result
    }

    /// Fully replaces one profile, including both tag collections.
    ///
    /// May set `is_archived` either way; this is how an archived profile is
    /// restored.
    pub fn update_freelancer(&mut self, freelancer: &Freelancer) -> ServiceResult<()> {
        let started_at = Instant::now();
        let id = freelancer.id;
        let result = self.repo.update(freelancer).map_err(ServiceError::from);
        log_outcome("freelancer_update", started_at, &result, |_| {
            format!(
                "id={id} skills={} hobbies={} archived={}",
                freelancer.skills.len(),
                freelancer.hobbies.len(),
                freelancer.is_archived
            )
        });
        result
    }

    /// Archives (soft-deletes) one profile. Idempotent.
    pub fn archive_freelancer(&mut self, id: FreelancerId) -> ServiceResult<()> {
        let started_at = Instant::now();
        let result = self.repo.archive(id).map_err(ServiceError::from);
        log_outcome("freelancer_archive", started_at, &result, |_| format!("id={id}"));
        result
    }

    /// Searches active profiles by username/email substring.
    ///
    /// # Errors
    /// - `EmptyQuery` when `query` is blank; storage is not touched.
    pub fn search_freelancers(&self, query: &str) -> ServiceResult<Vec<Freelancer>> {
        let started_at = Instant::now();
        let result = if query.trim().is_empty() {
            Err(ServiceError::EmptyQuery)
        } else {
            self.repo.search(query).map_err(ServiceError::from)
        };
        log_outcome("freelancer_search", started_at, &result, |items| {
            format!("query_len={} count={}", query.chars().count(), items.len())
        });
        result
    }

    /// Applies a patch document to one profile and persists it via full update.
    ///
    /// Returns the profile as persisted.
    pub fn patch_freelancer(
        &mut self,
        id: FreelancerId,
        operations: &[PatchOperation],
    ) -> ServiceResult<Freelancer> {
        let started_at = Instant::now();
        let result = self.patch_inner(id, operations);
        log_outcome("freelancer_patch", started_at, &result, |_| {
            format!("id={id} ops={}", operations.len())
        });
        result
    }

    fn patch_inner(
        &mut self,
        id: FreelancerId,
        operations: &[PatchOperation],
    ) -> ServiceResult<Freelancer> {
        let current = self.repo.get(id)?.ok_or(ServiceError::NotFound(id))?;
        let patched = apply_patch(&current, operations)?;
        self.repo.update(&patched)?;
        Ok(patched)
    }
}

fn log_outcome<T>(
    event: &str,
    started_at: Instant,
    result: &ServiceResult<T>,
    details: impl FnOnce(&T) -> String,
) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(value) => info!(
            "event={event} module=service status=ok duration_ms={duration_ms} {}",
            details(value)
        ),
        Err(ServiceError::NotFound(id)) => info!(
            "event={event} module=service status=not_found duration_ms={duration_ms} id={id}"
        ),
        Err(err) if err.is_invalid_input() => info!(
            "event={event} module=service status=rejected duration_ms={duration_ms} error={err}"
        ),
        Err(err) => error!(
            "event={event} module=service status=error duration_ms={duration_ms} error={err}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{DirectoryService, ServiceError};
    use crate::model::freelancer::{Freelancer, FreelancerId};
    use crate::repo::freelancer_repo::{FreelancerRepository, RepoError, RepoResult};
    use crate::service::patch::PatchOperation;
    use serde_json::json;
    use std::cell::Cell;
    use uuid::Uuid;

    /// Vec-backed fake that counts storage calls.
    #[derive(Default)]
    struct MemoryRepository {
        rows: Vec<Freelancer>,
        calls: Cell<usize>,
        updates: usize,
    }

    impl MemoryRepository {
        fn touch(&self) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    impl FreelancerRepository for MemoryRepository {
        fn list_active(&self) -> RepoResult<Vec<Freelancer>> {
            self.touch();
            Ok(self.rows.iter().filter(|f| f.is_active()).cloned().collect())
        }

        fn get(&self, id: FreelancerId) -> RepoResult<Option<Freelancer>> {
            self.touch();
            Ok(self.rows.iter().find(|f| f.id == id).cloned())
        }

        fn create(&mut self, freelancer: &Freelancer) -> RepoResult<Freelancer> {
            self.touch();
            let mut created = freelancer.clone();
            created.id = Uuid::new_v4();
            created.is_archived = false;
            self.rows.push(created.clone());
            Ok(created)
        }

        fn update(&mut self, freelancer: &Freelancer) -> RepoResult<()> {
            self.touch();
            self.updates += 1;
            let row = self
                .rows
                .iter_mut()
                .find(|f| f.id == freelancer.id)
                .ok_or(RepoError::NotFound(freelancer.id))?;
            *row = freelancer.clone();
            Ok(())
        }

        fn archive(&mut self, id: FreelancerId) -> RepoResult<()> {
            self.touch();
            let row = self
                .rows
                .iter_mut()
                .find(|f| f.id == id)
                .ok_or(RepoError::NotFound(id))?;
            row.archive();
            Ok(())
        }

        fn search(&self, query: &str) -> RepoResult<Vec<Freelancer>> {
            self.touch();
            Ok(self
                .rows
                .iter()
                .filter(|f| f.is_active())
                .filter(|f| f.username.contains(query) || f.email.contains(query))
                .cloned()
                .collect())
        }
    }

    fn ops(document: serde_json::Value) -> Vec<PatchOperation> {
        serde_json::from_value(document).expect("patch document should parse")
    }

    #[test]
    fn blank_search_query_is_rejected_before_storage() {
        let service = DirectoryService::new(MemoryRepository::default());
        for query in ["", "   ", "\t\n"] {
            let err = service.search_freelancers(query).unwrap_err();
            assert!(matches!(err, ServiceError::EmptyQuery));
        }
        assert_eq!(service.repo.calls.get(), 0);
    }

    #[test]
    fn get_unknown_id_maps_to_not_found() {
        let service = DirectoryService::new(MemoryRepository::default());
        let id = Uuid::new_v4();
        let err = service.get_freelancer(id).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(missing) if missing == id));
    }

    #[test]
    fn patch_applies_edits_and_persists_through_update() {
        let mut service = DirectoryService::new(MemoryRepository::default());
        let created = service
            .create_freelancer(
                &Freelancer::new("jane_smith", "jane@example.com", "9876543210")
                    .with_skills(["React"]),
            )
            .unwrap();

        let patched = service
            .patch_freelancer(
                created.id,
                &ops(json!([{"op": "add", "path": "/skills/-", "value": "TypeScript"}])),
            )
            .unwrap();
        assert_eq!(patched.skills, vec!["React", "TypeScript"]);
        assert_eq!(service.repo.updates, 1);
        assert_eq!(service.get_freelancer(created.id).unwrap(), patched);
    }

    #[test]
    fn invalid_patch_does_not_reach_update() {
        let mut service = DirectoryService::new(MemoryRepository::default());
        let created = service
            .create_freelancer(&Freelancer::new("a", "a@example.com", "1"))
            .unwrap();

        let err = service
            .patch_freelancer(
                created.id,
                &ops(json!([{"op": "replace", "path": "/id", "value": "other"}])),
            )
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(service.repo.updates, 0);
    }

    #[test]
    fn patch_unknown_id_is_not_found() {
        let mut service = DirectoryService::new(MemoryRepository::default());
        let err = service.patch_freelancer(Uuid::new_v4(), &[]).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
