//! Freelancer profile domain model.
//!
//! # Responsibility
//! - Define the flat profile record exchanged with callers.
//! - Provide lifecycle helpers for archive (soft-delete) semantics.
//!
//! # Invariants
//! - `id` is stable and never reused for another profile.
//! - `is_archived` is the source of truth for soft-delete state.
//! - Tag lists keep caller order and duplicates exactly as supplied.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of one freelancer profile.
pub type FreelancerId = Uuid;

/// Flat freelancer profile: one profile row plus its two tag-name lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Freelancer {
    /// Assigned by the repository on create; ignored on create input.
    pub id: FreelancerId,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    /// Soft-delete flag. Archived profiles stay readable by id.
    pub is_archived: bool,
    /// Skill tag names in insertion order.
    #[serde(alias = "skillsets")]
    pub skills: Vec<String>,
    /// Hobby tag names in insertion order.
    pub hobbies: Vec<String>,
}

impl Freelancer {
    /// Creates an active profile with a nil id and empty tag lists.
    ///
    /// The id is filled in when the profile is persisted.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::nil(),
            username: username.into(),
            email: email.into(),
            phone_number: phone_number.into(),
            is_archived: false,
            skills: Vec::new(),
            hobbies: Vec::new(),
        }
    }

    /// Builder-style setter for the skill list.
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style setter for the hobby list.
    pub fn with_hobbies<I, S>(mut self, hobbies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hobbies = hobbies.into_iter().map(Into::into).collect();
        self
    }

    /// Marks this profile as archived.
    pub fn archive(&mut self) {
        self.is_archived = true;
    }

    /// Clears the archive flag. Only reachable through a full update.
    pub fn restore(&mut self) {
        self.is_archived = false;
    }

    /// Returns whether this profile shows up in list and search.
    pub fn is_active(&self) -> bool {
        !self.is_archived
    }

    /// Returns the tag list of the given kind.
    pub fn tags(&self, kind: TagKind) -> &[String] {
        match kind {
            TagKind::Skill => &self.skills,
            TagKind::Hobby => &self.hobbies,
        }
    }

    /// Returns the mutable tag list of the given kind.
    pub fn tags_mut(&mut self, kind: TagKind) -> &mut Vec<String> {
        match kind {
            TagKind::Skill => &mut self.skills,
            TagKind::Hobby => &mut self.hobbies,
        }
    }
}

/// The two tag collections a profile owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Skill,
    Hobby,
}

impl TagKind {
    pub const ALL: [TagKind; 2] = [TagKind::Skill, TagKind::Hobby];

    /// Storage table holding tags of this kind.
    pub fn table(self) -> &'static str {
        match self {
            TagKind::Skill => "skills",
            TagKind::Hobby => "hobbies",
        }
    }
}
