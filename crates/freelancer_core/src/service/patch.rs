//! Field-level patch documents for freelancer profiles.
//!
//! # Responsibility
//! - Parse JSON-Patch style edit lists (`add`, `remove`, `replace`, `move`,
//!   `copy`, `test`).
//! - Apply them to an in-memory copy of a flat profile.
//!
//! # Invariants
//! - Application is all-or-nothing: on any error the input is untouched.
//! - `/id` is never writable.
//! - Patching is not a persistence operation; callers persist the result
//!   through the normal full-update path.

use crate::model::freelancer::{Freelancer, TagKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One edit operation of a patch document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add { path: String, value: Value },
    Remove { path: String },
    Replace { path: String, value: Value },
    Move { from: String, path: String },
    Copy { from: String, path: String },
    Test { path: String, value: Value },
}

impl PatchOperation {
    pub fn path(&self) -> &str {
        match self {
            Self::Add { path, .. }
            | Self::Remove { path }
            | Self::Replace { path, .. }
            | Self::Move { path, .. }
            | Self::Copy { path, .. }
            | Self::Test { path, .. } => path,
        }
    }
}

/// Errors raised while parsing or applying a patch document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// Document is not a JSON array of operations.
    Malformed(String),
    /// Path does not address a patchable profile field.
    UnsupportedPath(String),
    /// Path addresses a field that can never change.
    ImmutableField(String),
    /// List index is outside the current list bounds.
    IndexOutOfRange { path: String, len: usize },
    /// Value has the wrong JSON type for the addressed field.
    InvalidValue {
        path: String,
        expected: &'static str,
    },
    /// A `test` operation did not match the current value.
    TestFailed(String),
}

impl Display for PatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(message) => write!(f, "malformed patch document: {message}"),
            Self::UnsupportedPath(path) => write!(f, "unsupported patch path `{path}`"),
            Self::ImmutableField(path) => write!(f, "patch path `{path}` is immutable"),
            Self::IndexOutOfRange { path, len } => {
                write!(f, "patch path `{path}` is out of range for list of length {len}")
            }
            Self::InvalidValue { path, expected } => {
                write!(f, "patch value for `{path}` must be {expected}")
            }
            Self::TestFailed(path) => write!(f, "patch test failed at `{path}`"),
        }
    }
}

impl Error for PatchError {}

/// Parses a JSON patch document (an array of operations).
pub fn parse_patch_document(json: &str) -> Result<Vec<PatchOperation>, PatchError> {
    serde_json::from_str(json).map_err(|err| PatchError::Malformed(err.to_string()))
}

/// Applies `operations` in order to a copy of `freelancer`.
///
/// # Errors
/// Returns the first failing operation's error; the input is never modified.
pub fn apply_patch(
    freelancer: &Freelancer,
    operations: &[PatchOperation],
) -> Result<Freelancer, PatchError> {
    let mut patched = freelancer.clone();
    for operation in operations {
        apply_operation(&mut patched, operation)?;
    }
    Ok(patched)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextField {
    Username,
    Email,
    PhoneNumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListIndex {
    At(usize),
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatchTarget {
    Text(TextField),
    IsArchived,
    Tags(TagKind),
    TagElement(TagKind, ListIndex),
}

fn apply_operation(
    freelancer: &mut Freelancer,
    operation: &PatchOperation,
) -> Result<(), PatchError> {
    let path = operation.path();
    let target = parse_path(path)?;

    match operation {
        PatchOperation::Add { value, .. } => add_value(freelancer, target, path, value),
        PatchOperation::Replace { value, .. } => set_value(freelancer, target, path, value),
        PatchOperation::Remove { .. } => remove_value(freelancer, target, path),
        PatchOperation::Move { from, .. } => {
            let source = parse_path(from)?;
            let value = read_value(freelancer, source, from)?;
            remove_value(freelancer, source, from)?;
            add_value(freelancer, target, path, &value)
        }
        PatchOperation::Copy { from, .. } => {
            let source = parse_path(from)?;
            let value = read_value(freelancer, source, from)?;
            add_value(freelancer, target, path, &value)
        }
        PatchOperation::Test { value, .. } => {
            let current = read_value(freelancer, target, path)?;
            if &current == value {
                Ok(())
            } else {
                Err(PatchError::TestFailed(path.to_string()))
            }
        }
    }
}

fn add_value(
    freelancer: &mut Freelancer,
    target: PatchTarget,
    path: &str,
    value: &Value,
) -> Result<(), PatchError> {
    let PatchTarget::TagElement(kind, index) = target else {
        return set_value(freelancer, target, path, value);
    };
    let name = expect_string(path, value)?;
    let tags = freelancer.tags_mut(kind);
    match index {
        ListIndex::End => tags.push(name),
        ListIndex::At(at) if at <= tags.len() => tags.insert(at, name),
        ListIndex::At(_) => return Err(out_of_range(path, tags.len())),
    }
    Ok(())
}

fn remove_value(
    freelancer: &mut Freelancer,
    target: PatchTarget,
    path: &str,
) -> Result<(), PatchError> {
    match target {
        PatchTarget::Text(field) => text_field_mut(freelancer, field).clear(),
        PatchTarget::IsArchived => freelancer.is_archived = false,
        PatchTarget::Tags(kind) => freelancer.tags_mut(kind).clear(),
        PatchTarget::TagElement(kind, index) => {
            let tags = freelancer.tags_mut(kind);
            let at = existing_index(path, index, tags.len())?;
            tags.remove(at);
        }
    }
    Ok(())
}

fn set_value(
    freelancer: &mut Freelancer,
    target: PatchTarget,
    path: &str,
    value: &Value,
) -> Result<(), PatchError> {
    match target {
        PatchTarget::Text(field) => {
            *text_field_mut(freelancer, field) = expect_string(path, value)?;
        }
        PatchTarget::IsArchived => {
            freelancer.is_archived = value.as_bool().ok_or_else(|| PatchError::InvalidValue {
                path: path.to_string(),
                expected: "a boolean",
            })?
        }
        PatchTarget::Tags(kind) => *freelancer.tags_mut(kind) = expect_string_list(path, value)?,
        PatchTarget::TagElement(kind, index) => {
            let name = expect_string(path, value)?;
            let tags = freelancer.tags_mut(kind);
            let at = existing_index(path, index, tags.len())?;
            tags[at] = name;
        }
    }
    Ok(())
}

fn read_value(
    freelancer: &Freelancer,
    target: PatchTarget,
    path: &str,
) -> Result<Value, PatchError> {
    let value = match target {
        PatchTarget::Text(TextField::Username) => Value::from(freelancer.username.as_str()),
        PatchTarget::Text(TextField::Email) => Value::from(freelancer.email.as_str()),
        PatchTarget::Text(TextField::PhoneNumber) => Value::from(freelancer.phone_number.as_str()),
        PatchTarget::IsArchived => Value::Bool(freelancer.is_archived),
        PatchTarget::Tags(kind) => Value::from(freelancer.tags(kind).to_vec()),
        PatchTarget::TagElement(kind, index) => {
            let tags = freelancer.tags(kind);
            let at = existing_index(path, index, tags.len())?;
            Value::from(tags[at].as_str())
        }
    };
    Ok(value)
}

fn text_field_mut(freelancer: &mut Freelancer, field: TextField) -> &mut String {
    match field {
        TextField::Username => &mut freelancer.username,
        TextField::Email => &mut freelancer.email,
        TextField::PhoneNumber => &mut freelancer.phone_number,
    }
}

fn parse_path(path: &str) -> Result<PatchTarget, PatchError> {
    let unsupported = || PatchError::UnsupportedPath(path.to_string());
    let rest = path.strip_prefix('/').ok_or_else(unsupported)?;
    let segments = rest.split('/').map(unescape_segment).collect::<Vec<_>>();

    let field = segments[0].to_ascii_lowercase();
    let list_kind = match field.as_str() {
        "skills" | "skillsets" => Some(TagKind::Skill),
        "hobbies" => Some(TagKind::Hobby),
        _ => None,
    };

    match (list_kind, segments.as_slice()) {
        (Some(kind), [_]) => Ok(PatchTarget::Tags(kind)),
        (Some(kind), [_, index]) => {
            let index = if index == "-" {
                ListIndex::End
            } else {
                ListIndex::At(index.parse().map_err(|_| unsupported())?)
            };
            Ok(PatchTarget::TagElement(kind, index))
        }
        (None, [_]) => match field.as_str() {
            "username" => Ok(PatchTarget::Text(TextField::Username)),
            "email" => Ok(PatchTarget::Text(TextField::Email)),
            "phonenumber" => Ok(PatchTarget::Text(TextField::PhoneNumber)),
            "isarchived" => Ok(PatchTarget::IsArchived),
            "id" => Err(PatchError::ImmutableField(path.to_string())),
            _ => Err(unsupported()),
        },
        _ => Err(unsupported()),
    }
}

// JSON Pointer escapes: `~1` is `/`, `~0` is `~`.
fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

fn existing_index(path: &str, index: ListIndex, len: usize) -> Result<usize, PatchError> {
    match index {
        ListIndex::At(at) if at < len => Ok(at),
        _ => Err(out_of_range(path, len)),
    }
}

fn out_of_range(path: &str, len: usize) -> PatchError {
    PatchError::IndexOutOfRange {
        path: path.to_string(),
        len,
    }
}

fn expect_string(path: &str, value: &Value) -> Result<String, PatchError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| PatchError::InvalidValue {
            path: path.to_string(),
            expected: "a string",
        })
}

fn expect_string_list(path: &str, value: &Value) -> Result<Vec<String>, PatchError> {
    let invalid = || PatchError::InvalidValue {
        path: path.to_string(),
        expected: "an array of strings",
    };
    value
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}
