//! Organization domain model.
//!
//! # Responsibility
//! - Define the canonical organizational unit record.
//! - Validate identity, naming and parent-pointer invariants before storage.
//!
//! # Invariants
//! - `id` is stable and never reused for another organization.
//! - `parent_id = None` marks a forest root.
//! - An organization can never be its own parent.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every organization record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type OrgId = Uuid;

/// Upper bound for `name` and `code` lengths, in characters.
pub const MAX_FIELD_CHARS: usize = 1000;

// Codes are machine-facing keys: leading alphanumeric, then a restricted
// punctuation set. Whitespace and control characters are rejected.
static CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.:-]*$").expect("static code pattern"));

/// Validation failures for organization records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizationValidationError {
    /// `id` is the nil uuid.
    NilId,
    /// `name` is blank after trim.
    BlankName,
    /// `name` exceeds `MAX_FIELD_CHARS`.
    NameTooLong(usize),
    /// `code` is blank.
    BlankCode,
    /// `code` exceeds `MAX_FIELD_CHARS`.
    CodeTooLong(usize),
    /// `code` does not match the accepted pattern.
    MalformedCode(String),
    /// `parent_id` equals `id`.
    SelfParent(OrgId),
}

impl Display for OrganizationValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "organization id must not be the nil uuid"),
            Self::BlankName => write!(f, "organization name must not be blank"),
            Self::NameTooLong(chars) => write!(
                f,
                "organization name has {chars} chars, limit is {MAX_FIELD_CHARS}"
            ),
            Self::BlankCode => write!(f, "organization code must not be blank"),
            Self::CodeTooLong(chars) => write!(
                f,
                "organization code has {chars} chars, limit is {MAX_FIELD_CHARS}"
            ),
            Self::MalformedCode(code) => write!(f, "organization code `{code}` is malformed"),
            Self::SelfParent(id) => write!(f, "organization {id} cannot be its own parent"),
        }
    }
}

impl Error for OrganizationValidationError {}

/// Canonical record for one organizational unit.
///
/// The parent pointer alone carries the hierarchy; no materialized path or
/// depth column exists, so all closure queries derive structure at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Stable global ID used for linking and hierarchy pointers.
    pub id: OrgId,
    /// Display name. Not unique; used for presentation ordering.
    pub name: String,
    /// Globally unique business code.
    pub code: String,
    /// Parent organization. `None` marks a root.
    pub parent_id: Option<OrgId>,
}

impl Organization {
    /// Creates a new organization with a generated stable ID.
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        parent_id: Option<OrgId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            code: code.into(),
            parent_id,
        }
    }

    /// Creates an organization with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    ///
    /// # Errors
    /// Rejects the nil uuid and self-parenting up front; full field
    /// validation still happens in `validate()` on the write path.
    pub fn with_id(
        id: OrgId,
        name: impl Into<String>,
        code: impl Into<String>,
        parent_id: Option<OrgId>,
    ) -> Result<Self, OrganizationValidationError> {
        if id.is_nil() {
            return Err(OrganizationValidationError::NilId);
        }
        if parent_id == Some(id) {
            return Err(OrganizationValidationError::SelfParent(id));
        }
        Ok(Self {
            id,
            name: name.into(),
            code: code.into(),
            parent_id,
        })
    }

    /// Returns whether this record is a forest root.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Checks all model invariants.
    ///
    /// # Errors
    /// Returns the first violated invariant. Storage-level constraints
    /// (code uniqueness, parent existence) are out of scope here and are
    /// enforced by the store.
    pub fn validate(&self) -> Result<(), OrganizationValidationError> {
        if self.id.is_nil() {
            return Err(OrganizationValidationError::NilId);
        }
        if self.name.trim().is_empty() {
            return Err(OrganizationValidationError::BlankName);
        }
        let name_chars = self.name.chars().count();
        if name_chars > MAX_FIELD_CHARS {
            return Err(OrganizationValidationError::NameTooLong(name_chars));
        }
        if self.code.is_empty() {
            return Err(OrganizationValidationError::BlankCode);
        }
        let code_chars = self.code.chars().count();
        if code_chars > MAX_FIELD_CHARS {
            return Err(OrganizationValidationError::CodeTooLong(code_chars));
        }
        if !CODE_PATTERN.is_match(&self.code) {
            return Err(OrganizationValidationError::MalformedCode(self.code.clone()));
        }
        if self.parent_id == Some(self.id) {
            return Err(OrganizationValidationError::SelfParent(self.id));
        }
        Ok(())
    }
}
