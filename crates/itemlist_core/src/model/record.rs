//! Record domain model.
//!
//! # Responsibility
//! - Define the single entity managed by the item list.
//! - Normalize and validate user-provided title/description drafts.
//!
//! # Invariants
//! - `id` and `created_at` are write-once; only `title` and `description`
//!   change after creation, and only through `Record::apply_draft`.
//! - `title` is never blank for a validated record.
//! - Absent `description` is distinct from empty text and is omitted from
//!   the serialized form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable record identifier.
///
/// Locally generated ids are opaque strings; ids assigned by a remote
/// collection are monotonically increasing integers. Both forms keep their
/// JSON shape (string vs number) across a serialization round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Collection-assigned sequence number.
    Seq(u64),
    /// Locally generated opaque key.
    Key(String),
}

impl RecordId {
    /// Wraps a locally generated key.
    pub fn key(value: impl Into<String>) -> Self {
        Self::Key(value.into())
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Seq(value) => write!(f, "{value}"),
            Self::Key(value) => f.write_str(value),
        }
    }
}

/// Validation failures for record input and persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordValidationError {
    /// Title is empty or whitespace-only.
    BlankTitle,
    /// Identifier is empty.
    BlankId,
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "title must not be blank"),
            Self::BlankId => write!(f, "record id must not be blank"),
        }
    }
}

impl Error for RecordValidationError {}

/// Normalized title/description pair used by create, update and edit flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RecordDraft {
    /// Builds a draft from raw form input.
    ///
    /// Title is trimmed and must be non-empty. Description is trimmed and
    /// collapses to `None` when nothing remains.
    pub fn new(
        title: impl AsRef<str>,
        description: Option<&str>,
    ) -> Result<Self, RecordValidationError> {
        let title = title.as_ref().trim();
        if title.is_empty() {
            return Err(RecordValidationError::BlankTitle);
        }

        Ok(Self {
            title: title.to_string(),
            description: normalize_description(description),
        })
    }
}

/// One item in the managed collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
}

impl Record {
    /// Creates a record from a validated draft.
    pub fn new(id: RecordId, draft: RecordDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            created_at,
        }
    }

    /// Replaces the mutable fields, leaving `id` and `created_at` untouched.
    pub fn apply_draft(&mut self, draft: &RecordDraft) {
        self.title = draft.title.clone();
        self.description = draft.description.clone();
    }

    /// Current values as an edit-form draft.
    pub fn to_draft(&self) -> RecordDraft {
        RecordDraft {
            title: self.title.clone(),
            description: self.description.clone(),
        }
    }

    /// Validates persisted-state invariants.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if let RecordId::Key(key) = &self.id {
            if key.trim().is_empty() {
                return Err(RecordValidationError::BlankId);
            }
        }
        if self.title.trim().is_empty() {
            return Err(RecordValidationError::BlankTitle);
        }
        Ok(())
    }

    /// Case-insensitive substring match over title and description.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .unwrap_or_default()
                .to_lowercase()
                .contains(needle)
    }
}

fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// ISO-8601 UTC timestamps with millisecond precision (`...T08:30:00.000Z`).
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&text)
            .map(|value| value.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
