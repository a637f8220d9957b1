//! Step types: a single point in a tour.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a step, unique within its owning tour.
pub type StepId = Uuid;

/// A source location a step points at.
///
/// `file` is relative to the project root. `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: PathBuf,
    pub line: u32,
}

impl Location {
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

/// A single point in a tour: a title, a markdown description, and an
/// optional source location.
///
/// A step without a location is description-only and does not navigate
/// anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StepRecord", into = "StepRecord")]
pub struct Step {
    pub id: StepId,
    pub title: String,
    pub description: String,
    pub location: Option<Location>,
}

impl Step {
    /// Builds a step with a fresh identity from a draft.
    pub fn from_draft(draft: StepDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
            location: draft.location,
        }
    }

    /// Whether this step can be opened in an editor.
    pub fn is_navigable(&self) -> bool {
        self.location.is_some()
    }
}

/// The user-editable content of a step, without identity.
///
/// Editor operations take drafts so callers never hold a step that is
/// still owned by a tour.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StepDraft {
    pub title: String,
    pub description: String,
    pub location: Option<Location>,
}

impl StepDraft {
    /// A description-only draft.
    pub fn note(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            location: None,
        }
    }

    /// A draft pointing at `file:line`.
    pub fn at(
        title: impl Into<String>,
        description: impl Into<String>,
        file: impl Into<PathBuf>,
        line: u32,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            location: Some(Location::new(file, line)),
        }
    }
}

impl From<&Step> for StepDraft {
    fn from(step: &Step) -> Self {
        Self {
            title: step.title.clone(),
            description: step.description.clone(),
            location: step.location.clone(),
        }
    }
}

/// On-disk shape of a step. `file` and `line` travel as flat optional
/// fields and must be both present or both absent.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StepRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<Uuid>,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
}

impl TryFrom<StepRecord> for Step {
    type Error = String;

    fn try_from(record: StepRecord) -> Result<Self, Self::Error> {
        if record.title.trim().is_empty() {
            return Err("step title is empty".to_string());
        }
        let location = match (record.file, record.line) {
            (Some(file), Some(line)) => Some(Location { file, line }),
            (None, None) => None,
            (Some(file), None) => {
                return Err(format!("step '{}' has file {} but no line", record.title, file.display()));
            }
            (None, Some(line)) => {
                return Err(format!("step '{}' has line {line} but no file", record.title));
            }
        };
        Ok(Self {
            id: record.id.unwrap_or_else(Uuid::new_v4),
            title: record.title,
            description: record.description,
            location,
        })
    }
}

impl From<Step> for StepRecord {
    fn from(step: Step) -> Self {
        let (file, line) = match step.location {
            Some(Location { file, line }) => (Some(file), Some(line)),
            None => (None, None),
        };
        Self {
            id: Some(step.id),
            title: step.title,
            description: step.description,
            file,
            line,
        }
    }
}
