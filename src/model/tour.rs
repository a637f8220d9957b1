//! Tour types: an ordered, named sequence of steps.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::step::Step;

/// Identity of a tour, unique across the repository.
pub type TourId = Uuid;

/// File extension every tour file handle carries.
pub const TOUR_EXTENSION: &str = "tour";

/// An ordered, named sequence of steps with a persistence handle.
///
/// Fields are private: the step sequence is only mutated by the editor,
/// never in place by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    #[serde(default = "Uuid::new_v4")]
    id: TourId,
    title: String,
    #[serde(default)]
    tour_file: String,
    #[serde(default)]
    description: String,
    #[serde(default = "Timestamp::now")]
    created_at: Timestamp,
    #[serde(default)]
    steps: Vec<Step>,
}

impl Tour {
    /// Creates an empty tour with a fresh identity, stamped now.
    pub fn new(title: impl Into<String>, tour_file: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            tour_file: tour_file.into(),
            description: String::new(),
            created_at: Timestamp::now(),
            steps: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn id(&self) -> TourId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tour_file(&self) -> &str {
        &self.tour_file
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// The steps in navigation order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = title;
    }

    pub(crate) fn set_description(&mut self, description: String) {
        self.description = description;
    }

    /// Fills in the file handle of a record that was stored without one.
    pub(crate) fn set_tour_file_if_empty(&mut self, tour_file: &str) {
        if self.tour_file.is_empty() {
            self.tour_file = tour_file.to_string();
        }
    }

    pub(crate) fn steps_mut(&mut self) -> &mut Vec<Step> {
        &mut self.steps
    }
}

/// Whether `name` is an acceptable tour file handle: a bare file name with
/// a non-empty stem and the `.tour` extension.
pub fn is_valid_tour_file(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) => ext == TOUR_EXTENSION && !stem.trim().is_empty(),
        None => false,
    }
}
