//! The onboarding assistant: a generated, read-only tour for first-run
//! guidance.
//!
//! It is never persisted. It appears when the setting is on and goes away
//! when it is switched off; no editor operation may change it.

use crate::model::{Step, StepDraft, Tour};

pub const ONBOARDING_TITLE: &str = "Onboarding Assistant";
pub const ONBOARDING_FILE: &str = "onboarding-assistant.tour";

/// Whether `tour` is the onboarding tour.
pub fn is_onboarding(tour: &Tour) -> bool {
    is_reserved_title(tour.title())
}

/// Whether `title` is reserved for the onboarding tour.
pub fn is_reserved_title(title: &str) -> bool {
    title == ONBOARDING_TITLE
}

/// Whether `tour_file` is reserved for the onboarding tour.
pub fn is_reserved_file(tour_file: &str) -> bool {
    tour_file == ONBOARDING_FILE
}

/// Whether a stored tour claims the onboarding tour's title or file.
pub fn claims_reserved_name(tour: &Tour) -> bool {
    is_reserved_title(tour.title()) || is_reserved_file(tour.tour_file())
}

/// Builds the onboarding tour.
pub fn onboarding_tour() -> Tour {
    let steps = [
        StepDraft::note(
            "Welcome",
            "# Welcome\n\nTours walk you through a codebase one step at a time. \
             Each step has a description and usually points at a line of code.",
        ),
        StepDraft::note(
            "Navigating",
            "Select a tour to make it active, then move with **next** and **previous**. \
             Selecting a step opens its file at the recorded line.",
        ),
        StepDraft::note(
            "Authoring",
            "Create a tour, then add steps to it. Steps can be edited, moved up or down, \
             and deleted. Every tour is saved as a `.tour` file in the project.",
        ),
        StepDraft::note(
            "Turning this off",
            "This tour is read-only. Disable the onboarding assistant to hide it.",
        ),
    ];

    steps.into_iter().fold(
        Tour::new(ONBOARDING_TITLE, ONBOARDING_FILE)
            .with_description("Getting started with code tours"),
        |tour, draft| tour.with_step(Step::from_draft(draft)),
    )
}
