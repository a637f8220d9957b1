//! Tour editing: the only path through which tours and steps change.
//!
//! Every operation works on a copy of the tour. The copy is validated and
//! persisted before it replaces the repository's version, so a failure at
//! any point leaves repository, navigation and store as they were. Each
//! success publishes one `TourListChanged`.

use crate::error::{Direction, EngineError, Result};
use crate::events::TourEvent;
use crate::model::{Step, StepDraft, TOUR_EXTENSION, Tour, TourId, is_valid_tour_file};
use crate::onboarding;

use super::TourStateEngine;

/// How navigation must follow a change to a tour's steps.
enum Reindex {
    Unchanged,
    Removed { index: usize, remaining: usize },
    Swapped(usize, usize),
}

impl TourStateEngine {
    /// Creates an empty tour and appends it to the repository.
    pub fn create_tour(&self, title: &str, tour_file: &str) -> Result<Tour> {
        self.ensure_not_dispatching()?;
        check_title(title)?;
        if !is_valid_tour_file(tour_file) {
            return Err(EngineError::InvalidFileName(tour_file.to_string()));
        }
        {
            let state = self.state.borrow();
            if onboarding::is_reserved_title(title)
                || !state.repository.title_available(title, None)
            {
                return Err(EngineError::DuplicateTitle(title.to_string()));
            }
            if onboarding::is_reserved_file(tour_file)
                || !state.repository.file_available(tour_file, None)
            {
                return Err(EngineError::DuplicateFile(tour_file.to_string()));
            }
        }

        let tour = Tour::new(title, tour_file);
        self.store.borrow_mut().save(&tour)?;
        self.state.borrow_mut().repository.insert(tour.clone())?;
        tracing::info!(title, file = tour_file, "tour created");
        self.publish(&TourEvent::TourListChanged(Some(tour.clone())))?;
        Ok(tour)
    }

    /// Renames a tour. Renaming to its current title succeeds.
    pub fn rename_tour(&self, id: TourId, title: &str) -> Result<Tour> {
        let mut tour = self.editable(id)?;
        check_title(title)?;
        {
            let state = self.state.borrow();
            if onboarding::is_reserved_title(title)
                || !state.repository.title_available(title, Some(id))
            {
                return Err(EngineError::DuplicateTitle(title.to_string()));
            }
        }
        tracing::info!(from = tour.title(), to = title, "tour renamed");
        tour.set_title(title.to_string());
        self.commit(tour, Reindex::Unchanged)
    }

    pub fn set_tour_description(&self, id: TourId, description: &str) -> Result<Tour> {
        let mut tour = self.editable(id)?;
        tour.set_description(description.to_string());
        tracing::info!(title = tour.title(), "tour description updated");
        self.commit(tour, Reindex::Unchanged)
    }

    /// Deletes a tour from the store and the repository. Navigation is
    /// cleared if it was the active tour.
    pub fn delete_tour(&self, id: TourId) -> Result<Tour> {
        let tour = self.editable(id)?;
        self.store.borrow_mut().delete(&tour)?;
        {
            let mut state = self.state.borrow_mut();
            let state = &mut *state;
            state.repository.remove(id)?;
            state.navigation.reconcile(&state.repository);
        }
        tracing::info!(title = tour.title(), file = tour.tour_file(), "tour deleted");
        self.publish(&TourEvent::TourListChanged(Some(tour.clone())))?;
        Ok(tour)
    }

    /// Appends a step built from `draft`, returning it with its new id.
    pub fn add_step(&self, id: TourId, draft: StepDraft) -> Result<Step> {
        let mut tour = self.editable(id)?;
        check_title(&draft.title)?;
        let step = Step::from_draft(draft);
        tour.steps_mut().push(step.clone());
        tracing::info!(tour = tour.title(), step = %step.title, "step added");
        self.commit(tour, Reindex::Unchanged)?;
        Ok(step)
    }

    /// Replaces the content of the step at `index`, keeping its id.
    pub fn edit_step(&self, id: TourId, index: usize, draft: StepDraft) -> Result<Step> {
        let mut tour = self.editable(id)?;
        check_index(&tour, index)?;
        check_title(&draft.title)?;
        let slot = &mut tour.steps_mut()[index];
        *slot = Step {
            id: slot.id,
            ..Step::from_draft(draft)
        };
        let step = slot.clone();
        tracing::info!(tour = tour.title(), index, step = %step.title, "step edited");
        self.commit(tour, Reindex::Unchanged)?;
        Ok(step)
    }

    /// Swaps the step at `index` with its neighbour in `direction`.
    ///
    /// Moving the first step up or the last step down fails with
    /// `CannotMove` and leaves the tour untouched.
    pub fn move_step(&self, id: TourId, index: usize, direction: Direction) -> Result<Tour> {
        let mut tour = self.editable(id)?;
        check_index(&tour, index)?;
        let target = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|&i| i < tour.step_count()),
        };
        let Some(target) = target else {
            tracing::debug!(tour = tour.title(), index, %direction, "step at boundary");
            return Err(EngineError::CannotMove { index, direction });
        };
        tour.steps_mut().swap(index, target);
        tracing::info!(tour = tour.title(), from = index, to = target, "step moved");
        self.commit(tour, Reindex::Swapped(index, target))
    }

    /// Removes the step at `index`, returning it.
    pub fn delete_step(&self, id: TourId, index: usize) -> Result<Step> {
        let mut tour = self.editable(id)?;
        check_index(&tour, index)?;
        let step = tour.steps_mut().remove(index);
        let remaining = tour.step_count();
        tracing::info!(tour = tour.title(), index, step = %step.title, "step deleted");
        self.commit(tour, Reindex::Removed { index, remaining })?;
        Ok(step)
    }

    /// A `.tour` file name derived from `title` that no tour uses yet.
    pub fn suggest_file_name(&self, title: &str) -> String {
        let base = suggest_file_name(title);
        let state = self.state.borrow();
        if state.repository.file_available(&base, None) {
            return base;
        }
        let stem = base.trim_end_matches(&format!(".{TOUR_EXTENSION}"));
        (2..)
            .map(|n| format!("{stem}-{n}.{TOUR_EXTENSION}"))
            .find(|name| state.repository.file_available(name, None))
            .unwrap_or(base)
    }

    /// A copy of tour `id` that may be edited.
    fn editable(&self, id: TourId) -> Result<Tour> {
        self.ensure_not_dispatching()?;
        let tour = self
            .state
            .borrow()
            .repository
            .find(id)
            .cloned()
            .ok_or(EngineError::NotFound(id))?;
        if onboarding::is_onboarding(&tour) {
            tracing::debug!(title = tour.title(), "rejected edit of read-only tour");
            return Err(EngineError::ReadOnlyTour(tour.title().to_string()));
        }
        Ok(tour)
    }

    /// Persists `tour`, swaps it into the repository, re-indexes
    /// navigation and publishes the change.
    fn commit(&self, tour: Tour, reindex: Reindex) -> Result<Tour> {
        self.store.borrow_mut().save(&tour)?;
        {
            let mut state = self.state.borrow_mut();
            let state = &mut *state;
            state.repository.replace(tour.clone())?;
            match reindex {
                Reindex::Unchanged => {}
                Reindex::Removed { index, remaining } => {
                    state.navigation.step_removed(tour.id(), index, remaining);
                }
                Reindex::Swapped(a, b) => state.navigation.steps_swapped(tour.id(), a, b),
            }
            state.navigation.reconcile(&state.repository);
        }
        self.publish(&TourEvent::TourListChanged(Some(tour.clone())))?;
        Ok(tour)
    }
}

/// A default tour file name for `title`: lower-case, runs of anything
/// other than letters and digits collapsed to `-`.
pub fn suggest_file_name(title: &str) -> String {
    let mut stem = String::with_capacity(title.len());
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            stem.push(c);
        } else if !stem.is_empty() && !stem.ends_with('-') {
            stem.push('-');
        }
    }
    let stem = stem.trim_end_matches('-');
    let stem = if stem.is_empty() { "tour" } else { stem };
    format!("{stem}.{TOUR_EXTENSION}")
}

fn check_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(EngineError::EmptyTitle);
    }
    Ok(())
}

fn check_index(tour: &Tour, index: usize) -> Result<()> {
    let len = tour.step_count();
    if index >= len {
        return Err(EngineError::IndexOutOfRange { index, len });
    }
    Ok(())
}
