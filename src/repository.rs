//! The canonical in-memory collection of tours for a session.
//!
//! Insertion order is preserved and is the order tours are listed in.
//! Ids, titles and file handles are unique across the collection.

use std::collections::HashSet;

use crate::error::{EngineError, Result};
use crate::model::{Tour, TourId, is_valid_tour_file};

#[derive(Debug, Default)]
pub struct TourRepository {
    tours: Vec<Tour>,
}

impl TourRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entire collection.
    ///
    /// The batch is checked with [`check_batch`](Self::check_batch) and
    /// rejected as a whole; the previous collection is kept in that case.
    pub fn load_all(&mut self, tours: Vec<Tour>) -> Result<()> {
        Self::check_batch(&tours)?;
        self.tours = tours;
        Ok(())
    }

    /// Checks that a batch of tours could form a collection: every tour has
    /// a title and a valid file name, ids, titles and files are pairwise
    /// distinct, and no tour repeats a step id.
    pub fn check_batch(tours: &[Tour]) -> Result<()> {
        let mut ids = HashSet::new();
        let mut titles = HashSet::new();
        let mut files = HashSet::new();
        for tour in tours {
            if tour.title().trim().is_empty() {
                return Err(EngineError::EmptyTitle);
            }
            if !is_valid_tour_file(tour.tour_file()) {
                return Err(EngineError::InvalidFileName(tour.tour_file().to_string()));
            }
            if !ids.insert(tour.id()) {
                return Err(EngineError::DuplicateTourId(tour.id()));
            }
            if !titles.insert(tour.title()) {
                return Err(EngineError::DuplicateTitle(tour.title().to_string()));
            }
            if !files.insert(tour.tour_file()) {
                return Err(EngineError::DuplicateFile(tour.tour_file().to_string()));
            }

            let mut step_ids = HashSet::new();
            if let Some(step) = tour.steps().iter().find(|s| !step_ids.insert(s.id)) {
                return Err(EngineError::DuplicateStepId {
                    tour: tour.title().to_string(),
                    step: step.id,
                });
            }
        }
        Ok(())
    }

    pub fn list(&self) -> &[Tour] {
        &self.tours
    }

    pub fn len(&self) -> usize {
        self.tours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tours.is_empty()
    }

    pub fn find(&self, id: TourId) -> Option<&Tour> {
        self.tours.iter().find(|t| t.id() == id)
    }

    pub fn find_by_title(&self, title: &str) -> Option<&Tour> {
        self.tours.iter().find(|t| t.title() == title)
    }

    pub fn position(&self, id: TourId) -> Option<usize> {
        self.tours.iter().position(|t| t.id() == id)
    }

    /// Whether `title` is free, ignoring the tour `except` (a rename may
    /// keep its own title).
    pub fn title_available(&self, title: &str, except: Option<TourId>) -> bool {
        !self
            .tours
            .iter()
            .any(|t| Some(t.id()) != except && t.title() == title)
    }

    /// Whether `tour_file` is free, ignoring the tour `except`.
    pub fn file_available(&self, tour_file: &str, except: Option<TourId>) -> bool {
        !self
            .tours
            .iter()
            .any(|t| Some(t.id()) != except && t.tour_file() == tour_file)
    }

    /// Appends a tour.
    pub fn insert(&mut self, tour: Tour) -> Result<()> {
        self.check_unique(&tour, None)?;
        self.tours.push(tour);
        Ok(())
    }

    /// Removes and returns a tour.
    pub fn remove(&mut self, id: TourId) -> Result<Tour> {
        let index = self.position(id).ok_or(EngineError::NotFound(id))?;
        Ok(self.tours.remove(index))
    }

    /// Updates the title, description and steps of an existing tour in
    /// place. Identity, file handle and creation time stay as stored.
    pub fn replace(&mut self, tour: Tour) -> Result<()> {
        let index = self
            .position(tour.id())
            .ok_or(EngineError::NotFound(tour.id()))?;
        self.check_unique(&tour, Some(tour.id()))?;

        let slot = &mut self.tours[index];
        slot.set_title(tour.title().to_string());
        slot.set_description(tour.description().to_string());
        *slot.steps_mut() = tour.steps().to_vec();
        Ok(())
    }

    fn check_unique(&self, tour: &Tour, except: Option<TourId>) -> Result<()> {
        if except.is_none() && self.find(tour.id()).is_some() {
            return Err(EngineError::DuplicateTourId(tour.id()));
        }
        if !self.title_available(tour.title(), except) {
            return Err(EngineError::DuplicateTitle(tour.title().to_string()));
        }
        if except.is_none() && !self.file_available(tour.tour_file(), None) {
            return Err(EngineError::DuplicateFile(tour.tour_file().to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{Step, StepDraft};

    fn repo_with(tours: &[(&str, &str)]) -> TourRepository {
        let mut repo = TourRepository::new();
        for (title, file) in tours {
            repo.insert(Tour::new(*title, *file)).unwrap();
        }
        repo
    }

    #[test]
    fn insert_preserves_order() {
        let repo = repo_with(&[("B", "b.tour"), ("A", "a.tour"), ("C", "c.tour")]);
        let titles: Vec<&str> = repo.list().iter().map(Tour::title).collect();

        assert_eq!(titles, ["B", "A", "C"]);
    }

    #[test]
    fn insert_rejects_duplicate_title() {
        let mut repo = repo_with(&[("Intro", "intro.tour")]);
        let err = repo.insert(Tour::new("Intro", "other.tour")).unwrap_err();

        assert!(matches!(err, EngineError::DuplicateTitle(t) if t == "Intro"));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn insert_rejects_duplicate_file() {
        let mut repo = repo_with(&[("Intro", "intro.tour")]);
        let err = repo.insert(Tour::new("Other", "intro.tour")).unwrap_err();

        assert!(matches!(err, EngineError::DuplicateFile(f) if f == "intro.tour"));
    }

    #[test]
    fn titles_are_case_sensitive() {
        let mut repo = repo_with(&[("Intro", "intro.tour")]);
        repo.insert(Tour::new("intro", "intro2.tour")).unwrap();

        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn remove_returns_tour() {
        let mut repo = repo_with(&[("A", "a.tour"), ("B", "b.tour")]);
        let id = repo.find_by_title("A").unwrap().id();

        let removed = repo.remove(id).unwrap();
        assert_eq!(removed.title(), "A");
        assert!(repo.find(id).is_none());
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn remove_unknown_fails() {
        let mut repo = repo_with(&[("A", "a.tour")]);
        let err = repo.remove(TourId::new_v4()).unwrap_err();

        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn replace_allows_own_title() {
        let mut repo = repo_with(&[("A", "a.tour")]);
        let mut tour = repo.find_by_title("A").unwrap().clone();
        tour.steps_mut()
            .push(Step::from_draft(StepDraft::note("One", "")));

        repo.replace(tour.clone()).unwrap();
        assert_eq!(repo.find(tour.id()).unwrap().step_count(), 1);
    }

    #[test]
    fn replace_rejects_other_tours_title() {
        let mut repo = repo_with(&[("A", "a.tour"), ("B", "b.tour")]);
        let mut tour = repo.find_by_title("A").unwrap().clone();
        tour.set_title("B".to_string());

        let err = repo.replace(tour).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateTitle(_)));
        assert!(repo.find_by_title("A").is_some());
    }

    #[test]
    fn replace_keeps_position_and_file() {
        let mut repo = repo_with(&[("A", "a.tour"), ("B", "b.tour")]);
        let mut tour = repo.find_by_title("A").unwrap().clone();
        tour.set_title("Renamed".to_string());

        repo.replace(tour).unwrap();
        assert_eq!(repo.list()[0].title(), "Renamed");
        assert_eq!(repo.list()[0].tour_file(), "a.tour");
    }

    #[test]
    fn load_all_rejects_duplicate_batch_and_keeps_previous() {
        let mut repo = repo_with(&[("Kept", "kept.tour")]);
        let err = repo
            .load_all(vec![Tour::new("X", "x.tour"), Tour::new("Y", "x.tour")])
            .unwrap_err();

        assert!(matches!(err, EngineError::DuplicateFile(_)));
        assert!(repo.find_by_title("Kept").is_some());
    }

    #[test]
    fn insert_rejects_existing_id() {
        let mut repo = repo_with(&[("A", "a.tour")]);
        let copy = repo.list()[0].clone();

        let err = repo.insert(copy).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateTourId(_)));
        assert_eq!(repo.len(), 1);
    }

    /// A copy of `tour` under a new title and file that keeps its id, as
    /// happens when a `.tour` file is duplicated by hand.
    fn hand_copied(tour: &Tour, title: &str, file: &str) -> Tour {
        let mut json = serde_json::to_value(tour).unwrap();
        json["title"] = title.into();
        json["tourFile"] = file.into();
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn load_all_rejects_shared_ids() {
        let mut repo = repo_with(&[("Kept", "kept.tour")]);
        let a = Tour::new("A", "a.tour");
        let b = hand_copied(&a, "B", "b.tour");

        let err = repo.load_all(vec![a.clone(), b]).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateTourId(id) if id == a.id()));
        assert_eq!(repo.list()[0].title(), "Kept");
    }

    #[test]
    fn load_all_rejects_empty_title_and_bad_file() {
        let mut repo = TourRepository::new();
        let untitled = hand_copied(&Tour::new("A", "a.tour"), "  ", "a.tour");
        let escaping = hand_copied(&Tour::new("B", "b.tour"), "B", "../b.tour");

        assert!(matches!(
            repo.load_all(vec![untitled]),
            Err(EngineError::EmptyTitle)
        ));
        assert!(matches!(
            repo.load_all(vec![escaping]),
            Err(EngineError::InvalidFileName(f)) if f == "../b.tour"
        ));
        assert!(repo.is_empty());
    }

    #[test]
    fn load_all_rejects_repeated_step_ids() {
        let step = Step::from_draft(StepDraft::note("One", ""));
        let tour = Tour::new("A", "a.tour")
            .with_step(step.clone())
            .with_step(step.clone());

        let err = TourRepository::new().load_all(vec![tour]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::DuplicateStepId { tour, step: id } if tour == "A" && id == step.id
        ));
    }

    #[test]
    fn load_all_replaces_collection() {
        let mut repo = repo_with(&[("Old", "old.tour")]);
        repo.load_all(vec![Tour::new("New", "new.tour")]).unwrap();

        assert_eq!(repo.len(), 1);
        assert!(repo.find_by_title("Old").is_none());
    }
}
