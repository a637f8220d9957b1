//! Navigation state: where the user currently is.
//!
//! Holds the active tour as a lookup key into the repository and the active
//! step as an index into that tour. Both are re-checked against the
//! repository on every read, so a stale pointer reads as "nothing active".

use crate::error::Direction;
use crate::model::{Step, Tour, TourId};
use crate::repository::TourRepository;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    active_tour: Option<TourId>,
    active_step: Option<usize>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_tour_id(&self) -> Option<TourId> {
        self.active_tour
    }

    pub fn active_step_index(&self) -> Option<usize> {
        self.active_step
    }

    pub fn active_tour<'a>(&self, repo: &'a TourRepository) -> Option<&'a Tour> {
        self.active_tour.and_then(|id| repo.find(id))
    }

    pub fn active_step<'a>(&self, repo: &'a TourRepository) -> Option<&'a Step> {
        let tour = self.active_tour(repo)?;
        tour.step(self.active_step?)
    }

    /// Makes `id` the active tour with no step selected.
    pub fn set_active_tour(&mut self, id: TourId) {
        self.active_tour = Some(id);
        self.active_step = None;
    }

    /// Selects a step of the active tour.
    ///
    /// An index outside the active tour's steps leaves no step selected
    /// instead of failing: the step count may have changed under the caller.
    pub fn set_active_step_index(&mut self, repo: &TourRepository, index: usize) -> Option<usize> {
        let len = self.active_tour(repo).map_or(0, Tour::step_count);
        self.active_step = (index < len).then_some(index);
        self.active_step
    }

    /// The index one step away in `direction`, without moving.
    ///
    /// With a tour active but no step selected, moving down starts at the
    /// first step and moving up has nowhere to go.
    pub fn peek(&self, repo: &TourRepository, direction: Direction) -> Option<usize> {
        let len = self.active_tour(repo)?.step_count();
        match (direction, self.active_step) {
            (Direction::Up, Some(i)) => i.checked_sub(1).filter(|&j| j < len),
            (Direction::Up, None) => None,
            (Direction::Down, Some(i)) => (i + 1 < len).then_some(i + 1),
            (Direction::Down, None) => (len > 0).then_some(0),
        }
    }

    /// Moves to the previous step and returns it.
    pub fn prev_step<'a>(&mut self, repo: &'a TourRepository) -> Option<&'a Step> {
        self.advance(repo, Direction::Up)
    }

    /// Moves to the next step and returns it.
    pub fn next_step<'a>(&mut self, repo: &'a TourRepository) -> Option<&'a Step> {
        self.advance(repo, Direction::Down)
    }

    fn advance<'a>(&mut self, repo: &'a TourRepository, direction: Direction) -> Option<&'a Step> {
        let index = self.peek(repo, direction)?;
        self.active_step = Some(index);
        self.active_step(repo)
    }

    pub fn clear(&mut self) {
        self.active_tour = None;
        self.active_step = None;
    }

    /// Drops whatever no longer exists in `repo`: a deleted active tour
    /// clears everything, an index past the end is unset.
    pub fn reconcile(&mut self, repo: &TourRepository) {
        match self.active_tour(repo) {
            None => self.clear(),
            Some(tour) => {
                if self.active_step.is_some_and(|i| i >= tour.step_count()) {
                    self.active_step = None;
                }
            }
        }
    }

    /// Re-indexes after step `removed` was deleted from `tour`, which now
    /// has `remaining` steps.
    ///
    /// Deleting the active step selects the step now at the same index (or
    /// the new last one); deleting an earlier step shifts the selection so
    /// it stays on the same step.
    pub(crate) fn step_removed(&mut self, tour: TourId, removed: usize, remaining: usize) {
        if self.active_tour != Some(tour) {
            return;
        }
        self.active_step = match self.active_step {
            Some(i) if i == removed => remaining.checked_sub(1).map(|last| removed.min(last)),
            Some(i) if i > removed => Some(i - 1),
            other => other,
        };
    }

    /// Keeps the selection on the same step after `a` and `b` swapped.
    pub(crate) fn steps_swapped(&mut self, tour: TourId, a: usize, b: usize) {
        if self.active_tour != Some(tour) {
            return;
        }
        self.active_step = match self.active_step {
            Some(i) if i == a => Some(b),
            Some(i) if i == b => Some(a),
            other => other,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::StepDraft;

    fn repo_with_steps(n: usize) -> (TourRepository, TourId) {
        let mut tour = Tour::new("T", "t.tour");
        for i in 0..n {
            tour = tour.with_step(Step::from_draft(StepDraft::note(format!("S{i}"), "")));
        }
        let id = tour.id();
        let mut repo = TourRepository::new();
        repo.insert(tour).unwrap();
        (repo, id)
    }

    #[test]
    fn set_active_tour_resets_step() {
        let (repo, id) = repo_with_steps(3);
        let mut nav = NavigationState::new();
        nav.set_active_tour(id);
        nav.set_active_step_index(&repo, 2);

        nav.set_active_tour(id);
        assert_eq!(nav.active_step_index(), None);
    }

    #[test]
    fn out_of_range_index_clamps_to_unset() {
        let (repo, id) = repo_with_steps(2);
        let mut nav = NavigationState::new();
        nav.set_active_tour(id);
        nav.set_active_step_index(&repo, 1);

        assert_eq!(nav.set_active_step_index(&repo, 5), None);
        assert_eq!(nav.active_step_index(), None);
    }

    #[test]
    fn index_without_active_tour_is_unset() {
        let (repo, _) = repo_with_steps(2);
        let mut nav = NavigationState::new();

        assert_eq!(nav.set_active_step_index(&repo, 0), None);
    }

    #[test]
    fn next_starts_at_first_step() {
        let (repo, id) = repo_with_steps(2);
        let mut nav = NavigationState::new();
        nav.set_active_tour(id);

        assert!(nav.peek(&repo, Direction::Up).is_none());
        assert_eq!(nav.next_step(&repo).unwrap().title, "S0");
        assert_eq!(nav.active_step_index(), Some(0));
    }

    #[test]
    fn walks_forward_and_back_within_bounds() {
        let (repo, id) = repo_with_steps(3);
        let mut nav = NavigationState::new();
        nav.set_active_tour(id);
        nav.set_active_step_index(&repo, 1);

        assert_eq!(nav.next_step(&repo).unwrap().title, "S2");
        assert!(nav.next_step(&repo).is_none());
        assert_eq!(nav.active_step_index(), Some(2));

        assert_eq!(nav.prev_step(&repo).unwrap().title, "S1");
        assert_eq!(nav.prev_step(&repo).unwrap().title, "S0");
        assert!(nav.prev_step(&repo).is_none());
        assert_eq!(nav.active_step_index(), Some(0));
    }

    #[test]
    fn no_adjacent_step_without_active_tour() {
        let (repo, _) = repo_with_steps(3);
        let mut nav = NavigationState::new();

        assert!(nav.next_step(&repo).is_none());
        assert!(nav.prev_step(&repo).is_none());
    }

    #[test]
    fn reconcile_clears_dangling_tour() {
        let (mut repo, id) = repo_with_steps(1);
        let mut nav = NavigationState::new();
        nav.set_active_tour(id);
        nav.set_active_step_index(&repo, 0);

        repo.remove(id).unwrap();
        nav.reconcile(&repo);

        assert_eq!(nav, NavigationState::new());
    }

    #[test]
    fn removing_active_step_selects_same_index() {
        let (_, id) = repo_with_steps(0);
        let mut nav = NavigationState {
            active_tour: Some(id),
            active_step: Some(0),
        };

        nav.step_removed(id, 0, 2);
        assert_eq!(nav.active_step_index(), Some(0));
    }

    #[test]
    fn removing_active_last_step_selects_new_last() {
        let (_, id) = repo_with_steps(0);
        let mut nav = NavigationState {
            active_tour: Some(id),
            active_step: Some(2),
        };

        nav.step_removed(id, 2, 2);
        assert_eq!(nav.active_step_index(), Some(1));
    }

    #[test]
    fn removing_only_step_unsets_index() {
        let (_, id) = repo_with_steps(0);
        let mut nav = NavigationState {
            active_tour: Some(id),
            active_step: Some(0),
        };

        nav.step_removed(id, 0, 0);
        assert_eq!(nav.active_step_index(), None);
        assert_eq!(nav.active_tour_id(), Some(id));
    }

    #[test]
    fn removing_earlier_step_shifts_selection() {
        let (_, id) = repo_with_steps(0);
        let mut nav = NavigationState {
            active_tour: Some(id),
            active_step: Some(2),
        };

        nav.step_removed(id, 0, 2);
        assert_eq!(nav.active_step_index(), Some(1));
    }

    #[test]
    fn other_tours_are_not_reindexed() {
        let (_, id) = repo_with_steps(0);
        let mut nav = NavigationState {
            active_tour: Some(id),
            active_step: Some(1),
        };

        nav.step_removed(TourId::new_v4(), 1, 0);
        nav.steps_swapped(TourId::new_v4(), 1, 2);
        assert_eq!(nav.active_step_index(), Some(1));
    }

    #[test]
    fn swap_follows_selected_step() {
        let (_, id) = repo_with_steps(0);
        let mut nav = NavigationState {
            active_tour: Some(id),
            active_step: Some(1),
        };

        nav.steps_swapped(id, 1, 2);
        assert_eq!(nav.active_step_index(), Some(2));
        nav.steps_swapped(id, 1, 2);
        assert_eq!(nav.active_step_index(), Some(1));
    }
}
