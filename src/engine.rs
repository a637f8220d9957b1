//! The tour state engine: the public surface UI layers talk to.
//!
//! One engine is constructed per project session and passed by reference
//! to every consumer. It composes the repository, the navigation state and
//! the event bus, and owns the store and settings it was built with.
//!
//! All state sits behind `RefCell`, so subscribers holding a shared handle
//! can read the engine while an event is delivered. Mutations attempted
//! during delivery fail with [`EngineError::ReentrantMutation`]. The engine
//! is neither `Send` nor `Sync`: it runs on one thread.

mod editor;

use std::cell::RefCell;

use crate::config::SettingsStore;
use crate::error::{Direction, EngineError, Result};
use crate::events::{EventBus, SubscriptionId, TourEvent};
use crate::model::{Step, Tour, TourId};
use crate::navigation::NavigationState;
use crate::onboarding;
use crate::repository::TourRepository;
use crate::store::TourStore;
use crate::tree::{self, TreeNode};

pub use editor::suggest_file_name;

#[derive(Debug, Default)]
struct State {
    repository: TourRepository,
    navigation: NavigationState,
}

pub struct TourStateEngine {
    state: RefCell<State>,
    store: RefCell<Box<dyn TourStore>>,
    settings: RefCell<Box<dyn SettingsStore>>,
    bus: EventBus,
}

impl TourStateEngine {
    /// Creates an engine with an empty repository. Call
    /// [`reload_state`](Self::reload_state) to load the stored tours.
    pub fn new(
        store: impl TourStore + 'static,
        settings: impl SettingsStore + 'static,
    ) -> Self {
        Self {
            state: RefCell::new(State::default()),
            store: RefCell::new(Box::new(store)),
            settings: RefCell::new(Box::new(settings)),
            bus: EventBus::new(),
        }
    }

    /// Replaces every tour with what the store holds, plus the onboarding
    /// tour when enabled. Clears navigation.
    pub fn reload_state(&self) -> Result<()> {
        self.ensure_not_dispatching()?;
        let onboarding = self.settings.borrow().onboarding_enabled();
        let tours = self.load_tours(onboarding)?;
        self.apply_reload(tours)
    }

    /// Switches the onboarding assistant on or off and reloads.
    ///
    /// This is the only operation that may add or remove the onboarding
    /// tour. The setting is persisted only once the reloaded batch has been
    /// validated.
    pub fn set_onboarding(&self, enabled: bool) -> Result<()> {
        self.ensure_not_dispatching()?;
        let tours = self.load_tours(enabled)?;
        TourRepository::check_batch(&tours)?;
        self.settings.borrow_mut().set_onboarding_enabled(enabled)?;
        tracing::info!(enabled, "onboarding assistant toggled");
        self.apply_reload(tours)
    }

    pub fn onboarding_enabled(&self) -> bool {
        self.settings.borrow().onboarding_enabled()
    }

    fn load_tours(&self, onboarding: bool) -> Result<Vec<Tour>> {
        let mut tours = self.store.borrow_mut().load_all()?;
        tours.retain(|t| {
            let reserved = onboarding::claims_reserved_name(t);
            if reserved {
                tracing::warn!(
                    title = t.title(),
                    file = t.tour_file(),
                    "ignoring stored tour with a reserved name"
                );
            }
            !reserved
        });
        if onboarding {
            tours.insert(0, onboarding::onboarding_tour());
        }
        Ok(tours)
    }

    fn apply_reload(&self, tours: Vec<Tour>) -> Result<()> {
        let count = tours.len();
        {
            let mut state = self.state.borrow_mut();
            if let Err(e) = state.repository.load_all(tours) {
                tracing::warn!(error = %e, "rejected stored tours");
                return Err(e);
            }
            state.navigation.clear();
        }
        tracing::info!(tours = count, "reloaded tours");
        self.publish(&TourEvent::TourListChanged(None))
    }

    // ── Events ──

    /// Registers a subscriber for [`TourEvent`]s.
    pub fn subscribe(&self, subscriber: impl FnMut(&TourEvent) + 'static) -> SubscriptionId {
        self.bus.subscribe(subscriber)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.bus.unsubscribe(id);
    }

    fn publish(&self, event: &TourEvent) -> Result<()> {
        self.bus.publish(event)
    }

    fn ensure_not_dispatching(&self) -> Result<()> {
        if self.bus.is_dispatching() {
            tracing::warn!("mutation attempted during event delivery");
            return Err(EngineError::ReentrantMutation);
        }
        Ok(())
    }

    // ── Reads ──

    /// Every tour, in repository order.
    pub fn tours(&self) -> Vec<Tour> {
        self.state.borrow().repository.list().to_vec()
    }

    pub fn tour(&self, id: TourId) -> Option<Tour> {
        self.state.borrow().repository.find(id).cloned()
    }

    pub fn tour_by_title(&self, title: &str) -> Option<Tour> {
        self.state.borrow().repository.find_by_title(title).cloned()
    }

    pub fn tour_count(&self) -> usize {
        self.state.borrow().repository.len()
    }

    pub fn active_tour(&self) -> Option<Tour> {
        let state = self.state.borrow();
        state.navigation.active_tour(&state.repository).cloned()
    }

    pub fn active_tour_id(&self) -> Option<TourId> {
        self.state.borrow().navigation.active_tour_id()
    }

    pub fn active_step_index(&self) -> Option<usize> {
        self.state.borrow().navigation.active_step_index()
    }

    pub fn active_step(&self) -> Option<Step> {
        let state = self.state.borrow();
        state.navigation.active_step(&state.repository).cloned()
    }

    /// The step [`prev_step`](Self::prev_step) would select.
    pub fn peek_prev(&self) -> Option<Step> {
        self.peek(Direction::Up)
    }

    /// The step [`next_step`](Self::next_step) would select.
    pub fn peek_next(&self) -> Option<Step> {
        self.peek(Direction::Down)
    }

    fn peek(&self, direction: Direction) -> Option<Step> {
        let state = self.state.borrow();
        let index = state.navigation.peek(&state.repository, direction)?;
        state
            .navigation
            .active_tour(&state.repository)?
            .step(index)
            .cloned()
    }

    /// Heading for a step, e.g. "Intro · Step 2 of 5".
    pub fn step_meta_label(&self, tour: TourId, index: usize) -> Option<String> {
        let state = self.state.borrow();
        let tour = state.repository.find(tour)?;
        tour.step(index)?;
        Some(format!(
            "{} · Step {} of {}",
            tour.title(),
            index + 1,
            tour.step_count()
        ))
    }

    /// The repository as a pre-order tree outline.
    pub fn outline(&self) -> Vec<TreeNode> {
        tree::outline(&self.state.borrow().repository)
    }

    // ── Selection ──

    /// Makes `id` the active tour with no step selected.
    pub fn set_active_tour(&self, id: TourId) -> Result<()> {
        self.ensure_not_dispatching()?;
        let mut state = self.state.borrow_mut();
        if state.repository.find(id).is_none() {
            return Err(EngineError::NotFound(id));
        }
        state.navigation.set_active_tour(id);
        tracing::debug!(%id, "active tour set");
        Ok(())
    }

    /// Makes `tour` active and selects step `index`.
    ///
    /// An index past the end leaves the tour active with no step selected
    /// and returns `None`; no event is published in that case.
    pub fn select_step(&self, tour: TourId, index: usize) -> Result<Option<Step>> {
        self.ensure_not_dispatching()?;
        let selected = {
            let mut state = self.state.borrow_mut();
            let state = &mut *state;
            if state.repository.find(tour).is_none() {
                return Err(EngineError::NotFound(tour));
            }
            state.navigation.set_active_tour(tour);
            state.navigation.set_active_step_index(&state.repository, index);
            state.navigation.active_step(&state.repository).cloned()
        };
        tracing::debug!(%tour, index, selected = selected.is_some(), "step selected");
        self.announce(selected)
    }

    /// Moves to the next step of the active tour.
    pub fn next_step(&self) -> Result<Option<Step>> {
        self.advance(Direction::Down)
    }

    /// Moves to the previous step of the active tour.
    pub fn prev_step(&self) -> Result<Option<Step>> {
        self.advance(Direction::Up)
    }

    fn advance(&self, direction: Direction) -> Result<Option<Step>> {
        self.ensure_not_dispatching()?;
        let step = {
            let mut state = self.state.borrow_mut();
            let state = &mut *state;
            match direction {
                Direction::Up => state.navigation.prev_step(&state.repository).cloned(),
                Direction::Down => state.navigation.next_step(&state.repository).cloned(),
            }
        };
        tracing::debug!(%direction, moved = step.is_some(), "navigated");
        self.announce(step)
    }

    /// Acts on a tree row: a tour row activates the tour, a step row
    /// selects the step, the root does nothing.
    pub fn select_node(&self, node: &TreeNode) -> Result<Option<Step>> {
        match node {
            TreeNode::Root => Ok(None),
            TreeNode::Tour(tour) => self.set_active_tour(tour.id()).map(|()| None),
            TreeNode::Step { tour_id, index, .. } => self.select_step(*tour_id, *index),
        }
    }

    /// Deselects the active tour and step.
    pub fn clear_selection(&self) -> Result<()> {
        self.ensure_not_dispatching()?;
        self.state.borrow_mut().navigation.clear();
        Ok(())
    }

    fn announce(&self, step: Option<Step>) -> Result<Option<Step>> {
        if let Some(step) = &step {
            self.publish(&TourEvent::StepSelected(step.clone()))?;
        }
        Ok(step)
    }
}
