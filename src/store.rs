//! Persistence seam for tours.
//!
//! The engine calls a [`TourStore`] synchronously: once to load every tour
//! at the start of a session, then once per successful mutation.
//! [`FileTourStore`] keeps one JSON file per tour inside the project;
//! [`MemoryTourStore`] keeps nothing on disk.

mod file;

use std::collections::BTreeMap;
use std::io;

use crate::model::{Tour, TourId};

pub use file::FileTourStore;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StoreError>;

/// Loads and saves tours on behalf of the engine.
pub trait TourStore {
    /// Every stored tour. The engine validates the batch before using it.
    fn load_all(&mut self) -> Result<Vec<Tour>>;

    /// Creates or overwrites the stored copy of `tour`.
    fn save(&mut self, tour: &Tour) -> Result<()>;

    /// Removes the stored copy of `tour`. Deleting an unknown tour is not
    /// an error.
    fn delete(&mut self, tour: &Tour) -> Result<()>;
}

/// A store that lives only as long as the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryTourStore {
    tours: BTreeMap<TourId, Tour>,
    order: Vec<TourId>,
}

impl MemoryTourStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with `tours`, loaded back in the same order.
    pub fn with_tours(tours: impl IntoIterator<Item = Tour>) -> Self {
        let mut store = Self::new();
        for tour in tours {
            store.put(tour);
        }
        store
    }

    pub fn get(&self, id: TourId) -> Option<&Tour> {
        self.tours.get(&id)
    }

    pub fn len(&self) -> usize {
        self.tours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tours.is_empty()
    }

    fn put(&mut self, tour: Tour) {
        if !self.tours.contains_key(&tour.id()) {
            self.order.push(tour.id());
        }
        self.tours.insert(tour.id(), tour);
    }
}

impl TourStore for MemoryTourStore {
    fn load_all(&mut self) -> Result<Vec<Tour>> {
        Ok(self
            .order
            .iter()
            .filter_map(|id| self.tours.get(id).cloned())
            .collect())
    }

    fn save(&mut self, tour: &Tour) -> Result<()> {
        self.put(tour.clone());
        Ok(())
    }

    fn delete(&mut self, tour: &Tour) -> Result<()> {
        self.tours.remove(&tour.id());
        self.order.retain(|id| *id != tour.id());
        Ok(())
    }
}
