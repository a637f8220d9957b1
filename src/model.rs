//! Core data model for codetour.
//!
//! A tour is an ordered, named sequence of steps with a file handle used by
//! the persistence layer. Step order is navigation order.

mod step;
mod tour;

pub use step::{Location, Step, StepDraft, StepId};
pub use tour::{TOUR_EXTENSION, Tour, TourId, is_valid_tour_file};
