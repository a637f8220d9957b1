//! codetour: guided, step-by-step tours of a codebase.
//!
//! The heart of the crate is [`TourStateEngine`], which owns the tours of
//! a project session, tracks the active tour and step, enforces the
//! ordering and uniqueness rules on every edit, and notifies subscribers
//! synchronously after each change.
//!
//! Persistence, location resolution and documentation rendering sit
//! behind the [`TourStore`], [`Navigator`] and [`DocRenderer`] traits.

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod model;
pub mod navigation;
pub mod navigator;
pub mod onboarding;
pub mod render;
pub mod repository;
pub mod store;
pub mod tree;

pub use config::{Config, ConfigError, ConfigFile, SettingsStore};
pub use engine::{TourStateEngine, suggest_file_name};
pub use error::{Direction, EngineError, Result};
pub use events::{SubscriptionId, TourEvent};
pub use model::{Location, Step, StepDraft, StepId, Tour, TourId};
pub use navigation::NavigationState;
pub use navigator::{FsNavigator, Navigator, OpenTarget};
pub use render::{DocRenderer, TextRenderer};
pub use repository::TourRepository;
pub use store::{FileTourStore, MemoryTourStore, StoreError, TourStore};
pub use tree::TreeNode;
