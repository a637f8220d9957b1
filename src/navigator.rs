//! Resolving a step to something an editor can open.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::model::Step;

/// A resolved, openable position in the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTarget {
    pub path: PathBuf,
    pub line: u32,
}

/// Resolves a step's location to an openable target.
///
/// `None` covers every failure: description-only steps, missing files,
/// invalid lines.
pub trait Navigator {
    fn resolve(&self, step: &Step) -> Option<OpenTarget>;
}

/// Resolves locations against a project directory on disk.
///
/// The step's file is taken relative to the project root. If it is not
/// there, a file with the same name anywhere in the project is used when
/// exactly one exists (tours often outlive a file move).
#[derive(Debug, Clone)]
pub struct FsNavigator {
    root: PathBuf,
}

impl FsNavigator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn find_by_name(&self, name: &str) -> Option<PathBuf> {
        let mut found = WalkBuilder::new(&self.root)
            .build()
            .flatten()
            .filter(|e| e.file_type().is_some_and(|ft| ft.is_file()))
            .filter(|e| e.file_name().to_str() == Some(name))
            .map(ignore::DirEntry::into_path);
        let first = found.next()?;
        if found.next().is_some() {
            tracing::debug!(name, "ambiguous file name, not resolving");
            return None;
        }
        Some(first)
    }
}

impl Navigator for FsNavigator {
    fn resolve(&self, step: &Step) -> Option<OpenTarget> {
        let location = step.location.as_ref()?;
        if location.line == 0 {
            return None;
        }

        let direct = self.root.join(&location.file);
        let path = if direct.is_file() {
            direct
        } else {
            let name = Path::new(&location.file).file_name()?.to_str()?;
            self.find_by_name(name)?
        };

        Some(OpenTarget {
            path,
            line: location.line,
        })
    }
}
