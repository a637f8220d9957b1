//! File-backed tour store.
//!
//! Each tour is a pretty-printed JSON file with the `.tour` extension:
//!
//! ```text
//! <project>/.tours/
//!   intro.tour
//!   data-flow.tour
//! ```
//!
//! Loading walks the whole project (respecting `.gitignore`), so tours
//! kept outside the tours directory are found too. New tours are written
//! to the tours directory.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::model::{TOUR_EXTENSION, Tour, TourId};

use super::{Result, TourStore};

#[derive(Debug)]
pub struct FileTourStore {
    root: PathBuf,
    tours_dir: PathBuf,
    /// Where each loaded or saved tour lives on disk.
    paths: HashMap<TourId, PathBuf>,
}

impl FileTourStore {
    /// A store for the project at `root`, writing new tours under
    /// `root/tours_dir`.
    pub fn new(root: impl Into<PathBuf>, tours_dir: impl AsRef<Path>) -> Self {
        let root = root.into();
        let tours_dir = root.join(tours_dir);
        Self {
            root,
            tours_dir,
            paths: HashMap::new(),
        }
    }

    /// The file a tour is (or would be) stored in.
    pub fn path_for(&self, tour: &Tour) -> PathBuf {
        self.paths
            .get(&tour.id())
            .cloned()
            .unwrap_or_else(|| self.tours_dir.join(tour.tour_file()))
    }

    fn tour_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let walker = WalkBuilder::new(&self.root)
            .hidden(false) // The tours directory is a dotfile.
            .sort_by_file_name(Ord::cmp)
            .build();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let path = entry.path();
            if entry.file_type().is_some_and(|ft| ft.is_file())
                && path.extension().and_then(|e| e.to_str()) == Some(TOUR_EXTENSION)
            {
                files.push(path.to_path_buf());
            }
        }
        files
    }
}

/// Reads one tour file, filling in the file handle from its name.
fn read_tour(path: &Path) -> Result<Tour> {
    let json = fs::read_to_string(path)?;
    let mut tour: Tour = serde_json::from_str(&json)?;
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        tour.set_tour_file_if_empty(name);
    }
    Ok(tour)
}

impl TourStore for FileTourStore {
    /// Loads every `.tour` file in the project, sorted by title.
    ///
    /// Malformed files are skipped with a warning.
    fn load_all(&mut self) -> Result<Vec<Tour>> {
        if !self.root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("project root {} is not a directory", self.root.display()),
            )
            .into());
        }

        self.paths.clear();
        let mut tours = Vec::new();
        for path in self.tour_files() {
            match read_tour(&path) {
                Ok(tour) => {
                    tracing::debug!(path = %path.display(), title = tour.title(), "loaded tour");
                    self.paths.insert(tour.id(), path);
                    tours.push(tour);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping malformed tour file");
                }
            }
        }
        tours.sort_by(|a: &Tour, b: &Tour| a.title().cmp(b.title()));
        Ok(tours)
    }

    fn save(&mut self, tour: &Tour) -> Result<()> {
        let path = self.path_for(tour);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(tour)?;
        fs::write(&path, json)?;
        tracing::debug!(path = %path.display(), title = tour.title(), "saved tour");
        self.paths.insert(tour.id(), path);
        Ok(())
    }

    fn delete(&mut self, tour: &Tour) -> Result<()> {
        let path = self.path_for(tour);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tracing::debug!(path = %path.display(), title = tour.title(), "deleted tour");
        self.paths.remove(&tour.id());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    use crate::model::{Step, StepDraft};
    use crate::store::StoreError;

    fn test_store() -> (TempDir, FileTourStore) {
        let dir = TempDir::new().unwrap();
        let store = FileTourStore::new(dir.path(), ".tours");
        (dir, store)
    }

    fn sample_tour(title: &str, file: &str) -> Tour {
        Tour::new(title, file)
            .with_description("About the project")
            .with_step(Step::from_draft(StepDraft::note("Welcome", "# Hello")))
            .with_step(Step::from_draft(StepDraft::at("Entry", "", "src/main.rs", 3)))
    }

    #[test]
    fn save_and_load_tour() {
        let (dir, mut store) = test_store();
        let tour = sample_tour("Intro", "intro.tour");

        store.save(&tour).unwrap();
        assert!(dir.path().join(".tours").join("intro.tour").is_file());

        let mut fresh = FileTourStore::new(dir.path(), ".tours");
        let loaded = fresh.load_all().unwrap();
        assert_eq!(loaded, vec![tour]);
    }

    #[test]
    fn copied_tour_file_does_not_overwrite_the_original() {
        use crate::{Config, EngineError, TourStateEngine};

        let (dir, mut store) = test_store();
        let tour = sample_tour("A", "a.tour");
        store.save(&tour).unwrap();
        let a_path = dir.path().join(".tours").join("a.tour");
        let b_path = dir.path().join(".tours").join("b.tour");
        let copy = fs::read_to_string(&a_path)
            .unwrap()
            .replace("\"title\": \"A\"", "\"title\": \"B\"")
            .replace("\"a.tour\"", "\"b.tour\"");
        fs::write(&b_path, &copy).unwrap();

        let engine =
            TourStateEngine::new(FileTourStore::new(dir.path(), ".tours"), Config::default());
        let err = engine.reload_state().unwrap_err();

        assert!(matches!(err, EngineError::DuplicateTourId(id) if id == tour.id()));
        assert!(engine.rename_tour(tour.id(), "A2").is_err());
        assert_eq!(fs::read_to_string(&b_path).unwrap(), copy);
    }

    #[test]
    fn load_sorts_by_title() {
        let (_dir, mut store) = test_store();
        store.save(&sample_tour("Zeta", "z.tour")).unwrap();
        store.save(&sample_tour("Alpha", "a.tour")).unwrap();

        let titles: Vec<String> = store
            .load_all()
            .unwrap()
            .iter()
            .map(|t| t.title().to_string())
            .collect();
        assert_eq!(titles, ["Alpha", "Zeta"]);
    }

    #[test]
    fn finds_tours_outside_tours_dir() {
        let (dir, mut store) = test_store();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(
            dir.path().join("docs").join("walkthrough.tour"),
            r#"{"title":"Walkthrough","steps":[{"title":"Start","file":"README.md","line":1}]}"#,
        )
        .unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].tour_file(), "walkthrough.tour");
        assert_eq!(
            store.path_for(&loaded[0]),
            dir.path().join("docs").join("walkthrough.tour")
        );
    }

    #[test]
    fn skips_malformed_files() {
        let (dir, mut store) = test_store();
        store.save(&sample_tour("Good", "good.tour")).unwrap();
        fs::write(dir.path().join(".tours").join("bad.tour"), "{ not json").unwrap();
        fs::write(
            dir.path().join(".tours").join("half.tour"),
            r#"{"title":"Half","steps":[{"title":"S","file":"a.rs"}]}"#,
        )
        .unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title(), "Good");
    }

    #[test]
    fn respects_gitignore() {
        let (dir, mut store) = test_store();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".gitignore"), "target/\n").unwrap();
        fs::create_dir_all(dir.path().join("target")).unwrap();
        fs::write(
            dir.path().join("target").join("copy.tour"),
            r#"{"title":"Copy"}"#,
        )
        .unwrap();

        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn save_overwrites_in_place() {
        let (dir, mut store) = test_store();
        let tour = sample_tour("Intro", "intro.tour");
        store.save(&tour).unwrap();

        let updated = tour.clone().with_description("Changed");
        store.save(&updated).unwrap();

        let json = fs::read_to_string(dir.path().join(".tours").join("intro.tour")).unwrap();
        assert!(json.contains("Changed"));
        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn delete_removes_file_and_is_idempotent() {
        let (dir, mut store) = test_store();
        let tour = sample_tour("Intro", "intro.tour");
        store.save(&tour).unwrap();

        store.delete(&tour).unwrap();
        assert!(!dir.path().join(".tours").join("intro.tour").exists());
        store.delete(&tour).unwrap();
    }

    #[test]
    fn load_missing_root_fails() {
        let dir = TempDir::new().unwrap();
        let mut store = FileTourStore::new(dir.path().join("absent"), ".tours");

        let err = store.load_all().unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
