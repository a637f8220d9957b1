//! CLI interface for codetour.
//!
//! Each subcommand is non-interactive: it loads the project's tours, runs
//! one engine operation and prints the result. Tours are referenced by
//! title, full UUID, or unambiguous id prefix. Step numbers are 1-based,
//! as printed by `codetour list`.

mod format;

use std::env;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use codetour::{
    ConfigFile, Direction, DocRenderer, FileTourStore, FsNavigator, Location, Navigator, StepDraft,
    TextRenderer, Tour, TourStateEngine,
};

use crate::logging;

use format::{format_outline, format_tour_line};

/// codetour: guided walks through a codebase.
#[derive(Debug, Parser)]
#[command(name = "codetour", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Project root (defaults to the current directory).
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    /// Log at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: writing a tour
  1. codetour new "Getting started"
  2. codetour step add "Getting started" "Entry point" --at src/main.rs:1
  3. codetour step add "Getting started" "Why it works" --description "No location needed"
  4. codetour step move "Getting started" 2 up
  5. codetour show "Getting started""#;

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every tour and its steps.
    List,

    /// Render a tour's steps, or a single step with `--step`.
    Show {
        tour: String,

        /// Step number (1-based).
        #[arg(long)]
        step: Option<usize>,
    },

    /// Resolve a step to `path:line` in the project.
    Open {
        tour: String,

        /// Step number (1-based).
        step: usize,
    },

    /// Create a new, empty tour.
    New {
        title: String,

        /// File name (must end with `.tour`). Derived from the title when omitted.
        #[arg(long)]
        file: Option<String>,

        /// Tour description.
        #[arg(long)]
        description: Option<String>,
    },

    /// Rename a tour.
    Rename { tour: String, title: String },

    /// Replace a tour's description.
    Describe { tour: String, description: String },

    /// Delete a tour and its file.
    Delete { tour: String },

    /// Add, edit, move, or delete steps.
    Step {
        #[command(subcommand)]
        command: StepCommand,
    },

    /// Switch the onboarding assistant tour on or off.
    Onboarding { state: Toggle },
}

#[derive(Debug, Subcommand)]
enum StepCommand {
    /// Append a step.
    Add {
        tour: String,
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Source location as `FILE:LINE`. Omit for a description-only step.
        #[arg(long, value_parser = parse_location)]
        at: Option<Location>,
    },

    /// Change a step. Unspecified fields keep their value.
    Edit {
        tour: String,
        step: usize,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, value_parser = parse_location, conflicts_with = "no_location")]
        at: Option<Location>,

        /// Make the step description-only.
        #[arg(long)]
        no_location: bool,
    },

    /// Swap a step with its neighbour.
    Move {
        tour: String,
        step: usize,
        direction: MoveArg,
    },

    /// Remove a step.
    Delete { tour: String, step: usize },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MoveArg {
    Up,
    Down,
}

impl MoveArg {
    fn to_domain(self) -> Direction {
        match self {
            Self::Up => Direction::Up,
            Self::Down => Direction::Down,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

/// Run the CLI, returning an error message on failure.
pub fn run() -> Result<(), String> {
    let cli = Cli::parse();

    let settings = ConfigFile::open_default().map_err(|e| format!("failed to load config: {e}"))?;
    logging::init(&settings.config().log_level, cli.verbose);

    let root = match cli.project {
        Some(p) => p,
        None => env::current_dir().map_err(|e| format!("failed to read current directory: {e}"))?,
    };
    let store = FileTourStore::new(&root, &settings.config().tours_dir);
    let config_path = settings.path().to_path_buf();
    let engine = TourStateEngine::new(store, settings);
    engine
        .reload_state()
        .map_err(|e| format!("failed to load tours: {e}"))?;

    match cli.command {
        Command::List => {
            print!("{}", format_outline(&engine.outline()));
            Ok(())
        }
        Command::Show { tour, step } => cmd_show(&engine, &tour, step),
        Command::Open { tour, step } => cmd_open(&engine, &root, &tour, step),
        Command::New {
            title,
            file,
            description,
        } => cmd_new(&engine, &title, file, description.as_deref()),
        Command::Rename { tour, title } => {
            let tour = resolve_tour(&engine, &tour)?;
            let renamed = engine.rename_tour(tour.id(), &title).map_err(|e| e.to_string())?;
            eprintln!("Renamed '{}' to '{}'", tour.title(), renamed.title());
            Ok(())
        }
        Command::Describe { tour, description } => {
            let tour = resolve_tour(&engine, &tour)?;
            engine
                .set_tour_description(tour.id(), &description)
                .map_err(|e| e.to_string())?;
            eprintln!("Updated description of '{}'", tour.title());
            Ok(())
        }
        Command::Delete { tour } => {
            let tour = resolve_tour(&engine, &tour)?;
            let deleted = engine.delete_tour(tour.id()).map_err(|e| e.to_string())?;
            eprintln!("Deleted '{}' ({})", deleted.title(), deleted.tour_file());
            Ok(())
        }
        Command::Step { command } => cmd_step(&engine, command),
        Command::Onboarding { state } => {
            let enabled = matches!(state, Toggle::On);
            engine.set_onboarding(enabled).map_err(|e| e.to_string())?;
            eprintln!(
                "Onboarding assistant {} (saved to {})",
                if enabled { "enabled" } else { "disabled" },
                config_path.display()
            );
            Ok(())
        }
    }
}

fn cmd_new(
    engine: &TourStateEngine,
    title: &str,
    file: Option<String>,
    description: Option<&str>,
) -> Result<(), String> {
    let file = file.unwrap_or_else(|| engine.suggest_file_name(title));
    let tour = engine.create_tour(title, &file).map_err(|e| e.to_string())?;
    if let Some(description) = description {
        engine
            .set_tour_description(tour.id(), description)
            .map_err(|e| e.to_string())?;
    }
    println!("{}", tour.id());
    eprintln!("Tour '{}' (file {}) has been created", tour.title(), tour.tour_file());
    Ok(())
}

fn cmd_show(engine: &TourStateEngine, reference: &str, step: Option<usize>) -> Result<(), String> {
    let tour = resolve_tour(engine, reference)?;
    println!("{}", format_tour_line(&tour));
    if !tour.description().is_empty() {
        println!("{}", tour.description());
    }

    let renderer = TextRenderer;
    let render = |index: usize, step: &codetour::Step| {
        let label = engine
            .step_meta_label(tour.id(), index)
            .unwrap_or_else(|| format!("Step {}", step.title));
        println!("\n{}", renderer.render(&label, step));
    };

    match step {
        Some(number) => {
            let index = step_index(&tour, number)?;
            if let Some(step) = engine.select_step(tour.id(), index).map_err(|e| e.to_string())? {
                render(index, &step);
            }
        }
        None => {
            engine.set_active_tour(tour.id()).map_err(|e| e.to_string())?;
            while let Some(step) = engine.next_step().map_err(|e| e.to_string())? {
                let index = engine.active_step_index().unwrap_or_default();
                render(index, &step);
            }
        }
    }
    Ok(())
}

fn cmd_open(
    engine: &TourStateEngine,
    root: &std::path::Path,
    reference: &str,
    number: usize,
) -> Result<(), String> {
    let tour = resolve_tour(engine, reference)?;
    let index = step_index(&tour, number)?;
    let step = engine
        .select_step(tour.id(), index)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("no step {number} in '{}'", tour.title()))?;

    let target = FsNavigator::new(root)
        .resolve(&step)
        .ok_or_else(|| format!("could not locate navigation target for step '{}'", step.title))?;
    println!("{}:{}", target.path.display(), target.line);
    Ok(())
}

fn cmd_step(engine: &TourStateEngine, command: StepCommand) -> Result<(), String> {
    match command {
        StepCommand::Add {
            tour,
            title,
            description,
            at,
        } => {
            let tour = resolve_tour(engine, &tour)?;
            let draft = StepDraft {
                title,
                description,
                location: at,
            };
            let step = engine.add_step(tour.id(), draft).map_err(|e| e.to_string())?;
            eprintln!(
                "Added step {} '{}' to '{}'",
                tour.step_count() + 1,
                step.title,
                tour.title()
            );
        }
        StepCommand::Edit {
            tour,
            step,
            title,
            description,
            at,
            no_location,
        } => {
            let tour = resolve_tour(engine, &tour)?;
            let index = step_index(&tour, step)?;
            let current = &tour.steps()[index];
            let mut draft = StepDraft::from(current);
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(description) = description {
                draft.description = description;
            }
            if at.is_some() || no_location {
                draft.location = at;
            }
            let edited = engine
                .edit_step(tour.id(), index, draft)
                .map_err(|e| e.to_string())?;
            eprintln!("Step '{}' has been updated", edited.title);
        }
        StepCommand::Move {
            tour,
            step,
            direction,
        } => {
            let tour = resolve_tour(engine, &tour)?;
            let index = step_index(&tour, step)?;
            engine
                .move_step(tour.id(), index, direction.to_domain())
                .map_err(|e| e.to_string())?;
            eprintln!("Steps have been re-arranged");
        }
        StepCommand::Delete { tour, step } => {
            let tour = resolve_tour(engine, &tour)?;
            let index = step_index(&tour, step)?;
            let removed = engine
                .delete_step(tour.id(), index)
                .map_err(|e| e.to_string())?;
            eprintln!(
                "Step '{}' has been removed from '{}'",
                removed.title,
                tour.title()
            );
        }
    }
    Ok(())
}

/// Converts a 1-based step number to an index, checking it exists.
fn step_index(tour: &Tour, number: usize) -> Result<usize, String> {
    match number.checked_sub(1) {
        Some(index) if index < tour.step_count() => Ok(index),
        _ => Err(format!(
            "step {number} does not exist: '{}' has {} step(s)",
            tour.title(),
            tour.step_count()
        )),
    }
}

/// Parses `FILE:LINE`.
fn parse_location(s: &str) -> Result<Location, String> {
    let (file, line) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("expected FILE:LINE, got '{s}'"))?;
    if file.is_empty() {
        return Err(format!("missing file in '{s}'"));
    }
    let line: u32 = line
        .parse()
        .map_err(|_| format!("invalid line number in '{s}'"))?;
    if line == 0 {
        return Err("line numbers start at 1".to_string());
    }
    Ok(Location::new(file, line))
}

/// Resolve a tour reference (exact title, full UUID, or unambiguous id
/// prefix) to a tour.
fn resolve_tour(engine: &TourStateEngine, reference: &str) -> Result<Tour, String> {
    if let Some(tour) = engine.tour_by_title(reference) {
        return Ok(tour);
    }

    if let Ok(id) = reference.parse::<uuid::Uuid>() {
        return engine
            .tour(id)
            .ok_or_else(|| format!("no tour with id {id}"));
    }

    let matches: Vec<Tour> = engine
        .tours()
        .into_iter()
        .filter(|t| t.id().to_string().starts_with(reference))
        .collect();

    if matches.len() > 1 {
        let ids: Vec<String> = matches
            .iter()
            .map(|t| t.id().to_string()[..8].to_string())
            .collect();
        return Err(format!(
            "'{reference}' is ambiguous: matches {} tours: {}",
            matches.len(),
            ids.join(", ")
        ));
    }

    matches
        .into_iter()
        .next()
        .ok_or_else(|| format!("no tour matching '{reference}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use codetour::{Config, MemoryTourStore};

    #[test]
    fn parses_file_and_line() {
        assert_eq!(
            parse_location("src/main.rs:12").unwrap(),
            Location::new("src/main.rs", 12)
        );
        assert_eq!(
            parse_location(r"C:\src\main.rs:3").unwrap(),
            Location::new(r"C:\src\main.rs", 3)
        );
    }

    #[test]
    fn rejects_malformed_locations() {
        assert!(parse_location("src/main.rs").is_err());
        assert!(parse_location(":4").is_err());
        assert!(parse_location("a.rs:x").is_err());
        assert!(parse_location("a.rs:0").is_err());
    }

    #[test]
    fn step_numbers_are_one_based() {
        let tour = Tour::new("T", "t.tour")
            .with_step(codetour::Step::from_draft(StepDraft::note("a", "")));

        assert_eq!(step_index(&tour, 1).unwrap(), 0);
        assert!(step_index(&tour, 0).is_err());
        assert!(step_index(&tour, 2).is_err());
    }

    #[test]
    fn resolves_tours_by_title_and_prefix() {
        let a = Tour::new("Alpha", "a.tour");
        let id = a.id();
        let engine = TourStateEngine::new(MemoryTourStore::with_tours([a]), Config::default());
        engine.reload_state().unwrap();

        assert_eq!(resolve_tour(&engine, "Alpha").unwrap().id(), id);
        assert_eq!(resolve_tour(&engine, &id.to_string()).unwrap().id(), id);
        assert_eq!(resolve_tour(&engine, &id.to_string()[..6]).unwrap().id(), id);
        assert!(resolve_tour(&engine, "Beta").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
