//! Terminal front end for the workout log.
//!
//! # Responsibility
//! - Parse commands and drive `WorkoutController` entry points.
//! - Render workouts and notices as plain text.
//!
//! # Invariants
//! - Every command restores persisted state before acting.
//! - Failures exit non-zero after the notice has been printed.

use clap::{Args, Parser, Subcommand, ValueEnum};
use mapty_core::{
    core_version, init_logging, AppConfig, Coordinates, SqliteKeyValueStore, SubmitOutcome,
    Workout, WorkoutController, WorkoutFormInput, WorkoutId, WorkoutKind, WorkoutMetrics,
    WorkoutPersistence, WorkoutView,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Log running and cycling workouts", long_about = None)]
struct Cli {
    /// Directory holding the workout database and logs
    #[arg(long, global = true, env = "MAPTY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true, env = "MAPTY_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log a new workout at a map location
    Add(AddArgs),
    /// List all workouts in logging order
    List,
    /// Center on one workout and count the visit
    Focus { id: WorkoutId },
    /// Show one workout and the actions available for it
    Show { id: WorkoutId },
    /// Change distance, duration or the kind-specific value of a workout
    Edit(EditArgs),
    /// Delete one workout
    Delete { id: WorkoutId },
    /// Delete every workout
    Reset,
    /// Print the core version
    Version,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Running,
    Cycling,
}

impl From<KindArg> for WorkoutKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Running => WorkoutKind::Running,
            KindArg::Cycling => WorkoutKind::Cycling,
        }
    }
}

#[derive(Args, Debug)]
struct AddArgs {
    #[arg(value_enum)]
    kind: KindArg,
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,
    #[arg(long, allow_hyphen_values = true)]
    lng: f64,
    /// Distance in km
    #[arg(long)]
    distance: f64,
    /// Duration in minutes
    #[arg(long)]
    duration: f64,
    /// Cadence in steps/min (running)
    #[arg(long)]
    cadence: Option<f64>,
    /// Elevation gain in meters (cycling)
    #[arg(long, allow_hyphen_values = true)]
    elevation: Option<f64>,
}

#[derive(Args, Debug)]
struct EditArgs {
    id: WorkoutId,
    /// Kind submitted with the form; changing it is rejected
    #[arg(long, value_enum)]
    kind: Option<KindArg>,
    #[arg(long)]
    distance: Option<f64>,
    #[arg(long)]
    duration: Option<f64>,
    #[arg(long)]
    cadence: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    elevation: Option<f64>,
}

/// Plain-text rendering of the view collaborator.
struct TerminalView {
    print_entries: bool,
}

impl WorkoutView for TerminalView {
    fn render_marker(&mut self, workout: &Workout) {
        log::debug!("marker id={} at {}", workout.id(), workout.coordinates());
    }

    fn render_list_entry(&mut self, workout: &Workout) {
        if self.print_entries {
            println!("{}", format_entry(workout));
        }
    }

    fn remove_from_view(&mut self, id: WorkoutId) {
        log::debug!("removed id={id}");
    }

    fn clear_view(&mut self) {}

    fn focus_on(&mut self, coordinates: Coordinates) {
        println!("Map centered on {coordinates}");
    }

    fn show_form(&mut self, _prefill: Option<&WorkoutFormInput>) {}

    fn hide_form(&mut self) {}

    fn notify(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

fn format_entry(workout: &Workout) -> String {
    let icon = match workout.kind() {
        WorkoutKind::Running => "🏃",
        WorkoutKind::Cycling => "🚴",
    };
    let extra = match workout.metrics() {
        WorkoutMetrics::Running { cadence_spm, .. } => format!("{cadence_spm} spm"),
        WorkoutMetrics::Cycling {
            elevation_gain_m, ..
        } => format!("{elevation_gain_m} m"),
    };
    format!(
        "{id}  {icon} {description}  {distance} km  {duration} min  {metric:.1} {unit}  {extra}",
        id = workout.id(),
        description = workout.description(),
        distance = workout.distance_km(),
        duration = workout.duration_min(),
        metric = workout.derived_metric(),
        unit = workout.kind().derived_metric_unit(),
    )
}

type CliController = WorkoutController<SqliteKeyValueStore, TerminalView>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Command::Version = cli.command {
        println!("mapty_core version={}", core_version());
        return Ok(());
    }

    let mut config = AppConfig::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = std::env::current_dir()?.join(data_dir);
    }
    let log_level = cli.log_level.as_deref().unwrap_or(config.log_level);
    std::fs::create_dir_all(&config.data_dir)?;
    if let Err(err) = init_logging(log_level, &config.log_dir()) {
        eprintln!("warning: logging disabled: {err}");
    }

    let kv = SqliteKeyValueStore::open(config.db_path())?;
    let persistence = WorkoutPersistence::with_key(kv, config.storage_key.clone());
    let view = TerminalView {
        print_entries: matches!(cli.command, Command::List),
    };
    let mut controller = WorkoutController::new(persistence, view);
    let report = controller.restore()?;
    if report.recovered_from_corrupt {
        eprintln!("Stored workouts were unreadable and have been ignored");
    }

    match cli.command {
        Command::Add(args) => add(&mut controller, args),
        Command::List => {
            if report.loaded == 0 {
                println!("No workouts logged yet");
            }
            Ok(())
        }
        Command::Focus { id } => {
            let clicks = controller.on_list_item_activated(id)?;
            println!("Focused {clicks} time(s)");
            Ok(())
        }
        Command::Show { id } => {
            let actions = controller.on_list_item_double_activated(id)?;
            if let Some(workout) = controller.workouts().find_by_id(id) {
                println!("{}", format_entry(workout));
            }
            let names: Vec<String> = actions
                .iter()
                .map(|action| format!("{action:?}").to_lowercase())
                .collect();
            println!("actions: {}", names.join(", "));
            Ok(())
        }
        Command::Edit(args) => edit(&mut controller, args),
        Command::Delete { id } => {
            let removed = controller.delete(id)?;
            println!("Deleted {}", removed.description());
            Ok(())
        }
        Command::Reset => {
            controller.reset()?;
            println!("All workouts deleted");
            Ok(())
        }
        Command::Version => Ok(()),
    }
}

fn add(controller: &mut CliController, args: AddArgs) -> Result<(), Box<dyn Error>> {
    let input = WorkoutFormInput {
        kind: args.kind.into(),
        distance_km: args.distance,
        duration_min: args.duration,
        cadence_spm: args.cadence,
        elevation_gain_m: args.elevation,
    };

    controller.on_map_clicked(Coordinates::new(args.lat, args.lng));
    if let SubmitOutcome::Created(id) = controller.submit_form(&input)? {
        if let Some(workout) = controller.workouts().find_by_id(id) {
            println!("{}", format_entry(workout));
        }
    }
    Ok(())
}

fn edit(controller: &mut CliController, args: EditArgs) -> Result<(), Box<dyn Error>> {
    let prefill = controller.begin_edit(args.id)?;
    let input = WorkoutFormInput {
        kind: args.kind.map(Into::into).unwrap_or(prefill.kind),
        distance_km: args.distance.unwrap_or(prefill.distance_km),
        duration_min: args.duration.unwrap_or(prefill.duration_min),
        cadence_spm: args.cadence.or(prefill.cadence_spm),
        elevation_gain_m: args.elevation.or(prefill.elevation_gain_m),
    };

    if let SubmitOutcome::Updated(id) = controller.submit_form(&input)? {
        if let Some(workout) = controller.workouts().find_by_id(id) {
            println!("{}", format_entry(workout));
        }
    }
    Ok(())
}
