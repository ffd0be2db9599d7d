use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use fittrack_api::FeedbackType;
use fittrack_cache::{RequestStatus, SnapshotStore};
use fittrack_core::units::{convert, WeightUnit};
use fittrack_core::{AppState, Config, FeedbackInput};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod render;

/// Ten years; larger settings are clamped so the cutoff stays representable
const MAX_SNAPSHOT_AGE_HOURS: u64 = 24 * 365 * 10;

#[derive(Parser)]
#[command(name = "fittrack")]
#[command(version, about = "Browse fitness programs, workouts and progress from the terminal", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true, env = "FITTRACK_API_URL")]
    base_url: Option<String>,

    /// Only show what is in the local snapshot
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show one program
    Program { id: String },
    /// List every program
    Programs,
    /// Show a program day
    Day { program: String, day: String },
    /// Show a workout
    Workout { id: String },
    /// Show one or more exercises
    Exercise {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Show a quote (random when no id is given)
    Quote { id: Option<String> },
    /// Show a user's progress in a program
    Progress { user: String, program: String },
    /// Send feedback about a program
    Feedback {
        #[arg(long)]
        user: String,
        #[arg(long)]
        program: String,
        #[arg(long, value_enum, default_value_t = FeedbackKind::Completion)]
        kind: FeedbackKind,
        /// 1 (too easy) to 5 (too hard)
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long)]
        details: Option<String>,
        /// Repeat for several suggestions
        #[arg(long = "improvement")]
        improvements: Vec<String>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Convert a weight between kg and lb
    Convert { value: f64, unit: WeightUnit },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum FeedbackKind {
    Termination,
    Completion,
    General,
}

impl From<FeedbackKind> for FeedbackType {
    fn from(kind: FeedbackKind) -> Self {
        match kind {
            FeedbackKind::Termination => FeedbackType::Termination,
            FeedbackKind::Completion => FeedbackType::Completion,
            FeedbackKind::General => FeedbackType::General,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fittrack=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading configuration")?;
    if let Some(url) = cli.base_url.clone() {
        config.api.base_url = url;
    }
    if cli.offline {
        config.cache.offline_mode = true;
    }

    // Unit conversion needs neither state nor network
    if let Commands::Convert { value, unit } = &cli.command {
        print_conversion(*value, *unit);
        return Ok(());
    }

    let state = AppState::from_config(&config).context("building API client")?;
    let snapshot = open_snapshot(&config);
    if let Some(snapshot) = &snapshot {
        if let Err(e) = state.restore(snapshot) {
            tracing::warn!("Could not restore snapshot: {}", e);
        }
    }

    // persist even when the command failed
    let outcome = run(&cli.command, &state, &config).await;

    if let Some(snapshot) = &snapshot {
        if let Err(e) = state.persist(snapshot) {
            tracing::warn!("Could not write snapshot: {}", e);
        }
    }

    outcome
}

/// Snapshot problems only cost the warm start, so they never abort the command
fn open_snapshot(config: &Config) -> Option<SnapshotStore> {
    let path = match config.cache.resolved_snapshot_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!("No snapshot location: {}", e);
            return None;
        }
    };
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!("Could not create {}: {}", parent.display(), e);
            return None;
        }
    }

    match SnapshotStore::open(&path) {
        Ok(store) => {
            let hours = config.cache.max_snapshot_age_hours.min(MAX_SNAPSHOT_AGE_HOURS);
            let max_age = chrono::Duration::hours(hours as i64);
            if let Err(e) = store.prune_older_than(max_age) {
                tracing::warn!("Could not prune snapshot: {}", e);
            }
            Some(store)
        }
        Err(e) => {
            tracing::warn!("Could not open snapshot {}: {}", path.display(), e);
            None
        }
    }
}

fn print_conversion(value: f64, unit: WeightUnit) {
    let other = match unit {
        WeightUnit::Kg => WeightUnit::Lb,
        WeightUnit::Lb => WeightUnit::Kg,
    };
    println!("{} {} = {} {}", value, unit, convert(value, unit, other), other);
}

async fn run(command: &Commands, state: &AppState, config: &Config) -> anyhow::Result<()> {
    let offline = config.cache.offline_mode;
    let unit = config.units.preferred;

    match command {
        Commands::Program { id } => {
            let programs = state.programs();
            if !offline {
                programs.fetch_program(id).await;
            }
            match programs.program(id) {
                Some(program) => print!("{}", render::program(&program)),
                None => report_missing(programs.program_status(id), programs.program_error(id))?,
            }
        }
        Commands::Programs => {
            let programs = state.programs();
            if !offline {
                programs.fetch_catalog().await;
            }
            if programs.catalog_status() == RequestStatus::Rejected {
                report_missing(RequestStatus::Rejected, programs.catalog_error())?;
            }
            let listed = if offline {
                programs.cached_programs()
            } else {
                programs.catalog()
            };
            for program in listed {
                println!("{}", render::program_line(&program));
            }
        }
        Commands::Day { program, day } => {
            let programs = state.programs();
            if !offline {
                programs.fetch_program_day(program, day).await;
            }
            match programs.day(program, day) {
                Some(found) => print!("{}", render::day(&found, unit)),
                None => report_missing(
                    programs.day_status(program, day),
                    programs.day_error(program, day),
                )?,
            }
        }
        Commands::Workout { id } => {
            let workouts = state.workouts();
            if !offline {
                workouts.fetch_workout(id).await;
            }
            match workouts.workout(id) {
                Some(workout) => print!("{}", render::workout(&workout, unit)),
                None => report_missing(workouts.status(id), workouts.error(id))?,
            }
        }
        Commands::Exercise { ids } => {
            let exercises = state.exercises();
            if !offline {
                exercises.fetch_exercises(ids).await;
            }
            let mut failed = 0;
            for id in ids {
                match exercises.exercise(id) {
                    Some(exercise) => print!("{}", render::exercise(&exercise)),
                    None => {
                        if let Err(e) = report_missing(exercises.status(id), exercises.error(id)) {
                            eprintln!("{}: {}", id, e);
                            failed += 1;
                        }
                    }
                }
            }
            anyhow::ensure!(
                failed == 0,
                "{} of {} exercises could not be loaded",
                failed,
                ids.len()
            );
        }
        Commands::Quote { id: Some(id) } => {
            let quotes = state.quotes();
            if !offline {
                quotes.fetch_quote(id).await;
            }
            match quotes.quote(id) {
                Some(quote) => println!("{}", render::quote(&quote)),
                None => report_missing(quotes.status(id), quotes.error(id))?,
            }
        }
        Commands::Quote { id: None } => {
            anyhow::ensure!(!offline, "a random quote needs the network");
            let quotes = state.quotes();
            quotes.fetch_random_quote().await;
            match quotes.current_quote() {
                Some(quote) => println!("{}", render::quote(&quote)),
                None => report_missing(quotes.current_status(), quotes.current_error())?,
            }
        }
        Commands::Progress { user, program } => {
            anyhow::ensure!(!offline, "progress is not kept in the snapshot");
            let users = state.users();
            users.fetch_progress(user, program).await;
            match users.progress(user, program) {
                Some(progress) => println!("{}", render::progress(&progress)),
                None => report_missing(
                    users.progress_status(user, program),
                    users.progress_error(user, program),
                )?,
            }
        }
        Commands::Feedback {
            user,
            program,
            kind,
            rating,
            reason,
            details,
            improvements,
            comment,
        } => {
            anyhow::ensure!(!offline, "feedback cannot be sent offline");
            let input = FeedbackInput {
                user_id: user.clone(),
                program_id: program.clone(),
                feedback_type: (*kind).into(),
                termination_reason: reason.clone(),
                reason_details: details.clone(),
                difficulty_rating: *rating,
                improvements: improvements.clone(),
                additional_feedback: comment.clone(),
            };

            let feedback = state.feedback();
            match feedback.submit_program_feedback(input).await? {
                RequestStatus::Fulfilled => println!("Thanks! Feedback sent."),
                status => report_missing(status, feedback.error(program))?,
            }
        }
        Commands::Convert { value, unit } => print_conversion(*value, *unit),
    }

    Ok(())
}

/// A rejected fetch becomes an error so the process exits non-zero
fn report_missing(status: RequestStatus, error: Option<String>) -> anyhow::Result<()> {
    match (status, error) {
        (RequestStatus::Rejected, Some(message)) => Err(anyhow::anyhow!(message)),
        (RequestStatus::Rejected, None) => anyhow::bail!("request failed"),
        (RequestStatus::Idle, _) => {
            eprintln!("Not cached. Run without --offline to fetch it.");
            Ok(())
        }
        (status, _) => {
            eprintln!("Nothing to show (status: {})", status);
            Ok(())
        }
    }
}
