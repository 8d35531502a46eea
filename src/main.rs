//! crowdguard
//!
//! Command-line access to the data access checks and the CSV importers.

use clap::{Parser, Subcommand};
use crowdguard::{
    config::{AppConfig, LogFormat, load_config},
    data_access::{DataAccessPolicy, LevelRegistry, LevelSet},
    importers::{CsvSource, HttpCsvFetcher, TaskCsvImporter, UserCsvImporter},
    model::{Project, Task},
    util::RequiredFields,
};
use serde::Serialize;
use serde_json::Map;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// crowdguard - Data access level checks for crowdsourcing projects
#[derive(Parser, Debug)]
#[command(name = "crowdguard")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "CROWDGUARD_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides logging.level
    #[arg(long, env = "CROWDGUARD_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether a user may be assigned to a project
    CanAssign {
        #[arg(long, value_delimiter = ',')]
        project_levels: Vec<String>,

        #[arg(long, value_delimiter = ',')]
        user_levels: Vec<String>,
    },

    /// Check whether a task may be saved under a project
    CheckTask {
        #[arg(long, value_delimiter = ',')]
        task_levels: Vec<String>,

        #[arg(long, value_delimiter = ',')]
        project_levels: Vec<String>,

        /// External tracking id of the project
        #[arg(long)]
        tracking_id: Option<String>,
    },

    /// Check the levels a user type may declare
    CheckUser {
        #[arg(long)]
        user_type: String,

        #[arg(long, value_delimiter = ',')]
        levels: Vec<String>,
    },

    /// Import tasks from CSV and print them as JSON
    ImportTasks {
        /// Local CSV file
        #[arg(conflicts_with_all = ["url", "gdocs"])]
        path: Option<PathBuf>,

        /// URL serving CSV
        #[arg(long, conflicts_with = "gdocs")]
        url: Option<String>,

        /// Google Drive spreadsheet share link
        #[arg(long)]
        gdocs: Option<String>,

        /// Project the imported tasks belong to
        #[arg(long, default_value_t = 0)]
        project_id: u64,
    },

    /// Import users from CSV and print them as JSON
    ImportUsers { path: PathBuf },
}

fn init_logging(config: &AppConfig, level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn levels(values: &[String]) -> LevelSet {
    values.iter().map(|v| v.as_str().into()).collect()
}

fn verdict(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let config = load_config(args.config.as_deref())?;

    // Initialize logging
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    init_logging(&config, &level);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting crowdguard");

    let registry = LevelRegistry::from_config(&config.data_access)
        .inspect_err(|e| error!(error = %e, "Failed to build level registry"))?;
    let policy = DataAccessPolicy::new(Arc::new(registry));

    match args.command {
        Command::CanAssign {
            project_levels,
            user_levels,
        } => {
            let allowed = policy.can_assign_user(&levels(&project_levels), &levels(&user_levels));
            println!("{}", if allowed { "allowed" } else { "denied" });
            Ok(verdict(allowed))
        }

        Command::CheckTask {
            task_levels,
            project_levels,
            tracking_id,
        } => {
            let mut project = Project::new(0, "cli");
            project.set_data_access(project_levels);
            if let Some(tracking_id) = tracking_id {
                project.set_tracking_id(tracking_id);
            }

            let mut task = Task::new(project.id, Map::new());
            task.set_data_access(task_levels);

            match policy.ensure_task_assignment_to_project(&task, &project) {
                Ok(()) => {
                    println!("ok");
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    println!("{}", e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Command::CheckUser { user_type, levels: declared } => {
            let (valid, invalid) =
                policy.valid_user_type_based_data_access(&user_type, &levels(&declared));
            if valid {
                println!("ok");
            } else {
                let invalid: Vec<&str> = invalid.iter().map(|l| l.as_str()).collect();
                println!("invalid levels for {}: {}", user_type, invalid.join(", "));
            }
            Ok(verdict(valid))
        }

        Command::ImportTasks {
            path,
            url,
            gdocs,
            project_id,
        } => {
            let source = match (url, gdocs) {
                (Some(url), _) => CsvSource::Url(url),
                (None, Some(gdocs)) => CsvSource::GoogleDrive(gdocs),
                (None, None) => CsvSource::LocalFile(path),
            };

            let importer = TaskCsvImporter::new(RequiredFields::new(&config.tasks.required_fields));
            let fetcher = HttpCsvFetcher::new(&config.importer)?;
            let tasks = importer
                .tasks(&source, &fetcher)
                .await
                .and_then(|rows| {
                    rows.into_iter()
                        .map(|row| row.into_task(project_id, config.tasks.default_n_answers))
                        .collect::<Result<Vec<_>, _>>()
                })
                .inspect_err(|e| error!(error = %e, "Task import failed"))?;

            print_json(&tasks)?;
            Ok(ExitCode::SUCCESS)
        }

        Command::ImportUsers { path } => {
            let users = UserCsvImporter::new(policy)
                .users(Some(&path))
                .inspect_err(|e| error!(error = %e, "User import failed"))?;

            print_json(&users)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
