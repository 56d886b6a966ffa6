//! Command-line front end for the freelancer directory.
//!
//! # Responsibility
//! - Map subcommands onto `DirectoryService` use-cases.
//! - Print results as JSON and report outcomes through exit codes.
//!
//! Exit codes: `0` success, `1` fatal, `2` not found, `3` invalid input.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use freelancer_core::db::open_db;
use freelancer_core::{
    core_version, init_logging_from_config, parse_patch_document, DirectoryConfig,
    DirectoryService, Freelancer, FreelancerId, PatchError, ServiceError,
    SqliteFreelancerRepository,
};
use log::info;
use serde_json::json;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

const EXIT_FATAL: u8 = 1;
const EXIT_NOT_FOUND: u8 = 2;
const EXIT_INVALID_INPUT: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "freelancer")]
#[command(about = "Manage freelancer profiles in the directory store")]
struct Cli {
    /// SQLite database file (or set FREELANCER_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List active (non-archived) profiles
    List,
    /// Show one profile by id, archived or not
    Get { id: FreelancerId },
    /// Create a profile from JSON (`-` reads stdin); any id is ignored
    Create { json: String },
    /// Fully replace a profile from JSON (`-` reads stdin); id is required
    Update { json: String },
    /// Archive (soft-delete) a profile
    #[command(alias = "delete")]
    Archive { id: FreelancerId },
    /// Search active profiles by username or email substring
    Search { query: String },
    /// Apply a JSON patch document (`-` reads stdin) to a profile
    Patch { id: FreelancerId, json: String },
    /// Print the core library version
    Version,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get { .. } => "get",
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Archive { .. } => "archive",
            Self::Search { .. } => "search",
            Self::Patch { .. } => "patch",
            Self::Version => "version",
        }
    }

    /// Log fields for this command: the subcommand name and any target id.
    /// JSON payloads and search queries are never included.
    fn log_fields(&self) -> String {
        match self {
            Self::Get { id } | Self::Archive { id } | Self::Patch { id, .. } => {
                format!("command={} id={id}", self.name())
            }
            _ => format!("command={}", self.name()),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Command::Version = cli.command {
        println!("{}", core_version());
        return Ok(());
    }

    let config = DirectoryConfig::from_env()?;
    init_logging_from_config(&config).map_err(anyhow::Error::msg)?;
    let db_path = cli.db.unwrap_or(config.db_path);

    let mut conn = open_db(&db_path)
        .with_context(|| format!("failed to open directory store `{}`", db_path.display()))?;
    let repo = SqliteFreelancerRepository::try_new(&mut conn)?;
    let mut service = DirectoryService::new(repo);
    info!(
        "event=cli_command module=cli status=start {}",
        cli.command.log_fields()
    );

    match cli.command {
        Command::List => print_json(&service.list_freelancers()?),
        Command::Get { id } => print_json(&service.get_freelancer(id)?),
        Command::Create { json } => {
            let freelancer = parse_freelancer(&json)?;
            print_json(&service.create_freelancer(&freelancer)?)
        }
        Command::Update { json } => {
            let freelancer = parse_freelancer(&json)?;
            service.update_freelancer(&freelancer)?;
            print_json(&json!({ "ok": true, "id": freelancer.id }))
        }
        Command::Archive { id } => {
            service.archive_freelancer(id)?;
            print_json(&json!({ "ok": true, "id": id }))
        }
        Command::Search { query } => print_json(&service.search_freelancers(&query)?),
        Command::Patch { id, json } => {
            let operations = parse_patch_document(&read_arg(&json)?)?;
            print_json(&service.patch_freelancer(id, &operations)?)
        }
        Command::Version => Ok(()),
    }
}

fn parse_freelancer(arg: &str) -> Result<Freelancer> {
    let raw = read_arg(arg)?;
    let freelancer = serde_json::from_str(&raw).context("invalid freelancer JSON")?;
    Ok(freelancer)
}

fn read_arg(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read JSON from stdin")?;
    Ok(buffer)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    if let Some(service_err) = err.downcast_ref::<ServiceError>() {
        return match service_err {
            ServiceError::NotFound(_) => EXIT_NOT_FOUND,
            other if other.is_invalid_input() => EXIT_INVALID_INPUT,
            _ => EXIT_FATAL,
        };
    }
    if err.downcast_ref::<PatchError>().is_some()
        || err.downcast_ref::<serde_json::Error>().is_some()
    {
        return EXIT_INVALID_INPUT;
    }
    EXIT_FATAL
}
