//! scrub - remove the leftovers of macOS applications

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use scrub::{
    broker::{self, ElevatedRequest},
    Action, ActionKind, ConfirmationGate, OsaScript, Right, Scrubber, SpaceSource, SpaceStore,
    SudoAuthority, SudoExecutor, YamlCodec,
};
use scrub_core::{LocalFs, Paths};

/// scrub - remove the leftovers of macOS applications
#[derive(Parser)]
#[command(name = "scrub")]
#[command(version)]
#[command(about = "Find and remove files left behind by macOS applications")]
#[command(long_about = "Find and remove files left behind by macOS applications.\n\n\
    Scrub searches caches, application support folders, containers and launch agents\n\
    for entries named after a target and asks before deleting each one. Root-owned\n\
    entries are removed after an administrator password prompt.")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TargetArgs {
    /// Name to search for (an application name or bundle identifier)
    target: String,

    /// Search space file to use instead of the default one
    #[arg(short, long, value_name = "PATH")]
    spaces: Option<PathBuf>,

    /// Delete without asking
    #[arg(short, long)]
    force: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print files that match the target
    #[command(about = "List leftover files matching a target")]
    List(TargetArgs),

    /// Delete files that match the target
    #[command(about = "Delete leftover files matching a target")]
    Clean(TargetArgs),

    /// Delete an application bundle and its leftovers
    #[command(about = "Uninstall an application (always asks for each bundle)")]
    Uninstall(TargetArgs),

    /// Elevated side of a privileged deletion
    #[command(hide = true)]
    Elevated {
        #[arg(long)]
        right: Right,

        /// External form of the authorization grant
        #[arg(long)]
        grant: String,

        #[arg(last = true)]
        targets: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SCRUB_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::List(args) => cmd_action(ActionKind::List, args),
        Commands::Clean(args) => cmd_action(ActionKind::Clean, args),
        Commands::Uninstall(args) => cmd_action(ActionKind::Uninstall, args),
        Commands::Elevated {
            right,
            grant,
            targets,
        } => cmd_elevated(right, grant, targets),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_action(kind: ActionKind, args: TargetArgs) -> Result<ExitCode> {
    let paths = Paths::new();
    let catalog = paths.catalog();
    let fs = LocalFs;

    let store = SpaceStore::new(&fs, &YamlCodec, &catalog, paths.spaces_file());
    let resolution = store.resolve(args.spaces.as_deref())?;
    match &resolution.source {
        SpaceSource::Created(path) => {
            println!(
                "Created search space file at {}.\n\
                 Edit it to add or remove directories scrub searches.",
                path.display()
            );
        }
        SpaceSource::Fallback { path, reason } => {
            eprintln!(
                "Failed to read the search space file {} ({}). Using default spaces...",
                path.display(),
                reason
            );
        }
        SpaceSource::Override(_) | SpaceSource::Stored(_) => {}
    }

    let authority = SudoAuthority;
    let executor = SudoExecutor::current()?;
    let scrubber = Scrubber::new(&fs, &catalog, &authority, &executor, &OsaScript);

    let action = Action::new(kind, args.target, args.force);
    let mut gate = ConfirmationGate::stdio();
    let summary = scrubber
        .perform(&action, &resolution.space, &mut gate)
        .with_context(|| format!("Failed to process '{}'", action.target()))?;

    tracing::debug!(
        found = summary.found,
        removed = summary.removed.len(),
        skipped = summary.skipped.len(),
        failed = summary.failed.len(),
        "action finished"
    );

    if summary.has_failures() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_elevated(right: Right, grant: String, targets: Vec<PathBuf>) -> Result<ExitCode> {
    let request = ElevatedRequest {
        right,
        grant,
        targets,
    };

    let code = broker::answer_elevated(
        &LocalFs,
        &SudoAuthority,
        &request,
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    )?;
    Ok(ExitCode::from(code as u8))
}
