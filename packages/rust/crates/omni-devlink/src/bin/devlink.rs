//! devlink CLI: inspect the link table, resolve identifiers, or watch linked
//! directories and print propagation decisions.
//!
//! Config from `dev-link.json` under `--root` by default. Override with
//! `--config <path>`, or skip the file with `--scan <dir>` / `--preset <name>`.
//!
//! Logging: set `RUST_LOG=omni_devlink=debug` to see resolution details on stderr.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use omni_devlink::config::{LinkConfigInput, Preset};
use omni_devlink::{
    ArtifactId, InvalidationBatch, LinkSession, ModuleGraph, Propagation, Resolution,
    SessionOptions,
};

#[derive(Parser)]
#[command(name = "devlink")]
#[command(about = "Link packages to local source trees and propagate changes.")]
struct Cli {
    /// Project root (default: current directory).
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Path to the link config, relative to the root (default: dev-link.json).
    #[arg(long, global = true, conflicts_with_all = ["scan", "preset"])]
    config: Option<PathBuf>,

    /// Link every package found under this directory instead of reading a config file.
    #[arg(long, global = true, conflicts_with = "preset")]
    scan: Option<PathBuf>,

    /// Use a conventional layout instead of reading a config file.
    #[arg(long, global = true, value_enum)]
    preset: Option<Preset>,

    /// Log every observed file change.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the effective link table.
    Table,
    /// Resolve import identifiers and print the chosen files.
    Resolve {
        /// Identifiers such as `@acme/ui` or `@acme/ui/button`.
        #[arg(required = true)]
        identifiers: Vec<String>,
    },
    /// Watch linked directories and print invalidations until interrupted.
    Watch {
        /// Identifiers to resolve up front so their files are indexed.
        identifiers: Vec<String>,

        /// Poll interval in milliseconds.
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "omni_devlink=debug"
        } else {
            "omni_devlink=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut session = LinkSession::start(session_options(&cli));
    if !session.is_active() {
        bail!("dev-link is not active for {}", cli.root.display());
    }

    match cli.command {
        Command::Table => {
            print_table(&session);
            Ok(())
        }
        Command::Resolve { identifiers } => {
            for identifier in &identifiers {
                print_resolution(identifier, &session.resolve_id(identifier, None));
            }
            Ok(())
        }
        Command::Watch {
            identifiers,
            interval_ms,
        } => run_watch(&mut session, &identifiers, Duration::from_millis(interval_ms)),
    }
}

/// Running the binary is explicit intent, so the `DEV_LINK` toggle is implied.
fn session_options(cli: &Cli) -> SessionOptions {
    let options = SessionOptions::new(&cli.root)
        .with_env_toggle(true)
        .with_verbose(cli.verbose);

    if let Some(dir) = &cli.scan {
        options.with_input(LinkConfigInput::ScanRoot(dir.clone()))
    } else if let Some(preset) = cli.preset {
        options.with_input(LinkConfigInput::Preset(preset))
    } else if let Some(config) = &cli.config {
        options.with_config_file(config)
    } else {
        options
    }
}

fn print_table(session: &LinkSession) {
    let table = session.link_table();
    if table.is_empty() {
        println!("(no linked packages)");
        return;
    }
    let width = table
        .entries()
        .iter()
        .map(|e| e.package.len())
        .max()
        .unwrap_or(0);
    for link in table.entries() {
        println!("{:width$}  {}", link.package, link.directory.display());
    }
}

fn print_resolution(identifier: &str, resolution: &Resolution) {
    match resolution {
        Resolution::Resolved(file) => println!("{identifier} -> {}", file.display()),
        Resolution::Deferred => println!("{identifier} -> (default resolution)"),
    }
}

fn run_watch(
    session: &mut LinkSession,
    identifiers: &[String],
    interval: Duration,
) -> anyhow::Result<()> {
    let mut graph = PrintingGraph::default();
    for identifier in identifiers {
        let resolution = session.resolve_id(identifier, None);
        print_resolution(identifier, &resolution);
        if let Some(file) = resolution.path() {
            graph.load(identifier, file);
        }
    }

    let watched = session.attach_watchers()?;
    println!("watching {watched} director{}", if watched == 1 { "y" } else { "ies" });

    loop {
        for change in session.pending_changes(interval) {
            if session.handle_change(&change, &mut graph) == Propagation::Deferred {
                println!("{:?} {} (nothing loaded)", change.kind, change.path.display());
            }
        }
    }
}

/// Stand-in module graph: every resolved identifier is one loaded artifact.
#[derive(Default)]
struct PrintingGraph {
    loaded: BTreeMap<String, ArtifactId>,
}

impl PrintingGraph {
    fn load(&mut self, identifier: &str, file: &Path) {
        self.loaded
            .insert(identifier.to_string(), ArtifactId(file.display().to_string()));
    }
}

impl ModuleGraph for PrintingGraph {
    fn artifact_for_identifier(&self, identifier: &str) -> Option<ArtifactId> {
        self.loaded.get(identifier).cloned()
    }

    fn artifacts_for_file(&self, _file: &Path) -> Vec<ArtifactId> {
        Vec::new()
    }

    fn invalidate(&mut self, batch: &InvalidationBatch) {
        println!(
            "{:?} {} -> invalidate {}",
            batch.cause.kind,
            batch.cause.path.display(),
            batch
                .artifacts
                .iter()
                .map(ArtifactId::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
}
