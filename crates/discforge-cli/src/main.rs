//! DiscForge - disc dumping front-end CLI
//!
//! The `discforge` command drives DiscImageCreator and turns its output
//! into a submission record.
//!
//! ## Commands
//!
//! - `build`: Print the dumping command for a system, media and drive
//! - `validate`: Check a command line against the tool's grammar
//! - `infer`: Guess media, system, drive and path from a command line
//! - `dump`: Run the tool, then extract, match and write the submission
//! - `submit`: Extract, match and write the submission for existing output
//! - `extract`: Print the fields scanned from existing output
//! - `systems`: List known systems and media
//! - `check-update`: Compare this build with the latest release

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use discforge_core::obs::SessionSpan;
use discforge_core::version::{is_newer, DEFAULT_REPO};
use discforge_core::{
    build, fetch_latest_version, infer, parse, CancelHandle, DumpRequest, DumpSession,
    ExtractionEngine, ExtractionOutcome, KnownSystem, MediaType, Options, OutputLocation,
    Progress, SubmissionReport, UserMetadata,
};
use redump_catalog::{CatalogService, RedumpClient};

#[derive(Parser)]
#[command(name = "discforge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Disc dumping front-end for DiscImageCreator", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "DISCFORGE_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the DiscImageCreator executable
    #[arg(long, global = true, env = "DISCFORGE_TOOL")]
    tool: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dumping command for a selection
    Build {
        #[command(flatten)]
        selection: Selection,
    },

    /// Check a command line against the tool's grammar
    Validate {
        /// Full command line, e.g. "cd F: game.bin 8 /c2 20"
        command: String,
    },

    /// Guess media, system, drive and path from a command line
    Infer {
        /// Full command line
        command: String,
    },

    /// Run the dumping tool and write the submission
    Dump {
        #[command(flatten)]
        selection: Selection,

        /// User metadata (JSON), merged over extracted values
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        /// Skip the catalog lookup
        #[arg(long)]
        offline: bool,
    },

    /// Write the submission for an existing dump
    Submit {
        #[command(flatten)]
        output: ExistingOutput,

        /// User metadata (JSON), merged over extracted values
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        /// Skip the catalog lookup
        #[arg(long)]
        offline: bool,
    },

    /// Print the fields scanned from an existing dump
    Extract {
        #[command(flatten)]
        output: ExistingOutput,
    },

    /// List known systems and media types
    Systems,

    /// Compare this build with the latest published release
    CheckUpdate {
        /// GitHub repository (owner/name)
        #[arg(long, default_value = DEFAULT_REPO)]
        repo: String,
    },
}

#[derive(clap::Args)]
struct Selection {
    /// System short name, e.g. ss, psx, xbox
    #[arg(short, long)]
    system: KnownSystem,

    /// Media short name (default: the system's usual media)
    #[arg(short = 't', long)]
    media: Option<MediaType>,

    /// Drive letter
    #[arg(short, long)]
    drive: char,

    /// Output image path
    #[arg(short, long)]
    path: String,

    /// Read speed (default: configured speed for the media)
    #[arg(long)]
    speed: Option<u32>,
}

impl Selection {
    fn media(&self) -> MediaType {
        self.media.unwrap_or_else(|| self.system.default_media())
    }

    fn request(&self, options: &Options) -> DumpRequest {
        let media = self.media();
        DumpRequest::new(self.system, media, self.drive, &self.path)
            .with_speed(self.speed.unwrap_or_else(|| options.speed_for(media)))
            .with_options(options.dump_options())
    }
}

#[derive(clap::Args)]
struct ExistingOutput {
    /// Image path given to the tool, e.g. dumps/game/game.bin
    path: PathBuf,

    /// System short name
    #[arg(short, long)]
    system: KnownSystem,

    /// Media short name (default: the system's usual media)
    #[arg(short = 't', long)]
    media: Option<MediaType>,
}

impl ExistingOutput {
    fn location(&self) -> Result<OutputLocation> {
        let media = self.media.unwrap_or_else(|| self.system.default_media());
        OutputLocation::from_output_path(&self.path, self.system, media)
            .context("Failed to resolve output location")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    discforge_core::telemetry::init_tracing(cli.json, level);

    let mut options =
        Options::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(tool) = cli.tool {
        options.tool_path = tool;
    }

    match cli.command {
        Commands::Build { selection } => cmd_build(&selection, &options),
        Commands::Validate { command } => cmd_validate(&command),
        Commands::Infer { command } => cmd_infer(&command),
        Commands::Dump {
            selection,
            metadata,
            offline,
        } => cmd_dump(&selection, metadata.as_deref(), offline, options).await,
        Commands::Submit {
            output,
            metadata,
            offline,
        } => cmd_submit(&output, metadata.as_deref(), offline, &options).await,
        Commands::Extract { output } => cmd_extract(&output),
        Commands::Systems => cmd_systems(),
        Commands::CheckUpdate { repo } => cmd_check_update(&repo).await,
    }
}

fn cmd_build(selection: &Selection, options: &Options) -> Result<()> {
    let line = build(&selection.request(options)).context("Failed to build dumping command")?;
    println!("{line}");
    Ok(())
}

fn cmd_validate(command: &str) -> Result<()> {
    match parse(command) {
        Some(parsed) => {
            println!("valid: {}", parsed.command.keyword());
            for flag in &parsed.flags {
                if flag.args.is_empty() {
                    println!("  {}", flag.flag.token());
                } else {
                    println!("  {} {}", flag.flag.token(), flag.args.join(" "));
                }
            }
            Ok(())
        }
        None => bail!("invalid command: {command}"),
    }
}

fn cmd_infer(command: &str) -> Result<()> {
    print_json(&infer(command))
}

fn load_metadata(path: Option<&Path>) -> Result<UserMetadata> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .context(format!("Failed to read metadata file: {:?}", path))?;
            serde_json::from_str(&text).context("Failed to parse metadata as JSON")
        }
        None => Ok(UserMetadata::default()),
    }
}

fn catalog_client(offline: bool, options: &Options) -> Result<Option<RedumpClient>> {
    if offline || options.catalog.disabled {
        return Ok(None);
    }
    let client =
        RedumpClient::new(options.catalog_config()).context("Failed to create catalog client")?;
    Ok(Some(client))
}

fn console_progress() -> Progress {
    Progress::new(|event| eprintln!("{event}"))
}

fn print_report(report: &SubmissionReport) {
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    match report.matched.as_ref().map(|m| m.candidates.len()) {
        Some(0) | None => println!("No catalog match"),
        Some(1) => println!(
            "Matched catalog entry {}",
            report.record.matched_ids.first().copied().unwrap_or_default()
        ),
        Some(n) => println!("{n} catalog candidates"),
    }
    if report.record.has_required_placeholders() {
        println!("Submission has required fields left to fill in");
    }
    println!("Wrote {}", report.files.text.display());
    println!("Wrote {}", report.files.json.display());
}

async fn cmd_dump(
    selection: &Selection,
    metadata: Option<&Path>,
    offline: bool,
    options: Options,
) -> Result<()> {
    let user = load_metadata(metadata)?;
    let catalog = catalog_client(offline, &options)?;
    let session = DumpSession::new(selection.request(&options), options)
        .with_user_metadata(user)
        .with_progress(console_progress());

    info!(session_id = %session.id(), "Starting dump");
    let (cancel, cancelled) = CancelHandle::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let outcome = session
        .run(catalog.as_ref().map(|c| c as &dyn CatalogService), cancelled)
        .await
        .context("Dump failed")?;

    println!("Command: {}", outcome.command);
    println!(
        "Tool exited with {} after {}ms",
        outcome.tool.exit_code, outcome.tool.duration_ms
    );
    print_report(&outcome.report);
    Ok(())
}

async fn cmd_submit(
    output: &ExistingOutput,
    metadata: Option<&Path>,
    offline: bool,
    options: &Options,
) -> Result<()> {
    let location = output.location()?;
    let user = load_metadata(metadata)?;
    let catalog = catalog_client(offline, options)?;

    let report = discforge_core::process_output(
        &location,
        &user,
        options,
        catalog.as_ref().map(|c| c as &dyn CatalogService),
        &console_progress(),
    )
    .await
    .context("Failed to write submission")?;

    print_report(&report);
    Ok(())
}

fn cmd_extract(output: &ExistingOutput) -> Result<()> {
    let location = output.location()?;
    let _span = SessionSpan::enter(&location.base);

    let outcome = ExtractionEngine::new(&location.dir, &location.base, location.media)
        .with_system(location.system)
        .extract();
    match outcome {
        ExtractionOutcome::Complete(fields) => print_json(&fields),
        ExtractionOutcome::Incomplete { missing } => {
            bail!("dump output incomplete, missing: {}", missing.join(", "))
        }
    }
}

fn cmd_systems() -> Result<()> {
    println!("Systems:");
    for system in KnownSystem::ALL {
        println!(
            "  {:<12} {:<28} {}",
            system.short_name(),
            system.long_name(),
            system.default_media().short_name()
        );
    }
    println!();
    println!("Media:");
    for media in MediaType::ALL {
        println!("  {:<12} {}", media.short_name(), media.long_name());
    }
    Ok(())
}

async fn cmd_check_update(repo: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let latest = fetch_latest_version(&client, repo)
        .await
        .context("Failed to check for updates")?;

    let current = discforge_core::VERSION;
    if is_newer(current, &latest) {
        println!("Update available: {current} -> {latest}");
    } else {
        println!("Up to date ({current})");
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
