use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use buildstamp::cli::orchestration;
use buildstamp::config::{self, Config};
use buildstamp::domain::{Version, VersionBump};
use buildstamp::git::Git2Tagger;
use buildstamp::packager::{CommandPackager, Packager};
use buildstamp::{logging, ui, VersionStore};

#[derive(Parser)]
#[command(
    name = "buildstamp",
    version,
    about = "Track a project's version and build number, render its manifest and package it"
)]
struct Args {
    #[arg(long, global = true, default_value = ".", help = "Project root holding the counter files")]
    root: PathBuf,

    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the current version, build number and project root
    Echo,
    /// Create the counter files if they do not exist
    Init {
        #[arg(long, default_value = "0.1.0", value_parser = parse_version)]
        version: Version,
    },
    /// Increment the major version and reset minor and patch
    Major(TagArg),
    /// Increment the minor version and reset patch
    Minor(TagArg),
    /// Increment the patch version
    Patch(TagArg),
    /// Reset the patch version to zero
    ZeroPatch(TagArg),
    /// Increment the build number
    BuildNum(TagArg),
    /// Increment the build number, render the manifest and run the packager
    Build(TagArg),
    /// Create a git tag for the current version and push it
    Gittag {
        #[arg(long, help = "Create the tag locally only")]
        no_push: bool,

        #[arg(long, help = "Remote to push to (default from config)")]
        remote: Option<String>,
    },
    /// Fill a template from a JSON token map
    Render {
        #[arg(long, help = "Token map: path to a JSON file or a JSON string")]
        tokens: String,

        #[arg(long, help = "Path to the template file or the template text")]
        template: String,

        #[arg(long, help = "Output file; prints to stdout when omitted")]
        out: Option<PathBuf>,
    },
    /// Show recent audit log entries
    Log {
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },
}

#[derive(clap::Args)]
struct TagArg {
    #[arg(short, long, help = "Free-text annotation recorded in the audit log")]
    tag: Option<String>,
}

fn parse_version(s: &str) -> std::result::Result<Version, String> {
    Version::parse(s).map_err(|e| e.to_string())
}

fn main() {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref(), &args.root)?;
    let store = VersionStore::new(&args.root, &config.files);

    match args.command {
        Command::Echo => {
            let snapshot = store.current()?;
            ui::display_snapshot(&absolute(store.root()), &snapshot);
        }
        Command::Init { version } => {
            let snapshot = store.init(version)?;
            ui::display_success(&format!(
                "Initialized {} at version {} build {}",
                absolute(store.root()).display(),
                snapshot.version,
                snapshot.build_number
            ));
        }
        Command::Major(arg) => bump(&store, VersionBump::Major, arg)?,
        Command::Minor(arg) => bump(&store, VersionBump::Minor, arg)?,
        Command::Patch(arg) => bump(&store, VersionBump::Patch, arg)?,
        Command::ZeroPatch(arg) => bump(&store, VersionBump::ZeroPatch, arg)?,
        Command::BuildNum(arg) => {
            let outcome = store.increment_build_number(arg.tag.as_deref())?;
            ui::display_outcome(&outcome);
        }
        Command::Build(arg) => build(&store, &config, arg)?,
        Command::Gittag { no_push, remote } => {
            let tagger = Git2Tagger::open(store.root())?;
            let result = orchestration::run_gittag_workflow(
                &store,
                &config,
                &tagger,
                remote.as_deref(),
                !no_push,
            )?;
            ui::display_tag(&result);
        }
        Command::Render {
            tokens,
            template,
            out,
        } => {
            let rendered = orchestration::run_render_workflow(&tokens, &template, out.as_deref())?;
            match out {
                Some(path) => ui::display_success(&format!("Wrote {}", path.display())),
                None => println!("{}", rendered),
            }
        }
        Command::Log { count } => {
            let entries = store.history(count)?;
            ui::display_history(&entries);
        }
    }

    Ok(())
}

fn bump(store: &VersionStore, bump: VersionBump, arg: TagArg) -> Result<()> {
    let outcome = store.bump_version(bump, arg.tag.as_deref())?;
    ui::display_outcome(&outcome);
    Ok(())
}

fn build(store: &VersionStore, config: &Config, arg: TagArg) -> Result<()> {
    let packager = config
        .packager
        .program
        .as_ref()
        .map(|program| CommandPackager::new(program.clone(), config.packager.args.clone()));

    let result = orchestration::run_build_workflow(
        store,
        config,
        packager.as_ref().map(|p| p as &dyn Packager),
        arg.tag.as_deref(),
    )?;

    ui::display_build(&result);
    if result.manifest.is_none() && !result.packaged {
        ui::display_warning("No template or packager configured; only the build number changed");
    }
    Ok(())
}

fn absolute(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
