//! CLI argument parsing for IDE project generation.
use crate::backend::BackendKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "ideproj",
    version,
    about = "Generate Android Eclipse and Android Studio project files",
    after_help = "Commands:\n  generate --backend <kind> --config <file> --objects <file>  Emit manifests and project directories\n  install --manifest <file> --dest <dir>                       Populate a project directory from a manifest\n\nExamples:\n  ideproj generate --backend android-studio --config build.json --objects objects.json\n  ideproj install --manifest obj/android_studio/Fennec.manifest --dest obj/android_studio/Fennec",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Generate(GenerateArgs),
    Install(InstallArgs),
}

/// Generate command inputs.
#[derive(Parser, Debug)]
#[command(about = "Write copy manifests and resynchronize project directories")]
pub struct GenerateArgs {
    /// IDE format to generate
    #[arg(long, value_enum)]
    pub backend: BackendKind,

    /// Build configuration JSON (source/object roots, target SDK)
    #[arg(long, value_name = "FILE")]
    pub config: PathBuf,

    /// Build objects JSON produced by the configuration frontend
    #[arg(long, value_name = "FILE")]
    pub objects: PathBuf,

    /// Write output under this directory instead of the object root
    #[arg(long, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Run the package and per-project build commands afterwards
    #[arg(long)]
    pub run_build: bool,

    /// Emit the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Log progress to stderr
    #[arg(long)]
    pub verbose: bool,
}

/// Install command inputs.
#[derive(Parser, Debug)]
#[command(about = "Install a copy manifest into a project directory")]
pub struct InstallArgs {
    /// Manifest written by `generate`
    #[arg(long, value_name = "FILE")]
    pub manifest: PathBuf,

    /// Project directory to populate
    #[arg(long, value_name = "DIR")]
    pub dest: PathBuf,

    /// Emit the install report as JSON
    #[arg(long)]
    pub json: bool,

    /// Log progress to stderr
    #[arg(long)]
    pub verbose: bool,
}

impl Command {
    pub fn verbose(&self) -> bool {
        match self {
            Command::Generate(args) => args.verbose,
            Command::Install(args) => args.verbose,
        }
    }
}
