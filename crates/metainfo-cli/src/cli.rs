use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Describe the target system with a device profile from the config
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare two versions, or test a comparison
    ///
    /// With two arguments the ordering is printed. With three, the middle
    /// one is an operator (eq, ne, lt, gt, le, ge or ==, !=, <<, >>, <=, >=)
    /// and the exit status tells whether the comparison holds.
    #[command(arg_required_else_help = true)]
    #[clap(name = "vercmp")]
    Vercmp {
        /// VERSION_A [OPERATOR] VERSION_B
        #[arg(required = true, num_args = 2..=3, value_names = ["A", "OP", "B"])]
        versions: Vec<String>,

        /// Ignore epochs when comparing
        #[arg(required = false, long)]
        ignore_epoch: bool,
    },

    /// Show what is known about the target system
    #[clap(name = "sysinfo")]
    SysInfo {
        /// Describe a typical device of this chassis instead
        #[arg(required = false, long)]
        chassis: Option<String>,

        /// List every device modalias with its name
        #[arg(required = false, short, long)]
        devices: bool,
    },

    /// Check every relation of a component against the target system
    #[command(arg_required_else_help = true)]
    #[clap(name = "check-relations")]
    CheckRelations {
        /// Component manifest (TOML)
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        manifest: PathBuf,

        /// Check against a typical device of this chassis
        #[arg(required = false, long)]
        chassis: Option<String>,

        /// Manifests of available components, for id relations
        #[arg(required = false, short, long, value_hint = ValueHint::FilePath)]
        with: Vec<PathBuf>,
    },

    /// Rate how well a component fits the target system and common devices
    #[command(arg_required_else_help = true)]
    #[clap(name = "check-syscompat")]
    CheckSyscompat {
        /// Component manifest (TOML)
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        manifest: PathBuf,

        /// Show per-relation results for every system
        #[arg(required = false, short, long)]
        details: bool,

        /// Treat unknown results as failures
        #[arg(required = false, short, long)]
        strict: bool,

        /// Manifests of available components, for id relations
        #[arg(required = false, short, long, value_hint = ValueHint::FilePath)]
        with: Vec<PathBuf>,
    },

    /// Generate default config
    #[clap(name = "defconfig")]
    DefConfig,
}
