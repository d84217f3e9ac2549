use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Polyweave Developers",
    version,
    about = "Polyweave CLI - Inspect monomer fragment sets and assemble them into linear polymer chains.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize a monomer file: residues, port classes and chain morphology.
    Inspect(InspectArgs),
    /// Assemble a linear polymer chain from a monomer file.
    Build(BuildArgs),
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the monomer definition file in TOML format.
    #[arg(value_name = "PATH")]
    pub monomers: PathBuf,

    /// Also estimate the atom count of a linear chain with this many units.
    #[arg(short = 'n', long = "dop", value_name = "INT")]
    pub degree_of_polymerization: Option<usize>,
}

/// Arguments for the `build` subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Path to the monomer definition file in TOML format.
    #[arg(value_name = "PATH")]
    pub monomers: PathBuf,

    /// Path to a build configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the degree of polymerization (total units, end groups included).
    #[arg(short = 'n', long = "dop", value_name = "INT")]
    pub degree_of_polymerization: Option<usize>,

    /// Override the block sequence (e.g. 'AB' for an alternating copolymer).
    #[arg(short, long, value_name = "SYMBOLS")]
    pub sequence: Option<String>,

    /// Override hydrogen capping from the config file.
    #[command(flatten)]
    pub hydrogens: HydrogenFlags,

    /// Override geometric relaxation from the config file.
    #[command(flatten)]
    pub relaxation: RelaxFlags,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S sequence=AAB
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Mutually exclusive flags for capping open ports with hydrogens.
#[derive(Args, Debug, Clone, Copy)]
#[group(required = false, multiple = false)]
pub struct HydrogenFlags {
    /// Cap ports left open after linking with hydrogens.
    #[arg(long)]
    pub add_hydrogens: bool,
    /// Leave open ports uncapped.
    #[arg(long)]
    pub no_hydrogens: bool,
}

/// Mutually exclusive flags for relaxing the assembled chain.
#[derive(Args, Debug, Clone, Copy)]
#[group(required = false, multiple = false)]
pub struct RelaxFlags {
    /// Request geometric relaxation of the assembled chain.
    #[arg(long)]
    pub relax: bool,
    /// Skip relaxation even if the config file requests it.
    #[arg(long)]
    pub no_relax: bool,
}
