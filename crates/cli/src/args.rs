//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// taxonomy-kit: resolve active taxonomies and classify text against them
#[derive(Parser, Debug)]
#[command(name = "taxonomy-kit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Override the record database path
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List groups that have an active taxonomy pointer
    Groups(GroupsArgs),

    /// Print the active taxonomy of a group
    Show(ShowArgs),

    /// Print the prompt block for a group
    Prompt(PromptArgs),

    /// Print version and timestamp of a group's active taxonomy
    Metadata(MetadataArgs),

    /// Classify text with the keyword rules
    Classify(ClassifyArgs),

    /// Store a taxonomy file and make it active for a group
    Import(ImportArgs),

    /// Configuration management
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct GroupsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Group name (defaults to the configured default group)
    #[arg(long)]
    pub group: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct PromptArgs {
    /// Group name (defaults to the configured default group)
    #[arg(long)]
    pub group: Option<String>,
}

#[derive(Args, Debug)]
pub struct MetadataArgs {
    /// Group name
    #[arg(long)]
    pub group: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Text to classify
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,

    /// File containing text to classify (use - for stdin)
    #[arg(long, conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Validate against the active taxonomy of this group
    #[arg(long, conflicts_with = "constraint")]
    pub group: Option<String>,

    /// JSON file mapping category labels to subcategory labels
    #[arg(long)]
    pub constraint: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Taxonomy document (.json or .toml)
    #[arg(long)]
    pub file: PathBuf,

    /// Group to activate it for (defaults to the configured default group)
    #[arg(long)]
    pub group: Option<String>,

    /// Key for the data record (derived from version and content if omitted)
    #[arg(long = "ref")]
    pub reference: Option<String>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}
