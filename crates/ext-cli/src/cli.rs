//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Extension Manager - Resolve extension load orders and their configuration
#[derive(Parser, Debug)]
#[command(name = "extm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding one sub-directory per installed extension
    #[arg(long, global = true, env = "EXTM_EXTENSIONS", default_value = "extensions")]
    pub extensions: PathBuf,

    /// Profile file with the load order and user values
    #[arg(long, global = true, env = "EXTM_PROFILE", default_value = "profile.toml")]
    pub profile: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List installed extensions, marking active ones
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show the activation layers of the profile
    Order {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Activate an extension and its dependencies
    ///
    /// Without --apply only the preview is shown, including any user values
    /// the change would drop.
    ///
    /// Examples:
    ///   extm activate maps@1.2.0
    ///   extm activate maps@1.2.0 --apply
    Activate {
        /// Extension as name@version
        id: String,

        /// Write the new load order to the profile
        #[arg(long)]
        apply: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Deactivate an extension, dropping dependencies nothing else needs
    Deactivate {
        /// Extension as name@version
        id: String,

        /// Write the new load order to the profile
        #[arg(long)]
        apply: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Upgrade active extensions to the newest compatible versions
    Upgrade {
        /// Write the upgraded load order to the profile
        #[arg(long)]
        apply: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Check whether a value may be set for an option
    ///
    /// Examples:
    ///   extm check graphics.resolution 60
    ///   extm check graphics.layers terrain,water
    Check {
        /// Option url
        url: String,

        /// Candidate value; sets are comma separated
        value: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Set a user value, refusing values the active extensions block
    Set {
        /// Option url
        url: String,

        /// New value; sets are comma separated
        value: String,
    },

    /// Remove a user value
    Unset {
        /// Option url
        url: String,
    },

    /// Check active extensions against the framework and frontend versions
    ///
    /// Examples:
    ///   extm host --framework 3.0.0
    ///   extm host --framework 3.0.0 --frontend 1.4.0 --json
    Host {
        /// Installed framework version; omitted means unknown
        #[arg(long, env = "EXTM_FRAMEWORK_VERSION")]
        framework: Option<String>,

        /// Frontend version, defaults to this tool's version
        #[arg(long, default_value = env!("CARGO_PKG_VERSION"))]
        frontend: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show derived and effective configuration
    Config {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}
