//! CLI argument parsing using clap.
//!
//! Defines the command-line interface of the `livecfg` binary.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Default polling interval of `watch`, in seconds.
pub const DEFAULT_WATCH_INTERVAL_SECS: u64 = 2;

/// livecfg: inspect and edit `key: value // comment` configuration files
///
/// Reads, patches and hot-reloads plain-text configuration files while
/// preserving their layout and comments.
#[derive(Debug, Parser)]
#[command(name = "livecfg")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for livecfg
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every entry in file order
    Show {
        /// Configuration file
        file: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the distinct base keys, sorted
    Keys {
        /// Configuration file
        file: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Read one key with a typed accessor
    Get {
        /// Configuration file
        file: PathBuf,

        /// Key to read (base key for arrays and maps)
        key: String,

        /// How to interpret the value
        #[arg(long = "as", value_enum, default_value_t = ReadAs::String)]
        read_as: ReadAs,
    },

    /// Assign a value and save the file
    Set {
        /// Configuration file
        file: PathBuf,

        /// Full key, e.g. `Filter[2]`
        key: String,

        /// New value text; an empty value removes the line
        value: String,
    },

    /// Reload the file whenever it changes and log the differences
    Watch {
        /// Configuration file
        file: PathBuf,

        /// Polling interval in seconds
        #[arg(long, default_value_t = DEFAULT_WATCH_INTERVAL_SECS, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },
}

/// Include/exclude key patterns.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Regex pattern for keys to include (can be specified multiple times)
    #[arg(long = "include", value_name = "PATTERN")]
    pub includes: Vec<String>,

    /// Regex pattern for keys to exclude (can be specified multiple times)
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub excludes: Vec<String>,
}

/// Accessor used by `get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReadAs {
    /// Boolean
    Bool,
    /// Signed integer (decimal or `0x` hex)
    Int,
    /// Verbatim string
    String,
    /// Dense zero-based array `Key[0]`, `Key[1]`, ...
    Array,
    /// String map `Key[label]`
    Assoc,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }
}

impl Command {
    /// The configuration file the command operates on.
    #[must_use]
    pub fn file(&self) -> &Path {
        match self {
            Self::Show { file, .. }
            | Self::Keys { file, .. }
            | Self::Get { file, .. }
            | Self::Set { file, .. }
            | Self::Watch { file, .. } => file,
        }
    }
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a leading `~`, and every path when no home directory is
/// known, are returned unchanged.
#[must_use]
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
