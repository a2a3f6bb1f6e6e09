//! CLI module for the MPCS assistant.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::catalog::Quarter;
use crate::orchestrator::Collection;
use clap::{Parser, Subcommand, ValueEnum};

/// MPCS course assistant
///
/// Answers questions about the MPCS program from the live course catalog and
/// from indexed program web pages.
#[derive(Parser, Debug)]
#[command(name = "mpcs")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a single question
    Ask {
        /// The question to ask
        question: String,

        /// Rebuild both indexes before answering
        #[arg(long)]
        rebuild: bool,

        /// Print the tool calls the agent made
        #[arg(long)]
        show_tools: bool,
    },

    /// Start an interactive chat session
    Chat {
        /// Rebuild both indexes before the session starts
        #[arg(long)]
        rebuild: bool,
    },

    /// Build or load the collection indexes
    Index {
        /// Which collection to index
        #[arg(value_enum, default_value = "all")]
        target: IndexTarget,

        /// Rebuild even when a persisted index exists
        #[arg(short, long)]
        force: bool,
    },

    /// Search one collection's index
    Search {
        /// Collection to search (internal or external)
        collection: Collection,

        /// Search query
        query: String,

        /// Number of results
        #[arg(short, long)]
        k: Option<usize>,
    },

    /// List catalog courses for a year or one quarter
    Courses {
        /// Quarter (summer, autumn, winter, spring); omit for the whole year
        #[arg(short, long)]
        quarter: Option<Quarter>,

        /// Calendar year of the quarter
        #[arg(short, long)]
        year: Option<i64>,
    },

    /// Show the catalog page of one course section
    Course {
        /// Course code, e.g. "MPCS 51030 1" or mpcs-51030-1
        code: String,

        /// Quarter (defaults to spring)
        #[arg(short, long)]
        quarter: Option<Quarter>,

        /// Calendar year of the quarter
        #[arg(short, long)]
        year: Option<i64>,
    },

    /// Convert a web page to markdown
    Convert {
        /// Page URL
        url: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Collections selectable by `mpcs index`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexTarget {
    Internal,
    External,
    All,
}

impl IndexTarget {
    pub fn collections(&self) -> Vec<Collection> {
        match self {
            IndexTarget::Internal => vec![Collection::Internal],
            IndexTarget::External => vec![Collection::External],
            IndexTarget::All => Collection::ALL.to_vec(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_command() {
        let cli = Cli::try_parse_from(["mpcs", "search", "external", "admission deadlines", "-k", "5"]).unwrap();
        match cli.command {
            Commands::Search { collection, query, k } => {
                assert_eq!(collection, Collection::External);
                assert_eq!(query, "admission deadlines");
                assert_eq!(k, Some(5));
            }
            other => panic!("Expected search command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_courses_with_quarter() {
        let cli = Cli::try_parse_from(["mpcs", "-v", "courses", "--quarter", "winter", "--year", "2024"]).unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Courses { quarter, year } => {
                assert_eq!(quarter, Some(Quarter::Winter));
                assert_eq!(year, Some(2024));
            }
            other => panic!("Expected courses command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_index_defaults_to_all() {
        let cli = Cli::try_parse_from(["mpcs", "index"]).unwrap();
        match cli.command {
            Commands::Index { target, force } => {
                assert_eq!(target, IndexTarget::All);
                assert_eq!(target.collections().len(), 2);
                assert!(!force);
            }
            other => panic!("Expected index command, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_quarter() {
        assert!(Cli::try_parse_from(["mpcs", "course", "mpcs-51030-1", "--quarter", "fortnight"]).is_err());
    }
}
