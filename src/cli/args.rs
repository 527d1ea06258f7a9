//! Command line argument parsing for the newsfind CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// newsfind - typo-tolerant news search
#[derive(Parser, Debug, Clone)]
#[command(name = "newsfind")]
#[command(about = "Typo-tolerant news search with backend fallback")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct NewsfindArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Configuration file (JSON); built-in defaults when omitted
    #[arg(short, long, value_name = "CONFIG_FILE", env = "NEWSFIND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl NewsfindArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Search articles through every configured tier
    Search(SearchArgs),

    /// Map and upsert articles from a JSONL file into the backend
    Index(IndexArgs),

    /// Correct a query against the term dictionary
    Correct(CorrectArgs),

    /// Print the structured backend query for a search
    Plan(PlanArgs),
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Query text
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Restrict results to a category ("all" disables the filter)
    #[arg(short, long)]
    pub category: Option<String>,

    /// Number of results to return
    #[arg(short, long)]
    pub size: Option<usize>,

    /// Skip backend spelling suggestions
    #[arg(long)]
    pub no_spell_check: bool,

    /// Local article corpus (JSONL) for the in-process tier
    #[arg(long, value_name = "CORPUS_FILE")]
    pub corpus: Option<PathBuf>,
}

/// Arguments for indexing
#[derive(Parser, Debug, Clone)]
pub struct IndexArgs {
    /// Article file (JSONL, one article per line)
    #[arg(value_name = "ARTICLE_FILE")]
    pub article_file: PathBuf,

    /// Don't try to create the index first
    #[arg(long)]
    pub no_create: bool,
}

/// Arguments for query correction
#[derive(Parser, Debug, Clone)]
pub struct CorrectArgs {
    /// Query text
    #[arg(value_name = "QUERY")]
    pub query: String,
}

/// Arguments for query planning
#[derive(Parser, Debug, Clone)]
pub struct PlanArgs {
    /// Query text
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Restrict results to a category
    #[arg(short, long)]
    pub category: Option<String>,

    /// Number of results to request
    #[arg(short, long, default_value = "10")]
    pub size: usize,

    /// Leave out the suggesters
    #[arg(long)]
    pub no_spell_check: bool,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity() {
        let args = NewsfindArgs::parse_from(["newsfind", "correct", "OpenAl"]);
        assert_eq!(args.verbosity(), 1);

        let args = NewsfindArgs::parse_from(["newsfind", "-vv", "correct", "OpenAl"]);
        assert_eq!(args.verbosity(), 2);

        let args = NewsfindArgs::parse_from(["newsfind", "-vvv", "-q", "correct", "OpenAl"]);
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_search_args() {
        let args = NewsfindArgs::parse_from([
            "newsfind",
            "-f",
            "json",
            "search",
            "nvidai chips",
            "--category",
            "technology",
            "--size",
            "5",
            "--no-spell-check",
        ]);
        assert_eq!(args.output_format, OutputFormat::Json);
        match args.command {
            Command::Search(search) => {
                assert_eq!(search.query, "nvidai chips");
                assert_eq!(search.category.as_deref(), Some("technology"));
                assert_eq!(search.size, Some(5));
                assert!(search.no_spell_check);
                assert!(search.corpus.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_plan_defaults() {
        let args = NewsfindArgs::parse_from(["newsfind", "plan", "openai"]);
        match args.command {
            Command::Plan(plan) => {
                assert_eq!(plan.size, 10);
                assert!(plan.category.is_none());
                assert!(!plan.no_spell_check);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
