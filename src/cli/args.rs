//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Oncology decision pathways cross-referenced with recruiting clinical trials
#[derive(Parser, Debug)]
#[command(name = "trialome")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory of graph documents (default: from config)
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List loaded decision trees
    Trees,

    /// Render one decision tree
    Show {
        /// Tree id, e.g. NSCLC_0023
        tree_id: String,
        /// Print the built tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify a node label
    Classify {
        /// Node label text
        label: String,
    },

    /// Reduce a label to a registry query
    Sanitize {
        /// Raw label or search term
        label: String,
        /// Do not append the disease code
        #[arg(long)]
        no_disease: bool,
    },

    /// Recruiting-trial counts for every queryable node
    Counts {
        /// Tree id
        tree_id: String,
    },

    /// Phase 1/2/3 breakdown for every queryable node
    Phases {
        /// Tree id
        tree_id: String,
    },

    /// Recruiting studies and footnotes for one node
    Studies {
        /// Tree id
        tree_id: String,
        /// Node id
        node_id: String,
    },

    /// Search the trial table
    Trials {
        /// Words that must all match
        query: Option<String>,
        /// Trial records file (default: trials_file from config)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Print config template
    Template,
}
