//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Memory-load metrics over annotated derivation trees
#[derive(Parser, Debug)]
#[command(name = "mgload")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level (-d, -d -d, -d -d -d)
    #[arg(short = 'd', long = "debug", action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Annotate one tree and print it
    Annotate {
        /// Base path of the tree files (.tree.forest extension optional)
        base: PathBuf,

        /// Derive the surface order from the tree, ignoring any .linear file
        #[arg(long)]
        autolinearize: bool,

        /// Print LaTeX forest code instead of the terminal tree
        #[arg(long)]
        latex: bool,

        /// Also write the <name>_io.forest tikz overlay next to the tree
        #[arg(long)]
        io_overlay: bool,
    },

    /// Annotate every tree in a folder and write tikz overlays
    Batch {
        /// Directory containing .tree.forest files
        directory: PathBuf,

        #[arg(long)]
        autolinearize: bool,

        /// Output directory for the overlays (default: the tree directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Check a tree's consistency and its linearization file
    Check {
        /// Base path of the tree files (.tree.forest extension optional)
        base: PathBuf,
    },

    /// Evaluate metrics against empirical processing contrasts
    Compare {
        /// Directory containing the tree files
        #[arg(short, long, env = "MGLOAD_TREES")]
        trees: PathBuf,

        /// Metric definitions (*.metrics)
        #[arg(short, long)]
        metrics: PathBuf,

        /// Processing contrasts (*.compare)
        #[arg(short, long)]
        contrasts: PathBuf,

        /// Compose base metrics into cascades of exactly this length
        #[arg(short, long, default_value_t = 1)]
        ranks: usize,

        #[arg(long)]
        autolinearize: bool,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
