//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use memoria::BlockType;

/// Memoria command-line interface for editing a memorial page layout
#[derive(Parser)]
#[command(name = "memoria")]
#[command(author, version, about = "Edit a memorial page layout on a 12-column grid")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Edit this user's page instead of the configured one
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Directory holding stored pages (overrides the config)
    #[arg(long, global = true, value_name = "DIR")]
    pub storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an empty page
    #[command(about = "Create an empty page, replacing any stored one only with --force")]
    Init {
        #[arg(long)]
        force: bool,
    },

    /// Add a block
    #[command(about = "Add a block of the given type and template")]
    Add {
        /// Block type (text, photo, video, social, profile, familyTree)
        kind: BlockType,

        /// Template, e.g. circle, semicircle, rounded-square, gallery
        template: String,
    },

    /// Drop a block at a grid cell
    #[command(name = "move", about = "Move a block to a grid cell, as a drag would")]
    Move { id: String, row: u32, column: u32 },

    /// Drop a block at a pixel offset
    #[command(about = "Move a block to a pixel offset on the canvas")]
    Drag {
        id: String,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },

    /// Grow or shrink a block
    #[command(about = "Resize a block by whole cells; negative deltas shrink")]
    Resize {
        id: String,
        #[arg(allow_negative_numbers = true)]
        delta_width: i32,
        #[arg(allow_negative_numbers = true)]
        delta_height: i32,
    },

    /// Remove a block
    #[command(about = "Delete a block and compact the gap it leaves")]
    Delete { id: String },

    /// Pin or unpin a block
    #[command(about = "Toggle whether a block is pinned in place")]
    Pin { id: String },

    /// Set the page background
    #[command(about = "Set the background color: a palette name or #RGB / #RRGGBB")]
    Background { color: String },

    /// Show or hide the page on the map
    #[command(about = "Set whether the page appears on the map")]
    Map {
        #[arg(action = clap::ArgAction::Set)]
        show: bool,
    },

    /// Draw the grid
    #[command(about = "Print the page as an ASCII grid")]
    Show,

    /// Check layout invariants
    #[command(about = "Report overlaps and out-of-bounds blocks; exits non-zero if any")]
    Check,

    /// Print the stored page
    #[command(about = "Print the stored page as JSON")]
    Export {
        /// Pretty-print
        #[arg(short, long)]
        pretty: bool,
    },
}
