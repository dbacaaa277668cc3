//! Command-line interface: argument parsing, command execution and text
//! rendering.

pub mod commands;
pub mod output;

use crate::constants::{APP_DESCRIPTION, APP_NAME};
use crate::journal::EntryType;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// A mood-tagged journal for dreams, diary entries and inner monologue
#[derive(Parser, Debug)]
#[clap(name = APP_NAME, about = APP_DESCRIPTION)]
#[clap(author, version, long_about = None)]
pub struct CliArgs {
    /// Print verbose output (debug logging)
    #[clap(short = 'v', long, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Write a new entry
    New(NewArgs),
    /// List entries, newest first
    List(ListArgs),
    /// Show one entry in full
    Show {
        /// Entry id
        id: String,
    },
    /// Change an existing entry
    Edit(EditArgs),
    /// Delete an entry
    Delete {
        /// Entry id
        id: String,
        /// Do not ask for confirmation
        #[clap(short = 'y', long)]
        yes: bool,
    },
    /// Delete every entry
    Clear {
        /// Do not ask for confirmation
        #[clap(short = 'y', long)]
        yes: bool,
    },
    /// Streak, mood and type statistics and the mood heatmap
    Stats,
    /// Resurface a past entry
    Flashback,
    /// Manage moods
    #[clap(subcommand)]
    Moods(MoodsCommand),
    /// Export all entries to a JSON backup
    Export {
        /// Directory to write the backup into (defaults to the current directory)
        #[clap(short = 'o', long)]
        out: Option<PathBuf>,
    },
    /// Import entries from a JSON backup
    Import {
        /// Backup file to read
        file: PathBuf,
        /// Replace all current entries
        #[clap(long, conflicts_with = "merge")]
        overwrite: bool,
        /// Keep current entries and add the new ones
        #[clap(long)]
        merge: bool,
    },
    /// Set or remove the PIN lock
    #[clap(subcommand)]
    Pin(PinCommand),
    /// Show or change the display theme
    Theme {
        /// `dark` or `light`
        theme: Option<String>,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct NewArgs {
    /// Entry text
    pub text: String,
    /// Entry type: dream, diary or os
    #[clap(short = 't', long = "type", default_value = "dream")]
    pub kind: EntryType,
    /// Mood key or label
    #[clap(short = 'm', long)]
    pub mood: Option<String>,
    /// Tag (repeatable)
    #[clap(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ListArgs {
    /// Only entries of this type
    #[clap(short = 't', long = "type", conflicts_with = "tag")]
    pub kind: Option<EntryType>,
    /// Only entries with this tag
    #[clap(long)]
    pub tag: Option<String>,
    /// Case-insensitive keyword matched against text and date
    #[clap(short = 's', long)]
    pub search: Option<String>,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct EditArgs {
    /// Entry id
    pub id: String,
    /// New text
    #[clap(long)]
    pub text: Option<String>,
    /// New type
    #[clap(short = 't', long = "type")]
    pub kind: Option<EntryType>,
    /// New mood key or label; an empty value removes the mood
    #[clap(short = 'm', long)]
    pub mood: Option<String>,
    /// Replace the tags (repeatable)
    #[clap(long = "tag")]
    pub tags: Vec<String>,
    /// Remove all tags
    #[clap(long, conflicts_with = "tags")]
    pub clear_tags: bool,
    /// New date and time, e.g. 2024-03-05T07:30
    #[clap(short = 'd', long)]
    pub date: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum MoodsCommand {
    /// List built-in and custom moods
    List,
    /// Add a custom mood
    Add {
        /// Mood label
        label: String,
        /// Emoji shown with the mood
        #[clap(short = 'e', long, default_value = "")]
        emoji: String,
        /// Hex color, e.g. #a18cd1
        #[clap(short = 'c', long)]
        color: Option<String>,
    },
    /// Remove a custom mood
    Remove {
        /// Mood key or label
        mood: String,
        /// Do not ask for confirmation
        #[clap(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinCommand {
    /// Turn the PIN lock on
    Set,
    /// Turn the PIN lock off
    Disable,
}

impl Command {
    /// Whether the command must pass the PIN gate before it runs. PIN
    /// management runs its own flow and the theme is a display preference.
    pub fn needs_unlock(&self) -> bool {
        !matches!(self, Command::Pin(_) | Command::Theme { .. })
    }
}
