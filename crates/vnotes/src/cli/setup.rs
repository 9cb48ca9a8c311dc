use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vnotes", bin_name = "vnotes", version)]
#[command(about = "Small notes with verified saves", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory for the note store (overrides config and VNOTES_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data: Option<PathBuf>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// List notes, newest first
    #[command(alias = "ls")]
    List,

    /// Create a new note
    #[command(alias = "n")]
    Create {
        /// Title (1 to 100 characters)
        title: String,
        /// Content (1 to 10000 characters)
        content: String,
    },

    /// Replace the title and content of a note
    #[command(alias = "u")]
    Update {
        /// Id of the note to change
        id: String,
        title: String,
        content: String,
    },

    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        /// Id of the note to delete
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete every note
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Write a backup to notes_backup_<YYYY-MM-DD>.json
    Export {
        /// Directory to write the backup into (defaults to the current directory)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Merge notes from a backup file
    Import {
        /// Backup file (an export, or a bare JSON array of notes)
        file: PathBuf,
    },
}

static DEFAULT_COMMAND: Commands = Commands::List;

impl Cli {
    /// The command to run; a naked `vnotes` lists.
    pub fn action(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&DEFAULT_COMMAND)
    }

    /// Whether confirmation prompts are pre-answered.
    pub fn assume_yes(&self) -> bool {
        matches!(
            self.command,
            Some(Commands::Delete { yes: true, .. }) | Some(Commands::Clear { yes: true })
        )
    }
}
