//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Export and import PDF bookmarks as plain indented text
#[derive(Parser, Debug)]
#[command(name = "pdf-bookmark")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Config file (default: $XDG_CONFIG_HOME/pdf-bookmark/pdf-bookmark.toml)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export the bookmarks of a PDF to a text file
    Get {
        #[arg(value_hint = ValueHint::FilePath)]
        pdf: PathBuf,
        /// Output text file (default: derived from the PDF name)
        #[arg(value_hint = ValueHint::FilePath)]
        bookmark: Option<PathBuf>,
    },

    /// Add bookmarks from a text file, writing a new PDF
    Set {
        #[arg(value_hint = ValueHint::FilePath)]
        pdf: PathBuf,
        #[arg(value_hint = ValueHint::FilePath)]
        bookmark: PathBuf,
        /// Added to every page number in the text file
        #[arg(allow_negative_numbers = true)]
        offset: Option<i64>,
    },

    /// Replace all bookmarks with those from a text file, writing a new PDF
    Rst {
        #[arg(value_hint = ValueHint::FilePath)]
        pdf: PathBuf,
        #[arg(value_hint = ValueHint::FilePath)]
        bookmark: PathBuf,
        /// Added to every page number in the text file
        #[arg(allow_negative_numbers = true)]
        offset: Option<i64>,
    },

    /// Remove all bookmarks, writing a new PDF
    Rm {
        #[arg(value_hint = ValueHint::FilePath)]
        pdf: PathBuf,
    },

    /// Print the bookmarks of a PDF
    Show {
        #[arg(value_hint = ValueHint::FilePath)]
        pdf: PathBuf,
        /// Render as a tree instead of the text format
        #[arg(long)]
        tree: bool,
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
    /// Show effective config
    Show,

    /// Show config file path
    Path,

    /// Create config template
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_negative_offset_when_parsing_set_then_accepts_it() {
        let cli = Cli::parse_from(["pdf-bookmark", "set", "a.pdf", "a.txt", "-2"]);

        match cli.command {
            Some(Commands::Set { offset, .. }) => assert_eq!(offset, Some(-2)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_repeated_verbose_when_parsing_then_counts() {
        let cli = Cli::parse_from(["pdf-bookmark", "-vv", "rm", "a.pdf"]);

        assert_eq!(cli.verbose, 2);
    }
}
