use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::export::ExportFormat;

#[derive(Parser, Debug)]
#[command(name = "contentgen", bin_name = "contentgen", version)]
#[command(
    about = "Generate articles with a chat-completion model and export them as .doc, PDF or PNG",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory exported files are written to
    #[arg(long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Model id to request (overrides CONTENTGEN_MODEL)
    #[arg(long, global = true)]
    pub model: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate content from a prompt and make it the current content
    Generate {
        /// Prompt text; several words are joined with spaces
        #[arg(required_unless_present = "saved", num_args = 1..)]
        prompt: Vec<String>,

        /// Use a saved prompt by its number (see `prompts list`)
        #[arg(long, conflicts_with = "prompt", value_name = "N")]
        saved: Option<usize>,
    },

    /// Ask for content recommendations
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Translate the current content
    Translate {
        /// Target language code (en, es, fr, de, zh, ja, ko)
        #[arg(long, short)]
        lang: String,
    },

    /// Manage saved prompts
    Prompts {
        #[command(subcommand)]
        action: PromptsAction,
    },

    /// Print the current content (or its translation) to the terminal
    Show {
        #[arg(long)]
        translation: bool,
    },

    /// Export content to a file
    Export {
        #[arg(value_enum)]
        format: ExportFormat,

        /// Read content from a file instead of the current content
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Export the last translation
        #[arg(long, conflicts_with = "input")]
        translation: bool,

        /// Dark background (image export only)
        #[arg(long)]
        dark: bool,
    },

    /// Show prompt-writing tips
    Tips,

    /// Start an interactive session
    Session,
}

#[derive(Subcommand, Debug)]
pub enum PromptsAction {
    /// Save a prompt for later reuse
    Save {
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },
    /// List saved prompts
    List,
}
