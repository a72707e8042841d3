//! Interactive session: one process, many requests, one key-rotation cursor.
//!
//! Lines starting with `/` are commands; anything else is a generation prompt.
//! A failed command is reported and the loop keeps going.

use console::style;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use crate::cli::{Commands, PromptsAction};
use crate::commands::execute;
use crate::errors::AppError;
use crate::export::ExportFormat;
use crate::output;
use crate::state::AppState;

const HELP: &str = "\
Commands:
  <prompt>                      generate content
  /use N                        generate from saved prompt N
  /search <query>               content recommendations
  /translate <code>             translate current content (en es fr de zh ja ko)
  /save <prompt>                save a prompt
  /prompts                      list saved prompts
  /show [--translation]         print current content
  /export <doc|pdf|png> [--translation] [--dark]
  /tips                         prompt-writing tips
  /help                         this message
  /quit                         leave the session";

/// One parsed session line.
#[derive(Debug)]
pub enum SessionLine {
    Empty,
    Help,
    Quit,
    Run(Commands),
}

/// Parses a session line into a command.
pub fn parse_line(line: &str) -> Result<SessionLine, AppError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(SessionLine::Empty);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(SessionLine::Run(Commands::Generate {
            prompt: vec![line.to_string()],
            saved: None,
        }));
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };
    let words: Vec<&str> = args.split_whitespace().collect();
    let required = |what: &str| -> Result<Vec<String>, AppError> {
        if args.is_empty() {
            Err(AppError::Validation(format!("/{name} needs {what}")))
        } else {
            Ok(vec![args.to_string()])
        }
    };

    let command = match name {
        "quit" | "exit" | "q" => return Ok(SessionLine::Quit),
        "help" | "?" => return Ok(SessionLine::Help),
        "use" => {
            let index = args.parse::<usize>().map_err(|_| {
                AppError::Validation("/use needs a saved prompt number".to_string())
            })?;
            Commands::Generate {
                prompt: Vec::new(),
                saved: Some(index),
            }
        }
        "search" => Commands::Search {
            query: required("a query")?,
        },
        "translate" => Commands::Translate {
            lang: words
                .first()
                .map(|w| w.to_string())
                .ok_or_else(|| AppError::Validation("/translate needs a language code".to_string()))?,
        },
        "save" => Commands::Prompts {
            action: PromptsAction::Save {
                prompt: required("a prompt")?,
            },
        },
        "prompts" => Commands::Prompts {
            action: PromptsAction::List,
        },
        "show" => Commands::Show {
            translation: words.contains(&"--translation"),
        },
        "export" => {
            let format = match words.first().copied() {
                Some("doc") => ExportFormat::Doc,
                Some("pdf") => ExportFormat::Pdf,
                Some("png") => ExportFormat::Png,
                _ => {
                    return Err(AppError::Validation(
                        "/export needs a format: doc, pdf or png".to_string(),
                    ))
                }
            };
            Commands::Export {
                format,
                input: None,
                translation: words.contains(&"--translation"),
                dark: words.contains(&"--dark"),
            }
        }
        "tips" => Commands::Tips,
        other => {
            return Err(AppError::Validation(format!(
                "unknown command /{other}; type /help"
            )))
        }
    };
    Ok(SessionLine::Run(command))
}

fn io_error(e: std::io::Error) -> AppError {
    AppError::Internal(e.into())
}

fn print_banner(state: &AppState) {
    println!(
        "{} (model {}, {} API key(s))",
        style("Smart Content Generator").bold().blue(),
        state.llm.model(),
        state.llm.key_count()
    );
    output::print_tips();
    println!("{}", style("Type /help for commands, /quit to leave.").dim());
}

/// Reads commands from stdin until `/quit` or end of input.
pub async fn run_session(state: &mut AppState) -> Result<(), AppError> {
    print_banner(state);
    info!("Interactive session started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await.map_err(io_error)?;
        stdout.flush().await.map_err(io_error)?;

        let Some(line) = lines.next_line().await.map_err(io_error)? else {
            break;
        };

        let result = match parse_line(&line) {
            Ok(SessionLine::Empty) => Ok(()),
            Ok(SessionLine::Help) => {
                println!("{HELP}");
                Ok(())
            }
            Ok(SessionLine::Quit) => break,
            Ok(SessionLine::Run(command)) => execute(state, command).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            output::notify(&e);
        }
    }

    info!("Interactive session ended");
    Ok(())
}
