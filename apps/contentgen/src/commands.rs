//! Runs one parsed command against the application state.

use tracing::debug;

use crate::cli::{Commands, PromptsAction};
use crate::errors::AppError;
use crate::handlers::{
    handle_export, handle_generate, handle_generate_saved, handle_list_prompts,
    handle_save_prompt, handle_search, handle_show, handle_translate, ContentSource,
    ExportRequest,
};
use crate::output;
use crate::state::AppState;

/// Executes every command except `session`, which owns the loop that calls this.
pub async fn execute(state: &mut AppState, command: Commands) -> Result<(), AppError> {
    debug!("Executing {command:?}");
    match command {
        Commands::Generate { prompt, saved } => {
            let produced = match saved {
                Some(index) => handle_generate_saved(state, index).await?,
                None => handle_generate(state, &prompt.join(" ")).await?,
            };
            produced.emit(output::print_content)?;
        }
        Commands::Search { query } => {
            let ideas = handle_search(state, &query.join(" ")).await?;
            output::print_numbered(&ideas, "No recommendations");
        }
        Commands::Translate { lang } => {
            handle_translate(state, &lang)
                .await?
                .emit(output::print_content)?;
        }
        Commands::Prompts { action } => match action {
            PromptsAction::Save { prompt } => {
                let n = handle_save_prompt(state, &prompt.join(" "))?;
                println!("Saved prompt #{n}");
            }
            PromptsAction::List => {
                let prompts = handle_list_prompts(state)?;
                output::print_numbered(&prompts, "No saved prompts");
            }
        },
        Commands::Show { translation } => {
            let source = if translation {
                ContentSource::Translation
            } else {
                ContentSource::Last
            };
            print!("{}", handle_show(state, &source).await?);
        }
        Commands::Export {
            format,
            input,
            translation,
            dark,
        } => {
            let source = match (input, translation) {
                (Some(path), _) => ContentSource::File(path),
                (None, true) => ContentSource::Translation,
                (None, false) => ContentSource::Last,
            };
            let path = handle_export(
                state,
                &ExportRequest {
                    format,
                    source,
                    dark,
                },
            )
            .await?;
            output::print_saved(&path);
        }
        Commands::Tips => output::print_tips(),
        Commands::Session => {
            return Err(AppError::Validation(
                "already in an interactive session".to_string(),
            ))
        }
    }
    Ok(())
}
