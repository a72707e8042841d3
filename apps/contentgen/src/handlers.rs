//! Command handlers shared by the one-shot CLI and the interactive session.
//!
//! Handlers return data; printing is left to the caller so stdout carries
//! only content. Stored content changes only after a command fully succeeds.

use std::path::PathBuf;

use chrono::Utc;
use tracing::{info, warn};

use crate::content::generator::{generate_content, search_content, translate_content};
use crate::content::terminal::render_blocks;
use crate::content::{parse_blocks, Block};
use crate::errors::AppError;
use crate::export::doc::export_doc;
use crate::export::image::{export_png, SnapshotSurface, Theme};
use crate::export::pdf::export_pdf;
use crate::export::{write_artifact, Artifact, ExportFormat};
use crate::layout::HeaderBand;
use crate::state::AppState;
use crate::store::{self, StoreError};

/// Which text an export or `show` reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    Last,
    Translation,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub source: ContentSource,
    pub dark: bool,
}

/// Text produced by the model. `store_error` is set when the text could not
/// be remembered; the text itself is still good.
#[derive(Debug)]
pub struct Produced {
    pub content: String,
    pub store_error: Option<StoreError>,
}

impl Produced {
    fn remembered(content: String, stored: store::Result<()>) -> Self {
        if let Err(e) = &stored {
            warn!("Generated text was not saved: {e}");
        }
        Self {
            content,
            store_error: stored.err(),
        }
    }

    /// Hands the content to `emit`, then reports a failed save.
    pub fn emit(self, emit: impl FnOnce(&str)) -> Result<(), AppError> {
        emit(&self.content);
        match self.store_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LLM-backed commands
// ────────────────────────────────────────────────────────────────────────────

/// Generates content and makes it the current content.
pub async fn handle_generate(state: &mut AppState, prompt: &str) -> Result<Produced, AppError> {
    let content = generate_content(&mut state.llm, prompt).await?;
    let stored = store::set_last_content(state.store.as_ref(), &content);
    Ok(Produced::remembered(content, stored))
}

/// Generates from a saved prompt (1-based index).
pub async fn handle_generate_saved(state: &mut AppState, index: usize) -> Result<Produced, AppError> {
    let prompt = store::saved_prompt(state.store.as_ref(), index)?
        .ok_or_else(|| AppError::Validation(format!("no saved prompt #{index}")))?;
    info!("Using saved prompt #{index}");
    handle_generate(state, &prompt).await
}

pub async fn handle_search(state: &mut AppState, query: &str) -> Result<Vec<String>, AppError> {
    search_content(&mut state.llm, query).await
}

/// Translates the current content and stores the result as the last translation.
pub async fn handle_translate(state: &mut AppState, language: &str) -> Result<Produced, AppError> {
    let content = store::last_content(state.store.as_ref())?.ok_or_else(no_content)?;
    let translated = translate_content(&mut state.llm, &content, language).await?;
    let stored = store::set_last_translation(state.store.as_ref(), &translated);
    Ok(Produced::remembered(translated, stored))
}

// ────────────────────────────────────────────────────────────────────────────
// Local commands
// ────────────────────────────────────────────────────────────────────────────

pub fn handle_save_prompt(state: &AppState, prompt: &str) -> Result<usize, AppError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }
    Ok(store::save_prompt(state.store.as_ref(), prompt)?)
}

pub fn handle_list_prompts(state: &AppState) -> Result<Vec<String>, AppError> {
    Ok(store::saved_prompts(state.store.as_ref())?)
}

/// Terminal rendering of the current content or translation.
pub async fn handle_show(state: &AppState, source: &ContentSource) -> Result<String, AppError> {
    let blocks = load_blocks(state, source).await?;
    Ok(render_blocks(&blocks))
}

/// Renders and writes one export. Returns the written path.
pub async fn handle_export(state: &AppState, request: &ExportRequest) -> Result<PathBuf, AppError> {
    let blocks = load_blocks(state, &request.source).await?;
    let artifact = render_artifact(state, blocks, request).await?;
    let path = write_artifact(&state.config.output_dir, &artifact)?;
    Ok(path)
}

async fn render_artifact(
    state: &AppState,
    blocks: Vec<Block>,
    request: &ExportRequest,
) -> Result<Artifact, AppError> {
    // Filenames carry the UTC calendar date; the PDF header shows the local one.
    let today = Utc::now().date_naive();
    let geometry = state.geometry.clone();

    // PDF and PNG rendering is CPU-bound; keep it off the async executor.
    let artifact = match request.format {
        ExportFormat::Doc => export_doc(&blocks, today),
        ExportFormat::Pdf => {
            let header = HeaderBand::today();
            tokio::task::spawn_blocking(move || export_pdf(&blocks, &geometry, &header, today))
                .await
                .map_err(|e| AppError::Internal(e.into()))??
        }
        ExportFormat::Png => {
            let surface = SnapshotSurface::new(blocks, Theme::from_dark(request.dark), geometry);
            tokio::task::spawn_blocking(move || export_png(&surface, Utc::now()))
                .await
                .map_err(|e| AppError::Internal(e.into()))??
        }
    };
    Ok(artifact)
}

async fn load_blocks(state: &AppState, source: &ContentSource) -> Result<Vec<Block>, AppError> {
    let text = match source {
        ContentSource::Last => store::last_content(state.store.as_ref())?.ok_or_else(no_content)?,
        ContentSource::Translation => store::last_translation(state.store.as_ref())?
            .ok_or_else(|| {
                AppError::Validation("nothing translated yet; run `translate` first".to_string())
            })?,
        ContentSource::File(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::Validation(format!("cannot read {}: {e}", path.display()))
        })?,
    };
    Ok(parse_blocks(&text))
}

fn no_content() -> AppError {
    AppError::Validation("no content yet; run `generate` first".to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::layout::PageGeometry;
    use crate::llm_client::testing::{make_client, Scripted, StubTransport};
    use crate::store::{KeyValueStore, MemStore, LAST_CONTENT_KEY};

    fn make_config(output_dir: PathBuf) -> Config {
        Config {
            api_keys: vec!["k1".to_string()],
            api_base_url: "http://localhost".to_string(),
            model: "test-model".to_string(),
            temperature: 0.7,
            max_tokens: 100,
            request_timeout_secs: 5,
            data_dir: None,
            output_dir,
            rust_log: "info".to_string(),
        }
    }

    fn make_state(replies: Vec<Scripted>, output_dir: PathBuf) -> AppState {
        let stub = Arc::new(StubTransport::new(replies));
        AppState {
            llm: make_client(&["k1", "k2"], stub),
            store: Box::new(MemStore::new()),
            config: make_config(output_dir),
            geometry: PageGeometry::default(),
        }
    }

    fn text(s: &str) -> Scripted {
        Scripted::Text(Some(s.to_string()))
    }

    #[tokio::test]
    async fn test_generate_stores_last_content() {
        let mut state = make_state(vec![text("### Rust")], PathBuf::from("."));
        let produced = handle_generate(&mut state, "rust").await.unwrap();
        assert_eq!(produced.content, "### Rust");
        assert!(produced.store_error.is_none());
        assert_eq!(
            state.store.get(LAST_CONTENT_KEY).unwrap().as_deref(),
            Some("### Rust")
        );
    }

    #[tokio::test]
    async fn test_empty_output_keeps_previous_content() {
        let mut state = make_state(vec![Scripted::Text(None)], PathBuf::from("."));
        store::set_last_content(state.store.as_ref(), "old").unwrap();

        let err = handle_generate(&mut state, "new").await.unwrap_err();

        assert!(matches!(err, AppError::EmptyOutput));
        assert_eq!(
            store::last_content(state.store.as_ref()).unwrap().as_deref(),
            Some("old")
        );
    }

    #[tokio::test]
    async fn test_failed_save_still_hands_back_content() {
        let stub = Arc::new(StubTransport::new(vec![text("### Fresh")]));
        let store = MemStore::new();
        store.set_simulate_write_error(true);
        let mut state = AppState {
            llm: make_client(&["k1"], stub),
            store: Box::new(store),
            config: make_config(PathBuf::from(".")),
            geometry: PageGeometry::default(),
        };

        let produced = handle_generate(&mut state, "fresh").await.unwrap();
        assert_eq!(produced.content, "### Fresh");
        assert!(produced.store_error.is_some());

        let mut shown = String::new();
        let result = produced.emit(|content| shown.push_str(content));
        assert_eq!(shown, "### Fresh");
        assert!(matches!(result, Err(AppError::Store(_))));
    }

    #[test]
    fn test_emit_without_store_error_is_ok() {
        let produced = Produced {
            content: "ok".to_string(),
            store_error: None,
        };
        let mut shown = String::new();
        assert!(produced.emit(|c| shown.push_str(c)).is_ok());
        assert_eq!(shown, "ok");
    }

    #[tokio::test]
    async fn test_rotation_carries_across_commands() {
        let mut state = make_state(
            vec![Scripted::RateLimited, text("first"), text("second")],
            PathBuf::from("."),
        );
        handle_generate(&mut state, "one").await.unwrap();
        assert_eq!(state.llm.dispatcher().pool().cursor(), 1);
        handle_generate(&mut state, "two").await.unwrap();
        assert_eq!(state.llm.dispatcher().pool().cursor(), 1);
    }

    #[tokio::test]
    async fn test_generate_saved_uses_stored_prompt() {
        let mut state = make_state(vec![text("done")], PathBuf::from("."));
        handle_save_prompt(&state, "  saved prompt ").unwrap();

        assert_eq!(handle_generate_saved(&mut state, 1).await.unwrap().content, "done");
        assert!(matches!(
            handle_generate_saved(&mut state, 9).await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(handle_list_prompts(&state).unwrap(), vec!["saved prompt"]);
    }

    #[tokio::test]
    async fn test_translate_requires_content() {
        let mut state = make_state(vec![], PathBuf::from("."));
        let err = handle_translate(&mut state, "es").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_translate_stores_translation() {
        let mut state = make_state(vec![text("### Hola")], PathBuf::from("."));
        store::set_last_content(state.store.as_ref(), "### Hello").unwrap();

        handle_translate(&mut state, "es").await.unwrap();

        let shown = handle_show(&state, &ContentSource::Translation).await.unwrap();
        assert!(console::strip_ansi_codes(&shown).contains("Hola"));
    }

    #[tokio::test]
    async fn test_export_each_format_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(vec![], dir.path().to_path_buf());
        store::set_last_content(state.store.as_ref(), "### My Title\nSome **bold** text").unwrap();

        for format in [ExportFormat::Doc, ExportFormat::Pdf, ExportFormat::Png] {
            let request = ExportRequest {
                format,
                source: ContentSource::Last,
                dark: false,
            };
            let path = handle_export(&state, &request).await.unwrap();
            assert!(path.exists());
            assert_eq!(path.extension().unwrap(), format.extension());
        }
        let pdf = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .any(|e| e.file_name().to_string_lossy().starts_with("my-title-"));
        assert!(pdf);
    }

    #[tokio::test]
    async fn test_export_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.md");
        std::fs::write(&input, "### From File").unwrap();
        let state = make_state(vec![], dir.path().join("out"));

        let request = ExportRequest {
            format: ExportFormat::Doc,
            source: ContentSource::File(input),
            dark: false,
        };
        let path = handle_export(&state, &request).await.unwrap();
        let html = std::fs::read_to_string(path).unwrap();
        assert!(html.contains("<h1>From File</h1>"));
    }

    #[tokio::test]
    async fn test_export_without_content_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(vec![], dir.path().to_path_buf());
        let request = ExportRequest {
            format: ExportFormat::Pdf,
            source: ContentSource::Last,
            dark: false,
        };
        assert!(matches!(
            handle_export(&state, &request).await,
            Err(AppError::Validation(_))
        ));
    }
}
