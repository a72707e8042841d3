use thiserror::Error;

use crate::export::ExportError;
use crate::layout::LayoutError;
use crate::llm_client::LlmError;
use crate::store::StoreError;

/// Application-level error type.
/// Every command returns `Result<T, AppError>`; the CLI turns the error into
/// a short notification via [`AppError::notification`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("The model returned no content")]
    EmptyOutput,

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// User-facing summary of a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub code: &'static str,
    pub message: String,
    /// Soft failures leave state untouched and do not fail the process.
    pub soft: bool,
}

impl Notification {
    fn hard(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            soft: false,
        }
    }
}

impl AppError {
    /// Maps the error to a short notification, logging internal causes.
    pub fn notification(&self) -> Notification {
        match self {
            AppError::Validation(msg) => Notification::hard("VALIDATION_ERROR", msg.clone()),
            AppError::Llm(LlmError::NoCredentials) => Notification::hard(
                "NO_CREDENTIALS",
                "No API keys configured. Set OPENAI_API_KEY_1 (up to OPENAI_API_KEY_6).",
            ),
            AppError::Llm(LlmError::ExhaustedPool { attempts }) => {
                tracing::error!("All {attempts} API keys rate limited");
                Notification::hard(
                    "EXHAUSTED_POOL",
                    "All API keys are rate limited. Try again later.",
                )
            }
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                Notification::hard("LLM_ERROR", "The completion service request failed")
            }
            AppError::EmptyOutput => {
                tracing::warn!("Completion returned no content");
                Notification {
                    code: "EMPTY_OUTPUT",
                    message: "No content was generated".to_string(),
                    soft: true,
                }
            }
            AppError::Layout(e) => {
                tracing::error!("Layout error: {e}");
                Notification::hard("INVALID_GEOMETRY", "Failed to lay out the document")
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                Notification::hard("STORE_ERROR", "Could not read or write saved data")
            }
            AppError::Export(e) => {
                tracing::error!("Export error: {e}");
                Notification::hard("EXPORT_ERROR", format!("Failed to save {}", e.target()))
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                Notification::hard("INTERNAL_ERROR", "An internal error occurred")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportFormat;

    #[test]
    fn test_empty_output_is_soft() {
        let n = AppError::EmptyOutput.notification();
        assert_eq!(n.code, "EMPTY_OUTPUT");
        assert!(n.soft);
    }

    #[test]
    fn test_exhausted_pool_notification() {
        let n = AppError::Llm(LlmError::ExhaustedPool { attempts: 3 }).notification();
        assert_eq!(n.code, "EXHAUSTED_POOL");
        assert!(!n.soft);
    }

    #[test]
    fn test_upstream_error_message_is_generic() {
        let n = AppError::Llm(LlmError::Api {
            status: 500,
            message: "stack trace here".to_string(),
        })
        .notification();
        assert_eq!(n.code, "LLM_ERROR");
        assert!(!n.message.contains("stack trace"));
    }

    #[test]
    fn test_export_error_names_format() {
        let err = ExportError::Encode {
            format: ExportFormat::Pdf,
            message: "bad".to_string(),
        };
        let n = AppError::Export(err).notification();
        assert_eq!(n.message, "Failed to save PDF file");
    }
}
