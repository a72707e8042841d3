// Prompt constants for the content commands.
// Generation sends the user's prompt as-is with no system message.

/// System prompt for the search command.
pub const SEARCH_SYSTEM: &str =
    "You are a search assistant. Find relevant content based on the query.";

/// Translation system prompt template. Replace `{language}` before sending.
pub const TRANSLATE_SYSTEM_TEMPLATE: &str = "Translate to {language}";

/// Target languages offered by `translate`, as (code, display name).
pub const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("zh", "Chinese"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
];

/// Prompt-writing tips shown by `tips` and the session banner.
pub const TIPS: &[&str] = &[
    "Be specific about topic and tone",
    "Include target audience",
    "Specify desired length",
    "Use ### for headers",
    "Request examples or case studies",
    "Specify formatting preferences",
    "Request citations if needed",
    "Use bold text for key points",
];

/// Looks up a language display name by its code (case-insensitive).
pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code.trim()))
        .map(|(_, name)| *name)
}

pub fn translate_system(language: &str) -> String {
    TRANSLATE_SYSTEM_TEMPLATE.replace("{language}", language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_name_lookup() {
        assert_eq!(language_name("fr"), Some("French"));
        assert_eq!(language_name(" JA "), Some("Japanese"));
        assert_eq!(language_name("xx"), None);
    }

    #[test]
    fn test_translate_system_fills_language() {
        assert_eq!(translate_system("German"), "Translate to German");
    }
}
