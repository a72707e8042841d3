use std::path::PathBuf;

use anyhow::{Context, Result};

/// Number of numbered credential slots read from the environment
/// (`OPENAI_API_KEY_1` .. `OPENAI_API_KEY_6`).
pub const MAX_KEY_SLOTS: usize = 6;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Application configuration loaded from environment variables.
/// Nothing is strictly required at startup: a missing key pool surfaces
/// as `NoCredentials` on the first remote call.
#[derive(Clone)]
pub struct Config {
    /// Credential slots in order, empty and absent entries already removed.
    pub api_keys: Vec<String>,
    pub api_base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    /// Overrides the platform data directory for the key-value store.
    pub data_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub rust_log: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_keys", &format_args!("[{} redacted]", self.api_keys.len()))
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("data_dir", &self.data_dir)
            .field("output_dir", &self.output_dir)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_keys: read_key_slots(|key| std::env::var(key).ok()),
            api_base_url: optional_env("OPENAI_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            model: optional_env("CONTENTGEN_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: parse_env("CONTENTGEN_TEMPERATURE", 0.7)?,
            max_tokens: parse_env("CONTENTGEN_MAX_TOKENS", 1000)?,
            request_timeout_secs: parse_env("CONTENTGEN_TIMEOUT_SECS", 120)?,
            data_dir: optional_env("CONTENTGEN_DATA_DIR").map(PathBuf::from),
            output_dir: optional_env("CONTENTGEN_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads `OPENAI_API_KEY_1..=MAX_KEY_SLOTS` in order through `lookup`,
/// dropping absent and blank entries.
pub fn read_key_slots<F>(lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    (1..=MAX_KEY_SLOTS)
        .filter_map(|slot| lookup(&format!("OPENAI_API_KEY_{slot}")))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_read_key_slots_keeps_order_and_drops_blanks() {
        let env: HashMap<&str, &str> = [
            ("OPENAI_API_KEY_1", "sk-one"),
            ("OPENAI_API_KEY_2", ""),
            ("OPENAI_API_KEY_3", "   "),
            ("OPENAI_API_KEY_5", "sk-five"),
            ("OPENAI_API_KEY_6", " sk-six "),
        ]
        .into_iter()
        .collect();

        let keys = read_key_slots(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(keys, vec!["sk-one", "sk-five", "sk-six"]);
    }

    #[test]
    fn test_read_key_slots_ignores_slots_past_limit() {
        let keys = read_key_slots(|k| {
            (k == "OPENAI_API_KEY_7").then(|| "sk-seven".to_string())
        });
        assert!(keys.is_empty());
    }

    #[test]
    fn test_debug_output_redacts_keys() {
        let config = Config {
            api_keys: vec!["sk-secret-value".to_string()],
            api_base_url: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            request_timeout_secs: 120,
            data_dir: None,
            output_dir: PathBuf::from("."),
            rust_log: "info".to_string(),
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret-value"));
        assert!(rendered.contains("1 redacted"));
    }
}
