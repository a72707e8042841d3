// Content pipeline: LLM commands, block parsing, and terminal display.
// All LLM calls go through llm_client; nothing here talks HTTP.

pub mod blocks;
pub mod generator;
pub mod prompts;
pub mod terminal;

pub use blocks::{parse_blocks, Block, Span};
