//! # Subtask Suggestions
//!
//! Generates subtask suggestions for a task through a generative-language
//! model.
//!
//! This crate provides:
//! - Prompt construction from a task title and description
//! - A Gemini `generateContent` client
//! - Parsing of numbered-list output into a bounded suggestion list
//! - The orchestrator applying model fallback and exponential backoff
//! - Scripted client and sleeper doubles for driving the orchestrator,
//!   behind the `test-util` feature

pub mod client;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod orchestrator;
pub mod parser;
pub mod prompt;

pub use client::GeminiClient;
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockUpstreamClient, RecordedCall, RecordingSleeper};
pub use orchestrator::{API_KEY_MISSING, Orchestration, Orchestrator, TITLE_REQUIRED};
pub use parser::{extract_text, parse_suggestions};
pub use prompt::build_prompt;
