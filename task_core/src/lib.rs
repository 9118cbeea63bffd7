//! # Task Suggestion Core
//!
//! Shared types and traits for the subtask suggestion pipeline.
//!
//! This crate provides:
//! - The read-only `Task` shape owned by the client-side task store
//! - Request, result and attempt types exchanged with the orchestrator
//! - The `UpstreamClient` and `Sleeper` seams used to drive and test it

pub mod traits;
pub mod types;

pub use traits::{Sleeper, TokioSleeper, UpstreamClient};
pub use types::{
    ApiKey, AttemptOutcome, Candidate, Content, MAX_SUGGESTIONS, ModelAttempt, NewTask, Part,
    RawResponse, SuggestionRequest, SuggestionResult, Task, TaskStatus
};
