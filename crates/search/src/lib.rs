//! # netrag Search
//!
//! Retrieval over the document collection and retrieval-augmented answers.
//!
//! ```text
//! query ──> RetrievalService ──┬─> general pool         (60%)
//!                              ├─> error_patterns pool  (20%)
//!                              └─> best_practices pool  (20%)
//!                                        │
//!                              PromptComposer (system + query + context + mode note)
//!                                        │
//!                              Assistant ──> CompletionService ──> answer | fallback
//! ```

mod assistant;
mod error;
mod prompt;
mod retrieval;

pub use assistant::Assistant;
pub use error::{Result, SearchError};
pub use prompt::{render_context, PromptComposer, DEFAULT_SYSTEM_PROMPT};
pub use retrieval::{pool_sizes, RetrievalConfig, RetrievalService};
