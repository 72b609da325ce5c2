//! Text-generation client abstraction
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          PipelineExecutor               │
//! └─────────────────┬───────────────────────┘
//!                   │ injected at construction
//!                   ▼
//! ┌─────────────────────────────────────────┐
//! │        TextGenerator (trait)            │
//! │  - generate(model, prompt) -> text      │
//! └─────────────────┬───────────────────────┘
//!                   │ implemented by
//!                   ▼
//! ┌─────────────────────────────────────────┐
//! │   OllamaGenerator (Rig ollama client)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Tests substitute their own `TextGenerator` to script responses and
//! failures.

mod ollama;
mod provider;

pub use ollama::{OllamaGenerator, DEFAULT_OLLAMA_HOST};
pub use provider::{GenerationError, TextGenerator};
