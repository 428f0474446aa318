//! Generation service boundary
//!
//! The engine never inspects how text gets generated; it hands prompt
//! material to a [`GenerationClient`] and receives either free text or a
//! schema-validated [`Evaluation`]. The shipped implementation speaks the
//! Gemini `generateContent` JSON API over HTTP with a hard request timeout.

pub mod client;
pub mod types;

pub use client::{GenerationClient, GenerationConfig, HttpGenerationClient};
pub use types::{Evaluation, PromptMaterial};
