//! Similarity search over candidate documents

pub mod engine;

pub use engine::{cosine_similarity, RetrievalResult, Retriever};
