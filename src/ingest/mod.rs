//! Document ingestion: split, embed, persist
//!
//! [`chunker`] is the pure text splitter; [`pipeline`] wires it to the
//! embedder and repository with bounded concurrency.

pub mod chunker;
pub mod pipeline;

pub use chunker::chunk;
pub use pipeline::{IngestionConfig, IngestionPipeline, IngestionReport};

/// Stand-in text when upstream extraction failed but the binary was stored
pub const EXTRACTION_FAILED_PLACEHOLDER: &str = "[extraction failed - binary stored]";
