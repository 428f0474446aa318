//! Ingestion pipeline: chunk, embed concurrently, index
//!
//! Fragment embeddings have no ordering dependency on each other, so they
//! run concurrently up to a configured limit. A fragment whose embedding
//! fails is dropped and counted; the rest of the document still indexes and
//! the document is marked partially indexed.

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::embedding::Embedder;
use crate::errors::{EngineError, Result};
use crate::index::VectorIndex;
use crate::ingest::chunker::chunk;
use crate::repository::Repository;
use crate::types::{Document, DocumentKind, Fragment};
use uuid::Uuid;

/// Ingestion tuning knobs
#[derive(Debug, Clone)]
pub struct IngestionConfig {
    /// Maximum words per fragment
    pub max_words_per_chunk: usize,
    /// Upper bound on in-flight embedding calls per document
    pub max_concurrent_embeddings: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_words_per_chunk: 500,
            max_concurrent_embeddings: 4,
        }
    }
}

/// Outcome of ingesting one document
#[derive(Debug, Clone)]
pub struct IngestionReport {
    pub document_id: Uuid,
    pub fragments_indexed: usize,
    /// Fragments dropped because their embedding failed
    pub fragments_failed: usize,
}

impl IngestionReport {
    pub fn is_partial(&self) -> bool {
        self.fragments_failed > 0
    }
}

/// Chunk-embed-index pipeline over the repository-backed vector index
pub struct IngestionPipeline {
    embedder: Arc<dyn Embedder>,
    repository: Arc<dyn Repository>,
    index: VectorIndex,
    config: IngestionConfig,
}

impl IngestionPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        repository: Arc<dyn Repository>,
        config: IngestionConfig,
    ) -> Self {
        let index = VectorIndex::new(Arc::clone(&repository));
        Self {
            embedder,
            repository,
            index,
            config,
        }
    }

    /// Ingest one document's extracted text.
    ///
    /// Embedding failures drop the affected fragment only; the document is
    /// persisted either way so a later session can still reference it
    /// (placeholder grounding covers the empty-fragment case).
    pub async fn ingest(
        &self,
        owner_id: Uuid,
        kind: DocumentKind,
        text: String,
    ) -> Result<IngestionReport> {
        let mut document = Document::new(owner_id, kind, text);
        let document_id = document.id;

        let chunks = chunk(&document.full_text, self.config.max_words_per_chunk);
        let total = chunks.len();

        let results: Vec<(usize, String, Result<Vec<f32>>)> =
            stream::iter(chunks.into_iter().enumerate().map(|(position, text)| {
                let embedder = Arc::clone(&self.embedder);
                async move {
                    let embedding = embedder.embed(&text).await;
                    (position, text, embedding)
                }
            }))
            .buffer_unordered(self.config.max_concurrent_embeddings)
            .collect()
            .await;

        let mut fragments = Vec::with_capacity(total);
        let mut failed = 0usize;
        for (position, text, embedding) in results {
            match embedding {
                Ok(embedding) => fragments.push(Fragment {
                    document_id,
                    position,
                    text,
                    embedding,
                }),
                Err(err) => {
                    warn!(%document_id, position, %err, "dropping fragment, embedding failed");
                    failed += 1;
                }
            }
        }
        // buffer_unordered yields in completion order; restore chunk order
        fragments.sort_by_key(|f| f.position);

        document.partially_indexed = failed > 0;
        let as_ingestion_err = |e: EngineError| EngineError::Ingestion {
            document_id: document_id.to_string(),
            reason: e.to_string(),
        };
        self.repository
            .create_document(document)
            .await
            .map_err(as_ingestion_err)?;
        self.index
            .add(document_id, fragments)
            .await
            .map_err(as_ingestion_err)?;

        let report = IngestionReport {
            document_id,
            fragments_indexed: total - failed,
            fragments_failed: failed,
        };
        info!(
            %document_id,
            kind = %kind,
            indexed = report.fragments_indexed,
            failed = report.fragments_failed,
            "document ingested"
        );
        Ok(report)
    }

    /// Query view over what this pipeline indexes
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use crate::errors::EngineError;
    use crate::repository::InMemoryRepository;
    use async_trait::async_trait;

    /// Embedder that fails on fragments containing a marker word
    struct FlakyEmbedder {
        inner: HashEmbedder,
    }

    #[async_trait]
    impl Embedder for FlakyEmbedder {
        fn dimension(&self) -> usize {
            self.inner.dimension()
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if text.contains("poison") {
                return Err(EngineError::EmbeddingFailed {
                    reason: "backend rejected input".to_string(),
                });
            }
            self.inner.embed(text).await
        }
    }

    fn pipeline_with(embedder: Arc<dyn Embedder>) -> (IngestionPipeline, Arc<InMemoryRepository>) {
        let repo = Arc::new(InMemoryRepository::new());
        let pipeline = IngestionPipeline::new(
            embedder,
            Arc::clone(&repo) as Arc<dyn Repository>,
            IngestionConfig {
                max_words_per_chunk: 2,
                max_concurrent_embeddings: 4,
            },
        );
        (pipeline, repo)
    }

    #[tokio::test]
    async fn test_ingest_indexes_all_fragments_in_order() {
        let (pipeline, repo) = pipeline_with(Arc::new(HashEmbedder::new()));
        let owner = Uuid::new_v4();

        let report = pipeline
            .ingest(owner, DocumentKind::Resume, "alpha beta gamma delta".to_string())
            .await
            .unwrap();

        assert_eq!(report.fragments_indexed, 2);
        assert_eq!(report.fragments_failed, 0);
        assert!(!report.is_partial());

        let doc = repo.document(report.document_id).await.unwrap();
        let texts: Vec<&str> = doc.fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["alpha beta", "gamma delta"]);
        assert_eq!(doc.fragments[0].position, 0);
        assert_eq!(doc.fragments[1].position, 1);
        assert!(!doc.partially_indexed);
    }

    #[tokio::test]
    async fn test_failed_fragment_is_dropped_not_fatal() {
        let embedder = Arc::new(FlakyEmbedder {
            inner: HashEmbedder::new(),
        });
        let (pipeline, repo) = pipeline_with(embedder);
        let owner = Uuid::new_v4();

        let report = pipeline
            .ingest(owner, DocumentKind::Resume, "good words poison pill fine text".to_string())
            .await
            .unwrap();

        assert_eq!(report.fragments_indexed, 2);
        assert_eq!(report.fragments_failed, 1);
        assert!(report.is_partial());

        let doc = repo.document(report.document_id).await.unwrap();
        assert!(doc.partially_indexed);
        assert_eq!(doc.fragments.len(), 2);
        assert!(doc.fragments.iter().all(|f| !f.text.contains("poison")));
    }

    #[tokio::test]
    async fn test_extraction_placeholder_still_indexes() {
        // Upstream extraction failed; the caller hands us the placeholder
        // text and the document still becomes retrievable.
        let (pipeline, repo) = pipeline_with(Arc::new(HashEmbedder::new()));
        let report = pipeline
            .ingest(
                Uuid::new_v4(),
                DocumentKind::Resume,
                crate::ingest::EXTRACTION_FAILED_PLACEHOLDER.to_string(),
            )
            .await
            .unwrap();

        assert!(report.fragments_indexed > 0);
        let doc = repo.document(report.document_id).await.unwrap();
        assert_eq!(doc.full_text, crate::ingest::EXTRACTION_FAILED_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_empty_text_yields_one_empty_fragment() {
        let (pipeline, repo) = pipeline_with(Arc::new(HashEmbedder::new()));
        let report = pipeline
            .ingest(Uuid::new_v4(), DocumentKind::JobDescription, String::new())
            .await
            .unwrap();

        assert_eq!(report.fragments_indexed, 1);
        let doc = repo.document(report.document_id).await.unwrap();
        assert_eq!(doc.fragments.len(), 1);
        assert_eq!(doc.fragments[0].text, "");
    }
}
