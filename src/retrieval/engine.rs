//! Retrieval engine: rank fragments by cosine similarity
//!
//! Retrieval is a pure computation over already-loaded candidate documents.
//! Determinism matters more than speed at this scale: equal scores break
//! ties on (document kind, fragment position) so repeated calls over the
//! same index content always return the same ordering.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{Document, DocumentKind};

/// One ranked fragment. Transient, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Cosine similarity in [-1, 1]
    pub similarity: f32,
    pub text: String,
    pub kind: DocumentKind,
    /// Citation source index: 0 = resume, 1 = job description
    pub source_index: u8,
    /// Fragment position within its parent document
    pub position: usize,
}

/// Cosine similarity `dot(a,b) / (|a|·|b|)`, defined as 0 when either
/// vector has zero magnitude. Accumulates in f64 so large components do not
/// overflow the intermediate products.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f64;
    let mut mag_a = 0.0f64;
    let mut mag_b = 0.0f64;
    for i in 0..a.len().min(b.len()) {
        let (x, y) = (a[i] as f64, b[i] as f64);
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }
    // Components past the shorter length still count toward magnitude
    for &x in &a[a.len().min(b.len())..] {
        mag_a += x as f64 * x as f64;
    }
    for &y in &b[a.len().min(b.len())..] {
        mag_b += y as f64 * y as f64;
    }

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    ((dot / (mag_a.sqrt() * mag_b.sqrt())).clamp(-1.0, 1.0)) as f32
}

/// Top-k fragment retrieval across candidate documents
#[derive(Debug, Clone, Default)]
pub struct Retriever;

impl Retriever {
    pub fn new() -> Self {
        Self
    }

    /// Rank every fragment of every candidate against `query` and return at
    /// most `k` results, best first.
    ///
    /// A candidate with no fragments contributes nothing; retrieval degrades
    /// over the remaining candidates instead of failing.
    pub fn retrieve(
        &self,
        query: &[f32],
        candidates: &[&Document],
        k: usize,
    ) -> Vec<RetrievalResult> {
        let mut results: Vec<RetrievalResult> = Vec::new();

        for document in candidates {
            if document.fragments.is_empty() {
                warn!(
                    document_id = %document.id,
                    kind = %document.kind,
                    "candidate document has no fragments, retrieval degraded"
                );
                continue;
            }
            for fragment in &document.fragments {
                results.push(RetrievalResult {
                    similarity: cosine_similarity(query, &fragment.embedding),
                    text: fragment.text.clone(),
                    kind: document.kind,
                    source_index: document.kind.source_index(),
                    position: fragment.position,
                });
            }
        }

        results.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.kind.cmp(&b.kind))
                .then_with(|| a.position.cmp(&b.position))
        });
        results.truncate(k);
        results
    }
}
