//! Vector index: a query view over persisted fragments
//!
//! The index is not a separate durable structure; fragments live with their
//! document in the repository and this type is the fragment-level access
//! path the retriever uses. Stored vectors are never mutated in place;
//! replacement is remove-then-add.

use std::sync::Arc;

use uuid::Uuid;

use crate::embedding::codec;
use crate::errors::Result;
use crate::repository::Repository;
use crate::types::Fragment;

#[derive(Clone)]
pub struct VectorIndex {
    repository: Arc<dyn Repository>,
}

impl VectorIndex {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    /// Attach a document's fragment/vector pairs. Fails if the document
    /// already has fragments; callers must [`VectorIndex::remove`] first.
    pub async fn add(&self, document_id: Uuid, fragments: Vec<Fragment>) -> Result<()> {
        self.repository.attach_fragments(document_id, fragments).await
    }

    /// Drop a document's fragments from the index
    pub async fn remove(&self, document_id: Uuid) -> Result<()> {
        self.repository.clear_fragments(document_id).await
    }

    /// All fragments of a document in position order, vectors validated
    /// against `expected_dim` on the way out.
    pub async fn fragments_of(
        &self,
        document_id: Uuid,
        expected_dim: usize,
    ) -> Result<Vec<Fragment>> {
        let document = self.repository.document(document_id).await?;
        let mut fragments: Vec<Fragment> = document
            .fragments
            .into_iter()
            .map(|mut f| {
                f.embedding = codec::decode(f.embedding, expected_dim)?;
                Ok(f)
            })
            .collect::<Result<_>>()?;
        fragments.sort_by_key(|f| f.position);
        Ok(fragments)
    }
}
