//! Persistence seam
//!
//! The engine never talks to a concrete store; everything goes through
//! [`Repository`]. Documents carry their fragments, so document deletion is
//! atomic with fragment deletion by construction. Session updates are
//! compare-and-swap on a version counter: append-turns-with-state-transition
//! either lands as one unit or fails with a conflict.

mod memory;

pub use memory::InMemoryRepository;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::Result;
use crate::types::{Document, DocumentKind, Fragment, Session};

/// CRUD over documents and sessions, keyed by owner identity
#[async_trait]
pub trait Repository: Send + Sync {
    /// Persist a new document (fragments may be attached later)
    async fn create_document(&self, document: Document) -> Result<()>;

    /// Fetch a document with its fragments
    async fn document(&self, id: Uuid) -> Result<Document>;

    /// Most recently uploaded document of `kind` for `owner_id`, if any
    async fn latest_document(
        &self,
        owner_id: Uuid,
        kind: DocumentKind,
    ) -> Result<Option<Document>>;

    /// All documents belonging to `owner_id`, newest first
    async fn documents_for_owner(&self, owner_id: Uuid) -> Result<Vec<Document>>;

    /// Attach fragments to a document that has none yet. Stored fragments
    /// are never mutated in place; replacement is clear-then-attach.
    async fn attach_fragments(&self, document_id: Uuid, fragments: Vec<Fragment>) -> Result<()>;

    /// Drop all fragments of a document, keeping the document itself
    async fn clear_fragments(&self, document_id: Uuid) -> Result<()>;

    /// Delete a document and its fragments as one unit
    async fn delete_document(&self, id: Uuid) -> Result<()>;

    /// Persist a new session
    async fn create_session(&self, session: Session) -> Result<()>;

    /// Fetch a session with its turn history
    async fn session(&self, id: Uuid) -> Result<Session>;

    /// Compare-and-swap session update. Succeeds only when the stored
    /// version equals `expected_version`; the stored version is bumped and
    /// the updated session returned. Version mismatch is a
    /// [`crate::errors::EngineError::SessionConflict`].
    async fn update_session(&self, session: Session, expected_version: u64) -> Result<Session>;
}
