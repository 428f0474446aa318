//! In-memory repository backed by `RwLock`ed maps
//!
//! Reference implementation of the [`Repository`] contract, also the store
//! the test suite runs against. Each method takes the lock once, so the
//! atomicity requirements (delete-with-fragments, CAS session update) hold
//! trivially.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::{EngineError, Result};
use crate::repository::Repository;
use crate::types::{Document, DocumentKind, Fragment, Session};

#[derive(Default)]
pub struct InMemoryRepository {
    documents: RwLock<HashMap<Uuid, Document>>,
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create_document(&self, document: Document) -> Result<()> {
        let mut documents = self.documents.write().await;
        if documents.contains_key(&document.id) {
            return Err(EngineError::Repository {
                reason: format!("document {} already exists", document.id),
            });
        }
        documents.insert(document.id, document);
        Ok(())
    }

    async fn document(&self, id: Uuid) -> Result<Document> {
        self.documents
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(EngineError::NotFound {
                entity: "document",
                id: id.to_string(),
            })
    }

    async fn latest_document(
        &self,
        owner_id: Uuid,
        kind: DocumentKind,
    ) -> Result<Option<Document>> {
        let documents = self.documents.read().await;
        Ok(documents
            .values()
            .filter(|d| d.owner_id == owner_id && d.kind == kind)
            .max_by_key(|d| d.uploaded_at)
            .cloned())
    }

    async fn documents_for_owner(&self, owner_id: Uuid) -> Result<Vec<Document>> {
        let documents = self.documents.read().await;
        let mut owned: Vec<Document> = documents
            .values()
            .filter(|d| d.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(owned)
    }

    async fn attach_fragments(&self, document_id: Uuid, fragments: Vec<Fragment>) -> Result<()> {
        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(&document_id)
            .ok_or(EngineError::NotFound {
                entity: "document",
                id: document_id.to_string(),
            })?;
        if !document.fragments.is_empty() {
            return Err(EngineError::Repository {
                reason: format!(
                    "document {document_id} already has fragments; clear before re-attaching"
                ),
            });
        }
        document.fragments = fragments;
        Ok(())
    }

    async fn clear_fragments(&self, document_id: Uuid) -> Result<()> {
        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(&document_id)
            .ok_or(EngineError::NotFound {
                entity: "document",
                id: document_id.to_string(),
            })?;
        document.fragments.clear();
        Ok(())
    }

    async fn delete_document(&self, id: Uuid) -> Result<()> {
        let mut documents = self.documents.write().await;
        documents.remove(&id).ok_or(EngineError::NotFound {
            entity: "document",
            id: id.to_string(),
        })?;
        Ok(())
    }

    async fn create_session(&self, session: Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(EngineError::Repository {
                reason: format!("session {} already exists", session.id),
            });
        }
        sessions.insert(session.id, session);
        Ok(())
    }

    async fn session(&self, id: Uuid) -> Result<Session> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(EngineError::NotFound {
                entity: "session",
                id: id.to_string(),
            })
    }

    async fn update_session(&self, mut session: Session, expected_version: u64) -> Result<Session> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get_mut(&session.id)
            .ok_or(EngineError::NotFound {
                entity: "session",
                id: session.id.to_string(),
            })?;
        if stored.version != expected_version {
            return Err(EngineError::SessionConflict {
                session_id: session.id.to_string(),
            });
        }
        session.version = expected_version + 1;
        *stored = session.clone();
        Ok(session)
    }
}
