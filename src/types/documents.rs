//! Document and fragment entities
//!
//! A document is the extracted text of one uploaded file plus its ordered
//! fragments. Exactly two kinds participate in grounding: the candidate's
//! resume and the job description they are interviewing against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which of the two grounding documents this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    JobDescription,
}

impl DocumentKind {
    /// Citation source index for this kind: 0 = resume, 1 = job description
    pub fn source_index(&self) -> u8 {
        match self {
            DocumentKind::Resume => 0,
            DocumentKind::JobDescription => 1,
        }
    }

    /// Inverse of [`DocumentKind::source_index`]
    pub fn from_source_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(DocumentKind::Resume),
            1 => Some(DocumentKind::JobDescription),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Resume => write!(f, "resume"),
            DocumentKind::JobDescription => write!(f, "job_description"),
        }
    }
}

/// A bounded slice of document text paired with its embedding vector
///
/// A fragment is never constructed without a successfully computed vector;
/// ingestion drops fragments whose embedding failed instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    pub document_id: Uuid,
    /// Zero-based position within the parent document's chunk order
    pub position: usize,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// One ingested document with its fragment index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub kind: DocumentKind,
    pub file_name: Option<String>,
    pub full_text: String,
    pub uploaded_at: DateTime<Utc>,
    pub fragments: Vec<Fragment>,
    /// Some fragments were dropped during ingestion (embedding failures).
    /// The document is still usable for retrieval.
    pub partially_indexed: bool,
}

impl Document {
    pub fn new(owner_id: Uuid, kind: DocumentKind, full_text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            kind,
            file_name: None,
            full_text,
            uploaded_at: Utc::now(),
            fragments: Vec::new(),
            partially_indexed: false,
        }
    }

    /// First fragment's text, used as fallback grounding context
    pub fn first_fragment_text(&self) -> Option<&str> {
        self.fragments.first().map(|f| f.text.as_str())
    }
}
