//! Interview engine
//!
//! Owns the full turn cycle: opening question issuance, answer intake,
//! grounded evaluation, and history accumulation. Mutation of a session's
//! turn sequence is serialized two ways: a per-session `try_lock` (the loser
//! of a race gets a conflict error immediately) and the repository's
//! compare-and-swap versioning underneath it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex as TokioMutex, OwnedMutexGuard};
use tracing::{info, warn};
use uuid::Uuid;

use crate::embedding::Embedder;
use crate::errors::{EngineError, Result};
use crate::generation::{Evaluation, GenerationClient, PromptMaterial};
use crate::grounding::{truncate_chars, GroundingAssembler};
use crate::repository::Repository;
use crate::session::state::{transition, SessionAction};
use crate::types::{DocumentKind, Session, SessionState, Turn, TurnRole};

/// Role description used when the owner has not uploaded a job description
const GENERIC_ROLE_DESCRIPTION: &str =
    "Senior Software Engineer focusing on backend systems and cloud infrastructure.";

/// Job description text included in the opening prompt is capped here
const MAX_JD_PROMPT_CHARS: usize = 4000;

const START_SYSTEM_PROMPT: &str = "You are a professional job interviewer. Ask questions based \
    only on the provided job description if available, or on general best practices otherwise. \
    Generate exactly 3 initial, high-level interview questions. Do not provide answers, scores, \
    or feedback yet. Only return the questions in a numbered list.";

const EVALUATE_USER_PROMPT: &str =
    "Evaluate the candidate's response and provide the structured output.";

/// Result of opening an interview: the opening questions and the updated
/// session carrying them as its first interviewer turn.
#[derive(Debug, Clone)]
pub struct StartedInterview {
    pub session: Session,
    pub questions: Vec<String>,
}

type LockTable = Arc<StdMutex<HashMap<Uuid, Arc<TokioMutex<()>>>>>;

/// Writer lock over one session. Dropping it releases the lock and evicts
/// the table entry when no other task still references it, so the table
/// stays bounded by the number of sessions currently in flight.
struct SessionGuard {
    session_id: Uuid,
    table: LockTable,
    inner: Option<OwnedMutexGuard<()>>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        drop(self.inner.take());
        if let Ok(mut locks) = self.table.lock() {
            let idle = locks
                .get(&self.session_id)
                .is_some_and(|lock| Arc::strong_count(lock) == 1);
            if idle {
                locks.remove(&self.session_id);
            }
        }
    }
}

/// Drives interview sessions against the repository and generation service
pub struct InterviewEngine {
    repository: Arc<dyn Repository>,
    generation: Arc<dyn GenerationClient>,
    assembler: GroundingAssembler,
    locks: LockTable,
}

impl InterviewEngine {
    pub fn new(
        repository: Arc<dyn Repository>,
        embedder: Arc<dyn Embedder>,
        generation: Arc<dyn GenerationClient>,
    ) -> Self {
        Self {
            repository,
            generation,
            assembler: GroundingAssembler::new(embedder),
            locks: Arc::new(StdMutex::new(HashMap::new())),
        }
    }

    /// Create a fresh session in `Created` state
    pub async fn create_session(&self, owner_id: Uuid) -> Result<Session> {
        let session = Session::new(owner_id);
        self.repository.create_session(session.clone()).await?;
        info!(session_id = %session.id, %owner_id, "session created");
        Ok(session)
    }

    /// Fetch a session with its turn history
    pub async fn session(&self, session_id: Uuid) -> Result<Session> {
        self.repository.session(session_id).await
    }

    /// Issue the opening interview questions.
    ///
    /// Grounds the questions in the owner's most recent job description,
    /// falling back to a generic role description when none is uploaded.
    /// Valid only in `Created`.
    pub async fn start_interview(&self, session_id: Uuid) -> Result<StartedInterview> {
        let _guard = self.try_lock_session(session_id)?;
        let mut session = self.repository.session(session_id).await?;

        // Validate before spending a generation call
        let next_state = transition(session.id, session.state, SessionAction::IssueQuestions)?;

        let jd = self
            .repository
            .latest_document(session.owner_id, DocumentKind::JobDescription)
            .await?;
        let role_text = match &jd {
            Some(doc) => truncate_chars(&doc.full_text, MAX_JD_PROMPT_CHARS),
            None => {
                warn!(session_id = %session.id, "no job description uploaded, using generic role");
                GENERIC_ROLE_DESCRIPTION.to_string()
            }
        };

        let prompt = PromptMaterial {
            session_id: session.id,
            system: START_SYSTEM_PROMPT.to_string(),
            user: format!(
                "Generate 3 initial interview questions based on this role description: {role_text}"
            ),
        };
        let response = self.generation.generate_text(&prompt).await?;

        let questions = parse_numbered_questions(&response);
        if questions.is_empty() {
            return Err(EngineError::Generation {
                session_id: session.id.to_string(),
                stage: "questions",
                reason: "service did not return a numbered question list".to_string(),
            });
        }

        let expected = session.version;
        session
            .turns
            .push(Turn::new(TurnRole::Interviewer, questions.join("\n")));
        session.state = next_state;
        let session = self.repository.update_session(session, expected).await?;

        info!(session_id = %session.id, count = questions.len(), "interview started");
        Ok(StartedInterview { session, questions })
    }

    /// Accept a candidate answer and evaluate it against the grounded
    /// context, appending the evaluation as the next interviewer turn.
    ///
    /// On evaluation failure the candidate turn stays as the last turn and
    /// the session returns to `AwaitingAnswer`; calling this again with the
    /// same text retries the pending evaluation without appending a
    /// duplicate turn. A different text while an evaluation is pending is
    /// rejected, never silently swapped for the stored answer.
    pub async fn submit_answer(&self, session_id: Uuid, answer: &str) -> Result<Evaluation> {
        let _guard = self.try_lock_session(session_id)?;
        let session = self.repository.session(session_id).await?;

        let pending_retry = session
            .last_turn()
            .is_some_and(|t| t.role == TurnRole::Candidate)
            && matches!(
                session.state,
                SessionState::AwaitingAnswer | SessionState::Evaluating
            );
        if pending_retry && session.last_turn().is_some_and(|t| t.content != answer) {
            return Err(EngineError::InvalidTransition {
                session_id: session.id.to_string(),
                state: session.state.to_string(),
                action: SessionAction::SubmitAnswer.to_string(),
                reason: "a different answer is already pending evaluation".to_string(),
            });
        }

        let session = if pending_retry {
            // A previous evaluation failed after the answer was captured;
            // re-enter evaluation of the stored answer, no new turn.
            info!(session_id = %session.id, "retrying pending evaluation");
            let mut session = session;
            if session.state == SessionState::AwaitingAnswer {
                let expected = session.version;
                session.state =
                    transition(session.id, session.state, SessionAction::SubmitAnswer)?;
                session = self.repository.update_session(session, expected).await?;
            }
            session
        } else {
            let next_state = transition(session.id, session.state, SessionAction::SubmitAnswer)?;
            if session.last_interviewer_turn().is_none() {
                return Err(EngineError::InvalidTransition {
                    session_id: session.id.to_string(),
                    state: session.state.to_string(),
                    action: SessionAction::SubmitAnswer.to_string(),
                    reason: "no interviewer question exists to answer".to_string(),
                });
            }

            let mut session = session;
            let expected = session.version;
            session.turns.push(Turn::new(TurnRole::Candidate, answer));
            session.state = next_state;
            self.repository.update_session(session, expected).await?
        };

        self.evaluate_pending(session).await
    }

    /// Close a session. Terminal; no further turns are accepted.
    pub async fn close_session(&self, session_id: Uuid) -> Result<Session> {
        let _guard = self.try_lock_session(session_id)?;
        let mut session = self.repository.session(session_id).await?;
        session.state = transition(session.id, session.state, SessionAction::Close)?;
        let expected = session.version;
        let session = self.repository.update_session(session, expected).await?;
        info!(session_id = %session.id, "session closed");
        Ok(session)
    }

    /// Delete an owner's document together with its fragments. Documents
    /// belonging to someone else are reported as not found.
    pub async fn delete_document(&self, owner_id: Uuid, document_id: Uuid) -> Result<()> {
        let document = self.repository.document(document_id).await?;
        if document.owner_id != owner_id {
            return Err(EngineError::NotFound {
                entity: "document",
                id: document_id.to_string(),
            });
        }
        self.repository.delete_document(document_id).await?;
        info!(%document_id, %owner_id, "document deleted");
        Ok(())
    }

    /// Evaluate the pending candidate answer (the session's last turn) and
    /// append the interviewer's evaluation turn.
    async fn evaluate_pending(&self, mut session: Session) -> Result<Evaluation> {
        debug_assert!(matches!(session.state, SessionState::Evaluating));

        // Never fabricate a question: evaluation without a preceding
        // interviewer turn is a hard invalid transition.
        let question = session
            .last_interviewer_turn()
            .map(|t| t.content.clone())
            .ok_or_else(|| EngineError::InvalidTransition {
                session_id: session.id.to_string(),
                state: session.state.to_string(),
                action: SessionAction::SubmitAnswer.to_string(),
                reason: "no interviewer question exists to evaluate against".to_string(),
            })?;
        let answer = session
            .last_turn()
            .map(|t| t.content.clone())
            .unwrap_or_default();

        let outcome = self.run_evaluation(&session, &question, &answer).await;

        match outcome {
            Ok(evaluation) => {
                let expected = session.version;
                session.turns.push(Turn::evaluation(
                    evaluation.next_question.clone(),
                    evaluation.score,
                    evaluation.feedback.clone(),
                    evaluation.citation_indices.clone(),
                ));
                session.state =
                    transition(session.id, session.state, SessionAction::CompleteEvaluation)?;
                self.repository.update_session(session, expected).await?;
                Ok(evaluation)
            }
            Err(err) => {
                // Keep the candidate turn, step back to AwaitingAnswer so a
                // retry can re-enter. The error still reaches the caller.
                warn!(session_id = %session.id, %err, "evaluation failed, session re-enterable");
                let expected = session.version;
                session.state =
                    transition(session.id, session.state, SessionAction::FailEvaluation)?;
                self.repository.update_session(session, expected).await?;
                Err(err)
            }
        }
    }

    async fn run_evaluation(
        &self,
        session: &Session,
        question: &str,
        answer: &str,
    ) -> Result<Evaluation> {
        let resume = self
            .repository
            .latest_document(session.owner_id, DocumentKind::Resume)
            .await?;
        let jd = self
            .repository
            .latest_document(session.owner_id, DocumentKind::JobDescription)
            .await?;
        if resume.is_none() || jd.is_none() {
            warn!(
                session_id = %session.id,
                has_resume = resume.is_some(),
                has_jd = jd.is_some(),
                "grounding document missing, degrading to placeholder context"
            );
        }

        let grounded = self
            .assembler
            .assemble(resume.as_ref(), jd.as_ref(), answer)
            .await?;

        let prompt = PromptMaterial {
            session_id: session.id,
            system: evaluation_system_prompt(
                question,
                answer,
                &grounded.resume_context,
                &grounded.jd_context,
            ),
            user: EVALUATE_USER_PROMPT.to_string(),
        };
        self.generation.generate_evaluation(&prompt).await
    }

    /// Single-writer-per-session: the loser of a concurrent acquisition
    /// fails with a conflict instead of queueing behind the winner.
    fn try_lock_session(&self, session_id: Uuid) -> Result<SessionGuard> {
        let lock = {
            let mut locks = self.locks.lock().expect("session lock table poisoned");
            Arc::clone(locks.entry(session_id).or_default())
        };
        let inner = lock
            .try_lock_owned()
            .map_err(|_| EngineError::SessionConflict {
                session_id: session_id.to_string(),
            })?;
        Ok(SessionGuard {
            session_id,
            table: Arc::clone(&self.locks),
            inner: Some(inner),
        })
    }

    #[cfg(test)]
    fn lock_table_len(&self) -> usize {
        self.locks.lock().expect("session lock table poisoned").len()
    }

    /// Resolve a citation index to the document kind it denotes
    pub fn resolve_citation(index: u8) -> Option<DocumentKind> {
        DocumentKind::from_source_index(index)
    }
}

fn evaluation_system_prompt(
    question: &str,
    answer: &str,
    resume_context: &str,
    jd_context: &str,
) -> String {
    format!(
        "You are a professional HR evaluator.\n\
         1. Evaluate the candidate's 'Response' to the 'Question' below.\n\
         2. Use the 'RESUME CONTEXT' and 'JD CONTEXT' for grounding your feedback.\n\
         3. Provide a score (1-10) and concise feedback (100 words max).\n\
         4. In citationIndices, identify the context most relevant to the response or \
         feedback: 0 for resume, 1 for job description.\n\
         5. The nextQuestion must be a relevant follow-up interview question.\n\n\
         Question: {question}\n\
         Response: {answer}\n\
         ---\n\
         RESUME CONTEXT (Index 0): {resume_context}\n\
         JD CONTEXT (Index 1): {jd_context}"
    )
}

/// Keep lines that look like numbered list entries ("1. ...", "2) ..." is
/// not accepted; the service is asked for dot-numbered output).
fn parse_numbered_questions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| {
            let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
            digits > 0 && line[digits..].starts_with('.')
        })
        .map(str::to_string)
        .collect()
}
