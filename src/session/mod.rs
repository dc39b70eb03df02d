//! Conversation session
//!
//! A [`Session`] owns the message log, the pending attachments, the draft
//! input buffer and the awaiting flag. Submissions are processed in four
//! steps: the user message is appended before any network activity, the
//! model gateway is called (once per attachment, concurrently), exactly one
//! result message is appended, and the session returns to idle.
//!
//! The session is shared by reference. Its state lives behind a
//! `std::sync::Mutex` that is never held across an await, and a second
//! `submit` while one is in flight is ignored.

pub mod message;

pub use message::{Message, MessageId, MessageLog, Role};

use crate::attachments::{Attachment, AttachmentId, AttachmentStore, IncomingFile};
use crate::config::Config;
use crate::error::ScholiaError;
use crate::gateway::ModelGateway;
use crate::prompts::{build_prompt, Module};
use futures::future::join_all;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Ready to accept a submission
    Idle,
    /// A submission is in flight
    Submitting,
}

/// Why a submission was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Blank text and no attachments
    Empty,
    /// Another submission is still in flight
    Busy,
}

/// Result of a call to [`Session::submit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing happened; the log is unchanged
    Ignored(IgnoreReason),
    /// The model answered; carries the assistant message id
    Answered(MessageId),
    /// The request failed; carries the system-error message id
    Failed(MessageId),
}

impl SubmitOutcome {
    /// Returns true when the submission was accepted (answered or failed)
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Ignored(_))
    }
}

#[derive(Debug, Default)]
struct SessionState {
    log: MessageLog,
    attachments: AttachmentStore,
    awaiting_response: bool,
    draft: String,
}

/// Resets the awaiting flag and clears the submitted input when dropped
///
/// Only the attachments that went out with the submission are removed;
/// images picked while the request was in flight stay pending.
struct SubmissionGuard<'a> {
    session: &'a Session,
    submitted: Vec<AttachmentId>,
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.session.lock();
        state.awaiting_response = false;
        for id in &self.submitted {
            state.attachments.remove(*id);
        }
        state.draft.clear();
    }
}

/// One conversation with the assistant
pub struct Session {
    module: Module,
    gateway: Arc<ModelGateway>,
    state: Mutex<SessionState>,
}

impl Session {
    /// Create a session showing the module's built-in greeting
    pub fn new(module: Module, gateway: Arc<ModelGateway>) -> Self {
        Self::with_greeting(module, gateway, module.greeting().map(str::to_string))
    }

    /// Create a session with an explicit greeting
    ///
    /// `None` or an empty string starts with an empty log.
    pub fn with_greeting(
        module: Module,
        gateway: Arc<ModelGateway>,
        greeting: Option<String>,
    ) -> Self {
        let mut state = SessionState::default();
        if let Some(greeting) = greeting.filter(|g| !g.is_empty()) {
            state.log.append(Role::Assistant, greeting, Vec::new());
        }

        Self {
            module,
            gateway,
            state: Mutex::new(state),
        }
    }

    /// Create a session from loaded configuration
    ///
    /// `session.greeting` replaces the built-in greeting of modules that have
    /// one; an empty value disables it.
    pub fn from_config(module: Module, config: &Config) -> Self {
        let gateway = Arc::new(ModelGateway::new(config.provider.clone()));
        let greeting = module.greeting().map(|builtin| {
            config
                .session
                .greeting
                .clone()
                .unwrap_or_else(|| builtin.to_string())
        });
        Self::with_greeting(module, gateway, greeting)
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn module(&self) -> Module {
        self.module
    }

    /// Submit text and attachments to the model
    ///
    /// Never fails: rejected input yields [`SubmitOutcome::Ignored`] and
    /// provider failures become a single system-error message.
    pub async fn submit(
        &self,
        text: impl Into<String>,
        attachments: Vec<Attachment>,
    ) -> SubmitOutcome {
        let text = text.into();

        {
            let mut state = self.lock();
            if state.awaiting_response {
                tracing::warn!("Ignoring submission while a response is pending");
                return SubmitOutcome::Ignored(IgnoreReason::Busy);
            }
            if text.trim().is_empty() && attachments.is_empty() {
                tracing::debug!("Ignoring empty submission");
                return SubmitOutcome::Ignored(IgnoreReason::Empty);
            }

            let id = state.log.append(Role::User, text.clone(), attachments.clone());
            state.awaiting_response = true;
            tracing::info!(
                "Submitting message {} to {} ({} attachments)",
                id,
                self.module,
                attachments.len()
            );
        }

        let guard = SubmissionGuard {
            session: self,
            submitted: attachments.iter().map(Attachment::id).collect(),
        };
        let prompt = build_prompt(&text, !attachments.is_empty());
        let result = self.dispatch(&prompt, &attachments).await;

        let outcome = {
            let mut state = self.lock();
            match result {
                Ok(reply) => {
                    SubmitOutcome::Answered(state.log.append(Role::Assistant, reply, Vec::new()))
                }
                Err(e) => {
                    tracing::error!("Send message error: {}", e);
                    let notice = if e.is_configuration() {
                        self.module.init_failure_text()
                    } else {
                        self.module.failure_text()
                    };
                    SubmitOutcome::Failed(state.log.append(Role::SystemError, notice, Vec::new()))
                }
            }
        };

        drop(guard);
        outcome
    }

    /// Submit text with no attachments
    pub async fn submit_text(&self, text: impl Into<String>) -> SubmitOutcome {
        self.submit(text, Vec::new()).await
    }

    /// Submit the current draft together with the pending attachments
    pub async fn submit_draft(&self) -> SubmitOutcome {
        let (text, attachments) = {
            let state = self.lock();
            (state.draft.clone(), state.attachments.pending().to_vec())
        };
        self.submit(text, attachments).await
    }

    /// One gateway call per attachment, joined in input order
    async fn dispatch(
        &self,
        prompt: &str,
        attachments: &[Attachment],
    ) -> Result<String, ScholiaError> {
        if attachments.is_empty() {
            return self.gateway.generate(prompt, &[]).await;
        }

        let calls = attachments
            .iter()
            .map(|attachment| self.gateway.generate(prompt, std::slice::from_ref(attachment)));
        let texts = join_all(calls)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        Ok(texts.join("\n\n"))
    }

    pub fn draft(&self) -> String {
        self.lock().draft.clone()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.lock().draft = text.into();
    }

    /// Add an attachment to the pending set
    ///
    /// # Errors
    ///
    /// Returns `ScholiaError::InvalidAttachmentKind` for non-image files.
    pub fn add_attachment(&self, file: IncomingFile) -> Result<Attachment, ScholiaError> {
        self.lock().attachments.add(file)
    }

    /// Read a file from disk and add it to the pending set
    ///
    /// # Errors
    ///
    /// Returns `ScholiaError::Io` if the file cannot be read and
    /// `ScholiaError::InvalidAttachmentKind` if it is not an image.
    pub async fn add_attachment_path(&self, path: &Path) -> Result<Attachment, ScholiaError> {
        let file = IncomingFile::from_path(path).await?;
        self.add_attachment(file)
    }

    pub fn remove_attachment(&self, id: AttachmentId) -> bool {
        self.lock().attachments.remove(id)
    }

    pub fn clear_attachments(&self) {
        self.lock().attachments.clear();
    }

    pub fn pending_attachments(&self) -> Vec<Attachment> {
        self.lock().attachments.pending().to_vec()
    }

    /// Snapshot of the message log
    pub fn messages(&self) -> Vec<Message> {
        self.lock().log.as_slice().to_vec()
    }

    pub fn last_message(&self) -> Option<Message> {
        self.lock().log.last().cloned()
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.lock().awaiting_response
    }

    pub fn state(&self) -> SessionStatus {
        if self.is_awaiting_response() {
            SessionStatus::Submitting
        } else {
            SessionStatus::Idle
        }
    }
}
