//! Request lifecycle controller.
//!
//! Drives one submission at a time through
//! `idle -> formatted -> sending -> processing -> receiving -> idle`, appending
//! the user's message up front and exactly one assistant message when the
//! adapter call settles.

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::api::{AdapterError, GenerateRequest, GenerativeAdapter, PromptPart};
use crate::core::conversation::{ConversationEvent, ConversationState};
use crate::core::image::ImageAttachment;
use crate::core::message::Message;
use crate::core::status::LifecycleStatus;
use crate::utils::transcript::TranscriptLog;

/// Assistant text appended for every failed request, whatever the cause.
pub const FAILED_RESPONSE_TEXT: &str = "Error: Failed to get response.";

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub model: String,
    pub system_instruction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing to send: empty text and no image.
    Ignored,
    Replied,
    /// The error placeholder was appended; the cause is kept for the caller.
    Failed(AdapterError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// Another submission has not settled yet.
    Busy(LifecycleStatus),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Busy(status) => {
                write!(f, "A request is already in flight (status: {status})")
            }
        }
    }
}

impl std::error::Error for SubmitError {}

pub struct RequestController<A> {
    adapter: A,
    settings: ControllerSettings,
    state: ConversationState,
    transcript: TranscriptLog,
}

impl<A: GenerativeAdapter> RequestController<A> {
    pub fn new(adapter: A, settings: ControllerSettings) -> Self {
        Self {
            adapter,
            settings,
            state: ConversationState::new(),
            transcript: TranscriptLog::disabled(),
        }
    }

    pub fn with_transcript(mut self, transcript: TranscriptLog) -> Self {
        self.transcript = transcript;
        self
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn messages(&self) -> &[Message] {
        self.state.messages()
    }

    pub fn status(&self) -> LifecycleStatus {
        self.state.status()
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ConversationEvent> {
        self.state.subscribe()
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.settings.model = model.into();
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn transcript(&self) -> &TranscriptLog {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut TranscriptLog {
        &mut self.transcript
    }

    /// Submit user input and wait for the assistant's reply.
    ///
    /// `image` is a `data:` URL. The user message is appended before the
    /// first suspension point; exactly one assistant message follows once
    /// the adapter settles, and the status is back to idle on return.
    pub async fn submit(
        &mut self,
        text: &str,
        image: Option<String>,
    ) -> Result<SubmitOutcome, SubmitError> {
        if text.trim().is_empty() && image.is_none() {
            return Ok(SubmitOutcome::Ignored);
        }

        let status = self.state.status();
        if !status.is_idle() {
            return Err(SubmitError::Busy(status));
        }

        self.state.set_status(LifecycleStatus::Formatted);
        self.append(Message::user(text, image.clone()));

        self.state.set_status(LifecycleStatus::Sending);
        let result = match build_prompt(text, image.as_deref()) {
            Ok(parts) => {
                let request = GenerateRequest {
                    model: self.settings.model.clone(),
                    system_instruction: self.settings.system_instruction.clone(),
                    parts,
                };
                self.state.set_status(LifecycleStatus::Processing);
                self.adapter.generate(request).await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(response) => {
                self.state.set_status(LifecycleStatus::Receiving);
                self.append(Message::assistant(response.text));
                self.state.set_status(LifecycleStatus::Idle);
                Ok(SubmitOutcome::Replied)
            }
            Err(err) => {
                error!(model = %self.settings.model, error = %err, "failed to get response");
                self.append(Message::assistant(FAILED_RESPONSE_TEXT));
                self.state.set_status(LifecycleStatus::Idle);
                Ok(SubmitOutcome::Failed(err))
            }
        }
    }

    fn append(&mut self, message: Message) {
        if let Err(err) = self.transcript.log_message(&message) {
            warn!(error = %err, "failed to write transcript");
        }
        self.state.append(message);
    }
}

/// Prompt parts for one submission.
///
/// The image payload goes out without its `data:` prefix, tagged with the
/// MIME type it was encoded with. Blank text is only dropped when an image
/// carries the turn on its own.
pub fn build_prompt(text: &str, image: Option<&str>) -> Result<Vec<PromptPart>, AdapterError> {
    let mut parts = Vec::with_capacity(2);
    if !text.trim().is_empty() || image.is_none() {
        parts.push(PromptPart::Text(text.to_string()));
    }

    if let Some(url) = image {
        let attachment = ImageAttachment::from_data_url(url)
            .map_err(|err| AdapterError::InvalidImage(err.to_string()))?;
        debug!(mime_type = %attachment.mime_type, "attaching inline image");
        parts.push(attachment.into());
    }

    Ok(parts)
}
