use tokio::sync::mpsc;

use crate::core::message::Message;
use crate::core::status::LifecycleStatus;

/// Change notifications emitted in the order they are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationEvent {
    StatusChanged(LifecycleStatus),
    MessageAppended(Message),
}

/// Transcript plus lifecycle status for one session.
///
/// Readers get shared access through the accessors; only the request
/// controller can append messages or move the status.
#[derive(Debug, Default)]
pub struct ConversationState {
    messages: Vec<Message>,
    status: LifecycleStatus,
    observers: Vec<mpsc::UnboundedSender<ConversationEvent>>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn status(&self) -> LifecycleStatus {
        self.status
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub(crate) fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ConversationEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.observers.push(tx);
        rx
    }

    pub(crate) fn set_status(&mut self, status: LifecycleStatus) {
        self.status = status;
        self.notify(ConversationEvent::StatusChanged(status));
    }

    pub(crate) fn append(&mut self, message: Message) {
        self.messages.push(message.clone());
        self.notify(ConversationEvent::MessageAppended(message));
    }

    fn notify(&mut self, event: ConversationEvent) {
        // Receivers that went away are dropped on the next send.
        self.observers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
