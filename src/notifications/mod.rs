//! Best-effort notification fan-out.
//!
//! Mutations publish onto a broadcast channel; delivery (websocket, mail,
//! whatever subscribes) is someone else's problem. A full channel, a
//! missing sender or zero receivers never affects the mutation that
//! triggered the event.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationEvent {
    TicketAssigned,
    ReplyAdded,
    SolutionMarked,
}

impl std::fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TicketAssigned => write!(f, "ticket_assigned"),
            Self::ReplyAdded => write!(f, "reply_added"),
            Self::SolutionMarked => write!(f, "solution_marked"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketNotification {
    pub recipient_id: Uuid,
    pub event: NotificationEvent,
    pub title: String,
    pub message: String,
    pub ticket_id: Uuid,
    pub sender_id: Uuid,
    pub urgent: bool,
    pub timestamp: String,
}

/// Publishes a notification if a broadcast channel is wired up.
/// At-most-once, non-blocking; errors are swallowed on purpose.
pub fn emit(
    state: &AppState,
    recipient_id: Uuid,
    event: NotificationEvent,
    title: impl Into<String>,
    message: impl Into<String>,
    ticket_id: Uuid,
    sender_id: Uuid,
    urgent: bool,
) {
    if let Some(tx) = state.ticket_broadcast.as_ref() {
        let notification = TicketNotification {
            recipient_id,
            event,
            title: title.into(),
            message: message.into(),
            ticket_id,
            sender_id,
            urgent,
            timestamp: state.clock.now().to_rfc3339(),
        };
        // send() only fails when nobody is listening; that is fine.
        tx.send(notification).ok();
    }
}
