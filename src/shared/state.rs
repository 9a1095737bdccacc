use std::sync::Arc;
use tokio::sync::broadcast;

use crate::attachments::{AttachmentStore, MemoryAttachmentStore};
use crate::config::AppConfig;
use crate::directory::{Directory, MemoryDirectory};
use crate::notifications::TicketNotification;
use crate::shared::clock::{Clock, SystemClock};
use crate::store::memory::MemoryTicketStore;
use crate::store::TicketStore;

/// Shared application state handed to every handler.
///
/// Collaborators sit behind trait objects so the workflow core never
/// depends on how reference entities, attachments or ticket records are
/// actually persisted.
pub struct AppState {
    pub config: Option<AppConfig>,
    pub store: Arc<dyn TicketStore>,
    pub directory: Arc<dyn Directory>,
    pub attachments: Arc<dyn AttachmentStore>,
    pub clock: Arc<dyn Clock>,
    /// Best-effort notification fan-out. `None` disables emission; a send
    /// failure never affects the triggering mutation.
    pub ticket_broadcast: Option<broadcast::Sender<TicketNotification>>,
}

impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            store: Arc::clone(&self.store),
            directory: Arc::clone(&self.directory),
            attachments: Arc::clone(&self.attachments),
            clock: Arc::clone(&self.clock),
            ticket_broadcast: self.ticket_broadcast.clone(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("store", &"Arc<dyn TicketStore>")
            .field("directory", &"Arc<dyn Directory>")
            .field("attachments", &"Arc<dyn AttachmentStore>")
            .field("clock", &"Arc<dyn Clock>")
            .field("ticket_broadcast", &self.ticket_broadcast.is_some())
            .finish()
    }
}

impl Default for AppState {
    /// Memory-backed state. This default is only for tests and local
    /// development; production wiring happens in `main`.
    fn default() -> Self {
        let (tx, _) = broadcast::channel(100);
        Self {
            config: None,
            store: Arc::new(MemoryTicketStore::new()),
            directory: Arc::new(MemoryDirectory::new()),
            attachments: Arc::new(MemoryAttachmentStore::new()),
            clock: Arc::new(SystemClock),
            ticket_broadcast: Some(tx),
        }
    }
}

impl AppState {
    /// State with a caller-supplied clock; used by tests that assert on
    /// status timestamps.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            ..Self::default()
        }
    }
}
