//! Read-only attachment metadata collaborator.
//!
//! Attachment storage is out of scope; the ticket read path only projects
//! metadata supplied by this port.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::shared::models::AttachmentMeta;

#[async_trait]
pub trait AttachmentStore: Send + Sync {
    async fn list_for_ticket(&self, ticket_id: Uuid) -> anyhow::Result<Vec<AttachmentMeta>>;
}

#[derive(Default)]
pub struct MemoryAttachmentStore {
    by_ticket: RwLock<HashMap<Uuid, Vec<AttachmentMeta>>>,
}

impl MemoryAttachmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, meta: AttachmentMeta) {
        self.by_ticket
            .write()
            .expect("attachment lock")
            .entry(meta.ticket_id)
            .or_default()
            .push(meta);
    }
}

#[async_trait]
impl AttachmentStore for MemoryAttachmentStore {
    async fn list_for_ticket(&self, ticket_id: Uuid) -> anyhow::Result<Vec<AttachmentMeta>> {
        Ok(self
            .by_ticket
            .read()
            .expect("attachment lock")
            .get(&ticket_id)
            .cloned()
            .unwrap_or_default())
    }
}
