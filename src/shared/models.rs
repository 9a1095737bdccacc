//! Domain models for tickets and their reply threads.
//!
//! Tickets hold only opaque ids for categories, tags and users; those
//! entities live behind the directory collaborator and are never embedded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::enums::{ReplyType, TicketPriority, TicketStatus};

pub const MAX_TITLE_LEN: usize = 255;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category_id: Uuid,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub is_urgent: bool,
    /// Immutable after creation.
    pub author_id: Uuid,
    pub assigned_to: Option<Uuid>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub last_reply_at: Option<DateTime<Utc>>,
    /// Live count of replies referencing this ticket. Never negative.
    pub reply_count: i64,
    /// Set semantics; order is irrelevant.
    pub tag_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub reply_type: ReplyType,
    /// At most one reply per ticket carries this flag.
    pub is_solution: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Read-only attachment projection supplied by the attachment collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentMeta {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// Full read shape of a single ticket: the record, its thread ordered by
/// creation time ascending, and attachment metadata.
#[derive(Debug, Clone, Serialize)]
pub struct TicketThread {
    pub ticket: Ticket,
    pub replies: Vec<Reply>,
    pub attachments: Vec<AttachmentMeta>,
}

/// One page of a filtered ticket listing.
#[derive(Debug, Clone, Serialize)]
pub struct TicketPage {
    pub items: Vec<Ticket>,
    pub total: usize,
    pub total_pages: usize,
}
