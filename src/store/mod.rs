//! Persistence port for tickets and replies.
//!
//! Every public workflow operation maps to exactly one logical mutation
//! here. Mutations that touch more than one field or record (claiming a
//! ticket, inserting a reply and bumping its ticket's counters, swapping
//! the solution flag) are single trait methods so an adapter can make
//! them atomic with whatever primitive its backend offers.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::shared::enums::{TicketPriority, TicketStatus};
use crate::shared::models::{Reply, Ticket};

/// Filter for ticket listings. All criteria are conjunctive.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub category_id: Option<Uuid>,
    pub priority: Option<TicketPriority>,
    pub assigned_to: Option<Uuid>,
    pub author_id: Option<Uuid>,
    /// Case-insensitive substring over title OR description.
    pub search: Option<String>,
}

/// Field-wise ticket patch. `None` leaves the field untouched; timestamp
/// side effects are computed by the caller and carried explicitly.
#[derive(Debug, Clone, Default)]
pub struct TicketPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub priority: Option<TicketPriority>,
    pub status: Option<TicketStatus>,
    pub is_urgent: Option<bool>,
    pub tag_ids: Option<Vec<Uuid>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Result of the conditional self-pickup update.
#[derive(Debug, Clone)]
pub enum ClaimOutcome {
    /// The compare-and-set committed; the actor now owns the ticket.
    Claimed(Ticket),
    /// `assigned_to` was no longer null at commit time.
    AlreadyAssigned,
    NotFound,
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    // Ticket records
    async fn find_ticket(&self, id: Uuid) -> anyhow::Result<Option<Ticket>>;
    /// Filtered listing, newest-created first. Returns the requested slice
    /// plus the total count of filter-matching tickets.
    async fn find_tickets(
        &self,
        filter: &TicketFilter,
        skip: usize,
        limit: usize,
    ) -> anyhow::Result<(Vec<Ticket>, usize)>;
    async fn insert_ticket(&self, ticket: Ticket) -> anyhow::Result<Ticket>;
    async fn update_ticket(&self, id: Uuid, patch: TicketPatch) -> anyhow::Result<Option<Ticket>>;
    /// Directed assignment: unconditionally sets `assigned_to`/`assigned_at`.
    async fn assign_ticket(
        &self,
        id: Uuid,
        assignee: Uuid,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<Ticket>>;
    /// Atomic conditional update: set `assigned_to = assignee` only while
    /// `assigned_to` is still null. The check and the write must not be
    /// separable; under N concurrent claims exactly one may succeed.
    async fn claim_ticket(
        &self,
        id: Uuid,
        assignee: Uuid,
        now: DateTime<Utc>,
    ) -> anyhow::Result<ClaimOutcome>;

    // Reply records
    async fn find_reply(&self, id: Uuid) -> anyhow::Result<Option<Reply>>;
    /// Thread of a ticket, ordered by creation time ascending.
    async fn replies_for_ticket(&self, ticket_id: Uuid) -> anyhow::Result<Vec<Reply>>;
    /// Inserts the reply and, in the same mutation, increments the owning
    /// ticket's `reply_count` and sets its `last_reply_at` to the reply's
    /// creation time.
    async fn insert_reply(&self, reply: Reply) -> anyhow::Result<Reply>;
    async fn update_reply_content(
        &self,
        id: Uuid,
        content: String,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<Reply>>;
    /// Clears `is_solution` on every other reply of the ticket and sets it
    /// on the target, as one mutation serialized per ticket. A no-op when
    /// the target already is the solution. Returns the marked reply, or
    /// `None` when the reply does not belong to the ticket or is gone.
    async fn mark_solution(
        &self,
        ticket_id: Uuid,
        reply_id: Uuid,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<Reply>>;
    /// Deletes the reply and decrements the owning ticket's `reply_count`,
    /// never below zero. Returns false when the reply was already gone.
    async fn delete_reply(&self, id: Uuid, now: DateTime<Utc>) -> anyhow::Result<bool>;
}
