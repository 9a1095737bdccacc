//! In-memory `TicketStore` adapter.
//!
//! Both maps live behind one `tokio::sync::Mutex`, so every trait method
//! runs as a critical section: the conditional claim, the solution swap
//! and the reply-count bookkeeping are atomic by construction, and writers
//! are serialized. Readers clone out of the lock and never block writers
//! for longer than the copy.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::shared::models::{Reply, Ticket};
use crate::store::{ClaimOutcome, TicketFilter, TicketPatch, TicketStore};

#[derive(Default)]
struct StoreInner {
    tickets: HashMap<Uuid, Ticket>,
    replies: HashMap<Uuid, Reply>,
}

#[derive(Default)]
pub struct MemoryTicketStore {
    inner: Mutex<StoreInner>,
}

impl MemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(filter: &TicketFilter, ticket: &Ticket) -> bool {
    if let Some(status) = filter.status {
        if ticket.status != status {
            return false;
        }
    }
    if let Some(category_id) = filter.category_id {
        if ticket.category_id != category_id {
            return false;
        }
    }
    if let Some(priority) = filter.priority {
        if ticket.priority != priority {
            return false;
        }
    }
    if let Some(assigned_to) = filter.assigned_to {
        if ticket.assigned_to != Some(assigned_to) {
            return false;
        }
    }
    if let Some(author_id) = filter.author_id {
        if ticket.author_id != author_id {
            return false;
        }
    }
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        let in_title = ticket.title.to_lowercase().contains(&needle);
        let in_description = ticket.description.to_lowercase().contains(&needle);
        if !in_title && !in_description {
            return false;
        }
    }
    true
}

#[async_trait]
impl TicketStore for MemoryTicketStore {
    async fn find_ticket(&self, id: Uuid) -> anyhow::Result<Option<Ticket>> {
        let inner = self.inner.lock().await;
        Ok(inner.tickets.get(&id).cloned())
    }

    async fn find_tickets(
        &self,
        filter: &TicketFilter,
        skip: usize,
        limit: usize,
    ) -> anyhow::Result<(Vec<Ticket>, usize)> {
        let inner = self.inner.lock().await;
        let mut matching: Vec<Ticket> = inner
            .tickets
            .values()
            .filter(|t| matches(filter, t))
            .cloned()
            .collect();
        // Newest first; id as tie-breaker keeps the order stable.
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        let total = matching.len();
        let items = matching.into_iter().skip(skip).take(limit).collect();
        Ok((items, total))
    }

    async fn insert_ticket(&self, ticket: Ticket) -> anyhow::Result<Ticket> {
        let mut inner = self.inner.lock().await;
        inner.tickets.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    async fn update_ticket(&self, id: Uuid, patch: TicketPatch) -> anyhow::Result<Option<Ticket>> {
        let mut inner = self.inner.lock().await;
        let Some(ticket) = inner.tickets.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            ticket.title = title;
        }
        if let Some(description) = patch.description {
            ticket.description = description;
        }
        if let Some(category_id) = patch.category_id {
            ticket.category_id = category_id;
        }
        if let Some(priority) = patch.priority {
            ticket.priority = priority;
        }
        if let Some(status) = patch.status {
            ticket.status = status;
        }
        if let Some(is_urgent) = patch.is_urgent {
            ticket.is_urgent = is_urgent;
        }
        if let Some(tag_ids) = patch.tag_ids {
            ticket.tag_ids = tag_ids;
        }
        if let Some(resolved_at) = patch.resolved_at {
            ticket.resolved_at = Some(resolved_at);
        }
        if let Some(closed_at) = patch.closed_at {
            ticket.closed_at = Some(closed_at);
        }
        ticket.updated_at = patch.updated_at;
        Ok(Some(ticket.clone()))
    }

    async fn assign_ticket(
        &self,
        id: Uuid,
        assignee: Uuid,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<Ticket>> {
        let mut inner = self.inner.lock().await;
        let Some(ticket) = inner.tickets.get_mut(&id) else {
            return Ok(None);
        };
        ticket.assigned_to = Some(assignee);
        ticket.assigned_at = Some(now);
        ticket.updated_at = now;
        Ok(Some(ticket.clone()))
    }

    async fn claim_ticket(
        &self,
        id: Uuid,
        assignee: Uuid,
        now: DateTime<Utc>,
    ) -> anyhow::Result<ClaimOutcome> {
        let mut inner = self.inner.lock().await;
        let Some(ticket) = inner.tickets.get_mut(&id) else {
            return Ok(ClaimOutcome::NotFound);
        };
        // Compare-and-set: the check and the write happen under the same
        // lock acquisition, so concurrent claimants serialize here and
        // all but the first observe a non-null assignee.
        if ticket.assigned_to.is_some() {
            return Ok(ClaimOutcome::AlreadyAssigned);
        }
        ticket.assigned_to = Some(assignee);
        ticket.assigned_at = Some(now);
        ticket.updated_at = now;
        Ok(ClaimOutcome::Claimed(ticket.clone()))
    }

    async fn find_reply(&self, id: Uuid) -> anyhow::Result<Option<Reply>> {
        let inner = self.inner.lock().await;
        Ok(inner.replies.get(&id).cloned())
    }

    async fn replies_for_ticket(&self, ticket_id: Uuid) -> anyhow::Result<Vec<Reply>> {
        let inner = self.inner.lock().await;
        let mut thread: Vec<Reply> = inner
            .replies
            .values()
            .filter(|r| r.ticket_id == ticket_id)
            .cloned()
            .collect();
        thread.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(thread)
    }

    async fn insert_reply(&self, reply: Reply) -> anyhow::Result<Reply> {
        let mut inner = self.inner.lock().await;
        anyhow::ensure!(
            inner.tickets.contains_key(&reply.ticket_id),
            "reply references missing ticket {}",
            reply.ticket_id
        );
        inner.replies.insert(reply.id, reply.clone());
        if let Some(ticket) = inner.tickets.get_mut(&reply.ticket_id) {
            ticket.reply_count += 1;
            ticket.last_reply_at = Some(reply.created_at);
            ticket.updated_at = reply.created_at;
        }
        Ok(reply)
    }

    async fn update_reply_content(
        &self,
        id: Uuid,
        content: String,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<Reply>> {
        let mut inner = self.inner.lock().await;
        let Some(reply) = inner.replies.get_mut(&id) else {
            return Ok(None);
        };
        reply.content = content;
        reply.updated_at = now;
        Ok(Some(reply.clone()))
    }

    async fn mark_solution(
        &self,
        ticket_id: Uuid,
        reply_id: Uuid,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<Reply>> {
        let mut inner = self.inner.lock().await;
        match inner.replies.get(&reply_id) {
            Some(r) if r.ticket_id == ticket_id => {}
            _ => return Ok(None),
        }
        // Re-marking the current solution must not change state.
        if inner.replies[&reply_id].is_solution {
            return Ok(inner.replies.get(&reply_id).cloned());
        }
        // Clear-then-set as one critical section: racing markers on the
        // same ticket serialize on the store lock, so the thread can never
        // end up with two solutions.
        for reply in inner.replies.values_mut() {
            if reply.ticket_id == ticket_id && reply.is_solution {
                reply.is_solution = false;
                reply.updated_at = now;
            }
        }
        let reply = inner
            .replies
            .get_mut(&reply_id)
            .expect("reply checked above");
        reply.is_solution = true;
        reply.updated_at = now;
        Ok(Some(reply.clone()))
    }

    async fn delete_reply(&self, id: Uuid, now: DateTime<Utc>) -> anyhow::Result<bool> {
        let mut inner = self.inner.lock().await;
        let Some(reply) = inner.replies.remove(&id) else {
            return Ok(false);
        };
        if let Some(ticket) = inner.tickets.get_mut(&reply.ticket_id) {
            ticket.reply_count = (ticket.reply_count - 1).max(0);
            ticket.updated_at = now;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::enums::{ReplyType, TicketPriority, TicketStatus};
    use std::sync::Arc;

    fn ticket(author: Uuid) -> Ticket {
        let now = Utc::now();
        Ticket {
            id: Uuid::new_v4(),
            title: "Printer jam".to_string(),
            description: "Paper stuck in tray 2".to_string(),
            category_id: Uuid::new_v4(),
            priority: TicketPriority::default(),
            status: TicketStatus::default(),
            is_urgent: false,
            author_id: author,
            assigned_to: None,
            assigned_at: None,
            resolved_at: None,
            closed_at: None,
            last_reply_at: None,
            reply_count: 0,
            tag_ids: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    fn reply(ticket_id: Uuid, author: Uuid) -> Reply {
        let now = Utc::now();
        Reply {
            id: Uuid::new_v4(),
            ticket_id,
            author_id: author,
            content: "checking now".to_string(),
            reply_type: ReplyType::Public,
            is_solution: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn claim_is_first_wins() {
        let store = Arc::new(MemoryTicketStore::new());
        let t = store.insert_ticket(ticket(Uuid::new_v4())).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            let id = t.id;
            handles.push(tokio::spawn(async move {
                store.claim_ticket(id, Uuid::new_v4(), Utc::now()).await
            }));
        }

        let mut claimed = 0;
        let mut lost = 0;
        for handle in handles {
            match handle.await.unwrap().unwrap() {
                ClaimOutcome::Claimed(_) => claimed += 1,
                ClaimOutcome::AlreadyAssigned => lost += 1,
                ClaimOutcome::NotFound => panic!("ticket exists"),
            }
        }
        assert_eq!(claimed, 1);
        assert_eq!(lost, 7);

        let final_state = store.find_ticket(t.id).await.unwrap().unwrap();
        assert!(final_state.assigned_to.is_some());
        assert!(final_state.assigned_at.is_some());
    }

    #[tokio::test]
    async fn solution_swap_leaves_exactly_one() {
        let store = MemoryTicketStore::new();
        let author = Uuid::new_v4();
        let t = store.insert_ticket(ticket(author)).await.unwrap();
        let r1 = store.insert_reply(reply(t.id, author)).await.unwrap();
        let r2 = store.insert_reply(reply(t.id, author)).await.unwrap();

        store
            .mark_solution(t.id, r1.id, Utc::now())
            .await
            .unwrap()
            .unwrap();
        store
            .mark_solution(t.id, r2.id, Utc::now())
            .await
            .unwrap()
            .unwrap();

        let thread = store.replies_for_ticket(t.id).await.unwrap();
        let solutions: Vec<_> = thread.iter().filter(|r| r.is_solution).collect();
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].id, r2.id);
    }

    #[tokio::test]
    async fn remark_is_idempotent() {
        let store = MemoryTicketStore::new();
        let author = Uuid::new_v4();
        let t = store.insert_ticket(ticket(author)).await.unwrap();
        let r = store.insert_reply(reply(t.id, author)).await.unwrap();

        let first = store
            .mark_solution(t.id, r.id, Utc::now())
            .await
            .unwrap()
            .unwrap();
        let second = store
            .mark_solution(t.id, r.id, Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert!(second.is_solution);
        assert_eq!(first.updated_at, second.updated_at);
    }

    #[tokio::test]
    async fn reply_count_tracks_inserts_and_deletes() {
        let store = MemoryTicketStore::new();
        let author = Uuid::new_v4();
        let t = store.insert_ticket(ticket(author)).await.unwrap();

        let r = store.insert_reply(reply(t.id, author)).await.unwrap();
        let after_insert = store.find_ticket(t.id).await.unwrap().unwrap();
        assert_eq!(after_insert.reply_count, 1);
        assert_eq!(after_insert.last_reply_at, Some(r.created_at));

        assert!(store.delete_reply(r.id, Utc::now()).await.unwrap());
        let after_delete = store.find_ticket(t.id).await.unwrap().unwrap();
        assert_eq!(after_delete.reply_count, 0);

        // Double delete neither errors nor drives the count negative.
        assert!(!store.delete_reply(r.id, Utc::now()).await.unwrap());
        let unchanged = store.find_ticket(t.id).await.unwrap().unwrap();
        assert_eq!(unchanged.reply_count, 0);
    }

    #[tokio::test]
    async fn listing_filters_and_paginates() {
        let store = MemoryTicketStore::new();
        let author = Uuid::new_v4();
        for i in 0..15 {
            let mut t = ticket(author);
            t.title = format!("Ticket {}", i);
            t.created_at = Utc::now() + chrono::Duration::seconds(i);
            store.insert_ticket(t).await.unwrap();
        }

        let filter = TicketFilter::default();
        let (page, total) = store.find_tickets(&filter, 0, 10).await.unwrap();
        assert_eq!(total, 15);
        assert_eq!(page.len(), 10);
        assert_eq!(page[0].title, "Ticket 14");

        let search = TicketFilter {
            search: Some("TICKET 3".to_string()),
            ..Default::default()
        };
        let (found, total) = store.find_tickets(&search, 0, 10).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(found[0].title, "Ticket 3");
    }
}
