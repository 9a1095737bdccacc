//! Ticket lifecycle: creation, listing, reads and updates, plus reply
//! creation (which owns the reply_count / last_reply_at side effects).

use uuid::Uuid;

use crate::auth::AuthContext;
use crate::notifications::{self, NotificationEvent};
use crate::shared::enums::{TicketStatus, UserRole};
use crate::shared::errors::ApiError;
use crate::shared::models::{Reply, Ticket, TicketPage, TicketThread, MAX_TITLE_LEN};
use crate::shared::state::AppState;
use crate::store::{TicketFilter, TicketPatch};
use crate::tickets::permissions;
use crate::tickets::{CreateReplyRequest, CreateTicketRequest, ListQuery, UpdateTicketRequest};

pub const DEFAULT_PAGE_LIMIT: usize = 10;
pub const MAX_PAGE_LIMIT: usize = 100;

fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::validation("title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::validation(format!(
            "title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(())
}

/// Creates a ticket for the calling actor. Category and tag references are
/// resolved against the directory before anything is written; a dangling
/// reference fails the whole call with no partial write.
pub async fn create(
    state: &AppState,
    req: CreateTicketRequest,
    actor: AuthContext,
) -> Result<Ticket, ApiError> {
    validate_title(&req.title)?;

    if !state.directory.category_exists(req.category_id).await? {
        return Err(ApiError::validation("category not found"));
    }

    let mut tag_ids: Vec<Uuid> = req.tag_ids.unwrap_or_default();
    tag_ids.sort_unstable();
    tag_ids.dedup();
    if !tag_ids.is_empty() {
        let resolved = state.directory.resolve_tags(&tag_ids).await?;
        if resolved.len() != tag_ids.len() {
            return Err(ApiError::validation("one or more tags not found"));
        }
    }

    let now = state.clock.now();
    let ticket = Ticket {
        id: Uuid::new_v4(),
        title: req.title,
        description: req.description,
        category_id: req.category_id,
        priority: req.priority.unwrap_or_default(),
        status: TicketStatus::default(),
        is_urgent: req.is_urgent.unwrap_or(false),
        author_id: actor.actor_id,
        assigned_to: None,
        assigned_at: None,
        resolved_at: None,
        closed_at: None,
        last_reply_at: None,
        reply_count: 0,
        tag_ids,
        created_at: now,
        updated_at: now,
    };

    let ticket = state.store.insert_ticket(ticket).await?;
    log::info!("ticket {} created by {}", ticket.id, actor.actor_id);
    Ok(ticket)
}

/// Filtered, paginated listing, newest first. Requesters only ever see
/// their own tickets: their author filter is forced and cannot be
/// overridden by query input.
pub async fn list(
    state: &AppState,
    query: ListQuery,
    actor: AuthContext,
) -> Result<TicketPage, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    if limit == 0 || limit > MAX_PAGE_LIMIT {
        return Err(ApiError::validation(format!(
            "limit must be between 1 and {}",
            MAX_PAGE_LIMIT
        )));
    }

    let assigned_to = match query.assigned_to.as_deref() {
        None => None,
        Some("me") => Some(actor.actor_id),
        Some(raw) => Some(
            Uuid::parse_str(raw)
                .map_err(|_| ApiError::validation("malformed assigned_to filter"))?,
        ),
    };

    let author_id = match actor.role {
        // Requesters are pinned to their own tickets.
        UserRole::Requester => Some(actor.actor_id),
        _ => query.author,
    };

    let filter = TicketFilter {
        status: query.status,
        category_id: query.category_id,
        priority: query.priority,
        assigned_to,
        author_id,
        search: query.search,
    };

    // Saturates so an absurd page yields an empty page, never a panic.
    let skip = page.saturating_sub(1).saturating_mul(limit);
    let (items, total) = state.store.find_tickets(&filter, skip, limit).await?;
    Ok(TicketPage {
        items,
        total,
        total_pages: total.div_ceil(limit),
    })
}

/// Loads a ticket with its full thread (creation order) and attachment
/// metadata. Internal notes are part of the thread for every viewer.
pub async fn get(state: &AppState, id: Uuid, actor: AuthContext) -> Result<TicketThread, ApiError> {
    let ticket = state
        .store
        .find_ticket(id)
        .await?
        .ok_or_else(|| ApiError::not_found("ticket not found"))?;

    let caps = permissions::evaluate(actor.role, actor.actor_id, &ticket);
    if !caps.can_view {
        return Err(ApiError::forbidden("you cannot view this ticket"));
    }

    let replies = state.store.replies_for_ticket(ticket.id).await?;
    let attachments = state.attachments.list_for_ticket(ticket.id).await?;
    Ok(TicketThread {
        ticket,
        replies,
        attachments,
    })
}

/// Applies a field patch. A patch that moves the status to resolved or
/// closed stamps the matching timestamp; every other supplied field is
/// applied verbatim. No transition graph is enforced.
pub async fn update(
    state: &AppState,
    id: Uuid,
    req: UpdateTicketRequest,
    actor: AuthContext,
) -> Result<Ticket, ApiError> {
    let ticket = state
        .store
        .find_ticket(id)
        .await?
        .ok_or_else(|| ApiError::not_found("ticket not found"))?;

    let caps = permissions::evaluate(actor.role, actor.actor_id, &ticket);
    if !caps.can_edit {
        return Err(ApiError::forbidden("you cannot edit this ticket"));
    }

    if let Some(title) = &req.title {
        validate_title(title)?;
    }

    let now = state.clock.now();
    let patch = TicketPatch {
        title: req.title,
        description: req.description,
        category_id: req.category_id,
        priority: req.priority,
        status: req.status,
        is_urgent: req.is_urgent,
        tag_ids: req.tag_ids,
        resolved_at: match req.status {
            Some(TicketStatus::Resolved) => Some(now),
            _ => None,
        },
        closed_at: match req.status {
            Some(TicketStatus::Closed) => Some(now),
            _ => None,
        },
        updated_at: now,
    };

    state
        .store
        .update_ticket(id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("ticket not found"))
}

/// Appends a reply to the thread. Any authenticated actor may reply; the
/// store bumps reply_count and last_reply_at in the same mutation. The
/// solution flag is never granted here, only via the solution endpoint.
pub async fn add_reply(
    state: &AppState,
    ticket_id: Uuid,
    req: CreateReplyRequest,
    actor: AuthContext,
) -> Result<Reply, ApiError> {
    if req.content.trim().is_empty() {
        return Err(ApiError::validation("content is required"));
    }
    if req.is_solution.unwrap_or(false) {
        // Creation never grants the flag; the solution endpoint is the
        // only writer, which keeps the one-solution invariant in one place.
        log::debug!("ignoring is_solution on reply creation for ticket {}", ticket_id);
    }

    let ticket = state
        .store
        .find_ticket(ticket_id)
        .await?
        .ok_or_else(|| ApiError::not_found("ticket not found"))?;

    let now = state.clock.now();
    let reply = Reply {
        id: Uuid::new_v4(),
        ticket_id: ticket.id,
        author_id: actor.actor_id,
        content: req.content,
        reply_type: req.reply_type.unwrap_or_default(),
        is_solution: false,
        created_at: now,
        updated_at: now,
    };

    let reply = state.store.insert_reply(reply).await?;

    if ticket.author_id != actor.actor_id {
        notifications::emit(
            state,
            ticket.author_id,
            NotificationEvent::ReplyAdded,
            ticket.title.clone(),
            "a new reply was added to your ticket",
            ticket.id,
            actor.actor_id,
            ticket.is_urgent,
        );
    }

    Ok(reply)
}
