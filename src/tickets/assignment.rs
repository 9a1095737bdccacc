//! Assignment coordination: staff-directed assignment and agent
//! self-pickup. Pickup is the one operation where racing actors are
//! expected; it is settled by the store's conditional update, never by a
//! read followed by a write.

use uuid::Uuid;

use crate::auth::AuthContext;
use crate::notifications::{self, NotificationEvent};
use crate::shared::errors::ApiError;
use crate::shared::models::Ticket;
use crate::shared::state::AppState;
use crate::store::ClaimOutcome;
use crate::tickets::permissions;

/// Directed assignment by staff or admin. The target only has to exist in
/// the directory; their role is not checked. Assignment never changes the
/// ticket's status.
pub async fn assign(
    state: &AppState,
    ticket_id: Uuid,
    assignee: Uuid,
    actor: AuthContext,
) -> Result<Ticket, ApiError> {
    let ticket = state
        .store
        .find_ticket(ticket_id)
        .await?
        .ok_or_else(|| ApiError::not_found("ticket not found"))?;

    let caps = permissions::evaluate(actor.role, actor.actor_id, &ticket);
    if !caps.can_assign {
        return Err(ApiError::forbidden("only staff can assign tickets"));
    }

    if !state.directory.user_exists(assignee).await? {
        return Err(ApiError::validation("assignee not found"));
    }

    let now = state.clock.now();
    let ticket = state
        .store
        .assign_ticket(ticket_id, assignee, now)
        .await?
        .ok_or_else(|| ApiError::not_found("ticket not found"))?;

    log::info!(
        "ticket {} assigned to {} by {}",
        ticket.id,
        assignee,
        actor.actor_id
    );
    notifications::emit(
        state,
        assignee,
        NotificationEvent::TicketAssigned,
        ticket.title.clone(),
        "a ticket was assigned to you",
        ticket.id,
        actor.actor_id,
        ticket.is_urgent,
    );
    Ok(ticket)
}

/// Staff self-pickup of an unowned ticket. Given N concurrent pickups on
/// the same ticket exactly one commits; the rest observe Conflict. The
/// status is left alone; assignment and status are separate concerns.
pub async fn pickup(
    state: &AppState,
    ticket_id: Uuid,
    actor: AuthContext,
) -> Result<Ticket, ApiError> {
    state
        .store
        .find_ticket(ticket_id)
        .await?
        .ok_or_else(|| ApiError::not_found("ticket not found"))?;

    if !permissions::may_attempt_pickup(actor.role) {
        return Err(ApiError::forbidden("only staff can pick up tickets"));
    }

    let now = state.clock.now();
    match state.store.claim_ticket(ticket_id, actor.actor_id, now).await? {
        ClaimOutcome::Claimed(ticket) => {
            log::info!("ticket {} picked up by {}", ticket.id, actor.actor_id);
            notifications::emit(
                state,
                actor.actor_id,
                NotificationEvent::TicketAssigned,
                ticket.title.clone(),
                "you picked up a ticket",
                ticket.id,
                actor.actor_id,
                ticket.is_urgent,
            );
            Ok(ticket)
        }
        ClaimOutcome::AlreadyAssigned => Err(ApiError::conflict("already assigned")),
        ClaimOutcome::NotFound => Err(ApiError::not_found("ticket not found")),
    }
}
