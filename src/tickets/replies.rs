//! Reply thread management: author-only edits and deletion, and the
//! single-solution-per-ticket marking.

use uuid::Uuid;

use crate::auth::AuthContext;
use crate::notifications::{self, NotificationEvent};
use crate::shared::errors::ApiError;
use crate::shared::models::Reply;
use crate::shared::state::AppState;
use crate::tickets::permissions;
use crate::tickets::UpdateReplyRequest;

/// Edits a reply's content. Only the reply's author may do this.
pub async fn update(
    state: &AppState,
    reply_id: Uuid,
    req: UpdateReplyRequest,
    actor: AuthContext,
) -> Result<Reply, ApiError> {
    let reply = state
        .store
        .find_reply(reply_id)
        .await?
        .ok_or_else(|| ApiError::not_found("reply not found"))?;

    if reply.author_id != actor.actor_id {
        return Err(ApiError::forbidden("only the reply author can edit it"));
    }

    let Some(content) = req.content else {
        // Nothing to change.
        return Ok(reply);
    };
    if content.trim().is_empty() {
        return Err(ApiError::validation("content is required"));
    }

    state
        .store
        .update_reply_content(reply_id, content, state.clock.now())
        .await?
        .ok_or_else(|| ApiError::not_found("reply not found"))
}

/// Marks a reply as the accepted solution of its ticket. Only the ticket's
/// author may do this. The clear-everyone-else-then-set sequence is a
/// single store mutation, so two racing calls on the same ticket can never
/// leave two solutions behind. Re-marking the current solution is a no-op.
pub async fn mark_solution(
    state: &AppState,
    reply_id: Uuid,
    actor: AuthContext,
) -> Result<Reply, ApiError> {
    let reply = state
        .store
        .find_reply(reply_id)
        .await?
        .ok_or_else(|| ApiError::not_found("reply not found"))?;

    let ticket = state
        .store
        .find_ticket(reply.ticket_id)
        .await?
        .ok_or_else(|| ApiError::not_found("ticket not found"))?;

    let caps = permissions::evaluate(actor.role, actor.actor_id, &ticket);
    if !caps.can_mark_solution {
        return Err(ApiError::forbidden(
            "only the ticket author can mark replies as solution",
        ));
    }

    let marked = state
        .store
        .mark_solution(ticket.id, reply.id, state.clock.now())
        .await?
        .ok_or_else(|| ApiError::not_found("reply not found"))?;

    if marked.author_id != actor.actor_id {
        notifications::emit(
            state,
            marked.author_id,
            NotificationEvent::SolutionMarked,
            ticket.title.clone(),
            "your reply was marked as the solution",
            ticket.id,
            actor.actor_id,
            ticket.is_urgent,
        );
    }

    Ok(marked)
}

/// Deletes a reply. Only the reply's author may do this; the owning
/// ticket's reply_count drops by exactly one, never below zero.
pub async fn remove(state: &AppState, reply_id: Uuid, actor: AuthContext) -> Result<(), ApiError> {
    let reply = state
        .store
        .find_reply(reply_id)
        .await?
        .ok_or_else(|| ApiError::not_found("reply not found"))?;

    if reply.author_id != actor.actor_id {
        return Err(ApiError::forbidden("only the reply author can delete it"));
    }

    let deleted = state
        .store
        .delete_reply(reply_id, state.clock.now())
        .await?;
    if !deleted {
        return Err(ApiError::not_found("reply not found"));
    }
    Ok(())
}
