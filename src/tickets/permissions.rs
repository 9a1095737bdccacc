//! Permission evaluation for ticket operations.
//!
//! Stateless: the verdict is a pure function of the actor's role, the
//! actor's id and the already-loaded ticket. Every mutation in this crate
//! consults the evaluator before touching the store, and role matching
//! happens nowhere else.

use uuid::Uuid;

use crate::shared::enums::UserRole;
use crate::shared::models::Ticket;

/// What the actor may do with a specific ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub can_view: bool,
    pub can_edit: bool,
    pub can_assign: bool,
    /// Staff only, and only while the ticket is unassigned. The store's
    /// conditional update re-checks the assignment at commit time.
    pub can_pickup: bool,
    /// Ticket author only, regardless of who wrote the reply.
    pub can_mark_solution: bool,
}

pub fn evaluate(role: UserRole, actor_id: Uuid, ticket: &Ticket) -> Capabilities {
    let is_author = ticket.author_id == actor_id;
    let unassigned = ticket.assigned_to.is_none();
    match role {
        UserRole::Requester => Capabilities {
            can_view: is_author,
            can_edit: is_author,
            can_assign: false,
            can_pickup: false,
            can_mark_solution: is_author,
        },
        UserRole::Staff => Capabilities {
            can_view: true,
            can_edit: true,
            can_assign: true,
            can_pickup: unassigned,
            can_mark_solution: is_author,
        },
        UserRole::Admin => Capabilities {
            can_view: true,
            can_edit: true,
            can_assign: true,
            can_pickup: false,
            can_mark_solution: is_author,
        },
    }
}

/// Whether the role is allowed to attempt a pickup at all, ignoring the
/// current assignment. Used to tell Forbidden (wrong role) apart from
/// Conflict (ticket already claimed) without branching on the role
/// outside this module.
pub fn may_attempt_pickup(role: UserRole) -> bool {
    matches!(role, UserRole::Staff)
}
