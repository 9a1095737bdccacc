//! Support ticket workflow: HTTP surface and routing.
//!
//! Handlers stay thin: extract the actor, delegate to the lifecycle,
//! assignment or reply managers, and serialize the outcome. Authorization
//! decisions live in `permissions`, invoked by each manager before its
//! single store mutation.

pub mod assignment;
pub mod lifecycle;
pub mod permissions;
pub mod replies;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::shared::enums::{ReplyType, TicketPriority, TicketStatus};
use crate::shared::errors::ApiError;
use crate::shared::models::{Reply, Ticket, TicketPage, TicketThread};
use crate::shared::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub title: String,
    pub description: String,
    pub category_id: Uuid,
    pub priority: Option<TicketPriority>,
    pub is_urgent: Option<bool>,
    pub tag_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub priority: Option<TicketPriority>,
    pub status: Option<TicketStatus>,
    pub is_urgent: Option<bool>,
    pub tag_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub category_id: Option<Uuid>,
    /// A user id, or the sentinel "me" for the calling actor.
    pub assigned_to: Option<String>,
    /// Ignored for requesters; their own id is always used.
    pub author: Option<Uuid>,
    pub search: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReplyRequest {
    pub content: String,
    pub reply_type: Option<ReplyType>,
    /// Accepted on the wire but never honored at creation; the solution
    /// endpoint is the only writer of the flag.
    #[serde(default)]
    pub is_solution: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateReplyRequest {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignTicketRequest {
    pub assigned_to: Uuid,
}

pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    actor: AuthContext,
    Json(req): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    let ticket = lifecycle::create(&state, req, actor).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    actor: AuthContext,
    Query(query): Query<ListQuery>,
) -> Result<Json<TicketPage>, ApiError> {
    let page = lifecycle::list(&state, query, actor).await?;
    Ok(Json(page))
}

pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    actor: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<TicketThread>, ApiError> {
    let thread = lifecycle::get(&state, id, actor).await?;
    Ok(Json(thread))
}

pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    actor: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTicketRequest>,
) -> Result<Json<Ticket>, ApiError> {
    let ticket = lifecycle::update(&state, id, req, actor).await?;
    Ok(Json(ticket))
}

pub async fn assign_ticket(
    State(state): State<Arc<AppState>>,
    actor: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignTicketRequest>,
) -> Result<Json<Ticket>, ApiError> {
    let ticket = assignment::assign(&state, id, req.assigned_to, actor).await?;
    Ok(Json(ticket))
}

pub async fn pickup_ticket(
    State(state): State<Arc<AppState>>,
    actor: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Ticket>, ApiError> {
    let ticket = assignment::pickup(&state, id, actor).await?;
    Ok(Json(ticket))
}

pub async fn add_reply(
    State(state): State<Arc<AppState>>,
    actor: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateReplyRequest>,
) -> Result<(StatusCode, Json<Reply>), ApiError> {
    let reply = lifecycle::add_reply(&state, id, req, actor).await?;
    Ok((StatusCode::CREATED, Json(reply)))
}

pub async fn update_reply(
    State(state): State<Arc<AppState>>,
    actor: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateReplyRequest>,
) -> Result<Json<Reply>, ApiError> {
    let reply = replies::update(&state, id, req, actor).await?;
    Ok(Json(reply))
}

pub async fn mark_reply_solution(
    State(state): State<Arc<AppState>>,
    actor: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Reply>, ApiError> {
    let reply = replies::mark_solution(&state, id, actor).await?;
    Ok(Json(reply))
}

pub async fn delete_reply(
    State(state): State<Arc<AppState>>,
    actor: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    replies::remove(&state, id, actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn configure_ticket_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/tickets", get(list_tickets).post(create_ticket))
        .route("/api/tickets/:id", get(get_ticket).put(update_ticket))
        .route("/api/tickets/:id/assign", put(assign_ticket))
        .route("/api/tickets/:id/pickup", put(pickup_ticket))
        .route("/api/tickets/:id/replies", post(add_reply))
        .route("/api/replies/:id", put(update_reply).delete(delete_reply))
        .route("/api/replies/:id/solution", put(mark_reply_solution))
}
