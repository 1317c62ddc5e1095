// src/handlers/agents.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError, config::AppState, handlers::ClientFilter, models::user::AgentView,
};

// GET /api/agents
#[utoipa::path(
    get,
    path = "/api/agents",
    tag = "Usuarios",
    params(ClientFilter),
    responses(
        (status = 200, description = "Agentes, opcionalmente de um cliente", body = Vec<AgentView>)
    )
)]
pub async fn list_agents(
    State(app_state): State<AppState>,
    Query(filter): Query<ClientFilter>,
) -> Result<impl IntoResponse, AppError> {
    let agents = app_state
        .user_service
        .list_agents(&app_state.db_pool, filter.client_id)
        .await?;
    Ok((StatusCode::OK, Json(agents)))
}
