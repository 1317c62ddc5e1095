// src/handlers/route_assignments.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageParams},
    config::AppState,
    models::route::Route,
    services::route_service::AssignmentInput,
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RouteListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub client_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPayload {
    pub client_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    #[schema(example = "2024-01-15")]
    pub scheduled_date: Option<String>,
    #[schema(example = "09:00")]
    pub scheduled_time: Option<String>,
    /// Só na criação: uma tarefa por plantilla.
    #[serde(default)]
    pub task_template_ids: Vec<Uuid>,
}

impl AssignmentPayload {
    fn input(&self) -> Result<AssignmentInput<'_>, AppError> {
        let date = self.scheduled_date.as_deref().map(str::trim).filter(|d| !d.is_empty());
        match (self.client_id, self.agent_id, date) {
            (Some(client_id), Some(agent_id), Some(scheduled_date)) => Ok(AssignmentInput {
                client_id,
                agent_id,
                scheduled_date,
                scheduled_time: self.scheduled_time.as_deref(),
            }),
            _ => Err(AppError::BadRequest(
                "Cliente, agente y fecha son requeridos".to_string(),
            )),
        }
    }
}

// GET /api/route-assignments
#[utoipa::path(
    get,
    path = "/api/route-assignments",
    tag = "Planificación",
    params(RouteListQuery),
    responses(
        (status = 200, description = "Página de visitas, mais recentes primeiro")
    )
)]
pub async fn list_assignments(
    State(app_state): State<AppState>,
    Query(query): Query<RouteListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let params = PageParams {
        page: query.page,
        limit: query.limit,
    };
    let page = app_state
        .route_service
        .list(&app_state.db_pool, query.client_id, &params)
        .await?;
    Ok((StatusCode::OK, Json(page)))
}

// POST /api/route-assignments
#[utoipa::path(
    post,
    path = "/api/route-assignments",
    tag = "Planificación",
    request_body = AssignmentPayload,
    responses(
        (status = 201, description = "Visita planejada", body = Route),
        (status = 400, description = "Dados inválidos ou agente de outro cliente"),
        (status = 404, description = "Cliente ou agente não encontrado")
    )
)]
pub async fn create_assignment(
    State(app_state): State<AppState>,
    Json(payload): Json<AssignmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    let input = payload.input()?;
    let route = app_state
        .route_service
        .create(&app_state.db_pool, input, &payload.task_template_ids)
        .await?;
    Ok((StatusCode::CREATED, Json(route)))
}

// PUT /api/route-assignments/{id}
#[utoipa::path(
    put,
    path = "/api/route-assignments/{id}",
    tag = "Planificación",
    request_body = AssignmentPayload,
    params(("id" = Uuid, Path, description = "ID da visita")),
    responses(
        (status = 200, description = "Visita atualizada", body = Route),
        (status = 400, description = "Dados inválidos ou agente de outro cliente"),
        (status = 404, description = "Visita não encontrada")
    )
)]
pub async fn update_assignment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    let input = payload.input()?;
    let route = app_state
        .route_service
        .update(&app_state.db_pool, id, input)
        .await?;
    Ok((StatusCode::OK, Json(route)))
}

// DELETE /api/route-assignments/{id}
#[utoipa::path(
    delete,
    path = "/api/route-assignments/{id}",
    tag = "Planificación",
    params(("id" = Uuid, Path, description = "ID da visita")),
    responses(
        (status = 200, description = "Visita removida com suas tarefas"),
        (status = 404, description = "Visita não encontrada")
    )
)]
pub async fn delete_assignment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.route_service.delete(&app_state.db_pool, id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Asignación eliminada correctamente" })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_date_is_missing() {
        let payload = AssignmentPayload {
            client_id: Some(Uuid::new_v4()),
            agent_id: Some(Uuid::new_v4()),
            scheduled_date: Some("  ".into()),
            scheduled_time: None,
            task_template_ids: Vec::new(),
        };
        assert_eq!(
            payload.input().unwrap_err().to_string(),
            "Cliente, agente y fecha son requeridos"
        );
    }

    #[test]
    fn complete_payload_keeps_the_time() {
        let payload = AssignmentPayload {
            client_id: Some(Uuid::new_v4()),
            agent_id: Some(Uuid::new_v4()),
            scheduled_date: Some("2024-01-15".into()),
            scheduled_time: Some("10:30".into()),
            task_template_ids: Vec::new(),
        };
        let input = payload.input().unwrap();
        assert_eq!(input.scheduled_date, "2024-01-15");
        assert_eq!(input.scheduled_time, Some("10:30"));
    }
}
