// src/handlers/task_templates.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::task_template::{TaskTemplate, TaskTemplateDetail, TaskTemplateSummary, TaskTemplateType},
    services::task_template_service::TemplateUpdate,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplatePayload {
    #[schema(example = "Auditoría de precios bebidas")]
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<TaskTemplateType>,
    /// Itens do tipo informado: `{productId, isRequired}` ou `{name, description, requiresPhoto, isRequired}`.
    #[schema(value_type = Vec<Object>)]
    pub items: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemplatePayload {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<TaskTemplateType>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub items: Option<Vec<Value>>,
    pub is_active: Option<bool>,
}

// GET /api/task-templates
#[utoipa::path(
    get,
    path = "/api/task-templates",
    tag = "Plantillas",
    responses(
        (status = 200, description = "Plantillas com contagens", body = Vec<TaskTemplateSummary>)
    )
)]
pub async fn list_templates(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let templates = app_state.task_template_service.list(&app_state.db_pool).await?;
    Ok((StatusCode::OK, Json(templates)))
}

// POST /api/task-templates
#[utoipa::path(
    post,
    path = "/api/task-templates",
    tag = "Plantillas",
    request_body = CreateTemplatePayload,
    responses(
        (status = 201, description = "Plantilla criada", body = TaskTemplateDetail),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_template(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateTemplatePayload>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(name), Some(kind)) = (payload.name.as_deref(), payload.kind) else {
        return Err(AppError::BadRequest("Nombre y tipo son requeridos".to_string()));
    };

    let template = app_state
        .task_template_service
        .create(
            &app_state.db_pool,
            name,
            payload.description.as_deref(),
            kind,
            payload.items,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(template)))
}

// GET /api/task-templates/{id}
#[utoipa::path(
    get,
    path = "/api/task-templates/{id}",
    tag = "Plantillas",
    params(("id" = Uuid, Path, description = "ID da plantilla")),
    responses(
        (status = 200, description = "Plantilla com itens", body = TaskTemplateDetail),
        (status = 404, description = "Plantilla não encontrada")
    )
)]
pub async fn get_template(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let template = app_state
        .task_template_service
        .detail(&app_state.db_pool, id)
        .await?;
    Ok((StatusCode::OK, Json(template)))
}

// PUT /api/task-templates/{id}
#[utoipa::path(
    put,
    path = "/api/task-templates/{id}",
    tag = "Plantillas",
    request_body = UpdateTemplatePayload,
    params(("id" = Uuid, Path, description = "ID da plantilla")),
    responses(
        (status = 200, description = "Plantilla atualizada", body = TaskTemplateDetail),
        (status = 400, description = "Itens inválidos"),
        (status = 404, description = "Plantilla não encontrada")
    )
)]
pub async fn update_template(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTemplatePayload>,
) -> Result<impl IntoResponse, AppError> {
    let changes = TemplateUpdate {
        name: payload.name,
        description: payload.description,
        kind: payload.kind,
        items: payload.items,
        is_active: payload.is_active,
    };
    let template = app_state
        .task_template_service
        .update(&app_state.db_pool, id, changes)
        .await?;
    Ok((StatusCode::OK, Json(template)))
}

// PATCH /api/task-templates/{id}
#[utoipa::path(
    patch,
    path = "/api/task-templates/{id}",
    tag = "Plantillas",
    params(("id" = Uuid, Path, description = "ID da plantilla")),
    request_body(content = Object, description = "`{\"isActive\": bool}`"),
    responses(
        (status = 200, description = "Estado atualizado", body = TaskTemplate),
        (status = 400, description = "isActive ausente ou não booleano"),
        (status = 404, description = "Plantilla não encontrada")
    )
)]
pub async fn toggle_template(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let Some(is_active) = payload.get("isActive").and_then(Value::as_bool) else {
        return Err(AppError::BadRequest("isActive debe ser un booleano".to_string()));
    };
    let template = app_state
        .task_template_service
        .set_active(&app_state.db_pool, id, is_active)
        .await?;
    Ok((StatusCode::OK, Json(template)))
}

// DELETE /api/task-templates/{id}
#[utoipa::path(
    delete,
    path = "/api/task-templates/{id}",
    tag = "Plantillas",
    params(("id" = Uuid, Path, description = "ID da plantilla")),
    responses(
        (status = 200, description = "Plantilla removida"),
        (status = 404, description = "Plantilla não encontrada"),
        (status = 409, description = "Plantilla com tarefas")
    )
)]
pub async fn delete_template(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .task_template_service
        .delete(&app_state.db_pool, id)
        .await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Plantilla eliminada correctamente" })),
    ))
}
