// src/handlers/clients.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::ToggleActivePayload,
    models::client::{Client, ClientSummary},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    #[validate(length(min = 1, message = "Nombre y código son requeridos"))]
    #[schema(example = "Coca-Cola Chile")]
    pub name: String,

    #[validate(length(min = 1, message = "Nombre y código son requeridos"))]
    #[schema(example = "CC-CL")]
    pub code: String,

    pub description: Option<String>,
}

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clientes",
    responses(
        (status = 200, description = "Clientes com contagens", body = Vec<ClientSummary>)
    )
)]
pub async fn list_clients(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let clients = app_state.client_service.list(&app_state.db_pool).await?;
    Ok((StatusCode::OK, Json(clients)))
}

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clientes",
    request_body = ClientPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Client),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Código duplicado")
    )
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    Json(payload): Json<ClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let client = app_state
        .client_service
        .create(
            &app_state.db_pool,
            &payload.name,
            &payload.code,
            payload.description.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(client)))
}

// PUT /api/clients/{id}
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "Clientes",
    request_body = ClientPayload,
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente atualizado", body = Client),
        (status = 404, description = "Cliente não encontrado"),
        (status = 409, description = "Código duplicado")
    )
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let client = app_state
        .client_service
        .update(
            &app_state.db_pool,
            id,
            &payload.name,
            &payload.code,
            payload.description.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(client)))
}

// PATCH /api/clients
#[utoipa::path(
    patch,
    path = "/api/clients",
    tag = "Clientes",
    request_body = ToggleActivePayload,
    responses(
        (status = 200, description = "Estado atualizado", body = Client),
        (status = 404, description = "Cliente não encontrado")
    )
)]
pub async fn toggle_client(
    State(app_state): State<AppState>,
    Json(payload): Json<ToggleActivePayload>,
) -> Result<impl IntoResponse, AppError> {
    let (id, is_active) = payload.require()?;
    let client = app_state
        .client_service
        .set_active(&app_state.db_pool, id, is_active)
        .await?;
    Ok((StatusCode::OK, Json(client)))
}
