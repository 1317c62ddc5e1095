// src/handlers/client_pdvs.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::ClientFilter,
    models::pdv::{ClientPdv, ClientPdvView},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignPdvPayload {
    pub client_id: Uuid,
    pub pdv_master_id: Uuid,
    #[schema(example = "A")]
    pub level: Option<String>,
}

// GET /api/client-pdvs
#[utoipa::path(
    get,
    path = "/api/client-pdvs",
    tag = "PDVs",
    params(ClientFilter),
    responses(
        (status = 200, description = "PDVs atribuídos, por nome", body = Vec<ClientPdvView>)
    )
)]
pub async fn list_client_pdvs(
    State(app_state): State<AppState>,
    Query(filter): Query<ClientFilter>,
) -> Result<impl IntoResponse, AppError> {
    let pdvs = app_state
        .pdv_service
        .list_client_pdvs(&app_state.db_pool, filter.client_id)
        .await?;
    Ok((StatusCode::OK, Json(pdvs)))
}

// POST /api/client-pdvs
#[utoipa::path(
    post,
    path = "/api/client-pdvs",
    tag = "PDVs",
    request_body = AssignPdvPayload,
    responses(
        (status = 201, description = "PDV atribuído ao cliente", body = ClientPdv),
        (status = 404, description = "Cliente ou PDV não encontrado"),
        (status = 409, description = "PDV já atribuído")
    )
)]
pub async fn assign_pdv(
    State(app_state): State<AppState>,
    Json(payload): Json<AssignPdvPayload>,
) -> Result<impl IntoResponse, AppError> {
    let assigned = app_state
        .pdv_service
        .assign_to_client(
            &app_state.db_pool,
            payload.client_id,
            payload.pdv_master_id,
            payload.level.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(assigned)))
}
