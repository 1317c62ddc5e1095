// src/handlers/pdv_masters.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::PageParams},
    config::AppState,
    handlers::ToggleActivePayload,
    models::pdv::{NewPdvMaster, PdvMaster},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PdvMasterPayload {
    #[validate(length(min = 1, message = "Nombre, dirección, ciudad y región son requeridos"))]
    #[schema(example = "Almacén El Sol")]
    pub name: String,

    #[validate(length(min = 1, message = "Nombre, dirección, ciudad y región son requeridos"))]
    #[schema(example = "Av. Principal 123")]
    pub address: String,

    #[validate(length(min = 1, message = "Nombre, dirección, ciudad y región son requeridos"))]
    #[schema(example = "Santiago")]
    pub city: String,

    #[validate(length(min = 1, message = "Nombre, dirección, ciudad y región son requeridos"))]
    #[schema(example = "Metropolitana")]
    pub region: String,

    pub phone: Option<String>,

    pub email: Option<String>,

    pub postal_code: Option<String>,

    // Coordenadas ausentes valem 0
    #[serde(default)]
    #[validate(range(min = -90.0, max = 90.0, message = "La latitud debe ser un número entre -90 y 90"))]
    #[schema(example = -33.4489)]
    pub latitude: f64,

    #[serde(default)]
    #[validate(range(min = -180.0, max = 180.0, message = "La longitud debe ser un número entre -180 y 180"))]
    #[schema(example = -70.6693)]
    pub longitude: f64,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl From<PdvMasterPayload> for NewPdvMaster {
    fn from(p: PdvMasterPayload) -> Self {
        NewPdvMaster {
            name: p.name.trim().to_string(),
            address: p.address.trim().to_string(),
            city: p.city.trim().to_string(),
            region: p.region.trim().to_string(),
            phone: blank_to_none(p.phone),
            email: blank_to_none(p.email),
            postal_code: blank_to_none(p.postal_code),
            latitude: p.latitude,
            longitude: p.longitude,
            is_active: true,
        }
    }
}

// GET /api/pdv-masters
#[utoipa::path(
    get,
    path = "/api/pdv-masters",
    tag = "PDVs",
    params(PageParams),
    responses(
        (status = 200, description = "Página de PDVs ordenada por nome")
    )
)]
pub async fn list_pdv_masters(
    State(app_state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.pdv_service.list(&app_state.db_pool, &params).await?;
    Ok((StatusCode::OK, Json(page)))
}

// POST /api/pdv-masters
#[utoipa::path(
    post,
    path = "/api/pdv-masters",
    tag = "PDVs",
    request_body = PdvMasterPayload,
    responses(
        (status = 201, description = "PDV criado", body = PdvMaster),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_pdv_master(
    State(app_state): State<AppState>,
    Json(payload): Json<PdvMasterPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let pdv = app_state
        .pdv_service
        .create(&app_state.db_pool, &payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(pdv)))
}

// PUT /api/pdv-masters/{id}
#[utoipa::path(
    put,
    path = "/api/pdv-masters/{id}",
    tag = "PDVs",
    request_body = PdvMasterPayload,
    params(("id" = Uuid, Path, description = "ID do PDV")),
    responses(
        (status = 200, description = "PDV atualizado", body = PdvMaster),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "PDV não encontrado")
    )
)]
pub async fn update_pdv_master(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PdvMasterPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let pdv = app_state
        .pdv_service
        .update(&app_state.db_pool, id, &payload.into())
        .await?;
    Ok((StatusCode::OK, Json(pdv)))
}

// PATCH /api/pdv-masters
#[utoipa::path(
    patch,
    path = "/api/pdv-masters",
    tag = "PDVs",
    request_body = ToggleActivePayload,
    responses(
        (status = 200, description = "Estado atualizado", body = PdvMaster),
        (status = 404, description = "PDV não encontrado")
    )
)]
pub async fn toggle_pdv_master(
    State(app_state): State<AppState>,
    Json(payload): Json<ToggleActivePayload>,
) -> Result<impl IntoResponse, AppError> {
    let (id, is_active) = payload.require()?;
    let pdv = app_state
        .pdv_service
        .set_active(&app_state.db_pool, id, is_active)
        .await?;
    Ok((StatusCode::OK, Json(pdv)))
}

// DELETE /api/pdv-masters/{id}
#[utoipa::path(
    delete,
    path = "/api/pdv-masters/{id}",
    tag = "PDVs",
    params(("id" = Uuid, Path, description = "ID do PDV")),
    responses(
        (status = 200, description = "PDV removido"),
        (status = 404, description = "PDV não encontrado"),
        (status = 409, description = "PDV atribuído a clientes")
    )
)]
pub async fn delete_pdv_master(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.pdv_service.delete(&app_state.db_pool, id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "message": "PDV eliminado correctamente" })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> PdvMasterPayload {
        PdvMasterPayload {
            name: " Almacén El Sol ".into(),
            address: "Av. Principal 123".into(),
            city: "Santiago".into(),
            region: "Metropolitana".into(),
            phone: Some("  ".into()),
            email: Some("contacto@elsol.cl".into()),
            postal_code: None,
            latitude: -33.4489,
            longitude: -70.6693,
        }
    }

    #[test]
    fn payload_converts_blanks_to_null() {
        let pdv: NewPdvMaster = payload().into();
        assert_eq!(pdv.name, "Almacén El Sol");
        assert_eq!(pdv.phone, None);
        assert!(pdv.is_active);
    }

    #[test]
    fn out_of_range_latitude_fails_validation() {
        let mut p = payload();
        p.latitude = 120.0;
        let errors = p.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("latitude"));
    }

    #[test]
    fn missing_city_reports_the_required_set() {
        let mut p = payload();
        p.city = String::new();
        let errors = p.validate().unwrap_err();
        let message = errors.field_errors()["city"][0].message.clone().unwrap();
        assert_eq!(message, "Nombre, dirección, ciudad y región son requeridos");
    }

    #[test]
    fn body_without_coordinates_defaults_to_origin() {
        let p: PdvMasterPayload = serde_json::from_str(
            r#"{"name":"A","address":"B","city":"C","region":"D"}"#,
        )
        .unwrap();
        assert!(p.validate().is_ok());

        let pdv: NewPdvMaster = p.into();
        assert_eq!(pdv.latitude, 0.0);
        assert_eq!(pdv.longitude, 0.0);
    }
}
