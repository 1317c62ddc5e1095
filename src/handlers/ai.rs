// src/handlers/ai.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::ai::{ImageAnalysisPayload, PricesResponse, ReceiptResponse},
    services::VisionService,
};

fn vision(app_state: &AppState) -> Result<&VisionService, AppError> {
    app_state.vision_service.as_ref().ok_or(AppError::VisionUnavailable)
}

// POST /api/ai/process-receipt
#[utoipa::path(
    post,
    path = "/api/ai/process-receipt",
    tag = "IA",
    request_body = ImageAnalysisPayload,
    responses(
        (status = 200, description = "Dados extraídos da boleta", body = ReceiptResponse),
        (status = 400, description = "Imagem ausente"),
        (status = 500, description = "Falha do modelo de visão"),
        (status = 503, description = "Modelo de visão não configurado")
    )
)]
pub async fn process_receipt(
    State(app_state): State<AppState>,
    Json(payload): Json<ImageAnalysisPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let receipt = vision(&app_state)?
        .process_receipt(&payload.image_base64)
        .await
        .inspect_err(|e| tracing::warn!("Error al procesar la boleta: {}", e))?;
    Ok((StatusCode::OK, Json(ReceiptResponse { receipt })))
}

// POST /api/ai/analyze-prices
#[utoipa::path(
    post,
    path = "/api/ai/analyze-prices",
    tag = "IA",
    request_body = ImageAnalysisPayload,
    responses(
        (status = 200, description = "Produtos e preços identificados", body = PricesResponse),
        (status = 400, description = "Imagem ausente"),
        (status = 500, description = "Falha do modelo de visão"),
        (status = 503, description = "Modelo de visão não configurado")
    )
)]
pub async fn analyze_prices(
    State(app_state): State<AppState>,
    Json(payload): Json<ImageAnalysisPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let prices = vision(&app_state)?
        .analyze_prices(&payload.image_base64)
        .await
        .inspect_err(|e| tracing::warn!("Error al procesar la imagen: {}", e))?;
    Ok((StatusCode::OK, Json(PricesResponse { prices })))
}
