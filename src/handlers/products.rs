// src/handlers/products.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::product::{NewProduct, Product},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "Todos los campos son requeridos"))]
    #[schema(example = "COCA500")]
    pub sku: String,

    #[validate(length(min = 1, message = "Todos los campos son requeridos"))]
    #[schema(example = "Coca-Cola 500ml")]
    pub name: String,

    #[validate(length(min = 1, message = "Todos los campos son requeridos"))]
    #[schema(example = "Bebidas")]
    pub category: String,

    #[validate(length(min = 1, message = "Todos los campos son requeridos"))]
    #[schema(example = "Coca-Cola")]
    pub brand: String,

    #[schema(value_type = f64, example = 1.5)]
    pub target_price: Decimal,
}

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Productos",
    responses(
        (status = 200, description = "Produtos ativos por nome", body = Vec<Product>)
    )
)]
pub async fn list_products(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let products = app_state.product_service.list(&app_state.db_pool).await?;
    Ok((StatusCode::OK, Json(products)))
}

// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Productos",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "SKU duplicado")
    )
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .product_service
        .create(
            &app_state.db_pool,
            NewProduct {
                sku: payload.sku,
                name: payload.name,
                category: payload.category,
                brand: payload.brand,
                target_price: payload.target_price,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}
