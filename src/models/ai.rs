// src/models/ai.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysisPayload {
    #[validate(length(min = 1, message = "No se proporcionó imagen"))]
    #[schema(example = "data:image/jpeg;base64,/9j/4AAQSkZJRg...")]
    pub image_base64: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ReceiptItem {
    pub name: String,
    pub price: f64,
    #[serde(default = "one")]
    pub quantity: f64,
}

fn one() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ReceiptData {
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub items: Vec<ReceiptItem>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceData {
    pub product_name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub confidence: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReceiptResponse {
    pub receipt: ReceiptData,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PricesResponse {
    pub prices: Vec<PriceData>,
}
