// src/models/import.rs

use serde::Serialize;
use utoipa::ToSchema;

// Resultado agregado de uma importação em lote
#[derive(Debug, Clone, Default, Serialize, ToSchema, PartialEq)]
pub struct ImportResults {
    pub success: u32,
    pub errors: Vec<String>,
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImportResponse {
    pub message: String,
    pub results: ImportResults,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema, PartialEq)]
pub struct ProductImportResults {
    pub created: u32,
    pub updated: u32,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductImportResponse {
    pub message: String,
    pub results: ProductImportResults,
    pub products_added: u32,
}
