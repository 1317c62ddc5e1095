// src/models/pdv.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

// --- PDV MASTER (catálogo global de pontos de venda) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PdvMaster {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub region: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PdvMasterSummary {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub region: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub is_active: bool,
    pub clients_count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPdvMaster {
    pub name: String,
    pub address: String,
    pub city: String,
    pub region: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub is_active: bool,
}

// --- CLIENT PDV (aresta cliente ↔ PDV) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPdv {
    pub id: Uuid,
    pub client_id: Uuid,
    pub pdv_master_id: Uuid,
    pub level: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPdvView {
    pub id: Uuid,
    pub client_id: Uuid,
    pub client_name: String,
    pub pdv_master_id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
    pub level: String,
    pub is_active: bool,
}

pub fn latitude_in_range(value: f64) -> bool {
    value.is_finite() && value >= LATITUDE_RANGE.0 && value <= LATITUDE_RANGE.1
}

pub fn longitude_in_range(value: f64) -> bool {
    value.is_finite() && value >= LONGITUDE_RANGE.0 && value <= LONGITUDE_RANGE.1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_bounds_are_inclusive() {
        assert!(latitude_in_range(-90.0));
        assert!(latitude_in_range(90.0));
        assert!(!latitude_in_range(90.0001));
        assert!(longitude_in_range(-180.0));
        assert!(!longitude_in_range(-180.5));
        assert!(!latitude_in_range(f64::NAN));
    }
}
