// src/models/client.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- CLIENTE (raiz de tenancy) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    #[schema(example = "CC-CL")]
    pub code: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha da listagem, com as contagens das relações
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub pdv_count: i64,
    pub agent_count: i64,
    pub user_count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewClient {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub is_active: bool,
}

// Par (código → id) usado pelo índice de chaves naturais
#[derive(Debug, Clone, FromRow)]
pub struct ClientKey {
    pub id: Uuid,
    pub code: String,
}

/// Códigos de cliente são comparados e gravados sempre em maiúsculas.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_trimmed_and_upper_cased() {
        assert_eq!(normalize_code("  cc-cl "), "CC-CL");
        assert_eq!(normalize_code("Ne-Cl"), "NE-CL");
        assert_eq!(normalize_code("   "), "");
    }
}
