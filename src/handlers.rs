// src/handlers.rs

pub mod agents;
pub mod ai;
pub mod client_pdvs;
pub mod clients;
pub mod health;
pub mod imports;
pub mod pdv_masters;
pub mod products;
pub mod route_assignments;
pub mod task_templates;
pub mod users;

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::common::error::AppError;

// PATCH de ativação usado por clientes, PDVs e usuários
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleActivePayload {
    pub id: Option<Uuid>,
    pub is_active: Option<bool>,
}

impl ToggleActivePayload {
    pub fn require(&self) -> Result<(Uuid, bool), AppError> {
        match (self.id, self.is_active) {
            (Some(id), Some(is_active)) => Ok((id, is_active)),
            _ => Err(AppError::BadRequest(
                "ID y estado activo son requeridos".to_string(),
            )),
        }
    }
}

// Filtro `?clientId=`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ClientFilter {
    pub client_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_needs_both_fields() {
        let payload = ToggleActivePayload { id: Some(Uuid::new_v4()), is_active: None };
        assert_eq!(
            payload.require().unwrap_err().to_string(),
            "ID y estado activo son requeridos"
        );

        let id = Uuid::new_v4();
        let payload = ToggleActivePayload { id: Some(id), is_active: Some(false) };
        assert_eq!(payload.require().unwrap(), (id, false));
    }
}
