// src/services/import/routes.rs

use async_trait::async_trait;

use super::{
    engine::{invalid, ImportLayout, RowError, RowImporter},
    resolver::{AgentEmailIndex, ClientCodeIndex},
    sheet::SheetRow,
};
use crate::{
    db::ImportStore,
    models::{
        client::normalize_code,
        route::{parse_schedule_date, parse_schedule_time, RouteAssignment},
        user::normalize_email,
    },
};

pub const LAYOUT: ImportLayout = ImportLayout {
    headers: &["cliente_codigo", "agente_email", "fecha_programada", "hora_programada"],
    sheet_name: "Planificaciones",
    file_name: "plantilla_planificaciones.xlsx",
    noun: "asignaciones importadas",
    examples: &[
        &["CC-CL", "juan.perez@empresa.com", "2024-01-15", "09:00"],
        &["PE-CL", "maria.garcia@empresa.com", "2024-01-16", "10:30"],
        &["NE-CL", "carlos.lopez@empresa.com", "2024-01-17", "14:00"],
    ],
};

pub struct RouteImporter {
    pub clients: ClientCodeIndex,
    pub agents: AgentEmailIndex,
}

#[async_trait]
impl RowImporter for RouteImporter {
    async fn import_row(&self, row: SheetRow<'_>, store: &dyn ImportStore) -> Result<(), RowError> {
        let client_code = normalize_code(row.get("cliente_codigo"));
        let agent_email = normalize_email(row.get("agente_email"));
        let date_raw = row.get("fecha_programada");
        let time_raw = row.get("hora_programada");

        if client_code.is_empty() {
            return invalid("El código de cliente es requerido");
        }
        if agent_email.is_empty() {
            return invalid("El email del agente es requerido");
        }
        if date_raw.is_empty() {
            return invalid("La fecha programada es requerida");
        }

        let Some(client_id) = self.clients.resolve(&client_code) else {
            return invalid(format!("El cliente con código \"{}\" no existe", client_code));
        };
        let Some(agent) = self.agents.resolve(&agent_email) else {
            return invalid(format!("El agente con email \"{}\" no existe", agent_email));
        };
        let Some(date) = parse_schedule_date(date_raw) else {
            return invalid(format!("La fecha \"{}\" no es válida", date_raw));
        };
        let time = if time_raw.is_empty() {
            None
        } else {
            match parse_schedule_time(time_raw) {
                Some(t) => Some(t),
                None => return invalid(format!("La hora \"{}\" no es válida", time_raw)),
            }
        };

        let Ok(assignment) = RouteAssignment::bind(client_id, agent, date, time) else {
            return invalid(format!(
                "El agente \"{}\" no pertenece al cliente \"{}\"",
                agent_email, client_code
            ));
        };

        store.insert_route(&assignment).await?;
        Ok(())
    }
}
