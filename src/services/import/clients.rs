// src/services/import/clients.rs

use async_trait::async_trait;

use super::{
    engine::{invalid, ImportLayout, RowError, RowImporter},
    fields::{optional, parse_truthy},
    sheet::SheetRow,
};
use crate::{
    db::ImportStore,
    models::client::{normalize_code, NewClient},
};

pub const LAYOUT: ImportLayout = ImportLayout {
    headers: &["nombre", "codigo", "descripcion", "activo"],
    sheet_name: "Clientes",
    file_name: "plantilla_clientes.xlsx",
    noun: "clientes importados",
    examples: &[
        &["Coca-Cola Chile", "CC-CL", "Cliente principal de bebidas", "si"],
        &["PepsiCo Chile", "PE-CL", "Cliente de bebidas competidor", "si"],
        &["Nestlé Chile", "NE-CL", "Cliente de alimentos", "no"],
    ],
};

pub struct ClientImporter;

#[async_trait]
impl RowImporter for ClientImporter {
    async fn import_row(&self, row: SheetRow<'_>, store: &dyn ImportStore) -> Result<(), RowError> {
        let name = row.get("nombre");
        let code = normalize_code(row.get("codigo"));

        if name.is_empty() {
            return invalid("El nombre es requerido");
        }
        if code.is_empty() {
            return invalid("El código es requerido");
        }

        let client = NewClient {
            name: name.to_string(),
            code,
            description: optional(row.get("descripcion")),
            is_active: parse_truthy(row.get("activo")),
        };
        if !store.insert_client(&client).await? {
            return invalid(format!("El código \"{}\" ya existe", client.code));
        }
        Ok(())
    }
}
