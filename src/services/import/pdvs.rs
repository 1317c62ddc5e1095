// src/services/import/pdvs.rs

use async_trait::async_trait;

use super::{
    engine::{invalid, ImportLayout, RowError, RowImporter},
    fields::{optional, parse_truthy},
    sheet::SheetRow,
};
use crate::{
    db::ImportStore,
    models::pdv::{latitude_in_range, longitude_in_range, NewPdvMaster},
};

pub const LAYOUT: ImportLayout = ImportLayout {
    headers: &[
        "nombre", "direccion", "ciudad", "region", "telefono", "email",
        "latitud", "longitud", "codigo_postal", "activo",
    ],
    sheet_name: "PDVs",
    file_name: "plantilla_pdvs.xlsx",
    noun: "PDVs importados",
    examples: &[
        &[
            "Almacén El Sol", "Av. Principal 123", "Santiago", "Metropolitana", "+56912345678",
            "contacto@elsol.cl", "-33.4489", "-70.6693", "7500000", "si",
        ],
        &[
            "Supermercado Central", "Calle Central 456", "Valparaíso", "Valparaíso", "+56987654321",
            "info@central.cl", "-33.0458", "-71.6197", "2340000", "si",
        ],
        &[
            "Mini Market Norte", "Av. Norte 789", "Antofagasta", "Antofagasta", "", "",
            "-23.6509", "-70.3975", "1240000", "no",
        ],
    ],
};

pub struct PdvImporter;

/// Coordenada opcional: vazia vale 0, presente precisa ser número dentro da faixa.
fn coordinate(raw: &str, in_range: fn(f64) -> bool) -> Option<f64> {
    if raw.is_empty() {
        return Some(0.0);
    }
    raw.parse::<f64>().ok().filter(|v| in_range(*v))
}

#[async_trait]
impl RowImporter for PdvImporter {
    async fn import_row(&self, row: SheetRow<'_>, store: &dyn ImportStore) -> Result<(), RowError> {
        let name = row.get("nombre");
        let address = row.get("direccion");
        let city = row.get("ciudad");
        let region = row.get("region");
        let email = optional(row.get("email"));

        if name.is_empty() {
            return invalid("El nombre es requerido");
        }
        if address.is_empty() {
            return invalid("La dirección es requerida");
        }
        if city.is_empty() {
            return invalid("La ciudad es requerida");
        }
        if region.is_empty() {
            return invalid("La región es requerida");
        }
        if email.as_deref().is_some_and(|e| !e.contains('@')) {
            return invalid("El email no es válido");
        }
        let Some(latitude) = coordinate(row.get("latitud"), latitude_in_range) else {
            return invalid("La latitud debe ser un número entre -90 y 90");
        };
        let Some(longitude) = coordinate(row.get("longitud"), longitude_in_range) else {
            return invalid("La longitud debe ser un número entre -180 y 180");
        };

        let pdv = NewPdvMaster {
            name: name.to_string(),
            address: address.to_string(),
            city: city.to_string(),
            region: region.to_string(),
            phone: optional(row.get("telefono")),
            email,
            postal_code: optional(row.get("codigo_postal")),
            latitude,
            longitude,
            is_active: parse_truthy(row.get("activo")),
        };
        store.insert_pdv(&pdv).await?;
        Ok(())
    }
}
