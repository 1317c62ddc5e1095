// src/services/import/products.rs

use std::str::FromStr;

use rust_decimal::Decimal;

use super::{
    engine::{ImportLayout, RowError},
    sheet::{Sheet, SheetRow},
};
use crate::{
    db::ImportStore,
    models::{
        import::ProductImportResults,
        product::{NewProduct, UpsertOutcome},
    },
};

pub const LAYOUT: ImportLayout = ImportLayout {
    headers: &["sku", "name", "category", "brand", "targetPrice"],
    sheet_name: "Productos",
    file_name: "plantilla_productos.xlsx",
    noun: "productos importados",
    examples: &[
        &["COCA500", "Coca-Cola 500ml", "Bebidas", "Coca-Cola", "1.50"],
        &["PEPSI500", "Pepsi 500ml", "Bebidas", "PepsiCo", "1.40"],
        &["NESCAFE200", "Nescafé Tradición 200g", "Café", "Nestlé", "6.90"],
    ],
};

fn parse_row(row: SheetRow<'_>) -> Option<NewProduct> {
    let field = |h: &str| Some(row.get(h)).filter(|v| !v.is_empty()).map(str::to_string);
    let target_price = Decimal::from_str(row.get("targetPrice"))
        .ok()
        .filter(|p| p.is_sign_positive() && !p.is_zero())?;

    Some(NewProduct {
        sku: field("sku")?,
        name: field("name")?,
        category: field("category")?,
        brand: field("brand")?,
        target_price,
    })
}

/// Upsert por SKU, linha a linha; conta criados e atualizados separadamente.
pub async fn run(sheet: &Sheet, store: &dyn ImportStore) -> ProductImportResults {
    let mut results = ProductImportResults::default();

    for row in sheet.rows() {
        let Some(product) = parse_row(row) else {
            results
                .errors
                .push(format!("Fila {}: Datos incompletos o inválidos", row.line()));
            continue;
        };
        match store.upsert_product(&product).await {
            Ok(UpsertOutcome::Created) => results.created += 1,
            Ok(UpsertOutcome::Updated) => results.updated += 1,
            Err(e) => {
                let message = format!("Fila {}: {}", row.line(), RowError::Store(e));
                tracing::debug!("{}", message);
                results.errors.push(message);
            }
        }
    }

    results
}
