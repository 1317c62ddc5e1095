// src/models/task_template.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Mapeia o CREATE TYPE task_template_type do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "task_template_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskTemplateType {
    PriceAuditSku,
    ExhibitionChecklist,
}

impl TaskTemplateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskTemplateType::PriceAuditSku => "PRICE_AUDIT_SKU",
            TaskTemplateType::ExhibitionChecklist => "EXHIBITION_CHECKLIST",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskTemplate {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: TaskTemplateType,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskTemplateSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: TaskTemplateType,
    pub items_count: i64,
    pub tasks_count: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- ITENS: entrada ---

#[derive(Debug, Clone, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkuItemInput {
    pub product_id: Uuid,
    #[serde(default = "default_true")]
    pub is_required: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItemInput {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub requires_photo: bool,
    #[serde(default = "default_true")]
    pub is_required: bool,
}

fn default_true() -> bool {
    true
}

/// Lista de itens de uma plantilla: exatamente um dos dois tipos, nunca ambos.
/// A ordem do vetor é a ordem gravada (`order` = índice).
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateItems {
    PriceAudit(Vec<SkuItemInput>),
    Checklist(Vec<ChecklistItemInput>),
}

impl TemplateItems {
    pub fn empty(kind: TaskTemplateType) -> Self {
        match kind {
            TaskTemplateType::PriceAuditSku => TemplateItems::PriceAudit(Vec::new()),
            TaskTemplateType::ExhibitionChecklist => TemplateItems::Checklist(Vec::new()),
        }
    }

    pub fn kind(&self) -> TaskTemplateType {
        match self {
            TemplateItems::PriceAudit(_) => TaskTemplateType::PriceAuditSku,
            TemplateItems::Checklist(_) => TaskTemplateType::ExhibitionChecklist,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TemplateItems::PriceAudit(items) => items.len(),
            TemplateItems::Checklist(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Interpreta o array JSON `items` conforme o tipo da plantilla.
    pub fn from_json(kind: TaskTemplateType, raw: Vec<Value>) -> Result<Self, String> {
        match kind {
            TaskTemplateType::PriceAuditSku => raw
                .into_iter()
                .enumerate()
                .map(|(i, v)| {
                    serde_json::from_value::<SkuItemInput>(v)
                        .map_err(|e| format!("Ítem {} inválido para {}: {}", i + 1, kind.as_str(), e))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(TemplateItems::PriceAudit),
            TaskTemplateType::ExhibitionChecklist => raw
                .into_iter()
                .enumerate()
                .map(|(i, v)| {
                    serde_json::from_value::<ChecklistItemInput>(v)
                        .map_err(|e| format!("Ítem {} inválido para {}: {}", i + 1, kind.as_str(), e))
                        .and_then(|item| {
                            if item.name.trim().is_empty() {
                                Err(format!("Ítem {}: el nombre es requerido", i + 1))
                            } else {
                                Ok(item)
                            }
                        })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(TemplateItems::Checklist),
        }
    }
}

// --- ITENS: saída ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkuItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub order: i32,
    pub is_required: bool,
    pub sku: String,
    pub product_name: String,
    pub brand: String,
    pub category: String,
    #[schema(value_type = f64)]
    pub target_price: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItemView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub order: i32,
    pub requires_photo: bool,
    pub is_required: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum TemplateItemsView {
    PriceAudit(Vec<SkuItemView>),
    Checklist(Vec<ChecklistItemView>),
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskTemplateDetail {
    #[serde(flatten)]
    pub template: TaskTemplate,
    pub items: TemplateItemsView,
    pub tasks_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sku_items_default_to_required() {
        let product = Uuid::new_v4();
        let items = TemplateItems::from_json(
            TaskTemplateType::PriceAuditSku,
            vec![json!({ "productId": product })],
        )
        .unwrap();
        assert_eq!(
            items,
            TemplateItems::PriceAudit(vec![SkuItemInput { product_id: product, is_required: true }])
        );
    }

    #[test]
    fn checklist_items_need_a_name() {
        let err = TemplateItems::from_json(
            TaskTemplateType::ExhibitionChecklist,
            vec![json!({ "name": "Góndola limpia" }), json!({ "name": "  " })],
        )
        .unwrap_err();
        assert!(err.starts_with("Ítem 2"));
    }

    #[test]
    fn items_of_the_other_kind_are_rejected() {
        // Um item de checklist não tem productId
        let err = TemplateItems::from_json(
            TaskTemplateType::PriceAuditSku,
            vec![json!({ "name": "Exhibidor" })],
        );
        assert!(err.is_err());
    }

    #[test]
    fn empty_list_keeps_its_kind() {
        assert_eq!(
            TemplateItems::empty(TaskTemplateType::ExhibitionChecklist).kind(),
            TaskTemplateType::ExhibitionChecklist
        );
        assert_eq!(TemplateItems::empty(TaskTemplateType::PriceAuditSku).len(), 0);
    }
}
