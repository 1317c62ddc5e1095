// src/services/task_template_service.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{task_template_repo::TemplateHeaderChanges, TaskTemplateRepository},
    models::task_template::{
        TaskTemplate, TaskTemplateDetail, TaskTemplateSummary, TaskTemplateType, TemplateItems,
        TemplateItemsView,
    },
};

fn template_not_found() -> AppError {
    AppError::NotFound("Plantilla no encontrada".to_string())
}

fn parse_items(kind: TaskTemplateType, raw: Vec<Value>) -> Result<TemplateItems, AppError> {
    TemplateItems::from_json(kind, raw).map_err(AppError::BadRequest)
}

// Alterações do PUT. `description` vazia limpa o campo.
#[derive(Debug, Default)]
pub struct TemplateUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub kind: Option<TaskTemplateType>,
    pub items: Option<Vec<Value>>,
    pub is_active: Option<bool>,
}

#[derive(Clone)]
pub struct TaskTemplateService {
    repo: TaskTemplateRepository,
}

impl TaskTemplateService {
    pub fn new(repo: TaskTemplateRepository) -> Self {
        Self { repo }
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<TaskTemplateSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_summaries(executor).await
    }

    pub async fn detail(&self, pool: &PgPool, id: Uuid) -> Result<TaskTemplateDetail, AppError> {
        let template = self
            .repo
            .find_by_id(pool, id)
            .await?
            .ok_or_else(template_not_found)?;
        self.load_detail(pool, template).await
    }

    pub async fn create(
        &self,
        pool: &PgPool,
        name: &str,
        description: Option<&str>,
        kind: TaskTemplateType,
        items: Option<Vec<Value>>,
    ) -> Result<TaskTemplateDetail, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Nombre y tipo son requeridos".to_string()));
        }
        let description = description.map(str::trim).filter(|d| !d.is_empty());
        let items = parse_items(kind, items.unwrap_or_default())?;

        let mut tx = pool.begin().await?;
        let template = self
            .repo
            .create(&mut *tx, name, description, kind, true)
            .await?;
        self.insert_items(&mut tx, template.id, &items).await?;
        tx.commit().await?;

        tracing::info!(
            "Plantilla {} ({}) criada com {} itens",
            template.id,
            kind.as_str(),
            items.len()
        );
        self.load_detail(pool, template).await
    }

    /// Cabeçalho e itens mudam na mesma transação. Trocar o tipo apaga os itens do tipo
    /// anterior; `items` informado substitui a lista inteira.
    pub async fn update(
        &self,
        pool: &PgPool,
        id: Uuid,
        changes: TemplateUpdate,
    ) -> Result<TaskTemplateDetail, AppError> {
        if changes.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::BadRequest("El nombre no puede estar vacío".to_string()));
        }

        let mut tx = pool.begin().await?;

        let current = self
            .repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or_else(template_not_found)?;

        let kind = changes.kind.unwrap_or(current.kind);
        let items = changes
            .items
            .map(|raw| parse_items(kind, raw))
            .transpose()?;

        let header = TemplateHeaderChanges {
            name: changes.name.as_deref().map(str::trim),
            description: changes
                .description
                .as_deref()
                .map(|d| Some(d.trim()).filter(|d| !d.is_empty())),
            is_active: changes.is_active,
            kind: changes.kind,
        };
        let template = self
            .repo
            .update_header(&mut *tx, id, &header)
            .await?
            .ok_or_else(template_not_found)?;

        if kind != current.kind || items.is_some() {
            self.clear_items(&mut tx, id).await?;
        }
        if let Some(items) = &items {
            self.insert_items(&mut tx, id, items).await?;
        }

        tx.commit().await?;
        self.load_detail(pool, template).await
    }

    pub async fn set_active<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        is_active: bool,
    ) -> Result<TaskTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let changes = TemplateHeaderChanges {
            is_active: Some(is_active),
            ..Default::default()
        };
        self.repo
            .update_header(executor, id, &changes)
            .await?
            .ok_or_else(template_not_found)
    }

    /// Plantillas com tarefas não são apagadas.
    pub async fn delete(&self, pool: &PgPool, id: Uuid) -> Result<(), AppError> {
        let mut tx = pool.begin().await?;

        self.repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or_else(template_not_found)?;

        let tasks = self.repo.count_tasks(&mut *tx, id).await?;
        if tasks > 0 {
            return Err(AppError::Conflict(format!(
                "No se puede eliminar la plantilla porque tiene {} tarea(s) asociada(s)",
                tasks
            )));
        }

        self.repo.delete(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    //  ITENS
    // =========================================================================

    async fn clear_items(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<(), AppError> {
        self.repo.delete_sku_items(&mut **tx, id).await?;
        self.repo.delete_checklist_items(&mut **tx, id).await
    }

    async fn insert_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        items: &TemplateItems,
    ) -> Result<(), AppError> {
        match items {
            TemplateItems::PriceAudit(items) => self.repo.insert_sku_items(&mut **tx, id, items).await,
            TemplateItems::Checklist(items) => {
                self.repo.insert_checklist_items(&mut **tx, id, items).await
            }
        }
    }

    async fn load_detail(
        &self,
        pool: &PgPool,
        template: TaskTemplate,
    ) -> Result<TaskTemplateDetail, AppError> {
        let items = match template.kind {
            TaskTemplateType::PriceAuditSku => {
                TemplateItemsView::PriceAudit(self.repo.list_sku_items(pool, template.id).await?)
            }
            TaskTemplateType::ExhibitionChecklist => TemplateItemsView::Checklist(
                self.repo.list_checklist_items(pool, template.id).await?,
            ),
        };
        let tasks_count = self.repo.count_tasks(pool, template.id).await?;

        Ok(TaskTemplateDetail {
            template,
            items,
            tasks_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_errors_become_bad_requests() {
        let err = parse_items(
            TaskTemplateType::ExhibitionChecklist,
            vec![json!({ "productId": Uuid::new_v4() })],
        )
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn missing_items_mean_an_empty_list_of_the_kind() {
        let items = parse_items(TaskTemplateType::PriceAuditSku, Vec::new()).unwrap();
        assert!(items.is_empty());
        assert_eq!(items.kind(), TaskTemplateType::PriceAuditSku);
    }

    fn service(pool: &PgPool) -> TaskTemplateService {
        TaskTemplateService::new(TaskTemplateRepository::new(pool.clone()))
    }

    fn checklist_names(detail: &TaskTemplateDetail) -> Vec<(String, i32)> {
        match &detail.items {
            TemplateItemsView::Checklist(items) => {
                items.iter().map(|i| (i.name.clone(), i.order)).collect()
            }
            TemplateItemsView::PriceAudit(_) => panic!("esperava itens de checklist"),
        }
    }

    #[sqlx::test]
    async fn item_update_swaps_the_whole_list(pool: PgPool) {
        let service = service(&pool);
        let created = service
            .create(
                &pool,
                "Exhibición",
                None,
                TaskTemplateType::ExhibitionChecklist,
                Some(vec![json!({ "name": "A" }), json!({ "name": "B" })]),
            )
            .await
            .unwrap();
        assert_eq!(
            checklist_names(&created),
            vec![("A".to_string(), 0), ("B".to_string(), 1)]
        );

        let id = created.template.id;
        let updated = service
            .update(
                &pool,
                id,
                TemplateUpdate {
                    items: Some(vec![json!({ "name": "C" })]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(checklist_names(&updated), vec![("C".to_string(), 0)]);

        // Sem `items`, a lista fica como está
        let renamed = service
            .update(
                &pool,
                id,
                TemplateUpdate {
                    name: Some("Exhibición góndola".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.template.name, "Exhibición góndola");
        assert_eq!(checklist_names(&renamed), vec![("C".to_string(), 0)]);
    }

    #[sqlx::test]
    async fn type_change_clears_previous_items(pool: PgPool) {
        let service = service(&pool);
        let created = service
            .create(
                &pool,
                "Auditoría",
                Some("Revisión de góndola"),
                TaskTemplateType::ExhibitionChecklist,
                Some(vec![json!({ "name": "A" })]),
            )
            .await
            .unwrap();

        let updated = service
            .update(
                &pool,
                created.template.id,
                TemplateUpdate {
                    kind: Some(TaskTemplateType::PriceAuditSku),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.template.kind, TaskTemplateType::PriceAuditSku);
        assert!(matches!(&updated.items, TemplateItemsView::PriceAudit(items) if items.is_empty()));
        let leftovers: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM checklist_template_items WHERE template_id = $1")
                .bind(created.template.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(leftovers, 0);
    }
}
