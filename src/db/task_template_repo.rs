// src/db/task_template_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::task_template::{
        ChecklistItemInput, ChecklistItemView, SkuItemInput, SkuItemView, TaskTemplate,
        TaskTemplateSummary, TaskTemplateType,
    },
};

#[derive(Clone)]
pub struct TaskTemplateRepository {
    pool: PgPool,
}

// Campos opcionais do PATCH/PUT de cabeçalho
#[derive(Debug, Default)]
pub struct TemplateHeaderChanges<'a> {
    pub name: Option<&'a str>,
    /// `Some(None)` limpa a descrição.
    pub description: Option<Option<&'a str>>,
    pub is_active: Option<bool>,
    pub kind: Option<TaskTemplateType>,
}

impl TaskTemplateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CABEÇALHO
    // =========================================================================

    pub async fn list_summaries<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<TaskTemplateSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let templates = sqlx::query_as::<_, TaskTemplateSummary>(
            r#"
            SELECT
                t.id, t.name, t.description, t.type, t.is_active, t.created_at, t.updated_at,
                CASE t.type
                    WHEN 'PRICE_AUDIT_SKU' THEN
                        (SELECT COUNT(*) FROM sku_template_items s WHERE s.template_id = t.id)
                    ELSE
                        (SELECT COUNT(*) FROM checklist_template_items c WHERE c.template_id = t.id)
                END AS items_count,
                (SELECT COUNT(*) FROM tasks k WHERE k.template_id = t.id) AS tasks_count
            FROM task_templates t
            ORDER BY t.name ASC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(templates)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<TaskTemplate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let template = sqlx::query_as::<_, TaskTemplate>("SELECT * FROM task_templates WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(template)
    }

    /// Igual a `find_by_id`, mas trava a linha até o fim da transação.
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<TaskTemplate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let template = sqlx::query_as::<_, TaskTemplate>(
            "SELECT * FROM task_templates WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(template)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
        kind: TaskTemplateType,
        is_active: bool,
    ) -> Result<TaskTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let template = sqlx::query_as::<_, TaskTemplate>(
            r#"
            INSERT INTO task_templates (name, description, type, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(kind)
        .bind(is_active)
        .fetch_one(executor)
        .await?;
        Ok(template)
    }

    pub async fn update_header<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &TemplateHeaderChanges<'_>,
    ) -> Result<Option<TaskTemplate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let template = sqlx::query_as::<_, TaskTemplate>(
            r#"
            UPDATE task_templates
            SET name        = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                is_active   = COALESCE($5, is_active),
                type        = COALESCE($6, type),
                updated_at  = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.description.is_some())
        .bind(changes.description.flatten())
        .bind(changes.is_active)
        .bind(changes.kind)
        .fetch_optional(executor)
        .await?;
        Ok(template)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM task_templates WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| {
                // tasks.template_id é RESTRICT
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::Conflict(
                            "No se puede eliminar la plantilla porque tiene tareas asociadas"
                                .to_string(),
                        );
                    }
                }
                e.into()
            })?;
        Ok(result.rows_affected())
    }

    pub async fn count_tasks<'e, E>(&self, executor: E, id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE template_id = $1")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(total)
    }

    // =========================================================================
    //  ITENS
    // =========================================================================

    pub async fn delete_sku_items<'e, E>(&self, executor: E, template_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM sku_template_items WHERE template_id = $1")
            .bind(template_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn delete_checklist_items<'e, E>(
        &self,
        executor: E,
        template_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM checklist_template_items WHERE template_id = $1")
            .bind(template_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    // `order` = posição no slice
    pub async fn insert_sku_items<'e, E>(
        &self,
        executor: E,
        template_id: Uuid,
        items: &[SkuItemInput],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if items.is_empty() {
            return Ok(());
        }
        let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
        let orders: Vec<i32> = (0..items.len() as i32).collect();
        let required: Vec<bool> = items.iter().map(|i| i.is_required).collect();

        sqlx::query(
            r#"
            INSERT INTO sku_template_items (template_id, product_id, "order", is_required)
            SELECT $1, u.product_id, u.ord, u.is_required
            FROM UNNEST($2::uuid[], $3::int4[], $4::bool[]) AS u(product_id, ord, is_required)
            "#,
        )
        .bind(template_id)
        .bind(&product_ids)
        .bind(&orders)
        .bind(&required)
        .execute(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::BadRequest("Uno o más productos no existen".to_string());
                }
            }
            e.into()
        })?;
        Ok(())
    }

    pub async fn insert_checklist_items<'e, E>(
        &self,
        executor: E,
        template_id: Uuid,
        items: &[ChecklistItemInput],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if items.is_empty() {
            return Ok(());
        }
        let names: Vec<String> = items.iter().map(|i| i.name.trim().to_string()).collect();
        let descriptions: Vec<Option<String>> = items.iter().map(|i| i.description.clone()).collect();
        let orders: Vec<i32> = (0..items.len() as i32).collect();
        let photos: Vec<bool> = items.iter().map(|i| i.requires_photo).collect();
        let required: Vec<bool> = items.iter().map(|i| i.is_required).collect();

        sqlx::query(
            r#"
            INSERT INTO checklist_template_items
                (template_id, name, description, "order", requires_photo, is_required)
            SELECT $1, u.name, u.description, u.ord, u.requires_photo, u.is_required
            FROM UNNEST($2::text[], $3::text[], $4::int4[], $5::bool[], $6::bool[])
                AS u(name, description, ord, requires_photo, is_required)
            "#,
        )
        .bind(template_id)
        .bind(&names)
        .bind(&descriptions)
        .bind(&orders)
        .bind(&photos)
        .bind(&required)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn list_sku_items<'e, E>(
        &self,
        executor: E,
        template_id: Uuid,
    ) -> Result<Vec<SkuItemView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, SkuItemView>(
            r#"
            SELECT s.id, s.product_id, s."order", s.is_required,
                   p.sku, p.name AS product_name, p.brand, p.category, p.target_price
            FROM sku_template_items s
            INNER JOIN products p ON p.id = s.product_id
            WHERE s.template_id = $1
            ORDER BY s."order" ASC
            "#,
        )
        .bind(template_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn list_checklist_items<'e, E>(
        &self,
        executor: E,
        template_id: Uuid,
    ) -> Result<Vec<ChecklistItemView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, ChecklistItemView>(
            r#"
            SELECT id, name, description, "order", requires_photo, is_required
            FROM checklist_template_items
            WHERE template_id = $1
            ORDER BY "order" ASC
            "#,
        )
        .bind(template_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }
}
