// src/db/route_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::route::{Route, RouteAssignment, RouteAssignmentView},
};

#[derive(Clone)]
pub struct RouteRepository {
    pool: PgPool,
}

impl RouteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn count<'e, E>(&self, executor: E, client_id: Option<Uuid>) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM routes WHERE ($1::uuid IS NULL OR client_id = $1)",
        )
        .bind(client_id)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    pub async fn list_page<'e, E>(
        &self,
        executor: E,
        client_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RouteAssignmentView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let routes = sqlx::query_as::<_, RouteAssignmentView>(
            r#"
            SELECT
                r.id, r.client_id, c.name AS client_name,
                r.agent_id, u.name AS agent_name,
                (SELECT COUNT(*) FROM tasks t WHERE t.route_id = r.id) AS tasks_count,
                r.date AS scheduled_date, r.scheduled_time, r.status
            FROM routes r
            INNER JOIN clients c ON c.id = r.client_id
            INNER JOIN agents a ON a.id = r.agent_id
            LEFT JOIN users u ON u.id = a.user_id
            WHERE ($1::uuid IS NULL OR r.client_id = $1)
            ORDER BY r.date DESC, r.scheduled_time ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(client_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?;
        Ok(routes)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Route>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let route = sqlx::query_as::<_, Route>("SELECT * FROM routes WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(route)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        assignment: &RouteAssignment,
    ) -> Result<Route, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let route = sqlx::query_as::<_, Route>(
            r#"
            INSERT INTO routes (client_id, agent_id, date, scheduled_time)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(assignment.client_id)
        .bind(assignment.agent_id)
        .bind(assignment.date)
        .bind(assignment.scheduled_time)
        .fetch_one(executor)
        .await?;
        Ok(route)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        assignment: &RouteAssignment,
    ) -> Result<Option<Route>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let route = sqlx::query_as::<_, Route>(
            r#"
            UPDATE routes
            SET client_id = $2, agent_id = $3, date = $4, scheduled_time = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(assignment.client_id)
        .bind(assignment.agent_id)
        .bind(assignment.date)
        .bind(assignment.scheduled_time)
        .fetch_optional(executor)
        .await?;
        Ok(route)
    }

    // As tarefas caem junto (ON DELETE CASCADE)
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM routes WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Uma tarefa PENDING por plantilla informada.
    pub async fn create_tasks<'e, E>(
        &self,
        executor: E,
        route_id: Uuid,
        template_ids: &[Uuid],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if template_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            r#"
            INSERT INTO tasks (route_id, template_id)
            SELECT $1, t.id FROM UNNEST($2::uuid[]) AS t(id)
            "#,
        )
        .bind(route_id)
        .bind(template_ids)
        .execute(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::BadRequest("Una o más plantillas no existen".to_string());
                }
            }
            e.into()
        })?;
        Ok(result.rows_affected())
    }
}
