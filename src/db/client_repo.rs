// src/db/client_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{conflict_on_unique, AppError},
    models::client::{Client, ClientKey, ClientSummary, NewClient},
};

#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_summaries<'e, E>(&self, executor: E) -> Result<Vec<ClientSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let clients = sqlx::query_as::<_, ClientSummary>(
            r#"
            SELECT
                c.id, c.name, c.code, c.description, c.is_active,
                (SELECT COUNT(*) FROM client_pdvs cp WHERE cp.client_id = c.id) AS pdv_count,
                (SELECT COUNT(*) FROM agents a WHERE a.client_id = c.id)        AS agent_count,
                (SELECT COUNT(*) FROM users u WHERE u.client_id = c.id)         AS user_count
            FROM clients c
            ORDER BY c.name ASC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(clients)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(client)
    }

    /// Insere o cliente se o código ainda não existir. `None` = código duplicado.
    /// A unicidade é garantida pela constraint `clients_code_key`, sem leitura prévia.
    pub async fn insert_if_absent<'e, E>(
        &self,
        executor: E,
        client: &NewClient,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (name, code, description, is_active)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (code) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(&client.name)
        .bind(&client.code)
        .bind(client.description.as_deref())
        .bind(client.is_active)
        .fetch_optional(executor)
        .await?;
        Ok(created)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        code: &str,
        description: Option<&str>,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET name = $2, code = $3, description = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(code)
        .bind(description)
        .fetch_optional(executor)
        .await
        .map_err(|e| conflict_on_unique(e, || "Ya existe otro cliente con ese código".to_string()))
    }

    pub async fn set_active<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        is_active: bool,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            "UPDATE clients SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(executor)
        .await?;
        Ok(client)
    }

    // Snapshot completo (código → id) para o índice de chaves naturais
    pub async fn list_keys<'e, E>(&self, executor: E) -> Result<Vec<ClientKey>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let keys = sqlx::query_as::<_, ClientKey>("SELECT id, code FROM clients")
            .fetch_all(executor)
            .await?;
        Ok(keys)
    }
}
