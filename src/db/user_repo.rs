// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{conflict_on_unique, AppError},
    models::{
        route::AgentRef,
        user::{Agent, AgentKey, AgentView, NewUser, User, UserRole, UserView},
    },
};

// O repositório de usuários, responsável pelas tabelas 'users' e 'agents'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  USUÁRIOS
    // =========================================================================

    pub async fn list_views<'e, E>(&self, executor: E) -> Result<Vec<UserView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let users = sqlx::query_as::<_, UserView>(
            r#"
            SELECT u.id, u.name, u.email, u.role, u.client_id,
                   c.name AS client_name, u.is_active
            FROM users u
            LEFT JOIN clients c ON c.id = u.client_id
            ORDER BY u.name ASC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(users)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    /// `None` = e-mail já cadastrado (constraint `users_email_key`).
    pub async fn insert_if_absent<'e, E>(
        &self,
        executor: E,
        user: &NewUser,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password, role, client_id, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.client_id)
        .bind(user.is_active)
        .fetch_optional(executor)
        .await?;
        Ok(created)
    }

    /// Atualiza os dados do usuário. A senha só muda quando `password_hash` vem preenchido.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        email: &str,
        role: UserRole,
        client_id: Option<Uuid>,
        password_hash: Option<&str>,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2, email = $3, role = $4, client_id = $5,
                password = COALESCE($6, password),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(role)
        .bind(client_id)
        .bind(password_hash)
        .fetch_optional(executor)
        .await
        .map_err(|e| conflict_on_unique(e, || format!("El email \"{}\" ya existe", email)))
    }

    pub async fn set_active<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        is_active: bool,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(executor)
        .await?;
        Ok(user)
    }

    // =========================================================================
    //  AGENTES
    // =========================================================================

    /// Garante um registro de agente para o usuário, vinculado ao cliente atual dele.
    pub async fn upsert_agent<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        client_id: Uuid,
        is_active: bool,
    ) -> Result<Agent, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let agent = sqlx::query_as::<_, Agent>(
            r#"
            INSERT INTO agents (user_id, client_id, is_active)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
                SET client_id = EXCLUDED.client_id, is_active = EXCLUDED.is_active
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(client_id)
        .bind(is_active)
        .fetch_one(executor)
        .await?;
        Ok(agent)
    }

    // Usuário deixou de ser AGENT (ou foi desativado): as rotas antigas continuam, o agente não.
    pub async fn deactivate_agent<'e, E>(&self, executor: E, user_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE agents SET is_active = FALSE WHERE user_id = $1")
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn list_agents<'e, E>(
        &self,
        executor: E,
        client_id: Option<Uuid>,
    ) -> Result<Vec<AgentView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let agents = sqlx::query_as::<_, AgentView>(
            r#"
            SELECT a.id, u.name, u.email, a.client_id, c.name AS client_name, a.is_active
            FROM agents a
            INNER JOIN users u ON u.id = a.user_id
            LEFT JOIN clients c ON c.id = a.client_id
            WHERE ($1::uuid IS NULL OR a.client_id = $1)
            ORDER BY u.name ASC
            "#,
        )
        .bind(client_id)
        .fetch_all(executor)
        .await?;
        Ok(agents)
    }

    pub async fn find_agent_ref<'e, E>(
        &self,
        executor: E,
        agent_id: Uuid,
    ) -> Result<Option<AgentRef>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let agent = sqlx::query_as::<_, AgentRef>("SELECT id, client_id FROM agents WHERE id = $1")
            .bind(agent_id)
            .fetch_optional(executor)
            .await?;
        Ok(agent)
    }

    // Snapshot (e-mail do usuário → agente) para o índice de chaves naturais
    pub async fn list_agent_keys<'e, E>(&self, executor: E) -> Result<Vec<AgentKey>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let keys = sqlx::query_as::<_, AgentKey>(
            r#"
            SELECT a.id, u.email, a.client_id
            FROM agents a
            INNER JOIN users u ON u.id = a.user_id
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(keys)
    }
}
