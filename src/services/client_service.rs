// src/services/client_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ClientRepository,
    models::client::{normalize_code, Client, ClientSummary, NewClient},
};

#[derive(Clone)]
pub struct ClientService {
    repo: ClientRepository,
}

impl ClientService {
    pub fn new(repo: ClientRepository) -> Self {
        Self { repo }
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<ClientSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_summaries(executor).await
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        code: &str,
        description: Option<&str>,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = NewClient {
            name: name.trim().to_string(),
            code: normalize_code(code),
            description: description.map(str::trim).filter(|d| !d.is_empty()).map(String::from),
            is_active: true,
        };
        if client.name.is_empty() || client.code.is_empty() {
            return Err(AppError::BadRequest("Nombre y código son requeridos".to_string()));
        }

        self.repo
            .insert_if_absent(executor, &client)
            .await?
            .ok_or_else(|| AppError::Conflict("Ya existe un cliente con ese código".to_string()))
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        code: &str,
        description: Option<&str>,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let name = name.trim();
        let code = normalize_code(code);
        if name.is_empty() || code.is_empty() {
            return Err(AppError::BadRequest("Nombre y código son requeridos".to_string()));
        }
        let description = description.map(str::trim).filter(|d| !d.is_empty());

        self.repo
            .update(executor, id, name, &code, description)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente"))
    }

    pub async fn set_active<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        is_active: bool,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .set_active(executor, id, is_active)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente"))
    }
}
