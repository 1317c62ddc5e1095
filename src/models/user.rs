// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use utoipa::ToSchema;
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 6;

// Mapeia o CREATE TYPE user_role do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    SuperAdmin,
    Admin,
    StoreKeeper,
    Agent,
}

impl UserRole {
    pub const ALL: [UserRole; 4] = [
        UserRole::SuperAdmin,
        UserRole::Admin,
        UserRole::StoreKeeper,
        UserRole::Agent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "SUPER_ADMIN",
            UserRole::Admin => "ADMIN",
            UserRole::StoreKeeper => "STORE_KEEPER",
            UserRole::Agent => "AGENT",
        }
    }

    /// Todos os papéis, exceto SUPER_ADMIN, pertencem a um cliente.
    pub fn requires_client(&self) -> bool {
        !matches!(self, UserRole::SuperAdmin)
    }

    pub fn valid_list() -> String {
        Self::ALL.iter().map(|r| r.as_str()).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == wanted)
            .ok_or(())
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)] // nunca sai na resposta
    pub password: String,
    pub role: UserRole,
    pub client_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub client_id: Option<Uuid>,
    pub client_name: Option<String>,
    pub is_active: bool,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            client_id: user.client_id,
            client_name: None,
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientBindingError {
    /// Papel que exige cliente chegou sem cliente.
    ClientRequired(UserRole),
}

/// Aplica a regra papel ↔ cliente: SUPER_ADMIN nunca tem cliente, os demais sempre têm.
pub fn bind_client(role: UserRole, client_id: Option<Uuid>) -> Result<Option<Uuid>, ClientBindingError> {
    if !role.requires_client() {
        return Ok(None);
    }
    client_id
        .map(Some)
        .ok_or(ClientBindingError::ClientRequired(role))
}

// Usuário pronto para inserção (senha já com hash). Só é construído via `NewUser::new`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub client_id: Option<Uuid>,
    pub is_active: bool,
}

impl NewUser {
    pub fn new(
        name: String,
        email: &str,
        password_hash: String,
        role: UserRole,
        client_id: Option<Uuid>,
        is_active: bool,
    ) -> Result<Self, ClientBindingError> {
        let client_id = bind_client(role, client_id)?;
        Ok(Self {
            name,
            email: normalize_email(email),
            password_hash,
            role,
            client_id,
            is_active,
        })
    }
}

// --- AGENTE (usuário de campo de um cliente) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub client_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub client_id: Uuid,
    pub client_name: Option<String>,
    pub is_active: bool,
}

// Snapshot mínimo para o índice de e-mails de agentes
#[derive(Debug, Clone, FromRow)]
pub struct AgentKey {
    pub id: Uuid,
    pub email: String,
    pub client_id: Uuid,
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_parse_case_insensitively() {
        assert_eq!("agent".parse::<UserRole>(), Ok(UserRole::Agent));
        assert_eq!(" Super_Admin ".parse::<UserRole>(), Ok(UserRole::SuperAdmin));
        assert!("MANAGER".parse::<UserRole>().is_err());
        assert_eq!(UserRole::valid_list(), "SUPER_ADMIN, ADMIN, STORE_KEEPER, AGENT");
    }

    #[test]
    fn super_admin_never_keeps_a_client() {
        let client = Uuid::new_v4();
        assert_eq!(bind_client(UserRole::SuperAdmin, Some(client)), Ok(None));
        assert_eq!(bind_client(UserRole::Admin, Some(client)), Ok(Some(client)));
        assert_eq!(
            bind_client(UserRole::Agent, None),
            Err(ClientBindingError::ClientRequired(UserRole::Agent))
        );
    }

    #[test]
    fn new_user_lower_cases_email() {
        let user = NewUser::new(
            "Ana".into(),
            " Ana@Empresa.COM ",
            "hash".into(),
            UserRole::SuperAdmin,
            None,
            true,
        )
        .unwrap();
        assert_eq!(user.email, "ana@empresa.com");
        assert_eq!(user.client_id, None);
    }
}
