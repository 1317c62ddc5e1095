// src/services/user_service.rs

use bcrypt::hash;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ClientRepository, UserRepository},
    models::user::{
        bind_client, normalize_email, AgentView, ClientBindingError, NewUser, User, UserRole,
        UserView, MIN_PASSWORD_LEN,
    },
};

/// Hash bcrypt fora do runtime assíncrono.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password = password.to_string();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, cost))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

fn ensure_password_len(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "La contraseña debe tener al menos {} caracteres",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn binding_error(e: ClientBindingError) -> AppError {
    match e {
        ClientBindingError::ClientRequired(role) => {
            AppError::BadRequest(format!("El rol {} requiere un cliente", role))
        }
    }
}

// Dados do formulário de usuário, já desserializados
#[derive(Debug, Clone)]
pub struct UserInput<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub role: UserRole,
    pub client_id: Option<Uuid>,
    pub password: Option<&'a str>,
}

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
    clients: ClientRepository,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(repo: UserRepository, clients: ClientRepository, bcrypt_cost: u32) -> Self {
        Self {
            repo,
            clients,
            bcrypt_cost,
        }
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<UserView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_views(executor).await
    }

    pub async fn list_agents<'e, E>(
        &self,
        executor: E,
        client_id: Option<Uuid>,
    ) -> Result<Vec<AgentView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_agents(executor, client_id).await
    }

    /// Cria o usuário e, se for AGENT, o registro de agente na mesma transação.
    pub async fn create(&self, pool: &PgPool, input: UserInput<'_>) -> Result<User, AppError> {
        let password = input.password.unwrap_or_default();
        ensure_password_len(password)?;

        let password_hash = hash_password(password, self.bcrypt_cost).await?;
        let new_user = NewUser::new(
            input.name.trim().to_string(),
            input.email,
            password_hash,
            input.role,
            input.client_id,
            true,
        )
        .map_err(binding_error)?;

        let mut tx = pool.begin().await?;

        self.ensure_client(&mut tx, new_user.client_id).await?;

        let user = self
            .repo
            .insert_if_absent(&mut *tx, &new_user)
            .await?
            .ok_or_else(|| AppError::Conflict("Ya existe un usuario con ese email".to_string()))?;

        self.sync_agent(&mut tx, &user).await?;

        tx.commit().await?;

        tracing::info!("Usuário {} criado com papel {}", user.email, user.role);
        Ok(user)
    }

    /// Atualiza nome, e-mail, papel e cliente. A senha só muda quando informada.
    pub async fn update(&self, pool: &PgPool, id: Uuid, input: UserInput<'_>) -> Result<User, AppError> {
        let client_id = bind_client(input.role, input.client_id).map_err(binding_error)?;
        let email = normalize_email(input.email);

        let password_hash = match input.password.filter(|p| !p.is_empty()) {
            Some(password) => {
                ensure_password_len(password)?;
                Some(hash_password(password, self.bcrypt_cost).await?)
            }
            None => None,
        };

        let mut tx = pool.begin().await?;

        self.ensure_client(&mut tx, client_id).await?;

        let user = self
            .repo
            .update(
                &mut *tx,
                id,
                input.name.trim(),
                &email,
                input.role,
                client_id,
                password_hash.as_deref(),
            )
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => {
                    AppError::Conflict("Ya existe otro usuario con ese email".to_string())
                }
                other => other,
            })?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

        self.sync_agent(&mut tx, &user).await?;

        tx.commit().await?;
        Ok(user)
    }

    pub async fn set_active(&self, pool: &PgPool, id: Uuid, is_active: bool) -> Result<User, AppError> {
        let mut tx = pool.begin().await?;

        let user = self
            .repo
            .set_active(&mut *tx, id, is_active)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

        self.sync_agent(&mut tx, &user).await?;

        tx.commit().await?;
        Ok(user)
    }

    // Cliente informado precisa existir antes da escrita
    async fn ensure_client(
        &self,
        tx: &mut sqlx::Transaction<'_, Postgres>,
        client_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        if let Some(client_id) = client_id {
            self.clients
                .find_by_id(&mut **tx, client_id)
                .await?
                .ok_or_else(|| AppError::not_found("Cliente"))?;
        }
        Ok(())
    }

    // O registro de agente acompanha papel, cliente e estado do usuário
    async fn sync_agent(
        &self,
        tx: &mut sqlx::Transaction<'_, Postgres>,
        user: &User,
    ) -> Result<(), AppError> {
        match (user.role, user.client_id) {
            (UserRole::Agent, Some(client_id)) => {
                self.repo
                    .upsert_agent(&mut **tx, user.id, client_id, user.is_active)
                    .await?;
            }
            _ => self.repo.deactivate_agent(&mut **tx, user.id).await?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashes_verify_against_the_plain_password() {
        let hashed = hash_password("secreto1", 4 /* bcrypt MIN_COST (private const in bcrypt) */).await.unwrap();
        assert!(bcrypt::verify("secreto1", &hashed).unwrap());
        assert!(!bcrypt::verify("otro", &hashed).unwrap());
    }

    #[test]
    fn short_passwords_are_rejected() {
        let err = ensure_password_len("12345").unwrap_err();
        assert_eq!(err.to_string(), "La contraseña debe tener al menos 6 caracteres");
        assert!(ensure_password_len("123456").is_ok());
    }

    #[test]
    fn missing_client_names_the_role() {
        let err = binding_error(ClientBindingError::ClientRequired(UserRole::Agent));
        assert_eq!(err.to_string(), "El rol AGENT requiere un cliente");
    }

    fn service(pool: &PgPool) -> UserService {
        UserService::new(
            UserRepository::new(pool.clone()),
            ClientRepository::new(pool.clone()),
            4 /* bcrypt MIN_COST (private const in bcrypt) */,
        )
    }

    #[sqlx::test]
    async fn unknown_client_is_not_found_on_create(pool: PgPool) {
        let input = UserInput {
            name: "Ana Pérez",
            email: "ana@acme.cl",
            role: UserRole::Agent,
            client_id: Some(Uuid::new_v4()),
            password: Some("secreto1"),
        };

        let err = service(&pool).create(&pool, input).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.to_string(), "Cliente no encontrado");
        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(users, 0);
    }

    #[sqlx::test]
    async fn unknown_client_is_not_found_on_update(pool: PgPool) {
        let service = service(&pool);
        let admin = service
            .create(
                &pool,
                UserInput {
                    name: "Root",
                    email: "root@acme.cl",
                    role: UserRole::SuperAdmin,
                    client_id: None,
                    password: Some("secreto1"),
                },
            )
            .await
            .unwrap();

        let err = service
            .update(
                &pool,
                admin.id,
                UserInput {
                    name: "Root",
                    email: "root@acme.cl",
                    role: UserRole::Admin,
                    client_id: Some(Uuid::new_v4()),
                    password: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        let role: UserRole = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
            .bind(admin.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(role, UserRole::SuperAdmin);
    }
}
