// src/handlers/users.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::ToggleActivePayload,
    models::user::{UserRole, UserView},
    services::user_service::UserInput,
};

fn parse_role(raw: &str) -> Result<UserRole, AppError> {
    raw.parse::<UserRole>().map_err(|_| {
        AppError::BadRequest(format!(
            "El rol \"{}\" no es válido. Roles válidos: {}",
            raw.trim(),
            UserRole::valid_list()
        ))
    })
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 1, message = "Nombre, email y contraseña son requeridos"))]
    #[schema(example = "Juan Pérez")]
    pub name: String,

    #[validate(email(message = "El email no es válido"))]
    #[schema(example = "juan.perez@empresa.com")]
    pub email: String,

    #[schema(example = "AGENT")]
    pub role: String,

    pub client_id: Option<Uuid>,

    #[validate(length(min = 1, message = "Nombre, email y contraseña son requeridos"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    pub id: Uuid,

    #[validate(length(min = 1, message = "El nombre es requerido"))]
    pub name: String,

    #[validate(email(message = "El email no es válido"))]
    pub email: String,

    pub role: String,

    pub client_id: Option<Uuid>,

    /// Em branco mantém a senha atual.
    pub password: Option<String>,
}

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Usuarios",
    responses(
        (status = 200, description = "Usuários com o nome do cliente", body = Vec<UserView>)
    )
)]
pub async fn list_users(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = app_state.user_service.list(&app_state.db_pool).await?;
    Ok((StatusCode::OK, Json(users)))
}

// POST /api/users
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Usuarios",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = UserView),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail duplicado")
    )
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let role = parse_role(&payload.role)?;

    let user = app_state
        .user_service
        .create(
            &app_state.db_pool,
            UserInput {
                name: &payload.name,
                email: &payload.email,
                role,
                client_id: payload.client_id,
                password: Some(&payload.password),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UserView::from(user))))
}

// PUT /api/users
#[utoipa::path(
    put,
    path = "/api/users",
    tag = "Usuarios",
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "Usuário atualizado", body = UserView),
        (status = 404, description = "Usuário não encontrado"),
        (status = 409, description = "E-mail duplicado")
    )
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let role = parse_role(&payload.role)?;

    let user = app_state
        .user_service
        .update(
            &app_state.db_pool,
            payload.id,
            UserInput {
                name: &payload.name,
                email: &payload.email,
                role,
                client_id: payload.client_id,
                password: payload.password.as_deref(),
            },
        )
        .await?;

    Ok((StatusCode::OK, Json(UserView::from(user))))
}

// PATCH /api/users
#[utoipa::path(
    patch,
    path = "/api/users",
    tag = "Usuarios",
    request_body = ToggleActivePayload,
    responses(
        (status = 200, description = "Estado atualizado"),
        (status = 404, description = "Usuário não encontrado")
    )
)]
pub async fn toggle_user(
    State(app_state): State<AppState>,
    Json(payload): Json<ToggleActivePayload>,
) -> Result<impl IntoResponse, AppError> {
    let (id, is_active) = payload.require()?;
    let user = app_state
        .user_service
        .set_active(&app_state.db_pool, id, is_active)
        .await?;

    let verb = if user.is_active { "activado" } else { "desactivado" };
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": format!("Usuario {} correctamente", verb),
            "id": user.id,
            "isActive": user.is_active,
        })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_roles_list_the_valid_set() {
        let err = parse_role("MANAGER").unwrap_err();
        assert_eq!(
            err.to_string(),
            "El rol \"MANAGER\" no es válido. Roles válidos: SUPER_ADMIN, ADMIN, STORE_KEEPER, AGENT"
        );
        assert_eq!(parse_role("store_keeper").unwrap(), UserRole::StoreKeeper);
    }
}
