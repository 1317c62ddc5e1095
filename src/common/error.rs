use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Erro único da aplicação. Os erros de linha das importações NÃO passam por aqui:
// eles viram mensagens em `ImportResults.errors`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Faltan los siguientes encabezados requeridos: {}", .0.join(", "))]
    MissingHeaders(Vec<String>),

    #[error("{0}")]
    InvalidFile(String),

    #[error("El agente no pertenece al cliente indicado")]
    AgentClientMismatch,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("El servicio de análisis de imágenes no está configurado")]
    VisionUnavailable,

    #[error("Erro do modelo de visão: {0}")]
    Vision(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::BadRequest(_)
            | AppError::MissingHeaders(_)
            | AppError::InvalidFile(_)
            | AppError::AgentClientMismatch => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::VisionUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Vision(_)
            | AppError::DatabaseError(_)
            | AppError::BcryptError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{} no encontrado", what))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Retorna todos os detalhes da validação.
        if let AppError::ValidationError(errors) = &self {
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .collect();
                details.insert(field.to_string(), messages);
            }
            let body = Json(json!({
                "error": "Uno o más campos no son válidos.",
                "details": details,
            }));
            return (status, body).into_response();
        }

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O `tracing` loga a mensagem detalhada; o cliente recebe uma genérica.
            tracing::error!("Erro Interno do Servidor: {}", self);
            "Ocurrió un error inesperado.".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Converte violações de unicidade em `Conflict`; o resto segue como erro de banco.
pub fn conflict_on_unique(e: sqlx::Error, message: impl FnOnce() -> String) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::Conflict(message());
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_headers_lists_every_header() {
        let err = AppError::MissingHeaders(vec!["codigo".into(), "activo".into()]);
        assert_eq!(
            err.to_string(),
            "Faltan los siguientes encabezados requeridos: codigo, activo"
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn status_classes() {
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::not_found("PDV").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::not_found("PDV").to_string(), "PDV no encontrado");
        assert_eq!(AppError::AgentClientMismatch.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::VisionUnavailable.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Vision("timeout".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
