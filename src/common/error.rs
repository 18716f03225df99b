// src/common/error.rs

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Taxonomia de erros da API. `thiserror` gera o Display e os `From`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Corpo da requisição inválido: {0}")]
    InvalidJson(#[from] JsonRejection),

    #[error("Cabeçalho If-Match inválido: {0}")]
    InvalidPrecondition(String),

    #[error("Imóvel não encontrado")]
    PropertyNotFound,

    #[error("Conflito de versão: esperado {expected}, atual {actual}")]
    VersionConflict { expected: i32, actual: i32 },

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro de serialização: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Devolve todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidJson(rejection) => {
                let body = Json(json!({ "error": rejection.body_text() }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidPrecondition(_) => (
                StatusCode::BAD_REQUEST,
                "O cabeçalho If-Match deve conter a versão numérica do imóvel.",
            ),
            AppError::PropertyNotFound => (StatusCode::NOT_FOUND, "Imóvel não encontrado."),
            AppError::VersionConflict { expected, actual } => {
                let body = Json(json!({
                    "error": "O imóvel foi alterado por outra pessoa.",
                    "expectedVersion": expected,
                    "currentVersion": actual,
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Usuário ou senha inválidos."),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.",
            ),

            // Todo o resto (banco, disco, bcrypt, jwt...) vira 500 opaco.
            // O detalhe fica só no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
