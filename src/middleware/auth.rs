// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};

use crate::{common::error::AppError, config::AppState};

// O middleware em si: toda rota da loja de imóveis passa por aqui.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|_| AppError::InvalidToken)?;
    let claims = app_state.auth_service.validate_token(bearer.token())?;

    // Insere o operador nos "extensions" da requisição
    request
        .extensions_mut()
        .insert(AuthenticatedOperator(claims.sub));
    Ok(next.run(request).await)
}

// Extrator para obter o operador autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedOperator(pub String);

impl<S> FromRequestParts<S> for AuthenticatedOperator
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedOperator>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}
