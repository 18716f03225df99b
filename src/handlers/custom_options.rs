// src/handlers/custom_options.rs

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError, config::AppState, middleware::auth::AuthenticatedOperator,
    models::custom_options::CustomOptions,
};

// GET /api/customOptions
#[utoipa::path(
    get,
    path = "/api/customOptions",
    tag = "Custom Options",
    responses(
        (status = 200, description = "Vocabulários atuais (listas vazias se nunca salvos)", body = CustomOptions)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_custom_options(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    // Nunca salvo ainda: devolve tudo vazio em vez de 404.
    let options = app_state
        .custom_options_repo
        .get()
        .await?
        .unwrap_or_default();

    Ok((StatusCode::OK, Json(options)))
}

// POST /api/customOptions
#[utoipa::path(
    post,
    path = "/api/customOptions",
    tag = "Custom Options",
    request_body = CustomOptions,
    responses(
        (status = 201, description = "Vocabulários substituídos", body = CustomOptions),
        (status = 400, description = "JSON inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn replace_custom_options(
    State(app_state): State<AppState>,
    operator: AuthenticatedOperator,
    payload: Result<Json<CustomOptions>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(options) = payload?;

    let saved = app_state.custom_options_repo.replace(options).await?;
    tracing::info!("🗂️ {} atualizou as opções personalizadas", operator.0);

    Ok((StatusCode::CREATED, Json(saved)))
}
