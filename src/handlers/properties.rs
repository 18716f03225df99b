// src/handlers/properties.rs

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedOperator,
    models::property::{Property, PropertyPayload},
};

// `If-Match: "3"` (ou `3`) -> Some(3). `*` equivale a não mandar nada.
fn expected_version(headers: &HeaderMap) -> Result<Option<i32>, AppError> {
    let Some(value) = headers.get(header::IF_MATCH) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| AppError::InvalidPrecondition("não é ASCII".into()))?
        .trim();
    if raw == "*" {
        return Ok(None);
    }

    let unquoted = raw.trim_start_matches("W/").trim_matches('"');
    unquoted
        .parse::<i32>()
        .map(Some)
        .map_err(|_| AppError::InvalidPrecondition(raw.to_string()))
}

// GET /api/properties
#[utoipa::path(
    get,
    path = "/api/properties",
    tag = "Properties",
    responses(
        (status = 200, description = "Todos os imóveis, do mais novo ao mais antigo", body = Vec<Property>),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_properties(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let properties = app_state.property_service.list().await?;
    Ok((StatusCode::OK, Json(properties)))
}

// GET /api/properties/{id}
#[utoipa::path(
    get,
    path = "/api/properties/{id}",
    tag = "Properties",
    params(("id" = String, Path, description = "ID do imóvel")),
    responses(
        (status = 200, description = "O imóvel (com ETag = versão)", body = Property),
        (status = 404, description = "Imóvel não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_property(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let property = app_state.property_service.get(&id).await?;
    Ok((
        StatusCode::OK,
        [(header::ETAG, property.etag())],
        Json(property),
    ))
}

// POST /api/properties
#[utoipa::path(
    post,
    path = "/api/properties",
    tag = "Properties",
    request_body = PropertyPayload,
    responses(
        (status = 201, description = "Imóvel criado", body = Property),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_property(
    State(app_state): State<AppState>,
    operator: AuthenticatedOperator,
    payload: Result<Json<PropertyPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;

    let property = app_state.property_service.create(payload).await?;
    tracing::info!("🏠 {} criou o imóvel {}", operator.0, property.id);

    Ok((
        StatusCode::CREATED,
        [(header::ETAG, property.etag())],
        Json(property),
    ))
}

// PUT /api/properties/{id}
#[utoipa::path(
    put,
    path = "/api/properties/{id}",
    tag = "Properties",
    request_body = PropertyPayload,
    params(
        ("id" = String, Path, description = "ID do imóvel"),
        ("If-Match" = Option<String>, Header, description = "Versão esperada (ETag)")
    ),
    responses(
        (status = 200, description = "Imóvel substituído", body = Property),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Imóvel não encontrado"),
        (status = 409, description = "Versão desatualizada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_property(
    State(app_state): State<AppState>,
    operator: AuthenticatedOperator,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<PropertyPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let expected = expected_version(&headers)?;
    let Json(payload) = payload?;

    let property = app_state
        .property_service
        .update(&id, payload, expected)
        .await?;
    tracing::info!(
        "✏️ {} atualizou o imóvel {} (versão {})",
        operator.0,
        property.id,
        property.version
    );

    Ok((
        StatusCode::OK,
        [(header::ETAG, property.etag())],
        Json(property),
    ))
}

// DELETE /api/properties/{id}
#[utoipa::path(
    delete,
    path = "/api/properties/{id}",
    tag = "Properties",
    params(("id" = String, Path, description = "ID do imóvel")),
    responses(
        (status = 204, description = "Imóvel removido"),
        (status = 404, description = "Imóvel não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_property(
    State(app_state): State<AppState>,
    operator: AuthenticatedOperator,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.property_service.delete(&id).await?;
    tracing::info!("🗑️ {} removeu o imóvel {}", operator.0, id);

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/properties/{id}/public-link
#[utoipa::path(
    post,
    path = "/api/properties/{id}/public-link",
    tag = "Properties",
    params(("id" = String, Path, description = "ID do imóvel")),
    responses(
        (status = 200, description = "Imóvel com o link público preenchido", body = Property),
        (status = 404, description = "Imóvel não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn publish_property(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let property = app_state.property_service.publish(&id).await?;
    Ok((StatusCode::OK, Json(property)))
}
