// src/router.rs

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::IF_MATCH])
        .expose_headers([header::ETAG]);

    if origins.is_empty() {
        return base.allow_origin(AllowOrigin::any());
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("⚠️ Origem CORS ignorada: '{}'", origin);
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(allowed))
}

pub fn build_router(app_state: AppState) -> Router {
    let config = app_state.config.clone();

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new().route("/api/auth/login", post(handlers::auth::login));

    // Loja de imóveis e opções: tudo exige token
    let store_routes = Router::new()
        .route(
            "/api/properties",
            get(handlers::properties::list_properties).post(handlers::properties::create_property),
        )
        .route(
            "/api/properties/{id}",
            get(handlers::properties::get_property)
                .put(handlers::properties::update_property)
                .delete(handlers::properties::delete_property),
        )
        .route(
            "/api/properties/{id}/public-link",
            post(handlers::properties::publish_property),
        )
        .route(
            "/api/customOptions",
            get(handlers::custom_options::get_custom_options)
                .post(handlers::custom_options::replace_custom_options),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/health", get(handlers::health::health))
        .merge(auth_routes)
        .merge(store_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest_service(
            &config.store.images_route,
            ServeDir::new(&config.store.images_dir),
        )
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
