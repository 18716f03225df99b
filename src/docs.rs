// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Health ---
        handlers::health::health,

        // --- Auth ---
        handlers::auth::login,

        // --- Properties ---
        handlers::properties::list_properties,
        handlers::properties::get_property,
        handlers::properties::create_property,
        handlers::properties::update_property,
        handlers::properties::delete_property,
        handlers::properties::publish_property,

        // --- Custom Options ---
        handlers::custom_options::get_custom_options,
        handlers::custom_options::replace_custom_options,
    ),
    components(
        schemas(
            models::health::HealthResponse,

            // --- Auth ---
            models::auth::LoginPayload,
            models::auth::AuthResponse,

            // --- Properties ---
            models::property::PropertyCategory,
            models::property::PropertyType,
            models::property::PropertyDetails,
            models::property::Property,
            models::property::PropertyPayload,

            // --- Custom Options ---
            models::custom_options::CustomOptions,
        )
    ),
    tags(
        (name = "Health", description = "Status do servidor"),
        (name = "Auth", description = "Login do operador"),
        (name = "Properties", description = "Cadastro de imóveis"),
        (name = "Custom Options", description = "Vocabulários extras do formulário")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
