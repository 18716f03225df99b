pub mod auth;
pub mod custom_options;
pub mod health;
pub mod properties;
