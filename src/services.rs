pub mod auth;
pub use auth::AuthService;
pub mod image_service;
pub use image_service::{ExtractionOutcome, ImageExtractor};
pub mod property_service;
pub use property_service::PropertyService;
