// tests/common/mod.rs
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::{path::PathBuf, sync::Arc};
use tempfile::TempDir;
use tower::ServiceExt;

use realty_crm::{
    build_router,
    config::{StoreBackend, StoreConfig},
    db::{CustomOptionsRepository, JsonFileRepository, PropertyRepository},
    AppState, Config,
};

pub const USERNAME: &str = "operator";
pub const PASSWORD: &str = "segredo-forte";

pub struct TestApp {
    pub router: Router,
    pub data_file: PathBuf,
    // Mantém a pasta viva até o fim do teste.
    pub dir: TempDir,
}

pub fn test_config(dir: &TempDir) -> Config {
    Config {
        store: StoreConfig {
            backend: StoreBackend::File,
            database_url: None,
            data_file: dir.path().join("db.json"),
            images_dir: dir.path().join("images"),
            images_route: "/images".into(),
        },
        bind_addr: "127.0.0.1:0".into(),
        public_base_url: "http://localhost:3000".into(),
        auth_username: USERNAME.into(),
        // Custo baixo para o teste não demorar.
        auth_password_hash: bcrypt::hash(PASSWORD, 4).unwrap(),
        jwt_secret: "segredo-de-teste".into(),
        jwt_ttl_hours: 1,
        cors_origins: Vec::new(),
    }
}

pub async fn spawn_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let data_file = config.store.data_file.clone();

    let repo = Arc::new(JsonFileRepository::open(data_file.clone()).await.unwrap());
    let properties: Arc<dyn PropertyRepository> = repo.clone();
    let custom_options: Arc<dyn CustomOptionsRepository> = repo;

    let router = build_router(AppState::from_parts(config, properties, custom_options));
    TestApp {
        router,
        data_file,
        dir,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    pub async fn login(&self) -> String {
        let response = self
            .request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(serde_json::json!({ "username": USERNAME, "password": PASSWORD })),
            )
            .await;
        assert_eq!(response.status(), 200);
        body_json(response).await["token"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}
