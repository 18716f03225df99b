// src/browser/client.rs

use async_trait::async_trait;
use reqwest::{header, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;
use thiserror::Error;

use super::auth::{AuthGate, AuthSession};
use crate::models::{
    auth::{AuthResponse, LoginPayload},
    custom_options::CustomOptions,
    property::{Property, PropertyPayload},
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Falha de comunicação com o servidor: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sessão ausente ou expirada. Entre novamente.")]
    Unauthenticated,

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

impl ClientError {
    /// 409: alguém salvou o imóvel antes de nós.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Status { status: 409, .. })
    }
}

// Corpo de erro padrão do servidor: {"error": "..."}
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthenticated);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or(body);
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
    let response = check(request.send().await?).await?;
    Ok(response.json::<T>().await?)
}

/// As operações da loja que a tela de imóveis usa.
#[async_trait]
pub trait PropertyApi: Send + Sync {
    async fn list_properties(&self) -> Result<Vec<Property>, ClientError>;
    async fn create_property(&self, payload: &PropertyPayload) -> Result<Property, ClientError>;
    async fn update_property(
        &self,
        id: &str,
        payload: &PropertyPayload,
        expected_version: Option<i32>,
    ) -> Result<Property, ClientError>;
    async fn delete_property(&self, id: &str) -> Result<(), ClientError>;
    async fn publish_property(&self, id: &str) -> Result<Property, ClientError>;
}

/// Cliente HTTP da API. Todas as chamadas à loja levam o token da sessão.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    base_url: String,
    gate: AuthGate,
}

impl StoreClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            gate: AuthGate::default(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let token = self.gate.bearer_token().ok_or(ClientError::Unauthenticated)?;
        Ok(self.http.request(method, self.url(path)).bearer_auth(token))
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ClientError> {
        let payload = LoginPayload {
            username: username.to_string(),
            password: password.to_string(),
        };
        let request = self.http.post(self.url("/api/auth/login")).json(&payload);
        let response: AuthResponse = send_json(request).await?;

        self.gate.sign_in(AuthSession::from(response));
        Ok(())
    }

    pub fn logout(&mut self) {
        self.gate.logout();
    }

    pub fn is_authenticated(&self) -> bool {
        self.gate.is_authenticated()
    }

    pub async fn get_custom_options(&self) -> Result<CustomOptions, ClientError> {
        send_json(self.authorized(Method::GET, "/api/customOptions")?).await
    }

    pub async fn save_custom_options(
        &self,
        options: &CustomOptions,
    ) -> Result<CustomOptions, ClientError> {
        let request = self
            .authorized(Method::POST, "/api/customOptions")?
            .json(options);
        send_json(request).await
    }
}

#[async_trait]
impl PropertyApi for StoreClient {
    async fn list_properties(&self) -> Result<Vec<Property>, ClientError> {
        send_json(self.authorized(Method::GET, "/api/properties")?).await
    }

    async fn create_property(&self, payload: &PropertyPayload) -> Result<Property, ClientError> {
        let request = self
            .authorized(Method::POST, "/api/properties")?
            .json(payload);
        send_json(request).await
    }

    async fn update_property(
        &self,
        id: &str,
        payload: &PropertyPayload,
        expected_version: Option<i32>,
    ) -> Result<Property, ClientError> {
        let mut request = self
            .authorized(Method::PUT, &format!("/api/properties/{}", id))?
            .json(payload);
        if let Some(version) = expected_version {
            request = request.header(header::IF_MATCH, format!("\"{}\"", version));
        }
        send_json(request).await
    }

    async fn delete_property(&self, id: &str) -> Result<(), ClientError> {
        let request = self.authorized(Method::DELETE, &format!("/api/properties/{}", id))?;
        check(request.send().await?).await?;
        Ok(())
    }

    async fn publish_property(&self, id: &str) -> Result<Property, ClientError> {
        let path = format!("/api/properties/{}/public-link", id);
        send_json(self.authorized(Method::POST, &path)?).await
    }
}
