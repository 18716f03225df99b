// src/browser/auth.rs

use chrono::{DateTime, Utc};

use crate::models::auth::AuthResponse;

/// Token emitido pelo `POST /api/auth/login`.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

impl From<AuthResponse> for AuthSession {
    fn from(response: AuthResponse) -> Self {
        Self {
            token: response.token,
            expires_at: response.expires_at,
        }
    }
}

/// Guarda a sessão do operador no lado do navegador. Sem sessão válida,
/// nenhuma chamada à loja sai com token.
#[derive(Debug, Clone, Default)]
pub struct AuthGate {
    session: Option<AuthSession>,
}

impl AuthGate {
    pub fn sign_in(&mut self, session: AuthSession) {
        self.session = Some(session);
    }

    pub fn logout(&mut self) {
        self.session = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.bearer_token().is_some()
    }

    // Token vencido conta como ausente.
    pub fn bearer_token(&self) -> Option<&str> {
        self.session
            .as_ref()
            .filter(|s| s.is_valid_at(Utc::now()))
            .map(|s| s.token.as_str())
    }
}
