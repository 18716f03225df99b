// src/services/auth.rs

use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    models::auth::{AuthResponse, Claims},
};

/// Um único operador, configurado por ambiente. A senha fica só como hash
/// bcrypt; o acesso à API é feito com um JWT que expira.
#[derive(Clone)]
pub struct AuthService {
    username: String,
    password_hash: String,
    jwt_secret: String,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        jwt_secret: impl Into<String>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            jwt_secret: jwt_secret.into(),
            token_ttl,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, AppError> {
        let password_clone = password.to_owned();
        let password_hash_clone = self.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if username != self.username || !is_password_valid {
            tracing::warn!("🔒 Tentativa de login recusada para '{}'", username);
            return Err(AppError::InvalidCredentials);
        }

        self.create_token()
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        if token_data.claims.sub != self.username {
            return Err(AppError::InvalidToken);
        }
        Ok(token_data.claims)
    }

    fn create_token(&self) -> Result<AuthResponse, AppError> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = Claims {
            sub: self.username.clone(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?;

        Ok(AuthResponse { token, expires_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Custo mínimo do bcrypt para os testes não demorarem.
    fn service(ttl: Duration) -> AuthService {
        let hash = bcrypt::hash("s3cret", 4).unwrap();
        AuthService::new("operator", hash, "test-secret", ttl)
    }

    #[tokio::test]
    async fn valid_credentials_yield_a_usable_token() {
        let auth = service(Duration::hours(1));
        let response = auth.login("operator", "s3cret").await.unwrap();

        let claims = auth.validate_token(&response.token).unwrap();
        assert_eq!(claims.sub, "operator");
        assert!(response.expires_at > Utc::now());
    }

    #[tokio::test]
    async fn wrong_password_or_user_is_rejected() {
        let auth = service(Duration::hours(1));
        assert!(matches!(
            auth.login("operator", "nope").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("someone", "s3cret").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn expired_or_foreign_tokens_are_rejected() {
        // Bem além da tolerância padrão de 60s do jsonwebtoken.
        let expired = service(Duration::hours(-1));
        let token = expired.login("operator", "s3cret").await.unwrap().token;
        assert!(matches!(expired.validate_token(&token), Err(AppError::InvalidToken)));

        let other = AuthService::new("operator", "x", "another-secret", Duration::hours(1));
        let fresh = service(Duration::hours(1))
            .login("operator", "s3cret")
            .await
            .unwrap()
            .token;
        assert!(matches!(other.validate_token(&fresh), Err(AppError::InvalidToken)));
        assert!(matches!(other.validate_token("garbage"), Err(AppError::InvalidToken)));
    }
}
