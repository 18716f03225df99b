// src/config.rs

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::{env, path::PathBuf, str::FromStr, sync::Arc, time::Duration};
use strum::EnumString;

use crate::{
    db::{CustomOptionsRepository, JsonFileRepository, PgRepository, PropertyRepository},
    services::{AuthService, PropertyService},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreBackend {
    File,
    #[strum(serialize = "postgres", serialize = "postgresql")]
    Postgres,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

// Um hash vazio ou malformado só apareceria no primeiro login, como 500.
fn check_password_hash(hash: &str) -> anyhow::Result<()> {
    hash.trim()
        .parse::<bcrypt::HashParts>()
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!("AUTH_PASSWORD_HASH não é um hash bcrypt válido: {}", e))
}

/// Onde e como os dados ficam guardados. Compartilhado pelo servidor e
/// pela ferramenta de manutenção.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub data_file: PathBuf,
    pub images_dir: PathBuf,
    pub images_route: String,
}

impl StoreConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend_name = env_or("STORE_BACKEND", "file");
        let backend = StoreBackend::from_str(&backend_name)
            .with_context(|| format!("STORE_BACKEND inválido: '{}'", backend_name))?;

        let database_url = env::var("DATABASE_URL").ok();
        if backend == StoreBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL deve ser definida quando STORE_BACKEND=postgres");
        }

        // Precisa ser um prefixo não vazio: o axum não aceita nest na raiz.
        let mut images_route = env_or("IMAGES_ROUTE", "/images")
            .trim_end_matches('/')
            .to_string();
        if images_route.is_empty() {
            images_route = "/images".to_string();
        }
        if !images_route.starts_with('/') {
            images_route.insert(0, '/');
        }

        Ok(Self {
            backend,
            database_url,
            data_file: env_or("DATA_FILE", "db.json").into(),
            images_dir: env_or("IMAGES_DIR", "public/images").into(),
            images_route,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub bind_addr: String,
    pub public_base_url: String,
    pub auth_username: String,
    pub auth_password_hash: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let store = StoreConfig::from_env()?;

        let auth_username = env::var("AUTH_USERNAME").context("AUTH_USERNAME deve ser definido")?;
        let auth_password_hash = env::var("AUTH_PASSWORD_HASH")
            .context("AUTH_PASSWORD_HASH deve ser definido")?
            .trim()
            .to_string();
        check_password_hash(&auth_password_hash)?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let jwt_ttl_hours = env_or("JWT_TTL_HOURS", "12")
            .parse()
            .context("JWT_TTL_HOURS deve ser um número inteiro")?;

        let cors_origins = env_or("CORS_ORIGINS", "")
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            store,
            bind_addr: format!("{}:{}", env_or("HOST", "0.0.0.0"), env_or("PORT", "3001")),
            public_base_url: env_or("PUBLIC_BASE_URL", "http://localhost:3000"),
            auth_username,
            auth_password_hash,
            jwt_secret,
            jwt_ttl_hours,
            cors_origins,
        })
    }
}

/// Abre o backend escolhido. Um único objeto atende imóveis e opções.
pub async fn open_repositories(
    store: &StoreConfig,
) -> anyhow::Result<(Arc<dyn PropertyRepository>, Arc<dyn CustomOptionsRepository>)> {
    match store.backend {
        StoreBackend::File => {
            let repo = Arc::new(JsonFileRepository::open(&store.data_file).await?);
            let properties: Arc<dyn PropertyRepository> = repo.clone();
            let custom_options: Arc<dyn CustomOptionsRepository> = repo;
            Ok((properties, custom_options))
        }
        StoreBackend::Postgres => {
            let database_url = store
                .database_url
                .as_deref()
                .context("DATABASE_URL deve ser definida")?;

            // Conecta ao banco de dados, usando '?' para propagar erros
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(3))
                .connect(database_url)
                .await?;
            tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

            sqlx::migrate!()
                .run(&db_pool)
                .await
                .context("Falha ao rodar as migrações do banco de dados")?;
            tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

            let repo = Arc::new(PgRepository::new(db_pool));
            let properties: Arc<dyn PropertyRepository> = repo.clone();
            let custom_options: Arc<dyn CustomOptionsRepository> = repo;
            Ok((properties, custom_options))
        }
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub property_service: PropertyService,
    pub custom_options_repo: Arc<dyn CustomOptionsRepository>,
    pub auth_service: AuthService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (properties, custom_options) = open_repositories(&config.store).await?;
        Ok(Self::from_parts(config, properties, custom_options))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_parts(
        config: Config,
        properties: Arc<dyn PropertyRepository>,
        custom_options: Arc<dyn CustomOptionsRepository>,
    ) -> Self {
        let property_service = PropertyService::new(properties, config.public_base_url.clone());
        let auth_service = AuthService::new(
            config.auth_username.clone(),
            config.auth_password_hash.clone(),
            config.jwt_secret.clone(),
            chrono::Duration::hours(config.jwt_ttl_hours),
        );

        Self {
            config: Arc::new(config),
            property_service,
            custom_options_repo: custom_options,
            auth_service,
        }
    }
}
