// src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use realty_crm::{build_router, AppState, Config};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Falha ao escutar o Ctrl+C: {}", e);
    }
    tracing::info!("👋 Encerrando o servidor...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger; RUST_LOG sobrescreve o filtro padrão.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("realty_crm=info,tower_http=info")),
        )
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let addr = config.bind_addr.clone();
    let images_route = config.store.images_route.clone();

    let app_state = AppState::new(config).await?;
    let app = build_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!("🚀 Servidor escutando em {}", local_addr);
    tracing::info!("📊 API em http://{}/api", local_addr);
    tracing::info!("🖼️ Imagens em http://{}{}", local_addr, images_route);
    tracing::info!("📚 Documentação em http://{}/swagger-ui", local_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
