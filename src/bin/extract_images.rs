// src/bin/extract_images.rs
//
// Manutenção offline: tira as imagens base64 de dentro dos imóveis, grava
// como arquivos estáticos e aponta as URLs para eles.
//
// Com STORE_BACKEND=file, pare o servidor antes: cada processo tem a sua
// cópia do db.json em memória e a última gravação vence.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use realty_crm::{
    config::{open_repositories, StoreBackend, StoreConfig},
    models::property::PropertyDetails,
    services::ImageExtractor,
};

#[derive(Debug, Parser)]
#[command(name = "extract-images", about = "Extrai imagens data-URI dos imóveis para arquivos")]
struct Cli {
    /// Só mostra o que seria feito, sem gravar nada
    #[arg(long)]
    dry_run: bool,

    /// Pasta de destino (padrão: IMAGES_DIR)
    #[arg(long)]
    images_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let store = StoreConfig::from_env()?;
    let images_dir = cli.images_dir.unwrap_or_else(|| store.images_dir.clone());

    if store.backend == StoreBackend::File && !cli.dry_run {
        tracing::warn!(
            "⚠️ {} será regravado; o servidor não pode estar rodando sobre o mesmo arquivo.",
            store.data_file.display()
        );
    }

    let (properties, _) = open_repositories(&store).await?;
    let extractor = ImageExtractor::new(images_dir, &store.images_route);

    let (mut processed, mut saved, mut failed) = (0usize, 0usize, 0usize);
    for property in properties.list().await? {
        processed += 1;
        let outcome = extractor.extract(&property, cli.dry_run).await;
        saved += outcome.saved;
        failed += outcome.failed;

        if !outcome.changed() || cli.dry_run {
            continue;
        }

        let details = PropertyDetails {
            image_urls: outcome.image_urls,
            ..property.details
        };
        // A versão só protege contra escritas que passam pelo mesmo repositório
        // (no Postgres, qualquer cliente; no arquivo, só esta ferramenta).
        if let Err(e) = properties
            .replace(&property.id, details, Some(property.version))
            .await
        {
            tracing::error!("Falha ao atualizar o imóvel {}: {}", property.id, e);
        }
    }

    tracing::info!("✅ Otimização concluída!");
    tracing::info!(
        "Imóveis processados: {} | imagens salvas: {} | falhas: {}",
        processed,
        saved,
        failed
    );
    if cli.dry_run {
        tracing::info!("(dry-run: nada foi gravado)");
    } else {
        tracing::info!("Imagens salvas em: {}", extractor.images_dir().display());
    }
    Ok(())
}
