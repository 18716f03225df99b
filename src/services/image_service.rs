// src/services/image_service.rs

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};

use crate::models::property::Property;

/// Resultado da extração das imagens de um imóvel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionOutcome {
    pub image_urls: Vec<String>,
    pub saved: usize,
    pub failed: usize,
}

impl ExtractionOutcome {
    pub fn changed(&self) -> bool {
        self.saved > 0
    }
}

/// Move imagens embutidas (`data:image/<ext>;base64,...`) para arquivos
/// estáticos e reescreve as URLs. Manutenção offline, fora do caminho das
/// requisições.
#[derive(Debug, Clone)]
pub struct ImageExtractor {
    images_dir: PathBuf,
    images_route: String,
}

impl ImageExtractor {
    pub fn new(images_dir: impl Into<PathBuf>, images_route: &str) -> Self {
        Self {
            images_dir: images_dir.into(),
            images_route: images_route.trim_end_matches('/').to_string(),
        }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Uma imagem com falha mantém a URL original; as outras seguem.
    /// Com `dry_run` nada é gravado, só contado.
    pub async fn extract(&self, property: &Property, dry_run: bool) -> ExtractionOutcome {
        let mut outcome = ExtractionOutcome::default();

        for (index, url) in property.details.image_urls.iter().enumerate() {
            if !url.starts_with("data:image/") {
                outcome.image_urls.push(url.clone());
                continue;
            }

            let file_name_result = self.save(&property.id, index + 1, url, dry_run).await;
            match file_name_result {
                Ok(file_name) => {
                    tracing::info!("🖼️ Imagem salva: {}", file_name);
                    outcome.image_urls.push(format!("{}/{}", self.images_route, file_name));
                    outcome.saved += 1;
                }
                Err(e) => {
                    tracing::error!(
                        "Falha ao salvar a imagem {} do imóvel {}: {:#}",
                        index + 1,
                        property.id,
                        e
                    );
                    outcome.image_urls.push(url.clone());
                    outcome.failed += 1;
                }
            }
        }

        outcome
    }

    async fn save(
        &self,
        property_id: &str,
        position: usize,
        url: &str,
        dry_run: bool,
    ) -> anyhow::Result<String> {
        let (extension, bytes) = decode_data_uri(url)?;

        if property_id.is_empty()
            || !property_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            anyhow::bail!("id '{}' não serve como nome de arquivo", property_id);
        }

        let file_name = format!("{}_{}.{}", property_id, position, extension);
        if !dry_run {
            tokio::fs::create_dir_all(&self.images_dir).await?;
            tokio::fs::write(self.images_dir.join(&file_name), bytes).await?;
        }
        Ok(file_name)
    }
}

// "data:image/png;base64,AAAA" -> ("png", bytes)
fn decode_data_uri(url: &str) -> anyhow::Result<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:image/")
        .ok_or_else(|| anyhow::anyhow!("não é uma imagem data-URI"))?;
    let (extension, data) = rest
        .split_once(";base64,")
        .ok_or_else(|| anyhow::anyhow!("data-URI sem ';base64,'"))?;

    if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        anyhow::bail!("extensão inválida: '{}'", extension);
    }
    if data.is_empty() {
        anyhow::bail!("data-URI vazio");
    }

    let bytes = STANDARD.decode(data.trim())?;
    Ok((extension.to_ascii_lowercase(), bytes))
}
