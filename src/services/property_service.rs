// src/services/property_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::PropertyRepository,
    models::property::{Property, PropertyDetails, PropertyPayload},
};

/// Regras de negócio dos imóveis. O repositório só persiste; validação,
/// geração de id e o link público ficam aqui.
#[derive(Clone)]
pub struct PropertyService {
    repo: Arc<dyn PropertyRepository>,
    public_base_url: String,
}

impl PropertyService {
    pub fn new(repo: Arc<dyn PropertyRepository>, public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Self {
            repo,
            public_base_url,
        }
    }

    pub async fn list(&self) -> Result<Vec<Property>, AppError> {
        self.repo.list().await
    }

    pub async fn get(&self, id: &str) -> Result<Property, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::PropertyNotFound)
    }

    pub async fn create(&self, payload: PropertyPayload) -> Result<Property, AppError> {
        let details = PropertyDetails::try_from(payload)?;
        self.repo.insert(Property::new(details)).await
    }

    /// Substituição completa. Campos omitidos voltam ao padrão.
    pub async fn update(
        &self,
        id: &str,
        payload: PropertyPayload,
        expected_version: Option<i32>,
    ) -> Result<Property, AppError> {
        let details = PropertyDetails::try_from(payload)?;
        self.repo.replace(id, details, expected_version).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(AppError::PropertyNotFound)
        }
    }

    /// Gera o link público na primeira chamada; depois devolve sempre o mesmo.
    pub async fn publish(&self, id: &str) -> Result<Property, AppError> {
        let property = self.get(id).await?;
        if property.details.public_link.is_some() {
            return Ok(property);
        }

        let link = self.public_link_for(id);
        self.repo
            .set_public_link_if_absent(id, &link)
            .await?
            .ok_or(AppError::PropertyNotFound)
    }

    pub fn public_link_for(&self, id: &str) -> String {
        format!("{}/property/{}?clientMode=true", self.public_base_url, id)
    }
}
