// src/db/repository.rs

use async_trait::async_trait;

use crate::{
    common::error::AppError,
    models::{
        custom_options::CustomOptions,
        property::{Property, PropertyDetails},
    },
};

/// Contrato de persistência dos imóveis. Toda escrita só retorna depois de
/// estar durável (arquivo gravado ou comando SQL confirmado).
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    /// Todos os registros, do mais novo para o mais antigo.
    async fn list(&self) -> Result<Vec<Property>, AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Property>, AppError>;

    async fn insert(&self, property: Property) -> Result<Property, AppError>;

    /// Substitui todos os campos do cliente. `expected_version`, quando
    /// presente, precisa bater com a versão gravada.
    ///
    /// Erros: `PropertyNotFound` e `VersionConflict`.
    async fn replace(
        &self,
        id: &str,
        details: PropertyDetails,
        expected_version: Option<i32>,
    ) -> Result<Property, AppError>;

    /// `false` quando o id não existe.
    async fn delete(&self, id: &str) -> Result<bool, AppError>;

    /// Grava o link público só se ainda não houver um.
    async fn set_public_link_if_absent(
        &self,
        id: &str,
        link: &str,
    ) -> Result<Option<Property>, AppError>;
}

#[async_trait]
pub trait CustomOptionsRepository: Send + Sync {
    async fn get(&self) -> Result<Option<CustomOptions>, AppError>;

    /// Uma única linha lógica: a última gravação vence.
    async fn replace(&self, options: CustomOptions) -> Result<CustomOptions, AppError>;
}
