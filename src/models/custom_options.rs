// src/models/custom_options.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Vocabulários extras que o formulário oferece além das listas fixas.
/// Existe uma única instância lógica; salvar substitui tudo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomOptions {
    #[serde(default)]
    #[schema(example = json!(["Приморский", "Аркадия"]))]
    pub districts: Vec<String>,
    #[serde(default)]
    pub housing_classes: Vec<String>,
    #[serde(default)]
    pub repair_types: Vec<String>,
    #[serde(default)]
    pub heating_options: Vec<String>,
    #[serde(default)]
    pub year_built_options: Vec<String>,
    #[serde(default)]
    pub wall_type_options: Vec<String>,
    #[serde(default)]
    pub bathroom_options: Vec<String>,
    #[serde(default)]
    pub tech_options: Vec<String>,
    #[serde(default)]
    pub comfort_options: Vec<String>,
    #[serde(default)]
    pub comm_options: Vec<String>,
    #[serde(default)]
    pub infra_options: Vec<String>,

    // Carimbado pelo servidor a cada gravação; o valor enviado pelo cliente é descartado.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CustomOptionsRow {
    pub districts: Option<Vec<String>>,
    pub housing_classes: Option<Vec<String>>,
    pub repair_types: Option<Vec<String>>,
    pub heating_options: Option<Vec<String>>,
    pub year_built_options: Option<Vec<String>>,
    pub wall_type_options: Option<Vec<String>>,
    pub bathroom_options: Option<Vec<String>>,
    pub tech_options: Option<Vec<String>>,
    pub comfort_options: Option<Vec<String>>,
    pub comm_options: Option<Vec<String>>,
    pub infra_options: Option<Vec<String>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<CustomOptionsRow> for CustomOptions {
    fn from(row: CustomOptionsRow) -> Self {
        Self {
            districts: row.districts.unwrap_or_default(),
            housing_classes: row.housing_classes.unwrap_or_default(),
            repair_types: row.repair_types.unwrap_or_default(),
            heating_options: row.heating_options.unwrap_or_default(),
            year_built_options: row.year_built_options.unwrap_or_default(),
            wall_type_options: row.wall_type_options.unwrap_or_default(),
            bathroom_options: row.bathroom_options.unwrap_or_default(),
            tech_options: row.tech_options.unwrap_or_default(),
            comfort_options: row.comfort_options.unwrap_or_default(),
            comm_options: row.comm_options.unwrap_or_default(),
            infra_options: row.infra_options.unwrap_or_default(),
            updated_at: row.updated_at,
        }
    }
}
