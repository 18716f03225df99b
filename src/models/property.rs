// src/models/property.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use strum::{AsRefStr, EnumString};
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::common::error::AppError;

// --- ENUMS ---

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PropertyCategory {
    Apartments,
    Houses,
    Commercial,
    Land,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, EnumString, AsRefStr,
)]
pub enum PropertyType {
    #[default]
    Secondary,
    // O formulário antigo mandava "New Build"; aceitamos as duas grafias.
    #[serde(rename = "New Build", alias = "NewBuild")]
    #[strum(to_string = "New Build", serialize = "NewBuild")]
    NewBuild,
    Construction,
}

// --- O IMÓVEL (como trafega no JSON) ---

/// Todos os campos que o cliente pode propor. Não inclui os campos
/// controlados pelo servidor (`id`, datas e `version`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDetails {
    #[schema(example = "houses")]
    pub category: PropertyCategory,

    #[serde(rename = "type", default)]
    pub property_type: PropertyType,

    #[schema(example = 150000)]
    pub price: i64,

    #[schema(example = "Приморский")]
    pub district: String,

    #[schema(example = "ул. Ленина 1")]
    pub address: String,

    #[schema(example = "+380501234567")]
    pub owner_phone: String,

    #[serde(default)]
    pub floor: Option<i32>,
    #[serde(default)]
    pub total_floors: Option<i32>,
    #[serde(default)]
    pub rooms: Option<String>,

    #[serde(default)]
    #[schema(example = 120.0)]
    pub total_area: Option<f64>,
    #[serde(default)]
    pub kitchen_area: Option<f64>,
    #[serde(default)]
    pub land_area: Option<f64>,

    #[serde(default)]
    pub housing_class: Option<String>,
    #[serde(default)]
    pub has_furniture: bool,
    #[serde(default)]
    pub has_repair: bool,
    #[serde(default)]
    pub repair_type: Option<String>,
    #[serde(default)]
    pub heating: Option<String>,

    // Conjuntos de tags: nunca nulos, a ordem não importa.
    #[serde(default)]
    pub tech: Vec<String>,
    #[serde(default)]
    pub comfort: Vec<String>,
    #[serde(default)]
    pub comm: Vec<String>,
    #[serde(default)]
    pub infra: Vec<String>,

    #[serde(rename = "isEOselya", default)]
    pub is_eoselya: bool,

    #[serde(default)]
    pub land_type: Option<String>,
    #[serde(default)]
    pub house_subtype: Option<String>,
    #[serde(default)]
    pub location_type: Option<String>,
    #[serde(default)]
    pub distance_from_city_km: Option<f64>,
    #[serde(default)]
    pub plot_area: Option<f64>,
    #[serde(default)]
    pub cadastral_number: Option<String>,
    #[serde(default)]
    pub year_built: Option<String>,
    #[serde(default)]
    pub wall_type: Option<String>,
    #[serde(default)]
    pub bathroom_type: Option<String>,

    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub public_link: Option<String>,
}

/// O registro persistido: detalhes + campos que só o servidor escreve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[schema(example = "7f1c2d9e-4b8a-4e51-9a0c-2f3b5d6e7a81")]
    pub id: String,

    #[serde(flatten)]
    pub details: PropertyDetails,

    // Registros antigos do db.json não tinham datas nem versão.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default = "initial_version")]
    pub version: i32,
}

fn initial_version() -> i32 {
    1
}

impl Property {
    /// Monta um registro novo. O `id` é sempre gerado aqui.
    pub fn new(details: PropertyDetails) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            details,
            created_at: now,
            updated_at: now,
            version: initial_version(),
        }
    }

    /// Substituição completa: tudo menos `id` e `created_at`.
    pub fn replace_details(&mut self, details: PropertyDetails) {
        self.details = details;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.version += 1;
    }

    pub fn etag(&self) -> String {
        format!("\"{}\"", self.version)
    }
}

// ---
// Validação Customizada
// ---
fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("O campo não pode ficar vazio.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: o que chega em POST/PUT /api/properties
// ---
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPayload {
    #[validate(required(message = "O campo 'category' é obrigatório."))]
    pub category: Option<PropertyCategory>,

    #[serde(rename = "type", default)]
    pub property_type: PropertyType,

    #[validate(
        required(message = "O campo 'price' é obrigatório."),
        range(min = 0, message = "O preço não pode ser negativo.")
    )]
    pub price: Option<i64>,

    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"))]
    pub district: String,

    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"))]
    pub address: String,

    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"))]
    pub owner_phone: String,

    #[serde(default)]
    pub floor: Option<i32>,
    #[serde(default)]
    pub total_floors: Option<i32>,
    #[serde(default)]
    pub rooms: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "A área não pode ser negativa."))]
    pub total_area: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "A área não pode ser negativa."))]
    pub kitchen_area: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "A área não pode ser negativa."))]
    pub land_area: Option<f64>,

    #[serde(default)]
    pub housing_class: Option<String>,
    #[serde(default)]
    pub has_furniture: bool,
    #[serde(default)]
    pub has_repair: bool,
    #[serde(default)]
    pub repair_type: Option<String>,
    #[serde(default)]
    pub heating: Option<String>,

    #[serde(default)]
    pub tech: Vec<String>,
    #[serde(default)]
    pub comfort: Vec<String>,
    #[serde(default)]
    pub comm: Vec<String>,
    #[serde(default)]
    pub infra: Vec<String>,

    #[serde(rename = "isEOselya", default)]
    pub is_eoselya: bool,

    #[serde(default)]
    pub land_type: Option<String>,
    #[serde(default)]
    pub house_subtype: Option<String>,
    #[serde(default)]
    pub location_type: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "A distância não pode ser negativa."))]
    pub distance_from_city_km: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "A área não pode ser negativa."))]
    pub plot_area: Option<f64>,
    #[serde(default)]
    pub cadastral_number: Option<String>,
    #[serde(default)]
    pub year_built: Option<String>,
    #[serde(default)]
    pub wall_type: Option<String>,
    #[serde(default)]
    pub bathroom_type: Option<String>,

    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub public_link: Option<String>,
}

impl PropertyPayload {
    // Regra: terrenos podem informar só a área do lote; o resto precisa de totalArea.
    fn validate_consistency(&self) -> Result<(), ValidationError> {
        let has_area = match self.category {
            Some(PropertyCategory::Land) => self.total_area.is_some() || self.land_area.is_some(),
            _ => self.total_area.is_some(),
        };
        if !has_area {
            let mut err = ValidationError::new("required");
            err.message = Some("O campo 'totalArea' é obrigatório.".into());
            return Err(err);
        }
        Ok(())
    }
}

fn missing(field: &'static str) -> AppError {
    let mut errors = ValidationErrors::new();
    errors.add(field, ValidationError::new("required"));
    AppError::ValidationError(errors)
}

impl TryFrom<PropertyPayload> for PropertyDetails {
    type Error = AppError;

    fn try_from(payload: PropertyPayload) -> Result<Self, Self::Error> {
        payload.validate()?;
        payload.validate_consistency().map_err(|e| {
            let mut errors = ValidationErrors::new();
            errors.add("totalArea", e);
            AppError::ValidationError(errors)
        })?;

        let category = payload.category.ok_or_else(|| missing("category"))?;
        let price = payload.price.ok_or_else(|| missing("price"))?;

        Ok(Self {
            category,
            property_type: payload.property_type,
            price,
            district: payload.district.trim().to_string(),
            address: payload.address.trim().to_string(),
            owner_phone: payload.owner_phone.trim().to_string(),
            floor: payload.floor,
            total_floors: payload.total_floors,
            rooms: payload.rooms,
            total_area: payload.total_area,
            kitchen_area: payload.kitchen_area,
            land_area: payload.land_area,
            housing_class: payload.housing_class,
            has_furniture: payload.has_furniture,
            has_repair: payload.has_repair,
            repair_type: payload.repair_type,
            heating: payload.heating,
            tech: payload.tech,
            comfort: payload.comfort,
            comm: payload.comm,
            infra: payload.infra,
            is_eoselya: payload.is_eoselya,
            land_type: payload.land_type,
            house_subtype: payload.house_subtype,
            location_type: payload.location_type,
            distance_from_city_km: payload.distance_from_city_km,
            plot_area: payload.plot_area,
            cadastral_number: payload.cadastral_number,
            year_built: payload.year_built,
            wall_type: payload.wall_type,
            bathroom_type: payload.bathroom_type,
            description: payload.description,
            image_urls: payload.image_urls,
            public_link: payload.public_link,
        })
    }
}

// O navegador edita um rascunho a partir do registro salvo.
impl From<&PropertyDetails> for PropertyPayload {
    fn from(d: &PropertyDetails) -> Self {
        Self {
            category: Some(d.category),
            property_type: d.property_type,
            price: Some(d.price),
            district: d.district.clone(),
            address: d.address.clone(),
            owner_phone: d.owner_phone.clone(),
            floor: d.floor,
            total_floors: d.total_floors,
            rooms: d.rooms.clone(),
            total_area: d.total_area,
            kitchen_area: d.kitchen_area,
            land_area: d.land_area,
            housing_class: d.housing_class.clone(),
            has_furniture: d.has_furniture,
            has_repair: d.has_repair,
            repair_type: d.repair_type.clone(),
            heating: d.heating.clone(),
            tech: d.tech.clone(),
            comfort: d.comfort.clone(),
            comm: d.comm.clone(),
            infra: d.infra.clone(),
            is_eoselya: d.is_eoselya,
            land_type: d.land_type.clone(),
            house_subtype: d.house_subtype.clone(),
            location_type: d.location_type.clone(),
            distance_from_city_km: d.distance_from_city_km,
            plot_area: d.plot_area,
            cadastral_number: d.cadastral_number.clone(),
            year_built: d.year_built.clone(),
            wall_type: d.wall_type.clone(),
            bathroom_type: d.bathroom_type.clone(),
            description: d.description.clone(),
            image_urls: d.image_urls.clone(),
            public_link: d.public_link.clone(),
        }
    }
}

// --- A LINHA (como está na tabela `properties`) ---

// Mapeamento estático camelCase <-> snake_case. Colunas de array podem vir
// NULL de linhas antigas; na leitura viram vetor vazio.
#[derive(Debug, Clone, FromRow)]
pub struct PropertyRow {
    pub id: String,
    pub category: String,
    #[sqlx(rename = "type")]
    pub property_type: String,
    pub price: i64,
    pub district: String,
    pub address: String,
    pub owner_phone: String,
    pub floor: Option<i32>,
    pub total_floors: Option<i32>,
    pub rooms: Option<String>,
    pub total_area: Option<f64>,
    pub kitchen_area: Option<f64>,
    pub land_area: Option<f64>,
    pub housing_class: Option<String>,
    pub has_furniture: bool,
    pub has_repair: bool,
    pub repair_type: Option<String>,
    pub heating: Option<String>,
    pub tech: Option<Vec<String>>,
    pub comfort: Option<Vec<String>>,
    pub comm: Option<Vec<String>>,
    pub infra: Option<Vec<String>>,
    pub is_eoselya: bool,
    pub land_type: Option<String>,
    pub house_subtype: Option<String>,
    pub location_type: Option<String>,
    pub distance_from_city_km: Option<f64>,
    pub plot_area: Option<f64>,
    pub cadastral_number: Option<String>,
    pub year_built: Option<String>,
    pub wall_type: Option<String>,
    pub bathroom_type: Option<String>,
    pub description: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub public_link: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PropertyRow> for Property {
    type Error = AppError;

    fn try_from(row: PropertyRow) -> Result<Self, Self::Error> {
        let category = PropertyCategory::from_str(&row.category).map_err(|_| {
            anyhow::anyhow!("categoria desconhecida '{}' no imóvel {}", row.category, row.id)
        })?;
        let property_type = PropertyType::from_str(&row.property_type).map_err(|_| {
            anyhow::anyhow!("tipo desconhecido '{}' no imóvel {}", row.property_type, row.id)
        })?;

        Ok(Self {
            id: row.id,
            details: PropertyDetails {
                category,
                property_type,
                price: row.price,
                district: row.district,
                address: row.address,
                owner_phone: row.owner_phone,
                floor: row.floor,
                total_floors: row.total_floors,
                rooms: row.rooms,
                total_area: row.total_area,
                kitchen_area: row.kitchen_area,
                land_area: row.land_area,
                housing_class: row.housing_class,
                has_furniture: row.has_furniture,
                has_repair: row.has_repair,
                repair_type: row.repair_type,
                heating: row.heating,
                tech: row.tech.unwrap_or_default(),
                comfort: row.comfort.unwrap_or_default(),
                comm: row.comm.unwrap_or_default(),
                infra: row.infra.unwrap_or_default(),
                is_eoselya: row.is_eoselya,
                land_type: row.land_type,
                house_subtype: row.house_subtype,
                location_type: row.location_type,
                distance_from_city_km: row.distance_from_city_km,
                plot_area: row.plot_area,
                cadastral_number: row.cadastral_number,
                year_built: row.year_built,
                wall_type: row.wall_type,
                bathroom_type: row.bathroom_type,
                description: row.description.unwrap_or_default(),
                image_urls: row.image_urls.unwrap_or_default(),
                public_link: row.public_link,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
            version: row.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn house_payload() -> PropertyPayload {
        serde_json::from_value(json!({
            "category": "houses",
            "price": 150000,
            "district": "Приморский",
            "address": "ул. Ленина 1",
            "ownerPhone": "+380501234567",
            "totalArea": 120
        }))
        .unwrap()
    }

    fn field_errors(err: AppError) -> Vec<String> {
        match err {
            AppError::ValidationError(errors) => {
                errors.field_errors().keys().map(|k| k.to_string()).collect()
            }
            other => panic!("esperava erro de validação, veio {other:?}"),
        }
    }

    #[test]
    fn payload_defaults_arrays_and_flags() {
        let details = PropertyDetails::try_from(house_payload()).unwrap();
        assert!(details.tech.is_empty());
        assert!(details.comfort.is_empty());
        assert!(details.image_urls.is_empty());
        assert!(!details.is_eoselya);
        assert_eq!(details.property_type, PropertyType::Secondary);
        assert_eq!(details.total_area, Some(120.0));
    }

    #[test]
    fn empty_district_is_rejected() {
        let payload: PropertyPayload = serde_json::from_value(json!({
            "category": "apartments",
            "price": 0,
            "district": "",
            "address": "X",
            "ownerPhone": "Y",
            "totalArea": 10
        }))
        .unwrap();

        let fields = field_errors(PropertyDetails::try_from(payload).unwrap_err());
        assert_eq!(fields, vec!["district".to_string()]);
    }

    #[test]
    fn missing_category_and_negative_price_are_reported() {
        let mut payload = house_payload();
        payload.category = None;
        payload.price = Some(-1);

        let mut fields = field_errors(PropertyDetails::try_from(payload).unwrap_err());
        fields.sort();
        assert_eq!(fields, vec!["category".to_string(), "price".to_string()]);
    }

    #[test]
    fn land_may_use_land_area_instead_of_total_area() {
        let mut payload = house_payload();
        payload.category = Some(PropertyCategory::Land);
        payload.total_area = None;
        payload.land_area = Some(6.0);
        assert!(PropertyDetails::try_from(payload.clone()).is_ok());

        payload.category = Some(PropertyCategory::Houses);
        let fields = field_errors(PropertyDetails::try_from(payload).unwrap_err());
        assert_eq!(fields, vec!["totalArea".to_string()]);
    }

    #[test]
    fn wire_names_follow_the_client_model() {
        let mut payload = house_payload();
        payload.property_type = PropertyType::NewBuild;
        payload.is_eoselya = true;
        let property = Property::new(PropertyDetails::try_from(payload).unwrap());

        let value = serde_json::to_value(&property).unwrap();
        assert_eq!(value["type"], "New Build");
        assert_eq!(value["isEOselya"], true);
        assert_eq!(value["ownerPhone"], "+380501234567");
        assert_eq!(value["version"], 1);
        assert!(value["publicLink"].is_null());
    }

    #[test]
    fn both_spellings_of_new_build_are_accepted() {
        let a: PropertyType = serde_json::from_value(json!("New Build")).unwrap();
        let b: PropertyType = serde_json::from_value(json!("NewBuild")).unwrap();
        assert_eq!(a, PropertyType::NewBuild);
        assert_eq!(b, PropertyType::NewBuild);
        assert_eq!(PropertyType::from_str("NewBuild").unwrap(), PropertyType::NewBuild);
        assert_eq!(PropertyType::NewBuild.as_ref(), "New Build");
    }

    #[test]
    fn legacy_records_without_server_fields_still_load() {
        let property: Property = serde_json::from_value(json!({
            "id": "1718000000000",
            "category": "land",
            "type": "Secondary",
            "price": 9000,
            "district": "Киевский",
            "address": "Фонтанская дорога",
            "ownerPhone": "+380000000000",
            "landArea": 6
        }))
        .unwrap();

        assert_eq!(property.id, "1718000000000");
        assert_eq!(property.version, 1);
        assert!(property.details.infra.is_empty());
    }

    #[test]
    fn row_mapping_defaults_null_arrays() {
        let now = Utc::now();
        let row = PropertyRow {
            id: "abc".into(),
            category: "apartments".into(),
            property_type: "New Build".into(),
            price: 50000,
            district: "Суворовский".into(),
            address: "пр. Добровольского 100".into(),
            owner_phone: "+380671112233".into(),
            floor: Some(3),
            total_floors: Some(9),
            rooms: Some("2".into()),
            total_area: Some(54.5),
            kitchen_area: Some(9.0),
            land_area: None,
            housing_class: None,
            has_furniture: true,
            has_repair: false,
            repair_type: None,
            heating: None,
            tech: None,
            comfort: Some(vec!["Балкон".into()]),
            comm: None,
            infra: None,
            is_eoselya: true,
            land_type: None,
            house_subtype: None,
            location_type: None,
            distance_from_city_km: None,
            plot_area: None,
            cadastral_number: None,
            year_built: None,
            wall_type: None,
            bathroom_type: None,
            description: None,
            image_urls: None,
            public_link: None,
            version: 3,
            created_at: now,
            updated_at: now,
        };

        let property = Property::try_from(row).unwrap();
        assert_eq!(property.details.category, PropertyCategory::Apartments);
        assert_eq!(property.details.property_type, PropertyType::NewBuild);
        assert!(property.details.tech.is_empty());
        assert_eq!(property.details.comfort, vec!["Балкон".to_string()]);
        assert_eq!(property.details.description, "");
        assert_eq!(property.version, 3);
    }
}
