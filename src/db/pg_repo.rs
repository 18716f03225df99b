// src/db/pg_repo.rs

use async_trait::async_trait;
use sqlx::{postgres::PgArguments, query::QueryAs, PgPool, Postgres};

use crate::{
    common::error::AppError,
    db::repository::{CustomOptionsRepository, PropertyRepository},
    models::{
        custom_options::{CustomOptions, CustomOptionsRow},
        property::{Property, PropertyDetails, PropertyRow},
    },
};

type PropertyQuery<'q> = QueryAs<'q, Postgres, PropertyRow, PgArguments>;

// Liga os 34 campos do cliente, na ordem das colunas, a partir de `$2`.
// `$1` é sempre o id.
fn bind_details<'q>(query: PropertyQuery<'q>, d: &'q PropertyDetails) -> PropertyQuery<'q> {
    query
        .bind(d.category.as_ref())
        .bind(d.property_type.as_ref())
        .bind(d.price)
        .bind(&d.district)
        .bind(&d.address)
        .bind(&d.owner_phone)
        .bind(d.floor)
        .bind(d.total_floors)
        .bind(&d.rooms)
        .bind(d.total_area)
        .bind(d.kitchen_area)
        .bind(d.land_area)
        .bind(&d.housing_class)
        .bind(d.has_furniture)
        .bind(d.has_repair)
        .bind(&d.repair_type)
        .bind(&d.heating)
        .bind(d.tech.as_slice())
        .bind(d.comfort.as_slice())
        .bind(d.comm.as_slice())
        .bind(d.infra.as_slice())
        .bind(d.is_eoselya)
        .bind(&d.land_type)
        .bind(&d.house_subtype)
        .bind(&d.location_type)
        .bind(d.distance_from_city_km)
        .bind(d.plot_area)
        .bind(&d.cadastral_number)
        .bind(&d.year_built)
        .bind(&d.wall_type)
        .bind(&d.bathroom_type)
        .bind(&d.description)
        .bind(d.image_urls.as_slice())
        .bind(&d.public_link)
}

/// Backend PostgreSQL: uma tabela `properties` e uma `custom_options` de
/// linha única (id fixo = 1).
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_version(&self, id: &str) -> Result<Option<i32>, AppError> {
        let version = sqlx::query_scalar::<_, i32>("SELECT version FROM properties WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(version)
    }
}

#[async_trait]
impl PropertyRepository for PgRepository {
    async fn list(&self) -> Result<Vec<Property>, AppError> {
        let rows = sqlx::query_as::<_, PropertyRow>(
            "SELECT * FROM properties ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Property::try_from).collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Property>, AppError> {
        let row = sqlx::query_as::<_, PropertyRow>("SELECT * FROM properties WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Property::try_from).transpose()
    }

    async fn insert(&self, property: Property) -> Result<Property, AppError> {
        let query = sqlx::query_as::<_, PropertyRow>(
            r#"
            INSERT INTO properties (
                id, category, type, price, district, address, owner_phone, floor, total_floors,
                rooms, total_area, kitchen_area, land_area, housing_class, has_furniture,
                has_repair, repair_type, heating, tech, comfort, comm, infra, is_eoselya,
                land_type, house_subtype, location_type, distance_from_city_km, plot_area,
                cadastral_number, year_built, wall_type, bathroom_type, description,
                image_urls, public_link, version, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30,
                $31, $32, $33, $34, $35, $36, $37, $38
            )
            RETURNING *
            "#,
        )
        .bind(&property.id);

        let row = bind_details(query, &property.details)
            .bind(property.version)
            .bind(property.created_at)
            .bind(property.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Property::try_from(row)
    }

    async fn replace(
        &self,
        id: &str,
        details: PropertyDetails,
        expected_version: Option<i32>,
    ) -> Result<Property, AppError> {
        // A checagem de versão vai no próprio WHERE: o UPDATE é atômico.
        let query = sqlx::query_as::<_, PropertyRow>(
            r#"
            UPDATE properties SET
                category = $2, type = $3, price = $4, district = $5, address = $6,
                owner_phone = $7, floor = $8, total_floors = $9, rooms = $10, total_area = $11,
                kitchen_area = $12, land_area = $13, housing_class = $14, has_furniture = $15,
                has_repair = $16, repair_type = $17, heating = $18, tech = $19, comfort = $20,
                comm = $21, infra = $22, is_eoselya = $23, land_type = $24, house_subtype = $25,
                location_type = $26, distance_from_city_km = $27, plot_area = $28,
                cadastral_number = $29, year_built = $30, wall_type = $31, bathroom_type = $32,
                description = $33, image_urls = $34, public_link = $35,
                version = version + 1, updated_at = NOW()
            WHERE id = $1 AND ($36::INTEGER IS NULL OR version = $36)
            RETURNING *
            "#,
        )
        .bind(id);

        let row = bind_details(query, &details)
            .bind(expected_version)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Property::try_from(row),
            // Nenhuma linha: ou o id não existe, ou a versão não bateu.
            None => match (self.current_version(id).await?, expected_version) {
                (Some(actual), Some(expected)) => {
                    Err(AppError::VersionConflict { expected, actual })
                }
                _ => Err(AppError::PropertyNotFound),
            },
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_public_link_if_absent(
        &self,
        id: &str,
        link: &str,
    ) -> Result<Option<Property>, AppError> {
        let updated = sqlx::query_as::<_, PropertyRow>(
            r#"
            UPDATE properties
            SET public_link = $2, version = version + 1, updated_at = NOW()
            WHERE id = $1 AND public_link IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(link)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(row) => Property::try_from(row).map(Some),
            None => self.find_by_id(id).await,
        }
    }
}

#[async_trait]
impl CustomOptionsRepository for PgRepository {
    async fn get(&self) -> Result<Option<CustomOptions>, AppError> {
        let row = sqlx::query_as::<_, CustomOptionsRow>(
            r#"
            SELECT districts, housing_classes, repair_types, heating_options, year_built_options,
                   wall_type_options, bathroom_options, tech_options, comfort_options,
                   comm_options, infra_options, updated_at
            FROM custom_options
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CustomOptions::from))
    }

    async fn replace(&self, options: CustomOptions) -> Result<CustomOptions, AppError> {
        // UPSERT (Insert or Update) numa linha fixa
        let row = sqlx::query_as::<_, CustomOptionsRow>(
            r#"
            INSERT INTO custom_options (
                id, districts, housing_classes, repair_types, heating_options, year_built_options,
                wall_type_options, bathroom_options, tech_options, comfort_options,
                comm_options, infra_options, updated_at
            )
            VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW())
            ON CONFLICT (id)
            DO UPDATE SET
                districts = EXCLUDED.districts,
                housing_classes = EXCLUDED.housing_classes,
                repair_types = EXCLUDED.repair_types,
                heating_options = EXCLUDED.heating_options,
                year_built_options = EXCLUDED.year_built_options,
                wall_type_options = EXCLUDED.wall_type_options,
                bathroom_options = EXCLUDED.bathroom_options,
                tech_options = EXCLUDED.tech_options,
                comfort_options = EXCLUDED.comfort_options,
                comm_options = EXCLUDED.comm_options,
                infra_options = EXCLUDED.infra_options,
                updated_at = NOW()
            RETURNING districts, housing_classes, repair_types, heating_options, year_built_options,
                      wall_type_options, bathroom_options, tech_options, comfort_options,
                      comm_options, infra_options, updated_at
            "#,
        )
        .bind(&options.districts)
        .bind(&options.housing_classes)
        .bind(&options.repair_types)
        .bind(&options.heating_options)
        .bind(&options.year_built_options)
        .bind(&options.wall_type_options)
        .bind(&options.bathroom_options)
        .bind(&options.tech_options)
        .bind(&options.comfort_options)
        .bind(&options.comm_options)
        .bind(&options.infra_options)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}
