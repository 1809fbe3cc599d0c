//! Assets repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::asset::{Asset, AssetKind, AssetQuery, CreateAsset, UpdateAsset},
};

#[derive(Clone)]
pub struct AssetsRepository {
    pool: Pool<Postgres>,
}

impl AssetsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Search assets of one tenant with pagination
    pub async fn search(&self, company_id: Uuid, query: &AssetQuery) -> AppResult<(Vec<Asset>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let mut conditions = vec!["company_id = $1".to_string()];
        let mut idx = 2;

        if query.search.is_some() {
            conditions.push(format!("(name ILIKE ${i} OR code ILIKE ${i})", i = idx));
            idx += 1;
        }
        if query.city.is_some() {
            conditions.push(format!("city = ${}", idx));
            idx += 1;
        }
        if query.kind.is_some() {
            conditions.push(format!("kind = ${}", idx));
            idx += 1;
        }
        if query.is_active.is_some() {
            conditions.push(format!("is_active = ${}", idx));
        }

        let where_clause = conditions.join(" AND ");
        let search_term = query.search.as_ref().map(|s| format!("%{}%", s));

        let count_query = format!("SELECT COUNT(*) FROM assets WHERE {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query).bind(company_id);
        if let Some(ref term) = search_term {
            count_builder = count_builder.bind(term);
        }
        if let Some(ref city) = query.city {
            count_builder = count_builder.bind(city);
        }
        if let Some(kind) = query.kind {
            count_builder = count_builder.bind(kind);
        }
        if let Some(is_active) = query.is_active {
            count_builder = count_builder.bind(is_active);
        }
        let total: i64 = count_builder.fetch_one(&self.pool).await?;

        let select_query = format!(
            "SELECT * FROM assets WHERE {} ORDER BY code LIMIT {} OFFSET {}",
            where_clause, per_page, offset
        );
        let mut builder = sqlx::query_as::<_, Asset>(&select_query).bind(company_id);
        if let Some(ref term) = search_term {
            builder = builder.bind(term);
        }
        if let Some(ref city) = query.city {
            builder = builder.bind(city);
        }
        if let Some(kind) = query.kind {
            builder = builder.bind(kind);
        }
        if let Some(is_active) = query.is_active {
            builder = builder.bind(is_active);
        }

        let assets = builder.fetch_all(&self.pool).await?;
        Ok((assets, total))
    }

    /// Get asset by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Asset> {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset {} not found", id)))
    }

    /// Create an asset
    pub async fn create(&self, company_id: Uuid, data: &CreateAsset) -> AppResult<Asset> {
        let row = sqlx::query_as::<_, Asset>(
            r#"
            INSERT INTO assets (company_id, code, name, kind, address, city,
                                latitude, longitude, street_view_url, location_url, monthly_rate)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(&data.code)
        .bind(&data.name)
        .bind(data.kind.unwrap_or(AssetKind::Billboard))
        .bind(&data.address)
        .bind(&data.city)
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(&data.street_view_url)
        .bind(&data.location_url)
        .bind(data.monthly_rate)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(format!("Asset code {} already exists", data.code))
            }
            _ => AppError::Database(e),
        })?;
        Ok(row)
    }

    /// Update an asset
    pub async fn update(&self, id: Uuid, data: &UpdateAsset) -> AppResult<Asset> {
        let now = Utc::now();
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.code, "code");
        add_field!(data.name, "name");
        add_field!(data.kind, "kind");
        add_field!(data.address, "address");
        add_field!(data.city, "city");
        add_field!(data.latitude, "latitude");
        add_field!(data.longitude, "longitude");
        add_field!(data.street_view_url, "street_view_url");
        add_field!(data.location_url, "location_url");
        add_field!(data.monthly_rate, "monthly_rate");
        add_field!(data.is_active, "is_active");

        let query = format!(
            "UPDATE assets SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Asset>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.code);
        bind_field!(data.name);
        bind_field!(data.kind);
        bind_field!(data.address);
        bind_field!(data.city);
        bind_field!(data.latitude);
        bind_field!(data.longitude);
        bind_field!(data.street_view_url);
        bind_field!(data.location_url);
        bind_field!(data.monthly_rate);
        bind_field!(data.is_active);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset {} not found", id)))
    }

    /// Delete an asset
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Asset {} not found", id)));
        }
        Ok(())
    }

    /// Active assets eligible for QR generation: whole scope when `force`,
    /// otherwise only those still missing a QR URL
    pub async fn list_qr_eligible(
        &self,
        company_id: Option<Uuid>,
        force: bool,
    ) -> AppResult<Vec<Asset>> {
        let mut conditions = vec!["is_active = TRUE".to_string()];
        if company_id.is_some() {
            conditions.push("company_id = $1".to_string());
        }
        if !force {
            conditions.push("qr_code_url IS NULL".to_string());
        }

        let query = format!(
            "SELECT * FROM assets WHERE {} ORDER BY code",
            conditions.join(" AND ")
        );

        let mut builder = sqlx::query_as::<_, Asset>(&query);
        if let Some(cid) = company_id {
            builder = builder.bind(cid);
        }

        let assets = builder.fetch_all(&self.pool).await?;
        Ok(assets)
    }

    /// Write the generated QR URL back onto the asset row
    pub async fn set_qr_code_url(&self, id: Uuid, url: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE assets SET qr_code_url = $1, qr_generated_at = $2 WHERE id = $3",
        )
        .bind(url)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Asset {} not found", id)));
        }
        Ok(())
    }
}
