//! Property repository

use crate::domain::{
    Property, PropertyAggregate, PropertyFeature, PropertyFilter, PropertyImage, StringUuid,
};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, QueryBuilder};
use std::collections::HashMap;

const PROPERTY_COLUMNS: &str = "id, title, description, property_type, price, address, city, state, \
     zip_code, country, latitude, longitude, bedrooms, bathrooms, square_feet, year_built, \
     is_available, created_at, updated_at, broker_id";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<PropertyAggregate>>;
    /// Newest first
    async fn list(
        &self,
        filter: &PropertyFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PropertyAggregate>>;
    async fn count(&self, filter: &PropertyFilter) -> Result<i64>;
    /// Insert the property, its images and its features atomically
    async fn create(&self, aggregate: &PropertyAggregate) -> Result<()>;
    /// Overwrite the property row and replace its images and features atomically
    async fn update(&self, aggregate: &PropertyAggregate) -> Result<()>;
    /// Remove the property with its images and features atomically
    async fn delete(&self, id: StringUuid) -> Result<()>;
}

pub struct PropertyRepositoryImpl {
    pool: MySqlPool,
}

impl PropertyRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn load_children(&self, properties: Vec<Property>) -> Result<Vec<PropertyAggregate>> {
        if properties.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<StringUuid> = properties.iter().map(|p| p.id).collect();

        let mut qb: QueryBuilder<MySql> = QueryBuilder::new(
            "SELECT id, property_id, image_url, description, is_primary, display_order, created_at \
             FROM property_images WHERE property_id IN (",
        );
        push_id_list(&mut qb, &ids);
        qb.push(" ORDER BY display_order");
        let images = qb.build_query_as::<PropertyImage>().fetch_all(&self.pool).await?;

        let mut qb: QueryBuilder<MySql> = QueryBuilder::new(
            "SELECT id, property_id, name, description, created_at \
             FROM property_features WHERE property_id IN (",
        );
        push_id_list(&mut qb, &ids);
        qb.push(" ORDER BY created_at, name");
        let features = qb
            .build_query_as::<PropertyFeature>()
            .fetch_all(&self.pool)
            .await?;

        let mut images_by_property: HashMap<StringUuid, Vec<PropertyImage>> = HashMap::new();
        for image in images {
            images_by_property.entry(image.property_id).or_default().push(image);
        }
        let mut features_by_property: HashMap<StringUuid, Vec<PropertyFeature>> = HashMap::new();
        for feature in features {
            features_by_property
                .entry(feature.property_id)
                .or_default()
                .push(feature);
        }

        Ok(properties
            .into_iter()
            .map(|property| PropertyAggregate {
                images: images_by_property.remove(&property.id).unwrap_or_default(),
                features: features_by_property.remove(&property.id).unwrap_or_default(),
                property,
            })
            .collect())
    }
}

fn push_id_list(qb: &mut QueryBuilder<'_, MySql>, ids: &[StringUuid]) {
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Append `WHERE` predicates for every populated filter field.
fn push_filter(qb: &mut QueryBuilder<'_, MySql>, filter: &PropertyFilter) {
    qb.push(" WHERE 1 = 1");

    if let Some(broker_id) = filter.broker_id {
        qb.push(" AND broker_id = ").push_bind(broker_id);
    }
    if let Some(city) = &filter.city {
        qb.push(" AND LOWER(city) LIKE ")
            .push_bind(format!("%{}%", escape_like(&city.to_lowercase())));
    }
    if let Some(state) = &filter.state {
        qb.push(" AND LOWER(state) LIKE ")
            .push_bind(format!("%{}%", escape_like(&state.to_lowercase())));
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND price <= ").push_bind(max);
    }
    if let Some(property_type) = filter.property_type {
        qb.push(" AND property_type = ").push_bind(property_type);
    }
    if let Some(min) = filter.min_bedrooms {
        qb.push(" AND bedrooms >= ").push_bind(min);
    }
    if let Some(max) = filter.max_bedrooms {
        qb.push(" AND bedrooms <= ").push_bind(max);
    }
    if let Some(min) = filter.min_bathrooms {
        qb.push(" AND bathrooms >= ").push_bind(min);
    }
    if let Some(max) = filter.max_bathrooms {
        qb.push(" AND bathrooms <= ").push_bind(max);
    }
    if let Some(min) = filter.min_square_feet {
        qb.push(" AND square_feet >= ").push_bind(min);
    }
    if let Some(max) = filter.max_square_feet {
        qb.push(" AND square_feet <= ").push_bind(max);
    }
    if let Some(available) = filter.is_available {
        qb.push(" AND is_available = ").push_bind(available);
    }
}

async fn insert_children(
    tx: &mut sqlx::Transaction<'_, MySql>,
    aggregate: &PropertyAggregate,
) -> Result<()> {
    for image in &aggregate.images {
        sqlx::query(
            r#"
            INSERT INTO property_images (id, property_id, image_url, description, is_primary, display_order, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(image.id)
        .bind(image.property_id)
        .bind(&image.image_url)
        .bind(&image.description)
        .bind(image.is_primary)
        .bind(image.display_order)
        .bind(image.created_at)
        .execute(&mut **tx)
        .await?;
    }

    for feature in &aggregate.features {
        sqlx::query(
            r#"
            INSERT INTO property_features (id, property_id, name, description, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(feature.id)
        .bind(feature.property_id)
        .bind(&feature.name)
        .bind(&feature.description)
        .bind(feature.created_at)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

async fn delete_children(tx: &mut sqlx::Transaction<'_, MySql>, id: StringUuid) -> Result<()> {
    sqlx::query("DELETE FROM property_images WHERE property_id = ?")
        .bind(id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM property_features WHERE property_id = ?")
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[async_trait]
impl PropertyRepository for PropertyRepositoryImpl {
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<PropertyAggregate>> {
        let property = sqlx::query_as::<_, Property>(&format!(
            "SELECT {} FROM properties WHERE id = ?",
            PROPERTY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match property {
            Some(p) => Ok(self.load_children(vec![p]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        filter: &PropertyFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PropertyAggregate>> {
        let mut qb: QueryBuilder<MySql> =
            QueryBuilder::new(format!("SELECT {} FROM properties", PROPERTY_COLUMNS));
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let properties = qb.build_query_as::<Property>().fetch_all(&self.pool).await?;
        self.load_children(properties).await
    }

    async fn count(&self, filter: &PropertyFilter) -> Result<i64> {
        let mut qb: QueryBuilder<MySql> = QueryBuilder::new("SELECT COUNT(*) FROM properties");
        push_filter(&mut qb, filter);

        let count = qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, aggregate: &PropertyAggregate) -> Result<()> {
        let p = &aggregate.property;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO properties (id, title, description, property_type, price, address, city, state,
                zip_code, country, latitude, longitude, bedrooms, bathrooms, square_feet, year_built,
                is_available, created_at, updated_at, broker_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(p.id)
        .bind(&p.title)
        .bind(&p.description)
        .bind(p.property_type)
        .bind(p.price)
        .bind(&p.address)
        .bind(&p.city)
        .bind(&p.state)
        .bind(&p.zip_code)
        .bind(&p.country)
        .bind(p.latitude)
        .bind(p.longitude)
        .bind(p.bedrooms)
        .bind(p.bathrooms)
        .bind(p.square_feet)
        .bind(p.year_built)
        .bind(p.is_available)
        .bind(p.created_at)
        .bind(p.updated_at)
        .bind(p.broker_id)
        .execute(&mut *tx)
        .await?;

        insert_children(&mut tx, aggregate).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update(&self, aggregate: &PropertyAggregate) -> Result<()> {
        let p = &aggregate.property;
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE properties
            SET title = ?, description = ?, property_type = ?, price = ?, address = ?, city = ?,
                state = ?, zip_code = ?, country = ?, latitude = ?, longitude = ?, bedrooms = ?,
                bathrooms = ?, square_feet = ?, year_built = ?, is_available = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&p.title)
        .bind(&p.description)
        .bind(p.property_type)
        .bind(p.price)
        .bind(&p.address)
        .bind(&p.city)
        .bind(&p.state)
        .bind(&p.zip_code)
        .bind(&p.country)
        .bind(p.latitude)
        .bind(p.longitude)
        .bind(p.bedrooms)
        .bind(p.bathrooms)
        .bind(p.square_feet)
        .bind(p.year_built)
        .bind(p.is_available)
        .bind(p.updated_at)
        .bind(p.id)
        .execute(&mut *tx)
        .await?;

        // Row removed since the ownership check
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Property not found".to_string()));
        }

        delete_children(&mut tx, p.id).await?;
        insert_children(&mut tx, aggregate).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: StringUuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        delete_children(&mut tx, id).await?;
        sqlx::query("DELETE FROM properties WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
