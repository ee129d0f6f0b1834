//! Property listing business logic

use crate::domain::{
    build_features, build_images, clamp_page, CreatePropertyInput, PagedResult, Property,
    PropertyAggregate, PropertyDto, PropertyFilter, PropertyListItem, PropertySearchCriteria,
    StringUuid, UpdatePropertyInput, UserDto,
};
use crate::error::{AppError, Result};
use crate::policy;
use crate::repository::{PropertyRepository, UserRepository};
use crate::telemetry::metrics::record_property_mutation;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

pub struct PropertyService<P: PropertyRepository, U: UserRepository> {
    repo: Arc<P>,
    user_repo: Arc<U>,
}

impl<P: PropertyRepository, U: UserRepository> PropertyService<P, U> {
    pub fn new(repo: Arc<P>, user_repo: Arc<U>) -> Self {
        Self { repo, user_repo }
    }

    pub async fn get_by_id(&self, id: StringUuid) -> Result<Option<PropertyDto>> {
        let Some(aggregate) = self.repo.find_by_id(id).await? else {
            return Ok(None);
        };
        let broker = self.broker_view(aggregate.property.broker_id).await?;
        Ok(Some(PropertyDto::new(&aggregate, broker)))
    }

    /// Available listings, newest first
    pub async fn get_all(
        &self,
        page_number: i64,
        page_size: i64,
    ) -> Result<PagedResult<PropertyListItem>> {
        self.page(&PropertyFilter::available(), page_number, page_size)
            .await
    }

    /// Every listing of one broker regardless of availability
    pub async fn get_by_broker(
        &self,
        broker_id: StringUuid,
        page_number: i64,
        page_size: i64,
    ) -> Result<PagedResult<PropertyListItem>> {
        self.page(&PropertyFilter::by_broker(broker_id), page_number, page_size)
            .await
    }

    pub async fn search(
        &self,
        criteria: &PropertySearchCriteria,
    ) -> Result<PagedResult<PropertyListItem>> {
        let filter = PropertyFilter::from(criteria);
        self.page(&filter, criteria.page_number, criteria.page_size)
            .await
    }

    pub async fn create(
        &self,
        input: CreatePropertyInput,
        broker_id: StringUuid,
    ) -> Result<PropertyDto> {
        input.validate()?;

        let now = Utc::now();
        let id = StringUuid::new_v4();
        let aggregate = PropertyAggregate {
            images: build_images(id, &input.image_urls, now),
            features: build_features(id, &input.features, now),
            property: Property {
                id,
                title: input.title,
                description: input.description,
                property_type: input.property_type,
                price: input.price,
                address: input.address,
                city: input.city,
                state: input.state,
                zip_code: input.zip_code,
                country: input.country,
                latitude: input.latitude,
                longitude: input.longitude,
                bedrooms: input.bedrooms,
                bathrooms: input.bathrooms,
                square_feet: input.square_feet,
                year_built: input.year_built,
                is_available: true,
                created_at: now,
                updated_at: None,
                broker_id,
            },
        };

        self.repo.create(&aggregate).await?;
        info!(property_id = %id, broker_id = %broker_id, "Property created");
        record_property_mutation("create");

        let broker = self.broker_view(broker_id).await?;
        Ok(PropertyDto::new(&aggregate, broker))
    }

    /// Full replace of the listing's descriptive fields, images and features.
    pub async fn update(
        &self,
        input: UpdatePropertyInput,
        broker_id: StringUuid,
    ) -> Result<PropertyDto> {
        input.validate()?;

        let existing = self.owned(input.id, broker_id).await?;

        let now = Utc::now();
        let id = existing.property.id;
        let aggregate = PropertyAggregate {
            images: build_images(id, &input.image_urls, now),
            features: build_features(id, &input.features, now),
            property: Property {
                title: input.title,
                description: input.description,
                property_type: input.property_type,
                price: input.price,
                address: input.address,
                city: input.city,
                state: input.state,
                zip_code: input.zip_code,
                country: input.country,
                latitude: input.latitude,
                longitude: input.longitude,
                bedrooms: input.bedrooms,
                bathrooms: input.bathrooms,
                square_feet: input.square_feet,
                year_built: input.year_built,
                is_available: input.is_available,
                updated_at: Some(now),
                ..existing.property
            },
        };

        self.repo.update(&aggregate).await?;
        info!(property_id = %id, "Property updated");
        record_property_mutation("update");

        let broker = self.broker_view(broker_id).await?;
        Ok(PropertyDto::new(&aggregate, broker))
    }

    pub async fn delete(&self, id: StringUuid, broker_id: StringUuid) -> Result<()> {
        self.owned(id, broker_id).await?;

        self.repo.delete(id).await?;
        info!(property_id = %id, "Property deleted");
        record_property_mutation("delete");
        Ok(())
    }

    async fn owned(&self, id: StringUuid, broker_id: StringUuid) -> Result<PropertyAggregate> {
        let existing = self.repo.find_by_id(id).await?;
        policy::ensure_owner(existing, broker_id).inspect_err(|e| {
            if matches!(e, AppError::Forbidden(_)) {
                warn!(property_id = %id, caller = %broker_id, "Rejected write by non-owner");
            }
        })
    }

    async fn page(
        &self,
        filter: &PropertyFilter,
        page_number: i64,
        page_size: i64,
    ) -> Result<PagedResult<PropertyListItem>> {
        let (page_number, page_size) = clamp_page(page_number, page_size);
        let total_count = self.repo.count(filter).await?;
        let aggregates = match PagedResult::<PropertyListItem>::offset(page_number, page_size) {
            Some(offset) => self.repo.list(filter, offset, page_size).await?,
            None => Vec::new(),
        };
        let brokers = self.broker_views(&aggregates).await?;

        let items = aggregates
            .iter()
            .map(|a| PropertyListItem::new(a, brokers.get(&a.property.broker_id).cloned()))
            .collect();

        Ok(PagedResult::new(items, total_count, page_number, page_size))
    }

    async fn broker_view(&self, broker_id: StringUuid) -> Result<Option<UserDto>> {
        Ok(self
            .user_repo
            .find_by_id(broker_id)
            .await?
            .map(UserDto::from))
    }

    async fn broker_views(
        &self,
        aggregates: &[PropertyAggregate],
    ) -> Result<HashMap<StringUuid, UserDto>> {
        let mut ids: Vec<StringUuid> = aggregates.iter().map(|a| a.property.broker_id).collect();
        ids.sort_by_key(|id| id.0);
        ids.dedup();

        let users = self.user_repo.find_by_ids(&ids).await?;
        Ok(users.into_iter().map(|u| (u.id, UserDto::from(u))).collect())
    }
}
