//! Property listing domain model

use super::common::StringUuid;
use super::user::UserDto;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum PropertyType {
    House,
    Apartment,
    Condo,
    Townhouse,
    Villa,
    Studio,
    Duplex,
    Commercial,
    Land,
}

impl PropertyType {
    pub const ALL: [PropertyType; 9] = [
        PropertyType::House,
        PropertyType::Apartment,
        PropertyType::Condo,
        PropertyType::Townhouse,
        PropertyType::Villa,
        PropertyType::Studio,
        PropertyType::Duplex,
        PropertyType::Commercial,
        PropertyType::Land,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::House => "House",
            PropertyType::Apartment => "Apartment",
            PropertyType::Condo => "Condo",
            PropertyType::Townhouse => "Townhouse",
            PropertyType::Villa => "Villa",
            PropertyType::Studio => "Studio",
            PropertyType::Duplex => "Duplex",
            PropertyType::Commercial => "Commercial",
            PropertyType::Land => "Land",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown property type: {}", s))
    }
}

impl sqlx::Type<sqlx::MySql> for PropertyType {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for PropertyType {
    fn decode(value: sqlx::mysql::MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::MySql>>::decode(value)?;
        s.parse::<PropertyType>().map_err(Into::into)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::MySql> for PropertyType {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<u8>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <String as sqlx::Encode<sqlx::MySql>>::encode_by_ref(&self.as_str().to_string(), buf)
    }
}

/// Property entity (row of `properties`)
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Property {
    pub id: StringUuid,
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub price: f64,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub square_feet: i32,
    pub year_built: i32,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Owning broker; never changes after creation
    pub broker_id: StringUuid,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct PropertyImage {
    pub id: StringUuid,
    pub property_id: StringUuid,
    pub image_url: String,
    pub description: String,
    pub is_primary: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct PropertyFeature {
    pub id: StringUuid,
    pub property_id: StringUuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A property together with the images and features it owns.
///
/// Images are kept sorted by `display_order`.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAggregate {
    pub property: Property,
    pub images: Vec<PropertyImage>,
    pub features: Vec<PropertyFeature>,
}

impl PropertyAggregate {
    /// URL of the primary image, else the first image, else empty.
    pub fn primary_image_url(&self) -> String {
        self.images
            .iter()
            .find(|i| i.is_primary)
            .or_else(|| self.images.first())
            .map(|i| i.image_url.clone())
            .unwrap_or_default()
    }
}

/// Build image rows from an ordered URL list: the first is primary and
/// display order starts at 1.
pub fn build_images(
    property_id: StringUuid,
    image_urls: &[String],
    now: DateTime<Utc>,
) -> Vec<PropertyImage> {
    image_urls
        .iter()
        .enumerate()
        .map(|(index, url)| PropertyImage {
            id: StringUuid::new_v4(),
            property_id,
            image_url: url.clone(),
            description: String::new(),
            is_primary: index == 0,
            display_order: index as i32 + 1,
            created_at: now,
        })
        .collect()
}

pub fn build_features(
    property_id: StringUuid,
    features: &[PropertyFeatureDto],
    now: DateTime<Utc>,
) -> Vec<PropertyFeature> {
    features
        .iter()
        .map(|f| PropertyFeature {
            id: StringUuid::new_v4(),
            property_id,
            name: f.name.clone(),
            description: f.description.clone(),
            created_at: now,
        })
        .collect()
}

// ============================================================================
// Inputs
// ============================================================================

/// Feature name/description pair, used both as input and output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFeatureDto {
    #[validate(length(min = 1, max = 100, message = "Feature name is required and cannot exceed 100 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 500, message = "Feature description cannot exceed 500 characters"))]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyInput {
    #[validate(length(min = 1, max = 200, message = "Title is required and cannot exceed 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "Description is required and cannot exceed 2000 characters"))]
    pub description: String,
    pub property_type: PropertyType,
    #[validate(range(exclusive_min = 0.0, message = "Price must be greater than 0"))]
    pub price: f64,
    #[validate(length(min = 1, max = 300, message = "Address is required and cannot exceed 300 characters"))]
    pub address: String,
    #[validate(length(min = 1, max = 100, message = "City is required and cannot exceed 100 characters"))]
    pub city: String,
    #[validate(length(min = 1, max = 100, message = "State is required and cannot exceed 100 characters"))]
    pub state: String,
    #[validate(length(min = 1, max = 20, message = "Zip code is required and cannot exceed 20 characters"))]
    pub zip_code: String,
    #[validate(length(min = 1, max = 100, message = "Country is required and cannot exceed 100 characters"))]
    pub country: String,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: f64,
    #[validate(range(min = 0, message = "Bedrooms must be 0 or greater"))]
    pub bedrooms: i32,
    #[validate(range(min = 0, message = "Bathrooms must be 0 or greater"))]
    pub bathrooms: i32,
    #[validate(range(min = 1, message = "Square feet must be greater than 0"))]
    pub square_feet: i32,
    #[validate(custom(function = "validate_year_built"))]
    pub year_built: i32,
    #[validate(custom(function = "validate_image_urls"))]
    pub image_urls: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub features: Vec<PropertyFeatureDto>,
}

/// Full-replace update payload. `id` must match the path id.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyInput {
    #[schema(value_type = String, format = Uuid)]
    #[validate(custom(function = "validate_property_id"))]
    pub id: StringUuid,
    #[validate(length(min = 1, max = 200, message = "Title is required and cannot exceed 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "Description is required and cannot exceed 2000 characters"))]
    pub description: String,
    pub property_type: PropertyType,
    #[validate(range(exclusive_min = 0.0, message = "Price must be greater than 0"))]
    pub price: f64,
    #[validate(length(min = 1, max = 300, message = "Address is required and cannot exceed 300 characters"))]
    pub address: String,
    #[validate(length(min = 1, max = 100, message = "City is required and cannot exceed 100 characters"))]
    pub city: String,
    #[validate(length(min = 1, max = 100, message = "State is required and cannot exceed 100 characters"))]
    pub state: String,
    #[validate(length(min = 1, max = 20, message = "Zip code is required and cannot exceed 20 characters"))]
    pub zip_code: String,
    #[validate(length(min = 1, max = 100, message = "Country is required and cannot exceed 100 characters"))]
    pub country: String,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: f64,
    #[validate(range(min = 0, message = "Bedrooms must be 0 or greater"))]
    pub bedrooms: i32,
    #[validate(range(min = 0, message = "Bathrooms must be 0 or greater"))]
    pub bathrooms: i32,
    #[validate(range(min = 1, message = "Square feet must be greater than 0"))]
    pub square_feet: i32,
    #[validate(custom(function = "validate_year_built"))]
    pub year_built: i32,
    pub is_available: bool,
    #[validate(custom(function = "validate_image_urls"))]
    pub image_urls: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub features: Vec<PropertyFeatureDto>,
}

fn validate_year_built(year: i32) -> Result<(), ValidationError> {
    let max_year = Utc::now().year() + 5;
    if year <= 1800 {
        return Err(ValidationError::new("year_built_min")
            .with_message("Year built must be greater than 1800".into()));
    }
    if year > max_year {
        return Err(ValidationError::new("year_built_max")
            .with_message("Year built cannot be more than 5 years in the future".into()));
    }
    Ok(())
}

fn validate_image_urls(urls: &[String]) -> Result<(), ValidationError> {
    if urls.is_empty() {
        return Err(ValidationError::new("image_urls_required")
            .with_message("At least one image is required".into()));
    }
    // url::Url only parses absolute URLs
    if urls.iter().any(|u| url::Url::parse(u).is_err()) {
        return Err(ValidationError::new("image_url_invalid")
            .with_message("Image URL must be a valid URL".into()));
    }
    Ok(())
}

fn validate_property_id(id: &StringUuid) -> Result<(), ValidationError> {
    if id.is_nil() {
        return Err(ValidationError::new("id_required")
            .with_message("Property ID is required".into()));
    }
    Ok(())
}

// ============================================================================
// Search
// ============================================================================

pub const DEFAULT_PAGE_SIZE: i64 = 10;

pub fn default_page_number() -> i64 {
    1
}

pub fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Search request body. Every filter is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertySearchCriteria {
    pub city: Option<String>,
    pub state: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Type name; unrecognised names impose no constraint
    pub property_type: Option<String>,
    pub min_bedrooms: Option<i32>,
    pub max_bedrooms: Option<i32>,
    pub min_bathrooms: Option<i32>,
    pub max_bathrooms: Option<i32>,
    pub min_square_feet: Option<i32>,
    pub max_square_feet: Option<i32>,
    pub is_available: Option<bool>,
    #[serde(default = "default_page_number")]
    pub page_number: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

/// Typed conjunction of predicates pushed down to the property store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyFilter {
    pub broker_id: Option<StringUuid>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub property_type: Option<PropertyType>,
    pub min_bedrooms: Option<i32>,
    pub max_bedrooms: Option<i32>,
    pub min_bathrooms: Option<i32>,
    pub max_bathrooms: Option<i32>,
    pub min_square_feet: Option<i32>,
    pub max_square_feet: Option<i32>,
    pub is_available: Option<bool>,
}

impl PropertyFilter {
    pub fn available() -> Self {
        Self {
            is_available: Some(true),
            ..Default::default()
        }
    }

    pub fn by_broker(broker_id: StringUuid) -> Self {
        Self {
            broker_id: Some(broker_id),
            ..Default::default()
        }
    }

    /// In-process evaluation of the same predicates the store applies in SQL.
    pub fn matches(&self, p: &Property) -> bool {
        fn contains_ci(haystack: &str, needle: &Option<String>) -> bool {
            needle
                .as_ref()
                .map_or(true, |n| haystack.to_lowercase().contains(&n.to_lowercase()))
        }
        fn at_least<T: PartialOrd>(value: T, bound: Option<T>) -> bool {
            bound.map_or(true, |b| value >= b)
        }
        fn at_most<T: PartialOrd>(value: T, bound: Option<T>) -> bool {
            bound.map_or(true, |b| value <= b)
        }

        self.broker_id.map_or(true, |b| p.broker_id == b)
            && contains_ci(&p.city, &self.city)
            && contains_ci(&p.state, &self.state)
            && at_least(p.price, self.min_price)
            && at_most(p.price, self.max_price)
            && self.property_type.map_or(true, |t| p.property_type == t)
            && at_least(p.bedrooms, self.min_bedrooms)
            && at_most(p.bedrooms, self.max_bedrooms)
            && at_least(p.bathrooms, self.min_bathrooms)
            && at_most(p.bathrooms, self.max_bathrooms)
            && at_least(p.square_feet, self.min_square_feet)
            && at_most(p.square_feet, self.max_square_feet)
            && self.is_available.map_or(true, |a| p.is_available == a)
    }
}

impl From<&PropertySearchCriteria> for PropertyFilter {
    fn from(c: &PropertySearchCriteria) -> Self {
        // Empty strings behave like absent filters
        let non_empty = |s: &Option<String>| s.as_ref().filter(|v| !v.trim().is_empty()).cloned();

        Self {
            broker_id: None,
            city: non_empty(&c.city),
            state: non_empty(&c.state),
            min_price: c.min_price,
            max_price: c.max_price,
            property_type: c
                .property_type
                .as_deref()
                .and_then(|t| t.parse::<PropertyType>().ok()),
            min_bedrooms: c.min_bedrooms,
            max_bedrooms: c.max_bedrooms,
            min_bathrooms: c.min_bathrooms,
            max_bathrooms: c.max_bathrooms,
            min_square_feet: c.min_square_feet,
            max_square_feet: c.max_square_feet,
            is_available: c.is_available,
        }
    }
}

// ============================================================================
// Views
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyImageDto {
    #[schema(value_type = String, format = Uuid)]
    pub id: StringUuid,
    pub image_url: String,
    pub description: String,
    pub is_primary: bool,
    pub display_order: i32,
}

impl From<&PropertyImage> for PropertyImageDto {
    fn from(image: &PropertyImage) -> Self {
        Self {
            id: image.id,
            image_url: image.image_url.clone(),
            description: image.description.clone(),
            is_primary: image.is_primary,
            display_order: image.display_order,
        }
    }
}

/// Full property view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDto {
    #[schema(value_type = String, format = Uuid)]
    pub id: StringUuid,
    pub title: String,
    pub description: String,
    pub property_type: String,
    pub price: f64,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub square_feet: i32,
    pub year_built: i32,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub broker: Option<UserDto>,
    pub images: Vec<PropertyImageDto>,
    pub features: Vec<PropertyFeatureDto>,
}

impl PropertyDto {
    pub fn new(aggregate: &PropertyAggregate, broker: Option<UserDto>) -> Self {
        let p = &aggregate.property;
        let mut images: Vec<PropertyImageDto> =
            aggregate.images.iter().map(PropertyImageDto::from).collect();
        images.sort_by_key(|i| i.display_order);

        Self {
            id: p.id,
            title: p.title.clone(),
            description: p.description.clone(),
            property_type: p.property_type.to_string(),
            price: p.price,
            address: p.address.clone(),
            city: p.city.clone(),
            state: p.state.clone(),
            zip_code: p.zip_code.clone(),
            country: p.country.clone(),
            latitude: p.latitude,
            longitude: p.longitude,
            bedrooms: p.bedrooms,
            bathrooms: p.bathrooms,
            square_feet: p.square_feet,
            year_built: p.year_built,
            is_available: p.is_available,
            created_at: p.created_at,
            updated_at: p.updated_at,
            broker,
            images,
            features: aggregate
                .features
                .iter()
                .map(|f| PropertyFeatureDto {
                    name: f.name.clone(),
                    description: f.description.clone(),
                })
                .collect(),
        }
    }
}

/// Compact view used in paged listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyListItem {
    #[schema(value_type = String, format = Uuid)]
    pub id: StringUuid,
    pub title: String,
    pub property_type: String,
    pub price: f64,
    pub city: String,
    pub state: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub square_feet: i32,
    pub is_available: bool,
    pub primary_image_url: String,
    pub broker: Option<UserDto>,
}

impl PropertyListItem {
    pub fn new(aggregate: &PropertyAggregate, broker: Option<UserDto>) -> Self {
        let p = &aggregate.property;
        Self {
            id: p.id,
            title: p.title.clone(),
            property_type: p.property_type.to_string(),
            price: p.price,
            city: p.city.clone(),
            state: p.state.clone(),
            bedrooms: p.bedrooms,
            bathrooms: p.bathrooms,
            square_feet: p.square_feet,
            is_available: p.is_available,
            primary_image_url: aggregate.primary_image_url(),
            broker,
        }
    }
}
