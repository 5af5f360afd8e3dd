//! Request parameters and the normalized predicate built from them.

use crate::bbox::BoundingBox;
use crate::point::Point;
use serde::{Deserialize, Serialize};

/// Listing status admitted when a request does not name one.
pub const ACTIVE_STATUS: &str = "Active";

/// Raw, untyped request parameters exactly as they arrive on the query string.
///
/// Every field is optional and unparsed; the engine's filter normalizer
/// resolves them into a [`FilterSet`] and never rejects a malformed value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawQuery {
    pub north: Option<String>,
    pub south: Option<String>,
    pub east: Option<String>,
    pub west: Option<String>,
    pub zoom: Option<String>,
    pub listing_type: Option<String>,
    pub property_type: Option<String>,
    pub property_sub_type: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub beds: Option<String>,
    pub baths: Option<String>,
    pub city: Option<String>,
    pub pool: Option<String>,
    pub spa: Option<String>,
    pub mls_source: Option<String>,
    pub status: Option<String>,
}

impl RawQuery {
    /// Query for a viewport and zoom with every other parameter absent.
    pub fn viewport(north: f64, south: f64, east: f64, west: f64, zoom: f64) -> Self {
        Self {
            north: Some(north.to_string()),
            south: Some(south.to_string()),
            east: Some(east.to_string()),
            west: Some(west.to_string()),
            zoom: Some(zoom.to_string()),
            ..Self::default()
        }
    }

    /// Set a parameter by its query-string name.
    ///
    /// Returns `false` for an unknown name, which is ignored. Setting a
    /// parameter twice keeps the later value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        let slot = match name {
            "north" => &mut self.north,
            "south" => &mut self.south,
            "east" => &mut self.east,
            "west" => &mut self.west,
            "zoom" => &mut self.zoom,
            "listingType" => &mut self.listing_type,
            "propertyType" => &mut self.property_type,
            "propertySubType" => &mut self.property_sub_type,
            "minPrice" => &mut self.min_price,
            "maxPrice" => &mut self.max_price,
            "beds" => &mut self.beds,
            "baths" => &mut self.baths,
            "city" => &mut self.city,
            "pool" => &mut self.pool,
            "spa" => &mut self.spa,
            "mlsSource" => &mut self.mls_source,
            "status" => &mut self.status,
            _ => return false,
        };
        *slot = Some(value.into());
        true
    }
}

/// Collects decoded query-string pairs. Repeated names keep the last value.
impl<K, V> FromIterator<(K, V)> for RawQuery
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(pairs: I) -> Self {
        let mut query = Self::default();
        for (name, value) in pairs {
            query.set(name.as_ref(), value);
        }
        query
    }
}

/// Listing category selected by the `listingType` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingCategory {
    #[default]
    Sale,
    Rental,
    Multifamily,
}

impl ListingCategory {
    /// Parse a `listingType` value; anything unrecognised is a sale.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "rental" => Self::Rental,
            "multifamily" => Self::Multifamily,
            _ => Self::Sale,
        }
    }

    /// Property type code stored on upstream records.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sale => "A",
            Self::Rental => "B",
            Self::Multifamily => "C",
        }
    }
}

/// Inclusive price bounds. `max` may be `f64::INFINITY`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub const fn unbounded() -> Self {
        Self {
            min: 0.0,
            max: f64::INFINITY,
        }
    }

    /// A listing without a price never violates the range.
    pub fn admits(&self, price: Option<f64>) -> bool {
        match price {
            Some(p) => p >= self.min && p <= self.max,
            None => true,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min <= 0.0 && self.max == f64::INFINITY
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Canonical predicate set. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSet {
    pub bbox: BoundingBox,
    /// Property type code every matching listing must carry.
    pub property_type: String,
    /// Case-insensitive substring of the property sub-type.
    pub property_sub_type: Option<String>,
    pub price: PriceRange,
    pub min_beds: Option<f64>,
    pub min_baths: Option<f64>,
    /// Case-insensitive substring of the city name.
    pub city: Option<String>,
    pub require_pool: bool,
    pub require_spa: bool,
    /// Listing status a listing must carry; `None` admits every status.
    pub status: Option<String>,
    /// Source tags to query; `None` queries every configured source.
    pub sources: Option<Vec<String>>,
}

impl FilterSet {
    /// True if the given source may contribute to this request.
    pub fn admits_source(&self, tag: &str) -> bool {
        match &self.sources {
            Some(tags) => tags.iter().any(|t| t.eq_ignore_ascii_case(tag)),
            None => true,
        }
    }

    /// Evaluate the predicate against a canonical point.
    ///
    /// Optional attributes that are missing on the point only fail a
    /// predicate that requires them (`beds`, `baths`, pool, spa, city,
    /// sub-type). A missing price always passes the price range, and a
    /// listing whose source records no status passes the status check.
    pub fn matches(&self, point: &Point) -> bool {
        if !self.bbox.contains(point.lat, point.lng) {
            return false;
        }
        if point.category.as_deref() != Some(self.property_type.as_str()) {
            return false;
        }
        if let (Some(wanted), Some(status)) = (&self.status, &point.status)
            && !status.eq_ignore_ascii_case(wanted)
        {
            return false;
        }
        if !self.price.admits(point.price) {
            return false;
        }
        if let Some(min_beds) = self.min_beds
            && point.beds.is_none_or(|beds| beds < min_beds)
        {
            return false;
        }
        if let Some(min_baths) = self.min_baths
            && point.baths.is_none_or(|baths| baths < min_baths)
        {
            return false;
        }
        if self.require_pool && point.pool != Some(true) {
            return false;
        }
        if self.require_spa && point.spa != Some(true) {
            return false;
        }
        if let Some(sub_type) = &self.property_sub_type
            && !contains_ignore_case(point.property_sub_type.as_deref(), sub_type)
        {
            return false;
        }
        if let Some(city) = &self.city
            && !contains_ignore_case(point.city.as_deref(), city)
        {
            return false;
        }
        true
    }
}

impl Default for FilterSet {
    fn default() -> Self {
        Self {
            bbox: BoundingBox::world(),
            property_type: ListingCategory::Sale.code().to_string(),
            property_sub_type: None,
            price: PriceRange::unbounded(),
            min_beds: None,
            min_baths: None,
            city: None,
            require_pool: false,
            require_spa: false,
            status: Some(ACTIVE_STATUS.to_string()),
            sources: None,
        }
    }
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack
        .map(|h| h.to_lowercase().contains(&needle.to_lowercase()))
        .unwrap_or(false)
}
