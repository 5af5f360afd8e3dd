use serde::{Deserialize, Serialize};

/// A single listing in canonical shape.
///
/// Every upstream record is translated into this shape exactly once and is
/// never mutated afterwards. `source_tag` records which listing store the
/// point came from; points are not deduplicated across sources.
///
/// Serializes as the `listings[]` entry of the clustered-map response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    /// `"<sourceTag>:<native id>"`
    pub id: String,
    #[serde(rename = "latitude")]
    pub lat: f64,
    #[serde(rename = "longitude")]
    pub lng: f64,
    pub price: Option<f64>,
    /// Property type code (`A` sale, `B` rental, `C` multifamily).
    #[serde(rename = "propertyType", skip_serializing_if = "Option::is_none", default)]
    pub category: Option<String>,
    #[serde(rename = "mlsSource")]
    pub source_tag: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub listing_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub slug_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub property_sub_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub beds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub baths: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub living_area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pool: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub spa: Option<bool>,
    /// Upstream listing status (`Active`, `Pending`, `Closed`, ...).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<String>,
}

impl Point {
    /// Create a point with coordinates and provenance only.
    ///
    /// # Examples
    ///
    /// ```
    /// use geocluster_types::point::Point;
    ///
    /// let p = Point::new("gps:1", "gps", 34.05, -118.24).with_price(850_000.0);
    /// assert_eq!(p.price, Some(850_000.0));
    /// ```
    pub fn new(id: impl Into<String>, source_tag: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lng,
            price: None,
            category: None,
            source_tag: source_tag.into(),
            listing_key: None,
            slug: None,
            slug_address: None,
            property_sub_type: None,
            city: None,
            beds: None,
            baths: None,
            living_area: None,
            pool: None,
            spa: None,
            status: None,
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_rooms(mut self, beds: f64, baths: f64) -> Self {
        self.beds = Some(beds);
        self.baths = Some(baths);
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}
