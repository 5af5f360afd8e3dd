//! Request parameter normalization.
//!
//! Turns a [`RawQuery`] into a [`FilterSet`]. Nothing here can fail: a
//! value that does not parse is treated as absent and replaced by its
//! default, so a malformed URL still renders a map.

use geocluster_types::bbox::BoundingBox;
use geocluster_types::filter::{ACTIVE_STATUS, FilterSet, ListingCategory, PriceRange, RawQuery};

/// Parse a finite decimal number. Empty, non-numeric and non-finite input yields `None`.
pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

fn parse_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("true") | Some("1") | Some("yes")
    )
}

/// A free-text constraint; blank and `all` mean unconstrained.
fn parse_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
        .map(str::to_string)
}

fn parse_edge(value: Option<&str>, default: f64, limit: f64) -> f64 {
    value
        .and_then(parse_number)
        .map(|edge| edge.clamp(-limit, limit))
        .unwrap_or(default)
}

/// Builds canonical predicate sets from raw request parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterNormalizer;

impl FilterNormalizer {
    /// Resolve the request's bounding box.
    ///
    /// Each edge falls back to its whole-earth value independently.
    /// Latitudes are clamped to ±90, longitudes to ±180, and an inverted
    /// latitude range is swapped. A `west` edge east of `east` is kept as an
    /// antimeridian crossing.
    pub fn bbox(raw: &RawQuery) -> BoundingBox {
        let world = BoundingBox::world();
        let mut north = parse_edge(raw.north.as_deref(), world.north, 90.0);
        let mut south = parse_edge(raw.south.as_deref(), world.south, 90.0);
        let east = parse_edge(raw.east.as_deref(), world.east, 180.0);
        let west = parse_edge(raw.west.as_deref(), world.west, 180.0);

        if north < south {
            std::mem::swap(&mut north, &mut south);
        }
        BoundingBox::new(north, south, east, west)
    }

    fn price(raw: &RawQuery) -> PriceRange {
        let bound = |value: Option<&str>| value.and_then(parse_number).filter(|p| *p >= 0.0);

        let mut range = PriceRange {
            min: bound(raw.min_price.as_deref()).unwrap_or(0.0),
            max: bound(raw.max_price.as_deref()).unwrap_or(f64::INFINITY),
        };
        if range.min > range.max {
            std::mem::swap(&mut range.min, &mut range.max);
        }
        range
    }

    fn minimum(value: Option<&str>) -> Option<f64> {
        value.and_then(parse_number).filter(|min| *min > 0.0)
    }

    fn property_type(raw: &RawQuery) -> String {
        match raw.property_type.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => code.to_string(),
            _ => ListingCategory::parse(raw.listing_type.as_deref().unwrap_or("sale"))
                .code()
                .to_string(),
        }
    }

    /// Absent or blank means active listings only; `all` lifts the check.
    fn status(raw: &RawQuery) -> Option<String> {
        match raw.status.as_deref().map(str::trim) {
            Some(status) if status.eq_ignore_ascii_case("all") => None,
            Some(status) if !status.is_empty() => Some(status.to_string()),
            _ => Some(ACTIVE_STATUS.to_string()),
        }
    }

    fn sources(raw: &RawQuery) -> Option<Vec<String>> {
        let tags: Vec<String> = raw
            .mls_source
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();
        (!tags.is_empty()).then_some(tags)
    }

    /// Normalize every request parameter into a [`FilterSet`].
    ///
    /// ```
    /// use geocluster::compute::FilterNormalizer;
    /// use geocluster_types::filter::RawQuery;
    ///
    /// let raw = RawQuery {
    ///     min_price: Some("not-a-number".into()),
    ///     listing_type: Some("rental".into()),
    ///     ..RawQuery::default()
    /// };
    /// let filter = FilterNormalizer::normalize(&raw);
    /// assert_eq!(filter.price.min, 0.0);
    /// assert_eq!(filter.property_type, "B");
    /// ```
    pub fn normalize(raw: &RawQuery) -> FilterSet {
        FilterSet {
            bbox: Self::bbox(raw),
            property_type: Self::property_type(raw),
            property_sub_type: parse_text(raw.property_sub_type.as_deref()),
            price: Self::price(raw),
            min_beds: Self::minimum(raw.beds.as_deref()),
            min_baths: Self::minimum(raw.baths.as_deref()),
            city: parse_text(raw.city.as_deref()),
            require_pool: parse_flag(raw.pool.as_deref()),
            require_spa: parse_flag(raw.spa.as_deref()),
            status: Self::status(raw),
            sources: Self::sources(raw),
        }
    }
}
