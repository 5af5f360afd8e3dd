use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

/// Longitude span as `(west, east)`, always with `west <= east`.
pub type LngSpan = (f64, f64);

/// A geographic bounding box in WGS84 degrees.
///
/// Edges are stored as given so that a box whose `west` edge lies east of
/// its `east` edge can be recognised as crossing the antimeridian. Use
/// [`BoundingBox::lng_spans`] to split such a box into plain spans.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Northern latitude boundary.
    pub north: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Western longitude boundary.
    pub west: f64,
}

impl BoundingBox {
    /// Create a new bounding box from its four edges.
    ///
    /// # Examples
    ///
    /// ```
    /// use geocluster_types::bbox::BoundingBox;
    ///
    /// let la = BoundingBox::new(34.34, 33.70, -118.15, -118.67);
    /// assert!(la.contains(34.05, -118.24));
    /// ```
    pub const fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// The whole-earth box used when a request supplies no usable bounds.
    pub const fn world() -> Self {
        Self::new(90.0, -90.0, 180.0, -180.0)
    }

    /// True if the box wraps past the 180th meridian.
    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    /// True if the box covers every longitude.
    pub fn spans_all_longitudes(&self) -> bool {
        !self.crosses_antimeridian() && self.east - self.west >= 360.0
    }

    /// Split the box into one or two plain longitude spans.
    pub fn lng_spans(&self) -> SmallVec<[LngSpan; 2]> {
        if self.spans_all_longitudes() {
            smallvec![(-180.0, 180.0)]
        } else if self.crosses_antimeridian() {
            smallvec![(self.west, 180.0), (-180.0, self.east)]
        } else {
            smallvec![(self.west, self.east)]
        }
    }

    /// Check whether a coordinate lies inside the box (edges inclusive).
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        if lat < self.south || lat > self.north {
            return false;
        }
        self.lng_spans()
            .iter()
            .any(|&(west, east)| lng >= west && lng <= east)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::world()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_inclusive_edges() {
        let bbox = BoundingBox::new(10.0, 0.0, 10.0, 0.0);
        assert!(bbox.contains(0.0, 0.0));
        assert!(bbox.contains(10.0, 10.0));
        assert!(!bbox.contains(10.1, 5.0));
        assert!(!bbox.contains(5.0, -0.1));
    }

    #[test]
    fn test_antimeridian_spans() {
        let bbox = BoundingBox::new(10.0, -10.0, -170.0, 170.0);
        assert!(bbox.crosses_antimeridian());
        let spans = bbox.lng_spans();
        assert_eq!(spans.len(), 2);
        assert!(bbox.contains(0.0, 175.0));
        assert!(bbox.contains(0.0, -175.0));
        assert!(!bbox.contains(0.0, 0.0));
    }

    #[test]
    fn test_world_box() {
        let world = BoundingBox::world();
        assert!(world.spans_all_longitudes());
        assert_eq!(world.lng_spans().as_slice(), &[(-180.0, 180.0)]);
        assert!(world.contains(-90.0, 180.0));
    }
}
