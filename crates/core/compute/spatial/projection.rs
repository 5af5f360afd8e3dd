//! Spherical Web-Mercator projection into the unit square.
//!
//! `x` grows eastward from 0 at -180° to 1 at 180°; `y` grows southward
//! from 0 near the north pole to 1 near the south pole. Latitudes beyond the
//! Mercator limit are clamped into `[0, 1]`.

use std::f64::consts::PI;

#[inline]
pub fn lng_x(lng: f64) -> f64 {
    lng / 360.0 + 0.5
}

#[inline]
pub fn lat_y(lat: f64) -> f64 {
    let sin = (lat * PI / 180.0).sin();
    let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI;
    y.clamp(0.0, 1.0)
}

#[inline]
pub fn x_lng(x: f64) -> f64 {
    (x - 0.5) * 360.0
}

#[inline]
pub fn y_lat(y: f64) -> f64 {
    let y2 = (180.0 - y * 360.0) * PI / 180.0;
    360.0 * y2.exp().atan() / PI - 90.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_anchors() {
        assert_eq!(lng_x(-180.0), 0.0);
        assert_eq!(lng_x(180.0), 1.0);
        assert!((lat_y(0.0) - 0.5).abs() < 1e-12);
        assert_eq!(lat_y(90.0), 0.0);
        assert_eq!(lat_y(-90.0), 1.0);
    }

    #[test]
    fn test_inverse_recovers_coordinates() {
        for &(lat, lng) in &[(34.05, -118.24), (-33.86, 151.21), (0.0, 0.0)] {
            assert!((y_lat(lat_y(lat)) - lat).abs() < 1e-9);
            assert!((x_lng(lng_x(lng)) - lng).abs() < 1e-9);
        }
    }
}
