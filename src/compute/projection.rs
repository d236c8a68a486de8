//! Normalized Web Mercator projection.
//!
//! Maps WGS84 degrees onto the unit square `[0, 1] x [0, 1]` with the origin
//! at the north-west corner. At zoom `z` the square is `extent * 2^z` screen
//! pixels wide, which is how pixel radii become world distances.

use std::f64::consts::PI;

/// Latitude limit of the square Mercator world.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Longitude to normalized x.
#[inline]
pub fn lng_x(lng: f64) -> f64 {
    lng / 360.0 + 0.5
}

/// Latitude to normalized y, clamped to the square world.
#[inline]
pub fn lat_y(lat: f64) -> f64 {
    let sin = (lat.clamp(-MAX_LATITUDE, MAX_LATITUDE) * PI / 180.0).sin();
    let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI;
    y.clamp(0.0, 1.0)
}

/// Normalized x back to longitude.
#[inline]
pub fn x_lng(x: f64) -> f64 {
    (x - 0.5) * 360.0
}

/// Normalized y back to latitude.
#[inline]
pub fn y_lat(y: f64) -> f64 {
    let y2 = (180.0 - y * 360.0) * PI / 180.0;
    360.0 * y2.exp().atan() / PI - 90.0
}

/// Project a (lng, lat) pair.
#[inline]
pub fn project(lng: f64, lat: f64) -> [f64; 2] {
    [lng_x(lng), lat_y(lat)]
}

/// World-space length of `pixels` screen pixels at `zoom`.
#[inline]
pub fn pixels_to_world(pixels: f64, extent: f64, zoom: u8) -> f64 {
    pixels / (extent * 2f64.powi(i32::from(zoom)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_maps_to_center() {
        assert!((lng_x(0.0) - 0.5).abs() < 1e-12);
        assert!((lat_y(0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_corners() {
        assert_eq!(lng_x(-180.0), 0.0);
        assert_eq!(lng_x(180.0), 1.0);
        assert!(lat_y(90.0).abs() < 1e-9);
        assert!((lat_y(-90.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_north_is_up() {
        // Busan is north of the equator, so it sits above the midline.
        assert!(lat_y(35.2) < 0.5);
        assert!(lat_y(35.3) < lat_y(35.2));
    }

    #[test]
    fn test_inverse() {
        let (lng, lat) = (129.0813, 35.2289);
        assert!((x_lng(lng_x(lng)) - lng).abs() < 1e-9);
        assert!((y_lat(lat_y(lat)) - lat).abs() < 1e-9);
    }

    #[test]
    fn test_pixels_to_world_halves_per_zoom() {
        let z10 = pixels_to_world(80.0, 512.0, 10);
        let z11 = pixels_to_world(80.0, 512.0, 11);
        assert!((z10 / z11 - 2.0).abs() < 1e-12);
        assert!((pixels_to_world(512.0, 512.0, 0) - 1.0).abs() < 1e-12);
    }
}
