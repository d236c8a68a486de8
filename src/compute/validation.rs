//! Validation for shop coordinates and query bounds.

use crate::error::{Result, VacancyError};
use geo::Point;
use vacancy_types::{MapBounds, ShopRecord};

/// Validates that a point is a usable WGS84 position.
///
/// Longitude: [-180.0, 180.0], Latitude: [-90.0, 90.0]
///
/// # Examples
///
/// ```
/// use vacancy_map::compute::validation::validate_position;
/// use geo::Point;
///
/// let busan = Point::new(129.0813, 35.2289);
/// assert!(validate_position(&busan).is_ok());
///
/// assert!(validate_position(&Point::new(f64::NAN, 35.0)).is_err());
/// assert!(validate_position(&Point::new(129.0, 95.0)).is_err());
/// ```
pub fn validate_position(point: &Point) -> Result<()> {
    let (lng, lat) = (point.x(), point.y());

    if !lng.is_finite() {
        return Err(VacancyError::InvalidInput(format!(
            "longitude must be finite, got {}",
            lng
        )));
    }

    if !lat.is_finite() {
        return Err(VacancyError::InvalidInput(format!(
            "latitude must be finite, got {}",
            lat
        )));
    }

    if !(-180.0..=180.0).contains(&lng) {
        return Err(VacancyError::InvalidInput(format!(
            "longitude out of range [-180, 180]: {}",
            lng
        )));
    }

    if !(-90.0..=90.0).contains(&lat) {
        return Err(VacancyError::InvalidInput(format!(
            "latitude out of range [-90, 90]: {}",
            lat
        )));
    }

    Ok(())
}

/// Validates a shop record's id and coordinates.
pub fn validate_shop(shop: &ShopRecord) -> Result<()> {
    if shop.id.is_empty() {
        return Err(VacancyError::InvalidInput("shop id is empty".to_string()));
    }
    validate_position(&shop.position())
        .map_err(|e| VacancyError::InvalidInput(format!("shop {}: {}", shop.id, e)))
}

/// Validates that all four edges of a bbox are finite.
pub fn validate_bounds(bounds: &MapBounds) -> Result<()> {
    if !bounds.is_finite() {
        return Err(VacancyError::InvalidInput(format!(
            "bounds must be finite, got {:?}",
            bounds
        )));
    }
    Ok(())
}
