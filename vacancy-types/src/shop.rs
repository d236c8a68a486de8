use geo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Business category of a vacant storefront.
///
/// Serialized in lowercase (`"restaurant"`, `"retail"`, `"office"`, `"etc"`),
/// matching the shop feed's `shopType` field. Unknown values fall back to
/// `Etc` so a new upstream category never rejects a whole feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShopCategory {
    Restaurant,
    Retail,
    Office,
    #[default]
    Etc,
}

impl ShopCategory {
    /// All categories in display order.
    pub const ALL: [ShopCategory; 4] = [
        ShopCategory::Restaurant,
        ShopCategory::Retail,
        ShopCategory::Office,
        ShopCategory::Etc,
    ];

    /// Stable lowercase key, used for icon lookup and GeoJSON properties.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShopCategory::Restaurant => "restaurant",
            ShopCategory::Retail => "retail",
            ShopCategory::Office => "office",
            ShopCategory::Etc => "etc",
        }
    }

    /// Parse a category key, mapping anything unknown to `Etc`.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "restaurant" => ShopCategory::Restaurant,
            "retail" => ShopCategory::Retail,
            "office" => ShopCategory::Office,
            _ => ShopCategory::Etc,
        }
    }
}

impl fmt::Display for ShopCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ShopCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let key = String::deserialize(deserializer)?;
        Ok(ShopCategory::from_key(&key))
    }
}

fn missing_coordinate() -> f64 {
    f64::NAN
}

/// One vacant-shop entry as delivered by the data source.
///
/// Only `id`, `latitude` and `longitude` are interpreted by the clustering
/// engine. The remaining attributes ride along for display, filtering and
/// importance ranking. A record whose coordinates are missing deserializes
/// with NaN coordinates and is skipped when the index is built.
///
/// # Examples
///
/// ```
/// use vacancy_types::shop::{ShopCategory, ShopRecord};
///
/// let json = r#"{
///     "id": "busan-001",
///     "name": "Haeundae ground floor",
///     "latitude": 35.1631,
///     "longitude": 129.1635,
///     "shopType": "restaurant",
///     "monthlyRent": 250
/// }"#;
/// let shop: ShopRecord = serde_json::from_str(json).unwrap();
/// assert_eq!(shop.category, ShopCategory::Restaurant);
/// assert!(shop.has_valid_coordinates());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopRecord {
    pub id: String,
    #[serde(default = "missing_coordinate")]
    pub latitude: f64,
    #[serde(default = "missing_coordinate")]
    pub longitude: f64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, rename = "shopType")]
    pub category: ShopCategory,
    /// Monthly rent (10k KRW units in the source feed).
    #[serde(default)]
    pub monthly_rent: f64,
    #[serde(default)]
    pub deposit: f64,
    /// Floor area in pyeong.
    #[serde(default)]
    pub area: f64,
}

impl ShopRecord {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
            name: String::new(),
            address: String::new(),
            category: ShopCategory::default(),
            monthly_rent: 0.0,
            deposit: 0.0,
            area: 0.0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_category(mut self, category: ShopCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_monthly_rent(mut self, rent: f64) -> Self {
        self.monthly_rent = rent;
        self
    }

    pub fn with_deposit(mut self, deposit: f64) -> Self {
        self.deposit = deposit;
        self
    }

    pub fn with_area(mut self, area: f64) -> Self {
        self.area = area;
        self
    }

    /// Position as a `geo::Point` (x = longitude, y = latitude).
    pub fn position(&self) -> Point {
        Point::new(self.longitude, self.latitude)
    }

    /// Both coordinates are finite numbers.
    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}
