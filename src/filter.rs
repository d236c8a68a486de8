//! Attribute filter a host applies to shop records before a reload.

use serde::{Deserialize, Serialize};
use vacancy_types::{ShopCategory, ShopRecord};

/// Inclusive `[min, max]` range over a numeric shop attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Which shops to show on the map.
///
/// A shop passes when its rent and area fall inside the ranges, its
/// category is listed, and (if set) its address contains `region`.
///
/// ```rust
/// use vacancy_map::filter::{Range, ShopFilter};
/// use vacancy_map::{ShopCategory, ShopRecord};
///
/// let filter = ShopFilter::default()
///     .with_rent_range(Range::new(0.0, 200.0))
///     .with_region("부산진구");
///
/// let shop = ShopRecord::new("a", 35.15, 129.05)
///     .with_monthly_rent(150.0)
///     .with_area(20.0)
///     .with_category(ShopCategory::Retail)
///     .with_address("부산광역시 부산진구 중앙대로 672");
/// assert!(filter.matches(&shop));
/// assert!(!filter.is_default());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShopFilter {
    /// Monthly rent bounds, in the same units as `ShopRecord::monthly_rent`
    #[serde(default = "ShopFilter::default_rent_range")]
    pub rent_range: Range,

    /// Floor area bounds
    #[serde(default = "ShopFilter::default_area_range")]
    pub area_range: Range,

    #[serde(default = "ShopFilter::default_categories")]
    pub categories: Vec<ShopCategory>,

    /// Substring of the address, matched case-insensitively
    #[serde(default)]
    pub region: Option<String>,
}

impl ShopFilter {
    const fn default_rent_range() -> Range {
        Range::new(0.0, 1000.0)
    }

    const fn default_area_range() -> Range {
        Range::new(0.0, 100.0)
    }

    fn default_categories() -> Vec<ShopCategory> {
        ShopCategory::ALL.to_vec()
    }

    pub fn with_rent_range(mut self, range: Range) -> Self {
        self.rent_range = range;
        self
    }

    pub fn with_area_range(mut self, range: Range) -> Self {
        self.area_range = range;
        self
    }

    pub fn with_categories(mut self, categories: impl IntoIterator<Item = ShopCategory>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        let region = region.into();
        self.region = if region.trim().is_empty() { None } else { Some(region) };
        self
    }

    pub fn matches(&self, shop: &ShopRecord) -> bool {
        if !self.rent_range.contains(shop.monthly_rent) || !self.area_range.contains(shop.area) {
            return false;
        }
        if !self.categories.contains(&shop.category) {
            return false;
        }
        match &self.region {
            Some(region) => shop
                .address
                .to_lowercase()
                .contains(&region.trim().to_lowercase()),
            None => true,
        }
    }

    /// Keep only the shops that match.
    pub fn apply<I>(&self, shops: I) -> Vec<ShopRecord>
    where
        I: IntoIterator<Item = ShopRecord>,
    {
        shops.into_iter().filter(|shop| self.matches(shop)).collect()
    }

    /// True when the filter lets every shop in the default ranges through.
    pub fn is_default(&self) -> bool {
        self.rent_range == Self::default_rent_range()
            && self.area_range == Self::default_area_range()
            && ShopCategory::ALL.iter().all(|c| self.categories.contains(c))
            && self.region.is_none()
    }
}

impl Default for ShopFilter {
    fn default() -> Self {
        Self {
            rent_range: Self::default_rent_range(),
            area_range: Self::default_area_range(),
            categories: Self::default_categories(),
            region: None,
        }
    }
}
