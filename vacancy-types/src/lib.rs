//! # vacancy-types
//!
//! Plain data types shared between the `vacancy-map` engine and its hosts.
//!
//! - **Shop types**: `ShopRecord`, `ShopCategory`
//! - **Map types**: `MapBounds`, `Viewport`
//!
//! All types are serializable with Serde and use the `geo` crate's `Point`
//! (x = longitude, y = latitude) for coordinates.
//!
//! ## Examples
//!
//! ```rust
//! use vacancy_types::bounds::MapBounds;
//! use vacancy_types::shop::{ShopCategory, ShopRecord};
//!
//! let shop = ShopRecord::new("shop-1", 35.2289, 129.0813)
//!     .with_name("Seomyeon corner unit")
//!     .with_category(ShopCategory::Retail)
//!     .with_monthly_rent(180.0);
//!
//! let bounds = MapBounds::new(129.0, 35.1, 129.2, 35.3);
//! assert!(bounds.contains(&shop.position()));
//! ```

pub mod bounds;
pub mod shop;

pub use bounds::{MapBounds, Viewport};
pub use shop::{ShopCategory, ShopRecord};
