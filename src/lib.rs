//! Zoom-aware clustering of vacant storefronts for interactive maps.
//!
//! Shop records are indexed once per data load; each viewport query then
//! returns a partition of the visible shops into clusters and single
//! points, which the marker optimizer caps, ranks and styles for the map.
//!
//! ```rust
//! use vacancy_map::{ClusterIndex, IndexConfig, MapBounds, ShopRecord};
//!
//! let shops = vec![
//!     ShopRecord::new("seomyeon-1", 35.1578, 129.0590),
//!     ShopRecord::new("seomyeon-2", 35.1580, 129.0593),
//!     ShopRecord::new("haeundae-1", 35.1631, 129.1604),
//! ];
//! let index = ClusterIndex::build(shops, IndexConfig::default())?;
//!
//! let busan = MapBounds::new(128.9, 35.0, 129.3, 35.3);
//! let features = index.query(&busan, 12);
//! assert_eq!(features.iter().map(|f| f.point_count()).sum::<usize>(), 3);
//! # Ok::<(), vacancy_map::VacancyError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod error;
pub mod filter;
pub mod marker;
pub mod schedule;
pub mod selection;
pub mod shared;
pub mod spatial;
pub mod stats;

pub use builder::MarkerManagerBuilder;
pub use compute::cluster::{ClusterFeature, ClusterId, ClusterIndex, Feature, PointFeature};
pub use config::{Config, ImportanceKey, IndexConfig, MarkerPolicy, TimingConfig};
pub use error::{Result, VacancyError};
pub use filter::ShopFilter;
pub use marker::{MapWidget, Marker, MarkerManager, materialize};
pub use selection::{SelectionEvent, SelectionSnapshot, SelectionStore};
pub use shared::SharedIndex;
pub use spatial::{DistanceMetric, distance_between};
pub use stats::{PassStats, TimingWindow};

pub use vacancy_types::{MapBounds, ShopCategory, ShopRecord, Viewport};

pub use geo::{Point, Rect};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{ClusterIndex, Feature, IndexConfig, Result, VacancyError};

    pub use crate::{MapBounds, ShopCategory, ShopRecord, Viewport};

    pub use crate::marker::{MapState, MapWidget, Marker, MarkerManager, materialize};

    pub use crate::{Config, MarkerPolicy, TimingConfig};

    pub use crate::{SelectionStore, SharedIndex, ShopFilter};

    pub use geo::Point;

    pub use std::time::{Duration, Instant};
}
