//! From query features to markers on a map.
//!
//! - [`optimizer`]: the pure `materialize` policy
//! - [`style`]: cluster tiers, point icons, z-order
//! - [`map`]: the [`MapWidget`] boundary trait
//! - [`manager`]: [`MarkerManager`], which wires map events to query and
//!   materialization

pub mod manager;
pub mod map;
pub mod optimizer;
pub mod style;

pub use manager::{MarkerManager, SelectCallback};
pub use map::MapWidget;
pub use optimizer::{ClusterMarker, MapState, Marker, PointMarker, materialize};
pub use style::{ClusterTier, Emphasis, IconDescriptor};
