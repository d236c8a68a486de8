//! Zoom-leveled cluster index over shop locations.
//!
//! The index is built once per data load. For every zoom level between
//! `min_zoom` and `max_zoom` it stores which points belong together: the
//! connected components of the "within `radius` pixels" graph at that zoom.
//! Because pixel distances only grow as the map zooms in, the components of
//! one level are always unions of components of the next level, which is
//! what makes expansion zooms and monotonic declustering well defined.

mod index;
mod linkage;
mod query;


pub use index::ClusterIndex;
pub use query::{ClusterFeature, Feature, PointFeature};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const ZOOM_BITS: u32 = 5;
const COMPONENT_BITS: u32 = 35;
const ZOOM_MASK: u64 = (1 << ZOOM_BITS) - 1;
const COMPONENT_MASK: u64 = (1 << COMPONENT_BITS) - 1;
pub(crate) const GENERATION_MASK: u64 = (1 << (64 - ZOOM_BITS - COMPONENT_BITS)) - 1;

/// Identifier of a cluster: index generation, zoom level and component.
///
/// Ids are stable for a given index and zoom, so re-running the same query
/// yields the same ids. They are not comparable across zoom levels, and an
/// id minted by a previous index (before a data reload) never resolves
/// against the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(u64);

impl ClusterId {
    pub(crate) fn new(generation: u64, zoom: u8, component: u32) -> Self {
        let raw = ((generation & GENERATION_MASK) << (ZOOM_BITS + COMPONENT_BITS))
            | ((u64::from(component) & COMPONENT_MASK) << ZOOM_BITS)
            | (u64::from(zoom) & ZOOM_MASK);
        Self(raw)
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Zoom level the cluster was formed at.
    pub fn zoom(&self) -> u8 {
        (self.0 & ZOOM_MASK) as u8
    }

    pub(crate) fn component(&self) -> u64 {
        (self.0 >> ZOOM_BITS) & COMPONENT_MASK
    }

    pub(crate) fn generation(&self) -> u64 {
        self.0 >> (ZOOM_BITS + COMPONENT_BITS)
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cluster-{}", self.0)
    }
}

impl FromStr for ClusterId {
    type Err = crate::error::VacancyError;

    /// Accepts both `cluster-<n>` (the marker id form) and a bare number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("cluster-").unwrap_or(s);
        digits.parse::<u64>().map(ClusterId).map_err(|_| {
            crate::error::VacancyError::InvalidInput(format!("not a cluster id: {:?}", s))
        })
    }
}

#[cfg(test)]
mod id_tests {
    use super::*;

    #[test]
    fn test_cluster_id_packs_fields() {
        let id = ClusterId::new(7, 12, 42);
        assert_eq!(id.generation(), 7);
        assert_eq!(id.zoom(), 12);
        assert_eq!(id.component(), 42);
    }

    #[test]
    fn test_cluster_id_display_and_parse() {
        let id = ClusterId::new(1, 3, 9);
        let text = id.to_string();
        assert!(text.starts_with("cluster-"));
        assert_eq!(text.parse::<ClusterId>().unwrap(), id);
        assert_eq!(id.raw().to_string().parse::<ClusterId>().unwrap(), id);
        assert!("cluster-x".parse::<ClusterId>().is_err());
    }

    #[test]
    fn test_generation_wraps_into_mask() {
        let id = ClusterId::new(GENERATION_MASK + 2, 0, 0);
        assert_eq!(id.generation(), 1);
    }
}
