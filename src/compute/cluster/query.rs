use super::ClusterId;
use super::index::{ClusterIndex, Level};
use crate::compute::projection::{lat_y, lng_x, pixels_to_world, x_lng, y_lat};
use crate::compute::validation::validate_bounds;
use crate::error::Result;
use crate::spatial::centroid;
use geo::Point;
use rstar::AABB;
use std::sync::Arc;
use vacancy_types::{MapBounds, ShopRecord};

/// A group of shops shown as one marker.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterFeature {
    pub id: ClusterId,
    /// Zoom the feature was queried at
    pub zoom: u8,
    /// Mean longitude/latitude of the members
    pub centroid: Point,
    pub point_count: usize,
    /// Member positions in `ClusterIndex::shops`, ascending
    pub(crate) members: Arc<[u32]>,
}

impl ClusterFeature {
    /// Member count for display: `999`, `1.2k`, `12k`.
    pub fn abbreviated_count(&self) -> String {
        abbreviate_count(self.point_count)
    }

    /// The member shops, in id order.
    pub fn leaves<'a>(&'a self, index: &'a ClusterIndex) -> impl Iterator<Item = &'a Arc<ShopRecord>> + 'a {
        self.members
            .iter()
            .filter_map(move |&i| index.shops.get(i as usize))
    }
}

/// A single shop shown as its own marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PointFeature {
    pub shop: Arc<ShopRecord>,
    pub(crate) index: u32,
}

impl PointFeature {
    pub fn position(&self) -> Point {
        self.shop.position()
    }
}

/// One element of a query result.
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Cluster(ClusterFeature),
    Point(PointFeature),
}

impl Feature {
    pub fn position(&self) -> Point {
        match self {
            Feature::Cluster(cluster) => cluster.centroid,
            Feature::Point(point) => point.position(),
        }
    }

    /// Number of shops the feature stands for.
    pub fn point_count(&self) -> usize {
        match self {
            Feature::Cluster(cluster) => cluster.point_count,
            Feature::Point(_) => 1,
        }
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self, Feature::Cluster(_))
    }

    pub fn as_cluster(&self) -> Option<&ClusterFeature> {
        match self {
            Feature::Cluster(cluster) => Some(cluster),
            Feature::Point(_) => None,
        }
    }

    pub fn as_point(&self) -> Option<&PointFeature> {
        match self {
            Feature::Point(point) => Some(point),
            Feature::Cluster(_) => None,
        }
    }
}

pub(crate) fn abbreviate_count(count: usize) -> String {
    if count >= 10_000 {
        format!("{}k", (count as f64 / 1000.0).round() as u64)
    } else if count >= 1_000 {
        format!("{}k", (count as f64 / 100.0).round() / 10.0)
    } else {
        count.to_string()
    }
}

impl ClusterIndex {
    /// Clusters and points inside `bounds` at `zoom`.
    ///
    /// Only points inside the (padded) bbox take part, and every one of them
    /// appears exactly once: either inside a cluster or as its own point.
    /// The zoom is clamped to `min_zoom` for grouping; above `max_zoom` all
    /// points come back as singletons. Results are ordered by component and
    /// are identical for identical calls.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vacancy_map::{ClusterIndex, IndexConfig, MapBounds, ShopRecord};
    ///
    /// let shops = (0..5).map(|i| ShopRecord::new(format!("s{i}"), 35.1 + i as f64 * 0.001, 129.0));
    /// let index = ClusterIndex::build(shops, IndexConfig::default())?;
    /// let bounds = MapBounds::new(128.9, 35.0, 129.1, 35.2);
    ///
    /// assert_eq!(index.query(&bounds, 12).len(), 1);
    /// assert_eq!(index.query(&bounds, 18).len(), 5);
    /// # Ok::<(), vacancy_map::VacancyError>(())
    /// ```
    pub fn query(&self, bounds: &MapBounds, zoom: u8) -> Vec<Feature> {
        if self.is_empty() {
            return Vec::new();
        }
        if let Err(e) = validate_bounds(bounds) {
            log::warn!("Ignoring cluster query: {}", e);
            return Vec::new();
        }

        let envelope = self.envelope(bounds, zoom);
        let points: Vec<u32> = self
            .tree
            .locate_in_envelope(&envelope)
            .map(|point| point.data)
            .collect();

        self.group(points, zoom)
    }

    /// The query bbox after padding, in degrees.
    pub fn padded_bounds(&self, bounds: &MapBounds, zoom: u8) -> MapBounds {
        let envelope = self.envelope(bounds, zoom);
        let (lower, upper) = (envelope.lower(), envelope.upper());
        MapBounds::new(x_lng(lower[0]), y_lat(upper[1]), x_lng(upper[0]), y_lat(lower[1]))
    }

    /// The features cluster `id` breaks into at its expansion zoom.
    pub fn get_children(&self, id: ClusterId) -> Result<Vec<Feature>> {
        let expansion = self.get_expansion_zoom(id)?;
        let (level, component) = self.resolve(id)?;
        Ok(self.group(level.members_of(component).to_vec(), expansion))
    }

    fn envelope(&self, bounds: &MapBounds, zoom: u8) -> AABB<[f64; 2]> {
        let pad = self.padding_at(zoom);
        // North maps to the smaller y.
        AABB::from_corners(
            [lng_x(bounds.west()) - pad, lat_y(bounds.north()) - pad],
            [lng_x(bounds.east()) + pad, lat_y(bounds.south()) + pad],
        )
    }

    fn padding_at(&self, zoom: u8) -> f64 {
        pixels_to_world(self.config.padding, self.config.extent, zoom)
    }

    /// Partition `points` by their component at `zoom`.
    fn group(&self, mut points: Vec<u32>, zoom: u8) -> Vec<Feature> {
        let Some(level) = self.level(zoom) else {
            points.sort_unstable();
            return points.into_iter().map(|i| self.point_feature(i)).collect();
        };

        points.sort_unstable_by_key(|&i| (level.labels[i as usize], i));

        let mut features = Vec::new();
        for group in points.chunk_by(|a, b| level.labels[*a as usize] == level.labels[*b as usize]) {
            if group.len() >= self.config.min_points {
                features.push(Feature::Cluster(self.cluster_feature(level, group, zoom)));
            } else {
                features.extend(group.iter().map(|&i| self.point_feature(i)));
            }
        }
        features
    }

    fn cluster_feature(&self, level: &Level, members: &[u32], zoom: u8) -> ClusterFeature {
        let label = level.labels[members[0] as usize];
        let center = centroid(members.iter().map(|&i| self.shops[i as usize].position()))
            .unwrap_or_else(|| self.shops[members[0] as usize].position());

        ClusterFeature {
            id: ClusterId::new(self.generation, level.zoom, label),
            zoom,
            centroid: center,
            point_count: members.len(),
            members: Arc::from(members),
        }
    }

    fn point_feature(&self, index: u32) -> Feature {
        Feature::Point(PointFeature {
            shop: Arc::clone(&self.shops[index as usize]),
            index,
        })
    }
}
