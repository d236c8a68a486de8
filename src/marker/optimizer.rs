//! Turning query features into the markers a map actually draws.
//!
//! [`materialize`] is pure: the same features, state and policy always give
//! the same markers. The steps run in a fixed order:
//!
//! 1. drop features outside the viewport bounds,
//! 2. when zoomed out past `min_zoom_threshold` with more than `max_markers`
//!    features, keep only the `max_markers / 3` most important points,
//! 3. with a focal point, order points nearest first and cap the total
//!    marker count at `max_markers`; without one, cap points at
//!    `max_markers` by importance,
//! 4. assign tiers, icons and emphasis.
//!
//! Clusters are never truncated.

use crate::compute::cluster::{ClusterFeature, ClusterId, Feature, PointFeature};
use crate::config::{ImportanceKey, MarkerPolicy};
use crate::marker::style::{ClusterTier, Emphasis, FOREGROUND_Z_INDEX, IconDescriptor};
use crate::selection::SelectionSnapshot;
use crate::spatial::{DistanceMetric, sort_by_distance};
use geo::Point;
use std::sync::Arc;
use vacancy_types::{ShopRecord, Viewport};

/// Everything about the map besides the features that shapes the markers.
#[derive(Debug, Clone, PartialEq)]
pub struct MapState {
    pub viewport: Viewport,
    /// Location to rank points around, e.g. the user's position
    pub focal_point: Option<Point>,
    pub selection: SelectionSnapshot,
}

impl MapState {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            focal_point: None,
            selection: SelectionSnapshot::default(),
        }
    }

    pub fn with_focal_point(mut self, focal_point: Option<Point>) -> Self {
        self.focal_point = focal_point;
        self
    }

    pub fn with_selection(mut self, selection: SelectionSnapshot) -> Self {
        self.selection = selection;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterMarker {
    pub id: ClusterId,
    pub position: Point,
    pub point_count: usize,
    /// Abbreviated count shown on the badge
    pub label: String,
    pub tier: ClusterTier,
    pub z_index: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointMarker {
    pub shop: Arc<ShopRecord>,
    pub position: Point,
    pub icon: IconDescriptor,
    pub emphasis: Emphasis,
    pub z_index: i32,
}

impl PointMarker {
    pub fn is_selected(&self) -> bool {
        self.emphasis == Emphasis::Selected
    }

    pub fn is_hovered(&self) -> bool {
        self.emphasis == Emphasis::Hovered
    }
}

/// A marker ready for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum Marker {
    Cluster(ClusterMarker),
    Point(PointMarker),
}

impl Marker {
    /// Id passed back by the renderer when the marker is clicked:
    /// `cluster-<n>` for clusters, the shop id for points.
    pub fn target_id(&self) -> String {
        match self {
            Marker::Cluster(cluster) => cluster.id.to_string(),
            Marker::Point(point) => point.shop.id.clone(),
        }
    }

    pub fn position(&self) -> Point {
        match self {
            Marker::Cluster(cluster) => cluster.position,
            Marker::Point(point) => point.position,
        }
    }

    pub fn z_index(&self) -> i32 {
        match self {
            Marker::Cluster(cluster) => cluster.z_index,
            Marker::Point(point) => point.z_index,
        }
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self, Marker::Cluster(_))
    }

    pub fn as_point(&self) -> Option<&PointMarker> {
        match self {
            Marker::Point(point) => Some(point),
            Marker::Cluster(_) => None,
        }
    }

    pub fn as_cluster(&self) -> Option<&ClusterMarker> {
        match self {
            Marker::Cluster(cluster) => Some(cluster),
            Marker::Point(_) => None,
        }
    }
}

/// Markers for `features` under `state` and `policy`.
///
/// Clusters come first in query order, followed by points in the order the
/// caps left them.
pub fn materialize(features: &[Feature], state: &MapState, policy: &MarkerPolicy) -> Vec<Marker> {
    let bounds = &state.viewport.bounds;
    let visible = features.iter().filter(|f| bounds.contains(&f.position()));
    cap_and_style(visible, state, policy).0
}

/// [`materialize`] without the viewport filter, also returning how many
/// points the caps removed. For features that came straight from
/// [`ClusterIndex::query`](crate::ClusterIndex::query) for this viewport.
///
/// The query already tested containment in projected space, where edge
/// points and latitudes past the Mercator limit are kept. Testing again in
/// degrees would drop some of them.
pub(crate) fn materialize_queried(
    features: &[Feature],
    state: &MapState,
    policy: &MarkerPolicy,
) -> (Vec<Marker>, usize) {
    cap_and_style(features.iter(), state, policy)
}

fn cap_and_style<'a>(
    features: impl Iterator<Item = &'a Feature>,
    state: &MapState,
    policy: &MarkerPolicy,
) -> (Vec<Marker>, usize) {
    let mut clusters: Vec<&ClusterFeature> = Vec::new();
    let mut points: Vec<&PointFeature> = Vec::new();
    for feature in features {
        match feature {
            Feature::Cluster(cluster) => clusters.push(cluster),
            Feature::Point(point) => points.push(point),
        }
    }
    let visible_points = points.len();

    if state.viewport.zoom < policy.min_zoom_threshold
        && clusters.len() + points.len() > policy.max_markers
    {
        rank_by_importance(&mut points, policy.importance);
        points.truncate(policy.zoomed_out_cap());
    }

    match &state.focal_point {
        Some(focal) => {
            sort_by_distance(&mut points, focal, DistanceMetric::Haversine, |p| p.position());
            points.truncate(policy.max_markers.saturating_sub(clusters.len()));
        }
        None if points.len() > policy.max_markers => {
            rank_by_importance(&mut points, policy.importance);
            points.truncate(policy.max_markers);
        }
        None => {}
    }

    let truncated = visible_points - points.len();

    let mut markers = Vec::with_capacity(clusters.len() + points.len());
    markers.extend(clusters.into_iter().map(|cluster| Marker::Cluster(cluster_marker(cluster))));

    let mut selected_seen = false;
    for point in points {
        let emphasis = if !selected_seen && state.selection.is_selected(&point.shop.id) {
            selected_seen = true;
            Emphasis::Selected
        } else if state.selection.is_hovered(&point.shop.id) {
            Emphasis::Hovered
        } else {
            Emphasis::Normal
        };
        markers.push(Marker::Point(point_marker(point, emphasis)));
    }

    (markers, truncated)
}

/// Most important first; ties go to the smaller shop id.
fn rank_by_importance(points: &mut [&PointFeature], key: ImportanceKey) {
    points.sort_by(|a, b| {
        key.score(&b.shop)
            .total_cmp(&key.score(&a.shop))
            .then_with(|| a.shop.id.cmp(&b.shop.id))
    });
}

fn cluster_marker(cluster: &ClusterFeature) -> ClusterMarker {
    ClusterMarker {
        id: cluster.id,
        position: cluster.centroid,
        point_count: cluster.point_count,
        label: cluster.abbreviated_count(),
        tier: ClusterTier::for_count(cluster.point_count),
        z_index: FOREGROUND_Z_INDEX,
    }
}

fn point_marker(point: &PointFeature, emphasis: Emphasis) -> PointMarker {
    PointMarker {
        shop: Arc::clone(&point.shop),
        position: point.position(),
        icon: IconDescriptor::point(point.shop.category, emphasis),
        emphasis,
        z_index: emphasis.z_index(),
    }
}
