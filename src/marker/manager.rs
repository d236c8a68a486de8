//! Event-driven glue between a map widget, the cluster index and the
//! marker optimizer.
//!
//! The manager owns no timers. Hosts forward widget events together with
//! the current `Instant` and call [`MarkerManager::poll`] once
//! [`MarkerManager::next_deadline`] has passed.

use crate::builder::MarkerManagerBuilder;
use crate::compute::cluster::{ClusterFeature, ClusterId, ClusterIndex, Feature};
use crate::config::{IndexConfig, MarkerPolicy};
use crate::error::{Result, VacancyError};
use crate::marker::map::MapWidget;
use crate::marker::optimizer::{MapState, Marker, materialize_queried};
use crate::schedule::{Debouncer, Throttle};
use crate::selection::SelectionStore;
use crate::shared::SharedIndex;
use crate::spatial::centroid;
use crate::stats::{PassStats, TimingWindow};
use geo::Point;
use std::sync::Arc;
use std::time::Instant;
use vacancy_types::{ShopRecord, Viewport};

/// Called with the shop a user clicked, so the host can open its details.
pub type SelectCallback = Box<dyn FnMut(&ShopRecord) + Send>;

/// Keeps the markers on a [`MapWidget`] in sync with the shop data, the
/// viewport and the selection.
///
/// ```rust
/// use std::time::{Duration, Instant};
/// use vacancy_map::marker::{MapWidget, Marker};
/// use vacancy_map::{MapBounds, MarkerManager, ShopRecord, Viewport};
///
/// #[derive(Default)]
/// struct Headless {
///     shown: usize,
/// }
///
/// impl MapWidget for Headless {
///     fn viewport(&self) -> vacancy_map::Result<Viewport> {
///         Ok(Viewport::new(MapBounds::new(128.9, 35.0, 129.3, 35.3), 12))
///     }
///     fn set_zoom(&mut self, _zoom: u8) -> vacancy_map::Result<()> { Ok(()) }
///     fn set_center(&mut self, _center: geo::Point) -> vacancy_map::Result<()> { Ok(()) }
///     fn clear_markers(&mut self) -> vacancy_map::Result<()> { self.shown = 0; Ok(()) }
///     fn add_marker(&mut self, _marker: &Marker) -> vacancy_map::Result<()> { self.shown += 1; Ok(()) }
/// }
///
/// # fn main() -> vacancy_map::Result<()> {
/// let mut manager = MarkerManager::builder(Headless::default()).build()?;
/// manager.load_shops(vec![
///     ShopRecord::new("a", 35.1578, 129.0590),
///     ShopRecord::new("b", 35.2289, 129.0813),
/// ])?;
/// assert_eq!(manager.map().shown, 2);
///
/// let now = Instant::now();
/// manager.on_viewport_changed(now);
/// assert!(!manager.poll(now));
/// assert!(manager.poll(now + Duration::from_millis(300)));
/// # Ok(())
/// # }
/// ```
pub struct MarkerManager<M: MapWidget> {
    map: M,
    index: SharedIndex,
    index_config: IndexConfig,
    selection: SelectionStore,
    policy: MarkerPolicy,
    focal_point: Option<Point>,
    viewport_changes: Debouncer<Viewport>,
    clicks: Throttle,
    /// Query result behind `markers`, and the index generation it came from
    features: Vec<Feature>,
    features_generation: Option<u64>,
    markers: Vec<Marker>,
    last_state: Option<MapState>,
    timings: TimingWindow,
    stats: PassStats,
    on_select: Option<SelectCallback>,
}

impl<M: MapWidget> MarkerManager<M> {
    pub fn builder(map: M) -> MarkerManagerBuilder<M> {
        MarkerManagerBuilder::new(map)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        map: M,
        index: SharedIndex,
        index_config: IndexConfig,
        selection: SelectionStore,
        policy: MarkerPolicy,
        focal_point: Option<Point>,
        viewport_changes: Debouncer<Viewport>,
        clicks: Throttle,
        on_select: Option<SelectCallback>,
    ) -> Self {
        Self {
            map,
            index,
            index_config,
            selection,
            policy,
            focal_point,
            viewport_changes,
            clicks,
            features: Vec::new(),
            features_generation: None,
            markers: Vec::new(),
            last_state: None,
            timings: TimingWindow::new(),
            stats: PassStats::new(),
            on_select,
        }
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    /// The index currently in use.
    pub fn index(&self) -> Arc<ClusterIndex> {
        self.index.current()
    }

    pub fn shared_index(&self) -> &SharedIndex {
        &self.index
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    pub fn policy(&self) -> &MarkerPolicy {
        &self.policy
    }

    pub fn set_policy(&mut self, policy: MarkerPolicy) {
        self.policy = policy;
    }

    pub fn set_focal_point(&mut self, focal_point: Option<Point>) {
        self.focal_point = focal_point;
    }

    pub fn on_select<F>(&mut self, callback: F)
    where
        F: FnMut(&ShopRecord) + Send + 'static,
    {
        self.on_select = Some(Box::new(callback));
    }

    /// Markers from the last successful pass.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Query result the current markers were made from.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn timings(&self) -> &TimingWindow {
        &self.timings
    }

    pub fn stats(&self) -> &PassStats {
        &self.stats
    }

    /// Replace the shop data wholesale and redraw.
    ///
    /// The new index is built before anything changes, so a failed build
    /// leaves the current data on screen. A successful reload clears the
    /// selection and drops any pending viewport pass. Returns the number
    /// of indexed shops.
    pub fn load_shops<I>(&mut self, shops: I) -> Result<usize>
    where
        I: IntoIterator<Item = ShopRecord>,
    {
        let index = self.index.rebuild(shops, self.index_config.clone())?;
        log::info!(
            "Loaded {} shops ({} skipped) into index #{}",
            index.len(),
            index.skipped(),
            index.generation()
        );

        self.selection.reset();
        self.viewport_changes.cancel();
        self.features.clear();
        self.features_generation = None;
        self.refresh();
        Ok(index.len())
    }

    /// Note that the map moved or zoomed. The pass runs once the viewport
    /// has been still for the debounce window.
    pub fn on_viewport_changed(&mut self, now: Instant) {
        match self.map.viewport() {
            Ok(viewport) => self.viewport_changes.trigger(now, viewport),
            Err(e) => log::warn!("Ignoring viewport change: {}", e),
        }
    }

    /// When [`poll`](Self::poll) next has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.viewport_changes.next_deadline()
    }

    /// Run the debounced pass if it is due. Returns true if a pass ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.viewport_changes.poll(now) {
            Some(viewport) => {
                self.render(viewport);
                true
            }
            None => false,
        }
    }

    /// Query and redraw for the map's current viewport right away.
    pub fn refresh(&mut self) -> &[Marker] {
        match self.map.viewport() {
            Ok(viewport) => self.render(viewport),
            Err(e) => {
                log::warn!("Skipping marker pass: {}", e);
                self.stats.record_skipped();
                &[]
            }
        }
    }

    /// Handle a click on any marker by its target id.
    ///
    /// Indexed shop ids are matched first, so a shop whose id happens to
    /// start with `cluster-` still selects that shop.
    pub fn on_marker_click(&mut self, now: Instant, target: &str) -> bool {
        let is_shop = self.index.current().shop(target).is_some();
        if !is_shop && target.starts_with("cluster-") {
            match target.parse::<ClusterId>() {
                Ok(id) => self.on_cluster_click(now, id),
                Err(e) => {
                    log::debug!("Ignoring click: {}", e);
                    false
                }
            }
        } else {
            self.on_point_click(now, target)
        }
    }

    /// Zoom the map in on a cluster until it splits and center on it.
    ///
    /// Returns true if the map was moved. Throttled clicks, ids the current
    /// index does not know and an unavailable map all leave the map alone.
    pub fn on_cluster_click(&mut self, now: Instant, id: ClusterId) -> bool {
        if !self.clicks.try_acquire(now) {
            log::trace!("Throttled click on {}", id);
            return false;
        }

        let index = self.index.current();
        let (zoom, center) = match self.expansion_target(&index, id) {
            Ok(target) => target,
            Err(e) => {
                log::debug!("Ignoring click on {}: {}", id, e);
                return false;
            }
        };
        let zoom = zoom.min(index.max_zoom() + 1);

        let moved = self
            .map
            .set_zoom(zoom)
            .and_then(|()| self.map.set_center(center));
        if let Err(e) = moved {
            log::warn!("Could not zoom into {}: {}", id, e);
            return false;
        }
        true
    }

    /// Select a shop and tell the host about it.
    pub fn on_point_click(&mut self, now: Instant, id: &str) -> bool {
        if !self.clicks.try_acquire(now) {
            log::trace!("Throttled click on shop {}", id);
            return false;
        }
        if let Err(e) = self.map.viewport() {
            log::warn!("Ignoring click on shop {}: {}", id, e);
            return false;
        }

        let index = self.index.current();
        let Some(shop) = index.shop(id).cloned() else {
            log::debug!("Ignoring click on unknown shop {}", id);
            return false;
        };

        self.selection.select(Some(id));
        if let Some(callback) = self.on_select.as_mut() {
            callback(shop.as_ref());
        }
        self.restyle();
        true
    }

    /// Track the hovered shop; `None` when the pointer leaves.
    pub fn on_point_hover(&mut self, id: Option<&str>) {
        if self.selection.hover(id) {
            self.restyle();
        }
    }

    pub fn clear_selection(&mut self) {
        if self.selection.select(None) {
            self.restyle();
        }
    }

    fn render(&mut self, viewport: Viewport) -> &[Marker] {
        let started = Instant::now();
        let index = self.index.current();

        let features = index.query(&viewport.bounds, viewport.zoom);
        let state = MapState::new(viewport)
            .with_focal_point(self.focal_point)
            .with_selection(self.selection.snapshot());

        let (markers, truncated) = materialize_queried(&features, &state, &self.policy);
        if let Err(e) = self.map.show_markers(&markers) {
            log::warn!("Skipping marker pass: {}", e);
            self.stats.record_skipped();
            return &[];
        }

        let clusters = markers.iter().filter(|m| m.is_cluster()).count();
        self.stats
            .record_pass(features.len(), markers.len(), clusters, truncated);
        self.timings.record(started.elapsed());
        log::debug!(
            "Showing {} markers for {} features at zoom {} in {:?}",
            markers.len(),
            features.len(),
            viewport.zoom,
            started.elapsed()
        );

        self.features = features;
        self.features_generation = Some(index.generation());
        self.markers = markers;
        self.last_state = Some(state);
        &self.markers
    }

    /// Redraw the last features with the current selection, without a new
    /// query. Falls back to a full pass if the index has been replaced.
    fn restyle(&mut self) {
        if self.features_generation != Some(self.index.current().generation()) {
            self.refresh();
            return;
        }
        let Some(state) = self.last_state.take() else {
            self.refresh();
            return;
        };

        let state = state.with_selection(self.selection.snapshot());
        let (markers, _) = materialize_queried(&self.features, &state, &self.policy);
        match self.map.show_markers(&markers) {
            Ok(()) => self.markers = markers,
            Err(e) => log::warn!("Skipping marker restyle: {}", e),
        }
        self.last_state = Some(state);
    }

    /// Expansion zoom and centroid for a click on `id`.
    ///
    /// Prefers the feature shown on screen, whose members may be only the
    /// in-view part of the cluster.
    fn expansion_target(&self, index: &ClusterIndex, id: ClusterId) -> Result<(u8, Point)> {
        if self.features_generation == Some(index.generation())
            && let Some(feature) = self.shown_cluster(id)
        {
            return Ok((index.expansion_zoom_of(feature)?, feature.centroid));
        }

        let zoom = index.get_expansion_zoom(id)?;
        let leaves = index.get_leaves(id, usize::MAX, 0)?;
        let center = centroid(leaves.iter().map(|shop| shop.position()))
            .ok_or(VacancyError::ClusterNotFound(id))?;
        Ok((zoom, center))
    }

    fn shown_cluster(&self, id: ClusterId) -> Option<&ClusterFeature> {
        self.features
            .iter()
            .filter_map(Feature::as_cluster)
            .find(|cluster| cluster.id == id)
    }
}

impl<M: MapWidget + std::fmt::Debug> std::fmt::Debug for MarkerManager<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkerManager")
            .field("map", &self.map)
            .field("index", &self.index)
            .field("markers", &self.markers.len())
            .field("selection", &self.selection)
            .finish()
    }
}
