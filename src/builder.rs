//! Builder for marker managers
//!
//! Collects configuration, an optional shared index and selection store,
//! and the host callback before creating a [`MarkerManager`].

use crate::compute::cluster::ClusterIndex;
use crate::config::{Config, IndexConfig, MarkerPolicy, TimingConfig};
use crate::error::{Result, VacancyError};
use crate::marker::manager::{MarkerManager, SelectCallback};
use crate::marker::map::MapWidget;
use crate::schedule::{Debouncer, Throttle};
use crate::selection::SelectionStore;
use crate::shared::SharedIndex;
use geo::Point;
use vacancy_types::ShopRecord;

/// Builder for [`MarkerManager`] with configuration and shared state.
pub struct MarkerManagerBuilder<M: MapWidget> {
    map: M,
    config: Config,
    index: Option<SharedIndex>,
    selection: Option<SelectionStore>,
    focal_point: Option<Point>,
    on_select: Option<SelectCallback>,
}

impl<M: MapWidget> MarkerManagerBuilder<M> {
    /// Create a builder with default configuration around `map`.
    pub fn new(map: M) -> Self {
        Self {
            map,
            config: Config::default(),
            index: None,
            selection: None,
            focal_point: None,
            on_select: None,
        }
    }

    /// Set the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn index_config(mut self, index: IndexConfig) -> Self {
        self.config.index = index;
        self
    }

    pub fn policy(mut self, policy: MarkerPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    pub fn timing(mut self, timing: TimingConfig) -> Self {
        self.config.timing = timing;
        self
    }

    /// Use an index handle shared with other readers. Without one the
    /// manager starts from an empty index.
    pub fn shared_index(mut self, index: SharedIndex) -> Self {
        self.index = Some(index);
        self
    }

    /// Use a selection store shared with the host UI.
    pub fn selection(mut self, selection: SelectionStore) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn focal_point(mut self, point: Point) -> Self {
        self.focal_point = Some(point);
        self
    }

    /// Callback run when a point marker is clicked.
    pub fn on_select<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&ShopRecord) + Send + 'static,
    {
        self.on_select = Some(Box::new(callback));
        self
    }

    /// Validate the configuration and create the manager.
    pub fn build(self) -> Result<MarkerManager<M>> {
        self.config.validate().map_err(VacancyError::InvalidConfig)?;

        let index = match self.index {
            Some(index) => index,
            None => SharedIndex::new(ClusterIndex::empty(self.config.index.clone())?),
        };
        let timing = &self.config.timing;

        Ok(MarkerManager::from_parts(
            self.map,
            index,
            self.config.index.clone(),
            self.selection.unwrap_or_default(),
            self.config.policy.clone(),
            self.focal_point,
            Debouncer::new(timing.viewport_debounce()),
            Throttle::new(timing.click_throttle()),
            self.on_select,
        ))
    }
}
