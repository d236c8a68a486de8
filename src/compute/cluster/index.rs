use super::linkage::{UnionFind, link_within};
use super::query::ClusterFeature;
use super::{ClusterId, GENERATION_MASK};
use crate::compute::projection::{self, pixels_to_world};
use crate::compute::validation::validate_shop;
use crate::config::IndexConfig;
use crate::error::{Result, VacancyError};
use rstar::RTree;
use rstar::primitives::GeomWithData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use vacancy_types::ShopRecord;

/// A projected shop position tagged with its index in `ClusterIndex::shops`.
pub(crate) type IndexedPoint = GeomWithData<[f64; 2], u32>;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Grouping of all points at one zoom level.
///
/// Components are numbered in order of their smallest member, and members
/// are stored contiguously per component (CSR layout) in ascending order.
#[derive(Debug, Clone)]
pub(crate) struct Level {
    pub(crate) zoom: u8,
    /// Component label per point
    pub(crate) labels: Vec<u32>,
    offsets: Vec<u32>,
    members: Vec<u32>,
    /// First zoom at which each component splits
    expansion: Vec<u8>,
}

impl Level {
    fn snapshot(zoom: u8, uf: &mut UnionFind, len: usize, finer: Option<&Level>, max_zoom: u8) -> Self {
        let mut label_of_root = vec![u32::MAX; len];
        let mut labels = Vec::with_capacity(len);
        let mut next = 0u32;
        for i in 0..len {
            let root = uf.find(i as u32) as usize;
            if label_of_root[root] == u32::MAX {
                label_of_root[root] = next;
                next += 1;
            }
            labels.push(label_of_root[root]);
        }

        let count = next as usize;
        let mut offsets = vec![0u32; count + 1];
        for &label in &labels {
            offsets[label as usize + 1] += 1;
        }
        for c in 0..count {
            offsets[c + 1] += offsets[c];
        }

        let mut cursor = offsets[..count].to_vec();
        let mut members = vec![0u32; len];
        for (i, &label) in labels.iter().enumerate() {
            members[cursor[label as usize] as usize] = i as u32;
            cursor[label as usize] += 1;
        }

        let mut level = Self {
            zoom,
            labels,
            offsets,
            members,
            expansion: Vec::new(),
        };

        // Levels nest, so a component either equals one component of the
        // finer level (and inherits its expansion zoom) or splits right there.
        let expansion = (0..count)
            .map(|c| match finer {
                None => max_zoom + 1,
                Some(finer) => {
                    let first = level.members_of(c)[0] as usize;
                    let child = finer.labels[first] as usize;
                    if finer.size_of(child) < level.size_of(c) {
                        finer.zoom
                    } else {
                        finer.expansion[child]
                    }
                }
            })
            .collect();
        level.expansion = expansion;

        level
    }

    pub(crate) fn component_count(&self) -> usize {
        self.offsets.len() - 1
    }

    pub(crate) fn members_of(&self, component: usize) -> &[u32] {
        &self.members[self.offsets[component] as usize..self.offsets[component + 1] as usize]
    }

    pub(crate) fn size_of(&self, component: usize) -> usize {
        (self.offsets[component + 1] - self.offsets[component]) as usize
    }
}

/// Cluster index over one full set of shop records.
///
/// Built in one pass and immutable afterwards; a data reload builds a new
/// index and swaps it in (see [`crate::shared::SharedIndex`]).
///
/// ```rust
/// use vacancy_map::{ClusterIndex, IndexConfig, MapBounds, ShopRecord};
///
/// let shops = vec![
///     ShopRecord::new("a", 35.1578, 129.0590),
///     ShopRecord::new("b", 35.1579, 129.0591),
///     ShopRecord::new("c", 35.1631, 129.1604),
/// ];
/// let index = ClusterIndex::build(shops, IndexConfig::default())?;
///
/// let busan = MapBounds::new(128.9, 35.0, 129.3, 35.3);
/// let features = index.query(&busan, 13);
/// assert_eq!(features.len(), 2); // a+b clustered, c alone
/// # Ok::<(), vacancy_map::VacancyError>(())
/// ```
pub struct ClusterIndex {
    pub(crate) config: IndexConfig,
    pub(crate) generation: u64,
    /// Valid records, sorted by id, without duplicates
    pub(crate) shops: Vec<Arc<ShopRecord>>,
    pub(crate) tree: RTree<IndexedPoint>,
    /// One level per zoom in `min_zoom..=max_zoom`
    pub(crate) levels: Vec<Level>,
    skipped: usize,
}

impl ClusterIndex {
    /// Build an index from a full set of records.
    ///
    /// Records with missing or out-of-range coordinates are skipped with a
    /// warning, as are repeated ids (the first occurrence wins). Only an
    /// invalid `config` makes the build fail.
    pub fn build<I>(records: I, config: IndexConfig) -> Result<Self>
    where
        I: IntoIterator<Item = ShopRecord>,
    {
        config.validate().map_err(VacancyError::InvalidConfig)?;
        let started = Instant::now();

        let (shops, skipped) = prepare_records(records);
        let coords: Vec<[f64; 2]> = shops
            .iter()
            .map(|shop| projection::project(shop.longitude, shop.latitude))
            .collect();

        let tree = RTree::bulk_load(
            coords
                .iter()
                .enumerate()
                .map(|(i, coord)| GeomWithData::new(*coord, i as u32))
                .collect(),
        );
        let levels = build_levels(&coords, &config);

        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed) & GENERATION_MASK;

        log::debug!(
            "Built cluster index #{} over {} shops ({} skipped), zooms {}..={} in {:?}",
            generation,
            shops.len(),
            skipped,
            config.min_zoom,
            config.max_zoom,
            started.elapsed()
        );

        Ok(Self {
            config,
            generation,
            shops,
            tree,
            levels,
            skipped,
        })
    }

    /// An index with no points; every query returns nothing.
    pub fn empty(config: IndexConfig) -> Result<Self> {
        Self::build(Vec::new(), config)
    }

    pub fn len(&self) -> usize {
        self.shops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shops.is_empty()
    }

    /// Number of input records left out of the index.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn min_zoom(&self) -> u8 {
        self.config.min_zoom
    }

    pub fn max_zoom(&self) -> u8 {
        self.config.max_zoom
    }

    /// Look up an indexed shop by id.
    pub fn shop(&self, id: &str) -> Option<&Arc<ShopRecord>> {
        self.shops
            .binary_search_by(|shop| shop.id.as_str().cmp(id))
            .ok()
            .map(|i| &self.shops[i])
    }

    /// All indexed shops in id order.
    pub fn shops(&self) -> impl Iterator<Item = &Arc<ShopRecord>> {
        self.shops.iter()
    }

    /// Level used to cluster at `zoom`, or `None` above `max_zoom`.
    pub(crate) fn level(&self, zoom: u8) -> Option<&Level> {
        if zoom > self.config.max_zoom {
            return None;
        }
        let zoom = zoom.max(self.config.min_zoom);
        self.levels.get(usize::from(zoom - self.config.min_zoom))
    }

    /// Resolve a cluster id minted by this index.
    pub(crate) fn resolve(&self, id: ClusterId) -> Result<(&Level, usize)> {
        if id.generation() != self.generation {
            return Err(VacancyError::ClusterNotFound(id));
        }
        let zoom = id.zoom();
        if zoom < self.config.min_zoom {
            return Err(VacancyError::ClusterNotFound(id));
        }
        let level = self.level(zoom).ok_or(VacancyError::ClusterNotFound(id))?;
        let component = id.component() as usize;
        if component >= level.component_count() || level.size_of(component) < self.config.min_points
        {
            return Err(VacancyError::ClusterNotFound(id));
        }
        Ok((level, component))
    }

    /// Minimum zoom at which the cluster `id` splits into two or more
    /// features. Returns `max_zoom + 1` when it only comes apart once
    /// clustering stops.
    pub fn get_expansion_zoom(&self, id: ClusterId) -> Result<u8> {
        let (level, component) = self.resolve(id)?;
        Ok(level.expansion[component])
    }

    /// Minimum zoom at which the members of `feature` stop forming a single
    /// group. Unlike [`get_expansion_zoom`](Self::get_expansion_zoom) this
    /// follows the feature's own members, which at the viewport edge can be
    /// a subset of the full cluster.
    pub fn expansion_zoom_of(&self, feature: &ClusterFeature) -> Result<u8> {
        let id = feature.id;
        if id.generation() != self.generation
            || feature.members.iter().any(|&m| m as usize >= self.shops.len())
        {
            return Err(VacancyError::ClusterNotFound(id));
        }
        let Some(&first) = feature.members.first() else {
            return Err(VacancyError::ClusterNotFound(id));
        };

        let start = id.zoom().max(self.config.min_zoom);
        for zoom in start.saturating_add(1)..=self.config.max_zoom {
            let Some(level) = self.level(zoom) else { break };
            let label = level.labels[first as usize];
            if feature
                .members
                .iter()
                .any(|&m| level.labels[m as usize] != label)
            {
                return Ok(zoom);
            }
        }
        Ok(self.config.max_zoom + 1)
    }

    /// Member shops of cluster `id` in id order, paged by `offset`/`limit`.
    pub fn get_leaves(&self, id: ClusterId, limit: usize, offset: usize) -> Result<Vec<Arc<ShopRecord>>> {
        let (level, component) = self.resolve(id)?;
        Ok(level
            .members_of(component)
            .iter()
            .skip(offset)
            .take(limit)
            .map(|&i| Arc::clone(&self.shops[i as usize]))
            .collect())
    }
}

impl std::fmt::Debug for ClusterIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterIndex")
            .field("generation", &self.generation)
            .field("points", &self.shops.len())
            .field("skipped", &self.skipped)
            .field("levels", &self.levels.len())
            .finish()
    }
}

/// Drop invalid records, sort by id and keep the first of each id.
fn prepare_records<I>(records: I) -> (Vec<Arc<ShopRecord>>, usize)
where
    I: IntoIterator<Item = ShopRecord>,
{
    let mut skipped = 0usize;
    let mut shops: Vec<ShopRecord> = records
        .into_iter()
        .filter(|shop| match validate_shop(shop) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Skipping shop record: {}", e);
                skipped += 1;
                false
            }
        })
        .collect();

    // Stable, so the first occurrence of a repeated id stays in front.
    shops.sort_by(|a, b| a.id.cmp(&b.id));
    let before = shops.len();
    shops.dedup_by(|later, earlier| later.id == earlier.id);
    let duplicates = before - shops.len();
    if duplicates > 0 {
        log::warn!("Dropped {} shop records with repeated ids", duplicates);
        skipped += duplicates;
    }

    (shops.into_iter().map(Arc::new).collect(), skipped)
}

fn build_levels(coords: &[[f64; 2]], config: &IndexConfig) -> Vec<Level> {
    let mut uf = UnionFind::new(coords.len());
    let mut levels: Vec<Level> = Vec::with_capacity(usize::from(config.max_zoom - config.min_zoom) + 1);

    // Finest level first: the linking radius only grows from here.
    for zoom in (config.min_zoom..=config.max_zoom).rev() {
        let threshold = pixels_to_world(config.radius, config.extent, zoom);
        link_within(&mut uf, coords, threshold);
        let level = Level::snapshot(zoom, &mut uf, coords.len(), levels.last(), config.max_zoom);
        levels.push(level);
    }

    levels.reverse();
    levels
}
