//! Swappable handle to the current cluster index.
//!
//! A data reload builds a complete new [`ClusterIndex`] off to the side and
//! then swaps it in. Readers hold an `Arc` to whichever index was current
//! when they asked, so they see either the old or the new index in full,
//! never a partially built one.
//!
//! ```rust
//! use vacancy_map::{ClusterIndex, IndexConfig, ShopRecord, SharedIndex};
//!
//! # fn main() -> vacancy_map::Result<()> {
//! let shared = SharedIndex::new(ClusterIndex::empty(IndexConfig::default())?);
//! let before = shared.current();
//!
//! let shops = vec![ShopRecord::new("a", 35.15, 129.05)];
//! shared.replace(ClusterIndex::build(shops, IndexConfig::default())?);
//!
//! assert!(before.is_empty());
//! assert_eq!(shared.current().len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::compute::cluster::ClusterIndex;
use crate::config::IndexConfig;
use crate::error::Result;
use parking_lot::RwLock;
use std::sync::Arc;
use vacancy_types::ShopRecord;

/// Shared, atomically replaceable `ClusterIndex`.
#[derive(Clone, Debug)]
pub struct SharedIndex {
    inner: Arc<RwLock<Arc<ClusterIndex>>>,
}

impl SharedIndex {
    pub fn new(index: ClusterIndex) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(index))),
        }
    }

    /// The index readers should use right now.
    pub fn current(&self) -> Arc<ClusterIndex> {
        Arc::clone(&self.inner.read())
    }

    /// Swap in `index`, returning the one it replaced.
    pub fn replace(&self, index: ClusterIndex) -> Arc<ClusterIndex> {
        self.swap(Arc::new(index))
    }

    /// Build a new index from `shops` and swap it in.
    ///
    /// The build runs without holding the lock. On error the current index
    /// stays in place. Returns the index this call built, even if another
    /// writer has replaced it since.
    pub fn rebuild<I>(&self, shops: I, config: IndexConfig) -> Result<Arc<ClusterIndex>>
    where
        I: IntoIterator<Item = ShopRecord>,
    {
        let index = Arc::new(ClusterIndex::build(shops, config)?);
        self.swap(Arc::clone(&index));
        Ok(index)
    }

    fn swap(&self, index: Arc<ClusterIndex>) -> Arc<ClusterIndex> {
        let mut guard = self.inner.write();
        std::mem::replace(&mut *guard, index)
    }
}
