//! Shared, atomically replaceable catalog snapshot.

use std::path::Path;
use std::sync::{Arc, RwLock};

use tracing::info;

use crate::catalog::loader::load_from_path;
use crate::catalog::model::Catalog;
use crate::error::{CatalogError, RankError};
use crate::geo::{DistanceUnit, GeoPoint};
use crate::ranker::{RankedFacility, rank};

/// Cloneable handle to the current catalog snapshot.
///
/// Readers take an `Arc` to the snapshot and work on it without holding the
/// lock; `replace` swaps the whole snapshot in one step, so a reader sees
/// either the old catalog or the new one, never a mix.
#[derive(Debug, Clone)]
pub struct CatalogHandle {
    current: Arc<RwLock<Arc<Catalog>>>,
}

impl CatalogHandle {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    /// The snapshot in effect right now.
    pub fn snapshot(&self) -> Arc<Catalog> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Install a new snapshot, returning the one it replaced.
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let next = Arc::new(catalog);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, next)
    }

    /// Reload from a file. On failure the current snapshot stays in place.
    pub async fn reload_from(&self, path: &Path) -> Result<usize, CatalogError> {
        let catalog = load_from_path(path).await?;
        let count = catalog.len();
        let previous = self.replace(catalog);
        info!(
            path = %path.display(),
            facilities = count,
            previous = previous.len(),
            "Catalog snapshot replaced"
        );
        Ok(count)
    }

    /// Rank the current snapshot against `query`.
    pub fn rank(
        &self,
        query: GeoPoint,
        unit: DistanceUnit,
        k: usize,
    ) -> Result<Vec<RankedFacility>, RankError> {
        let snapshot = self.snapshot();
        rank(snapshot.facilities(), query, unit, k)
    }
}
