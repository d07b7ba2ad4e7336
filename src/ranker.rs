//! Nearest-facility ranking.
//!
//! `rank` is a pure function of (catalog, query point, unit, k): it measures
//! the distance from the query to every facility, stable-sorts ascending, and
//! keeps the first `k`. Equal distances keep their catalog order.

use std::sync::Arc;

use crate::catalog::Facility;
use crate::error::RankError;
use crate::geo::{self, Distance, DistanceUnit, GeoPoint};

/// A facility paired with its distance from the query point.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedFacility {
    pub facility: Arc<Facility>,
    pub distance: Distance,
}

/// Return the `k` facilities nearest to `query`, nearest first.
///
/// Fails with [`RankError::InvalidInput`] when the catalog is empty, the query
/// has a non-finite coordinate, or `k` is zero. A `k` larger than the catalog
/// returns every entry.
pub fn rank(
    facilities: &[Arc<Facility>],
    query: GeoPoint,
    unit: DistanceUnit,
    k: usize,
) -> Result<Vec<RankedFacility>, RankError> {
    if facilities.is_empty() {
        return Err(RankError::InvalidInput("catalog is empty".into()));
    }
    if !query.is_finite() {
        return Err(RankError::InvalidInput(format!(
            "query point {query} has a non-finite coordinate"
        )));
    }
    if k == 0 {
        return Err(RankError::InvalidInput("k must be at least 1".into()));
    }

    let mut ranked: Vec<RankedFacility> = facilities
        .iter()
        .map(|facility| RankedFacility {
            distance: Distance {
                value: geo::distance(facility.location, query, unit),
                unit,
            },
            facility: Arc::clone(facility),
        })
        .collect();

    // `sort_by` is stable, so ties keep catalog order.
    ranked.sort_by(|a, b| a.distance.value.total_cmp(&b.distance.value));
    ranked.truncate(k);

    tracing::debug!(
        %query,
        candidates = facilities.len(),
        returned = ranked.len(),
        "Ranked facilities"
    );
    Ok(ranked)
}
