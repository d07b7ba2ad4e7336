//! Facility records and the immutable catalog snapshot.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Postal address of a facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub county: String,
    pub region: String,
    pub postal_code: String,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {} {}",
            self.street, self.city, self.region, self.postal_code
        )
    }
}

/// A clinic or provider location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub name: String,
    /// Tag identifying which directory the record came from.
    pub source: String,
    pub specialty: String,
    pub address: Address,
    /// Free-form phone field; may hold several comma-separated numbers.
    pub contact: String,
    pub location: GeoPoint,
}

/// An immutable, ordered list of facilities.
///
/// Entries are `Arc`-shared so ranked results can point at them without
/// copying the record.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    facilities: Vec<Arc<Facility>>,
    /// Number of records rejected while this catalog was parsed.
    skipped: usize,
}

impl Catalog {
    pub fn new(facilities: Vec<Facility>) -> Self {
        Self::with_skipped(facilities, 0)
    }

    pub(crate) fn with_skipped(facilities: Vec<Facility>, skipped: usize) -> Self {
        Self {
            facilities: facilities.into_iter().map(Arc::new).collect(),
            skipped,
        }
    }

    pub fn facilities(&self) -> &[Arc<Facility>] {
        &self.facilities
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
