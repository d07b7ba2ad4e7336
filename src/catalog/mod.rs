//! Facility catalog: record parsing, loading, and the shared snapshot.
//!
//! The catalog is read-mostly reference data: it is parsed once into an
//! immutable [`Catalog`] and shared behind a [`CatalogHandle`] that can swap
//! in a freshly loaded snapshot without disturbing in-flight readers.

pub mod handle;
pub mod loader;
pub mod model;

pub use handle::CatalogHandle;
pub use loader::{builtin, load_from_path, parse_catalog, parse_record};
pub use model::{Address, Catalog, Facility};
