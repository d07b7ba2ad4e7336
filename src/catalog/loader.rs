//! Pipe-delimited catalog parsing and loading.
//!
//! One record per line, 11 fields:
//! `name|source|specialty|street|city|county|region|postal|phone|lon|lat`.
//! Blank lines and lines starting with `#` are ignored.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::catalog::model::{Address, Catalog, Facility};
use crate::error::CatalogError;
use crate::geo::GeoPoint;

const FIELD_COUNT: usize = 11;

const BUILTIN_CATALOG: &str = include_str!("../../data/clinics.txt");

/// Parse a single catalog line into a facility.
pub fn parse_record(line: &str) -> Result<Facility, CatalogError> {
    let malformed = |reason: String| CatalogError::MalformedRecord {
        line: line.to_string(),
        reason,
    };

    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    if fields.len() != FIELD_COUNT {
        return Err(malformed(format!(
            "expected {FIELD_COUNT} fields, found {}",
            fields.len()
        )));
    }

    if fields[0].is_empty() {
        return Err(malformed("empty name".into()));
    }

    let coord = |idx: usize, name: &str| -> Result<f64, CatalogError> {
        fields[idx]
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| malformed(format!("{name} {:?} is not a finite number", fields[idx])))
    };
    let lon = coord(9, "longitude")?;
    let lat = coord(10, "latitude")?;

    Ok(Facility {
        name: fields[0].to_string(),
        source: fields[1].to_string(),
        specialty: fields[2].to_string(),
        address: Address {
            street: fields[3].to_string(),
            city: fields[4].to_string(),
            county: fields[5].to_string(),
            region: fields[6].to_string(),
            postal_code: fields[7].to_string(),
        },
        contact: fields[8].to_string(),
        location: GeoPoint::new(lon, lat),
    })
}

/// Parse a whole catalog, skipping (and logging) malformed records.
pub fn parse_catalog(text: &str) -> Catalog {
    let mut facilities = Vec::new();
    let mut skipped = 0;

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_record(line) {
            Ok(facility) => facilities.push(facility),
            Err(e) => {
                warn!(line_no = idx + 1, error = %e, "Skipping catalog record");
                skipped += 1;
            }
        }
    }

    debug!(loaded = facilities.len(), skipped, "Parsed catalog");
    Catalog::with_skipped(facilities, skipped)
}

/// Load a catalog file from disk.
///
/// A read failure is reported as [`CatalogError::Unavailable`] rather than an
/// empty catalog; a file with no usable records is [`CatalogError::Empty`].
pub async fn load_from_path(path: &Path) -> Result<Catalog, CatalogError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CatalogError::Unavailable {
            path: path.to_path_buf(),
            source,
        })?;

    let catalog = parse_catalog(&text);
    if catalog.is_empty() {
        return Err(CatalogError::Empty);
    }

    info!(
        path = %path.display(),
        facilities = catalog.len(),
        skipped = catalog.skipped(),
        "Loaded catalog"
    );
    Ok(catalog)
}

/// The catalog shipped with the crate.
pub fn builtin() -> Catalog {
    parse_catalog(BUILTIN_CATALOG)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const STACY: &str = "Stacy Medical Center|BCC|FRONTLINE Provider/Occupational Industrial Clinic, Multi-Specialty|4580 Pacific Blvd|Vernon|Los Angeles|CA|90058|(323) 584-0779|-118.2248393|34.0019771";

    #[test]
    fn parses_full_record() {
        let f = parse_record(STACY).unwrap();
        assert_eq!(f.name, "Stacy Medical Center");
        assert_eq!(f.source, "BCC");
        assert_eq!(f.address.city, "Vernon");
        assert_eq!(f.address.county, "Los Angeles");
        assert_eq!(f.address.postal_code, "90058");
        assert_eq!(f.contact, "(323) 584-0779");
        assert_eq!(f.location, GeoPoint::new(-118.2248393, 34.0019771));
    }

    #[test]
    fn rejects_wrong_field_count() {
        let err = parse_record("Only|three|fields").unwrap_err();
        match err {
            CatalogError::MalformedRecord { reason, .. } => {
                assert!(reason.contains("expected 11 fields, found 3"), "{reason}");
            }
            other => panic!("Expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_numeric_coordinates() {
        let line = STACY.replace("-118.2248393", "west-ish");
        assert!(matches!(
            parse_record(&line),
            Err(CatalogError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn rejects_empty_name() {
        let line = STACY.replacen("Stacy Medical Center", "", 1);
        assert!(parse_record(&line).is_err());
    }

    #[test]
    fn bulk_parse_skips_bad_records() {
        let text = format!("# header\r\n{STACY}\r\n\r\nbroken|line\r\n{STACY}\r\n");
        let catalog = parse_catalog(&text);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.skipped(), 1);
    }

    #[test]
    fn builtin_catalog_is_clean() {
        let catalog = builtin();
        assert_eq!(catalog.len(), 47);
        assert_eq!(catalog.skipped(), 0);
        assert_eq!(catalog.facilities()[0].name, "Southern Calif Medical Group");
    }

    #[tokio::test]
    async fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{STACY}").unwrap();
        writeln!(file, "not a record").unwrap();

        let catalog = load_from_path(file.path()).await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.skipped(), 1);
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_from_path(&dir.path().join("nope.txt")).await.unwrap_err();
        assert!(matches!(err, CatalogError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn file_without_records_is_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# nothing here").unwrap();
        let err = load_from_path(file.path()).await.unwrap_err();
        assert!(matches!(err, CatalogError::Empty));
    }
}
