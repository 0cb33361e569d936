// src/import/importer.rs

use crate::domain::laundromat::{format_full_address, Laundromat, NewLaundromat};
use crate::errors::ServerError;
use crate::import::normalize::{
    collapse_whitespace, format_phone, normalize_coordinates, normalize_name,
    normalize_state_code, normalize_website, normalize_zip, parse_address, parse_hours_cell,
    parse_rating, parse_review_count, slugify, split_services,
};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// The two storage operations the importer needs.
pub trait ListingStore {
    fn create_laundromat(&mut self, new: NewLaundromat) -> Result<Laundromat, ServerError>;
    fn get_laundry_by_slug(&mut self, slug: &str) -> Result<Option<Laundromat>, ServerError>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub total: usize,
    pub imported: usize,
    pub duplicates: usize,
    pub errors: Vec<String>,
}

/// Failures that stop the whole run. Row-level problems go into `ImportResult::errors`.
#[derive(Debug)]
pub enum ImportError {
    Io(String),
    Csv(String),
    MissingColumn(&'static str),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Io(msg) => write!(f, "Import I/O error: {msg}"),
            ImportError::Csv(msg) => write!(f, "CSV error: {msg}"),
            ImportError::MissingColumn(col) => write!(f, "CSV header has no '{col}' column"),
        }
    }
}

impl std::error::Error for ImportError {}

/// Header positions, resolved case-insensitively with a few common aliases.
#[derive(Debug, Default)]
struct Columns {
    name: usize,
    address: Option<usize>,
    city: Option<usize>,
    state: Option<usize>,
    zip: Option<usize>,
    phone: Option<usize>,
    website: Option<usize>,
    latitude: Option<usize>,
    longitude: Option<usize>,
    hours: Option<usize>,
    services: Option<usize>,
    rating: Option<usize>,
    reviews: Option<usize>,
    description: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, ImportError> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_lowercase().replace(' ', "_"))
            .collect();
        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|a| normalized.iter().position(|h| h.as_str() == *a))
        };

        Ok(Self {
            name: find(&["name", "business_name", "title"])
                .ok_or(ImportError::MissingColumn("name"))?,
            address: find(&["address", "full_address", "street", "street_address"]),
            city: find(&["city"]),
            state: find(&["state", "state_code", "province"]),
            zip: find(&["zip", "zip_code", "zipcode", "postal_code"]),
            phone: find(&["phone", "phone_number", "telephone"]),
            website: find(&["website", "url", "site"]),
            latitude: find(&["latitude", "lat"]),
            longitude: find(&["longitude", "lng", "lon"]),
            hours: find(&["hours", "working_hours", "opening_hours"]),
            services: find(&["services", "amenities"]),
            rating: find(&["rating", "stars"]),
            reviews: find(&["reviews", "review_count", "reviews_count"]),
            description: find(&["description", "about"]),
        })
    }
}

fn cell<'r>(record: &'r StringRecord, idx: Option<usize>) -> &'r str {
    idx.and_then(|i| record.get(i)).unwrap_or("").trim()
}

/// A validated row ready for persistence.
#[derive(Debug)]
struct PreparedRow {
    dedupe_key: (String, String),
    listing: NewLaundromat,
}

fn prepare_row(record: &StringRecord, cols: &Columns) -> Result<PreparedRow, String> {
    let name = normalize_name(cell(record, Some(cols.name)));
    if name.is_empty() {
        return Err("missing name".to_string());
    }

    let raw_address = cell(record, cols.address);
    let parsed = parse_address(raw_address);

    let explicit_city = Some(cell(record, cols.city))
        .filter(|c| !c.is_empty())
        .map(collapse_whitespace);
    let explicit_state = cell(record, cols.state);

    // The address cell counts as a full address when it ends in a state or
    // when it has to supply a missing city or state. Otherwise commas are
    // part of the street ("123 Main St, Suite 4").
    let address_is_full = parsed.city.is_some()
        && (parsed.state.is_some() || explicit_city.is_none() || explicit_state.is_empty());

    let city = explicit_city
        .or(parsed.city.clone())
        .ok_or_else(|| format!("missing city for '{name}'"))?;

    let state = match explicit_state {
        "" => parsed.state.clone(),
        explicit => normalize_state_code(explicit),
    }
    .ok_or_else(|| format!("missing or unrecognized state for '{name}'"))?;

    let street = if address_is_full && !parsed.street.is_empty() {
        parsed.street.clone()
    } else {
        collapse_whitespace(raw_address)
    };

    let zip = normalize_zip(cell(record, cols.zip)).or(parsed.zip.clone());
    let full_address = format_full_address(&street, &city, &state, zip.as_deref());
    let (latitude, longitude) =
        normalize_coordinates(cell(record, cols.latitude), cell(record, cols.longitude));

    let slug = slugify(&[&name, &street, &city]);
    if slug.is_empty() {
        return Err(format!("cannot derive a slug for '{name}'"));
    }

    let description = Some(collapse_whitespace(cell(record, cols.description)))
        .filter(|d| !d.is_empty());

    Ok(PreparedRow {
        dedupe_key: (name.to_lowercase(), full_address.to_lowercase()),
        listing: NewLaundromat {
            slug,
            name,
            address: street,
            city,
            state,
            zip,
            latitude,
            longitude,
            phone: format_phone(cell(record, cols.phone)),
            website: normalize_website(cell(record, cols.website)),
            hours: parse_hours_cell(cell(record, cols.hours)),
            services: split_services(cell(record, cols.services)),
            description,
            rating: parse_rating(cell(record, cols.rating)),
            review_count: parse_review_count(cell(record, cols.reviews)),
            owner_id: None,
        },
    })
}

/// Imports every row of the CSV file at `path` into `store`.
///
/// Bad rows and per-row storage failures are collected in `errors`; only an
/// unreadable file or a header without a name column aborts the run.
pub fn import_file<S: ListingStore>(
    store: &mut S,
    path: &Path,
) -> Result<ImportResult, ImportError> {
    let file = std::fs::File::open(path)
        .map_err(|e| ImportError::Io(format!("{}: {e}", path.display())))?;
    info!(path = %path.display(), "starting laundromat import");
    import_reader(store, file)
}

pub fn import_reader<S: ListingStore, R: Read>(
    store: &mut S,
    reader: R,
) -> Result<ImportResult, ImportError> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| ImportError::Csv(format!("failed to read header row: {e}")))?
        .clone();
    let cols = Columns::from_headers(&headers)?;

    let mut result = ImportResult::default();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for (idx, record) in rdr.records().enumerate() {
        let row_no = idx + 1;
        result.total += 1;

        let record = match record {
            Ok(r) => r,
            Err(e) => {
                result.errors.push(format!("row {row_no}: unreadable record: {e}"));
                continue;
            }
        };

        let prepared = match prepare_row(&record, &cols) {
            Ok(p) => p,
            Err(msg) => {
                warn!(row = row_no, "skipping row: {msg}");
                result.errors.push(format!("row {row_no}: {msg}"));
                continue;
            }
        };

        if !seen.insert(prepared.dedupe_key.clone()) {
            result.duplicates += 1;
            continue;
        }

        match store.get_laundry_by_slug(&prepared.listing.slug) {
            Ok(Some(_)) => {
                result.duplicates += 1;
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(row = row_no, error = %e, "slug lookup failed");
                result.errors.push(format!("row {row_no}: {e}"));
                continue;
            }
        }

        let name = prepared.listing.name.clone();
        match store.create_laundromat(prepared.listing) {
            Ok(_) => result.imported += 1,
            Err(e) => {
                warn!(row = row_no, error = %e, "insert failed");
                result.errors.push(format!("row {row_no}: failed to save '{name}': {e}"));
            }
        }
    }

    info!(
        total = result.total,
        imported = result.imported,
        duplicates = result.duplicates,
        errors = result.errors.len(),
        "laundromat import finished"
    );
    Ok(result)
}
