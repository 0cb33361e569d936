// src/domain/laundromat.rs

use crate::domain::geo::Coordinates;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub const LAUNDROMAT_SCHEMA_VERSION: u32 = 1;

/// Weekday name ("Monday") -> hours text ("7:00 AM - 10:00 PM").
pub type Hours = BTreeMap<String, String>;

/// A directory entry as stored in the `laundromats` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Laundromat {
    pub schema_version: u32,
    pub id: i64,
    pub slug: String,
    pub name: String,

    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: Option<String>,
    pub city_slug: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,

    pub phone: Option<String>,
    pub website: Option<String>,

    pub hours: Option<Hours>,
    pub services: BTreeSet<String>,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub review_count: i64,

    pub is_premium: bool,
    pub is_featured: bool,
    pub featured_rank: Option<i64>,
    pub subscription_expiry: Option<i64>,

    pub owner_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Laundromat {
    /// Coordinates when both columns hold usable decimals.
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::parse(self.latitude.as_deref()?, self.longitude.as_deref()?)
    }

    /// "123 Main St, Denver, CO 80202"
    pub fn full_address(&self) -> String {
        format_full_address(&self.address, &self.city, &self.state, self.zip.as_deref())
    }
}

/// Fields needed to create a listing. Identity and timestamps come from storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewLaundromat {
    pub slug: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub hours: Option<Hours>,
    pub services: BTreeSet<String>,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub review_count: i64,
    pub owner_id: Option<i64>,
}

/// Owner-editable fields. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ListingUpdate {
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub services: Option<BTreeSet<String>>,
    pub hours: Option<Hours>,
}

/// A listing paired with its distance from the search origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyLaundromat {
    #[serde(flatten)]
    pub laundromat: Laundromat,
    pub distance: f64,
}

pub fn format_full_address(street: &str, city: &str, state: &str, zip: Option<&str>) -> String {
    let mut out = String::new();
    if !street.trim().is_empty() {
        out.push_str(street.trim());
        out.push_str(", ");
    }
    out.push_str(city.trim());
    out.push_str(", ");
    out.push_str(state.trim());
    if let Some(zip) = zip.map(str::trim).filter(|z| !z.is_empty()) {
        out.push(' ');
        out.push_str(zip);
    }
    out
}

#[cfg(test)]
pub(crate) fn sample_laundromat(id: i64, lat: Option<&str>, lng: Option<&str>) -> Laundromat {
    Laundromat {
        schema_version: LAUNDROMAT_SCHEMA_VERSION,
        id,
        slug: format!("laundromat-{id}"),
        name: format!("Laundromat {id}"),
        address: format!("{id} Main St"),
        city: "Denver".to_string(),
        state: "CO".to_string(),
        zip: Some("80202".to_string()),
        city_slug: "denver-co".to_string(),
        latitude: lat.map(str::to_string),
        longitude: lng.map(str::to_string),
        phone: None,
        website: None,
        hours: None,
        services: BTreeSet::new(),
        description: None,
        rating: None,
        review_count: 0,
        is_premium: false,
        is_featured: false,
        featured_rank: None,
        subscription_expiry: None,
        owner_id: None,
        created_at: 0,
        updated_at: 0,
    }
}
