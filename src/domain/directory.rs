// src/domain/directory.rs
//
// City and state rollups. These are computed from the laundromats table on
// demand and never stored.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub name: String,
    pub state: String,
    pub slug: String,
    pub laundry_count: i64,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub name: String,
    pub abbr: String,
    pub slug: String,
    pub laundry_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub laundromat_id: i64,
    pub user_id: i64,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: i64,
}

/// Validates a 1-5 star rating.
pub fn parse_review_rating(raw: &str) -> Option<u8> {
    raw.trim().parse::<u8>().ok().filter(|r| (1..=5).contains(r))
}
