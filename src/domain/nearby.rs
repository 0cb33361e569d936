// src/domain/nearby.rs

use crate::domain::geo::Coordinates;
use crate::domain::laundromat::{Laundromat, NearbyLaundromat};
use crate::errors::ServerError;
use std::cmp::Ordering;
use std::collections::HashMap;

pub const MAX_NEARBY_RESULTS: usize = 20;

/// Factor applied to the radius when the first pass finds nothing.
pub const RADIUS_EXPANSION_FACTOR: f64 = 3.0;

/// Which pass of the fallback policy produced the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTier {
    Radius,
    Expanded,
    Closest,
}

impl SearchTier {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchTier::Radius => "radius",
            SearchTier::Expanded => "expanded",
            SearchTier::Closest => "closest",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyQuery {
    pub origin: Coordinates,
    pub radius_miles: f64,
}

impl NearbyQuery {
    /// Validates `lat`, `lng` and `radius` from a query string.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ServerError> {
        let lat = required_number(params, "lat")?;
        let lng = required_number(params, "lng")?;
        let radius = required_number(params, "radius")?;

        let origin = Coordinates::new(lat, lng)
            .ok_or_else(|| ServerError::BadRequest("lat/lng out of range".into()))?;
        if radius <= 0.0 {
            return Err(ServerError::BadRequest("radius must be positive".into()));
        }

        Ok(Self {
            origin,
            radius_miles: radius,
        })
    }
}

fn required_number(params: &HashMap<String, String>, key: &str) -> Result<f64, ServerError> {
    let raw = params
        .get(key)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServerError::BadRequest(format!("missing parameter: {key}")))?;

    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ServerError::BadRequest(format!("parameter {key} must be a number")))
}

/// Orders candidates by distance from the query origin, applying the fallback
/// policy: radius, then radius x3, then the closest listings regardless of radius.
///
/// Candidates without usable coordinates are skipped. Equal distances are
/// ordered by ascending id.
pub fn rank_nearby(
    candidates: Vec<Laundromat>,
    query: &NearbyQuery,
) -> (Vec<NearbyLaundromat>, SearchTier) {
    let mut scored: Vec<NearbyLaundromat> = candidates
        .into_iter()
        .filter_map(|l| {
            let coords = l.coordinates()?;
            let distance = query.origin.distance_to(&coords);
            Some(NearbyLaundromat {
                laundromat: l,
                distance,
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(Ordering::Equal)
            .then(a.laundromat.id.cmp(&b.laundromat.id))
    });

    let within = |limit: f64| scored.iter().take_while(|n| n.distance <= limit).count();

    let (count, tier) = match within(query.radius_miles) {
        0 => match within(query.radius_miles * RADIUS_EXPANSION_FACTOR) {
            0 => (scored.len(), SearchTier::Closest),
            n => (n, SearchTier::Expanded),
        },
        n => (n, SearchTier::Radius),
    };

    scored.truncate(count.min(MAX_NEARBY_RESULTS));
    (scored, tier)
}
