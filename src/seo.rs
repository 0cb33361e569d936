// src/seo.rs
//
// Page copy and schema.org JSON-LD for listing, city and state pages.
// Everything here is a pure function of its inputs; callers pass `now` in.

use crate::domain::directory::{City, State};
use crate::domain::laundromat::Laundromat;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub heading: String,
    pub intro: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CityStats {
    pub city: City,
    pub state_name: String,
    pub laundry_count: i64,
    pub average_rating: Option<f64>,
    pub premium_count: i64,
    pub open_24h_count: i64,
    pub top_services: Vec<String>,
    pub top_zips: Vec<String>,
    /// (name, slug) of the first listings shown on the page.
    pub listing_names: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateStats {
    pub state: State,
    pub city_count: i64,
    pub average_rating: Option<f64>,
    pub top_cities: Vec<City>,
}

fn plural(n: i64, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// "a, b and c"
fn join_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [one] => one.clone(),
        [rest @ .., last] => format!("{} and {}", rest.join(", "), last),
    }
}

fn truncate_description(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(1)).collect();
    let trimmed = match cut.rfind(' ') {
        Some(idx) => &cut[..idx],
        None => cut.as_str(),
    };
    format!("{}…", trimmed.trim_end_matches([',', '.', ' ']))
}

const META_DESCRIPTION_MAX: usize = 160;

pub fn listing_meta(l: &Laundromat) -> PageMeta {
    let place = format!("{}, {}", l.city, l.state);
    let mut description = format!("{} is a laundromat in {place}", l.name);
    if let Some(rating) = l.rating.filter(|_| l.review_count > 0) {
        description.push_str(&format!(
            " rated {rating:.1}/5 from {}",
            plural(l.review_count, "review", "reviews")
        ));
    }
    description.push('.');
    if !l.services.is_empty() {
        let services: Vec<String> = l.services.iter().take(3).cloned().collect();
        description.push_str(&format!(" Services: {}.", join_list(&services)));
    }
    if let Some(phone) = &l.phone {
        description.push_str(&format!(" Call {phone}."));
    }

    let intro = l.description.clone().unwrap_or_else(|| {
        format!(
            "Find hours, directions and services for {} at {}.",
            l.name,
            l.full_address()
        )
    });

    PageMeta {
        title: format!("{} - Laundromat in {place}", l.name),
        description: truncate_description(&description, META_DESCRIPTION_MAX),
        heading: l.name.clone(),
        intro,
    }
}

pub fn city_meta(stats: &CityStats) -> PageMeta {
    let place = format!("{}, {}", stats.city.name, stats.city.state);
    let count = plural(stats.laundry_count, "laundromat", "laundromats");

    let mut description = format!("Compare {count} in {place}");
    if let Some(avg) = stats.average_rating {
        description.push_str(&format!(" with an average rating of {avg:.1}"));
    }
    description.push('.');
    if !stats.top_services.is_empty() {
        description.push_str(&format!(
            " Popular services: {}.",
            join_list(&stats.top_services)
        ));
    }

    let mut intro = format!(
        "We list {count} across {}, {}.",
        stats.city.name, stats.state_name
    );
    if stats.open_24h_count > 0 {
        intro.push_str(&format!(
            " {} open 24 hours.",
            plural(stats.open_24h_count, "location is", "locations are")
        ));
    }
    if !stats.top_zips.is_empty() {
        intro.push_str(&format!(
            " Most are in ZIP codes {}.",
            join_list(&stats.top_zips)
        ));
    }

    PageMeta {
        title: format!("Laundromats in {place} | {count}"),
        description: truncate_description(&description, META_DESCRIPTION_MAX),
        heading: format!("Laundromats in {}, {}", stats.city.name, stats.state_name),
        intro,
    }
}

pub fn state_meta(stats: &StateStats) -> PageMeta {
    let count = plural(stats.state.laundry_count, "laundromat", "laundromats");
    let cities = plural(stats.city_count, "city", "cities");
    let top: Vec<String> = stats.top_cities.iter().map(|c| c.name.clone()).collect();

    let mut description = format!("Browse {count} in {cities} across {}.", stats.state.name);
    if !top.is_empty() {
        description.push_str(&format!(" Top cities: {}.", join_list(&top)));
    }

    let intro = match stats.average_rating {
        Some(avg) => format!(
            "Laundromats in {} average {avg:.1} stars from customer reviews.",
            stats.state.name
        ),
        None => format!("Pick a city to see laundromats in {}.", stats.state.name),
    };

    PageMeta {
        title: format!("{} Laundromats | {count}", stats.state.name),
        description: truncate_description(&description, META_DESCRIPTION_MAX),
        heading: format!("Laundromats in {}", stats.state.name),
        intro,
    }
}

/// schema.org `DryCleaningOrLaundry` for a single listing.
pub fn listing_schema(l: &Laundromat, base_url: &str) -> Value {
    let mut obj = json!({
        "@context": "https://schema.org",
        "@type": "DryCleaningOrLaundry",
        "name": l.name,
        "url": format!("{base_url}/laundromats/{}", l.slug),
        "address": {
            "@type": "PostalAddress",
            "streetAddress": l.address,
            "addressLocality": l.city,
            "addressRegion": l.state,
            "postalCode": l.zip,
            "addressCountry": "US",
        },
    });

    if let Some(coords) = l.coordinates() {
        obj["geo"] = json!({
            "@type": "GeoCoordinates",
            "latitude": coords.lat,
            "longitude": coords.lng,
        });
    }
    if let Some(phone) = &l.phone {
        obj["telephone"] = json!(phone);
    }
    if let Some(site) = &l.website {
        obj["sameAs"] = json!([site]);
    }
    if let Some(desc) = &l.description {
        obj["description"] = json!(desc);
    }
    if let Some(rating) = l.rating.filter(|_| l.review_count > 0) {
        obj["aggregateRating"] = json!({
            "@type": "AggregateRating",
            "ratingValue": rating,
            "reviewCount": l.review_count,
            "bestRating": 5,
            "worstRating": 1,
        });
    }
    if let Some(hours) = &l.hours {
        let opening: Vec<String> = hours
            .iter()
            .map(|(day, text)| format!("{day} {text}"))
            .collect();
        obj["openingHours"] = json!(opening);
    }
    if !l.services.is_empty() {
        obj["amenityFeature"] = Value::Array(
            l.services
                .iter()
                .map(|s| json!({"@type": "LocationFeatureSpecification", "name": s, "value": true}))
                .collect(),
        );
    }
    obj
}

/// schema.org `CollectionPage` with an `ItemList` of the city's listings.
pub fn city_schema(stats: &CityStats, base_url: &str, now: DateTime<Utc>) -> Value {
    let items: Vec<Value> = stats
        .listing_names
        .iter()
        .enumerate()
        .map(|(i, (name, slug))| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "name": name,
                "url": format!("{base_url}/laundromats/{slug}"),
            })
        })
        .collect();

    json!({
        "@context": "https://schema.org",
        "@type": "CollectionPage",
        "name": format!("Laundromats in {}, {}", stats.city.name, stats.city.state),
        "url": format!("{base_url}/cities/{}", stats.city.slug),
        "dateModified": now.format("%Y-%m-%d").to_string(),
        "mainEntity": {
            "@type": "ItemList",
            "numberOfItems": stats.laundry_count,
            "itemListElement": items,
        },
        "breadcrumb": breadcrumbs(&[
            ("Home", format!("{base_url}/")),
            (
                stats.state_name.as_str(),
                format!("{base_url}/states/{}", stats.city.state.to_lowercase()),
            ),
            (stats.city.name.as_str(), format!("{base_url}/cities/{}", stats.city.slug)),
        ]),
    })
}

pub fn state_schema(stats: &StateStats, base_url: &str, now: DateTime<Utc>) -> Value {
    let items: Vec<Value> = stats
        .top_cities
        .iter()
        .enumerate()
        .map(|(i, c)| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "name": c.name,
                "url": format!("{base_url}/cities/{}", c.slug),
            })
        })
        .collect();

    json!({
        "@context": "https://schema.org",
        "@type": "CollectionPage",
        "name": format!("Laundromats in {}", stats.state.name),
        "url": format!("{base_url}/states/{}", stats.state.abbr.to_lowercase()),
        "dateModified": now.format("%Y-%m-%d").to_string(),
        "mainEntity": {
            "@type": "ItemList",
            "numberOfItems": stats.state.laundry_count,
            "itemListElement": items,
        },
    })
}

fn breadcrumbs(trail: &[(&str, String)]) -> Value {
    let items: Vec<Value> = trail
        .iter()
        .enumerate()
        .map(|(i, (name, url))| {
            json!({"@type": "ListItem", "position": i + 1, "name": name, "item": url})
        })
        .collect();
    json!({"@type": "BreadcrumbList", "itemListElement": items})
}
