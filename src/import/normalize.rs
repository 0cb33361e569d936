// src/import/normalize.rs
//
// Field cleanup shared by the CSV importer and owner-created listings.

use crate::domain::geo::Coordinates;
use crate::domain::laundromat::Hours;
use crate::geos;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use url::Url;

static SLUG_NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s_-]").unwrap());
static SLUG_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_-]+").unwrap());
static NAME_UNSUPPORTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s&'.,#()/-]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static ZIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}(-\d{4})?$").unwrap());

/// Lower-case, ASCII-folded, hyphen-separated slug built from `parts`.
///
/// `slugify(&["Joe's Laundry!!", "Denver"]) == "joes-laundry-denver"`
pub fn slugify(parts: &[&str]) -> String {
    let joined = parts.join(" ");
    let lower = deunicode::deunicode(&joined).to_lowercase();
    let stripped = SLUG_NON_WORD.replace_all(&lower, "");
    let hyphenated = SLUG_SEPARATORS.replace_all(stripped.trim(), "-");
    hyphenated.trim_matches('-').to_string()
}

/// Strips punctuation outside `& ' . , # ( ) / -` and collapses whitespace.
pub fn normalize_name(raw: &str) -> String {
    let cleaned = NAME_UNSUPPORTED.replace_all(raw, "");
    WHITESPACE.replace_all(cleaned.trim(), " ").into_owned()
}

pub fn collapse_whitespace(raw: &str) -> String {
    WHITESPACE.replace_all(raw.trim(), " ").into_owned()
}

/// `(555) 123-4567` when exactly ten digits are present, the trimmed input otherwise.
pub fn format_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 10 {
        Some(format!(
            "({}) {}-{}",
            &digits[0..3],
            &digits[3..6],
            &digits[6..10]
        ))
    } else {
        Some(trimmed.to_string())
    }
}

/// Adds `https://` when no scheme is given; drops anything that still isn't a URL.
pub fn normalize_website(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?;
    if !host.contains('.') || host.starts_with('.') || host.ends_with('.') {
        return None;
    }

    Some(candidate)
}

/// "Wi-Fi, Drop-off ,, Dry cleaning" -> {"Drop-off", "Dry cleaning", "Wi-Fi"}
pub fn split_services(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(collapse_whitespace)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Two-letter state code from an abbreviation or full state name.
pub fn normalize_state_code(raw: &str) -> Option<String> {
    let s = raw.trim();
    if let Some(abbr) = geos::normalize_state(s) {
        return Some(abbr.to_string());
    }
    (s.len() == 2 && s.chars().all(|c| c.is_ascii_alphabetic())).then(|| s.to_uppercase())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressParts {
    pub street: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

/// Splits "123 Main St, Denver, CO 80202[, USA]" into its components.
pub fn parse_address(full: &str) -> AddressParts {
    let mut parts: Vec<&str> = full
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if let Some(last) = parts.last() {
        let l = last.to_lowercase();
        if matches!(l.as_str(), "usa" | "us" | "united states" | "united states of america") {
            parts.pop();
        }
    }

    match parts.len() {
        0 => AddressParts::default(),
        1 => AddressParts {
            street: collapse_whitespace(parts[0]),
            ..AddressParts::default()
        },
        2 => match parse_state_zip(parts[1]) {
            (Some(state), zip) => AddressParts {
                street: String::new(),
                city: Some(collapse_whitespace(parts[0])),
                state: Some(state),
                zip,
            },
            (None, _) => AddressParts {
                street: collapse_whitespace(parts[0]),
                city: Some(collapse_whitespace(parts[1])),
                ..AddressParts::default()
            },
        },
        n => {
            let (state, zip) = parse_state_zip(parts[n - 1]);
            AddressParts {
                street: collapse_whitespace(&parts[..n - 2].join(", ")),
                city: Some(collapse_whitespace(parts[n - 2])),
                state,
                zip,
            }
        }
    }
}

/// "CO 80202" -> (Some("CO"), Some("80202")); "New York" -> (Some("NY"), None)
fn parse_state_zip(raw: &str) -> (Option<String>, Option<String>) {
    let mut tokens: Vec<&str> = raw.split_whitespace().collect();
    let zip = match tokens.last() {
        Some(last) if ZIP.is_match(last) => {
            let z = last.to_string();
            tokens.pop();
            Some(z)
        }
        _ => None,
    };
    let state = normalize_state_code(&tokens.join(" "));
    (state, zip)
}

pub fn normalize_zip(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    // Spreadsheets drop leading zeros from New England ZIPs.
    if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) {
        return Some(format!("0{s}"));
    }
    Some(s.to_string())
}

/// Keeps coordinates only when both parse and fall in range.
pub fn normalize_coordinates(lat: &str, lng: &str) -> (Option<String>, Option<String>) {
    match Coordinates::parse(lat, lng) {
        Some(_) => (Some(lat.trim().to_string()), Some(lng.trim().to_string())),
        None => (None, None),
    }
}

pub fn parse_rating(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite() && (0.0..=5.0).contains(r))
}

pub fn parse_review_count(raw: &str) -> i64 {
    raw.trim()
        .replace(',', "")
        .parse::<i64>()
        .ok()
        .filter(|n| *n >= 0)
        .unwrap_or(0)
}

/// Accepts a JSON object (`{"Monday": "7am-10pm"}`) or `Monday: 7am-10pm; Tuesday: ...`.
pub fn parse_hours_cell(raw: &str) -> Option<Hours> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if s.starts_with('{') {
        return serde_json::from_str::<Hours>(s).ok().filter(|h| !h.is_empty());
    }

    let hours: Hours = s
        .split(['|', ';'])
        .filter_map(|entry| {
            let (day, text) = entry.split_once(':')?;
            let day = day.trim();
            let text = text.trim();
            (!day.is_empty() && !text.is_empty()).then(|| (day.to_string(), text.to_string()))
        })
        .collect();

    (!hours.is_empty()).then_some(hours)
}
