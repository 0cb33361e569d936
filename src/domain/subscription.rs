// src/domain/subscription.rs

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const BILLING_PERIOD_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Basic,
    Premium,
    Featured,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Basic, Tier::Premium, Tier::Featured];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Basic => "basic",
            Tier::Premium => "premium",
            Tier::Featured => "featured",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Basic => "Basic",
            Tier::Premium => "Premium",
            Tier::Featured => "Featured",
        }
    }

    /// Monthly price in cents.
    pub fn price_cents(self) -> i64 {
        match self {
            Tier::Basic => 0,
            Tier::Premium => 1999,
            Tier::Featured => 4999,
        }
    }

    /// Listing flags this tier grants: (is_premium, is_featured).
    pub fn flags(self) -> (bool, bool) {
        match self {
            Tier::Basic => (false, false),
            Tier::Premium => (true, false),
            Tier::Featured => (true, true),
        }
    }

    pub fn perks(self) -> &'static [&'static str] {
        match self {
            Tier::Basic => &[
                "City and state page listing",
                "Owner edits to contact details and services",
            ],
            Tier::Premium => &["Everything in Basic", "Verified badge on listing cards"],
            Tier::Featured => &[
                "Everything in Premium",
                "Featured badge",
                "Pinned to the home page featured list",
            ],
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" | "free" => Ok(Tier::Basic),
            "premium" => Ok(Tier::Premium),
            "featured" => Ok(Tier::Featured),
            other => Err(format!("unknown tier: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Expired,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(SubscriptionStatus::Active),
            "expired" => Some(SubscriptionStatus::Expired),
            "cancelled" => Some(SubscriptionStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: i64,
    pub laundromat_id: i64,
    pub user_id: i64,
    pub tier: Tier,
    pub amount_cents: i64,
    pub start_date: i64,
    pub end_date: i64,
    pub status: SubscriptionStatus,
    pub auto_renew: bool,
}
