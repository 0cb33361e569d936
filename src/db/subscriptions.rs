// src/db/subscriptions.rs
use crate::db::laundromats::{get_by_id, next_featured_rank, set_premium_flags};
use crate::domain::subscription::{Subscription, SubscriptionStatus, Tier, BILLING_PERIOD_SECS};
use crate::errors::ServerError;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

fn map_subscription(row: &rusqlite::Row<'_>) -> rusqlite::Result<Subscription> {
    let tier: String = row.get(3)?;
    let status: String = row.get(7)?;
    Ok(Subscription {
        id: row.get(0)?,
        laundromat_id: row.get(1)?,
        user_id: row.get(2)?,
        tier: tier.parse().unwrap_or(Tier::Basic),
        amount_cents: row.get(4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
        status: SubscriptionStatus::parse(&status).unwrap_or(SubscriptionStatus::Expired),
        auto_renew: row.get(8)?,
    })
}

const SELECT_SUBSCRIPTION: &str = r#"
    SELECT id, laundromat_id, user_id, tier, amount_cents, start_date, end_date, status, auto_renew
    FROM subscriptions
"#;

/// Records a subscription and stamps the listing with the tier's flags.
///
/// Any active subscription on the listing is cancelled first, so a listing has
/// at most one active subscription.
pub fn activate_subscription(
    conn: &mut Connection,
    laundromat_id: i64,
    user_id: i64,
    tier: Tier,
    auto_renew: bool,
    now: i64,
) -> Result<Subscription, ServerError> {
    let tx = conn
        .transaction()
        .map_err(|e| ServerError::DbError(format!("begin tx failed: {e}")))?;

    tx.execute(
        "UPDATE subscriptions SET status = 'cancelled' WHERE laundromat_id = ? AND status = 'active'",
        params![laundromat_id],
    )
    .map_err(|e| ServerError::DbError(format!("cancel previous subscription failed: {e}")))?;

    let end_date = now + BILLING_PERIOD_SECS;
    tx.execute(
        r#"
        INSERT INTO subscriptions (laundromat_id, user_id, tier, amount_cents, start_date, end_date, status, auto_renew)
        VALUES (?, ?, ?, ?, ?, ?, 'active', ?)
        "#,
        params![
            laundromat_id,
            user_id,
            tier.as_str(),
            tier.price_cents(),
            now,
            end_date,
            auto_renew
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert subscription failed: {e}")))?;
    let id = tx.last_insert_rowid();

    let (is_premium, is_featured) = tier.flags();
    // a listing that is already featured keeps its slot
    let current_rank = get_by_id(&tx, laundromat_id)?
        .ok_or(ServerError::NotFound)?
        .featured_rank;
    let rank = match (is_featured, current_rank) {
        (false, _) => None,
        (true, Some(rank)) => Some(rank),
        (true, None) => Some(next_featured_rank(&tx)?),
    };
    let expiry = (tier != Tier::Basic).then_some(end_date);
    set_premium_flags(&tx, laundromat_id, is_premium, is_featured, rank, expiry, now)?;

    tx.commit()
        .map_err(|e| ServerError::DbError(format!("commit tx failed: {e}")))?;

    info!(laundromat_id, tier = tier.as_str(), "subscription activated");

    Ok(Subscription {
        id,
        laundromat_id,
        user_id,
        tier,
        amount_cents: tier.price_cents(),
        start_date: now,
        end_date,
        status: SubscriptionStatus::Active,
        auto_renew,
    })
}

pub fn active_subscription(
    conn: &Connection,
    laundromat_id: i64,
) -> Result<Option<Subscription>, ServerError> {
    let sql = format!(
        "{SELECT_SUBSCRIPTION} WHERE laundromat_id = ? AND status = 'active' ORDER BY id DESC LIMIT 1"
    );
    conn.query_row(&sql, params![laundromat_id], map_subscription)
        .optional()
        .map_err(|e| ServerError::DbError(format!("select subscription failed: {e}")))
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExpiryReport {
    pub renewed: usize,
    pub expired: usize,
}

/// Renews auto-renewing subscriptions past their end date and expires the rest,
/// clearing the premium flags of their listings.
pub fn expire_subscriptions(conn: &mut Connection, now: i64) -> Result<ExpiryReport, ServerError> {
    let tx = conn
        .transaction()
        .map_err(|e| ServerError::DbError(format!("begin tx failed: {e}")))?;

    let lapsed: Vec<Subscription> = {
        let sql = format!("{SELECT_SUBSCRIPTION} WHERE status = 'active' AND end_date <= ?");
        let mut stmt = tx
            .prepare(&sql)
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        let rows = stmt
            .query_map(params![now], map_subscription)
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
        }
        out
    };

    let mut report = ExpiryReport::default();
    for sub in lapsed {
        if sub.auto_renew {
            let mut end_date = sub.end_date;
            while end_date <= now {
                end_date += BILLING_PERIOD_SECS;
            }
            tx.execute(
                "UPDATE subscriptions SET end_date = ? WHERE id = ?",
                params![end_date, sub.id],
            )?;
            tx.execute(
                "UPDATE laundromats SET subscription_expiry = ?, updated_at = ? WHERE id = ?",
                params![end_date, now, sub.laundromat_id],
            )?;
            report.renewed += 1;
        } else {
            tx.execute(
                "UPDATE subscriptions SET status = 'expired' WHERE id = ?",
                params![sub.id],
            )?;
            set_premium_flags(&tx, sub.laundromat_id, false, false, None, None, now)?;
            report.expired += 1;
        }
    }

    tx.commit()
        .map_err(|e| ServerError::DbError(format!("commit tx failed: {e}")))?;

    info!(renewed = report.renewed, expired = report.expired, "subscription sweep finished");
    Ok(report)
}
