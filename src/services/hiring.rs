//! The hire transition: close a gig, hire one bid, reject the rest.
//!
//! Runs as one transaction at the store's default isolation (READ COMMITTED on
//! PostgreSQL, `BEGIN IMMEDIATE` on SQLite). Atomicity across the gig and its bids comes from the
//! transaction; exclusion between concurrent hires comes from the
//! compare-and-swap on `gigs.status` in [`gig_db::assign_if_open`], which
//! locks the gig row until commit. A loser wakes up after the winner commits,
//! matches zero rows and aborts with a conflict. Any early return drops the
//! transaction, so a failed hire persists nothing.

use sea_orm::DatabaseConnection;
use tracing::instrument;
use uuid::Uuid;

use crate::auth::authorization::Caller;
use crate::db::bids as bid_db;
use crate::db::gigs as gig_db;
use crate::db::{Store, begin_write, retry_transient};
use crate::error::AppError;
use crate::models::gigs::GigStatus;
use crate::models::{bids, gigs};
use crate::notifications::{NotificationHub, ServerEvent};

/// What a committed hire changed.
#[derive(Debug, Clone)]
pub struct HireOutcome {
    pub gig: gigs::Model,
    pub bid: bids::Model,
    pub rejected: u64,
}

fn already_assigned() -> AppError {
    AppError::Conflict("This gig has already been assigned".to_string())
}

/// Hire `bid_id` on behalf of `caller`, then tell the freelancer.
///
/// The notification is sent only after commit and cannot fail the hire.
#[instrument(skip(store, hub, caller), fields(caller_id = %caller.id))]
pub async fn hire(
    store: &Store,
    hub: &NotificationHub,
    caller: &Caller,
    bid_id: Uuid,
) -> Result<HireOutcome, AppError> {
    let db = store.conn();
    let outcome = store
        .run(retry_transient(move || hire_once(db, caller, bid_id)))
        .await?;

    tracing::info!(
        gig_id = %outcome.gig.id,
        bid_id = %outcome.bid.id,
        rejected = outcome.rejected,
        "Bid hired"
    );

    let event = ServerEvent::hired(
        outcome.gig.id,
        &outcome.gig.title,
        outcome.bid.id,
        outcome.bid.price,
    );
    let delivered = hub.notify(outcome.bid.freelancer_id, event).await;
    tracing::debug!(
        freelancer_id = %outcome.bid.freelancer_id,
        delivered,
        "Hire notification dispatched"
    );

    Ok(outcome)
}

async fn hire_once(
    db: &DatabaseConnection,
    caller: &Caller,
    bid_id: Uuid,
) -> Result<HireOutcome, AppError> {
    let txn = begin_write(db).await?;

    // 1-2. Bid and parent gig exist.
    let bid = bid_db::get_bid_by_id(&txn, bid_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Bid not found".to_string()))?;
    let gig = gig_db::get_gig_by_id(&txn, bid.gig_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Gig not found".to_string()))?;

    // 3. Only the owner hires.
    caller.ensure_owns_gig(&gig)?;

    // 4. Gig still open. Checked again atomically by the CAS below.
    if gig.status != GigStatus::Open {
        return Err(already_assigned());
    }
    if !gig_db::assign_if_open(&txn, gig.id, bid.id).await? {
        tracing::info!(gig_id = %gig.id, "Lost hire race");
        return Err(already_assigned());
    }

    if !bid_db::mark_hired(&txn, bid.id).await? {
        return Err(AppError::Conflict(
            "Only pending bids can be hired".to_string(),
        ));
    }
    let rejected = bid_db::reject_pending_siblings(&txn, gig.id, bid.id).await?;

    let gig = gig_db::get_gig_by_id(&txn, gig.id)
        .await?
        .ok_or_else(|| AppError::Internal("Assigned gig vanished inside its transaction".to_string()))?;
    let bid = bid_db::get_bid_by_id(&txn, bid.id)
        .await?
        .ok_or_else(|| AppError::Internal("Hired bid vanished inside its transaction".to_string()))?;

    txn.commit().await?;

    Ok(HireOutcome { gig, bid, rejected })
}
