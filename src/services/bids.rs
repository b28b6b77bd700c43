use tracing::instrument;
use uuid::Uuid;

use crate::auth::authorization::Caller;
use crate::db::bids as bid_db;
use crate::db::gigs as gig_db;
use crate::db::{Store, begin_write, is_unique_violation};
use crate::error::AppError;
use crate::models::bids::{self, BidStatus, CreateBid, UpdateBid};
use crate::models::gigs::GigStatus;
use crate::services::ensure_valid;
use crate::services::gigs::gig_not_found;

fn bid_not_found() -> AppError {
    AppError::NotFound("Bid not found".to_string())
}

fn duplicate_bid() -> AppError {
    AppError::Conflict("You have already placed a bid on this gig".to_string())
}

fn not_pending(action: &str) -> AppError {
    AppError::Conflict(format!("Only pending bids can be {action}"))
}

async fn find_bid(store: &Store, id: Uuid) -> Result<bids::Model, AppError> {
    store
        .run(async { bid_db::get_bid_by_id(store.conn(), id).await.map_err(AppError::from) })
        .await?
        .ok_or_else(bid_not_found)
}

/// Place a bid on an open gig.
///
/// The gig is read with a shared row lock inside the insert's transaction, so
/// a hire on the same gig either commits first (and this sees `assigned`) or
/// waits until this bid is committed and then rejects it with its siblings.
/// SQLite has no row locks; there the transaction holds the write lock.
#[instrument(skip(store, caller, input), fields(freelancer_id = %caller.id, gig_id = %input.gig_id))]
pub async fn create_bid(
    store: &Store,
    caller: &Caller,
    input: CreateBid,
) -> Result<bids::Model, AppError> {
    ensure_valid(&input)?;

    let bid = store
        .run(async {
            let txn = begin_write(store.conn()).await?;

            let gig = gig_db::get_gig_for_share(&txn, input.gig_id)
                .await?
                .ok_or_else(gig_not_found)?;
            if gig.status != GigStatus::Open {
                return Err(AppError::Conflict(
                    "This gig is no longer accepting bids".to_string(),
                ));
            }
            caller.ensure_can_bid_on(&gig)?;
            if bid_db::bid_exists_for_gig_and_freelancer(&txn, gig.id, caller.id).await? {
                return Err(duplicate_bid());
            }

            let bid = bid_db::insert_bid(&txn, input, caller.id)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        duplicate_bid()
                    } else {
                        AppError::from(e)
                    }
                })?;

            txn.commit().await.map_err(|e| {
                if is_unique_violation(&e) {
                    duplicate_bid()
                } else {
                    AppError::from(e)
                }
            })?;
            Ok::<_, AppError>(bid)
        })
        .await?;

    tracing::info!(bid_id = %bid.id, "Bid placed");
    Ok(bid)
}

/// All bids on a gig; only its owner may look.
#[instrument(skip(store, caller), fields(caller_id = %caller.id))]
pub async fn list_bids_for_gig(
    store: &Store,
    caller: &Caller,
    gig_id: Uuid,
) -> Result<Vec<bids::Model>, AppError> {
    let gig = store
        .run(async { gig_db::get_gig_by_id(store.conn(), gig_id).await.map_err(AppError::from) })
        .await?
        .ok_or_else(gig_not_found)?;
    caller.ensure_owns_gig(&gig)?;

    store
        .run(async { bid_db::get_bids_by_gig(store.conn(), gig_id).await.map_err(AppError::from) })
        .await
}

/// Every bid the caller has placed.
pub async fn list_my_bids(store: &Store, caller: &Caller) -> Result<Vec<bids::Model>, AppError> {
    store
        .run(async {
            bid_db::get_bids_by_freelancer(store.conn(), caller.id)
                .await
                .map_err(AppError::from)
        })
        .await
}

/// Edit a pending bid's message and/or price.
#[instrument(skip(store, caller, input), fields(caller_id = %caller.id))]
pub async fn update_bid(
    store: &Store,
    caller: &Caller,
    id: Uuid,
    input: UpdateBid,
) -> Result<bids::Model, AppError> {
    ensure_valid(&input)?;

    let bid = find_bid(store, id).await?;
    caller.ensure_owns_bid(&bid)?;
    if bid.status != BidStatus::Pending {
        return Err(not_pending("updated"));
    }
    if input.is_empty() {
        return Ok(bid);
    }

    store
        .run(async {
            bid_db::update_pending_bid(store.conn(), id, input)
                .await
                .map_err(AppError::from)
        })
        .await?
        .ok_or_else(|| not_pending("updated"))
}

/// Withdraw a pending bid.
#[instrument(skip(store, caller), fields(caller_id = %caller.id))]
pub async fn delete_bid(store: &Store, caller: &Caller, id: Uuid) -> Result<(), AppError> {
    let bid = find_bid(store, id).await?;
    caller.ensure_owns_bid(&bid)?;
    if bid.status != BidStatus::Pending {
        return Err(not_pending("deleted"));
    }

    let removed = store
        .run(async { bid_db::delete_pending_bid(store.conn(), id).await.map_err(AppError::from) })
        .await?;
    if !removed {
        return Err(not_pending("deleted"));
    }

    tracing::info!(bid_id = %id, "Bid withdrawn");
    Ok(())
}
