use tracing::instrument;
use uuid::Uuid;

use crate::auth::authorization::Caller;
use crate::db::Store;
use crate::db::gigs as gig_db;
use crate::error::AppError;
use crate::models::gigs::{self, CreateGig, GigListQuery, GigStatus, UpdateGig};
use crate::services::ensure_valid;

pub(crate) fn gig_not_found() -> AppError {
    AppError::NotFound("Gig not found".to_string())
}

async fn find_gig(store: &Store, id: Uuid) -> Result<gigs::Model, AppError> {
    store
        .run(async { gig_db::get_gig_by_id(store.conn(), id).await.map_err(AppError::from) })
        .await?
        .ok_or_else(gig_not_found)
}

/// Public listing: status defaults to open, optional substring search.
#[instrument(skip(store))]
pub async fn list_gigs(store: &Store, query: GigListQuery) -> Result<Vec<gigs::Model>, AppError> {
    let status = query.status();
    let search = query.search();
    store
        .run(async {
            gig_db::list_gigs(store.conn(), status, search)
                .await
                .map_err(AppError::from)
        })
        .await
}

/// Public lookup by id.
pub async fn get_gig(store: &Store, id: Uuid) -> Result<gigs::Model, AppError> {
    find_gig(store, id).await
}

#[instrument(skip(store, caller, input), fields(owner_id = %caller.id))]
pub async fn create_gig(
    store: &Store,
    caller: &Caller,
    input: CreateGig,
) -> Result<gigs::Model, AppError> {
    ensure_valid(&input)?;

    let gig = store
        .run(async {
            gig_db::insert_gig(store.conn(), input, caller.id)
                .await
                .map_err(AppError::from)
        })
        .await?;

    tracing::info!(gig_id = %gig.id, "Gig created");
    Ok(gig)
}

/// Owner-only partial update, refused once the gig is assigned.
#[instrument(skip(store, caller, input), fields(caller_id = %caller.id))]
pub async fn update_gig(
    store: &Store,
    caller: &Caller,
    id: Uuid,
    input: UpdateGig,
) -> Result<gigs::Model, AppError> {
    ensure_valid(&input)?;

    let gig = find_gig(store, id).await?;
    caller.ensure_owns_gig(&gig)?;
    if gig.status != GigStatus::Open {
        return Err(AppError::Conflict(
            "Cannot update a gig that has already been assigned".to_string(),
        ));
    }
    if input.is_empty() {
        return Ok(gig);
    }

    // Conditional on status = open, so a hire that lands between the check
    // above and this write is never overwritten.
    store
        .run(async {
            gig_db::update_open_gig(store.conn(), id, input)
                .await
                .map_err(AppError::from)
        })
        .await?
        .ok_or_else(|| {
            AppError::Conflict("Cannot update a gig that has already been assigned".to_string())
        })
}

/// Owner-only delete; removes the gig's bids in the same transaction.
#[instrument(skip(store, caller), fields(caller_id = %caller.id))]
pub async fn delete_gig(store: &Store, caller: &Caller, id: Uuid) -> Result<u64, AppError> {
    let gig = find_gig(store, id).await?;
    caller.ensure_owns_gig(&gig)?;

    let removed_bids = store
        .run(async {
            gig_db::delete_gig_with_bids(store.conn(), id)
                .await
                .map_err(AppError::from)
        })
        .await?
        .ok_or_else(gig_not_found)?;

    tracing::info!(gig_id = %id, removed_bids, "Gig deleted");
    Ok(removed_bids)
}

/// Every gig the caller owns, in any status.
pub async fn list_my_gigs(store: &Store, caller: &Caller) -> Result<Vec<gigs::Model>, AppError> {
    store
        .run(async {
            gig_db::get_gigs_by_owner(store.conn(), caller.id)
                .await
                .map_err(AppError::from)
        })
        .await
}
