use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::bids::{self, BidStatus, CreateBid, UpdateBid};

/// Insert a new pending bid for `freelancer_id`.
pub async fn insert_bid<C: ConnectionTrait>(
    db: &C,
    input: CreateBid,
    freelancer_id: Uuid,
) -> Result<bids::Model, DbErr> {
    let new_bid = bids::ActiveModel {
        id: Set(Uuid::new_v4()),
        gig_id: Set(input.gig_id),
        freelancer_id: Set(freelancer_id),
        message: Set(input.message.trim().to_string()),
        price: Set(input.price),
        status: Set(BidStatus::Pending),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_bid.insert(db).await
}

/// Fetch a single bid by ID.
pub async fn get_bid_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<bids::Model>, DbErr> {
    bids::Entity::find_by_id(id).one(db).await
}

/// Fetch all bids on a gig, oldest first.
pub async fn get_bids_by_gig<C: ConnectionTrait>(
    db: &C,
    gig_id: Uuid,
) -> Result<Vec<bids::Model>, DbErr> {
    bids::Entity::find()
        .filter(bids::Column::GigId.eq(gig_id))
        .order_by_asc(bids::Column::CreatedAt)
        .order_by_asc(bids::Column::Id)
        .all(db)
        .await
}

/// Fetch all bids placed by a freelancer, newest first.
pub async fn get_bids_by_freelancer<C: ConnectionTrait>(
    db: &C,
    freelancer_id: Uuid,
) -> Result<Vec<bids::Model>, DbErr> {
    bids::Entity::find()
        .filter(bids::Column::FreelancerId.eq(freelancer_id))
        .order_by_desc(bids::Column::CreatedAt)
        .order_by_desc(bids::Column::Id)
        .all(db)
        .await
}

/// Check whether a freelancer already bid on a gig.
pub async fn bid_exists_for_gig_and_freelancer<C: ConnectionTrait>(
    db: &C,
    gig_id: Uuid,
    freelancer_id: Uuid,
) -> Result<bool, DbErr> {
    let count = bids::Entity::find()
        .filter(bids::Column::GigId.eq(gig_id))
        .filter(bids::Column::FreelancerId.eq(freelancer_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Apply the fields present in `input` to a bid that is still pending.
///
/// Returns `None` if no pending bid with that id exists.
pub async fn update_pending_bid<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: UpdateBid,
) -> Result<Option<bids::Model>, DbErr> {
    let mut active = bids::ActiveModel {
        updated_at: Set(Some(chrono::Utc::now())),
        ..Default::default()
    };

    if let Some(message) = input.message {
        active.message = Set(message.trim().to_string());
    }
    if let Some(price) = input.price {
        active.price = Set(price);
    }

    let result = bids::Entity::update_many()
        .set(active)
        .filter(bids::Column::Id.eq(id))
        .filter(bids::Column::Status.eq(BidStatus::Pending))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Ok(None);
    }
    get_bid_by_id(db, id).await
}

/// Delete a bid only if it is still pending. Returns whether a row was removed.
pub async fn delete_pending_bid<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<bool, DbErr> {
    let result = bids::Entity::delete_many()
        .filter(bids::Column::Id.eq(id))
        .filter(bids::Column::Status.eq(BidStatus::Pending))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Move a pending bid to hired. Returns `false` if it was not pending.
pub async fn mark_hired<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<bool, DbErr> {
    let result = bids::Entity::update_many()
        .col_expr(bids::Column::Status, Expr::value(BidStatus::Hired))
        .col_expr(bids::Column::UpdatedAt, Expr::value(Some(chrono::Utc::now())))
        .filter(bids::Column::Id.eq(id))
        .filter(bids::Column::Status.eq(BidStatus::Pending))
        .exec(db)
        .await?;
    Ok(result.rows_affected == 1)
}

/// Reject every other pending bid on the gig. Returns how many were rejected.
pub async fn reject_pending_siblings<C: ConnectionTrait>(
    db: &C,
    gig_id: Uuid,
    hired_bid_id: Uuid,
) -> Result<u64, DbErr> {
    let result = bids::Entity::update_many()
        .col_expr(bids::Column::Status, Expr::value(BidStatus::Rejected))
        .col_expr(bids::Column::UpdatedAt, Expr::value(Some(chrono::Utc::now())))
        .filter(bids::Column::GigId.eq(gig_id))
        .filter(bids::Column::Id.ne(hired_bid_id))
        .filter(bids::Column::Status.eq(BidStatus::Pending))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
