use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::*;
use uuid::Uuid;

use crate::db::{LIKE_ESCAPE, contains_pattern};
use crate::models::bids;
use crate::models::gigs::{self, CreateGig, GigStatus, UpdateGig};

/// Insert a new open gig owned by `owner_id`.
pub async fn insert_gig<C: ConnectionTrait>(
    db: &C,
    input: CreateGig,
    owner_id: Uuid,
) -> Result<gigs::Model, DbErr> {
    let new_gig = gigs::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(input.title.trim().to_string()),
        description: Set(input.description.trim().to_string()),
        budget: Set(input.budget),
        owner_id: Set(owner_id),
        status: Set(GigStatus::Open),
        hired_bid_id: Set(None),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_gig.insert(db).await
}

/// Fetch gigs with the given status, newest first, optionally restricted to
/// those whose title or description contains `search` (case-insensitive).
pub async fn list_gigs<C: ConnectionTrait>(
    db: &C,
    status: GigStatus,
    search: Option<&str>,
) -> Result<Vec<gigs::Model>, DbErr> {
    let mut query = gigs::Entity::find().filter(gigs::Column::Status.eq(status));

    if let Some(needle) = search {
        let pattern = contains_pattern(&needle.to_lowercase());
        let lower_like = |column: gigs::Column| {
            Expr::expr(Func::lower(Expr::col(column)))
                .like(LikeExpr::new(pattern.clone()).escape(LIKE_ESCAPE))
        };
        query = query.filter(
            Condition::any()
                .add(lower_like(gigs::Column::Title))
                .add(lower_like(gigs::Column::Description)),
        );
    }

    query
        .order_by_desc(gigs::Column::CreatedAt)
        .order_by_desc(gigs::Column::Id)
        .all(db)
        .await
}

/// Fetch a single gig by ID.
pub async fn get_gig_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<gigs::Model>, DbErr> {
    gigs::Entity::find_by_id(id).one(db).await
}

/// Fetch a gig while holding a shared row lock until the surrounding
/// transaction ends. Blocks a concurrent hire from flipping its status.
///
/// SQLite has no row locks; its transactions already serialize writers.
pub async fn get_gig_for_share<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<gigs::Model>, DbErr> {
    let query = gigs::Entity::find_by_id(id);
    match db.get_database_backend() {
        DbBackend::Postgres | DbBackend::MySql => query.lock_shared().one(db).await,
        _ => query.one(db).await,
    }
}

/// Fetch all gigs owned by a user, newest first.
pub async fn get_gigs_by_owner<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
) -> Result<Vec<gigs::Model>, DbErr> {
    gigs::Entity::find()
        .filter(gigs::Column::OwnerId.eq(owner_id))
        .order_by_desc(gigs::Column::CreatedAt)
        .order_by_desc(gigs::Column::Id)
        .all(db)
        .await
}

/// Apply the fields present in `input` to a gig that is still open.
///
/// Returns `None` when no open gig with that id exists, i.e. it was deleted or
/// assigned in the meantime.
pub async fn update_open_gig<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: UpdateGig,
) -> Result<Option<gigs::Model>, DbErr> {
    let mut active = gigs::ActiveModel {
        updated_at: Set(Some(chrono::Utc::now())),
        ..Default::default()
    };

    if let Some(title) = input.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = input.description {
        active.description = Set(description.trim().to_string());
    }
    if let Some(budget) = input.budget {
        active.budget = Set(budget);
    }

    let result = gigs::Entity::update_many()
        .set(active)
        .filter(gigs::Column::Id.eq(id))
        .filter(gigs::Column::Status.eq(GigStatus::Open))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Ok(None);
    }
    get_gig_by_id(db, id).await
}

/// Compare-and-swap the gig from open to assigned, recording the hired bid.
///
/// Returns `false` if the gig was not open at the time of the write. On
/// PostgreSQL the UPDATE takes the row lock, so a concurrent caller waits for
/// the winner to commit and then matches zero rows.
pub async fn assign_if_open<C: ConnectionTrait>(
    db: &C,
    gig_id: Uuid,
    bid_id: Uuid,
) -> Result<bool, DbErr> {
    let result = gigs::Entity::update_many()
        .col_expr(gigs::Column::Status, Expr::value(GigStatus::Assigned))
        .col_expr(gigs::Column::HiredBidId, Expr::value(Some(bid_id)))
        .col_expr(gigs::Column::UpdatedAt, Expr::value(Some(chrono::Utc::now())))
        .filter(gigs::Column::Id.eq(gig_id))
        .filter(gigs::Column::Status.eq(GigStatus::Open))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

/// Delete a gig together with all of its bids in one transaction.
///
/// Returns the number of bids removed, or `None` if the gig did not exist.
pub async fn delete_gig_with_bids(db: &DatabaseConnection, id: Uuid) -> Result<Option<u64>, DbErr> {
    let txn = db.begin().await?;

    let removed_bids = bids::Entity::delete_many()
        .filter(bids::Column::GigId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;

    let removed_gig = gigs::Entity::delete_by_id(id).exec(&txn).await?.rows_affected;
    if removed_gig == 0 {
        // Nothing to delete; dropping `txn` rolls back.
        return Ok(None);
    }

    txn.commit().await?;
    Ok(Some(removed_bids))
}
