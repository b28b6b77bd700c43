use actix_web::{HttpResponse, web};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::Store;
use crate::error::AppError;
use crate::models::bids::{CreateBid, UpdateBid};
use crate::notifications::NotificationHub;
use crate::services::bids as bid_service;
use crate::services::hiring;

/// POST /bids: a freelancer bids on someone else's open gig.
pub async fn create_bid(
    user: AuthenticatedUser,
    store: web::Data<Store>,
    body: web::Json<CreateBid>,
) -> Result<HttpResponse, AppError> {
    let bid = bid_service::create_bid(store.get_ref(), &user.0, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": "Bid submitted successfully",
        "bid": bid,
    })))
}

/// GET /bids/{gig_id}: all bids on a gig; gig owner only.
pub async fn get_bids_for_gig(
    user: AuthenticatedUser,
    store: web::Data<Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let bids = bid_service::list_bids_for_gig(store.get_ref(), &user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "count": bids.len(),
        "bids": bids,
    })))
}

/// GET /bids/my/bids: bids the caller has placed.
pub async fn get_my_bids(
    user: AuthenticatedUser,
    store: web::Data<Store>,
) -> Result<HttpResponse, AppError> {
    let bids = bid_service::list_my_bids(store.get_ref(), &user.0).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "count": bids.len(),
        "bids": bids,
    })))
}

/// PATCH /bids/{bid_id}/hire: the gig owner hires this bid.
///
/// 400 once the gig is assigned; the loser of a concurrent hire gets the
/// same answer.
pub async fn hire_bid(
    user: AuthenticatedUser,
    store: web::Data<Store>,
    hub: web::Data<Arc<NotificationHub>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let outcome = hiring::hire(store.get_ref(), hub.get_ref(), &user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Freelancer hired successfully",
        "bid": outcome.bid,
    })))
}

/// PUT /bids/{bid_id}: edit a pending bid; bid owner only.
pub async fn update_bid(
    user: AuthenticatedUser,
    store: web::Data<Store>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateBid>,
) -> Result<HttpResponse, AppError> {
    let bid = bid_service::update_bid(
        store.get_ref(),
        &user.0,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Bid updated successfully",
        "bid": bid,
    })))
}

/// DELETE /bids/{bid_id}: withdraw a pending bid; bid owner only.
pub async fn delete_bid(
    user: AuthenticatedUser,
    store: web::Data<Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    bid_service::delete_bid(store.get_ref(), &user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Bid deleted successfully",
    })))
}
