use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::Store;
use crate::error::AppError;
use crate::models::gigs::{CreateGig, GigListQuery, UpdateGig};
use crate::services::gigs as gig_service;

/// GET /gigs?search=&status=: public listing, open gigs by default.
pub async fn get_gigs(
    store: web::Data<Store>,
    query: web::Query<GigListQuery>,
) -> Result<HttpResponse, AppError> {
    let gigs = gig_service::list_gigs(store.get_ref(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "count": gigs.len(),
        "gigs": gigs,
    })))
}

/// GET /gigs/{id}: public.
pub async fn get_gig(
    store: web::Data<Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let gig = gig_service::get_gig(store.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "gig": gig,
    })))
}

/// POST /gigs: create a gig owned by the caller.
pub async fn create_gig(
    user: AuthenticatedUser,
    store: web::Data<Store>,
    body: web::Json<CreateGig>,
) -> Result<HttpResponse, AppError> {
    let gig = gig_service::create_gig(store.get_ref(), &user.0, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": "Gig created successfully",
        "gig": gig,
    })))
}

/// PUT /gigs/{id}: owner-only, open gigs only.
pub async fn update_gig(
    user: AuthenticatedUser,
    store: web::Data<Store>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateGig>,
) -> Result<HttpResponse, AppError> {
    let gig = gig_service::update_gig(
        store.get_ref(),
        &user.0,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Gig updated successfully",
        "gig": gig,
    })))
}

/// DELETE /gigs/{id}: owner-only; removes the gig's bids too.
pub async fn delete_gig(
    user: AuthenticatedUser,
    store: web::Data<Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    gig_service::delete_gig(store.get_ref(), &user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Gig deleted successfully",
    })))
}

/// GET /gigs/my/gigs: the caller's own gigs, any status.
pub async fn get_my_gigs(
    user: AuthenticatedUser,
    store: web::Data<Store>,
) -> Result<HttpResponse, AppError> {
    let gigs = gig_service::list_my_gigs(store.get_ref(), &user.0).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "count": gigs.len(),
        "gigs": gigs,
    })))
}
