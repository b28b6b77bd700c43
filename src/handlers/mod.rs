pub mod auth;
pub mod bids;
pub mod gigs;
pub mod notifications;

use actix_web::{HttpResponse, Responder, web};

use crate::error::AppError;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // Malformed input surfaces as a validation error in the standard envelope.
    cfg.app_data(
        web::JsonConfig::default()
            .limit(64 * 1024)
            .error_handler(|err, _req| {
                AppError::validation(format!("Invalid JSON body: {err}")).into()
            }),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|_err, _req| AppError::validation("Invalid resource id").into()),
    )
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::validation(format!("Invalid query string: {err}")).into()
    }));

    cfg.route("/health", web::get().to(health));

    // ── Auth routes (register/login public, the rest need a valid token) ──
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(auth::register))
            .route("/login", web::post().to(auth::login))
            .route("/logout", web::post().to(auth::logout))
            .route("/me", web::get().to(auth::me)),
    );

    // ── Gig routes (listing and lookup are public) ──
    cfg.service(
        web::scope("/gigs")
            .route("", web::get().to(gigs::get_gigs))
            .route("", web::post().to(gigs::create_gig))
            .route("/my/gigs", web::get().to(gigs::get_my_gigs))
            .route("/{id}", web::get().to(gigs::get_gig))
            .route("/{id}", web::put().to(gigs::update_gig))
            .route("/{id}", web::delete().to(gigs::delete_gig)),
    );

    // ── Bid routes (all protected) ──
    cfg.service(
        web::scope("/bids")
            .route("", web::post().to(bids::create_bid))
            .route("/my/bids", web::get().to(bids::get_my_bids))
            .route("/{bid_id}/hire", web::patch().to(bids::hire_bid))
            .route("/{gig_id}", web::get().to(bids::get_bids_for_gig))
            .route("/{bid_id}", web::put().to(bids::update_bid))
            .route("/{bid_id}", web::delete().to(bids::delete_bid)),
    );

    // ── Push channel ──
    cfg.route("/ws", web::get().to(notifications::ws_connect));

    cfg.default_service(web::to(not_found));
}

/// GET /health: liveness check.
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "status": "ok",
    }))
}

async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("Route not found".to_string()))
}
