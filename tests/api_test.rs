//! HTTP surface: routing, the auth gate, the response envelope, and the hire
//! flow end to end.
//!
//! Run with: `cargo test --test api_test`
mod common;

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};

use gigboard_backend::auth::jwt::AuthSettings;
use gigboard_backend::auth::middleware::TOKEN_COOKIE;
use gigboard_backend::db::bids as bid_db;
use gigboard_backend::handlers::init_routes;
use gigboard_backend::notifications::NotificationHub;

macro_rules! app {
    ($store:expr, $hub:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($store.clone()))
                .app_data(web::Data::new(AuthSettings::new(
                    common::TEST_SECRET,
                    Duration::from_secs(3600),
                    false,
                )))
                .app_data(web::Data::new($hub.clone()))
                .configure(init_routes),
        )
        .await
    };
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// Register `$name` and log in; yields `(user_id, token)`.
macro_rules! register_and_login {
    ($app:expr, $name:expr) => {{
        let name: &str = $name;
        let email = format!("{}@example.com", name.to_lowercase());
        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({ "name": name, "email": email, "password": "password123" }))
            .to_request();
        let body: Value = test::call_and_read_body_json($app, req).await;
        let id = body["user"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": email, "password": "password123" }))
            .to_request();
        let body: Value = test::call_and_read_body_json($app, req).await;
        (id, body["token"].as_str().unwrap().to_string())
    }};
}

#[actix_web::test]
async fn health_and_unknown_routes() {
    let store = common::store().await;
    let hub = Arc::new(NotificationHub::new());
    let app = app!(store, hub);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "success": true, "status": "ok" }));

    let req = test::TestRequest::get().uri("/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Route not found");
}

#[actix_web::test]
async fn register_validates_and_rejects_duplicates() {
    let store = common::store().await;
    let hub = Arc::new(NotificationHub::new());
    let app = app!(store, hub);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({ "name": "", "email": "nope", "password": "123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"].as_array().unwrap().len(), 3);

    let payload = json!({ "name": "Dana", "email": "Dana@Example.com", "password": "secret1" });
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["email"], "dana@example.com");
    assert!(body["user"].get("passwordHash").is_none());

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn login_sets_cookie_that_authenticates() {
    let store = common::store().await;
    let hub = Arc::new(NotificationHub::new());
    let app = app!(store, hub);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({ "name": "Eve", "email": "eve@example.com", "password": "secret1" }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "eve@example.com", "password": "wrong-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "EVE@example.com", "password": "secret1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == TOKEN_COOKIE)
        .expect("session cookie")
        .into_owned();
    assert_eq!(cookie.http_only(), Some(true));

    let req = test::TestRequest::get()
        .uri("/auth/me")
        .cookie(cookie)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["user"]["email"], "eve@example.com");

    let req = test::TestRequest::get().uri("/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn unauthenticated_bid_is_rejected_before_any_write() {
    let store = common::store().await;
    let hub = Arc::new(NotificationHub::new());
    let app = app!(store, hub);

    let owner = common::user(&store, "Owner").await;
    let gig = common::gig(&store, &owner, "Protected", "Needs auth", 100.0).await;

    let payload = json!({ "gigId": gig.id, "message": "Let me take this one.", "price": 90 });

    let req = test::TestRequest::post().uri("/bids").set_json(&payload).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/bids")
        .insert_header(bearer("not.a.token"))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    assert!(bid_db::get_bids_by_gig(store.conn(), gig.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn malformed_ids_and_bodies_are_validation_errors() {
    let store = common::store().await;
    let hub = Arc::new(NotificationHub::new());
    let app = app!(store, hub);

    let req = test::TestRequest::get().uri("/gigs/not-a-uuid").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let (_, token) = register_and_login!(&app, "Gabe");
    let req = test::TestRequest::post()
        .uri("/gigs")
        .insert_header(bearer(&token))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"title\": 12")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn hire_flow_over_http() {
    let store = common::store().await;
    let hub = Arc::new(NotificationHub::new());
    let app = app!(store, hub);

    let (_, client) = register_and_login!(&app, "Client");
    let (f1_id, f1) = register_and_login!(&app, "Freya");
    let (_, f2) = register_and_login!(&app, "Felix");

    let req = test::TestRequest::post()
        .uri("/gigs")
        .insert_header(bearer(&client))
        .set_json(json!({ "title": "React storefront", "description": "Shop UI", "budget": 5000 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let gig_id = body["gig"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["gig"]["status"], "open");

    let mut bid_ids = Vec::new();
    for (token, price) in [(&f1, 4000), (&f2, 4500)] {
        let req = test::TestRequest::post()
            .uri("/bids")
            .insert_header(bearer(token))
            .set_json(json!({ "gigId": gig_id, "message": "Experienced with this stack.", "price": price }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        bid_ids.push(body["bid"]["id"].as_str().unwrap().to_string());
    }

    // A freelancer cannot hire.
    let req = test::TestRequest::patch()
        .uri(&format!("/bids/{}/hire", bid_ids[0]))
        .insert_header(bearer(&f1))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let mut session = hub.attach(f1_id.parse().unwrap()).await;

    let req = test::TestRequest::patch()
        .uri(&format!("/bids/{}/hire", bid_ids[0]))
        .insert_header(bearer(&client))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["bid"]["status"], "hired");

    let event = serde_json::to_value(session.receiver.try_recv().unwrap()).unwrap();
    assert_eq!(event["type"], "hired");
    assert_eq!(event["gig"]["title"], "React storefront");

    let req = test::TestRequest::patch()
        .uri(&format!("/bids/{}/hire", bid_ids[1]))
        .insert_header(bearer(&client))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri(&format!("/bids/{gig_id}"))
        .insert_header(bearer(&client))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 2);
    let statuses: Vec<&str> = body["bids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["status"].as_str().unwrap())
        .collect();
    assert!(statuses.contains(&"hired"));
    assert!(statuses.contains(&"rejected"));

    let req = test::TestRequest::get()
        .uri(&format!("/gigs/{gig_id}"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["gig"]["status"], "assigned");
    assert_eq!(body["gig"]["hiredBidId"], bid_ids[0]);
}
