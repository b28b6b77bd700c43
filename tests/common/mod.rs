//! Shared setup for integration tests: SQLite stores with the real
//! migrations applied.

#![allow(dead_code)]

use std::time::Duration;

use gigboard_backend::auth::authorization::Caller;
use gigboard_backend::db::{self, Store};
use gigboard_backend::models::bids::{self, CreateBid};
use gigboard_backend::models::gigs::{self, CreateGig};
use gigboard_backend::models::users::RegisterUser;
use gigboard_backend::services::{accounts, bids as bid_service, gigs as gig_service};
use sea_orm::{ConnectOptions, Database};
use tempfile::TempDir;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret-at-least-256-bits-long-for-hs256-xxxxxxx";

/// A fresh, migrated store. One connection keeps the in-memory database alive
/// and shared across every query.
pub async fn store() -> Store {
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let conn = Database::connect(options)
        .await
        .expect("connect to in-memory sqlite");
    db::migrate(&conn).await.expect("run migrations");
    Store::new(conn, Duration::from_secs(10))
}

/// A migrated store on a database file, served by several pooled connections
/// so concurrent operations really run side by side. The file lives as long
/// as the returned directory.
pub async fn shared_store(connections: u32) -> (Store, TempDir) {
    let dir = TempDir::new().expect("create temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("gigboard.db").display());

    let mut options = ConnectOptions::new(url);
    options
        .max_connections(connections)
        .min_connections(connections)
        .sqlx_logging(false);
    let conn = Database::connect(options)
        .await
        .expect("connect to sqlite file");
    db::migrate(&conn).await.expect("run migrations");
    (Store::new(conn, Duration::from_secs(30)), dir)
}

/// Register a user and return it as a caller.
pub async fn user(store: &Store, name: &str) -> Caller {
    let profile = accounts::register(
        store,
        RegisterUser {
            name: name.to_string(),
            email: format!("{}-{}@example.com", name.to_lowercase(), Uuid::new_v4()),
            password: "password123".to_string(),
        },
    )
    .await
    .expect("register user");

    Caller {
        id: profile.id,
        name: profile.name,
        email: profile.email,
    }
}

pub async fn gig(store: &Store, owner: &Caller, title: &str, description: &str, budget: f64) -> gigs::Model {
    gig_service::create_gig(
        store,
        owner,
        CreateGig {
            title: title.to_string(),
            description: description.to_string(),
            budget,
        },
    )
    .await
    .expect("create gig")
}

pub async fn bid(store: &Store, freelancer: &Caller, gig_id: Uuid, price: f64) -> bids::Model {
    bid_service::create_bid(
        store,
        freelancer,
        CreateBid {
            gig_id,
            message: format!("{} can deliver this quickly.", freelancer.name),
            price,
        },
    )
    .await
    .expect("create bid")
}
