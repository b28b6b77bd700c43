use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use gigboard_backend::auth::jwt::AuthSettings;
use gigboard_backend::config::AppConfig;
use gigboard_backend::db::{self, Store};
use gigboard_backend::handlers;
use gigboard_backend::notifications::NotificationHub;
use std::io;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let conn = db::create_pool(&config.database_url, config.db_timeout)
        .await
        .map_err(io::Error::other)?;
    db::migrate(&conn).await.map_err(io::Error::other)?;
    tracing::info!("Connected to database, migrations applied");

    let store = web::Data::new(Store::new(conn, config.db_timeout));
    let auth_settings = web::Data::new(AuthSettings::new(
        config.jwt_secret.clone(),
        config.jwt_ttl,
        config.cookie_secure,
    ));

    // Process-wide registry of live push connections.
    let hub = Arc::new(NotificationHub::new());
    let hub_data = web::Data::new(hub.clone());

    let origins = config.allowed_origins.clone();
    let bind_addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(store.clone())
            .app_data(auth_settings.clone())
            .app_data(hub_data.clone())
            .configure(handlers::init_routes)
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    let closed = hub.shutdown().await;
    tracing::info!(closed, "Server stopped, notification channels closed");
    Ok(())
}
