pub mod bids;
pub mod gigs;
pub mod users;

use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ConnectOptions, Database, DatabaseConnection, DatabaseTransaction, DbErr, RuntimeErr,
    SqliteTransactionMode, TransactionOptions, TransactionTrait,
};
use std::future::Future;
use std::time::Duration;

use crate::error::AppError;

/// Open a SeaORM connection pool with bounded connect/acquire timeouts.
pub async fn create_pool(database_url: &str, timeout: Duration) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .max_connections(20)
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .sqlx_logging(false);
    Database::connect(options).await
}

/// Apply all pending schema migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    Migrator::up(db, None).await
}

/// The shared datastore handle. Every service call goes through [`Store::run`]
/// so that no store operation can outlive the configured timeout.
#[derive(Clone)]
pub struct Store {
    conn: DatabaseConnection,
    op_timeout: Duration,
}

impl Store {
    pub fn new(conn: DatabaseConnection, op_timeout: Duration) -> Self {
        Self { conn, op_timeout }
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub fn op_timeout(&self) -> Duration {
        self.op_timeout
    }

    /// Run `op` under the store timeout. On expiry the future is dropped,
    /// which rolls back any transaction it still holds.
    pub async fn run<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match tokio::time::timeout(self.op_timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout),
        }
    }
}

/// Begin a transaction that writes. On SQLite this is `BEGIN IMMEDIATE`, so a
/// second writer waits on the busy timeout at `BEGIN` instead of failing with
/// `SQLITE_BUSY` when its read lock would need upgrading. Other backends
/// ignore the mode.
pub async fn begin_write(db: &DatabaseConnection) -> Result<DatabaseTransaction, DbErr> {
    db.begin_with_options(TransactionOptions {
        sqlite_transaction_mode: Some(SqliteTransactionMode::Immediate),
        ..Default::default()
    })
    .await
}

/// The driver's error code: SQLSTATE on PostgreSQL, the extended result code
/// on SQLite.
fn database_code(err: &DbErr) -> Option<String> {
    let runtime = match err {
        DbErr::Conn(e) | DbErr::Exec(e) | DbErr::Query(e) => e,
        _ => return None,
    };
    match runtime {
        RuntimeErr::SqlxError(e) => e
            .as_database_error()
            .and_then(|db| db.code())
            .map(|code| code.into_owned()),
        _ => None,
    }
}

/// True when a failure is a concurrency abort that is safe to retry:
/// PostgreSQL serialization failure (`40001`) or deadlock (`40P01`), or
/// SQLite `BUSY`/`LOCKED` in any of their extended forms.
pub fn is_transient(err: &DbErr) -> bool {
    if let Some(code) = database_code(err) {
        return RETRYABLE_CODES.contains(&code.as_str());
    }
    // Lock contention raised outside a statement, e.g. while committing
    // through a driver path that carries no code.
    let text = err.to_string().to_ascii_lowercase();
    text.contains("database is locked") || text.contains("database table is locked")
}

/// SQLSTATE serialization failure and deadlock, then SQLite `BUSY`, `LOCKED`,
/// `BUSY_RECOVERY`, `LOCKED_SHAREDCACHE`, `BUSY_SNAPSHOT`, `LOCKED_VTAB` and
/// `BUSY_TIMEOUT`.
const RETRYABLE_CODES: &[&str] = &["40001", "40P01", "5", "6", "261", "262", "517", "518", "773"];

/// Run `op`, and run it once more if the store aborted the first attempt as
/// a transient concurrency conflict. A second failure is returned as is.
pub async fn retry_transient<T, F, Fut>(mut op: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    match op().await {
        Err(AppError::Database(e)) if is_transient(&e) => {
            tracing::warn!(error = %e, "Transaction aborted by the store, retrying once");
            op().await
        }
        other => other,
    }
}

/// Whether a store error is a unique-index violation.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_)))
}

/// Escape character used by [`contains_pattern`].
pub(crate) const LIKE_ESCAPE: char = '!';

/// Build a `%needle%` LIKE pattern, escaping wildcards with [`LIKE_ESCAPE`].
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
