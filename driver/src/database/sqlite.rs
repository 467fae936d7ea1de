use std::str::FromStr;
use std::time::Duration;

use error_stack::Report;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Error, Pool, Sqlite, SqliteConnection};

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::interface::query::{DependOnBookQuery, DependOnOrderQuery};
use kernel::interface::update::{DependOnBookModifier, DependOnOrderModifier};
use kernel::KernelError;

use crate::error::ConvertError;
use crate::{env, env_or};

pub use self::{book::*, order::*};

mod book;
mod order;

static DATABASE_URL: &str = "DATABASE_URL";
static DATABASE_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";

const DEFAULT_DATABASE_URL: &str = "sqlite://books.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
// primary result code, the low byte of extended codes such as SQLITE_BUSY_SNAPSHOT
const SQLITE_BUSY: i32 = 5;

const SCHEMA: [&str; 2] = [
    // language=sqlite
    r#"
    CREATE TABLE IF NOT EXISTS books (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        author TEXT,
        stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
        created_at TEXT NOT NULL
    )
    "#,
    // language=sqlite
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        book_id INTEGER NOT NULL REFERENCES books (id),
        qty INTEGER NOT NULL CHECK (qty > 0),
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK (status IN ('pending', 'confirmed', 'cancelled')),
        created_at TEXT NOT NULL,
        confirmed_at TEXT
    )
    "#,
];

/// Storage handle shared by every service. The schema exists once this is constructed.
#[derive(Clone)]
pub struct SqliteDatabase {
    pool: Pool<Sqlite>,
}

impl SqliteDatabase {
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        let url = env(DATABASE_URL).unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let max_connections = env_or(DATABASE_MAX_CONNECTIONS, DEFAULT_MAX_CONNECTIONS)?;
        Self::connect(&url, max_connections).await
    }

    /// Opens (creating if needed) the database file at `url`.
    pub async fn connect(
        url: &str,
        max_connections: u32,
    ) -> error_stack::Result<Self, KernelError> {
        let options = SqliteConnectOptions::from_str(url)
            .convert_error()?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .convert_error()?;
        tracing::info!(url = %url, max_connections, "connected to sqlite");
        Self::initialize(pool).await
    }

    /// Private database living as long as the handle. Data is lost on [`SqliteDatabase::close`].
    pub async fn in_memory() -> error_stack::Result<Self, KernelError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .convert_error()?
            .foreign_keys(true);
        // every pooled connection would otherwise open its own empty database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .convert_error()?;
        Self::initialize(pool).await
    }

    async fn initialize(pool: Pool<Sqlite>) -> error_stack::Result<Self, KernelError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .convert_error()?;
        }
        tracing::debug!("sqlite schema initialized");
        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("sqlite pool closed");
    }
}

#[async_trait::async_trait]
impl DatabaseConnection for SqliteDatabase {
    type Transaction = SqliteTransaction;
    async fn transact(&self) -> error_stack::Result<Self::Transaction, KernelError> {
        let mut connection = self.pool.acquire().await.convert_error()?;
        // deferred transactions fail with SQLITE_BUSY_SNAPSHOT when a read is upgraded to a write
        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *connection)
            .await
            .convert_error()?;
        Ok(SqliteTransaction {
            connection: Some(connection),
        })
    }
}

/// Pooled connection inside `BEGIN IMMEDIATE`. Rolled back when dropped unfinished.
pub struct SqliteTransaction {
    connection: Option<PoolConnection<Sqlite>>,
}

impl SqliteTransaction {
    pub fn connection(&mut self) -> error_stack::Result<&mut SqliteConnection, KernelError> {
        self.connection.as_deref_mut().ok_or_else(|| {
            Report::new(KernelError::Internal).attach_printable("transaction already finished")
        })
    }

    fn finish(&mut self) -> error_stack::Result<PoolConnection<Sqlite>, KernelError> {
        self.connection.take().ok_or_else(|| {
            Report::new(KernelError::Internal).attach_printable("transaction already finished")
        })
    }
}

#[async_trait::async_trait]
impl Transaction for SqliteTransaction {
    async fn commit(mut self) -> error_stack::Result<(), KernelError> {
        let mut connection = self.finish()?;
        let committed = sqlx::query("COMMIT").execute(&mut *connection).await;
        if committed.is_err() {
            let _ = sqlx::query("ROLLBACK").execute(&mut *connection).await;
        }
        committed.map(|_| ()).convert_error()
    }

    async fn roll_back(mut self) -> error_stack::Result<(), KernelError> {
        let mut connection = self.finish()?;
        sqlx::query("ROLLBACK")
            .execute(&mut *connection)
            .await
            .map(|_| ())
            .convert_error()
    }
}

impl Drop for SqliteTransaction {
    fn drop(&mut self) {
        let Some(mut connection) = self.connection.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(error) = sqlx::query("ROLLBACK").execute(&mut *connection).await {
                        tracing::warn!("failed to roll back abandoned transaction: {error}");
                    }
                });
            }
            // closing the connection makes sqlite discard the open transaction
            Err(_) => drop(connection.detach()),
        }
    }
}

impl DependOnBookQuery for SqliteDatabase {
    type BookQuery = SqliteBookRepository;
    fn book_query(&self) -> &Self::BookQuery {
        &SqliteBookRepository
    }
}

impl DependOnBookModifier for SqliteDatabase {
    type BookModifier = SqliteBookRepository;
    fn book_modifier(&self) -> &Self::BookModifier {
        &SqliteBookRepository
    }
}

impl DependOnOrderQuery for SqliteDatabase {
    type OrderQuery = SqliteOrderRepository;
    fn order_query(&self) -> &Self::OrderQuery {
        &SqliteOrderRepository
    }
}

impl DependOnOrderModifier for SqliteDatabase {
    type OrderModifier = SqliteOrderRepository;
    fn order_modifier(&self) -> &Self::OrderModifier {
        &SqliteOrderRepository
    }
}

impl<T> ConvertError for Result<T, Error>
where
    T: 'static + Sync + Send,
{
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| {
            if matches!(error, Error::PoolTimedOut) || is_busy(&error) {
                Report::from(error).change_context(KernelError::Timeout)
            } else {
                Report::from(error).change_context(KernelError::Internal)
            }
        })
    }
}

fn is_busy(error: &Error) -> bool {
    let Error::Database(error) = error else {
        return false;
    };
    error
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        .map_or(false, |code| code & 0xff == SQLITE_BUSY)
}
