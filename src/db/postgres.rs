// Shop API
// Copyright 2025 The Shop API Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Implementation of the database abstraction using PostgreSQL.

use crate::db::{BareTx, CustomerTx, Db, DbError, DbResult};
use crate::env::{get_optional_var, get_required_var};
use crate::model::{Customer, CustomerData, CustomerId};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgDatabaseError, PgPool, PgPoolOptions, Postgres};
use sqlx::{Row, Transaction};
use std::fmt;

/// Schema to use to initialize the production database.
const SCHEMA: &str = include_str!("postgres.sql");

/// Takes a raw SQLx error `e` and converts it to our generic error type.
pub(crate) fn map_sqlx_error(e: sqlx::Error) -> DbError {
    match e {
        sqlx::Error::ColumnDecode { source, .. } => DbError::DataIntegrityError(source.to_string()),
        sqlx::Error::Database(e) => match e.downcast_ref::<PgDatabaseError>().code() {
            "22001" /* string_data_right_truncation */ => {
                DbError::ConstraintViolation(e.to_string())
            }
            "23502" /* not_null_violation */ => DbError::ConstraintViolation(e.to_string()),
            "23514" /* check_violation */ => DbError::ConstraintViolation(e.to_string()),
            "23503" /* foreign_key_violation */ => DbError::NotFound,
            "23505" /* unique_violation */ => DbError::AlreadyExists,
            "53300" /* too_many_connections */ => DbError::Unavailable,
            number => DbError::BackendError(format!("pgsql error {}: {}", number, e)),
        },
        sqlx::Error::PoolTimedOut => DbError::Unavailable,
        sqlx::Error::RowNotFound => DbError::NotFound,
        e => DbError::BackendError(e.to_string()),
    }
}

/// Options to establish a connection to a PostgreSQL database.
#[derive(Default)]
#[cfg_attr(test, derive(PartialEq))]
pub struct PostgresOptions {
    /// Host to connect to.
    pub host: String,

    /// Port to connect to (typically 5432).
    pub port: u16,

    /// Database name to connect to.
    pub database: String,

    /// Username to establish the connection with.
    pub username: String,

    /// Password to establish the connection with.
    pub password: String,

    /// Minimum number of connections to keep open against the database.
    pub min_connections: Option<u32>,

    /// Maximum number of connections to allow against the database.
    pub max_connections: Option<u32>,
}

impl fmt::Debug for PostgresOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"scrubbed")
            .field("min_connections", &self.min_connections)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl PostgresOptions {
    /// Initializes a set of options from environment variables whose name is prefixed with
    /// the given `prefix`.
    ///
    /// This will use variables such as `<prefix>_HOST`, `<prefix>_PORT`,
    /// `<prefix>_DATABASE`, `<prefix>_USERNAME`, `<prefix>_PASSWORD`,
    /// `<prefix>_MIN_CONNECTIONS` and `<prefix>_MAX_CONNECTIONS`.
    pub fn from_env(prefix: &str) -> Result<PostgresOptions, String> {
        Ok(PostgresOptions {
            host: get_required_var::<String>(prefix, "HOST")?,
            port: get_required_var::<u16>(prefix, "PORT")?,
            database: get_required_var::<String>(prefix, "DATABASE")?,
            username: get_required_var::<String>(prefix, "USERNAME")?,
            password: get_required_var::<String>(prefix, "PASSWORD")?,
            min_connections: get_optional_var::<u32>(prefix, "MIN_CONNECTIONS")?,
            max_connections: get_optional_var::<u32>(prefix, "MAX_CONNECTIONS")?,
        })
    }
}

/// Creates a lazy connection pool for `opts` on top of the given `pool_options`.
///
/// This does *not* establish any connection: the first transaction does.
fn connect_lazy_with_pool_options(opts: PostgresOptions, pool_options: PgPoolOptions) -> PgPool {
    let options = PgConnectOptions::new()
        .host(&opts.host)
        .port(opts.port)
        .database(&opts.database)
        .username(&opts.username)
        .password(&opts.password);

    let mut pool_options = pool_options;
    if let Some(min_connections) = opts.min_connections {
        pool_options = pool_options.min_connections(min_connections);
    }
    if let Some(max_connections) = opts.max_connections {
        pool_options = pool_options.max_connections(max_connections);
    }

    pool_options.connect_lazy_with(options)
}

/// Applies the database schema on top of `tx`.
///
/// This is a standalone function, instead of being inlined in `BareTx::migrate`, to work
/// around a compiler limitation with higher-ranked lifetimes in `async_trait` methods.
async fn run_schema(tx: &mut Transaction<'static, Postgres>) -> DbResult<()> {
    sqlx::Executor::execute(&mut **tx, sqlx::raw_sql(SCHEMA)).await.map_err(map_sqlx_error)?;
    Ok(())
}

/// A database instance backed by a PostgreSQL database.
#[derive(Clone)]
pub(crate) struct PostgresDb {
    /// Shared PostgreSQL connection pool.  This is a cloneable type that all concurrent
    /// transactions can use concurrently.
    pool: PgPool,
}

impl PostgresDb {
    /// Creates a new connection with `opts` and sets the database schema.
    pub(crate) async fn connect(opts: PostgresOptions) -> DbResult<Self> {
        let db = Self { pool: connect_lazy_with_pool_options(opts, PgPoolOptions::new()) };

        let mut tx = db.begin().await?;
        tx.migrate().await?;
        tx.commit().await?;

        Ok(db)
    }
}

#[async_trait]
impl Db for PostgresDb {
    type Tx = PostgresTx;

    async fn begin(&self) -> DbResult<Self::Tx> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(PostgresTx::from(tx))
    }
}

/// A transaction backed by a PostgreSQL database.
pub(crate) struct PostgresTx {
    /// Inner transaction type to obtain access to the raw sqlx transaction.
    tx: Transaction<'static, Postgres>,
}

impl From<Transaction<'static, Postgres>> for PostgresTx {
    fn from(tx: Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl BareTx for PostgresTx {
    async fn commit(mut self) -> DbResult<()> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }

    async fn migrate(&mut self) -> DbResult<()> {
        run_schema(&mut self.tx).await
    }
}

#[async_trait]
impl CustomerTx for PostgresTx {
    async fn get_customer(&mut self, id: CustomerId) -> DbResult<Option<Customer>> {
        let query_str = "SELECT surname, forename, address FROM customers WHERE id = $1";
        let maybe_row = sqlx::query(query_str)
            .bind(id.as_i64())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        match maybe_row {
            None => Ok(None),
            Some(row) => {
                let surname: String = row.try_get("surname").map_err(map_sqlx_error)?;
                let forename: String = row.try_get("forename").map_err(map_sqlx_error)?;
                let address: Option<String> = row.try_get("address").map_err(map_sqlx_error)?;
                Ok(Some(Customer::new(id, CustomerData::new(surname, forename, address))))
            }
        }
    }

    async fn put_customer(&mut self, data: &CustomerData) -> DbResult<Customer> {
        let query_str = "
            INSERT INTO customers (surname, forename, address)
            VALUES ($1, $2, $3)
            RETURNING id
        ";
        let row = sqlx::query(query_str)
            .bind(data.surname())
            .bind(data.forename())
            .bind(data.address())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
        Ok(Customer::new(CustomerId::new(id), data.clone()))
    }
}
