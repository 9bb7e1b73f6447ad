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

//! Database abstraction in terms of the operations needed by the server.
//!
//! The PostgreSQL backend is for production use and the SQLite backend is primarily
//! intended to support unit tests.

use crate::model::{Customer, CustomerData, CustomerId};
use async_trait::async_trait;

pub mod postgres;

/// Database errors.  Any unexpected errors that come from the database are classified as
/// `BackendError`, but errors we know about have more specific types.
#[derive(Debug, PartialEq, thiserror::Error)]
pub(crate) enum DbError {
    /// Indicates that a request to create an entry failed because it already exists.
    #[error("Already exists")]
    AlreadyExists,

    /// Catch-all error type for unexpected database errors.
    #[error("Database error: {0}")]
    BackendError(String),

    /// Indicates that the database rejected a write because a column-level constraint
    /// (presence or length) was violated.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Indicates a failure processing the data that already exists in the database.
    #[error("Data integrity error: {0}")]
    DataIntegrityError(String),

    /// Indicates that a requested entry does not exist.
    #[error("Entity not found")]
    NotFound,

    /// Indicates that the database is not available (maybe because of too many active
    /// concurrent connections).
    #[error("Unavailable")]
    Unavailable,
}

/// Result type for this module.
pub(crate) type DbResult<T> = Result<T, DbError>;

/// Common operations for all transaction types.
#[async_trait]
pub(crate) trait BareTx {
    /// Commits the transaction.  The transaction is rolled back on drop unless this is
    /// called.
    async fn commit(self) -> DbResult<()>;

    /// Initializes the database schema.
    async fn migrate(&mut self) -> DbResult<()> {
        Ok(())
    }
}

/// A transaction with high-level operations that deal with our types.
#[async_trait]
pub(crate) trait CustomerTx: BareTx {
    /// Looks up the customer with the given `id`, returning `None` (not an error) when no
    /// record matches.
    async fn get_customer(&mut self, id: CustomerId) -> DbResult<Option<Customer>>;

    /// Persists `data` as a new customer and returns the record with its store-assigned
    /// identifier.
    async fn put_customer(&mut self, data: &CustomerData) -> DbResult<Customer>;
}

/// Abstraction over the database connection.
#[async_trait]
pub(crate) trait Db {
    /// The transaction type returned by `begin`.
    type Tx: BareTx + Send + Sync + 'static;

    /// Begins a transaction.
    ///
    /// It is the responsibility of the caller to call `commit` on the returned
    /// transaction.  Otherwise the transaction is rolled back on drop.
    async fn begin(&self) -> DbResult<Self::Tx>;
}
