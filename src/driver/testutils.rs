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

//! Test utilities for the business layer.

use crate::db::sqlite::{testutils, SqliteDb};
use crate::db::{BareTx, CustomerTx, Db};
use crate::driver::Driver;
use crate::model::{Customer, CustomerData, CustomerId};
use sqlx::Row;

/// State of a running test, backed by an in-memory SQLite database.
pub(crate) struct TestContext {
    /// The database that the driver under test uses, for direct manipulation.
    db: SqliteDb,

    /// The driver under test.
    driver: Driver<SqliteDb>,
}

impl TestContext {
    /// Initializes the database and the driver under test.
    pub(crate) async fn setup() -> Self {
        let db = testutils::setup().await;
        let driver = Driver::new(db.clone());
        Self { db, driver }
    }

    /// Returns a driver clone to issue one operation against.
    pub(crate) fn driver(&self) -> Driver<SqliteDb> {
        self.driver.clone()
    }

    /// Directly inserts a customer into the database, bypassing the driver.
    pub(crate) async fn put_customer(&self, data: CustomerData) -> Customer {
        let mut tx = self.db.begin().await.unwrap();
        let customer = tx.put_customer(&data).await.unwrap();
        tx.commit().await.unwrap();
        customer
    }

    /// Directly fetches a customer from the database, bypassing the driver.
    pub(crate) async fn get_customer(&self, id: CustomerId) -> Option<Customer> {
        let mut tx = self.db.begin().await.unwrap();
        let customer = tx.get_customer(id).await.unwrap();
        tx.commit().await.unwrap();
        customer
    }

    /// Counts how many customers the database holds.
    pub(crate) async fn count_customers(&self) -> i64 {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM customers")
            .fetch_one(self.db.pool())
            .await
            .unwrap();
        row.try_get("count").unwrap()
    }
}
