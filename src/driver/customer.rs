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

//! Operations on customers.

use crate::db::{BareTx, CustomerTx, Db};
use crate::driver::{Driver, DriverError, DriverResult};
use crate::model::{Customer, CustomerData, CustomerId};
use log::debug;

impl<D> Driver<D>
where
    D: Db + Clone + Send + Sync + 'static,
    D::Tx: CustomerTx + Send + Sync + 'static,
{
    /// Gets the customer with the given `id`.
    pub(crate) async fn get_customer(self, id: CustomerId) -> DriverResult<Customer> {
        let mut tx = self.db.begin().await?;
        let customer = tx.get_customer(id).await?;
        tx.commit().await?;

        customer.ok_or_else(|| DriverError::NotFound(format!("Customer {} not found", id)))
    }

    /// Validates `data` and, if acceptable, persists it as a new customer.
    ///
    /// Validation failures are reported before anything reaches the store, and all
    /// violations are surfaced at once.
    pub(crate) async fn create_customer(self, data: CustomerData) -> DriverResult<Customer> {
        if let Err(problems) = data.validate() {
            return Err(DriverError::InvalidInput(problems.join("; ")));
        }

        let mut tx = self.db.begin().await?;
        let customer = tx.put_customer(&data).await?;
        tx.commit().await?;
        debug!("Created customer {}", customer.id());

        Ok(customer)
    }
}
