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

//! API to create a new customer.

use crate::db::{CustomerTx, Db};
use crate::driver::Driver;
use crate::model::CustomerData;
use crate::rest::RestError;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{http, Json};

/// POST handler for this API.
///
/// On success, the `Location` header of the response points at the API that serves the
/// newly created customer.
pub(crate) async fn handler<D>(
    State(driver): State<Driver<D>>,
    Json(request): Json<CustomerData>,
) -> Result<impl IntoResponse, RestError>
where
    D: Db + Clone + Send + Sync + 'static,
    D::Tx: CustomerTx + Send + Sync + 'static,
{
    let customer = driver.create_customer(request).await?;
    let location = format!("/api/customer/{}", customer.id());
    Ok((http::StatusCode::CREATED, [(http::header::LOCATION, location)], Json(customer)))
}
