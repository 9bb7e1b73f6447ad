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

//! REST service to manage customer records.
//!
//! The code is structured as a stack of layers: `model` provides the high-level data
//! types, `db` the persistence of those types, `driver` the business logic, and `rest`
//! the HTTP surface.  Each layer has its own result and error types, and errors float
//! to the top of the app using the `?` operator, being translated to HTTP status codes
//! once returned from the REST layer.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use db::postgres::{PostgresDb, PostgresOptions};
use driver::Driver;
use log::info;
use rest::app;
use std::error::Error;
use std::net::SocketAddr;

pub mod db;
mod driver;
mod env;
pub(crate) mod model;
mod rest;

/// Instantiates all resources to serve the application on `bind_addr`.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to
/// expose many crate-internal types to the public, which in turn would make dead code
/// detection harder.
pub async fn serve(
    bind_addr: impl Into<SocketAddr>,
    db_opts: PostgresOptions,
) -> Result<(), Box<dyn Error>> {
    let db = PostgresDb::connect(db_opts).await?;
    let driver = Driver::new(db);
    let app = app(driver);

    let bind_addr = bind_addr.into();
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Serving requests on {}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
