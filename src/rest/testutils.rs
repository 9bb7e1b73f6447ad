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

//! Test utilities for the REST API.

use crate::db::sqlite::{testutils, SqliteDb};
use crate::db::{BareTx, CustomerTx, Db};
use crate::driver::Driver;
use crate::model::{Customer, CustomerData, CustomerId};
use crate::rest::{app, ErrorResponse};
use axum::extract::Request;
use axum::http;
use axum::Router;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tower::util::ServiceExt;

/// Maximum body size for testing purposes.
const MAX_BODY_SIZE: usize = 1024;

/// State of a running test, wiring the app router to an in-memory SQLite database.
pub(crate) struct TestContext {
    /// The database backing the app, for direct manipulation.
    db: SqliteDb,

    /// The router for the app being tested.
    app: Router,
}

impl TestContext {
    /// Initializes the database and the app under test.
    pub(crate) async fn setup() -> Self {
        let db = testutils::setup().await;
        let driver = Driver::new(db.clone());
        let app = app(driver);
        Self { db, app }
    }

    /// Returns the app router, leaving the context usable for database-level checks.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Consumes the context and returns the app router.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Directly inserts a customer into the database, bypassing the app.
    pub(crate) async fn put_customer(&self, data: CustomerData) -> Customer {
        let mut tx = self.db.begin().await.unwrap();
        let customer = tx.put_customer(&data).await.unwrap();
        tx.commit().await.unwrap();
        customer
    }

    /// Directly fetches a customer from the database, bypassing the app.
    pub(crate) async fn get_customer(&self, id: CustomerId) -> Option<Customer> {
        let mut tx = self.db.begin().await.unwrap();
        let customer = tx.get_customer(id).await.unwrap();
        tx.commit().await.unwrap();
        customer
    }
}

/// Builder for a single request to the API server.
#[must_use]
pub(crate) struct OneShotBuilder {
    /// The router for the app being tested.
    app: Router,

    /// Builder for the request that will be sent to the app.
    builder: http::request::Builder,
}

impl OneShotBuilder {
    /// Creates a new request against a given `method`/`uri` pair served by an `app` router.
    pub(crate) fn new<U: AsRef<str>>(app: Router, (method, uri): (http::Method, U)) -> Self {
        let builder = Request::builder().method(method).uri(uri.as_ref());
        Self { app, builder }
    }

    /// Finishes building the request and sends it with an empty payload.
    pub(crate) async fn send_empty(self) -> ResponseChecker {
        let request = self.builder.body(axum::body::Body::empty()).unwrap();
        ResponseChecker::from(self.app.oneshot(request).await.unwrap())
    }

    /// Finishes building the request and sends it with a JSON payload.
    pub(crate) async fn send_json<T: Serialize>(self, request: T) -> ResponseChecker {
        let request = self
            .builder
            .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(axum::body::Body::from(serde_json::to_vec(&request).unwrap()))
            .unwrap();
        ResponseChecker::from(self.app.oneshot(request).await.unwrap())
    }

    /// Finishes building the request and sends it with a raw payload labeled as JSON,
    /// which is useful to probe the handling of malformed documents.
    pub(crate) async fn send_json_text<T: Into<String>>(self, text: T) -> ResponseChecker {
        let request = self
            .builder
            .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(axum::body::Body::from(text.into()))
            .unwrap();
        ResponseChecker::from(self.app.oneshot(request).await.unwrap())
    }

    /// Finishes building the request and sends it with a text payload.
    pub(crate) async fn send_text<T: Into<String>>(self, text: T) -> ResponseChecker {
        let request = self
            .builder
            .header(http::header::CONTENT_TYPE, mime::TEXT_PLAIN.as_ref())
            .body(axum::body::Body::from(text.into()))
            .unwrap();
        ResponseChecker::from(self.app.oneshot(request).await.unwrap())
    }
}

/// Validator for the outcome of a request sent by a `OneShotBuilder`.
#[must_use]
pub(crate) struct ResponseChecker {
    /// Actual response that we received from the app.
    response: axum::response::Response,

    /// Expected HTTP status code in the response above.
    exp_status: http::StatusCode,
}

impl From<axum::response::Response> for ResponseChecker {
    fn from(response: axum::response::Response) -> Self {
        Self { response, exp_status: http::StatusCode::OK }
    }
}

impl ResponseChecker {
    /// Sets the expected exit HTTP status to `status`.
    pub(crate) fn expect_status(mut self, status: http::StatusCode) -> Self {
        self.exp_status = status;
        self
    }

    /// Expects the header `name` to be present with the exact value `exp_value`.
    pub(crate) fn expect_header(self, name: &str, exp_value: &str) -> Self {
        let value = self
            .response
            .headers()
            .get(name)
            .unwrap_or_else(|| panic!("Header {} not present in response", name));
        assert_eq!(exp_value, value.to_str().unwrap());
        self
    }

    /// Performs common validation operations on the response.
    fn verify(&self) {
        assert_eq!(self.exp_status, self.response.status());
    }

    /// Reads the body of the response into a string.
    async fn into_body_string(self) -> String {
        let body = axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    /// Finishes checking the response and expects its body to be the JSON serialization
    /// of a `T`, which is returned.
    pub(crate) async fn expect_json<T: DeserializeOwned>(self) -> T {
        self.verify();

        let body = axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
        match serde_json::from_slice::<T>(&body) {
            Ok(response) => response,
            Err(e) => {
                let body = String::from_utf8(body.to_vec()).unwrap();
                panic!("Invalid JSON response due to {}; content was {}", e, body);
            }
        }
    }

    /// Finishes checking the response and expects its body to be an `ErrorResponse` whose
    /// message matches `exp_re`.
    pub(crate) async fn expect_error(self, exp_re: &str) {
        self.verify();

        let body = axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
        let response: ErrorResponse = match serde_json::from_slice(&body) {
            Ok(response) => response,
            Err(e) => {
                let body = String::from_utf8(body.to_vec()).unwrap();
                panic!("Invalid error response due to {}; content was {}", e, body);
            }
        };
        let re = regex::Regex::new(exp_re).unwrap();
        assert!(
            re.is_match(&response.message),
            "Error message '{}' does not match '{}'",
            response.message,
            exp_re
        );
    }

    /// Finishes checking the response and expects its raw body to match `exp_re`.
    pub(crate) async fn expect_text(self, exp_re: &str) {
        self.verify();

        let body = self.into_body_string().await;
        let re = regex::Regex::new(exp_re).unwrap();
        assert!(re.is_match(&body), "Body '{}' does not match '{}'", body, exp_re);
    }
}

/// Verifies that the API given by `route` rejects requests with a non-empty payload.
#[macro_export]
macro_rules! test_payload_must_be_empty [
    ( $app:expr, $route:expr ) => {
        #[tokio::test]
        async fn test_payload_must_be_empty() {
            $crate::rest::testutils::OneShotBuilder::new($app, $route)
                .send_text("some content")
                .await
                .expect_status(axum::http::StatusCode::PAYLOAD_TOO_LARGE)
                .expect_error("Content should be empty")
                .await;
        }
    }
];

pub(crate) use test_payload_must_be_empty;
