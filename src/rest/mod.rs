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

//! Entry point to the REST server.
//!
//! Every API is put in its own `.rs` file, using a name like `<entity>_<method>.rs`, so
//! that the integration tests for a given API unambiguously belong to that API.

use crate::db::{CustomerTx, Db};
use crate::driver::{Driver, DriverError};
use async_trait::async_trait;
use axum::body::HttpBody;
use axum::extract::{FromRequest, Request};
use axum::http;
use axum::response::IntoResponse;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

mod customer_get;
mod customer_post;
#[cfg(test)]
pub(crate) mod testutils;

/// Frontend errors.  These are the errors that are visible to the user on failed requests.
#[derive(Debug, PartialEq, thiserror::Error)]
pub(crate) enum RestError {
    /// Catch-all error type for all unexpected errors.
    #[error("{0}")]
    InternalError(String),

    /// Indicates an error in the contents of the request.
    #[error("{0}")]
    InvalidRequest(String),

    /// Indicates that a requested entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Indicates that a request that should have empty content did not.
    #[error("Content should be empty")]
    PayloadNotEmpty,
}

impl From<DriverError> for RestError {
    fn from(e: DriverError) -> Self {
        match e {
            DriverError::AlreadyExists(_) => RestError::InvalidRequest(e.to_string()),
            DriverError::BackendError(_) => RestError::InternalError(e.to_string()),
            DriverError::ConstraintViolation(_) => RestError::InvalidRequest(e.to_string()),
            DriverError::InvalidInput(_) => RestError::InvalidRequest(e.to_string()),
            DriverError::NotFound(_) => RestError::NotFound(e.to_string()),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            RestError::InternalError(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
            RestError::InvalidRequest(_) => http::StatusCode::BAD_REQUEST,
            RestError::NotFound(_) => http::StatusCode::NOT_FOUND,
            RestError::PayloadNotEmpty => http::StatusCode::PAYLOAD_TOO_LARGE,
        };

        let response = ErrorResponse { message: self.to_string() };

        (status, Json(response)).into_response()
    }
}

/// Representation of the details of an error response.
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct ErrorResponse {
    /// Textual representation of the error message.
    pub(crate) message: String,
}

/// A request body extractor that forbids any content.
///
/// Any API that doesn't expect a body should use this to ensure we don't get garbage data
/// that we don't care about.  This future-proofs the service.
pub(crate) struct EmptyBody {}

#[async_trait]
impl<S> FromRequest<S> for EmptyBody
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        if req.into_body().is_end_stream() {
            Ok(EmptyBody {})
        } else {
            Err(RestError::PayloadNotEmpty)
        }
    }
}

/// Creates the router for the application.
pub(crate) fn app<D>(driver: Driver<D>) -> Router
where
    D: Db + Clone + Send + Sync + 'static,
    D::Tx: CustomerTx + Send + Sync + 'static,
{
    use axum::routing::{get, post};
    Router::new()
        .route("/api/customer/:id", get(customer_get::handler))
        .route("/api/customer", post(customer_post::handler))
        .with_state(driver)
}
