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

//! High-level data types.

use derive_getters::Getters;
use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Newtype pattern for the identifier of a customer.
///
/// Identifiers are assigned by the database on insertion, are unique and are never reused.
/// We store them as an `i64` because that's the native width of the auto-increment primary
/// keys in both database backends.
#[derive(Clone, Copy, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
#[cfg_attr(test, derive(Debug))]
pub(crate) struct CustomerId(i64);

impl CustomerId {
    /// Creates a new identifier from a raw database value.
    pub(crate) fn new(id: i64) -> CustomerId {
        CustomerId(id)
    }

    /// Returns the identifier as an `i64` for database binding purposes.
    pub(crate) fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Presence and length rules for one field of a customer.
///
/// This table-driven representation is the single source of truth for the field rules:
/// the validator walks it to vet candidate customers, and the database tests cross-check
/// it against the live schema so that the two can never drift apart.
pub(crate) struct FieldConstraints {
    /// Name of the backing column in the `customers` table.
    pub(crate) column: &'static str,

    /// Name of the field as shown to users in validation messages.
    pub(crate) display_name: &'static str,

    /// Whether the field must carry a non-empty value.
    pub(crate) required: bool,

    /// Minimum length of the value when one is present.
    pub(crate) min_length: Option<usize>,

    /// Maximum length of the value when one is present.
    pub(crate) max_length: Option<usize>,
}

/// Rules for every validated field of a customer, in the order in which violations are
/// reported.
pub(crate) const CUSTOMER_CONSTRAINTS: [FieldConstraints; 3] = [
    FieldConstraints {
        column: "surname",
        display_name: "last name",
        required: true,
        min_length: None,
        max_length: Some(255),
    },
    FieldConstraints {
        column: "forename",
        display_name: "first name",
        required: true,
        min_length: None,
        max_length: Some(255),
    },
    FieldConstraints {
        column: "address",
        display_name: "address",
        required: false,
        min_length: Some(20),
        max_length: Some(250),
    },
];

impl FieldConstraints {
    /// Applies these rules to `value`, collecting any violation into `problems`.
    ///
    /// A `None` value represents an absent optional field, which violates nothing; the
    /// length bounds only apply to values that are present.
    fn check(&self, value: Option<&str>, problems: &mut Vec<String>) {
        let value = match value {
            Some(value) => value,
            None => {
                if self.required {
                    problems.push(format!("Please specify a {}", self.display_name));
                }
                return;
            }
        };

        if value.trim().is_empty() && self.required {
            problems.push(format!("Please specify a {}", self.display_name));
            return;
        }

        let length = value.chars().count();
        match (self.min_length, self.max_length) {
            (Some(min), Some(max)) if length < min || length > max => {
                problems.push(format!(
                    "The {} must be between {} and {} characters long",
                    self.display_name, min, max
                ));
            }
            (None, Some(max)) if length > max => {
                problems.push(format!(
                    "The {} must not be longer than {} characters",
                    self.display_name, max
                ));
            }
            _ => (),
        }
    }
}

/// The user-supplied fields of a customer, before the database assigns an identifier.
///
/// This is the payload of the creation API and the input to the validator, so its values
/// are untrusted until `validate` has accepted them.
#[derive(Clone, Constructor, Deserialize, Getters, Serialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct CustomerData {
    /// The customer's last name.
    surname: String,

    /// The customer's first name.
    forename: String,

    /// The customer's postal address, if known.
    address: Option<String>,
}

impl CustomerData {
    /// Returns the value this candidate carries for the field described by `constraints`.
    fn field_value(&self, constraints: &FieldConstraints) -> Option<&str> {
        match constraints.column {
            "surname" => Some(&self.surname),
            "forename" => Some(&self.forename),
            "address" => self.address.as_deref(),
            column => unreachable!("Unknown column {}", column),
        }
    }

    /// Checks every field against the constraint table.
    ///
    /// All rules are evaluated, so the error carries the messages for every violation at
    /// once instead of stopping at the first one.
    pub(crate) fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = vec![];
        for constraints in &CUSTOMER_CONSTRAINTS {
            constraints.check(self.field_value(constraints), &mut problems);
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

/// A customer as persisted in the store.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize, PartialEq))]
pub(crate) struct Customer {
    /// The store-assigned unique identifier of this customer.
    id: CustomerId,

    /// The user-supplied fields of this customer.
    #[serde(flatten)]
    data: CustomerData,
}
