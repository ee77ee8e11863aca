// src/request.rs

//! # Services and requests
//!
//! A `Service` is an opened namespace on a session; it creates `Request`s for
//! the operations it exposes.

use crate::error::SessionError;
use crate::message::{fmt_fields, FieldValue};
use std::fmt::{self, Display};

/// An opened service endpoint, e.g. `//blp/emapisvc_beta`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Service {
    name: String,
    operations: Vec<String>,
}

impl Service {
    pub fn new<I, S>(name: impl Into<String>, operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            operations: operations.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operations(&self) -> &[String] {
        &self.operations
    }

    /// Create an empty request for `operation`.
    pub fn create_request(&self, operation: &str) -> Result<Request, SessionError> {
        if !self.operations.iter().any(|op| op == operation) {
            return Err(SessionError::UnknownOperation {
                service: self.name.clone(),
                operation: operation.to_string(),
            });
        }
        Ok(Request {
            service: self.name.clone(),
            operation: operation.to_string(),
            fields: Vec::new(),
        })
    }
}

/// A named operation call with its fields in the order they were set.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    service: String,
    operation: String,
    fields: Vec<(String, FieldValue)>,
}

impl Request {
    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    /// Set `name`, replacing any earlier value in place.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(field, _)| field == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(field, _)| field == name).map(|(_, v)| v)
    }
}

impl Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_fields(f, &self.operation, &self.fields)
    }
}
