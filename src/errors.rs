// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Custom application error with conversions from common Rust and 3rd-party errors.

use crate::entity::EntityInfoBuilderError;
use actix::MailboxError;
use derive_more::Display;
use log::error;

#[derive(Debug, Display, PartialEq)]
pub enum ServiceError {
    #[display("Internal server error: {_0}")]
    InternalServerError(String),

    #[display("Internal serialization error: {_0}")]
    SerializationError(String),

    #[display("BadRequest: {_0}")]
    BadRequest(String),

    #[display("Entity not found: {_0}")]
    NotFound(String),

    #[display("Already exists: {_0}")]
    AlreadyExists(String),

    #[display("The radar connection is closed")]
    NotConnected,
}

impl std::error::Error for ServiceError {}

impl From<std::io::Error> for ServiceError {
    fn from(e: std::io::Error) -> Self {
        ServiceError::InternalServerError(format!("{:?}", e))
    }
}

impl From<MailboxError> for ServiceError {
    fn from(e: MailboxError) -> Self {
        match e {
            MailboxError::Closed => ServiceError::NotConnected,
            MailboxError::Timeout => {
                ServiceError::InternalServerError("Internal message timeout".into())
            }
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        error!("{:?}", e);
        ServiceError::SerializationError(e.to_string())
    }
}

impl From<strum::ParseError> for ServiceError {
    fn from(e: strum::ParseError) -> Self {
        ServiceError::BadRequest(e.to_string())
    }
}

impl From<EntityInfoBuilderError> for ServiceError {
    fn from(e: EntityInfoBuilderError) -> Self {
        ServiceError::InternalServerError(format!("Invalid entity definition: {e}"))
    }
}
