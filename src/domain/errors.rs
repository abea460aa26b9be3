// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Core error definitions for the MongoDB dumper.
//!
//! This module provides a centralized `DumpError` enum and a `Result` type
//! used throughout the application. Every variant aborts the run; only the
//! entry point turns one into an outward-facing response.

use thiserror::Error;

/// Error types encountered during a dump.
#[derive(Error, Debug)]
pub enum DumpError {
    /// A required setting is missing. Raised before any I/O happens.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The database could not be reached or refused the credentials.
    #[error("Connectivity error: {0}")]
    ConnectivityError(String),

    /// Reading documents, indexes, options or the UUID of one collection failed.
    #[error("Dump failed for collection {collection}: {reason}")]
    CollectionError { collection: String, reason: String },

    /// The directory or archive output could not be written.
    #[error("Sink error: {0}")]
    SinkError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DumpError {
    /// Wraps any displayable failure as a `CollectionError` for `collection`.
    pub fn collection(collection: &str, reason: impl std::fmt::Display) -> Self {
        DumpError::CollectionError {
            collection: collection.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<bson::ser::Error> for DumpError {
    fn from(e: bson::ser::Error) -> Self {
        DumpError::EncodingError(e.to_string())
    }
}

impl From<bson::de::Error> for DumpError {
    fn from(e: bson::de::Error) -> Self {
        DumpError::EncodingError(e.to_string())
    }
}

impl From<serde_json::Error> for DumpError {
    fn from(e: serde_json::Error) -> Self {
        DumpError::EncodingError(e.to_string())
    }
}

/// A specialized Result type for the MongoDB dumper.
pub type Result<T> = std::result::Result<T, DumpError>;
