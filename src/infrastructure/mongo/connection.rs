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

//! Opens the MongoDB client and resolves the target database.

use crate::config::MongoConfig;
use crate::domain::errors::{DumpError, Result};
use bson::doc;
use log::info;
use mongodb::sync::{Client, Database};

/// Connects to `config.url` and returns a handle to `config.db_name`.
///
/// The driver connects lazily, so a `ping` is issued to surface unreachable
/// hosts and rejected credentials before any output is created.
pub fn connect(config: &MongoConfig) -> Result<Database> {
    info!("Connecting to {}...", config.redacted_url());

    let client = Client::with_uri_str(&config.url)
        .map_err(|e| DumpError::ConnectivityError(e.to_string()))?;
    let database = client.database(&config.db_name);

    database
        .run_command(doc! { "ping": 1 }, None)
        .map_err(|e| DumpError::ConnectivityError(e.to_string()))?;

    Ok(database)
}
