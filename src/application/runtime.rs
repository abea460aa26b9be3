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

//! # Runtime Context
//!
//! Sets up the resources a run needs before the first collection is read:
//! the MongoDB client and the handle to the database being dumped.

use crate::config::AppConfig;
use crate::domain::errors::Result;
use crate::infrastructure::mongo::connection;
use crate::infrastructure::mongo::mongo_source_adapter::MongoSourceAdapter;
use crate::ports::source_port::SourceDatabase;
use log::info;
use std::sync::Arc;

/// `RuntimeContext` holds the shared resources that live for the whole run.
pub struct RuntimeContext {
    pub source: Arc<dyn SourceDatabase>,
}

impl RuntimeContext {
    /// Connects to the configured database.
    ///
    /// Fails with `ConnectivityError` if the server cannot be reached.
    pub fn init(config: &AppConfig) -> Result<Self> {
        let database = connection::connect(&config.mongo)?;
        info!("Connected to database {}", config.mongo.db_name);

        Ok(Self {
            source: Arc::new(MongoSourceAdapter::new(database)),
        })
    }
}
