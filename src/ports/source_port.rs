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

//! # Source Port
//!
//! This Port defines what it means to "read a database" for a dump.
//! It doesn't care if the other side is a live `mongod`, a replica set,
//! or an in-memory fake used by the tests. Any struct that implements
//! `SourceDatabase` can be handed to the Orchestrator.

use crate::domain::errors::Result;
use bson::Document;

/// A forward-only cursor over a collection's documents.
pub type DocumentCursor<'a> = Box<dyn Iterator<Item = Result<Document>> + 'a>;

/// `SourceDatabase` is bound to one database for the life of a run.
pub trait SourceDatabase {
    /// The name of the database being dumped.
    fn database_name(&self) -> &str;

    /// Lists the collection names at this instant.
    fn list_collection_names(&self) -> Result<Vec<String>>;

    /// Opens a cursor over every document of `collection`.
    ///
    /// No filter and no projection are applied. `sort` is `None` for the
    /// server's natural order.
    fn find_all<'a>(&'a self, collection: &str, sort: Option<Document>)
        -> Result<DocumentCursor<'a>>;

    /// Returns the raw index descriptors of `collection`, one document per index.
    fn list_indexes(&self, collection: &str) -> Result<Vec<Document>>;

    /// Returns the options `collection` was created with (`{}` if none).
    fn collection_options(&self, collection: &str) -> Result<Document>;

    /// Runs an administrative command against the database and returns the reply.
    fn run_command(&self, command: Document) -> Result<Document>;
}
