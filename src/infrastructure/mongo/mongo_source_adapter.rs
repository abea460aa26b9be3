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

//! Infrastructure adapter reading collections from a live MongoDB database.

use crate::domain::errors::{DumpError, Result};
use crate::domain::metadata::extract_options;
use crate::ports::source_port::{DocumentCursor, SourceDatabase};
use bson::{doc, Bson, Document};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::options::FindOptions;
use mongodb::sync::Database;

/// Server error code for a collection that does not exist.
const NAMESPACE_NOT_FOUND: i32 = 26;

/// Concrete implementation of `SourceDatabase` on top of the synchronous driver.
pub struct MongoSourceAdapter {
    database: Database,
}

impl MongoSourceAdapter {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn command(&self, command: Document) -> std::result::Result<Document, MongoError> {
        self.database.run_command(command, None)
    }

    /// Collects every document of a command cursor reply, following `getMore`
    /// until the server reports cursor id 0.
    fn drain_command_cursor(&self, mut reply: Document, collection: &str) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        let mut batch_key = "firstBatch";

        loop {
            let cursor_id = {
                let cursor = reply
                    .get_document("cursor")
                    .map_err(|e| DumpError::collection(collection, e))?;
                let batch = cursor
                    .get_array(batch_key)
                    .map_err(|e| DumpError::collection(collection, e))?;
                documents.extend(batch.iter().filter_map(Bson::as_document).cloned());
                cursor
                    .get_i64("id")
                    .map_err(|e| DumpError::collection(collection, e))?
            };

            if cursor_id == 0 {
                return Ok(documents);
            }

            // Runs in a new implicit session; servers that pin cursors to
            // sessions may reject it. listIndexes fits in firstBatch in practice.
            reply = self
                .command(doc! { "getMore": cursor_id, "collection": collection })
                .map_err(|e| DumpError::collection(collection, e))?;
            batch_key = "nextBatch";
        }
    }
}

fn is_namespace_not_found(err: &MongoError) -> bool {
    matches!(&*err.kind, ErrorKind::Command(c) if c.code == NAMESPACE_NOT_FOUND)
}

impl SourceDatabase for MongoSourceAdapter {
    fn database_name(&self) -> &str {
        self.database.name()
    }

    fn list_collection_names(&self) -> Result<Vec<String>> {
        self.database
            .list_collection_names(None)
            .map_err(|e| DumpError::ConnectivityError(e.to_string()))
    }

    fn find_all<'a>(
        &'a self,
        collection: &str,
        sort: Option<Document>,
    ) -> Result<DocumentCursor<'a>> {
        let mut options = FindOptions::default();
        options.sort = sort;

        let cursor = self
            .database
            .collection::<Document>(collection)
            .find(None, options)
            .map_err(|e| DumpError::collection(collection, e))?;

        let name = collection.to_string();
        Ok(Box::new(
            cursor.map(move |doc| doc.map_err(|e| DumpError::collection(&name, e))),
        ))
    }

    fn list_indexes(&self, collection: &str) -> Result<Vec<Document>> {
        match self.command(doc! { "listIndexes": collection }) {
            Ok(reply) => self.drain_command_cursor(reply, collection),
            // Dropped between listing and dumping: no indexes left to record.
            Err(e) if is_namespace_not_found(&e) => Ok(Vec::new()),
            Err(e) => Err(DumpError::collection(collection, e)),
        }
    }

    fn collection_options(&self, collection: &str) -> Result<Document> {
        let reply = self
            .command(doc! { "listCollections": 1, "filter": { "name": collection } })
            .map_err(|e| DumpError::collection(collection, e))?;
        Ok(extract_options(&reply, collection))
    }

    fn run_command(&self, command: Document) -> Result<Document> {
        self.command(command)
            .map_err(|e| DumpError::ConnectivityError(e.to_string()))
    }
}
