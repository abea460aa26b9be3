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

//! # Collection Dumper
//!
//! Turns one collection into its two artifacts:
//! 1. `<name>.bson`: every document, BSON-encoded and concatenated in cursor order.
//! 2. `<name>.metadata.json`: indexes, options and UUID as canonical Extended JSON.
//!
//! Both artifacts are fully prepared before the first byte reaches the sink,
//! so a collection that fails half-way never leaves a lone `.bson` behind.

use crate::application::data_buffer::DataBuffer;
use crate::domain::entities::{BufferMode, CollectionReport};
use crate::domain::errors::{DumpError, Result};
use crate::domain::metadata::{extract_uuid, CollectionMetadata};
use crate::ports::sink_port::DumpSink;
use crate::ports::source_port::SourceDatabase;
use bson::{doc, Bson, Document};
use log::{debug, error};

pub struct CollectionDumper<'a> {
    source: &'a dyn SourceDatabase,
    buffer_mode: BufferMode,
    sort_by_id: bool,
}

impl<'a> CollectionDumper<'a> {
    pub fn new(source: &'a dyn SourceDatabase, buffer_mode: BufferMode, sort_by_id: bool) -> Self {
        Self {
            source,
            buffer_mode,
            sort_by_id,
        }
    }

    /// Dumps `collection` into `sink`.
    ///
    /// Errors are logged with the collection name and returned unchanged.
    pub fn dump(&self, collection: &str, sink: &mut dyn DumpSink) -> Result<CollectionReport> {
        self.dump_collection(collection, sink).map_err(|e| {
            error!("Failed to dump collection {}: {}", collection, e);
            e
        })
    }

    fn dump_collection(&self, collection: &str, sink: &mut dyn DumpSink) -> Result<CollectionReport> {
        // --- 1. DOCUMENTS ---
        let sort = self.sort_by_id.then(|| doc! { "_id": 1 });
        let mut data = DataBuffer::new(self.buffer_mode)?;
        let mut documents = 0u64;
        for document in self.source.find_all(collection, sort)? {
            data.append(&document?)?;
            documents += 1;
        }
        debug!("Read {} documents from {}", documents, collection);

        // --- 2. INDEXES AND OPTIONS ---
        let indexes = self.source.list_indexes(collection)?;
        let options = self.source.collection_options(collection)?;

        // --- 3. IDENTITY ---
        let uuid = self.resolve_uuid(collection)?;

        let metadata = CollectionMetadata::new(collection, indexes, uuid, options);
        let metadata_json = metadata.to_canonical_json()?;

        // --- 4. DELIVERY ---
        let data_bytes = data.len();
        data.deliver(sink, &data_entry_name(collection))?;
        sink.write(&metadata_entry_name(collection), metadata_json.as_bytes())?;

        Ok(CollectionReport {
            collection: collection.to_string(),
            documents,
            data_bytes,
            metadata_bytes: metadata_json.len() as u64,
        })
    }

    fn resolve_uuid(&self, collection: &str) -> Result<Option<Bson>> {
        let reply = self
            .source
            .run_command(list_collections_command(collection))
            .map_err(|e| match e {
                DumpError::CollectionError { .. } => e,
                other => DumpError::collection(collection, other),
            })?;
        Ok(extract_uuid(&reply, collection))
    }
}

/// `{listCollections: 1, filter: {name: <collection>}}`
pub fn list_collections_command(collection: &str) -> Document {
    doc! { "listCollections": 1, "filter": { "name": collection } }
}

/// Percent-encodes the characters of a collection name that would act as
/// path separators, so every entry stays a single file under `<db>/`.
pub fn escape_collection_name(collection: &str) -> String {
    let mut escaped = String::with_capacity(collection.len());
    for c in collection.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            '/' => escaped.push_str("%2F"),
            '\\' => escaped.push_str("%5C"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn data_entry_name(collection: &str) -> String {
    format!("{}.bson", escape_collection_name(collection))
}

pub fn metadata_entry_name(collection: &str) -> String {
    format!("{}.metadata.json", escape_collection_name(collection))
}
