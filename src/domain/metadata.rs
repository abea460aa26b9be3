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

//! # Collection Metadata
//!
//! The `<name>.metadata.json` sidecar that makes a `.bson` file restorable.
//!
//! It is written as canonical Extended JSON: every key keeps its insertion
//! order and every ambiguous value (`int32`, `int64`, binary UUIDs, ...)
//! carries its `$type` wrapper, so identical input always produces
//! byte-identical output.

use crate::domain::errors::Result;
use bson::{doc, Bson, Document};

/// Field carrying the live connection's namespace in index descriptors.
pub const NAMESPACE_FIELD: &str = "ns";

/// The metadata record for a single collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionMetadata {
    pub collection_name: String,
    /// Index descriptors in server order, already stripped of `ns`.
    pub indexes: Vec<Document>,
    /// `info.uuid` from `listCollections`; `None` is written as `null`.
    pub uuid: Option<Bson>,
    /// Collection creation options (`{}` for a plain collection).
    pub options: Document,
}

impl CollectionMetadata {
    pub fn new(
        collection_name: &str,
        indexes: Vec<Document>,
        uuid: Option<Bson>,
        options: Document,
    ) -> Self {
        Self {
            collection_name: collection_name.to_string(),
            indexes: indexes.into_iter().map(strip_namespace).collect(),
            uuid,
            options,
        }
    }

    /// Builds the document in its persisted key order.
    pub fn to_document(&self) -> Document {
        doc! {
            "indexes": self.indexes.iter().cloned().map(Bson::Document).collect::<Vec<_>>(),
            "uuid": self.uuid.clone().unwrap_or(Bson::Null),
            "collectionName": self.collection_name.as_str(),
            "type": "collection",
            "options": self.options.clone(),
        }
    }

    /// Encodes the record as canonical Extended JSON.
    pub fn to_canonical_json(&self) -> Result<String> {
        let value = Bson::Document(self.to_document()).into_canonical_extjson();
        Ok(serde_json::to_string(&value)?)
    }
}

/// Removes the `ns` field, which is an artifact of the live connection.
pub fn strip_namespace(mut index: Document) -> Document {
    index.remove(NAMESPACE_FIELD);
    index
}

/// Finds the entry for `name` in a `listCollections` command reply.
fn find_collection_entry<'a>(reply: &'a Document, name: &str) -> Option<&'a Document> {
    reply
        .get_document("cursor")
        .ok()?
        .get_array("firstBatch")
        .ok()?
        .iter()
        .filter_map(Bson::as_document)
        .find(|entry| entry.get_str("name").map_or(false, |n| n == name))
}

/// Extracts `info.uuid` for `name` from a `listCollections` command reply.
///
/// Returns `None` when the collection is missing from the reply or the server
/// reports no identity (views, old servers).
pub fn extract_uuid(reply: &Document, name: &str) -> Option<Bson> {
    find_collection_entry(reply, name)?
        .get_document("info")
        .ok()?
        .get("uuid")
        .cloned()
}

/// Extracts the creation options for `name` from a `listCollections` reply.
///
/// The server-internal `create` key is dropped; a missing entry yields `{}`.
pub fn extract_options(reply: &Document, name: &str) -> Document {
    let mut options = find_collection_entry(reply, name)
        .and_then(|entry| entry.get_document("options").ok())
        .cloned()
        .unwrap_or_default();
    options.remove("create");
    options
}
