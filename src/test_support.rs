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

//! In-memory `SourceDatabase` used by the unit tests in place of a live server.

use crate::domain::errors::{DumpError, Result};
use crate::ports::source_port::{DocumentCursor, SourceDatabase};
use bson::spec::BinarySubtype;
use bson::{doc, Binary, Bson, Document};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Where a `MemorySource` should fail for a given collection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailurePoint {
    /// The cursor yields an error after the first document.
    Cursor,
    Indexes,
    Options,
    Command,
}

#[derive(Debug, Clone)]
pub struct MemoryCollection {
    pub name: String,
    pub documents: Vec<Document>,
    pub indexes: Vec<Document>,
    pub options: Document,
    pub uuid: Option<Bson>,
}

impl MemoryCollection {
    /// A collection with the implicit `_id_` index and a UUID derived from its name.
    pub fn new(name: &str, documents: Vec<Document>) -> Self {
        Self {
            name: name.to_string(),
            documents,
            indexes: vec![doc! {
                "v": 2,
                "key": { "_id": 1 },
                "name": "_id_",
                "ns": format!("test.{}", name),
            }],
            options: Document::new(),
            uuid: Some(uuid_for(name)),
        }
    }

    pub fn with_indexes(mut self, indexes: Vec<Document>) -> Self {
        self.indexes = indexes;
        self
    }

    pub fn with_options(mut self, options: Document) -> Self {
        self.options = options;
        self
    }

    pub fn without_uuid(mut self) -> Self {
        self.uuid = None;
        self
    }
}

/// A deterministic binary UUID for `name`.
pub fn uuid_for(name: &str) -> Bson {
    let mut bytes = [0u8; 16];
    for (i, b) in name.bytes().enumerate() {
        bytes[i % 16] ^= b;
    }
    Bson::Binary(Binary {
        subtype: BinarySubtype::Uuid,
        bytes: bytes.to_vec(),
    })
}

pub struct MemorySource {
    db_name: String,
    collections: Vec<MemoryCollection>,
    failures: HashMap<String, FailurePoint>,
}

impl MemorySource {
    pub fn new(db_name: &str, collections: Vec<MemoryCollection>) -> Self {
        Self {
            db_name: db_name.to_string(),
            collections,
            failures: HashMap::new(),
        }
    }

    pub fn failing(mut self, collection: &str, point: FailurePoint) -> Self {
        self.failures.insert(collection.to_string(), point);
        self
    }

    fn collection(&self, name: &str) -> Result<&MemoryCollection> {
        self.collections
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| DumpError::collection(name, "ns does not exist"))
    }

    fn check(&self, name: &str, point: FailurePoint) -> Result<()> {
        match self.failures.get(name) {
            Some(p) if *p == point => Err(DumpError::collection(
                name,
                format!("injected {:?} failure", point),
            )),
            _ => Ok(()),
        }
    }

    fn list_collections_reply(&self, name: &str) -> Document {
        let batch: Vec<Bson> = self
            .collections
            .iter()
            .filter(|c| c.name == name)
            .map(|c| {
                let mut info = doc! { "readOnly": false };
                if let Some(uuid) = &c.uuid {
                    info.insert("uuid", uuid.clone());
                }
                Bson::Document(doc! {
                    "name": c.name.as_str(),
                    "type": "collection",
                    "options": c.options.clone(),
                    "info": info,
                })
            })
            .collect();

        doc! {
            "cursor": {
                "id": 0_i64,
                "ns": format!("{}.$cmd.listCollections", self.db_name),
                "firstBatch": batch,
            },
            "ok": 1.0,
        }
    }
}

fn compare_ids(a: &Document, b: &Document) -> Ordering {
    let key = |d: &Document| match d.get("_id") {
        Some(Bson::Int32(v)) => (0, i64::from(*v), String::new()),
        Some(Bson::Int64(v)) => (0, *v, String::new()),
        Some(other) => (1, 0, other.to_string()),
        None => (2, 0, String::new()),
    };
    key(a).cmp(&key(b))
}

impl SourceDatabase for MemorySource {
    fn database_name(&self) -> &str {
        &self.db_name
    }

    fn list_collection_names(&self) -> Result<Vec<String>> {
        Ok(self.collections.iter().map(|c| c.name.clone()).collect())
    }

    fn find_all<'a>(
        &'a self,
        collection: &str,
        sort: Option<Document>,
    ) -> Result<DocumentCursor<'a>> {
        let mut documents = self.collection(collection)?.documents.clone();
        if sort.is_some() {
            documents.sort_by(compare_ids);
        }

        let mut items: Vec<Result<Document>> = documents.into_iter().map(Ok).collect();
        if self.check(collection, FailurePoint::Cursor).is_err() {
            items.truncate(1);
            items.push(Err(DumpError::collection(collection, "cursor killed")));
        }
        Ok(Box::new(items.into_iter()))
    }

    fn list_indexes(&self, collection: &str) -> Result<Vec<Document>> {
        self.check(collection, FailurePoint::Indexes)?;
        Ok(self.collection(collection)?.indexes.clone())
    }

    fn collection_options(&self, collection: &str) -> Result<Document> {
        self.check(collection, FailurePoint::Options)?;
        Ok(self.collection(collection)?.options.clone())
    }

    fn run_command(&self, command: Document) -> Result<Document> {
        let name = command
            .get_document("filter")
            .and_then(|f| f.get_str("name"))
            .map_err(|e| DumpError::EncodingError(e.to_string()))?;
        self.check(name, FailurePoint::Command)?;

        if command.contains_key("listCollections") {
            Ok(self.list_collections_reply(name))
        } else {
            Err(DumpError::ConnectivityError(format!(
                "unsupported command {:?}",
                command.keys().next()
            )))
        }
    }
}
