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

//! # Domain Entities
//!
//! The "Nouns" of a dump: where the output goes, how a collection's data is
//! buffered before it reaches the sink, and the per-collection report card.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// `OutputMode` selects the sink used for a run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Loose `<name>.bson` / `<name>.metadata.json` files under `<dir>/<db>/`.
    #[default]
    Directory,
    /// A single `<db>_backup_<timestamp>.tar.gz` under `<dir>`.
    Archive,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Directory => write!(f, "directory"),
            OutputMode::Archive => write!(f, "archive"),
        }
    }
}

/// `BufferMode` decides where a collection's encoded documents live until
/// their total size is known.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BufferMode {
    /// The whole data artifact is held in memory. Peak memory is the
    /// encoded size of the largest collection.
    #[default]
    Memory,
    /// Documents are spooled to an anonymous temporary file.
    Spool,
}

impl fmt::Display for BufferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferMode::Memory => write!(f, "memory"),
            BufferMode::Spool => write!(f, "spool"),
        }
    }
}

/// `CollectionReport` tells the Orchestrator what was written for one collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionReport {
    pub collection: String,
    /// Number of documents read from the cursor.
    pub documents: u64,
    /// Size of `<name>.bson`.
    pub data_bytes: u64,
    /// Size of `<name>.metadata.json`.
    pub metadata_bytes: u64,
}

/// The result of a successful run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DumpOutcome {
    /// The database directory (directory mode) or the archive file (archive mode).
    pub location: PathBuf,
    pub collections: Vec<CollectionReport>,
}

impl DumpOutcome {
    pub fn total_documents(&self) -> u64 {
        self.collections.iter().map(|c| c.documents).sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.collections
            .iter()
            .map(|c| c.data_bytes + c.metadata_bytes)
            .sum()
    }
}
