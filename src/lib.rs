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

//! # MongoDB Dump
//!
//! A logical backup utility for MongoDB. Every collection of a database is
//! written as a `.bson` file of concatenated documents plus a
//! `.metadata.json` sidecar (indexes, options, UUID), either as loose files
//! or packed into a single `.tar.gz` archive.
//!
//! This crate follows the **Hexagonal Architecture** (Ports and Adapters):
//! the dump pipeline in `application` only talks to the `SourceDatabase` and
//! `DumpSink` ports, and `infrastructure` provides the MongoDB, directory and
//! archive adapters behind them.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod ports;

#[cfg(test)]
pub mod test_support;
