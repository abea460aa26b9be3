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

//! # Sink Port
//!
//! A `DumpSink` receives named byte streams and persists them. It decouples
//! the Collection Dumper from the directory-versus-archive decision.
//!
//! Every entry is announced with its exact size before its body is read,
//! because a tar header must carry the length of the bytes that follow it.

use crate::domain::errors::Result;
use std::io::{Cursor, Read};
use std::path::PathBuf;

pub trait DumpSink {
    /// Persists one entry of exactly `size` bytes read from `body`.
    fn write_entry(&mut self, name: &str, size: u64, body: &mut dyn Read) -> Result<()>;

    /// Persists one fully buffered entry.
    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        self.write_entry(name, bytes.len() as u64, &mut Cursor::new(bytes))
    }

    /// Finalizes the output and returns where it lives.
    ///
    /// Called once, after every collection was written. A sink dropped
    /// without `finish` leaves its output unfinalized.
    fn finish(self: Box<Self>) -> Result<PathBuf>;
}
