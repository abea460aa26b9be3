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

//! # Directory Sink
//!
//! Writes every entry as a plain file under `<output_dir>/<db_name>/`,
//! the layout `mongorestore --dir` expects.

use crate::domain::errors::{DumpError, Result};
use crate::ports::sink_port::DumpSink;
use log::debug;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// `DirectorySink` implements the `DumpSink` port on the local filesystem.
pub struct DirectorySink {
    db_dir: PathBuf,
}

impl DirectorySink {
    /// Creates the `<output_dir>/<db_name>` directory (and its parents).
    pub fn create(output_dir: &Path, db_name: &str) -> Result<Self> {
        let db_dir = output_dir.join(db_name);
        fs::create_dir_all(&db_dir)?;
        Ok(Self { db_dir })
    }

    pub fn db_dir(&self) -> &Path {
        &self.db_dir
    }
}

impl DumpSink for DirectorySink {
    fn write_entry(&mut self, name: &str, size: u64, body: &mut dyn Read) -> Result<()> {
        let path = self.db_dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // File::create truncates an existing dump of the same collection.
        let mut writer = BufWriter::new(File::create(&path)?);
        let written = io::copy(&mut body.take(size), &mut writer)?;
        writer.flush()?;

        if written != size {
            return Err(DumpError::SinkError(format!(
                "{}: declared {} bytes but only {} were available",
                path.display(),
                size,
                written
            )));
        }

        debug!("Wrote {} ({} bytes)", path.display(), written);
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<PathBuf> {
        Ok(self.db_dir)
    }
}
