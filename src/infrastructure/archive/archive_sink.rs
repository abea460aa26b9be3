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

//! # Archive Sink
//!
//! Packs a whole dump into one `<db>_backup_<YYYY_MM_DD_HH_MM_SS>.tar.gz`.
//!
//! Entries are laid out as `dump/<db>/<name>` so that extracting the
//! archive and pointing `mongorestore` at `dump/` just works. Each entry is
//! streamed straight into the gzip encoder: a 512-byte header carrying the
//! declared size, the body, then zero padding up to the next block. The
//! two-block trailer is only written by `finish`, so a run that fails
//! half-way leaves an archive that tar readers reject as truncated.

use crate::domain::errors::{DumpError, Result};
use crate::ports::sink_port::DumpSink;
use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tar::{EntryType, Header};

const BLOCK_SIZE: u64 = 512;
const NAME_FIELD_LEN: usize = 100;
const GNU_LONG_LINK: &str = "././@LongLink";

/// Top-level directory of every entry in the archive.
pub const ARCHIVE_ROOT: &str = "dump";

/// Builds `<db>_backup_<YYYY_MM_DD_HH_MM_SS>.tar.gz` for a run started at `started_at`.
pub fn archive_file_name(db_name: &str, started_at: DateTime<Utc>) -> String {
    format!(
        "{}_backup_{}.tar.gz",
        db_name,
        started_at.format("%Y_%m_%d_%H_%M_%S")
    )
}

/// `ArchiveSink` implements the `DumpSink` port on top of a gzip-compressed tar stream.
pub struct ArchiveSink {
    path: PathBuf,
    entry_prefix: String,
    mtime: u64,
    encoder: GzEncoder<BufWriter<File>>,
}

impl ArchiveSink {
    /// Creates the archive file inside `output_dir`.
    pub fn create(output_dir: &Path, db_name: &str, started_at: DateTime<Utc>) -> Result<Self> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(archive_file_name(db_name, started_at));
        let file = File::create(&path)?;

        Ok(Self {
            path,
            entry_prefix: format!("{}/{}", ARCHIVE_ROOT, db_name),
            mtime: started_at.timestamp().max(0) as u64,
            encoder: GzEncoder::new(BufWriter::new(file), Compression::default()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn new_header(&self, entry_type: EntryType, size: u64) -> Header {
        let mut header = Header::new_gnu();
        header.set_entry_type(entry_type);
        header.set_size(size);
        header.set_mode(0o644);
        header.set_mtime(self.mtime);
        header
    }

    /// Writes the header for `entry_path`, preceded by a GNU long-name
    /// record when the path does not fit the 100-byte name field.
    fn write_header(&mut self, entry_path: &str, size: u64) -> Result<()> {
        let mut header = self.new_header(EntryType::Regular, size);

        if entry_path.len() > NAME_FIELD_LEN {
            let mut long_name = entry_path.as_bytes().to_vec();
            long_name.push(0);

            let mut link = self.new_header(EntryType::GNULongName, long_name.len() as u64);
            set_raw_name(&mut link, GNU_LONG_LINK.as_bytes());
            link.set_cksum();
            self.encoder.write_all(link.as_bytes())?;
            self.encoder.write_all(&long_name)?;
            self.write_padding(long_name.len() as u64)?;

            set_raw_name(&mut header, entry_path.as_bytes());
        } else {
            header
                .set_path(entry_path)
                .map_err(|e| DumpError::SinkError(format!("{}: {}", entry_path, e)))?;
        }

        header.set_cksum();
        self.encoder.write_all(header.as_bytes())?;
        Ok(())
    }

    fn write_padding(&mut self, written: u64) -> Result<()> {
        let remainder = written % BLOCK_SIZE;
        if remainder != 0 {
            let padding = vec![0u8; (BLOCK_SIZE - remainder) as usize];
            self.encoder.write_all(&padding)?;
        }
        Ok(())
    }
}

/// Copies up to 100 bytes of `name` into the header's name field.
fn set_raw_name(header: &mut Header, name: &[u8]) {
    let field = &mut header.as_old_mut().name;
    let len = name.len().min(NAME_FIELD_LEN);
    field.fill(0);
    field[..len].copy_from_slice(&name[..len]);
}

impl DumpSink for ArchiveSink {
    fn write_entry(&mut self, name: &str, size: u64, body: &mut dyn Read) -> Result<()> {
        let entry_path = format!("{}/{}", self.entry_prefix, name);
        self.write_header(&entry_path, size)?;

        let written = io::copy(&mut body.take(size), &mut self.encoder)?;
        if written != size {
            return Err(DumpError::SinkError(format!(
                "{}: declared {} bytes but only {} were available",
                entry_path, size, written
            )));
        }
        self.write_padding(written)?;

        debug!("Archived {} ({} bytes)", entry_path, written);
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<PathBuf> {
        // End-of-archive marker: two zero blocks.
        self.encoder.write_all(&[0u8; 2 * BLOCK_SIZE as usize])?;

        let this = *self;
        let mut writer = this.encoder.finish()?;
        writer.flush()?;
        Ok(this.path)
    }
}
