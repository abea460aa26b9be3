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

//! # Data Buffer
//!
//! Holds a collection's concatenated BSON until the cursor is exhausted and
//! its final length is known.
//!
//! In `Memory` mode the buffer grows with the collection, so peak memory is
//! the encoded size of the largest collection in the database. `Spool` mode
//! streams documents into an anonymous temporary file instead and only keeps
//! one encoded document in memory at a time.

use crate::domain::entities::BufferMode;
use crate::domain::errors::Result;
use crate::ports::sink_port::DumpSink;
use bson::Document;
use std::io::{BufReader, BufWriter, Seek, SeekFrom, Write};

pub enum DataBuffer {
    Memory(Vec<u8>),
    Spool {
        writer: BufWriter<std::fs::File>,
        scratch: Vec<u8>,
        len: u64,
    },
}

impl DataBuffer {
    pub fn new(mode: BufferMode) -> Result<Self> {
        Ok(match mode {
            BufferMode::Memory => DataBuffer::Memory(Vec::new()),
            BufferMode::Spool => DataBuffer::Spool {
                writer: BufWriter::new(tempfile::tempfile()?),
                scratch: Vec::new(),
                len: 0,
            },
        })
    }

    /// Appends the BSON encoding of `document`.
    pub fn append(&mut self, document: &Document) -> Result<()> {
        match self {
            DataBuffer::Memory(bytes) => document.to_writer(bytes)?,
            DataBuffer::Spool {
                writer,
                scratch,
                len,
            } => {
                scratch.clear();
                document.to_writer(&mut *scratch)?;
                writer.write_all(scratch.as_slice())?;
                *len += scratch.len() as u64;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> u64 {
        match self {
            DataBuffer::Memory(bytes) => bytes.len() as u64,
            DataBuffer::Spool { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hands the buffered bytes to `sink` as the entry `name`.
    pub fn deliver(self, sink: &mut dyn DumpSink, name: &str) -> Result<()> {
        match self {
            DataBuffer::Memory(bytes) => sink.write(name, &bytes),
            DataBuffer::Spool { writer, len, .. } => {
                let mut file = writer.into_inner().map_err(|e| e.into_error())?;
                file.seek(SeekFrom::Start(0))?;
                sink.write_entry(name, len, &mut BufReader::new(file))
            }
        }
    }
}
