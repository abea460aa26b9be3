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

//! The core application logic that orchestrates a whole database dump.
//!
//! This module opens the configured sink, snapshots the collection list and
//! drives the Collection Dumper over every collection, one at a time.

use crate::application::collection_dumper::CollectionDumper;
use crate::config::AppConfig;
use crate::domain::entities::{CollectionReport, DumpOutcome, OutputMode};
use crate::domain::errors::Result;
use crate::infrastructure::archive::archive_sink::ArchiveSink;
use crate::infrastructure::local_storage::directory_sink::DirectorySink;
use crate::ports::sink_port::DumpSink;
use crate::ports::source_port::SourceDatabase;
use chrono::{DateTime, Utc};
use log::{error, info};
use std::sync::Arc;
use std::time::Instant;

/// Orchestrates the end-to-end dump of one database.
pub struct Orchestrator {
    source: Arc<dyn SourceDatabase>,
    config: AppConfig,
}

impl Orchestrator {
    pub fn new(source: Arc<dyn SourceDatabase>, config: AppConfig) -> Self {
        Self { source, config }
    }

    /// Entry point for running the full dump.
    ///
    /// The first failing collection aborts the run. Artifacts of the
    /// collections before it stay where they were written; an archive is
    /// left without its trailer.
    pub fn run(&self) -> Result<DumpOutcome> {
        self.run_at(Utc::now())
    }

    /// Same as `run`, with an explicit start time for the archive name.
    pub fn run_at(&self, started_at: DateTime<Utc>) -> Result<DumpOutcome> {
        let db_name = self.source.database_name().to_string();
        info!("Dumping {}...", db_name);

        match self.dump_database(&db_name, started_at) {
            Ok(outcome) => {
                info!(
                    "Successfully dumped {}! {} collections, {} documents, {} bytes written to {}",
                    db_name,
                    outcome.collections.len(),
                    outcome.total_documents(),
                    outcome.total_bytes(),
                    outcome.location.display()
                );
                Ok(outcome)
            }
            Err(e) => {
                error!("Failed to dump {}: {}", db_name, e);
                Err(e)
            }
        }
    }

    fn dump_database(&self, db_name: &str, started_at: DateTime<Utc>) -> Result<DumpOutcome> {
        let start_time = Instant::now();
        let mut sink = self.open_sink(db_name, started_at)?;

        let collections = self.source.list_collection_names()?;
        if collections.is_empty() {
            info!("No collections found in {}.", db_name);
        }

        let dumper = CollectionDumper::new(
            &*self.source,
            self.config.dump.buffer,
            self.config.dump.sort_by_id,
        );

        let mut reports: Vec<CollectionReport> = Vec::with_capacity(collections.len());
        for name in &collections {
            info!("Dumping collection {}...", name);
            let report = dumper.dump(name, &mut *sink)?;
            info!(
                "Successfully dumped collection {}! ({} documents, {} bytes)",
                name, report.documents, report.data_bytes
            );
            reports.push(report);
        }

        let location = sink.finish()?;
        info!(
            "Dump of {} finished in {:.2}s",
            db_name,
            start_time.elapsed().as_secs_f64()
        );

        Ok(DumpOutcome {
            location,
            collections: reports,
        })
    }

    /// Creates the output directory and the sink for the configured mode.
    fn open_sink(&self, db_name: &str, started_at: DateTime<Utc>) -> Result<Box<dyn DumpSink>> {
        let output_dir = &self.config.dump.dir;
        std::fs::create_dir_all(output_dir)?;

        Ok(match self.config.dump.mode {
            OutputMode::Directory => Box::new(DirectorySink::create(output_dir, db_name)?),
            OutputMode::Archive => Box::new(ArchiveSink::create(output_dir, db_name, started_at)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DumpConfig, MongoConfig};
    use crate::domain::entities::BufferMode;
    use crate::domain::errors::DumpError;
    use crate::test_support::{FailurePoint, MemoryCollection, MemorySource};
    use bson::{doc, Bson, Document};
    use chrono::TimeZone;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use std::path::Path;

    fn config(dir: &Path, mode: OutputMode) -> AppConfig {
        AppConfig {
            mongo: MongoConfig {
                url: "mongodb://localhost:27017".to_string(),
                db_name: "shop".to_string(),
            },
            dump: DumpConfig {
                dir: dir.to_path_buf(),
                mode,
                buffer: BufferMode::Memory,
                sort_by_id: false,
            },
        }
    }

    fn shop() -> MemorySource {
        MemorySource::new(
            "shop",
            vec![
                MemoryCollection::new(
                    "orders",
                    vec![
                        doc! { "_id": 1, "item": "pen", "qty": 2 },
                        doc! { "_id": 2, "item": "ink", "qty": 1 },
                    ],
                )
                .with_indexes(vec![]),
                MemoryCollection::new("users", vec![doc! { "_id": 1, "email": "ada@example.com" }])
                    .with_indexes(vec![doc! {
                        "v": 2,
                        "key": { "email": 1 },
                        "name": "email_1",
                        "ns": "shop.users",
                    }]),
            ],
        )
    }

    fn started_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
    }

    fn count_documents(bytes: &[u8]) -> usize {
        let mut cursor = std::io::Cursor::new(bytes);
        let mut count = 0;
        while (cursor.position() as usize) < bytes.len() {
            Document::from_reader(&mut cursor).unwrap();
            count += 1;
        }
        count
    }

    fn parse_metadata(text: &str) -> Document {
        let value: serde_json::Value = serde_json::from_str(text).unwrap();
        match Bson::try_from(value).unwrap() {
            Bson::Document(d) => d,
            other => panic!("expected a document, got {:?}", other),
        }
    }

    fn archive_entries(path: &Path) -> Vec<(String, u64, Vec<u8>)> {
        let mut archive = tar::Archive::new(GzDecoder::new(std::fs::File::open(path).unwrap()));
        archive
            .entries()
            .unwrap()
            .map(|entry| {
                let mut entry = entry.unwrap();
                let name = entry.path().unwrap().to_string_lossy().into_owned();
                let size = entry.header().size().unwrap();
                let mut body = Vec::new();
                entry.read_to_end(&mut body).unwrap();
                (name, size, body)
            })
            .collect()
    }

    #[test]
    fn test_directory_mode_shop_scenario() {
        let temp_dir = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::new(
            Arc::new(shop()),
            config(temp_dir.path(), OutputMode::Directory),
        );

        let outcome = orchestrator.run().unwrap();
        let db_dir = temp_dir.path().join("shop");
        assert_eq!(outcome.location, db_dir);
        assert_eq!(outcome.collections.len(), 2);
        assert_eq!(outcome.total_documents(), 3);

        let orders = std::fs::read(db_dir.join("orders.bson")).unwrap();
        assert_eq!(count_documents(&orders), 2);
        let users = std::fs::read(db_dir.join("users.bson")).unwrap();
        assert_eq!(count_documents(&users), 1);

        let orders_meta =
            parse_metadata(&std::fs::read_to_string(db_dir.join("orders.metadata.json")).unwrap());
        assert!(orders_meta.get_array("indexes").unwrap().is_empty());

        let users_meta =
            parse_metadata(&std::fs::read_to_string(db_dir.join("users.metadata.json")).unwrap());
        let indexes = users_meta.get_array("indexes").unwrap();
        assert_eq!(indexes.len(), 1);
        let index = indexes[0].as_document().unwrap();
        assert_eq!(index.get_document("key").unwrap(), &doc! { "email": 1 });
        assert!(index.get("ns").is_none());

        let mut files: Vec<String> = std::fs::read_dir(&db_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        files.sort();
        assert_eq!(
            files,
            vec![
                "orders.bson",
                "orders.metadata.json",
                "users.bson",
                "users.metadata.json"
            ]
        );
    }

    #[test]
    fn test_archive_mode() {
        let temp_dir = tempfile::tempdir().unwrap();
        let out_dir = temp_dir.path().join("backups");
        let orchestrator =
            Orchestrator::new(Arc::new(shop()), config(&out_dir, OutputMode::Archive));

        let outcome = orchestrator.run_at(started_at()).unwrap();
        assert_eq!(
            outcome.location,
            out_dir.join("shop_backup_2025_01_02_03_04_05.tar.gz")
        );

        let entries = archive_entries(&outcome.location);
        assert_eq!(entries.len(), 2 * outcome.collections.len());
        for (_, size, body) in &entries {
            assert_eq!(*size, body.len() as u64);
        }
        let names: Vec<&str> = entries.iter().map(|(n, _, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "dump/shop/orders.bson",
                "dump/shop/orders.metadata.json",
                "dump/shop/users.bson",
                "dump/shop/users.metadata.json"
            ]
        );
        assert_eq!(count_documents(&entries[0].2), 2);
    }

    #[test]
    fn test_repeated_runs_have_identical_content() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();

        let a = Orchestrator::new(Arc::new(shop()), config(first.path(), OutputMode::Archive))
            .run_at(started_at())
            .unwrap();
        let b = Orchestrator::new(Arc::new(shop()), config(second.path(), OutputMode::Archive))
            .run_at(Utc.with_ymd_and_hms(2025, 6, 7, 8, 9, 10).unwrap())
            .unwrap();

        let contents = |path: &Path| -> Vec<(String, Vec<u8>)> {
            archive_entries(path)
                .into_iter()
                .map(|(name, _, body)| (name, body))
                .collect()
        };
        assert_eq!(contents(&a.location), contents(&b.location));
        assert_eq!(a.collections, b.collections);
    }

    #[test]
    fn test_failure_stops_later_collections() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = shop().failing("orders", FailurePoint::Indexes);
        let orchestrator =
            Orchestrator::new(Arc::new(source), config(temp_dir.path(), OutputMode::Directory));

        let err = orchestrator.run().unwrap_err();
        assert!(matches!(err, DumpError::CollectionError { .. }));

        let db_dir = temp_dir.path().join("shop");
        assert!(!db_dir.join("orders.bson").exists());
        assert!(!db_dir.join("users.bson").exists());
        assert!(!db_dir.join("users.metadata.json").exists());
    }

    #[test]
    fn test_failure_keeps_earlier_collections() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = shop().failing("users", FailurePoint::Options);
        let orchestrator =
            Orchestrator::new(Arc::new(source), config(temp_dir.path(), OutputMode::Directory));

        assert!(orchestrator.run().is_err());

        let db_dir = temp_dir.path().join("shop");
        assert!(db_dir.join("orders.bson").exists());
        assert!(db_dir.join("orders.metadata.json").exists());
        assert!(!db_dir.join("users.bson").exists());
    }

    #[test]
    fn test_failure_leaves_archive_unfinalized() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = shop().failing("users", FailurePoint::Indexes);
        let orchestrator =
            Orchestrator::new(Arc::new(source), config(temp_dir.path(), OutputMode::Archive));

        assert!(orchestrator.run_at(started_at()).is_err());

        let path = temp_dir
            .path()
            .join("shop_backup_2025_01_02_03_04_05.tar.gz");
        assert!(path.exists());

        let mut raw = Vec::new();
        GzDecoder::new(std::fs::File::open(&path).unwrap())
            .read_to_end(&mut raw)
            .unwrap();
        assert!(!raw.is_empty());
        assert!(!raw.ends_with(&[0u8; 1024]));
    }

    fn with_escaping_name() -> MemorySource {
        MemorySource::new(
            "shop",
            vec![MemoryCollection::new("../../escaped", vec![doc! { "_id": 1 }])],
        )
    }

    #[test]
    fn test_directory_mode_keeps_separator_names_inside_db_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let out_dir = temp_dir.path().join("out");
        let orchestrator = Orchestrator::new(
            Arc::new(with_escaping_name()),
            config(&out_dir, OutputMode::Directory),
        );

        orchestrator.run().unwrap();

        let db_dir = out_dir.join("shop");
        assert!(db_dir.join("..%2F..%2Fescaped.bson").is_file());
        assert!(db_dir.join("..%2F..%2Fescaped.metadata.json").is_file());
        assert!(!temp_dir.path().join("escaped.bson").exists());
        assert!(!out_dir.join("escaped.bson").exists());

        let meta = parse_metadata(
            &std::fs::read_to_string(db_dir.join("..%2F..%2Fescaped.metadata.json")).unwrap(),
        );
        assert_eq!(meta.get_str("collectionName").unwrap(), "../../escaped");
    }

    #[test]
    fn test_archive_mode_keeps_separator_names_inside_db_prefix() {
        let temp_dir = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::new(
            Arc::new(with_escaping_name()),
            config(temp_dir.path(), OutputMode::Archive),
        );

        let outcome = orchestrator.run_at(started_at()).unwrap();

        let names: Vec<String> = archive_entries(&outcome.location)
            .into_iter()
            .map(|(name, _, _)| name)
            .collect();
        assert_eq!(
            names,
            vec![
                "dump/shop/..%2F..%2Fescaped.bson",
                "dump/shop/..%2F..%2Fescaped.metadata.json"
            ]
        );
    }

    #[test]
    fn test_empty_database() {
        let temp_dir = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::new(
            Arc::new(MemorySource::new("shop", vec![])),
            config(temp_dir.path(), OutputMode::Directory),
        );

        let outcome = orchestrator.run().unwrap();
        assert!(outcome.collections.is_empty());
        assert!(temp_dir.path().join("shop").is_dir());
    }
}
