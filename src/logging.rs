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

//! # Structured Logging
//!
//! Every log line is a single JSON object on stdout:
//!
//! ```text
//! {"msg":"Dumping collection orders...","level":"INFO","stream_name":"main"}
//! ```
//!
//! The crate logs through the `log` macros; `init` installs an `env_logger`
//! backend with this formatter. `log` has no FATAL level, so fatal events are
//! logged at ERROR with `target: FATAL` and rendered as `"FATAL"`.

use log::{Level, Record};
use serde_json::json;
use std::io::Write;

/// Log target marking an event as fatal.
///
/// Kept under the crate path so crate-scoped `RUST_LOG` filters such as
/// `mongo_dump=info` still let fatal events through.
pub const FATAL: &str = "mongo_dump::fatal";

/// Value of the `stream_name` field.
pub const STREAM_NAME: &str = "main";

/// Installs the JSON-line logger. `RUST_LOG` overrides the default `info` filter.
pub fn init() {
    let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .format(|buf, record| writeln!(buf, "{}", format_record(record)))
        .try_init();

    if let Err(e) = result {
        log::debug!("Logger already initialized: {}", e);
    }
}

/// Maps a record to its `level` field.
pub fn level_name(record: &Record<'_>) -> &'static str {
    if record.target() == FATAL {
        return "FATAL";
    }
    match record.level() {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

/// Renders one record as a JSON line (without the trailing newline).
pub fn format_record(record: &Record<'_>) -> String {
    json!({
        "msg": record.args().to_string(),
        "level": level_name(record),
        "stream_name": STREAM_NAME,
    })
    .to_string()
}
