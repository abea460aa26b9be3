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

//! Command line entry point for `mongo-dump`.

use clap::Parser;
use mongo_dump::application::entrypoint;
use mongo_dump::config::CliArgs;
use mongo_dump::logging;
use std::process;

fn main() {
    // 1. Initialize Logging
    logging::init();

    // 2. Parse Arguments (flags fall back to MONGO__URL, MONGO__DB_NAME, DUMP__DIR)
    let args = CliArgs::parse();

    // 3. Run the dump through the same boundary a triggered invocation uses
    let response = entrypoint::handler(&serde_json::Value::Null, &args);

    if args.respond {
        println!("{}", serde_json::to_string(&response).unwrap_or_default());
    }

    if !response.is_success() {
        process::exit(1);
    }
}
