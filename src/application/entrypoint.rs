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

//! # Entry Point
//!
//! The boundary between a run and whoever triggered it. Whatever goes wrong
//! inside (missing settings, an unreachable server, a failed collection) is
//! logged at FATAL and collapsed into a generic 500 response; error details
//! never leave the process.

use crate::application::orchestrator::Orchestrator;
use crate::application::runtime::RuntimeContext;
use crate::config::{AppConfig, CliArgs};
use crate::domain::entities::DumpOutcome;
use crate::domain::errors::Result;
use crate::logging::FATAL;
use crate::ports::source_port::SourceDatabase;
use log::{error, info};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResponseBody {
    pub msg: String,
}

/// The result handed back to the invoker.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: ResponseBody,
}

impl HandlerResponse {
    pub fn ok() -> Self {
        Self {
            status_code: 200,
            body: ResponseBody {
                msg: "OK".to_string(),
            },
        }
    }

    pub fn internal_error() -> Self {
        Self {
            status_code: 500,
            body: ResponseBody {
                msg: "Internal Server Error".to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Handles one triggered invocation. The event payload carries no settings.
pub fn handler(event: &serde_json::Value, args: &CliArgs) -> HandlerResponse {
    let prepared = AppConfig::load(args)
        .and_then(|config| RuntimeContext::init(&config).map(|runtime| (runtime, config)));

    match prepared {
        Ok((runtime, config)) => handle_with(event, runtime.source, config),
        Err(e) => respond(Err(e)),
    }
}

/// Runs the dump against an already opened source.
pub fn handle_with(
    _event: &serde_json::Value,
    source: Arc<dyn SourceDatabase>,
    config: AppConfig,
) -> HandlerResponse {
    respond(Orchestrator::new(source, config).run())
}

/// Maps the outcome of a run to the outward-facing response.
pub fn respond(result: Result<DumpOutcome>) -> HandlerResponse {
    match result {
        Ok(outcome) => {
            info!("Dump written to {}", outcome.location.display());
            HandlerResponse::ok()
        }
        Err(e) => {
            error!(target: FATAL, "{}", e);
            HandlerResponse::internal_error()
        }
    }
}
