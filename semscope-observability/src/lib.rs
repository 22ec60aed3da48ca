// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tracing setup shared by `semscope-cli` and `semscope-server`.
//!
//! No telemetry transport lives here; real-time trace/metric export is
//! out of scope (§1 Non-goals). This only wires up `tracing-subscriber`
//! the way the teacher's binaries do, one layer per deployment target.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_FILTER: &str = "info";

fn env_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

/// Initializes JSON-formatted structured logging for `semscope-server`.
///
/// Respects `RUST_LOG` if set, otherwise falls back to `default_directives`
/// (e.g. `"semscope_server=info,tower_http=info"`).
pub fn init_server_tracing(default_directives: &str) {
    tracing_subscriber::registry()
        .with(env_filter(default_directives))
        .with(tracing_subscriber::fmt::layer().json().with_target(true))
        .init();
}

/// Initializes compact human-readable logging for `semscope-cli`.
///
/// `verbose` raises the default floor from `info` to `debug` when no
/// `RUST_LOG` override is present; pass the CLI's `-v`/`--verbose` flag.
pub fn init_cli_tracing(verbose: bool) {
    let default_directives = if verbose { "debug" } else { DEFAULT_FILTER };
    tracing_subscriber::registry()
        .with(env_filter(default_directives))
        .with(tracing_subscriber::fmt::layer().without_time().with_target(false))
        .init();
}
