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

//! Semscope CLI
//!
//! Thin clap binary wiring ingestion (C8) and hybrid query (C9/C10) for
//! local use against a Postgres + Qdrant backend.

mod cli;
mod commands;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    semscope_observability::init_cli_tracing(args.verbose);

    if let Err(error) = commands::run(args).await {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }

    Ok(())
}
