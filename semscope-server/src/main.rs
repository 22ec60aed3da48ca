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

//! Semscope server binary: loads config, applies CLI overrides, serves.

use clap::Parser;
use semscope_server::ServerConfig;

#[derive(Parser)]
#[command(name = "semscope-server")]
#[command(about = "Project-scoped semantic code/document search API", long_about = None)]
struct Args {
    #[arg(long)]
    config: Option<String>,
    #[arg(long)]
    listen_addr: Option<String>,
    #[arg(long)]
    database_url: Option<String>,
    #[arg(long)]
    qdrant_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    semscope_observability::init_server_tracing("semscope_server=info,tower_http=info");

    let args = Args::parse();
    let mut config = ServerConfig::load(args.config.as_deref())?;

    if let Some(listen_addr) = args.listen_addr {
        config.listen_addr = listen_addr;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }
    if let Some(qdrant_url) = args.qdrant_url {
        config.qdrant_url = qdrant_url;
    }

    semscope_server::run_server(config).await
}
