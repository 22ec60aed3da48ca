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

//! Server configuration (§11), layered the same way as
//! `semscope_core::config::SemscopeConfig`: built-in defaults, an
//! optional TOML file, `SEMSCOPE_SERVER_*` environment variables.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub database_url: String,
    pub qdrant_url: String,
    pub embedding_api_key: String,
    pub embedding_model: String,
    pub embedding_base_url: String,
    pub embedding_dimension: usize,
    pub cors_origins: Vec<String>,
    pub semscope: semscope_core::config::SemscopeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            database_url: "postgres://localhost/semscope".to_string(),
            qdrant_url: "http://localhost:6334".to_string(),
            embedding_api_key: String::new(),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_base_url: "https://api.openai.com/v1".to_string(),
            embedding_dimension: 1536,
            cors_origins: Vec::new(),
            semscope: semscope_core::config::SemscopeConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(config::Environment::with_prefix("SEMSCOPE_SERVER").separator("__"));

        builder.build()?.try_deserialize()
    }
}
