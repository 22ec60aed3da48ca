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

//! The `stats_updates` notification channel (§4.7): external observers
//! (dashboards, cache invalidators) subscribe to this rather than
//! polling the tables this crate owns. Not consumed by core behavior.

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgListener;
use tokio::sync::mpsc;

use crate::error::StorageError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsUpdate {
    pub table: String,
    pub op: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Subscribes to `stats_updates` and forwards parsed payloads on the
/// returned channel. The listener task runs until the receiver is
/// dropped or the connection is lost.
pub async fn listen_stats_updates(database_url: &str) -> Result<mpsc::Receiver<StatsUpdate>, StorageError> {
    let mut listener = PgListener::connect(database_url).await?;
    listener.listen("stats_updates").await?;

    let (tx, rx) = mpsc::channel(256);
    tokio::spawn(async move {
        loop {
            match listener.recv().await {
                Ok(notification) => {
                    match serde_json::from_str::<StatsUpdate>(notification.payload()) {
                        Ok(update) => {
                            if tx.send(update).await.is_err() {
                                break;
                            }
                        }
                        Err(error) => {
                            tracing::warn!(%error, "failed to parse stats_updates payload");
                        }
                    }
                }
                Err(error) => {
                    tracing::warn!(%error, "stats_updates listener disconnected");
                    break;
                }
            }
        }
    });

    Ok(rx)
}
