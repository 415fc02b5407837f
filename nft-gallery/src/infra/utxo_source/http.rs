// This file is part of nft-gallery.
// Copyright (C) 2025 Midnight Foundation
// SPDX-License-Identifier: Apache-2.0
// Licensed under the Apache License, Version 2.0 (the "License");
// You may not use this file except in compliance with the License.
// You may obtain a copy of the License at
// http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::{
    domain::{UtxoFeedEvent, UtxoRecord, UtxoSource, WalletAddress},
    infra::{join_segments, parse_base_url, utxo_source::Config},
};
use async_stream::stream;
use fastrace::trace;
use futures::{Stream, future};
use log::debug;
use nft_common::error::{BoxError, StdErrorExt};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

/// HTTP based UTXO source, polling `GET {base_url}/address/{address}/utxos` and emitting a
/// snapshot whenever the UTXO list changes.
#[derive(Debug, Clone)]
pub struct HttpUtxoSource {
    client: Client,
    base_url: Url,
    poll_interval: Duration,
}

impl HttpUtxoSource {
    pub fn new(config: &Config) -> Result<Self, HttpUtxoSourceError> {
        let base_url = parse_base_url(&config.base_url).map_err(HttpUtxoSourceError::BaseUrl)?;
        let client = Client::builder()
            .build()
            .map_err(HttpUtxoSourceError::Client)?;

        Ok(Self {
            client,
            base_url,
            poll_interval: config.poll_interval,
        })
    }

    #[trace(properties = { "address": "{address}" })]
    async fn fetch(&self, address: &WalletAddress) -> Result<Vec<UtxoRecord>, HttpUtxoSourceError> {
        let url = join_segments(&self.base_url, ["address", address.0.as_str(), "utxos"]);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(HttpUtxoSourceError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpUtxoSourceError::Status(status));
        }

        let body = response
            .bytes()
            .await
            .map_err(HttpUtxoSourceError::Request)?;
        let records = serde_json::from_slice::<Vec<Value>>(&body).map_err(HttpUtxoSourceError::Parse)?;

        let utxos = records
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<UtxoRecord>(record) {
                Ok(utxo) => Some(utxo),

                Err(error) => {
                    debug!(error:% = error.as_chain(); "skipping malformed UTXO record");
                    None
                }
            })
            .collect();

        Ok(utxos)
    }
}

impl UtxoSource for HttpUtxoSource {
    type Error = HttpUtxoSourceError;

    fn watch(
        &self,
        address: Option<WalletAddress>,
    ) -> impl Stream<Item = Result<UtxoFeedEvent, Self::Error>> + Send {
        let source = self.clone();

        stream! {
            match address {
                None => {
                    yield Ok(UtxoFeedEvent::NoAddress);

                    // Without an address there is nothing to poll.
                    future::pending::<()>().await;
                }

                Some(address) => {
                    yield Ok(UtxoFeedEvent::Loading);

                    let mut last_utxos = None;
                    loop {
                        match source.fetch(&address).await {
                            Ok(utxos) if last_utxos.as_ref() != Some(&utxos) => {
                                last_utxos = Some(utxos.clone());
                                yield Ok(UtxoFeedEvent::Snapshot(utxos));
                            }

                            Ok(_) => {}

                            Err(error) => yield Err(error),
                        }

                        sleep(source.poll_interval).await;
                    }
                }
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum HttpUtxoSourceError {
    #[error("cannot create HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("invalid UTXO endpoint base URL")]
    BaseUrl(#[source] BoxError),

    #[error("cannot request UTXOs")]
    Request(#[source] reqwest::Error),

    #[error("UTXO endpoint responded with status {0}")]
    Status(StatusCode),

    #[error("cannot parse UTXOs")]
    Parse(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use crate::{
        domain::{UtxoFeedEvent, UtxoSource},
        infra::{
            join_segments, serve,
            utxo_source::{
                Config,
                http::{HttpUtxoSource, HttpUtxoSourceError},
            },
        },
    };
    use assert_matches::assert_matches;
    use axum::{Json, Router, extract::Path, http::StatusCode, routing::get};
    use futures::StreamExt;
    use indoc::indoc;
    use serde_json::{Value, json};
    use std::{pin::pin, time::Duration};

    async fn source() -> HttpUtxoSource {
        let router = Router::new()
            .route(
                "/address/{address}/utxos",
                get(|| async {
                    indoc! {r#"
                        [
                            {
                                "txid": "f00d",
                                "vout": 0,
                                "token": {
                                    "category": "c0ffee",
                                    "amount": 0,
                                    "nft": { "capability": "none", "commitment": "01" }
                                }
                            },
                            {
                                "txid": "f00d",
                                "vout": 1,
                                "token": {
                                    "category": "c0ffee",
                                    "nft": { "capability": "frozen", "commitment": "02" }
                                }
                            },
                            { "txid": "beef", "vout": 0 }
                        ]
                    "#}
                }),
            )
            .route("/broken/address/{address}/utxos", get(|| async { StatusCode::BAD_GATEWAY }));
        let base_url = serve(router).await;

        HttpUtxoSource::new(&Config {
            base_url,
            poll_interval: Duration::from_millis(10),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_watch() {
        let source = source().await;
        let mut events = pin!(source.watch(Some("wallet-1".into())));

        assert_matches!(events.next().await, Some(Ok(UtxoFeedEvent::Loading)));

        // The record with an unknown capability is skipped.
        let utxos = assert_matches!(
            events.next().await,
            Some(Ok(UtxoFeedEvent::Snapshot(utxos))) => utxos
        );
        assert_eq!(utxos.len(), 2);
        assert_eq!(utxos[0].transaction_id, "f00d");
        assert_eq!(utxos[1].transaction_id, "beef");
        assert!(utxos[1].token.is_none());

        // Unchanged UTXOs are not emitted again.
        let next = tokio::time::timeout(Duration::from_millis(100), events.next()).await;
        assert!(next.is_err());
    }

    #[tokio::test]
    async fn test_watch_encodes_address() {
        let router = Router::new().route(
            "/address/{address}/utxos",
            get(|Path(address): Path<String>| async move {
                Json::<Value>(json!([{ "txid": address, "vout": 0 }]))
            }),
        );
        let base_url = serve(router).await;
        let source = HttpUtxoSource::new(&Config {
            base_url,
            poll_interval: Duration::from_millis(10),
        })
        .unwrap();

        let mut events = pin!(source.watch(Some("wallet/1?x#y".into())));
        assert_matches!(events.next().await, Some(Ok(UtxoFeedEvent::Loading)));
        assert_matches!(
            events.next().await,
            Some(Ok(UtxoFeedEvent::Snapshot(utxos))) if utxos[0].transaction_id == "wallet/1?x#y"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let source = HttpUtxoSource::new(&Config {
            base_url: "utxo.example.com".to_owned(),
            poll_interval: Duration::from_secs(1),
        });
        assert_matches!(source, Err(HttpUtxoSourceError::BaseUrl(_)));
    }

    #[tokio::test]
    async fn test_watch_no_address() {
        let source = source().await;
        let mut events = pin!(source.watch(None));

        assert_matches!(events.next().await, Some(Ok(UtxoFeedEvent::NoAddress)));
        let next = tokio::time::timeout(Duration::from_millis(50), events.next()).await;
        assert!(next.is_err());
    }

    #[tokio::test]
    async fn test_watch_error() {
        let mut source = source().await;
        source.base_url = join_segments(&source.base_url, ["broken"]);
        let mut events = pin!(source.watch(Some("wallet-1".into())));

        assert_matches!(events.next().await, Some(Ok(UtxoFeedEvent::Loading)));
        assert_matches!(
            events.next().await,
            Some(Err(HttpUtxoSourceError::Status(status))) if status == StatusCode::BAD_GATEWAY
        );
    }
}
