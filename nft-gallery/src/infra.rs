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


pub mod registry;
pub mod utxo_source;

use nft_common::error::BoxError;
use reqwest::Url;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "registry")]
    pub registry_config: registry::Config,

    #[serde(rename = "utxo_source")]
    pub utxo_source_config: utxo_source::Config,
}

/// Parse the given base URL, which must be able to carry path segments.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, BoxError> {
    let url = Url::parse(base_url)?;

    if url.cannot_be_a_base() {
        return Err(format!("{base_url} cannot be a base URL").into());
    }

    Ok(url)
}

/// The given base URL with the given path segments appended, each percent-encoded.
pub(crate) fn join_segments<I>(base_url: &Url, segments: I) -> Url
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut url = base_url.clone();

    // Checked by `parse_base_url`.
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }

    url
}

/// Serve the given router on an ephemeral local port and return its base URL.
#[cfg(test)]
pub(crate) async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener can be bound");
    let address = listener.local_addr().expect("listener has local address");

    tokio::spawn(async move { axum::serve(listener, router).await });

    format!("http://{address}")
}
