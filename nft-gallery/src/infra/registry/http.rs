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
    domain::{CategoryId, MetadataRegistry, RegistryDocument},
    infra::{join_segments, parse_base_url, registry::Config},
};
use fastrace::trace;
use log::debug;
use nft_common::error::BoxError;
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;

/// HTTP based metadata registry, requesting `GET {base_url}/{category}`.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    client: Client,
    base_url: Url,
}

impl HttpRegistry {
    pub fn new(config: &Config) -> Result<Self, HttpRegistryError> {
        let base_url = parse_base_url(&config.base_url).map_err(HttpRegistryError::BaseUrl)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(HttpRegistryError::Client)?;

        Ok(Self { client, base_url })
    }
}

impl MetadataRegistry for HttpRegistry {
    type Error = HttpRegistryError;

    #[trace(properties = { "category": "{category}" })]
    async fn resolve(&self, category: &CategoryId) -> Result<RegistryDocument, Self::Error> {
        let url = join_segments(&self.base_url, [&**category]);
        debug!(url:%; "requesting registry document");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(HttpRegistryError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpRegistryError::Status(status));
        }

        let body = response
            .bytes()
            .await
            .map_err(HttpRegistryError::Request)?;
        serde_json::from_slice(&body).map_err(HttpRegistryError::Parse)
    }
}

#[derive(Debug, Error)]
pub enum HttpRegistryError {
    #[error("cannot create HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("invalid registry base URL")]
    BaseUrl(#[source] BoxError),

    #[error("cannot request registry document")]
    Request(#[source] reqwest::Error),

    #[error("registry responded with status {0}")]
    Status(StatusCode),

    #[error("cannot parse registry document")]
    Parse(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use crate::{
        domain::{CategoryId, MetadataRegistry},
        infra::{
            registry::{
                Config,
                http::{HttpRegistry, HttpRegistryError},
            },
            serve,
        },
    };
    use assert_matches::assert_matches;
    use axum::{Json, Router, extract::Path, http::StatusCode, routing::get};
    use indoc::indoc;
    use serde_json::{Value, json};
    use std::time::Duration;

    fn config(base_url: String) -> Config {
        Config {
            base_url,
            cache_ttl: Duration::from_secs(60),
            user_agent: "nft-gallery-test".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_resolve() {
        let router = Router::new()
            .route(
                "/c0ffee",
                get(|| async {
                    indoc! {r#"
                        {
                            "token": { "name": "Ticket A", "image": "https://x/a.png" }
                        }
                    "#}
                }),
            )
            .route("/bad", get(|| async { "{ not json" }))
            .route("/gone", get(|| async { StatusCode::NOT_FOUND }));
        let base_url = serve(router).await;

        // Trailing slashes of the base URL must not matter.
        let registry = HttpRegistry::new(&config(format!("{base_url}/"))).unwrap();

        let category = CategoryId::try_from("C0FFEE").unwrap();
        let document = registry.resolve(&category).await.unwrap();
        let token = document.token.unwrap();
        assert_eq!(token.name.as_deref(), Some("Ticket A"));
        assert_eq!(token.image.as_deref(), Some("https://x/a.png"));

        let category = CategoryId::try_from("gone").unwrap();
        let document = registry.resolve(&category).await;
        assert_matches!(
            document,
            Err(HttpRegistryError::Status(status)) if status == StatusCode::NOT_FOUND
        );

        let category = CategoryId::try_from("bad").unwrap();
        let document = registry.resolve(&category).await;
        assert_matches!(document, Err(HttpRegistryError::Parse(_)));
    }

    #[tokio::test]
    async fn test_resolve_encodes_category() {
        let router = Router::new().route(
            "/api/token/{category}",
            get(|Path(category): Path<String>| async move {
                Json::<Value>(json!({ "token": { "name": category } }))
            }),
        );
        let base_url = serve(router).await;
        let registry = HttpRegistry::new(&config(format!("{base_url}/api/token"))).unwrap();

        let category = CategoryId::try_from("a?b#c%d").unwrap();
        let document = registry.resolve(&category).await.unwrap();
        assert_eq!(document.token.unwrap().name.as_deref(), Some("a?b#c%d"));
    }

    #[test]
    fn test_invalid_base_url() {
        let registry = HttpRegistry::new(&config("mailto:nft@example.com".to_owned()));
        assert_matches!(registry, Err(HttpRegistryError::BaseUrl(_)));
    }

    #[tokio::test]
    async fn test_resolve_unreachable() {
        // Nothing listens on port 9 (discard) on the loopback interface.
        let registry = HttpRegistry::new(&config("http://127.0.0.1:9".to_owned())).unwrap();

        let category = CategoryId::try_from("c0ffee").unwrap();
        let document = registry.resolve(&category).await;
        assert_matches!(document, Err(HttpRegistryError::Request(_)));
    }
}
