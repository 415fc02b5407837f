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


use crate::domain::{CategoryId, MetadataRegistry, RegistryDocument};
use dashmap::DashMap;
use log::debug;
use std::{sync::Arc, time::Duration};
use tokio::time::Instant;

/// Metadata registry caching the successfully resolved documents of the wrapped registry for the
/// given time-to-live. Failures are not cached.
#[derive(Debug, Clone)]
pub struct CachedRegistry<R> {
    registry: R,
    ttl: Duration,
    documents: Arc<DashMap<CategoryId, Cached>>,
}

#[derive(Debug, Clone)]
struct Cached {
    document: RegistryDocument,
    fetched_at: Instant,
}

impl<R> CachedRegistry<R> {
    pub fn new(registry: R, ttl: Duration) -> Self {
        Self {
            registry,
            ttl,
            documents: Default::default(),
        }
    }
}

impl<R> MetadataRegistry for CachedRegistry<R>
where
    R: MetadataRegistry,
{
    type Error = R::Error;

    async fn resolve(&self, category: &CategoryId) -> Result<RegistryDocument, Self::Error> {
        // The map guard must be dropped before awaiting.
        let cached = self
            .documents
            .get(category)
            .filter(|cached| cached.fetched_at.elapsed() < self.ttl)
            .map(|cached| cached.document.clone());

        if let Some(document) = cached {
            debug!(category:%; "registry document cache hit");
            return Ok(document);
        }

        let document = self.registry.resolve(category).await?;
        self.documents.insert(
            category.clone(),
            Cached {
                document: document.clone(),
                fetched_at: Instant::now(),
            },
        );

        Ok(document)
    }
}
