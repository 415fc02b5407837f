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


mod metrics;

use crate::{
    application::metrics::Metrics,
    domain::{
        CategoryId, Gallery, GalleryStatus, MetadataRegistry, MetadataState, NftEntry,
        RegistryDocument, UtxoFeedEvent, UtxoRecord, UtxoSource, WalletAddress, group,
    },
};
use fastrace::trace;
use futures::{StreamExt, stream};
use itertools::Itertools;
use log::{debug, error, info, warn};
use nft_common::error::StdErrorExt;
use serde::Deserialize;
use std::{num::NonZeroUsize, pin::pin, sync::Arc, time::Duration};
use tokio::{
    select,
    signal::unix::Signal,
    sync::watch,
    task::{self, JoinHandle},
    time::timeout,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub address: Option<WalletAddress>,

    #[serde(with = "humantime_serde", default = "registry_timeout_default")]
    pub registry_timeout: Duration,

    #[serde(default = "max_concurrent_requests_default")]
    pub max_concurrent_requests: NonZeroUsize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: None,
            registry_timeout: registry_timeout_default(),
            max_concurrent_requests: max_concurrent_requests_default(),
        }
    }
}

/// Groups UTXO snapshots into NFT entries and resolves their metadata, publishing every change of
/// the resulting [Gallery].
#[derive(Clone)]
pub struct Pipeline<R> {
    registry: R,
    registry_timeout: Duration,
    max_concurrent_requests: NonZeroUsize,
    gallery: Arc<watch::Sender<Gallery>>,
    metrics: Metrics,
}

impl<R> Pipeline<R>
where
    R: MetadataRegistry,
{
    pub fn new(config: &Config, registry: R) -> Self {
        let (gallery, _) = watch::channel(Gallery::default());

        Self {
            registry,
            registry_timeout: config.registry_timeout,
            max_concurrent_requests: config.max_concurrent_requests,
            gallery: Arc::new(gallery),
            metrics: Metrics::new(),
        }
    }

    /// Subscribe to gallery changes; the receiver initially sees the current gallery.
    pub fn subscribe(&self) -> watch::Receiver<Gallery> {
        self.gallery.subscribe()
    }

    /// A copy of the current gallery.
    pub fn gallery(&self) -> Gallery {
        self.gallery.borrow().clone()
    }

    /// Handle the given UTXO feed event, starting a new resolution pass.
    pub fn handle(&self, event: UtxoFeedEvent) -> Pass {
        match event {
            UtxoFeedEvent::NoAddress => self.reset(GalleryStatus::NoAddress),
            UtxoFeedEvent::Loading => self.reset(GalleryStatus::LoadingUtxos),
            UtxoFeedEvent::Snapshot(utxos) => self.apply_snapshot(&utxos),
        }
    }

    /// Group the given UTXO snapshot, publish the pending entries and spawn the registry requests
    /// for their categories, at most one per category.
    pub fn apply_snapshot(&self, utxos: &[UtxoRecord]) -> Pass {
        let entries = group(utxos);
        let entry_count = entries.len();
        let categories = entries
            .iter()
            .map(|entry| entry.category.clone())
            .unique()
            .collect::<Vec<_>>();
        let category_count = categories.len();

        self.metrics.snapshot_grouped(entry_count);
        let generation = self.replace(GalleryStatus::Ready, entries);
        debug!(generation, entry_count, category_count; "snapshot grouped");

        let task = (!categories.is_empty())
            .then(|| task::spawn(self.clone().resolve(generation, categories)));

        Pass { generation, task }
    }

    fn reset(&self, status: GalleryStatus) -> Pass {
        let generation = self.replace(status, vec![]);
        debug!(generation, status:?; "gallery reset");

        Pass {
            generation,
            task: None,
        }
    }

    fn replace(&self, status: GalleryStatus, entries: Vec<NftEntry>) -> u64 {
        let mut generation = 0;

        self.gallery.send_modify(|gallery| {
            gallery.generation += 1;
            gallery.status = status;
            gallery.entries = entries;
            generation = gallery.generation;
        });

        generation
    }

    #[trace(properties = { "generation": "{generation}" })]
    async fn resolve(self, generation: u64, categories: Vec<CategoryId>) {
        stream::iter(categories)
            .for_each_concurrent(Some(self.max_concurrent_requests.get()), |category| {
                let pipeline = self.clone();

                async move {
                    let document = pipeline.fetch(&category).await;
                    pipeline.apply(generation, &category, document.as_ref());
                }
            })
            .await;
    }

    /// Fetch the registry document for the given category; `None` for any kind of failure.
    async fn fetch(&self, category: &CategoryId) -> Option<RegistryDocument> {
        match timeout(self.registry_timeout, self.registry.resolve(category)).await {
            Ok(Ok(document)) if document.is_usable(category) => Some(document),

            Ok(Ok(_)) => {
                warn!(category:%; "registry document without usable data");
                None
            }

            Ok(Err(error)) => {
                warn!(
                    category:%,
                    error:% = error.as_chain();
                    "cannot resolve registry document"
                );
                None
            }

            Err(_) => {
                warn!(
                    category:%,
                    registry_timeout:? = self.registry_timeout;
                    "registry request timed out"
                );
                None
            }
        }
    }

    /// Apply the outcome for the given category to the pending entries of that category, unless
    /// the gallery has moved on to a newer generation.
    fn apply(&self, generation: u64, category: &CategoryId, document: Option<&RegistryDocument>) {
        let mut stale = false;
        let mut transitioned = 0;

        self.gallery.send_if_modified(|gallery| {
            if gallery.generation != generation {
                stale = true;
                return false;
            }

            let pending = gallery.entries.iter_mut().filter(|entry| {
                &entry.category == category && entry.metadata_state == MetadataState::Pending
            });
            for entry in pending {
                match document {
                    Some(document) => entry.resolve(document),
                    None => entry.fall_back(),
                }
                transitioned += 1;
            }

            transitioned > 0
        });

        if stale {
            self.metrics.stale_result();
            debug!(generation, category:%; "stale registry result discarded");
        } else if document.is_some() {
            self.metrics.entries_resolved(transitioned);
            debug!(generation, category:%, transitioned; "entries resolved");
        } else {
            self.metrics.entries_fell_back(transitioned);
            debug!(generation, category:%, transitioned; "entries fell back");
        }
    }
}

/// A resolution pass started for a feed event.
#[derive(Debug)]
pub struct Pass {
    pub generation: u64,
    task: Option<JoinHandle<()>>,
}

impl Pass {
    /// Wait until all registry requests of this pass have completed and been applied or
    /// discarded.
    pub async fn finished(self) {
        let Some(task) = self.task else {
            return;
        };

        if let Err(error) = task.await {
            error!(generation = self.generation, error:% = error.as_chain(); "resolution pass failed");
        }
    }
}

/// Feed the events of the given UTXO source for the configured address into the given pipeline
/// until the feed completes or SIGTERM is received.
pub async fn run<R>(
    config: Config,
    pipeline: Pipeline<R>,
    utxo_source: impl UtxoSource,
    mut sigterm: Signal,
) -> anyhow::Result<()>
where
    R: MetadataRegistry,
{
    let Config { address, .. } = config;
    info!(address:?; "starting NFT gallery");

    let feed = async {
        let mut events = pin!(utxo_source.watch(address));

        while let Some(event) = events.next().await {
            match event {
                Ok(event) => {
                    let pass = pipeline.handle(event);
                    debug!(generation = pass.generation; "resolution pass started");
                }

                Err(error) => {
                    warn!(error:% = error.as_chain(); "cannot get next UTXO feed event")
                }
            }
        }

        warn!("UTXO feed completed");
    };

    select! {
        _ = feed => Ok(()),

        _ = sigterm.recv() => {
            warn!("SIGTERM received");
            Ok(())
        }
    }
}

fn registry_timeout_default() -> Duration {
    Duration::from_secs(10)
}

fn max_concurrent_requests_default() -> NonZeroUsize {
    NonZeroUsize::MIN.saturating_add(7)
}
