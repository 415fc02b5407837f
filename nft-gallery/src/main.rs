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


use log::{error, info};
use nft_common::telemetry;
use nft_gallery::domain::{Gallery, MetadataState};
use std::{panic, process};

#[tokio::main]
async fn main() {
    // Initialize logging.
    telemetry::init_logging();

    // Replace the default panic hook with one that uses structured logging at ERROR level.
    panic::set_hook(Box::new(|panic| error!(panic:%; "process panicked")));

    // Run, log any error and exit with a non-zero status.
    let result = run().await;
    telemetry::shutdown_tracing();

    if let Err(error) = result {
        let backtrace = error.backtrace();
        let error = format!("{error:#}");
        error!(error, backtrace:%; "process exited with ERROR");
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    use anyhow::Context;
    use nft_common::config::ConfigExt;
    use nft_gallery::{
        application::{self, Pipeline},
        config::Config,
        infra::{
            self,
            registry::{cached::CachedRegistry, http::HttpRegistry},
            utxo_source::http::HttpUtxoSource,
        },
    };
    use tokio::{
        signal::unix::{SignalKind, signal},
        task,
    };

    // Load configuration.
    let Config {
        application_config,
        infra_config,
        telemetry_config:
            telemetry::Config {
                tracing_config,
                metrics_config,
            },
    } = Config::load().context("load configuration")?;

    // Initialize tracing and metrics.
    telemetry::init_tracing(tracing_config);
    telemetry::init_metrics(metrics_config);

    info!(application_config:?, infra_config:?; "starting");

    let infra::Config {
        registry_config,
        utxo_source_config,
    } = infra_config;

    let registry = HttpRegistry::new(&registry_config).context("create HttpRegistry")?;
    let registry = CachedRegistry::new(registry, registry_config.cache_ttl);
    let utxo_source =
        HttpUtxoSource::new(&utxo_source_config).context("create HttpUtxoSource")?;

    let sigterm = signal(SignalKind::terminate()).context("register SIGTERM handler")?;

    let pipeline = Pipeline::new(&application_config, registry);

    // Log every published gallery.
    task::spawn({
        let mut gallery = pipeline.subscribe();

        async move {
            while gallery.changed().await.is_ok() {
                let gallery = gallery.borrow_and_update().clone();
                render(&gallery);
            }
        }
    });

    application::run(application_config, pipeline, utxo_source, sigterm)
        .await
        .context("run application")?;

    Ok(())
}

fn render(gallery: &Gallery) {
    let generation = gallery.generation;
    let status = gallery.status;
    let loading_metadata = gallery.loading_metadata();
    let entry_count = gallery.entries.len();
    info!(generation, status:?, loading_metadata, entry_count; "gallery changed");

    let settled = gallery
        .entries
        .iter()
        .filter(|entry| entry.metadata_state != MetadataState::Pending);
    for entry in settled {
        info!(
            generation,
            category:% = entry.category,
            commitment:% = entry.commitment,
            amount = entry.aggregated_amount,
            state:? = entry.metadata_state,
            name:% = entry.display_name();
            "NFT"
        );
    }
}
