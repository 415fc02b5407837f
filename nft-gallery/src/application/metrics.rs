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


use metrics::{Counter, Gauge, counter, gauge};

#[derive(Clone)]
pub struct Metrics {
    snapshot_count: Counter,
    entry_count: Gauge,
    resolved_count: Counter,
    fallback_count: Counter,
    stale_result_count: Counter,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            snapshot_count: counter!("nft_gallery_snapshot_count"),
            entry_count: gauge!("nft_gallery_entry_count"),
            resolved_count: counter!("nft_gallery_registry_resolved_count"),
            fallback_count: counter!("nft_gallery_registry_fallback_count"),
            stale_result_count: counter!("nft_gallery_stale_result_count"),
        }
    }

    pub fn snapshot_grouped(&self, entry_count: usize) {
        self.snapshot_count.increment(1);
        self.entry_count.set(entry_count as f64);
    }

    pub fn entries_resolved(&self, entry_count: usize) {
        self.resolved_count.increment(entry_count as u64);
    }

    pub fn entries_fell_back(&self, entry_count: usize) {
        self.fallback_count.increment(entry_count as u64);
    }

    pub fn stale_result(&self) {
        self.stale_result_count.increment(1);
    }
}
