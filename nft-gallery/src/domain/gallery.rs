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


use crate::domain::{CategoryId, MetadataState, NftEntry};
use nft_common::domain::ByteVec;
use serde::Serialize;

/// What the presentation layer renders: the current entries of the latest resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Gallery {
    /// Tag of the resolution pass the entries belong to; incremented for every feed event.
    pub generation: u64,
    pub status: GalleryStatus,
    pub entries: Vec<NftEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum GalleryStatus {
    /// No wallet connected.
    #[default]
    NoAddress,

    /// Waiting for the first UTXO snapshot.
    LoadingUtxos,

    /// Entries reflect the latest UTXO snapshot.
    Ready,
}

impl Gallery {
    /// True while any entry still awaits its registry document.
    pub fn loading_metadata(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.metadata_state == MetadataState::Pending)
    }

    pub fn entry(&self, category: &CategoryId, commitment: &ByteVec) -> Option<&NftEntry> {
        self.entries
            .iter()
            .find(|entry| entry.key() == (category, commitment))
    }

    /// All entries of the given category.
    pub fn entries_of(&self, category: CategoryId) -> impl Iterator<Item = &NftEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.category == category)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{
        Capability, CategoryId, Gallery, GalleryStatus, MetadataState, NftEntry,
    };
    use nft_common::domain::ByteVec;

    fn entry(category: &str, commitment: u8, metadata_state: MetadataState) -> NftEntry {
        NftEntry {
            category: category.parse().unwrap(),
            commitment: ByteVec::from(vec![commitment]),
            capability: Capability::None,
            aggregated_amount: 0,
            metadata_state,
            metadata: None,
        }
    }

    #[test]
    fn test_entries_of() {
        let gallery = Gallery {
            generation: 1,
            status: GalleryStatus::Ready,
            entries: vec![
                entry("aaaa", 1, MetadataState::Resolved),
                entry("bbbb", 1, MetadataState::Pending),
                entry("aaaa", 2, MetadataState::Fallback),
            ],
        };
        assert!(gallery.loading_metadata());

        // The iterator only borrows the gallery, not the category.
        let first = gallery
            .entries_of("aaaa".parse::<CategoryId>().unwrap())
            .next()
            .unwrap();
        assert_eq!(first.commitment, ByteVec::from(vec![1]));

        let commitments = gallery
            .entries_of("aaaa".parse().unwrap())
            .map(|entry| entry.commitment.hex_prefix(2))
            .collect::<Vec<_>>();
        assert_eq!(commitments, vec!["01", "02"]);

        let category = "bbbb".parse().unwrap();
        let commitment = ByteVec::from(vec![1]);
        assert!(gallery.entry(&category, &commitment).is_some());
        assert_eq!(gallery.entries_of("cccc".parse().unwrap()).count(), 0);
    }
}
