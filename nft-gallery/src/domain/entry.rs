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


use crate::domain::{Capability, CategoryId, RegistryDocument, UtxoRecord, identicon};
use nft_common::domain::ByteVec;
use serde::Serialize;
use std::collections::HashMap;

/// Number of leading commitment hex characters used for synthesized names.
const PLACEHOLDER_NAME_HEX_LEN: usize = 8;

/// Metadata resolution state of an [NftEntry].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetadataState {
    /// Grouped, registry request not yet completed.
    Pending,

    /// Registry document applied.
    Resolved,

    /// Registry request failed, timed out or returned nothing usable.
    Fallback,
}

/// Display metadata of an [NftEntry].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NftMetadata {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image_uri: Option<String>,
    pub uris: Vec<String>,
}

/// A displayable NFT, uniquely keyed by category and commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NftEntry {
    pub category: CategoryId,

    /// Serialized as `0x` prefixed hex.
    pub commitment: ByteVec,

    pub capability: Capability,
    pub aggregated_amount: u64,
    pub metadata_state: MetadataState,
    pub metadata: Option<NftMetadata>,
}

impl NftEntry {
    fn pending(category: CategoryId, commitment: ByteVec, capability: Capability) -> Self {
        Self {
            category,
            commitment,
            capability,
            aggregated_amount: 0,
            metadata_state: MetadataState::Pending,
            metadata: None,
        }
    }

    pub fn key(&self) -> (&CategoryId, &ByteVec) {
        (&self.category, &self.commitment)
    }

    /// Name used when no registry name is available: `"NFT #"` followed by the first eight hex
    /// characters of the commitment.
    pub fn placeholder_name(&self) -> String {
        format!(
            "NFT #{}",
            self.commitment.hex_prefix(PLACEHOLDER_NAME_HEX_LEN)
        )
    }

    /// Deterministic identicon for cards without an image.
    pub fn placeholder_image(&self) -> String {
        identicon(&self.category)
    }

    /// The name to render, for any state.
    pub fn display_name(&self) -> String {
        self.metadata
            .as_ref()
            .map(|metadata| metadata.name.clone())
            .unwrap_or_else(|| self.placeholder_name())
    }

    /// The image to render, for any state.
    pub fn display_image(&self) -> String {
        self.metadata
            .as_ref()
            .and_then(|metadata| metadata.image_uri.clone())
            .unwrap_or_else(|| self.placeholder_image())
    }

    /// Apply the given registry document of this entry's category.
    pub fn resolve(&mut self, document: &RegistryDocument) {
        let placeholder_name = self.placeholder_name();
        let metadata = document.metadata_for(&self.category, &self.commitment, placeholder_name);

        self.metadata = Some(metadata);
        self.metadata_state = MetadataState::Resolved;
    }

    /// Mark this entry as unresolvable, synthesizing minimal display metadata.
    pub fn fall_back(&mut self) {
        self.metadata = Some(NftMetadata {
            name: self.placeholder_name(),
            ..Default::default()
        });
        self.metadata_state = MetadataState::Fallback;
    }
}

/// Group the given UTXOs into pending NFT entries.
///
/// UTXOs without a token or without NFT data are skipped. UTXOs sharing category and commitment
/// are merged by summing their amounts; the capability of the first one wins. Entries are
/// returned in order of first occurrence.
pub fn group(utxos: &[UtxoRecord]) -> Vec<NftEntry> {
    let mut entries = Vec::<NftEntry>::new();
    let mut index_by_key = HashMap::<(&CategoryId, &ByteVec), usize>::new();

    let nfts = utxos.iter().filter_map(|utxo| {
        let token = utxo.token.as_ref()?;
        let nft = token.nft.as_ref()?;
        Some((&token.category, &nft.commitment, nft.capability, token.amount))
    });

    for (category, commitment, capability, amount) in nfts {
        let index = *index_by_key
            .entry((category, commitment))
            .or_insert_with(|| {
                entries.push(NftEntry::pending(
                    category.to_owned(),
                    commitment.to_owned(),
                    capability,
                ));
                entries.len() - 1
            });

        let entry = &mut entries[index];
        entry.aggregated_amount = entry.aggregated_amount.saturating_add(amount);
    }

    entries
}
