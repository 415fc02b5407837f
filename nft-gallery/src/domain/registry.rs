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


use crate::domain::{CategoryId, NftMetadata};
use nft_common::domain::ByteVec;
use serde::Deserialize;
use std::{
    collections::{BTreeMap, HashMap},
    error::Error as StdError,
};

/// Client for an off-chain metadata registry (BCMR).
#[trait_variant::make(Send)]
pub trait MetadataRegistry
where
    Self: Clone + Send + Sync + 'static,
{
    /// Error type for the [MetadataRegistry::resolve] method.
    type Error: StdError + Send + Sync + 'static;

    /// Resolve the registry document for the given category.
    async fn resolve(&self, category: &CategoryId) -> Result<RegistryDocument, Self::Error>;
}

/// Registry document for a token category.
///
/// Supports the flat form served by registry APIs (`token`, per-commitment `nfts`, base64
/// `icon`) as well as `identities` of full BCMR files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RegistryDocument {
    #[serde(default)]
    pub token: Option<TokenInfo>,

    /// Per-commitment overrides keyed by hex-encoded commitment.
    #[serde(default)]
    pub nfts: HashMap<String, TokenInfo>,

    /// Identity snapshots keyed by category (or authbase) and then by ISO timestamp.
    #[serde(default)]
    pub identities: HashMap<String, BTreeMap<String, Identity>>,

    /// Base64 encoded PNG.
    #[serde(default)]
    pub icon: Option<String>,
}

/// Display attributes at category or commitment level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenInfo {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub uri: Option<Vec<String>>,
}

/// A BCMR identity snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Identity {
    pub name: Option<String>,
    pub description: Option<String>,

    #[serde(default)]
    pub token: Option<IdentityToken>,

    #[serde(default)]
    pub uris: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IdentityToken {
    pub symbol: Option<String>,
}

impl RegistryDocument {
    /// Whether this document carries anything to display for the given category.
    pub fn is_usable(&self, category: &CategoryId) -> bool {
        self.token.is_some()
            || !self.nfts.is_empty()
            || self.identity(category).is_some()
            || self.icon.as_deref().is_some_and(|icon| !icon.is_empty())
    }

    /// Display metadata for the NFT with the given commitment. A per-commitment override takes
    /// precedence over the category-level token, which takes precedence over the latest identity
    /// snapshot. Without any name, the given placeholder name is used.
    pub fn metadata_for(
        &self,
        category: &CategoryId,
        commitment: &ByteVec,
        placeholder_name: String,
    ) -> NftMetadata {
        let nft = self.nft_override(commitment);
        let token = self.token.as_ref();
        let identity = self.identity(category);

        let name = first_present([
            nft.and_then(|nft| nft.name.as_deref()),
            token.and_then(|token| token.name.as_deref()),
            identity.and_then(|identity| identity.name.as_deref()),
        ])
        .map(ToOwned::to_owned)
        .unwrap_or(placeholder_name);

        let symbol = first_present([
            nft.and_then(|nft| nft.symbol.as_deref()),
            token.and_then(|token| token.symbol.as_deref()),
            identity
                .and_then(|identity| identity.token.as_ref())
                .and_then(|token| token.symbol.as_deref()),
        ])
        .unwrap_or_default()
        .to_owned();

        let description = first_present([
            nft.and_then(|nft| nft.description.as_deref()),
            token.and_then(|token| token.description.as_deref()),
            identity.and_then(|identity| identity.description.as_deref()),
        ])
        .unwrap_or_default()
        .to_owned();

        let image_uri = first_present([
            nft.and_then(|nft| nft.image.as_deref()),
            token.and_then(|token| token.image.as_deref()),
            identity.and_then(|identity| identity.uris.get("icon").map(String::as_str)),
            identity.and_then(|identity| identity.uris.get("image").map(String::as_str)),
        ])
        .map(ToOwned::to_owned)
        .or_else(|| {
            self.icon
                .as_deref()
                .filter(|icon| !icon.is_empty())
                .map(|icon| format!("data:image/png;base64,{icon}"))
        });

        let uris = [
            nft.and_then(|nft| nft.uri.clone()),
            token.and_then(|token| token.uri.clone()),
            identity.map(|identity| identity.uris.values().cloned().collect()),
        ]
        .into_iter()
        .flatten()
        .find(|uris| !uris.is_empty())
        .unwrap_or_default();

        NftMetadata {
            name,
            symbol,
            description,
            image_uri,
            uris,
        }
    }

    /// The override for the given commitment. Keys match case-insensitively, with or without `0x`
    /// prefix; among equivalent keys the lowest one wins.
    fn nft_override(&self, commitment: &ByteVec) -> Option<&TokenInfo> {
        let commitment = commitment.to_string();

        self.nfts
            .iter()
            .filter(|(key, _)| key.trim_start_matches("0x").eq_ignore_ascii_case(&commitment))
            .min_by_key(|(key, _)| key.as_str())
            .map(|(_, nft)| nft)
    }

    /// The latest identity snapshot for the given category. A registry with a single identity is
    /// assumed to describe the category, even if keyed by its authbase.
    fn identity(&self, category: &CategoryId) -> Option<&Identity> {
        let snapshots = self
            .identities
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(category))
            .map(|(_, snapshots)| snapshots)
            .or_else(|| {
                (self.identities.len() == 1)
                    .then(|| self.identities.values().next())
                    .flatten()
            })?;

        snapshots.last_key_value().map(|(_, identity)| identity)
    }
}

fn first_present<'a, const N: usize>(candidates: [Option<&'a str>; N]) -> Option<&'a str> {
    candidates
        .into_iter()
        .flatten()
        .find(|candidate| !candidate.trim().is_empty())
}
