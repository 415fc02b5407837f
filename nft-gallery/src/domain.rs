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

mod entry;
mod gallery;
mod placeholder;

pub use entry::*;
pub use gallery::*;
pub use placeholder::*;
pub use registry::{MetadataRegistry, RegistryDocument};
pub use utxo_source::{UtxoFeedEvent, UtxoSource, WalletAddress};

use derive_more::{Display, Into};
use nft_common::domain::ByteVec;
use serde::{Deserialize, Deserializer, Serialize};
use std::{ops::Deref, str::FromStr};
use thiserror::Error;

/// Identifier of a token class, normalized to lowercase.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Into, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryId(String);

impl Deref for CategoryId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<String> for CategoryId {
    type Error = InvalidCategoryIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let s = s.trim();

        if s.is_empty() {
            Err(InvalidCategoryIdError::Empty)
        } else if s.contains(char::is_whitespace) || s.contains('/') {
            Err(InvalidCategoryIdError::InvalidCharacter(s.to_owned()))
        } else {
            Ok(Self(s.to_ascii_lowercase()))
        }
    }
}

impl TryFrom<&str> for CategoryId {
    type Error = InvalidCategoryIdError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.to_owned().try_into()
    }
}

impl FromStr for CategoryId {
    type Err = InvalidCategoryIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.try_into()
    }
}

#[derive(Debug, Error)]
pub enum InvalidCategoryIdError {
    #[error("category ID must not be empty")]
    Empty,

    #[error("category ID {0} contains invalid characters")]
    InvalidCharacter(String),
}

/// Mutability tier of a non-fungible token.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    #[display("none")]
    None,

    #[display("mutable")]
    Mutable,

    #[display("minting")]
    Minting,
}

/// An unspent transaction output of the watched address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoRecord {
    #[serde(rename = "txid")]
    pub transaction_id: String,

    #[serde(rename = "vout")]
    pub output_index: u32,

    #[serde(default)]
    pub token: Option<TokenPayload>,
}

/// Token data carried by a UTXO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub category: CategoryId,

    /// Fungible amount; zero for NFT-only outputs. Accepts JSON numbers and decimal strings.
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub amount: u64,

    #[serde(default)]
    pub nft: Option<NftData>,
}

/// Non-fungible part of a token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftData {
    pub capability: Capability,

    #[serde(default)]
    pub commitment: ByteVec,
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(u64),
        Text(String),
    }

    match Amount::deserialize(deserializer)? {
        Amount::Number(amount) => Ok(amount),
        Amount::Text(amount) => amount.trim().parse().map_err(serde::de::Error::custom),
    }
}
