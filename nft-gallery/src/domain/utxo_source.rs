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


use crate::domain::UtxoRecord;
use derive_more::{Display, Into};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;

/// Address of the connected wallet.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Into, Serialize, Deserialize)]
pub struct WalletAddress(pub String);

impl From<&str> for WalletAddress {
    fn from(address: &str) -> Self {
        Self(address.to_owned())
    }
}

/// An event of a UTXO feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtxoFeedEvent {
    /// No wallet connected.
    NoAddress,

    /// The UTXOs of the address are being fetched.
    Loading,

    /// The full current list of UTXOs of the address.
    Snapshot(Vec<UtxoRecord>),
}

/// Push-based source of the UTXOs of a wallet address.
pub trait UtxoSource
where
    Self: Clone + Send + Sync + 'static,
{
    /// Error type for items of the [UtxoSource::watch] stream.
    type Error: StdError + Send + Sync + 'static;

    /// Watch the UTXOs of the given address. Without an address the stream yields
    /// [UtxoFeedEvent::NoAddress]. Items are the full current UTXO list, not deltas.
    fn watch(
        &self,
        address: Option<WalletAddress>,
    ) -> impl Stream<Item = Result<UtxoFeedEvent, Self::Error>> + Send;
}
