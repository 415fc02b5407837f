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


use crate::domain::{UtxoFeedEvent, UtxoSource, WalletAddress};
use futures::{Stream, StreamExt, future::ready, stream};
use std::{convert::Infallible, sync::Arc};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// In-memory UTXO source emitting the published events to every watcher of an address. Only the
/// latest event is retained; watchers may miss intermediate ones.
#[derive(Debug, Clone)]
pub struct InMemUtxoSource {
    events: Arc<watch::Sender<Option<UtxoFeedEvent>>>,
}

impl InMemUtxoSource {
    /// Publish the given event to all current and future watchers.
    pub fn publish(&self, event: UtxoFeedEvent) {
        self.events.send_replace(Some(event));
    }
}

impl Default for InMemUtxoSource {
    fn default() -> Self {
        let (events, _) = watch::channel(None);

        Self {
            events: Arc::new(events),
        }
    }
}

impl UtxoSource for InMemUtxoSource {
    type Error = Infallible;

    fn watch(
        &self,
        address: Option<WalletAddress>,
    ) -> impl Stream<Item = Result<UtxoFeedEvent, Self::Error>> + Send {
        let events = match address {
            None => stream::once(ready(UtxoFeedEvent::NoAddress)).boxed(),
            Some(_) => WatchStream::new(self.events.subscribe())
                .filter_map(ready)
                .boxed(),
        };

        events.map(Ok)
    }
}
