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


use derive_more::{AsRef, From, Into};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display};

/// A newtype for a byte vector, serialized as a `0x` prefixed hex string and implementing `Debug`
/// and `Display` returning a hex-encoded string without prefix, the former no longer than nine
/// characters. Deserialization accepts hex with or without `0x` prefix.
#[derive(Default, Clone, PartialEq, Eq, Hash, AsRef, From, Into, Serialize, Deserialize)]
#[as_ref([u8])]
#[from(Vec<u8>, &[u8])]
pub struct ByteVec(#[serde(with = "const_hex")] pub Vec<u8>);

impl ByteVec {
    /// The first `n` characters of the hex encoding, or all of it if shorter.
    pub fn hex_prefix(&self, n: usize) -> String {
        let mut hex_encoded = const_hex::encode(&self.0);
        hex_encoded.truncate(n);
        hex_encoded
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Debug for ByteVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_encoded = const_hex::encode(&self.0);

        if hex_encoded.len() <= 8 {
            write!(f, "{hex_encoded}")
        } else {
            write!(f, "{}…", &hex_encoded[0..8])
        }
    }
}

impl Display for ByteVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", const_hex::encode(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::ByteVec;

    #[test]
    fn test_byte_vec() {
        let bytes = ByteVec::default();
        assert_eq!(format!("{bytes:?}"), "");
        assert_eq!(format!("{bytes}"), "");
        assert!(bytes.is_empty());

        let bytes = ByteVec::from([0, 1, 2, 3].as_slice());
        assert_eq!(format!("{bytes:?}"), "00010203");
        assert_eq!(format!("{bytes}"), "00010203");

        let bytes = ByteVec::from(vec![0, 1, 2, 3, 4]);
        assert_eq!(format!("{bytes:?}"), "00010203…");
        assert_eq!(format!("{bytes}"), "0001020304");
    }

    #[test]
    fn test_hex_prefix() {
        let bytes = ByteVec::from(vec![0xde, 0xad, 0xbe, 0xef, 0x01, 0x02]);
        assert_eq!(bytes.hex_prefix(8), "deadbeef");
        assert_eq!(bytes.hex_prefix(100), "deadbeef0102");
        assert_eq!(ByteVec::default().hex_prefix(8), "");
    }

    #[test]
    fn test_serde() {
        let bytes = serde_json::from_str::<ByteVec>(r#""cafe01""#).expect("hex can be decoded");
        assert_eq!(bytes, ByteVec::from(vec![0xca, 0xfe, 0x01]));
        assert_eq!(
            serde_json::to_string(&bytes).expect("ByteVec can be encoded"),
            r#""0xcafe01""#
        );

        let prefixed =
            serde_json::from_str::<ByteVec>(r#""0xcafe01""#).expect("prefixed hex can be decoded");
        assert_eq!(prefixed, bytes);
        assert!(serde_json::from_str::<ByteVec>(r#""zz""#).is_err());
    }
}
