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


use itertools::Itertools;
use sha2::{Digest, Sha256};
use std::fmt::Write;

const GRID_SIZE: usize = 5;

/// Deterministic identicon for the given seed as an SVG data URI: a horizontally mirrored 5x5
/// grid, with colors and cells derived from the SHA-256 digest of the seed.
pub fn identicon(seed: &str) -> String {
    let digest = Sha256::digest(seed.as_bytes());

    let hue = u16::from_be_bytes([digest[0], digest[1]]) % 360;
    let background_hue = (hue + 180) % 360;

    let mut cells = String::new();
    for row in 0..GRID_SIZE {
        for column in 0..GRID_SIZE.div_ceil(2) {
            if digest[2 + row * 3 + column] & 1 == 0 {
                continue;
            }

            let mirrored = GRID_SIZE - 1 - column;
            for x in [column, mirrored].into_iter().dedup() {
                let _ = write!(cells, "<rect x='{x}' y='{row}' width='1' height='1'/>");
            }
        }
    }

    let svg = format!(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 {GRID_SIZE} {GRID_SIZE}' \
         shape-rendering='crispEdges'>\
         <rect width='{GRID_SIZE}' height='{GRID_SIZE}' fill='hsl({background_hue},30%,90%)'/>\
         <g fill='hsl({hue},70%,60%)'>{cells}</g></svg>"
    );

    format!("data:image/svg+xml;charset=utf-8,{}", escape(&svg))
}

fn escape(svg: &str) -> String {
    svg.chars().fold(String::with_capacity(svg.len()), |mut escaped, c| {
        match c {
            '%' => escaped.push_str("%25"),
            '#' => escaped.push_str("%23"),
            '<' => escaped.push_str("%3C"),
            '>' => escaped.push_str("%3E"),
            c => escaped.push(c),
        }
        escaped
    })
}
