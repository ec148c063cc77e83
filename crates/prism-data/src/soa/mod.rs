// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Structure-of-arrays stores and row-level primitives.
//!
//! A *row* is one logical entity spread across every column of a store. Reordering
//! rows always goes through [`SwapRows::swap_rows`], which moves all columns of both
//! rows at once, so row identity is preserved.

mod light;
mod renderable;

pub use light::{LightColumnsMut, LightRow, LightSoa};
pub use renderable::{RenderableColumnsMut, RenderableRow, RenderableSoa};

/// A store whose rows can be exchanged as a whole.
pub trait SwapRows {
    /// Swaps every column of rows `a` and `b`.
    fn swap_rows(&mut self, a: usize, b: usize);
}

/// Reorders rows `[begin, end)` in place so that every row satisfying `pred` comes first.
///
/// Returns the index of the first row that does not satisfy `pred`. Runs in a single
/// pass with at most `end - begin` row swaps. The relative order of rows within each
/// side is not preserved.
pub fn partition_rows<S, P>(store: &mut S, begin: usize, end: usize, mut pred: P) -> usize
where
    S: SwapRows + ?Sized,
    P: FnMut(&S, usize) -> bool,
{
    let mut first = begin;
    while first < end && pred(store, first) {
        first += 1;
    }
    for i in (first + 1)..end {
        if pred(store, i) {
            store.swap_rows(first, i);
            first += 1;
        }
    }
    first
}

/// Reorders rows so that row `begin + k` receives the row previously at `order[k]`.
///
/// `order` must be a permutation of `begin..begin + order.len()`. Rows are moved with
/// row swaps by following the cycles of the permutation.
pub fn permute_rows<S>(store: &mut S, begin: usize, order: &[usize])
where
    S: SwapRows + ?Sized,
{
    let mut placed = vec![false; order.len()];
    for start in 0..order.len() {
        if placed[start] {
            continue;
        }
        placed[start] = true;
        let mut current = start;
        loop {
            let next = order[current] - begin;
            if next == start {
                break;
            }
            store.swap_rows(begin + current, begin + next);
            placed[next] = true;
            current = next;
        }
    }
}
