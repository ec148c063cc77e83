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

//! Half-open index ranges into a columnar store.

/// A half-open interval `[begin, end)` of row indices.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    /// First row of the range.
    pub begin: usize,
    /// One past the last row of the range.
    pub end: usize,
}

impl Range {
    /// Creates a range. `begin` must not exceed `end`.
    #[inline]
    pub fn new(begin: usize, end: usize) -> Self {
        debug_assert!(begin <= end, "Range: begin {begin} > end {end}");
        Self { begin, end }
    }

    /// Number of rows in the range.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    /// Returns `true` if the range holds no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Returns `true` if `index` lies inside the range.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        (self.begin..self.end).contains(&index)
    }

    /// Converts into a standard library range, for slicing.
    #[inline]
    pub fn as_std(&self) -> std::ops::Range<usize> {
        self.begin..self.end
    }
}

impl IntoIterator for Range {
    type Item = usize;
    type IntoIter = std::ops::Range<usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_std()
    }
}

/// Rounds `n` up to the next multiple of `multiple`, which must be a power of two.
#[inline]
pub const fn round_up(n: usize, multiple: usize) -> usize {
    debug_assert!(multiple.is_power_of_two());
    (n + multiple - 1) & !(multiple - 1)
}
