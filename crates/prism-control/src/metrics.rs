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

//! Rolling history of dynamic-resolution controller samples.

/// Number of controller samples kept in a [`FrameHistory`].
pub const FRAME_HISTORY_SIZE: usize = 32;

/// A fixed-size circular buffer.
#[derive(Debug, Clone)]
pub struct RingBuffer<T, const N: usize> {
    data: [T; N],
    index: usize,
    count: usize,
}

impl<T: Default + Copy, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default + Copy, const N: usize> RingBuffer<T, N> {
    /// Creates a new, empty ring buffer.
    pub fn new() -> Self {
        Self {
            data: [T::default(); N],
            index: 0,
            count: 0,
        }
    }

    /// Pushes a new value into the buffer, overwriting the oldest if full.
    pub fn push(&mut self, value: T) {
        self.data[self.index] = value;
        self.index = (self.index + 1) % N;
        if self.count < N {
            self.count += 1;
        }
    }

    /// Returns the number of elements currently in the buffer.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns the most recent value, if any.
    pub fn latest(&self) -> Option<&T> {
        if self.count == 0 {
            None
        } else {
            Some(&self.data[(self.index + N - 1) % N])
        }
    }

    /// Returns an iterator over the values from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let start = (self.index + N - self.count) % N;
        (0..self.count).map(move |i| &self.data[(start + i) % N])
    }
}

/// One controller sample. All times are in milliseconds.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameHistoryEntry {
    /// Target frame time.
    pub target: f32,
    /// Target frame time minus the head room.
    pub target_with_headroom: f32,
    /// Measured frame time.
    pub frame_time: f32,
    /// Denoised frame time, the controller input.
    pub frame_time_denoised: f32,
    /// Area scale, `scale.x * scale.y`.
    pub scale: f32,
    /// PID error term.
    pub pid_e: f32,
    /// PID integral term.
    pub pid_i: f32,
    /// PID derivative term.
    pub pid_d: f32,
}

/// The last [`FRAME_HISTORY_SIZE`] controller samples.
pub type FrameHistory = RingBuffer<FrameHistoryEntry, FRAME_HISTORY_SIZE>;
