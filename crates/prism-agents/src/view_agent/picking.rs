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

//! Picking queries: a FIFO of pixel requests resolved by asynchronous readbacks.

use std::collections::{HashMap, VecDeque};

use crossbeam_channel::{Receiver, Sender};
use prism_core::math::{Vec2, Vec3};
use prism_core::renderer::{PickingQueryResult, PixelReadback, PixelReadout};

/// Invoked exactly once with the result of a picking query.
pub type PickingCallback = Box<dyn FnOnce(&PickingQueryResult) + Send>;

struct PickingQuery {
    x: u32,
    y: u32,
    callback: PickingCallback,
}

impl PickingQuery {
    fn resolve(self, readout: PixelReadout) {
        let result = PickingQueryResult {
            renderable: readout.renderable,
            depth: readout.depth,
            frag_coords: Vec3::new(self.x as f32, self.y as f32, 1.0 - readout.depth),
        };
        (self.callback)(&result);
    }
}

/// Outstanding picking queries of a view.
pub struct PickingQueue {
    pending: VecDeque<PickingQuery>,
    in_flight: HashMap<u64, PickingQuery>,
    next_id: u64,
    sender: Sender<(u64, PixelReadout)>,
    receiver: Receiver<(u64, PixelReadout)>,
}

impl Default for PickingQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PickingQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            pending: VecDeque::new(),
            in_flight: HashMap::new(),
            next_id: 0,
            sender,
            receiver,
        }
    }

    /// Queues a query for viewport pixel `(x, y)`.
    pub fn push(&mut self, x: u32, y: u32, callback: PickingCallback) {
        self.pending.push_back(PickingQuery { x, y, callback });
    }

    /// Queries waiting for a readback to be issued.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Queries whose readback has not completed yet.
    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    /// Issues one readback per pending query, in submission order. Pixel coordinates
    /// are multiplied by `scale` to address the render target.
    pub fn execute(&mut self, readback: &mut dyn PixelReadback, scale: Vec2) {
        while let Some(query) = self.pending.pop_front() {
            let id = self.next_id;
            self.next_id += 1;

            let x = (query.x as f32 * scale.x) as u32;
            let y = (query.y as f32 * scale.y) as u32;
            let sender = self.sender.clone();
            self.in_flight.insert(id, query);
            readback.read_pixels(
                x,
                y,
                Box::new(move |readout| {
                    // The queue may already be gone; the query is then dropped unanswered.
                    let _ = sender.send((id, readout));
                }),
            );
        }
    }

    /// Invokes the callbacks of every completed readback. Returns how many resolved.
    pub fn poll(&mut self) -> usize {
        let mut resolved = 0;
        while let Ok((id, readout)) = self.receiver.try_recv() {
            match self.in_flight.remove(&id) {
                Some(query) => {
                    query.resolve(readout);
                    resolved += 1;
                }
                None => log::debug!("PickingQueue: readback {id} has no outstanding query"),
            }
        }
        resolved
    }

    /// Answers every outstanding query with an empty result, in submission order.
    pub fn flush(&mut self) {
        let count = self.pending.len() + self.in_flight.len();
        if count > 0 {
            log::debug!("PickingQueue: flushing {count} outstanding queries");
        }
        // In-flight queries were submitted before anything still pending.
        let mut in_flight: Vec<_> = self.in_flight.drain().collect();
        in_flight.sort_unstable_by_key(|(id, _)| *id);
        for (_, query) in in_flight {
            query.resolve(PixelReadout::default());
        }
        for query in self.pending.drain(..) {
            query.resolve(PixelReadout::default());
        }
        while self.receiver.try_recv().is_ok() {}
    }
}
