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

//! The worker pool used by frame preparation.

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

/// A pool of worker threads running explicitly submitted units of work.
pub struct JobSystem {
    pool: ThreadPool,
}

impl std::fmt::Debug for JobSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobSystem")
            .field("workers", &self.worker_count())
            .finish()
    }
}

impl JobSystem {
    /// Starts a pool of `worker_threads` workers, or one per core when `0`.
    pub fn new(worker_threads: usize) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(worker_threads)
            .thread_name(|i| format!("prism-worker-{i}"))
            .build()?;
        log::debug!("JobSystem: started {} workers", pool.current_num_threads());
        Ok(Self { pool })
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Runs `a` and `b` on the pool, possibly in parallel, and returns once both are done.
    pub fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        self.pool.join(a, b)
    }

    /// Runs `job` on the pool and waits for it.
    pub fn run<R, F>(&self, job: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_join_runs_both_jobs() {
        let jobs = JobSystem::new(2).unwrap();
        assert_eq!(jobs.worker_count(), 2);

        let counter = AtomicUsize::new(0);
        let (a, b) = jobs.join(
            || counter.fetch_add(1, Ordering::SeqCst) + 10,
            || counter.fetch_add(1, Ordering::SeqCst) + 20,
        );
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert!(a >= 10 && b >= 20);
    }

    #[test]
    fn test_join_with_disjoint_mutable_borrows() {
        let jobs = JobSystem::new(0).unwrap();
        let mut left = vec![0u32; 64];
        let mut right = vec![0u32; 64];
        jobs.join(|| left.fill(1), || right.fill(2));
        assert!(left.iter().all(|&v| v == 1));
        assert!(right.iter().all(|&v| v == 2));
        assert_eq!(jobs.run(|| 7), 7);
    }
}
