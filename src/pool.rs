use std::str::FromStr;
use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{HashWriterError, Result};
use crate::registry::Entry;

/// A rayon pool dedicated to hashing, shared explicitly between writers.
///
/// Cloning hands out another reference to the same workers. The threads exit
/// once every clone (including those held by writers) has been dropped.
#[derive(Clone)]
pub struct HashingPool {
    pool: Arc<ThreadPool>,
}

impl HashingPool {
    /// Build a pool with `threads` workers; `0` lets rayon pick.
    pub fn new(threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("hash-worker-{}", i))
            .build()
            .map_err(|e| {
                HashWriterError::InvalidConfiguration(format!("build hashing pool: {}", e))
            })?;
        log::info!("hashing pool started with {} threads", pool.current_num_threads());
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Release this handle.
    ///
    /// Callers should only shut the pool down after the writers they built
    /// with it are finished; the workers stay alive while any writer still
    /// holds a clone.
    pub fn shutdown(self) {
        let remaining = Arc::strong_count(&self.pool) - 1;
        if remaining > 0 {
            log::info!(
                "hashing pool handle released, {} reference(s) still in use",
                remaining
            );
        } else {
            log::info!("hashing pool shut down");
        }
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        self.pool.install(op)
    }
}

impl std::fmt::Debug for HashingPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashingPool")
            .field("threads", &self.threads())
            .finish()
    }
}

/// How a write is replicated across accumulators.
#[derive(Debug, Clone, Default)]
pub enum FanOut {
    /// Feed accumulators one after another on the calling thread.
    Sequential,
    /// One task per accumulator, joined before the write returns. Without a
    /// pool, rayon's global pool is used.
    #[default]
    Parallel,
    /// Like `Parallel`, on a caller-supplied pool.
    Pool(HashingPool),
}

impl FanOut {
    /// Replicate `data` to every entry and wait for all of them.
    ///
    /// Every accumulator runs to completion even if another fails; the
    /// reported error is the first failure in registration order.
    pub(crate) fn run(&self, entries: &mut [Entry], data: &[u8]) -> Result<()> {
        // a single accumulator gains nothing from a task hop
        if entries.len() <= 1 {
            return consume_sequential(entries, data);
        }
        match self {
            FanOut::Sequential => consume_sequential(entries, data),
            FanOut::Parallel => consume_parallel(entries, data),
            FanOut::Pool(pool) => pool.install(|| consume_parallel(entries, data)),
        }
    }
}

impl FromStr for FanOut {
    type Err = HashWriterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sequential" => Ok(FanOut::Sequential),
            "parallel" => Ok(FanOut::Parallel),
            other => Err(HashWriterError::InvalidConfiguration(format!(
                "unknown fan-out mode '{}' (expected sequential|parallel)",
                other
            ))),
        }
    }
}

fn consume_one(entry: &mut Entry, data: &[u8]) -> Result<()> {
    entry
        .accumulator
        .consume(data)
        .map_err(|source| HashWriterError::HashConsumeFailed {
            algorithm: entry.name.clone(),
            source,
        })
}

fn consume_sequential(entries: &mut [Entry], data: &[u8]) -> Result<()> {
    let mut first_err = None;
    for entry in entries.iter_mut() {
        if let Err(e) = consume_one(entry, data) {
            first_err.get_or_insert(e);
        }
    }
    first_err.map_or(Ok(()), Err)
}

fn consume_parallel(entries: &mut [Entry], data: &[u8]) -> Result<()> {
    let results: Vec<Result<()>> = entries
        .par_iter_mut()
        .map(|entry| consume_one(entry, data))
        .collect();
    results.into_iter().collect()
}
