/*
 * Per-request allocation ledger.
 *
 * Every buffer the core acquires while servicing one dialog request (the
 * encoded filter list, the selection buffer, the decoded path list) takes an
 * `ArenaLease` from the request's `RequestArena`. A lease gives its bytes back
 * when it is dropped, so whichever error branch ends an invocation, leaving the
 * scope releases everything acquired inside it. An optional byte limit lets a
 * caller (and the tests) bound a request and observe `ResourceExhausted`.
 *
 * The arena is cheap to clone; clones share the same counters so a test can
 * keep a handle and check the balance after the worker is done.
 */
use crate::core::error::{DialogError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
struct ArenaCounters {
    limit: Option<usize>,
    live: AtomicUsize,
    peak: AtomicUsize,
}

#[derive(Debug, Clone)]
pub struct RequestArena {
    counters: Arc<ArenaCounters>,
}

impl RequestArena {
    pub fn new(limit: Option<usize>) -> Self {
        RequestArena {
            counters: Arc::new(ArenaCounters {
                limit,
                live: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self::new(Some(limit))
    }

    pub fn limit(&self) -> Option<usize> {
        self.counters.limit
    }

    /*
     * Accounts `bytes` against the arena and returns the lease that owns them.
     * Fails with `ResourceExhausted` when the request would exceed its limit;
     * nothing is accounted in that case.
     */
    pub fn acquire(&self, bytes: usize, purpose: &str) -> Result<ArenaLease> {
        self.charge(bytes, purpose)?;
        Ok(ArenaLease {
            counters: Arc::clone(&self.counters),
            bytes,
        })
    }

    /// Bytes currently held by live leases.
    pub fn live_bytes(&self) -> usize {
        self.counters.live.load(Ordering::Acquire)
    }

    /// Highest simultaneous balance seen over the arena's lifetime.
    pub fn peak_bytes(&self) -> usize {
        self.counters.peak.load(Ordering::Acquire)
    }

    fn charge(&self, bytes: usize, purpose: &str) -> Result<()> {
        charge_counters(&self.counters, bytes, purpose)
    }
}

impl Default for RequestArena {
    fn default() -> Self {
        Self::unbounded()
    }
}

fn charge_counters(counters: &ArenaCounters, bytes: usize, purpose: &str) -> Result<()> {
    let limit = counters.limit;
    let update = counters
        .live
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
            let next = live.checked_add(bytes)?;
            match limit {
                Some(max) if next > max => None,
                _ => Some(next),
            }
        });

    match update {
        Ok(previous) => {
            counters
                .peak
                .fetch_max(previous + bytes, Ordering::AcqRel);
            Ok(())
        }
        Err(live) => {
            log::error!(
                "RequestArena: Cannot allocate {bytes} bytes for {purpose} ({live} live, limit {:?}).",
                limit
            );
            Err(DialogError::ResourceExhausted(format!(
                "Out of memory allocating {bytes} bytes for {purpose}"
            )))
        }
    }
}

/*
 * Ownership token for bytes accounted on a `RequestArena`. The bytes are
 * returned to the arena exactly once, when the lease is dropped.
 */
#[derive(Debug)]
pub struct ArenaLease {
    counters: Arc<ArenaCounters>,
    bytes: usize,
}

impl ArenaLease {
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    /// Extends the lease by `extra` bytes; on failure the lease is unchanged.
    pub fn grow(&mut self, extra: usize, purpose: &str) -> Result<()> {
        charge_counters(&self.counters, extra, purpose)?;
        self.bytes += extra;
        Ok(())
    }
}

impl Drop for ArenaLease {
    fn drop(&mut self) {
        self.counters.live.fetch_sub(self.bytes, Ordering::AcqRel);
    }
}
