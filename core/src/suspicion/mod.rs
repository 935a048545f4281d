//! Suspicion timer — adaptive timeout for declaring a suspected node dead
//!
//! A suspicion starts at its maximum timeout and is driven toward its minimum
//! as independent peers confirm it. The timeout falls off logarithmically
//! with the number of confirmations `n` out of a target `k`:
//!
//! ```text
//! timeout(n) = max - ln(n + 1) / ln(k + 1) * (max - min)    (floored to ms, >= min)
//! ```
//!
//! The first witness buys the most acceleration, each later one a little
//! less. The expiry callback runs exactly once, either from the timer task
//! or, when a confirmation finds the deadline already passed, from a task
//! spawned by `confirm`.
//!
//! There is no cancel. A caller that no longer cares about the node (it was
//! refuted as alive, say) drops its interest and lets the callback find the
//! node in a state where nothing needs doing.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

type ExpireFn = dyn Fn(u32) + Send + Sync;

/// Floored timeout after `n` of `k` confirmations, before subtracting the
/// time already spent waiting
pub fn suspicion_deadline(n: u32, k: u32, min: Duration, max: Duration) -> Duration {
    if k == 0 {
        return min;
    }

    let frac = (f64::from(n) + 1.0).ln() / (f64::from(k) + 1.0).ln();
    let raw = max.as_secs_f64() - frac * (max.as_secs_f64() - min.as_secs_f64());
    let timeout = Duration::from_millis((1000.0 * raw).floor() as u64);
    timeout.max(min)
}

/// Time left before a node with `n` of `k` confirmations should be declared
/// dead, given `elapsed` since the suspicion started.
///
/// Returns `None` when the deadline is already behind us; the caller must
/// fire immediately.
pub fn remaining_suspicion_time(
    n: u32,
    k: u32,
    elapsed: Duration,
    min: Duration,
    max: Duration,
) -> Option<Duration> {
    suspicion_deadline(n, k, min, max)
        .checked_sub(elapsed)
        .filter(|remaining| !remaining.is_zero())
}

/// Adaptive suspicion timer for a single suspected node.
///
/// Cloning yields another handle to the same timer so several message
/// receipt paths can confirm concurrently.
#[derive(Clone)]
pub struct Suspicion {
    inner: Arc<Inner>,
}

struct Inner {
    /// Independent confirmations seen so far
    n: AtomicU32,
    /// Confirmations wanted to reach `min`
    k: u32,
    min: Duration,
    max: Duration,
    timeout_fn: Box<ExpireFn>,
    /// Runtime the suspicion was created on; timers land here even when
    /// `confirm` is called from a thread outside it
    runtime: Handle,
    state: Mutex<TimerState>,
}

struct TimerState {
    start: Instant,
    /// Peers that already confirmed, seeded with the originator
    confirmations: HashSet<String>,
    timer: Option<JoinHandle<()>>,
    /// Bumped on every stop; a timer task only fires if its generation is current
    generation: u64,
    fired: bool,
}

impl Suspicion {
    /// Start a suspicion raised by `from`.
    ///
    /// The timer runs for `max` and is driven toward `min` after `k`
    /// confirmations. With `k == 0` it simply runs for `min`. `from` never
    /// counts as a confirmation since our own suspicion may be gossiped back
    /// to us. `on_expire` receives the confirmation count at expiry.
    ///
    /// Must be called from within a tokio runtime. Later calls to
    /// [`confirm`](Self::confirm) may come from any thread.
    pub fn new<F>(from: impl Into<String>, k: u32, min: Duration, max: Duration, on_expire: F) -> Self
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        let mut confirmations = HashSet::new();
        confirmations.insert(from.into());

        let inner = Arc::new(Inner {
            n: AtomicU32::new(0),
            k,
            min,
            max,
            timeout_fn: Box::new(on_expire),
            runtime: Handle::current(),
            state: Mutex::new(TimerState {
                start: Instant::now(),
                confirmations,
                timer: None,
                generation: 0,
                fired: false,
            }),
        });

        let timeout = if k < 1 { min } else { max };
        {
            let mut state = inner.state.lock();
            inner.arm(&mut state, timeout);
            // Taken after arming so any preemption lengthens the overall
            // timeout instead of shortening it.
            state.start = Instant::now();
        }

        Self { inner }
    }

    /// Register that `from` also considers the node suspect.
    ///
    /// Returns true if this was new information. Returns false for a repeat
    /// confirmation from the same peer, or once `k` confirmations are in.
    pub fn confirm(&self, from: &str) -> bool {
        let inner = &self.inner;
        let mut state = inner.state.lock();

        if inner.n.load(Ordering::SeqCst) >= inner.k {
            return false;
        }
        if state.confirmations.contains(from) {
            return false;
        }
        state.confirmations.insert(from.to_string());

        let n = inner.n.fetch_add(1, Ordering::SeqCst) + 1;
        let elapsed = state.start.elapsed();
        let remaining = remaining_suspicion_time(n, inner.k, elapsed, inner.min, inner.max);

        if Inner::stop(&mut state) {
            match remaining {
                Some(after) => {
                    debug!("Suspicion confirmed by {} ({}/{}), {:?} left", from, n, inner.k, after);
                    inner.arm(&mut state, after);
                }
                None => {
                    debug!("Suspicion confirmed by {} ({}/{}), deadline passed", from, n, inner.k);
                    state.fired = true;
                    let expired = Arc::clone(inner);
                    inner.runtime.spawn(async move {
                        expired.fire();
                    });
                }
            }
        }

        true
    }

    /// Number of independent confirmations received
    pub fn confirmations(&self) -> u32 {
        self.inner.n.load(Ordering::SeqCst)
    }

    /// Confirmations at which the timeout bottoms out
    pub fn confirmation_target(&self) -> u32 {
        self.inner.k
    }

    /// Whether the expiry callback has been dispatched
    pub fn has_fired(&self) -> bool {
        self.inner.state.lock().fired
    }
}

impl fmt::Debug for Suspicion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suspicion")
            .field("n", &self.confirmations())
            .field("k", &self.inner.k)
            .field("min", &self.inner.min)
            .field("max", &self.inner.max)
            .field("fired", &self.has_fired())
            .finish()
    }
}

impl Inner {
    fn arm(self: &Arc<Self>, state: &mut TimerState, after: Duration) {
        state.generation += 1;
        let generation = state.generation;
        let inner = Arc::clone(self);

        state.timer = Some(self.runtime.spawn(async move {
            tokio::time::sleep(after).await;
            inner.expire(generation);
        }));
    }

    /// Stop the running timer. False if it has already fired.
    fn stop(state: &mut TimerState) -> bool {
        if state.fired {
            return false;
        }

        state.generation += 1;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        true
    }

    fn expire(&self, generation: u64) {
        {
            let mut state = self.state.lock();
            if state.fired || state.generation != generation {
                return;
            }
            state.fired = true;
            state.timer = None;
        }
        self.fire();
    }

    fn fire(&self) {
        let n = self.n.load(Ordering::SeqCst);
        debug!("Suspicion timer expired with {} confirmations", n);
        (self.timeout_fn)(n);
    }
}
