//! Non-blocking re-entrancy guard for configuration processing
//!
//! Configuration pushes are periodic, so a push that arrives while the
//! previous one is still checking files is dropped, not queued.
//!
//! Each acquisition gets its own token. A forced [`BusyGuard::release`]
//! (RESET) invalidates the outstanding [`BusyHold`], so a stale hold can
//! neither clear the flag for a newer holder nor pass [`BusyHold::is_current`].

use std::sync::atomic::{AtomicU64, Ordering};

/// Token stored in `owner` while idle
const IDLE: u64 = 0;

/// Busy flag with an explicit try-acquire
#[derive(Debug, Default)]
pub struct BusyGuard {
    /// Token of the current holder, or `IDLE`
    owner: AtomicU64,
    tokens: AtomicU64,
}

impl BusyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark busy; returns false (and changes nothing) if already busy
    pub fn try_acquire(&self) -> bool {
        self.acquire().is_some()
    }

    /// Clear the busy mark, whoever holds it
    pub fn release(&self) {
        self.owner.store(IDLE, Ordering::Release);
    }

    pub fn is_busy(&self) -> bool {
        self.owner.load(Ordering::Acquire) != IDLE
    }

    /// Acquire and return a hold that releases on drop
    pub fn hold(&self) -> Option<BusyHold<'_>> {
        self.acquire().map(|token| BusyHold { guard: self, token })
    }

    fn acquire(&self) -> Option<u64> {
        let token = self.tokens.fetch_add(1, Ordering::Relaxed) + 1;
        self.owner
            .compare_exchange(IDLE, token, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| token)
    }
}

/// Releases its [`BusyGuard`] when dropped (including on cancellation)
#[derive(Debug)]
pub struct BusyHold<'a> {
    guard: &'a BusyGuard,
    token: u64,
}

impl BusyHold<'_> {
    /// False once the guard was force-released, even if someone re-acquired it
    pub fn is_current(&self) -> bool {
        self.guard.owner.load(Ordering::Acquire) == self.token
    }
}

impl Drop for BusyHold<'_> {
    fn drop(&mut self) {
        // Only clear our own acquisition
        let _ = self.guard.owner.compare_exchange(
            self.token,
            IDLE,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}
