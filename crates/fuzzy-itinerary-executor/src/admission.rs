//! Admission control.
//!
//! A task leaves the queue only when a worker slot is free and the last
//! memory sample is above the budget's floor. Samples come from a
//! background sampler that re-reads the probe every `sample_interval` and
//! wakes blocked admissions, so a stalled admission costs no CPU.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{trace, warn};

use crate::traits::MemoryProbe;

/// Outcome of one admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    /// A slot was taken. `deferred` is true if memory pressure held it back.
    Admitted { deferred: bool },
    /// Memory stayed at or below the floor for the whole timeout; no slot
    /// was taken.
    TimedOut,
}

#[derive(Debug)]
struct GateState {
    available: u64,
    in_flight: usize,
    samples: usize,
    closed: bool,
}

/// Gates task admission on worker slots and sampled memory.
#[derive(Debug)]
pub(crate) struct AdmissionGate {
    floor: u64,
    slots: usize,
    state: Mutex<GateState>,
    /// Signalled on every new sample and every released slot.
    changed: Condvar,
    /// Signalled when the gate closes, to stop the sampler early.
    closing: Condvar,
}

impl AdmissionGate {
    pub(crate) fn new(floor: u64, slots: usize, initial: u64) -> Self {
        Self {
            floor,
            slots,
            state: Mutex::new(GateState {
                available: initial,
                in_flight: 0,
                samples: 1,
                closed: false,
            }),
            changed: Condvar::new(),
            closing: Condvar::new(),
        }
    }

    /// Blocks until a task may start.
    ///
    /// `timeout` bounds only the time spent held back by memory; waiting for
    /// a busy worker never times out. A timeout too large to represent as an
    /// instant means no timeout. A successful admission takes a slot, given
    /// back by [`release`](Self::release).
    pub(crate) fn admit(&self, timeout: Option<Duration>) -> Admission {
        let mut state = self.state.lock();
        let mut deferred_until: Option<Option<Instant>> = None;

        loop {
            if state.in_flight >= self.slots {
                self.changed.wait(&mut state);
                continue;
            }
            if state.available > self.floor {
                state.in_flight += 1;
                return Admission::Admitted {
                    deferred: deferred_until.is_some(),
                };
            }

            let deadline = *deferred_until.get_or_insert_with(|| {
                warn!(
                    available = state.available,
                    floor = self.floor,
                    "memory limit reached, deferring task"
                );
                timeout.and_then(|t| Instant::now().checked_add(t))
            });

            match deadline {
                Some(deadline) => {
                    if self.changed.wait_until(&mut state, deadline).timed_out()
                        && state.available <= self.floor
                    {
                        return Admission::TimedOut;
                    }
                }
                None => self.changed.wait(&mut state),
            }
        }
    }

    /// Gives back a slot taken by [`admit`](Self::admit).
    pub(crate) fn release(&self) {
        let mut state = self.state.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        drop(state);
        self.changed.notify_all();
    }

    /// Re-reads `probe` every `interval` until the gate is closed.
    pub(crate) fn run_sampler(&self, probe: &dyn MemoryProbe, interval: Duration) {
        let mut state = self.state.lock();
        while !state.closed {
            self.closing.wait_for(&mut state, interval);
            if state.closed {
                break;
            }
            let available = MutexGuard::unlocked(&mut state, || probe.available_bytes());
            trace!(available, "memory sample");
            state.available = available;
            state.samples += 1;
            self.changed.notify_all();
        }
    }

    /// Stops the sampler. Admissions already waiting keep waiting.
    pub(crate) fn close(&self) {
        self.state.lock().closed = true;
        self.closing.notify_all();
    }

    /// Number of memory readings taken, including the initial one.
    pub(crate) fn samples(&self) -> usize {
        self.state.lock().samples
    }
}

/// Closes the gate when dropped.
pub(crate) struct CloseOnDrop<'a>(pub(crate) &'a AdmissionGate);

impl Drop for CloseOnDrop<'_> {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Releases one slot when dropped.
pub(crate) struct SlotGuard<'a>(pub(crate) &'a AdmissionGate);

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.0.release();
    }
}
