//! Cooperative one-shot timers.
//!
//! Timers are advanced once per tick by their owner. Scheduling returns an
//! opaque [`TimerHandle`]; the owner keeps the handle to cancel or query the
//! timer. Expired payloads are returned from [`Timers::advance`] and handled
//! by the owner afterwards, so no handler ever runs while a timer is being
//! cancelled or rescheduled.

use tracing::trace;

/// Opaque token for a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct PendingTimer<T> {
    handle: TimerHandle,
    label: &'static str,
    remaining: f32,
    payload: T,
}

/// A set of pending one-shot timers carrying payloads of type `T`.
#[derive(Debug, Clone)]
pub struct Timers<T> {
    next_id: u64,
    pending: Vec<PendingTimer<T>>,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Timers<T> {
    /// Create an empty timer set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            pending: Vec::new(),
        }
    }

    /// Schedule `payload` to fire after `delay` seconds.
    ///
    /// A non-positive delay fires on the next [`advance`](Self::advance).
    pub fn schedule(&mut self, label: &'static str, delay: f32, payload: T) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        trace!(label, delay, "timer scheduled");
        self.pending.push(PendingTimer {
            handle,
            label,
            remaining: delay.max(0.0),
            payload,
        });
        handle
    }

    /// Cancel whatever `slot` holds, then schedule a fresh timer into it.
    pub fn replace(
        &mut self,
        slot: &mut Option<TimerHandle>,
        label: &'static str,
        delay: f32,
        payload: T,
    ) -> TimerHandle {
        if let Some(previous) = slot.take() {
            self.cancel(previous);
        }
        let handle = self.schedule(label, delay, payload);
        *slot = Some(handle);
        handle
    }

    /// Cancel a timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.handle != handle);
        self.pending.len() != before
    }

    /// Cancel whatever `slot` holds and clear it.
    pub fn cancel_slot(&mut self, slot: &mut Option<TimerHandle>) -> bool {
        slot.take().is_some_and(|handle| self.cancel(handle))
    }

    /// Check if a timer is still pending.
    #[must_use]
    pub fn is_running(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|t| t.handle == handle)
    }

    /// Seconds left on a pending timer.
    #[must_use]
    pub fn remaining(&self, handle: TimerHandle) -> Option<f32> {
        self.pending
            .iter()
            .find(|t| t.handle == handle)
            .map(|t| t.remaining)
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if no timers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Advance all timers by `dt` seconds and return the payloads that expired,
    /// earliest deadline first.
    pub fn advance(&mut self, dt: f32) -> Vec<T> {
        let mut expired = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            self.pending[i].remaining -= dt;
            if self.pending[i].remaining <= 0.0 {
                expired.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        expired.sort_by(|a, b| {
            a.remaining
                .total_cmp(&b.remaining)
                .then(a.handle.0.cmp(&b.handle.0))
        });
        expired
            .into_iter()
            .map(|t| {
                trace!(label = t.label, "timer fired");
                t.payload
            })
            .collect()
    }
}
