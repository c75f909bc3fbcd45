use std::time::Duration;

/// A scheduled callback owned by its caller.
///
/// Nothing runs in the background: the owner polls with the current time and acts on the
/// returned `true`. Cancelling is simply dropping the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    due_at_ms: u64,
    period_ms: Option<u64>,
}

impl Timer {
    /// Fires once, `delay_ms` after `now_ms`
    pub fn once(now_ms: u64, delay_ms: u64) -> Self {
        Self {
            due_at_ms: now_ms.saturating_add(delay_ms),
            period_ms: None,
        }
    }

    /// Fires every `period_ms`, first at `now_ms + period_ms`
    pub fn repeating(now_ms: u64, period_ms: u64) -> Self {
        let period_ms = period_ms.max(1);
        Self {
            due_at_ms: now_ms.saturating_add(period_ms),
            period_ms: Some(period_ms),
        }
    }

    pub fn due_at_ms(&self) -> u64 {
        self.due_at_ms
    }

    pub fn is_repeating(&self) -> bool {
        self.period_ms.is_some()
    }

    /// Time left until the timer is due (zero once overdue)
    pub fn remaining(&self, now_ms: u64) -> Duration {
        Duration::from_millis(self.due_at_ms.saturating_sub(now_ms))
    }

    /// Returns true when due. A repeating timer re-arms one period from `now_ms`,
    /// so a late poll does not replay the periods it missed.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms < self.due_at_ms {
            return false;
        }
        if let Some(period) = self.period_ms {
            self.due_at_ms = now_ms.saturating_add(period);
        }
        true
    }
}
