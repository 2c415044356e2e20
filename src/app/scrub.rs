use std::time::{Duration, Instant};

/// A scrub gesture in progress.
///
/// While active, the pending position shadows the coordinator's
/// `current_time` on screen. Once no scrub key has arrived for
/// `commit_after`, `poll_commit` hands the final position out exactly once.
#[derive(Debug, Clone)]
pub struct Scrub {
    pending: Option<Duration>,
    last_input: Option<Instant>,
    commit_after: Duration,
}

impl Scrub {
    pub fn new(commit_after: Duration) -> Self {
        Self {
            pending: None,
            last_input: None,
            commit_after,
        }
    }

    pub fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    /// Move the pending position by `delta_secs`, starting from
    /// `authoritative` when no gesture is active. Clamped to
    /// `[0, duration]` when `duration` is known.
    pub fn adjust(
        &mut self,
        authoritative: Duration,
        duration: Duration,
        delta_secs: i64,
        now: Instant,
    ) {
        let base = self.pending.unwrap_or(authoritative);
        let step = Duration::from_secs(delta_secs.unsigned_abs());
        let mut next = if delta_secs < 0 {
            base.saturating_sub(step)
        } else {
            base.saturating_add(step)
        };
        if !duration.is_zero() {
            next = next.min(duration);
        }

        self.pending = Some(next);
        self.last_input = Some(now);
    }

    /// Position to show: the pending value while scrubbing.
    pub fn display(&self, authoritative: Duration) -> Duration {
        self.pending.unwrap_or(authoritative)
    }

    /// The final position, once the gesture has gone quiet.
    pub fn poll_commit(&mut self, now: Instant) -> Option<Duration> {
        let last = self.last_input?;
        if now.saturating_duration_since(last) < self.commit_after {
            return None;
        }
        self.last_input = None;
        self.pending.take()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
        self.last_input = None;
    }
}
