//! Deadline queue for deferred work
//!
//! The host pumps [`crate::MapVote::tick`] once per second; anything the
//! core wants to run later is an entry here. Entries tied to a vote session
//! carry the session id captured at schedule time, and the dispatcher
//! re-checks it against the live id at fire time — restarting, resolving,
//! or cancelling a session makes every stale entry a no-op.

/// What to do when an entry comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Per-second heartbeat of the active vote session
    SessionTick,
    /// Run the delayed engine map change
    PerformMapChange,
}

#[derive(Debug, Clone)]
pub struct TimerEntry {
    /// Engine time at which the entry fires
    pub due: f64,
    /// Session id captured at schedule time; `None` for work that must
    /// survive session restarts (e.g. an in-flight map change)
    pub session_id: Option<u64>,
    pub action: TimerAction,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    entries: Vec<TimerEntry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: f64, session_id: Option<u64>, action: TimerAction) {
        self.entries.push(TimerEntry {
            due,
            session_id,
            action,
        });
    }

    /// Remove and return every entry due at `now`, in schedule order.
    pub fn drain_due(&mut self, now: f64) -> Vec<TimerEntry> {
        let mut due = Vec::new();
        let mut remaining = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            if entry.due <= now {
                due.push(entry);
            } else {
                remaining.push(entry);
            }
        }
        self.entries = remaining;
        due
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
