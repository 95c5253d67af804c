use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;
use tracing::trace;

/// Handle to a scheduled one-shot event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// One-shot deferred events ordered by deadline, ties broken by scheduling order.
///
/// Nothing runs on its own: the owner asks for due events with [`Scheduler::pop_due`]
/// and decides how to wait until [`Scheduler::next_deadline`].
#[derive(Debug)]
pub struct Scheduler<E> {
    queue: BTreeMap<(u64, TimerId), E>,
    deadlines: HashMap<TimerId, u64>,
    next_id: u64,
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn schedule_at(&mut self, deadline_ns: u64, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.queue.insert((deadline_ns, id), event);
        self.deadlines.insert(id, deadline_ns);
        trace!(%id, deadline_ns, "scheduled");
        id
    }

    pub fn schedule_after(&mut self, now_ns: u64, delay: Duration, event: E) -> TimerId {
        let deadline = now_ns.saturating_add(delay.as_nanos() as u64);
        self.schedule_at(deadline, event)
    }

    /// Returns false if the timer already fired or was cancelled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(deadline) => {
                self.queue.remove(&(deadline, id));
                trace!(%id, "cancelled");
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) -> usize {
        let n = self.queue.len();
        self.queue.clear();
        self.deadlines.clear();
        n
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.keys().next().map(|&(deadline, _)| deadline)
    }

    /// Removes and returns the earliest event whose deadline is at or before `now_ns`
    pub fn pop_due(&mut self, now_ns: u64) -> Option<(TimerId, E)> {
        let &(deadline, id) = self.queue.keys().next()?;
        if deadline > now_ns {
            return None;
        }
        let event = self.queue.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        trace!(%id, deadline_ns = deadline, now_ns, "fired");
        Some((id, event))
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}
