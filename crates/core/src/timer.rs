//! Virtual-time task scheduler.
//!
//! Sessions own a `Timers` and feed it elapsed time; it never reads a real
//! clock. Every task carries a caller-defined `kind` that is handed back when
//! the task falls due.

use crate::model::TimerId;

#[derive(Debug, Clone)]
struct Task<K> {
    id: TimerId,
    due_at: u64,
    every: Option<u64>,
    kind: K,
}

/// One-shot and repeating tasks over a millisecond timeline.
#[derive(Debug, Clone)]
pub struct Timers<K> {
    now: u64,
    next_id: u64,
    tasks: Vec<Task<K>>,
}

impl<K: Clone> Timers<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: 0,
            next_id: 1,
            tasks: Vec::new(),
        }
    }

    /// Current position on the timeline, in milliseconds.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedules `kind` to fire once, `delay_ms` from now.
    pub fn schedule_once(&mut self, delay_ms: u64, kind: K) -> TimerId {
        self.push(delay_ms, None, kind)
    }

    /// Schedules `kind` to fire every `interval_ms`, first after one interval.
    ///
    /// Intervals shorter than 1 ms are raised to 1 ms.
    pub fn schedule_repeating(&mut self, interval_ms: u64, kind: K) -> TimerId {
        let interval_ms = interval_ms.max(1);
        self.push(interval_ms, Some(interval_ms), kind)
    }

    /// Removes a task. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.tasks.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    #[must_use]
    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.tasks.iter().any(|task| task.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Milliseconds until the earliest pending task, if any.
    #[must_use]
    pub fn until_next(&self) -> Option<u64> {
        self.tasks
            .iter()
            .map(|task| task.due_at.saturating_sub(self.now))
            .min()
    }

    /// Fires every task due at the earliest pending instant, provided that
    /// instant is not later than `until`.
    ///
    /// The timeline moves to that instant. Tasks come back in scheduling order;
    /// repeating tasks are re-armed before they are returned, so the caller may
    /// cancel them while handling the batch.
    pub fn pop_next_batch(&mut self, until: u64) -> Option<Vec<(TimerId, K)>> {
        let due_at = self.tasks.iter().map(|task| task.due_at).min()?;
        if due_at > until {
            return None;
        }
        self.now = self.now.max(due_at);

        let mut fired = Vec::new();
        for task in &mut self.tasks {
            if task.due_at != due_at {
                continue;
            }
            fired.push((task.id, task.kind.clone()));
            if let Some(every) = task.every {
                task.due_at = due_at.saturating_add(every);
            }
        }
        self.tasks
            .retain(|task| task.every.is_some() || task.due_at != due_at);
        Some(fired)
    }

    /// Moves the timeline forward without firing anything.
    ///
    /// Callers drain due tasks with [`Timers::pop_next_batch`] first.
    pub fn advance_to(&mut self, at: u64) {
        self.now = self.now.max(at);
    }

    fn push(&mut self, delay_ms: u64, every: Option<u64>, kind: K) -> TimerId {
        let id = TimerId::new(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            due_at: self.now.saturating_add(delay_ms),
            every,
            kind,
        });
        id
    }
}

impl<K: Clone> Default for Timers<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(timers: &mut Timers<&'static str>, until: u64) -> Vec<(u64, &'static str)> {
        let mut fired = Vec::new();
        while let Some(batch) = timers.pop_next_batch(until) {
            let at = timers.now();
            fired.extend(batch.into_iter().map(|(_, kind)| (at, kind)));
        }
        timers.advance_to(until);
        fired
    }

    #[test]
    fn one_shots_fire_in_time_order() {
        let mut timers = Timers::new();
        timers.schedule_once(600, "late");
        timers.schedule_once(200, "early");
        assert_eq!(timers.until_next(), Some(200));

        assert_eq!(drain(&mut timers, 1_000), vec![(200, "early"), (600, "late")]);
        assert!(timers.is_empty());
        assert_eq!(timers.now(), 1_000);
    }

    #[test]
    fn repeating_task_rearms_until_cancelled() {
        let mut timers = Timers::new();
        let tick = timers.schedule_repeating(1_000, "tick");
        assert_eq!(drain(&mut timers, 3_500).len(), 3);
        assert_eq!(timers.until_next(), Some(500));

        assert!(timers.cancel(tick));
        assert!(!timers.cancel(tick));
        assert!(drain(&mut timers, 10_000).is_empty());
    }

    #[test]
    fn same_instant_tasks_come_back_together_in_schedule_order() {
        let mut timers = Timers::new();
        timers.schedule_once(400, "confirm");
        timers.schedule_repeating(400, "tick");
        let batch = timers.pop_next_batch(400).unwrap();
        let kinds: Vec<&str> = batch.iter().map(|(_, kind)| *kind).collect();
        assert_eq!(kinds, vec!["confirm", "tick"]);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn tasks_beyond_the_horizon_stay_pending() {
        let mut timers = Timers::new();
        let id = timers.schedule_once(5_000, "later");
        assert!(timers.pop_next_batch(4_999).is_none());
        assert!(timers.is_scheduled(id));
        timers.advance_to(4_999);
        assert_eq!(timers.until_next(), Some(1));
    }

    #[test]
    fn zero_delay_fires_on_the_next_drain() {
        let mut timers = Timers::new();
        timers.advance_to(250);
        timers.schedule_once(0, "now");
        assert_eq!(drain(&mut timers, 250), vec![(250, "now")]);
    }
}
