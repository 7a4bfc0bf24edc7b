//! Deadline-ordered task scheduler driven by the host event loop.
//!
//! Nothing here owns a thread or a timer: the event loop asks for the next deadline, sleeps
//! until then (`ControlFlow::WaitUntil`), and calls [`Scheduler::poll_due`]. Every scheduled task
//! is identified by a [`TaskHandle`], which is the only way to cancel it.

use std::time::{Duration, Instant};

/// Minimum period for repeating tasks; a zero period would spin the event loop.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    handle: TaskHandle,
    due: Instant,
    period: Option<Duration>,
    task: T,
}

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `task` once at `due`.
    pub fn schedule_once(&mut self, due: Instant, task: T) -> TaskHandle {
        self.push(due, None, task)
    }

    pub fn schedule_after(&mut self, now: Instant, delay: Duration, task: T) -> TaskHandle {
        self.schedule_once(now + delay, task)
    }

    /// Runs `task` at `first_due` and then every `period` until cancelled.
    pub fn schedule_repeating(&mut self, first_due: Instant, period: Duration, task: T) -> TaskHandle {
        self.push(first_due, Some(period.max(MIN_PERIOD)), task)
    }

    /// Returns `true` if the task was still pending.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    pub fn due_at(&self, handle: TaskHandle) -> Option<Instant> {
        self.entries.iter().find(|e| e.handle == handle).map(|e| e.due)
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

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.due).min()
    }

    /// Removes and returns every task due at or before `now`, earliest first.
    ///
    /// Ties are broken by scheduling order. A repeating task fires at most once per poll; periods
    /// missed while the loop was asleep are skipped, and the task is re-armed on its original
    /// cadence strictly after `now`.
    pub fn poll_due(&mut self, now: Instant) -> Vec<(TaskHandle, T)> {
        let mut due: Vec<(Instant, TaskHandle, T)> = Vec::new();

        self.entries.retain_mut(|entry| {
            if entry.due > now {
                return true;
            }
            due.push((entry.due, entry.handle, entry.task.clone()));
            match entry.period {
                Some(period) => {
                    entry.due = next_after(entry.due, period, now);
                    true
                }
                None => false,
            }
        });

        due.sort_by_key(|(at, handle, _)| (*at, *handle));
        due.into_iter().map(|(_, handle, task)| (handle, task)).collect()
    }

    fn push(&mut self, due: Instant, period: Option<Duration>, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(Entry {
            handle,
            due,
            period,
            task,
        });
        handle
    }
}

fn next_after(due: Instant, period: Duration, now: Instant) -> Instant {
    let behind = now.saturating_duration_since(due);
    let skipped = (behind.as_nanos() / period.as_nanos()) as u32;
    due + period * skipped.saturating_add(1)
}
