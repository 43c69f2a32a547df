use std::collections::BTreeMap;
use std::time::Duration;

/// Opaque handle returned when a task is scheduled; pass it to [`TimerQueue::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired<T> {
    pub handle: TaskHandle,
    pub at_ms: u64,
    pub payload: T,
}

#[derive(Debug, Clone)]
struct ScheduledTask<T> {
    handle: TaskHandle,
    period_ms: Option<u64>,
    payload: T,
}

/// Single-threaded scheduled-task queue on a virtual millisecond clock.
///
/// Tasks are keyed by `(deadline, sequence)` so tasks sharing a deadline fire
/// in the order they were scheduled. Nothing fires on its own: the owner
/// drains due tasks with [`TimerQueue::pop_due`] after deciding how far time
/// has moved.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    now_ms: u64,
    next_seq: u64,
    next_handle: u64,
    tasks: BTreeMap<(u64, u64), ScheduledTask<T>>,
}

impl<T: Clone> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_seq: 0,
            next_handle: 0,
            tasks: BTreeMap::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn schedule_once(&mut self, delay: Duration, payload: T) -> TaskHandle {
        let deadline = self.now_ms.saturating_add(duration_ms(delay));
        self.insert(deadline, None, payload)
    }

    /// Periods shorter than one millisecond are clamped to one so a zero
    /// interval cannot pin the queue at a single instant.
    pub fn schedule_repeating(&mut self, period: Duration, payload: T) -> TaskHandle {
        let period_ms = duration_ms(period).max(1);
        let deadline = self.now_ms.saturating_add(period_ms);
        self.insert(deadline, Some(period_ms), payload)
    }

    /// Returns `true` if the task was still pending.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let key = self
            .tasks
            .iter()
            .find(|(_, task)| task.handle == handle)
            .map(|(key, _)| *key);
        match key {
            Some(key) => self.tasks.remove(&key).is_some(),
            None => false,
        }
    }

    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.tasks.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Pops the earliest task due at or before `until_ms`, moving the clock to
    /// its deadline. Repeating tasks are re-armed one period later.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Fired<T>> {
        let (&(deadline, seq), _) = self.tasks.iter().next()?;
        if deadline > until_ms {
            return None;
        }
        let task = self.tasks.remove(&(deadline, seq))?;
        self.now_ms = self.now_ms.max(deadline);
        if let Some(period_ms) = task.period_ms {
            let seq = self.bump_seq();
            self.tasks.insert(
                (deadline.saturating_add(period_ms), seq),
                ScheduledTask {
                    handle: task.handle,
                    period_ms: task.period_ms,
                    payload: task.payload.clone(),
                },
            );
        }
        Some(Fired {
            handle: task.handle,
            at_ms: deadline,
            payload: task.payload,
        })
    }

    /// Moves the clock forward without firing anything. Callers drain
    /// [`TimerQueue::pop_due`] first.
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    fn insert(&mut self, deadline: u64, period_ms: Option<u64>, payload: T) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        let seq = self.bump_seq();
        self.tasks.insert(
            (deadline, seq),
            ScheduledTask {
                handle,
                period_ms,
                payload,
            },
        );
        handle
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

pub(crate) fn duration_ms(duration: Duration) -> u64 {
    duration.as_millis().min(u128::from(u64::MAX)) as u64
}
