//! Deferred task queue
//!
//! Tasks are posted for delivery a number of seconds in the future and come
//! back out of [`TimerQueue::advance`] once the queue's clock passes their
//! due time. Every posted task gets a [`TimerToken`] that can cancel it.
//!
//! Exclusive tasks share a named slot: posting into a slot cancels whatever
//! was still pending there, so a restarted cleanup never runs twice.

/// Cancellation handle for a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

#[derive(Debug)]
struct Timer<T> {
    due: f64,
    token: TimerToken,
    slot: Option<String>,
    task: T,
}

/// Queue of tasks due at future times
#[derive(Debug)]
pub struct TimerQueue<T> {
    current_time: f64,
    next_token: u64,
    timers: Vec<Timer<T>>,
}

impl<T> TimerQueue<T> {
    /// Create an empty queue at time zero
    pub fn new() -> Self {
        Self {
            current_time: 0.0,
            next_token: 0,
            timers: Vec::new(),
        }
    }

    /// Post `task` for delivery `delay` seconds from now
    pub fn schedule(&mut self, delay: f32, task: T) -> TimerToken {
        self.push(delay, None, task)
    }

    /// Post `task` into `slot`, cancelling anything still pending there
    pub fn schedule_exclusive(&mut self, slot: &str, delay: f32, task: T) -> TimerToken {
        let cancelled = self.cancel_slot(slot);
        if cancelled > 0 {
            log::debug!("Superseded {} pending task(s) in slot '{}'", cancelled, slot);
        }
        self.push(delay, Some(slot.to_string()), task)
    }

    /// Cancel one task; returns `false` if it already ran or was cancelled
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.token != token);
        self.timers.len() != before
    }

    /// Cancel every pending task in `slot`
    pub fn cancel_slot(&mut self, slot: &str) -> usize {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.slot.as_deref() != Some(slot));
        before - self.timers.len()
    }

    /// Move the clock forward and take every task now due, earliest first
    pub fn advance(&mut self, delta_time: f32) -> Vec<T> {
        self.current_time += f64::from(delta_time);
        let now = self.current_time;

        let (mut due, pending): (Vec<Timer<T>>, Vec<Timer<T>>) =
            std::mem::take(&mut self.timers).into_iter().partition(|timer| timer.due <= now);
        self.timers = pending;

        due.sort_by(|a, b| a.due.total_cmp(&b.due));
        due.into_iter().map(|timer| timer.task).collect()
    }

    /// Number of tasks not yet delivered
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Whether the task behind `token` is still waiting
    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.timers.iter().any(|timer| timer.token == token)
    }

    /// Drop every pending task
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    fn push(&mut self, delay: f32, slot: Option<String>, task: T) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.timers.push(Timer {
            due: self.current_time + f64::from(delay.max(0.0)),
            token,
            slot,
            task,
        });
        token
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
