//! Timer registration behind a trait so the generator never touches a real
//! clock directly. Production code uses [`TokioScheduler`]; tests drive a
//! [`ManualScheduler`] forward explicitly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

pub type OnceTask = Box<dyn FnOnce() + Send + 'static>;
pub type RepeatingTask = Box<dyn FnMut() + Send + 'static>;

/// Shortest accepted repeat period. Zero would spin.
const MIN_PERIOD: Duration = Duration::from_millis(1);

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cancellation handle returned by every registration. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct TimerToken {
    cancelled: Arc<AtomicBool>,
}

impl TimerToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

pub trait Scheduler: Send + Sync {
    /// Runs `task` once after `delay` unless the token is cancelled first.
    fn schedule_once(&self, delay: Duration, task: OnceTask) -> TimerToken;

    /// Runs `task` every `period`, first firing one period from now.
    fn schedule_every(&self, period: Duration, task: RepeatingTask) -> TimerToken;
}

/// Scheduler backed by tokio timers on the given runtime.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
    handle: tokio::runtime::Handle,
}

impl TokioScheduler {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Binds to the runtime of the calling task. Panics outside a runtime,
    /// so call it from `main` after the runtime is up.
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(&self, delay: Duration, task: OnceTask) -> TimerToken {
        let token = TimerToken::new();
        let guard = token.clone();
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if !guard.is_cancelled() {
                task();
            }
        });
        token
    }

    fn schedule_every(&self, period: Duration, mut task: RepeatingTask) -> TimerToken {
        let period = period.max(MIN_PERIOD);
        let token = TimerToken::new();
        let guard = token.clone();
        self.handle.spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            loop {
                ticker.tick().await;
                if guard.is_cancelled() {
                    break;
                }
                task();
            }
        });
        token
    }
}

enum PendingTask {
    Once(OnceTask),
    Every { period: Duration, task: RepeatingTask },
}

struct PendingTimer {
    due: Duration,
    seq: u64,
    token: TimerToken,
    task: PendingTask,
}

#[derive(Default)]
struct ManualClock {
    now: Duration,
    next_seq: u64,
    timers: Vec<PendingTimer>,
}

impl ManualClock {
    fn push(&mut self, due: Duration, token: TimerToken, task: PendingTask) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(PendingTimer {
            due,
            seq,
            token,
            task,
        });
    }

    /// Removes the earliest live timer due at or before `deadline`.
    fn pop_due(&mut self, deadline: Duration) -> Option<PendingTimer> {
        self.timers.retain(|t| !t.token.is_cancelled());
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= deadline)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i)?;
        Some(self.timers.swap_remove(idx))
    }
}

/// Virtual clock. Nothing fires until [`ManualScheduler::advance`] is called;
/// callbacks then run on the caller's thread in due-time order.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Arc<Mutex<ManualClock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        lock(&self.clock).now
    }

    /// Timers registered and not yet cancelled or fired.
    pub fn pending(&self) -> usize {
        lock(&self.clock)
            .timers
            .iter()
            .filter(|t| !t.token.is_cancelled())
            .count()
    }

    pub fn advance(&self, by: Duration) {
        let deadline = lock(&self.clock).now + by;
        loop {
            // The clock lock is released before the callback runs so tasks
            // may schedule or cancel timers themselves.
            let next = {
                let mut clock = lock(&self.clock);
                match clock.pop_due(deadline) {
                    Some(timer) => {
                        clock.now = timer.due;
                        timer
                    }
                    None => {
                        clock.now = deadline;
                        return;
                    }
                }
            };

            match next.task {
                PendingTask::Once(task) => task(),
                PendingTask::Every { period, mut task } => {
                    task();
                    if !next.token.is_cancelled() {
                        let due = next.due + period;
                        lock(&self.clock).push(
                            due,
                            next.token,
                            PendingTask::Every { period, task },
                        );
                    }
                }
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&self, delay: Duration, task: OnceTask) -> TimerToken {
        let token = TimerToken::new();
        let mut clock = lock(&self.clock);
        let due = clock.now + delay;
        clock.push(due, token.clone(), PendingTask::Once(task));
        token
    }

    fn schedule_every(&self, period: Duration, task: RepeatingTask) -> TimerToken {
        let period = period.max(MIN_PERIOD);
        let token = TimerToken::new();
        let mut clock = lock(&self.clock);
        let due = clock.now + period;
        clock.push(due, token.clone(), PendingTask::Every { period, task });
        token
    }
}
