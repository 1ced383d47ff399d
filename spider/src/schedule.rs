//! Tick-keyed deferred work. Nothing here reads a clock; the owner calls
//! [`Scheduler::advance`] once per simulation tick.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskContext {
    pub tick: u64,
    pub handle: TaskHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFlow {
    Continue,
    Stop,
}

type Task<C> = Box<dyn FnMut(&mut C, &TaskContext) -> TaskFlow + Send + Sync>;

struct Entry<C> {
    handle: TaskHandle,
    run_at: u64,
    /// Zero for one-shot tasks.
    period: u64,
    task: Task<C>,
}

/// Runs tasks against a context `C` at chosen ticks.
pub struct Scheduler<C> {
    tick: u64,
    next_id: u64,
    entries: Vec<Entry<C>>,
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self { tick: 0, next_id: 0, entries: Vec::new() }
    }
}

impl<C> fmt::Debug for Scheduler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler").field("tick", &self.tick).field("pending", &self.entries.len()).finish()
    }
}

impl<C> Scheduler<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    fn push(&mut self, delay: u64, period: u64, task: Task<C>) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { handle, run_at: self.tick + delay, period, task });
        handle
    }

    /// Runs `task` once, `delay` ticks from now (a zero delay runs on the next advance).
    pub fn run_later(&mut self, delay: u64, task: impl FnOnce(&mut C) + Send + Sync + 'static) -> TaskHandle {
        let mut task = Some(task);
        self.push(
            delay,
            0,
            Box::new(move |ctx, _| {
                if let Some(task) = task.take() {
                    task(ctx);
                }
                TaskFlow::Stop
            }),
        )
    }

    /// Runs `task` after `delay` ticks and then every `period` ticks until it returns
    /// [`TaskFlow::Stop`] or is cancelled.
    pub fn interval(
        &mut self,
        delay: u64,
        period: u64,
        task: impl FnMut(&mut C, &TaskContext) -> TaskFlow + Send + Sync + 'static,
    ) -> TaskHandle {
        self.push(delay, period.max(1), Box::new(task))
    }

    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    /// Moves to the next tick and runs everything due, in scheduling order.
    pub fn advance(&mut self, context: &mut C) {
        self.tick += 1;
        let tick = self.tick;
        self.entries.retain_mut(|entry| {
            if tick < entry.run_at {
                return true;
            }
            let flow = (entry.task)(context, &TaskContext { tick, handle: entry.handle });
            if entry.period == 0 || flow == TaskFlow::Stop {
                return false;
            }
            entry.run_at = tick + entry.period;
            true
        });
    }

    pub fn series(&mut self) -> Series<'_, C> {
        Series { scheduler: self, time: 0, handles: Vec::new() }
    }
}

/// Chains delayed one-shot tasks: `sleep` pushes the clock forward, `run` schedules at it.
pub struct Series<'a, C> {
    scheduler: &'a mut Scheduler<C>,
    time: u64,
    handles: Vec<TaskHandle>,
}

impl<C> Series<'_, C> {
    pub fn sleep(mut self, duration: u64) -> Self {
        self.time += duration;
        self
    }

    pub fn run(mut self, task: impl FnOnce(&mut C) + Send + Sync + 'static) -> Self {
        let handle = self.scheduler.run_later(self.time, task);
        self.handles.push(handle);
        self
    }

    pub fn handles(self) -> Vec<TaskHandle> {
        self.handles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_runs_once_at_requested_tick() {
        let mut scheduler = Scheduler::<Vec<u64>>::new();
        let mut log = Vec::new();
        scheduler.run_later(3, |log: &mut Vec<u64>| log.push(99));
        for _ in 0..6 {
            scheduler.advance(&mut log);
            log.push(scheduler.tick() * 100);
        }
        assert_eq!(log, vec![100, 200, 99, 300, 400, 500, 600]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn interval_rearms_until_stopped_or_cancelled() {
        let mut scheduler = Scheduler::<Vec<u64>>::new();
        let mut log = Vec::new();
        scheduler.interval(1, 2, |log: &mut Vec<u64>, cx: &TaskContext| {
            log.push(cx.tick);
            if cx.tick >= 5 { TaskFlow::Stop } else { TaskFlow::Continue }
        });
        let cancelled = scheduler.interval(1, 1, |log: &mut Vec<u64>, _: &TaskContext| {
            log.push(1000);
            TaskFlow::Continue
        });
        assert!(scheduler.cancel(cancelled));
        for _ in 0..10 {
            scheduler.advance(&mut log);
        }
        assert_eq!(log, vec![1, 3, 5]);
    }

    #[test]
    fn series_accumulates_delays() {
        let mut scheduler = Scheduler::<Vec<u64>>::new();
        let handles = scheduler
            .series()
            .run(|log: &mut Vec<u64>| log.push(0))
            .sleep(2)
            .run(|log: &mut Vec<u64>| log.push(2))
            .sleep(3)
            .run(|log: &mut Vec<u64>| log.push(5))
            .handles();
        assert_eq!(handles.len(), 3);
        let mut log = Vec::new();
        let mut ticks = Vec::new();
        for _ in 0..6 {
            let before = log.len();
            scheduler.advance(&mut log);
            if log.len() > before {
                ticks.push(scheduler.tick());
            }
        }
        assert_eq!(log, vec![0, 2, 5]);
        assert_eq!(ticks, vec![1, 2, 5]);
    }
}
