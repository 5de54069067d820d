//! One-shot tasks deferred on the simulation timeline
//!
//! The only genuine concurrency in the game - the clear timer and the
//! fade-then-restore peg sequence - is modeled as tasks scheduled in ticks
//! and drained once per `advance`, never as spawned threads.

use serde::{Deserialize, Serialize};

use crate::consts::SIM_DT;
use crate::ecs::Entity;

/// Handle to a pending one-shot timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

/// Deferred work the clear protocol schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// The resting ball's clear timer fired
    ClearFire { ball: Entity },
    /// Re-check whether the ball has settled past a faded peg
    RestorePeg { peg: Entity, ball: Entity },
}

#[derive(Debug, Clone)]
struct Pending {
    id: TimerId,
    due_tick: u64,
    task: Task,
}

/// Single-threaded one-shot scheduler, advanced once per simulation tick
#[derive(Debug, Default, Clone)]
pub struct Scheduler {
    now: u64,
    next_id: u64,
    pending: Vec<Pending>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedule a task `seconds` from now, rounded up to whole ticks
    pub fn schedule_in(&mut self, seconds: f32, task: Task) -> TimerId {
        let ticks = (seconds / SIM_DT).ceil().max(1.0) as u64;
        self.schedule_in_ticks(ticks, task)
    }

    pub fn schedule_in_ticks(&mut self, ticks: u64, task: Task) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due_tick: self.now + ticks.max(1),
            task,
        });
        id
    }

    /// Invalidate a pending timer; firing an already-drained or cancelled
    /// id is a no-op
    pub fn cancel(&mut self, id: TimerId) {
        self.pending.retain(|p| p.id != id);
    }

    /// Advance one tick and drain every task that came due, in schedule order
    pub fn tick(&mut self) -> Vec<Task> {
        self.now += 1;
        let now = self.now;
        let mut due = Vec::new();
        self.pending.retain(|p| {
            if p.due_tick <= now {
                due.push(p.task);
                false
            } else {
                true
            }
        });
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(i: u32) -> Entity {
        Entity::from_parts(i, 0)
    }

    #[test]
    fn test_fires_once_at_due_tick() {
        let mut sched = Scheduler::new();
        sched.schedule_in_ticks(2, Task::ClearFire { ball: ball(1) });

        assert!(sched.tick().is_empty());
        assert_eq!(sched.tick(), vec![Task::ClearFire { ball: ball(1) }]);
        assert!(sched.tick().is_empty());
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let mut sched = Scheduler::new();
        let id = sched.schedule_in_ticks(1, Task::ClearFire { ball: ball(1) });
        sched.cancel(id);
        assert!(sched.tick().is_empty());
    }

    #[test]
    fn test_seconds_round_up_to_ticks() {
        let mut sched = Scheduler::new();
        // Half a tick rounds up to one full tick
        sched.schedule_in(SIM_DT * 0.5, Task::ClearFire { ball: ball(2) });
        assert_eq!(sched.tick().len(), 1);
    }
}
