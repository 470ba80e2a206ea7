//! Deferred actions keyed by fire time and session generation.
//!
//! Stands in for wall-clock timers. Every task remembers the session
//! generation it was scheduled in; the session drops tasks whose generation
//! no longer matches when they come due, so a reset never has to cancel
//! anything explicitly.

/// Work that runs some time after it was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeferredAction {
    /// Automatic branching after a nutrient absorption.
    CreateBranch,
    /// Replacement for an absorbed water unit.
    RespawnWater,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledTask {
    pub fire_at: f64,
    pub generation: u64,
    pub action: DeferredAction,
}

/// Queue of pending tasks plus the clock they are measured against.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: f64,
    tasks: Vec<ScheduledTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds elapsed on this scheduler's clock.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &ScheduledTask> {
        self.tasks.iter()
    }

    /// Queues `action` to fire `delay` seconds from now.
    pub fn schedule(&mut self, delay: f64, generation: u64, action: DeferredAction) {
        self.tasks.push(ScheduledTask {
            fire_at: self.now + delay.max(0.0),
            generation,
            action,
        });
    }

    /// Moves the clock forward by `dt` seconds.
    ///
    /// ### Returns
    /// Every task that came due, earliest first. Ties keep their
    /// scheduling order.
    pub fn advance(&mut self, dt: f64) -> Vec<ScheduledTask> {
        self.now += dt.max(0.0);
        let now = self.now;

        let mut due: Vec<ScheduledTask> = Vec::new();
        self.tasks.retain(|t| {
            if t.fire_at <= now {
                due.push(*t);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.fire_at.total_cmp(&b.fire_at));
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_fire_only_when_due() {
        let mut s = Scheduler::new();
        s.schedule(0.5, 0, DeferredAction::CreateBranch);

        assert!(s.advance(0.25).is_empty());
        assert_eq!(s.len(), 1);

        let due = s.advance(0.25);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].action, DeferredAction::CreateBranch);
        assert!(s.is_empty());
    }

    #[test]
    fn due_tasks_come_out_in_fire_order() {
        let mut s = Scheduler::new();
        s.schedule(3.0, 1, DeferredAction::RespawnWater);
        s.schedule(1.0, 1, DeferredAction::CreateBranch);
        s.schedule(2.0, 2, DeferredAction::RespawnWater);

        let due = s.advance(5.0);
        let times: Vec<f64> = due.iter().map(|t| t.fire_at).collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
        assert_eq!(due[1].generation, 2);
    }

    #[test]
    fn negative_inputs_do_not_rewind() {
        let mut s = Scheduler::new();
        s.advance(1.0);
        s.advance(-4.0);
        assert_eq!(s.now(), 1.0);

        s.schedule(-2.0, 0, DeferredAction::RespawnWater);
        assert_eq!(s.pending().next().map(|t| t.fire_at), Some(1.0));
        assert_eq!(s.advance(0.0).len(), 1);
    }
}
