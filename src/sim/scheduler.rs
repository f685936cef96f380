//! Cancellable delayed actions on the simulation clock
//!
//! Every delay and cadence in the session (stage-transition delays, the spawn
//! cadence, the collection-sampling cadence, hint timers) is an entry here.
//! The scheduler runs on the same fixed timestep as the rest of the sim, so
//! a seeded session replays its timers exactly.

/// Opaque cancellation token returned by [`Scheduler::once`] / [`Scheduler::every`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionHandle(u64);

#[derive(Debug, Clone)]
struct Entry<A> {
    handle: ActionHandle,
    /// Seconds until the next fire
    remaining: f32,
    /// Re-arm interval; `None` for one-shots
    interval: Option<f32>,
    action: A,
}

/// Tick-driven scheduler for one-shot and repeating actions.
///
/// Actions are plain values handed back from [`Scheduler::tick`]; the owner
/// dispatches them. Handles stay monotonic across [`Scheduler::cancel_all`]
/// so a token held over a restart can never cancel a newer entry.
#[derive(Debug, Clone)]
pub struct Scheduler<A> {
    entries: Vec<Entry<A>>,
    next_handle: u64,
}

impl<A: Copy> Scheduler<A> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_handle: 1,
        }
    }

    fn alloc_handle(&mut self) -> ActionHandle {
        let handle = ActionHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Schedule `action` once, `delay` seconds from now
    pub fn once(&mut self, delay: f32, action: A) -> ActionHandle {
        let handle = self.alloc_handle();
        self.entries.push(Entry {
            handle,
            remaining: delay.max(0.0),
            interval: None,
            action,
        });
        handle
    }

    /// Schedule `action` repeatedly, first firing one full `interval` from now
    pub fn every(&mut self, interval: f32, action: A) -> ActionHandle {
        let handle = self.alloc_handle();
        let interval = interval.max(f32::EPSILON);
        self.entries.push(Entry {
            handle,
            remaining: interval,
            interval: Some(interval),
            action,
        });
        handle
    }

    /// Cancel a pending entry. Unknown or already-fired handles are a no-op.
    pub fn cancel(&mut self, handle: ActionHandle) {
        self.entries.retain(|e| e.handle != handle);
    }

    /// Drop every pending entry. The restart/teardown path; all-or-nothing.
    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    /// Number of pending entries
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Advance the clock by `dt` seconds and drain due actions in schedule order
    pub fn tick(&mut self, dt: f32) -> Vec<A> {
        let mut due = Vec::new();
        for entry in &mut self.entries {
            entry.remaining -= dt;
            while entry.remaining <= 0.0 {
                due.push(entry.action);
                match entry.interval {
                    Some(interval) => entry.remaining += interval,
                    None => break,
                }
            }
        }
        self.entries
            .retain(|e| e.interval.is_some() || e.remaining > 0.0);
        due
    }
}

impl<A: Copy> Default for Scheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Act {
        A,
        B,
    }

    fn run(sched: &mut Scheduler<Act>, secs: f32) -> Vec<Act> {
        let mut fired = Vec::new();
        let steps = (secs / DT).round() as u32;
        for _ in 0..steps {
            fired.extend(sched.tick(DT));
        }
        fired
    }

    #[test]
    fn test_once_fires_once() {
        let mut sched = Scheduler::new();
        sched.once(0.5, Act::A);
        assert_eq!(run(&mut sched, 0.4), vec![]);
        assert_eq!(run(&mut sched, 0.2), vec![Act::A]);
        assert_eq!(run(&mut sched, 2.0), vec![]);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn test_every_repeats() {
        let mut sched = Scheduler::new();
        sched.every(0.5, Act::B);
        let fired = run(&mut sched, 1.6);
        assert_eq!(fired, vec![Act::B, Act::B, Act::B]);
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn test_cancel_prevents_fire() {
        let mut sched = Scheduler::new();
        let a = sched.once(0.5, Act::A);
        sched.every(0.25, Act::B);
        sched.cancel(a);
        let fired = run(&mut sched, 1.0);
        assert!(fired.iter().all(|&act| act == Act::B));
        // Cancelling again is a no-op
        sched.cancel(a);
    }

    #[test]
    fn test_cancel_all_is_total() {
        let mut sched = Scheduler::new();
        sched.once(0.1, Act::A);
        sched.every(0.1, Act::B);
        sched.cancel_all();
        assert_eq!(sched.pending(), 0);
        assert_eq!(run(&mut sched, 1.0), vec![]);
    }

    #[test]
    fn test_handles_stay_monotonic_across_cancel_all() {
        let mut sched = Scheduler::new();
        let stale = sched.once(10.0, Act::A);
        sched.cancel_all();
        let fresh = sched.once(0.1, Act::B);
        assert_ne!(stale, fresh);
        // A stale token must not touch the new entry
        sched.cancel(stale);
        assert_eq!(sched.pending(), 1);
    }
}
