use std::{cell::Cell, rc::Rc};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Stop,
}

pub trait Scheduler {
    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerId;
    fn set_interval(&self, period_ms: u32, callback: Box<dyn FnMut() -> Tick>) -> TimerId;
    /// Unknown or already finished ids are ignored.
    fn clear(&self, id: TimerId);
}

/// Collapses a burst of triggers into one action fired after `wait_ms` of quiet.
pub struct Debouncer {
    wait_ms: u32,
    pending: Cell<Option<TimerId>>,
}

impl Debouncer {
    pub fn new(wait_ms: u32) -> Self {
        Self {
            wait_ms,
            pending: Cell::new(None),
        }
    }

    pub fn trigger<S: Scheduler + ?Sized>(&self, scheduler: &S, action: Box<dyn FnOnce()>) {
        self.cancel(scheduler);
        self.pending
            .set(Some(scheduler.set_timeout(self.wait_ms, action)));
    }

    pub fn cancel<S: Scheduler + ?Sized>(&self, scheduler: &S) {
        if let Some(id) = self.pending.take() {
            scheduler.clear(id);
        }
    }
}

// A zero window admits everything.
pub struct Throttle {
    limit_ms: u32,
    closed: Rc<Cell<bool>>,
}

impl Throttle {
    pub fn new(limit_ms: u32) -> Self {
        Self {
            limit_ms,
            closed: Rc::new(Cell::new(false)),
        }
    }

    pub fn admit<S: Scheduler + ?Sized>(&self, scheduler: &S) -> bool {
        if self.limit_ms == 0 {
            return true;
        }
        if self.closed.get() {
            return false;
        }

        self.closed.set(true);
        let closed = Rc::clone(&self.closed);
        scheduler.set_timeout(self.limit_ms, Box::new(move || closed.set(false)));
        true
    }
}
