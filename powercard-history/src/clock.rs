use std::{cell::Cell, rc::Rc};

use chrono::{DateTime, Local, TimeDelta};

/// Source of the current time for bucketing, queries and retention.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock.
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock that only moves when told to.
#[derive(Clone, Debug)]
pub struct ManualClock(Cell<DateTime<Local>>);

impl ManualClock {
    #[must_use]
    pub const fn new(now: DateTime<Local>) -> Self {
        Self(Cell::new(now))
    }

    pub fn set(&self, now: DateTime<Local>) {
        self.0.set(now);
    }

    pub fn advance(&self, delta: TimeDelta) {
        self.0.set(self.0.get() + delta);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        self.0.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Local> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> DateTime<Local> {
        (**self).now()
    }
}
