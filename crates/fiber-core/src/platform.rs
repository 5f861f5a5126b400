//! Platform abstraction traits for idle-time scheduling.
//!
//! The engine never talks to a concrete event loop. A host grants it time
//! through an [`IdleDeadline`]; the scheduler turns that grant into a
//! [`WorkBudget`] and asks the host for another grant through
//! [`IdleScheduler`] whenever work remains.

use std::time::Duration;

/// Requests idle-time callbacks from the host.
///
/// Implementations must be safe to use from multiple threads.
pub trait IdleScheduler: Send + Sync {
    /// Ask the host to grant the engine another slice of idle time.
    fn request_idle_callback(&self);
}

/// Scheduler that never calls back; hosts drive the root manually.
#[derive(Debug, Default)]
pub struct DefaultScheduler;

impl IdleScheduler for DefaultScheduler {
    fn request_idle_callback(&self) {}
}

/// The time left in the current grant.
pub trait IdleDeadline {
    fn time_remaining(&self) -> Duration;
}

/// Decides when the work loop hands control back to the host.
///
/// Consulted after every completed unit of work, so a grant always
/// performs at least one unit.
pub trait WorkBudget {
    fn should_yield(&mut self) -> bool;
}

/// Yields once the deadline has less than `threshold` left, or after
/// `max_units` units when a cap is configured.
pub struct DeadlineBudget<'a, D: IdleDeadline + ?Sized> {
    deadline: &'a D,
    threshold: Duration,
    max_units: Option<usize>,
    units: usize,
}

impl<'a, D: IdleDeadline + ?Sized> DeadlineBudget<'a, D> {
    pub fn new(deadline: &'a D, threshold: Duration) -> Self {
        Self {
            deadline,
            threshold,
            max_units: None,
            units: 0,
        }
    }

    pub fn with_max_units(mut self, max_units: Option<usize>) -> Self {
        self.max_units = max_units;
        self
    }
}

impl<D: IdleDeadline + ?Sized> WorkBudget for DeadlineBudget<'_, D> {
    fn should_yield(&mut self) -> bool {
        self.units += 1;
        if self.max_units.is_some_and(|max| self.units >= max) {
            return true;
        }
        self.deadline.time_remaining() < self.threshold
    }
}

/// Yields after a fixed number of units; deterministic hosts and tests use
/// it to interrupt a pass at an exact position.
#[derive(Debug, Clone, Copy)]
pub struct UnitBudget {
    remaining: usize,
}

impl UnitBudget {
    pub fn new(units: usize) -> Self {
        Self { remaining: units }
    }
}

impl WorkBudget for UnitBudget {
    fn should_yield(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }
}

/// Never yields.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unbounded;

impl WorkBudget for Unbounded {
    fn should_yield(&mut self) -> bool {
        false
    }
}

impl IdleDeadline for Duration {
    fn time_remaining(&self) -> Duration {
        *self
    }
}
