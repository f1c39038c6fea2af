//! Latest target coordinate, shared between the bus dispatch thread (writer)
//! and the render loop (reader).
//!
//! Both sides hold the lock only for a two-field copy. There is no history:
//! updates landing between two reads are superseded by the newest one.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::types::Point;

/// Snapshot of the aim point.
pub type TargetPoint = Point;

#[derive(Debug, Default)]
pub struct TargetChannel {
    // (0,0) until the first message arrives
    latest: Mutex<TargetPoint>,
}

impl TargetChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a known point instead of the (0,0) default.
    pub fn with_initial(point: TargetPoint) -> Self {
        Self { latest: Mutex::new(point) }
    }

    pub fn set(&self, x: i32, y: i32) {
        *self.guard() = Point::new(x, y);
    }

    pub fn get(&self) -> TargetPoint {
        *self.guard()
    }

    // A panicking writer cannot leave half a pair behind: the store is a
    // single Copy assignment, so a poisoned lock still guards a whole value.
    fn guard(&self) -> MutexGuard<'_, TargetPoint> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
