//! Step clock shared between the tick interrupt and the foreground.

use core::cell::RefCell;

use critical_section::Mutex;

use super::clock::{ArmCommand, ClockEvent, ClockSnapshot, StepClock, Tick};

/// A [`StepClock`] behind a critical-section mutex.
///
/// Every access runs inside a critical section, so a foreground command is
/// never observed half-applied by the tick handler. Can live in a `static`.
pub struct SharedClock {
    inner: Mutex<RefCell<StepClock>>,
}

impl Default for SharedClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedClock {
    /// Create a stopped clock at position 0.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(StepClock::new())),
        }
    }

    /// Advance one tick. Call from the periodic timer interrupt.
    #[inline]
    pub fn tick(&self) -> Tick {
        self.with(StepClock::tick)
    }

    /// Apply a command atomically with respect to `tick`.
    pub fn apply(&self, command: ArmCommand) -> bool {
        self.with(|clock| clock.apply(command))
    }

    /// Take the latched event, if any.
    pub fn take_event(&self) -> Option<ClockEvent> {
        self.with(StepClock::take_event)
    }

    /// Consistent copy of the clock state.
    pub fn snapshot(&self) -> ClockSnapshot {
        self.with(|clock| clock.snapshot())
    }

    /// Current position.
    pub fn position(&self) -> i32 {
        self.with(|clock| clock.position())
    }

    /// Whether a move or dwell is in progress.
    pub fn is_busy(&self) -> bool {
        self.with(|clock| clock.is_busy())
    }

    /// Run `f` with exclusive access to the clock.
    pub fn with<R>(&self, f: impl FnOnce(&mut StepClock) -> R) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }
}
