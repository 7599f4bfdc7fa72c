//! Motion state of the axis.

use crate::motion::Direction;

/// What the axis is doing.
///
/// The driver-enable flag and the program-running flag are tracked
/// separately; this enum only says what the clock was last asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionState {
    /// Ready for commands.
    #[default]
    Idle,
    /// Executing a move to an absolute position.
    Moving,
    /// Executing a move to position 0.
    Homing,
    /// Moving toward a far-away target until told to stop.
    Jogging(Direction),
    /// Counting down a program dwell.
    Dwelling,
}

impl MotionState {
    /// Get the state name as a static string.
    pub fn name(&self) -> &'static str {
        match self {
            MotionState::Idle => "Idle",
            MotionState::Moving => "Moving",
            MotionState::Homing => "Homing",
            MotionState::Jogging(_) => "Jogging",
            MotionState::Dwelling => "Dwelling",
        }
    }

    /// Check for the idle state.
    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, MotionState::Idle)
    }

    /// Check whether the clock is executing a move in this state.
    #[inline]
    pub fn is_moving(&self) -> bool {
        matches!(
            self,
            MotionState::Moving | MotionState::Homing | MotionState::Jogging(_)
        )
    }
}
