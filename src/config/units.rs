//! Unit types for physical quantities.
//!
//! Keeps step rates and step accelerations apart at compile time. Positions
//! are plain `i32` step counts.

use serde::{Deserialize, Serialize};

/// Speed in steps per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct StepsPerSec(pub u32);

/// Acceleration in steps per second squared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct StepsPerSecSquared(pub u32);
