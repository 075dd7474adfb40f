//! Action.
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Admissible acceleration.
pub const ACCELERATION_RANGE: RangeInclusive<f32> = 0.0..=1.0;

/// Admissible steering, negative values turn left.
pub const STEERING_RANGE: RangeInclusive<f32> = -1.0..=1.0;

/// Admissible brake.
pub const BRAKE_RANGE: RangeInclusive<f32> = 0.0..=0.2;

/// Control command applied to the tractor for one step.
///
/// The ranges [`ACCELERATION_RANGE`], [`STEERING_RANGE`] and [`BRAKE_RANGE`]
/// must hold before an action is sent; use [`Action::clamped`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Throttle.
    pub acceleration: f32,

    /// Steering wheel position.
    pub steering: f32,

    /// Brake pressure.
    pub brake: f32,
}

/// Auxiliary flags of the action message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActionFlags {
    /// Requests four wheel drive.
    pub four_wheel_drive: bool,

    /// Asks the simulator to restart the episode.
    pub reset_episode: bool,
}

fn clamp_to(v: f32, range: &RangeInclusive<f32>) -> f32 {
    if v.is_nan() {
        *range.start()
    } else {
        v.clamp(*range.start(), *range.end())
    }
}

impl Action {
    /// Creates an action without clamping.
    pub fn new(acceleration: f32, steering: f32, brake: f32) -> Self {
        Self {
            acceleration,
            steering,
            brake,
        }
    }

    /// Creates an action from raw values, clamping each component to its range.
    ///
    /// A NaN component is replaced by the lower bound of its range.
    pub fn clamped(acceleration: f32, steering: f32, brake: f32) -> Self {
        Self {
            acceleration: clamp_to(acceleration, &ACCELERATION_RANGE),
            steering: clamp_to(steering, &STEERING_RANGE),
            brake: clamp_to(brake, &BRAKE_RANGE),
        }
    }

    /// Returns this action with every component clamped to its range.
    pub fn clamp(self) -> Self {
        Self::clamped(self.acceleration, self.steering, self.brake)
    }

    /// Returns `true` if every component lies in its range.
    pub fn is_valid(&self) -> bool {
        ACCELERATION_RANGE.contains(&self.acceleration)
            && STEERING_RANGE.contains(&self.steering)
            && BRAKE_RANGE.contains(&self.brake)
    }

    /// Returns the components as `[acceleration, steering, brake]`.
    pub fn to_array(&self) -> [f32; 3] {
        [self.acceleration, self.steering, self.brake]
    }
}

impl From<[f32; 3]> for Action {
    fn from(v: [f32; 3]) -> Self {
        Self::clamped(v[0], v[1], v[2])
    }
}
