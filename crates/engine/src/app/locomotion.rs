use super::geo::LocalPoint;
use super::input::MotionIntent;

/// Forward/backward speed in scene units per fixed tick.
pub const AVATAR_SPEED_UNITS_PER_TICK: f64 = 0.1;

/// Yaw rate in radians per fixed tick.
pub const TURN_SPEED_RADIANS_PER_TICK: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionConfig {
    pub speed: f64,
    pub turn_speed: f64,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            speed: AVATAR_SPEED_UNITS_PER_TICK,
            turn_speed: TURN_SPEED_RADIANS_PER_TICK,
        }
    }
}

/// Avatar pose after a tick. `heading` is counter-clockwise yaw in
/// radians, unclamped. `speed` is the signed translation applied this
/// tick in units per tick (negative when walking backward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionState {
    pub position: LocalPoint,
    pub heading: f64,
    pub speed: f64,
    pub is_moving: bool,
}

impl LocomotionState {
    pub fn at(position: LocalPoint, heading: f64) -> Self {
        Self {
            position,
            heading,
            speed: 0.0,
            is_moving: false,
        }
    }
}

impl Default for LocomotionState {
    fn default() -> Self {
        Self::at(LocalPoint::default(), 0.0)
    }
}

/// Pure locomotion transition. The displacement uses the heading as it
/// was at the start of the tick, so a simultaneous turn-and-move tick
/// translates along a straight segment.
pub fn step(
    state: LocomotionState,
    config: LocomotionConfig,
    intent: MotionIntent,
    dt_ticks: f64,
) -> LocomotionState {
    if !dt_ticks.is_finite() || dt_ticks < 0.0 {
        return state;
    }

    let heading_at_start = state.heading;

    let mut translation = 0.0;
    if intent.forward {
        translation += 1.0;
    }
    if intent.backward {
        translation -= 1.0;
    }
    let applied_speed = translation * config.speed;
    let step_length = applied_speed * dt_ticks;

    // Forward at heading 0 points down -z; positive heading swings the
    // forward vector toward -x.
    let (sin_h, cos_h) = heading_at_start.sin_cos();
    let mut position = state.position;
    position.x -= sin_h * step_length;
    position.z -= cos_h * step_length;
    if !position.is_finite() {
        position = state.position;
    }

    let mut turn = 0.0;
    if intent.turn_left {
        turn += 1.0;
    }
    if intent.turn_right {
        turn -= 1.0;
    }
    let mut heading = heading_at_start + turn * config.turn_speed * dt_ticks;
    if !heading.is_finite() {
        heading = heading_at_start;
    }

    LocomotionState {
        position,
        heading,
        speed: applied_speed,
        is_moving: intent.wants_translation(),
    }
}

/// Owns the avatar pose and advances it once per tick.
#[derive(Debug)]
pub struct LocomotionController {
    config: LocomotionConfig,
    state: LocomotionState,
}

impl LocomotionController {
    pub fn new(config: LocomotionConfig, initial: LocomotionState) -> Self {
        Self {
            config,
            state: initial,
        }
    }

    pub fn state(&self) -> LocomotionState {
        self.state
    }

    /// Writes the position back, e.g. after a bounds correction.
    pub fn set_position(&mut self, position: LocalPoint) {
        if position.is_finite() {
            self.state.position = position;
        }
    }

    pub fn tick(&mut self, intent: MotionIntent, dt_ticks: f64) -> LocomotionState {
        self.state = step(self.state, self.config, intent, dt_ticks);
        self.state
    }
}
