use super::locomotion::LocomotionState;

/// Length of the weight ramp when settling back into the idle pose.
pub const IDLE_BLEND_TICKS: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Idle,
    Moving,
}

/// Load progress of a representation's asset. Loads complete (or fail)
/// via notifications; the machine never blocks on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Pending,
    Ready,
    Failed,
}

/// What the renderer should show this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCommand {
    pub representation: Representation,
    pub clip_phase_ticks: f64,
    pub playback_rate: f64,
    pub blend_weight: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct ClipCursor {
    phase_ticks: f64,
    playing: bool,
}

/// Edge-triggered idle/moving swap with per-representation load status.
/// Transitions fire only when `is_moving` changes; while a desired
/// representation has not loaded, the machine falls back to the one that
/// has, and goes quiet when neither is available.
#[derive(Debug, Default)]
pub struct AppearanceStateMachine {
    moving_active: bool,
    idle_status: LoadStatus,
    moving_status: LoadStatus,
    idle_clip: ClipCursor,
    moving_clip: ClipCursor,
    blend_remaining_ticks: f64,
}

impl AppearanceStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Representation {
        if self.moving_active {
            Representation::Moving
        } else {
            Representation::Idle
        }
    }

    pub fn load_status(&self, representation: Representation) -> LoadStatus {
        match representation {
            Representation::Idle => self.idle_status,
            Representation::Moving => self.moving_status,
        }
    }

    pub fn mark_loaded(&mut self, representation: Representation) {
        match representation {
            Representation::Idle => self.idle_status = LoadStatus::Ready,
            Representation::Moving => self.moving_status = LoadStatus::Ready,
        }
    }

    pub fn mark_failed(&mut self, representation: Representation) {
        match representation {
            Representation::Idle => self.idle_status = LoadStatus::Failed,
            Representation::Moving => self.moving_status = LoadStatus::Failed,
        }
    }

    /// Advances the machine one tick against the latest locomotion state.
    /// Returns `None` when no loaded representation can be shown.
    pub fn update(&mut self, motion: &LocomotionState, dt_ticks: f64) -> Option<RenderCommand> {
        if !dt_ticks.is_finite() || dt_ticks < 0.0 {
            return self.command_for_current(motion);
        }

        if motion.is_moving != self.moving_active {
            if motion.is_moving {
                // Re-entering Moving while the walk clip is still winding
                // down must not restart it.
                if !self.moving_clip.playing {
                    self.moving_clip = ClipCursor {
                        phase_ticks: 0.0,
                        playing: true,
                    };
                }
                self.blend_remaining_ticks = 0.0;
            } else {
                self.idle_clip.playing = true;
                self.blend_remaining_ticks = IDLE_BLEND_TICKS;
            }
            self.moving_active = motion.is_moving;
        }

        let rate = if motion.speed < 0.0 { -1.0 } else { 1.0 };
        if self.moving_active {
            self.moving_clip.phase_ticks += rate * dt_ticks;
        } else {
            self.idle_clip.phase_ticks += dt_ticks;
            if self.blend_remaining_ticks > 0.0 {
                // The walk clip keeps advancing underneath the ramp.
                self.moving_clip.phase_ticks += rate * dt_ticks;
                self.blend_remaining_ticks = (self.blend_remaining_ticks - dt_ticks).max(0.0);
            } else {
                self.moving_clip.playing = false;
            }
        }

        self.command_for_current(motion)
    }

    fn command_for_current(&self, motion: &LocomotionState) -> Option<RenderCommand> {
        let desired = self.state();
        let shown = self.available_representation(desired)?;

        let (clip_phase_ticks, playback_rate) = match shown {
            Representation::Moving => (
                self.moving_clip.phase_ticks,
                if motion.speed < 0.0 { -1.0 } else { 1.0 },
            ),
            Representation::Idle => (self.idle_clip.phase_ticks, 1.0),
        };

        let blend_weight = if desired == Representation::Idle
            && shown == Representation::Idle
            && self.blend_remaining_ticks > 0.0
        {
            1.0 - self.blend_remaining_ticks / IDLE_BLEND_TICKS
        } else {
            1.0
        };

        Some(RenderCommand {
            representation: shown,
            clip_phase_ticks,
            playback_rate,
            blend_weight,
        })
    }

    fn available_representation(&self, desired: Representation) -> Option<Representation> {
        let fallback = match desired {
            Representation::Idle => Representation::Moving,
            Representation::Moving => Representation::Idle,
        };
        if self.load_status(desired) == LoadStatus::Ready {
            Some(desired)
        } else if self.load_status(fallback) == LoadStatus::Ready {
            Some(fallback)
        } else {
            None
        }
    }
}
