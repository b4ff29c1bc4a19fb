/// Held avatar controls, tracked as key-down state between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvatarAction {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
}

const ACTION_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, Default)]
pub struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub fn set(&mut self, action: AvatarAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub fn is_down(&self, action: AvatarAction) -> bool {
        self.down[action.index()]
    }
}

impl AvatarAction {
    const fn index(self) -> usize {
        match self {
            AvatarAction::Forward => 0,
            AvatarAction::Backward => 1,
            AvatarAction::TurnLeft => 2,
            AvatarAction::TurnRight => 3,
        }
    }
}

/// Motion controls as read once at the start of a tick. Mutated only at
/// input edges; the locomotion step never sees mid-tick changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionIntent {
    pub forward: bool,
    pub backward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

impl MotionIntent {
    pub fn from_actions(actions: &ActionStates) -> Self {
        Self {
            forward: actions.is_down(AvatarAction::Forward),
            backward: actions.is_down(AvatarAction::Backward),
            turn_left: actions.is_down(AvatarAction::TurnLeft),
            turn_right: actions.is_down(AvatarAction::TurnRight),
        }
    }

    pub fn wants_translation(&self) -> bool {
        self.forward || self.backward
    }
}

/// Everything the session consumes for one tick: held motion intent plus
/// one-shot edges that clear once snapshotted.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    intent: MotionIntent,
    collect_pressed: bool,
    reset_view_pressed: bool,
    quit_requested: bool,
}

impl TickInput {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_intent(mut self, intent: MotionIntent) -> Self {
        self.intent = intent;
        self
    }

    pub fn with_collect_pressed(mut self, pressed: bool) -> Self {
        self.collect_pressed = pressed;
        self
    }

    pub fn with_reset_view_pressed(mut self, pressed: bool) -> Self {
        self.reset_view_pressed = pressed;
        self
    }

    pub fn with_quit_requested(mut self, requested: bool) -> Self {
        self.quit_requested = requested;
        self
    }

    pub fn intent(&self) -> MotionIntent {
        self.intent
    }

    pub fn collect_pressed(&self) -> bool {
        self.collect_pressed
    }

    pub fn reset_view_pressed(&self) -> bool {
        self.reset_view_pressed
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }
}
