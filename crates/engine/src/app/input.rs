#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    RotateLeft,
    RotateRight,
    Quit,
}

const ACTION_COUNT: usize = 7;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::RotateLeft => 4,
            InputAction::RotateRight => 5,
            InputAction::Quit => 6,
        }
    }
}

/// Input state handed to one tick: held actions plus rotation presses that
/// happened since the previous tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    actions: ActionStates,
    rotate_left_pressed: bool,
    rotate_right_pressed: bool,
    quit_requested: bool,
}

impl InputSnapshot {
    pub(crate) fn new(
        actions: ActionStates,
        rotate_left_pressed: bool,
        rotate_right_pressed: bool,
        quit_requested: bool,
    ) -> Self {
        Self {
            actions,
            rotate_left_pressed,
            rotate_right_pressed,
            quit_requested,
        }
    }

    /// Snapshot with the given actions held; for driving games without a window.
    pub fn with_held(held: &[InputAction]) -> Self {
        let mut actions = ActionStates::default();
        for action in held {
            actions.set(*action, true);
        }
        Self {
            actions,
            ..Self::default()
        }
    }

    pub fn with_rotate_pressed(mut self, left: bool, right: bool) -> Self {
        self.rotate_left_pressed = left;
        self.rotate_right_pressed = right;
        self
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn rotate_left_pressed(&self) -> bool {
        self.rotate_left_pressed
    }

    pub fn rotate_right_pressed(&self) -> bool {
        self.rotate_right_pressed
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }
}
