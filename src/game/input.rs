//! Input contract
//!
//! The input collaborator produces discrete intent events; the core keeps
//! only a per-tick boolean map of held actions and never reads raw
//! keyboard or pointer state.

use serde::{Deserialize, Serialize};

/// Discrete actions the host can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputAction {
    Left,
    Right,
    Jump,
    Shoot,
}

/// One intent event from the input collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputIntent {
    pub action: InputAction,
    pub pressed: bool,
}

/// Per-tick boolean map of held actions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub shoot: bool,
}

impl InputState {
    /// Fold one intent event into the held-action map
    pub fn apply(&mut self, intent: InputIntent) {
        match intent.action {
            InputAction::Left => self.left = intent.pressed,
            InputAction::Right => self.right = intent.pressed,
            InputAction::Jump => self.jump = intent.pressed,
            InputAction::Shoot => self.shoot = intent.pressed,
        }
    }

    /// Signed horizontal direction: -1 left, +1 right, 0 neutral/both
    pub fn direction(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    pub fn any_held(&self) -> bool {
        self.left || self.right || self.jump || self.shoot
    }
}
