//! Per-frame input snapshot
//!
//! Gameplay code reads logical actions from an `InputSnapshot` instead of
//! polling devices. The host feeds it press/release edges and the movement
//! axis; how physical keys map to actions is the host's business.

use glam::Vec2;
use rustc_hash::FxHashSet;

/// Logical actions gameplay code can query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum InputAction {
    /// Move left
    MoveLeft,
    /// Move right
    MoveRight,
    /// Move up
    MoveUp,
    /// Move down
    MoveDown,
    /// Jump
    Jump,
    /// Primary attack
    Attack,
    /// Dodge / dash
    Dash,
    /// Interact with objects
    Interact,
    /// Pause / menu
    Pause,
}

/// Snapshot of action state for the current frame.
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    /// Actions currently held
    pressed: FxHashSet<InputAction>,
    /// Actions that went down this frame
    just_pressed: FxHashSet<InputAction>,
    /// Actions that went up this frame
    just_released: FxHashSet<InputAction>,
    /// Analog movement, at most unit length
    axis: Vec2,
}

impl InputSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the start of each frame to clear per-frame edges.
    ///
    /// Held actions and the axis persist.
    pub fn begin_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }

    /// Record an action going down.
    pub fn press(&mut self, action: InputAction) {
        if self.pressed.insert(action) {
            self.just_pressed.insert(action);
        }
    }

    /// Record an action going up.
    pub fn release(&mut self, action: InputAction) {
        if self.pressed.remove(&action) {
            self.just_released.insert(action);
        }
    }

    /// Set the analog movement axis. Longer vectors are clamped to unit length.
    pub fn set_axis(&mut self, axis: Vec2) {
        self.axis = axis.clamp_length_max(1.0);
    }

    /// Movement direction: the analog axis if set, otherwise derived from
    /// the held digital directions.
    #[must_use]
    pub fn movement(&self) -> Vec2 {
        if self.axis != Vec2::ZERO {
            return self.axis;
        }

        let mut dir = Vec2::ZERO;
        if self.is_pressed(InputAction::MoveLeft) {
            dir.x -= 1.0;
        }
        if self.is_pressed(InputAction::MoveRight) {
            dir.x += 1.0;
        }
        if self.is_pressed(InputAction::MoveUp) {
            dir.y += 1.0;
        }
        if self.is_pressed(InputAction::MoveDown) {
            dir.y -= 1.0;
        }
        dir.normalize_or_zero()
    }

    #[must_use]
    pub fn is_pressed(&self, action: InputAction) -> bool {
        self.pressed.contains(&action)
    }

    #[must_use]
    pub fn is_just_pressed(&self, action: InputAction) -> bool {
        self.just_pressed.contains(&action)
    }

    #[must_use]
    pub fn is_just_released(&self, action: InputAction) -> bool {
        self.just_released.contains(&action)
    }

    /// Release everything and zero the axis (e.g. on focus loss).
    pub fn clear(&mut self) {
        self.pressed.clear();
        self.just_pressed.clear();
        self.just_released.clear();
        self.axis = Vec2::ZERO;
    }
}
