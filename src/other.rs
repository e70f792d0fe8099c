use std::collections::HashSet;

use sdl2::keyboard::Keycode;

/// The current state of the keyboard.
#[derive(Default)]
pub struct KeyboardState {
    pub down: HashSet<Keycode>,
    /// Keys that went down since the start of this frame, even if already released.
    pub pressed: HashSet<Keycode>,
}

impl KeyboardState {
    /// Returns whether `key` is currently held down.
    pub fn is_down(&self, key: Keycode) -> bool {
        self.down.contains(&key)
    }

    /// Returns whether `key` went down during this frame.
    pub fn is_pressed(&self, key: Keycode) -> bool {
        self.pressed.contains(&key)
    }
}

/// Context provided to the scene during the update phase.
pub struct UpdateContext<'a> {
    pub keyboard: &'a KeyboardState,
}

impl<'a> UpdateContext<'a> {
    /// Creates a new `UpdateContext` from the given keyboard state.
    pub fn new(keyboard: &'a KeyboardState) -> Self {
        Self { keyboard }
    }
}
