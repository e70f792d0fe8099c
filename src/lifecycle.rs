//! Window lifecycle state machine.
//!
//! A window starts [`WindowState::Uninitialized`], becomes
//! [`WindowState::Loaded`] once its GPU objects exist, [`WindowState::Running`]
//! after its first frame, [`WindowState::Closing`] when a close is requested
//! and [`WindowState::Unloaded`] after its resources are released.

use sdl2::keyboard::Keycode;

use crate::other::KeyboardState;

/// Holding this key on an update tick, or tapping it since the last one, closes the window.
pub const CLOSE_KEY: Keycode = Keycode::Escape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Uninitialized,
    Loaded,
    Running,
    Closing,
    Unloaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Load,
    Frame,
    CloseRequested,
    Unload,
}

impl WindowState {
    /// The state reached from `self` on `event`, or `None` if the event is not
    /// valid in this state.
    pub fn next(self, event: LifecycleEvent) -> Option<WindowState> {
        use LifecycleEvent::*;
        use WindowState::*;

        match (self, event) {
            (Uninitialized, Load) => Some(Loaded),
            (Loaded | Running, Frame) => Some(Running),
            (Loaded | Running | Closing, CloseRequested) => Some(Closing),
            (Uninitialized | Loaded | Running | Closing, Unload) => Some(Unloaded),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Lifecycle {
    state: WindowState,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            state: WindowState::Uninitialized,
        }
    }
}

impl Lifecycle {
    pub fn state(&self) -> WindowState {
        self.state
    }

    /// Applies `event`. Events that are invalid in the current state are
    /// logged and ignored.
    pub fn handle(&mut self, event: LifecycleEvent) -> WindowState {
        match self.state.next(event) {
            Some(next) => {
                if next != self.state {
                    log::debug!("window state {:?} -> {:?}", self.state, next);
                }
                self.state = next;
            }
            None => log::warn!("ignoring {event:?} in window state {:?}", self.state),
        }
        self.state
    }

    /// Runs the per-tick input check, requesting close if [`CLOSE_KEY`] is held
    /// or was tapped since the last tick.
    pub fn update(&mut self, keyboard: &KeyboardState) -> WindowState {
        let close = keyboard.is_down(CLOSE_KEY) || keyboard.is_pressed(CLOSE_KEY);
        if close && self.state != WindowState::Closing {
            log::info!("close key pressed");
            self.handle(LifecycleEvent::CloseRequested);
        }
        self.state
    }

    /// Whether the window should stop after this tick.
    pub fn should_close(&self) -> bool {
        matches!(self.state, WindowState::Closing | WindowState::Unloaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyboard_with(keys: &[Keycode]) -> KeyboardState {
        let mut keyboard = KeyboardState::default();
        keyboard.down.extend(keys.iter().copied());
        keyboard
    }

    #[test]
    fn test_full_lifecycle() {
        let mut lifecycle = Lifecycle::default();
        assert_eq!(lifecycle.state(), WindowState::Uninitialized);
        assert_eq!(lifecycle.handle(LifecycleEvent::Load), WindowState::Loaded);
        assert_eq!(lifecycle.handle(LifecycleEvent::Frame), WindowState::Running);
        assert_eq!(lifecycle.handle(LifecycleEvent::Frame), WindowState::Running);
        assert_eq!(
            lifecycle.handle(LifecycleEvent::CloseRequested),
            WindowState::Closing
        );
        assert_eq!(lifecycle.handle(LifecycleEvent::Unload), WindowState::Unloaded);
    }

    #[test]
    fn test_invalid_events_are_ignored() {
        let mut lifecycle = Lifecycle::default();
        assert_eq!(lifecycle.handle(LifecycleEvent::Frame), WindowState::Uninitialized);

        lifecycle.handle(LifecycleEvent::Load);
        assert_eq!(lifecycle.handle(LifecycleEvent::Load), WindowState::Loaded);

        lifecycle.handle(LifecycleEvent::Unload);
        assert_eq!(lifecycle.handle(LifecycleEvent::Frame), WindowState::Unloaded);
        assert_eq!(lifecycle.handle(LifecycleEvent::Load), WindowState::Unloaded);
    }

    #[test]
    fn test_close_key_closes_on_update() {
        let mut lifecycle = Lifecycle::default();
        lifecycle.handle(LifecycleEvent::Load);
        lifecycle.handle(LifecycleEvent::Frame);

        assert_eq!(
            lifecycle.update(&keyboard_with(&[Keycode::Space])),
            WindowState::Running
        );
        assert!(!lifecycle.should_close());

        assert_eq!(
            lifecycle.update(&keyboard_with(&[Keycode::Space, CLOSE_KEY])),
            WindowState::Closing
        );
        assert!(lifecycle.should_close());
    }

    #[test]
    fn test_close_key_tapped_within_one_frame() {
        let mut lifecycle = Lifecycle::default();
        lifecycle.handle(LifecycleEvent::Load);
        lifecycle.handle(LifecycleEvent::Frame);

        // pressed and released before the update tick
        let mut keyboard = KeyboardState::default();
        keyboard.pressed.insert(CLOSE_KEY);
        assert!(!keyboard.is_down(CLOSE_KEY));

        assert_eq!(lifecycle.update(&keyboard), WindowState::Closing);
        assert!(lifecycle.should_close());
    }

    #[test]
    fn test_close_key_before_first_frame() {
        let mut lifecycle = Lifecycle::default();
        lifecycle.handle(LifecycleEvent::Load);
        assert_eq!(
            lifecycle.update(&keyboard_with(&[CLOSE_KEY])),
            WindowState::Closing
        );
    }

    #[test]
    fn test_frames_after_close_stay_closing() {
        let mut lifecycle = Lifecycle::default();
        lifecycle.handle(LifecycleEvent::Load);
        lifecycle.handle(LifecycleEvent::CloseRequested);
        assert_eq!(lifecycle.handle(LifecycleEvent::Frame), WindowState::Closing);
    }
}
