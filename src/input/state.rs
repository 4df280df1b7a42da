//! Raw input state

use glam::Vec2;
use rustc_hash::FxHashSet;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use winit::keyboard::KeyCode;

/// Pixels of trackpad scroll that count as one wheel notch
pub const PIXELS_PER_SCROLL_LINE: f32 = 20.0;

/// Keyboard and mouse state for the current frame
#[derive(Debug, Default)]
pub struct Input {
    /// Currently pressed keys
    pressed_keys: FxHashSet<KeyCode>,
    /// Keys that were just pressed this frame
    just_pressed_keys: FxHashSet<KeyCode>,
    /// Keys that were just released this frame
    just_released_keys: FxHashSet<KeyCode>,
    /// Currently pressed mouse buttons
    pressed_mouse_buttons: FxHashSet<MouseButton>,
    /// Last known cursor position in window coordinates
    cursor_position: Vec2,
    /// Raw mouse motion accumulated this frame
    mouse_delta: Vec2,
    /// Scroll wheel delta accumulated this frame
    scroll_delta: Vec2,
}

impl Input {
    /// Create a new input manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame state; call after each rendered frame
    pub fn update(&mut self) {
        self.just_pressed_keys.clear();
        self.just_released_keys.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    /// Process a keyboard event
    pub fn process_keyboard(&mut self, key_code: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                // OS key repeat sends Pressed again; only the first counts
                if self.pressed_keys.insert(key_code) {
                    self.just_pressed_keys.insert(key_code);
                }
            }
            ElementState::Released => {
                self.pressed_keys.remove(&key_code);
                self.just_released_keys.insert(key_code);
            }
        }
    }

    /// Process a mouse button event
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.pressed_mouse_buttons.insert(button);
            }
            ElementState::Released => {
                self.pressed_mouse_buttons.remove(&button);
            }
        }
    }

    /// Record the cursor position (does not feed mouse look)
    pub fn process_cursor_position(&mut self, position: Vec2) {
        self.cursor_position = position;
    }

    /// Accumulate raw mouse motion for mouse look
    pub fn process_mouse_delta(&mut self, delta: Vec2) {
        self.mouse_delta += delta;
    }

    /// Accumulate scroll motion in wheel notches
    pub fn process_scroll(&mut self, delta: Vec2) {
        self.scroll_delta += delta;
    }

    /// Accumulate a winit scroll event; pixel deltas are converted to notches
    pub fn process_scroll_event(&mut self, delta: MouseScrollDelta) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(x, y) => Vec2::new(x, y),
            MouseScrollDelta::PixelDelta(pos) => {
                Vec2::new(pos.x as f32, pos.y as f32) / PIXELS_PER_SCROLL_LINE
            }
        };
        self.process_scroll(lines);
    }

    /// Check if a key is currently pressed
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// Check if a key was just pressed this frame
    pub fn is_key_just_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed_keys.contains(&key)
    }

    /// Check if a key was just released this frame
    pub fn is_key_just_released(&self, key: KeyCode) -> bool {
        self.just_released_keys.contains(&key)
    }

    /// Check if a mouse button is currently pressed
    pub fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed_mouse_buttons.contains(&button)
    }

    /// Get the last cursor position
    pub fn cursor_position(&self) -> Vec2 {
        self.cursor_position
    }

    /// Get raw mouse motion this frame
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Get scroll wheel delta this frame
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn test_pixel_scroll_counts_in_lines() {
        let mut input = Input::new();
        input.process_scroll_event(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 40.0)));
        assert_eq!(input.scroll_delta(), Vec2::new(0.0, 40.0 / PIXELS_PER_SCROLL_LINE));

        input.update();
        input.process_scroll_event(MouseScrollDelta::LineDelta(0.0, -1.0));
        assert_eq!(input.scroll_delta(), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_key_press_and_release() {
        let mut input = Input::new();
        input.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        assert!(input.is_key_pressed(KeyCode::KeyW));
        assert!(input.is_key_just_pressed(KeyCode::KeyW));

        input.update();
        assert!(input.is_key_pressed(KeyCode::KeyW));
        assert!(!input.is_key_just_pressed(KeyCode::KeyW));

        input.process_keyboard(KeyCode::KeyW, ElementState::Released);
        assert!(!input.is_key_pressed(KeyCode::KeyW));
        assert!(input.is_key_just_released(KeyCode::KeyW));
    }

    #[test]
    fn test_key_repeat_is_not_just_pressed() {
        let mut input = Input::new();
        input.process_keyboard(KeyCode::KeyP, ElementState::Pressed);
        input.update();
        input.process_keyboard(KeyCode::KeyP, ElementState::Pressed);
        assert!(!input.is_key_just_pressed(KeyCode::KeyP));
    }

    #[test]
    fn test_mouse_delta_accumulates_and_clears() {
        let mut input = Input::new();
        input.process_mouse_delta(Vec2::new(2.0, 1.0));
        input.process_mouse_delta(Vec2::new(3.0, -4.0));
        assert_eq!(input.mouse_delta(), Vec2::new(5.0, -3.0));

        input.process_cursor_position(Vec2::new(100.0, 50.0));
        assert_eq!(input.mouse_delta(), Vec2::new(5.0, -3.0));

        input.update();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
        assert_eq!(input.cursor_position(), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_scroll_accumulates() {
        let mut input = Input::new();
        input.process_scroll(Vec2::new(0.0, 1.0));
        input.process_scroll(Vec2::new(0.0, 2.0));
        assert_eq!(input.scroll_delta().y, 3.0);
        input.update();
        assert_eq!(input.scroll_delta(), Vec2::ZERO);
    }

    #[test]
    fn test_mouse_buttons() {
        let mut input = Input::new();
        input.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        assert!(input.is_mouse_button_pressed(MouseButton::Left));
        input.process_mouse_button(MouseButton::Left, ElementState::Released);
        assert!(!input.is_mouse_button_pressed(MouseButton::Left));
    }
}
