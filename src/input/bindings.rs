//! Key bindings for the viewer
//!
//! Physical keys map to logical [`ViewerAction`]s so the view controller never
//! names a key directly.

use rustc_hash::FxHashMap;
use winit::keyboard::KeyCode;

use super::Input;

/// Logical actions the viewer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewerAction {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    /// Switch to perspective projection
    Perspective,
    /// Switch to orthographic projection
    Orthographic,
    /// Raise the liquid ripple amplitude
    RippleUp,
    /// Lower the liquid ripple amplitude
    RippleDown,
    Quit,
}

/// Maps physical keys to viewer actions
#[derive(Debug, Clone, Default)]
pub struct InputMapper {
    /// Key to action bindings
    key_bindings: FxHashMap<KeyCode, ViewerAction>,
    /// Reverse lookup: action to keys
    action_keys: FxHashMap<ViewerAction, Vec<KeyCode>>,
}

impl InputMapper {
    /// Create an empty input mapper.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input mapper with the default fly-through bindings.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut mapper = Self::new();

        mapper.bind(KeyCode::KeyW, ViewerAction::MoveForward);
        mapper.bind(KeyCode::KeyS, ViewerAction::MoveBackward);
        mapper.bind(KeyCode::KeyA, ViewerAction::MoveLeft);
        mapper.bind(KeyCode::KeyD, ViewerAction::MoveRight);

        mapper.bind(KeyCode::KeyQ, ViewerAction::MoveUp);
        mapper.bind(KeyCode::Space, ViewerAction::MoveUp);
        mapper.bind(KeyCode::KeyE, ViewerAction::MoveDown);
        mapper.bind(KeyCode::ControlLeft, ViewerAction::MoveDown);

        mapper.bind(KeyCode::KeyP, ViewerAction::Perspective);
        mapper.bind(KeyCode::KeyO, ViewerAction::Orthographic);

        mapper.bind(KeyCode::KeyI, ViewerAction::RippleUp);
        mapper.bind(KeyCode::KeyU, ViewerAction::RippleDown);

        mapper.bind(KeyCode::Escape, ViewerAction::Quit);

        mapper
    }

    /// Bind a key to an action.
    ///
    /// If the key was previously bound, the old binding is replaced.
    pub fn bind(&mut self, key: KeyCode, action: ViewerAction) {
        if let Some(old_action) = self.key_bindings.get(&key)
            && let Some(keys) = self.action_keys.get_mut(old_action)
        {
            keys.retain(|k| *k != key);
        }

        self.key_bindings.insert(key, action);
        self.action_keys.entry(action).or_default().push(key);
    }

    /// Get all keys bound to an action.
    #[must_use]
    pub fn get_keys(&self, action: ViewerAction) -> &[KeyCode] {
        self.action_keys
            .get(&action)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// True while any key bound to `action` is held
    #[must_use]
    pub fn is_active(&self, input: &Input, action: ViewerAction) -> bool {
        self.get_keys(action)
            .iter()
            .any(|key| input.is_key_pressed(*key))
    }

    /// True on the frame any key bound to `action` goes down
    #[must_use]
    pub fn is_triggered(&self, input: &Input, action: ViewerAction) -> bool {
        self.get_keys(action)
            .iter()
            .any(|key| input.is_key_just_pressed(*key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::event::ElementState;

    #[test]
    fn test_default_bindings() {
        let mapper = InputMapper::with_defaults();

        assert_eq!(mapper.get_keys(ViewerAction::MoveForward), &[KeyCode::KeyW]);
        assert_eq!(mapper.get_keys(ViewerAction::MoveBackward), &[KeyCode::KeyS]);
        assert_eq!(mapper.get_keys(ViewerAction::MoveLeft), &[KeyCode::KeyA]);
        assert_eq!(mapper.get_keys(ViewerAction::MoveRight), &[KeyCode::KeyD]);
        assert_eq!(mapper.get_keys(ViewerAction::Perspective), &[KeyCode::KeyP]);
        assert_eq!(mapper.get_keys(ViewerAction::Orthographic), &[KeyCode::KeyO]);
        assert_eq!(mapper.get_keys(ViewerAction::RippleUp), &[KeyCode::KeyI]);
        assert_eq!(mapper.get_keys(ViewerAction::RippleDown), &[KeyCode::KeyU]);
        assert_eq!(mapper.get_keys(ViewerAction::Quit), &[KeyCode::Escape]);
    }

    #[test]
    fn test_vertical_movement_has_two_keys() {
        let mapper = InputMapper::with_defaults();

        let up = mapper.get_keys(ViewerAction::MoveUp);
        assert!(up.contains(&KeyCode::KeyQ));
        assert!(up.contains(&KeyCode::Space));

        let down = mapper.get_keys(ViewerAction::MoveDown);
        assert!(down.contains(&KeyCode::KeyE));
        assert!(down.contains(&KeyCode::ControlLeft));
    }

    #[test]
    fn test_rebind_moves_key() {
        let mut mapper = InputMapper::with_defaults();

        mapper.bind(KeyCode::KeyW, ViewerAction::Quit);
        assert!(mapper.get_keys(ViewerAction::MoveForward).is_empty());
        assert!(mapper.get_keys(ViewerAction::Quit).contains(&KeyCode::KeyW));
    }

    #[test]
    fn test_active_and_triggered() {
        let mapper = InputMapper::with_defaults();
        let mut input = Input::new();

        input.process_keyboard(KeyCode::Space, ElementState::Pressed);
        assert!(mapper.is_active(&input, ViewerAction::MoveUp));
        assert!(mapper.is_triggered(&input, ViewerAction::MoveUp));

        input.update();
        assert!(mapper.is_active(&input, ViewerAction::MoveUp));
        assert!(!mapper.is_triggered(&input, ViewerAction::MoveUp));
        assert!(!mapper.is_active(&input, ViewerAction::MoveDown));
    }
}
