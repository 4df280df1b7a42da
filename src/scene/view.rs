//! Fly camera and keyboard controls for the viewer

use glam::{Vec2, Vec3};

use crate::input::{Input, InputMapper, ViewerAction};
use crate::renderer::{Camera, GlobalUniform, Projection, SpotLight};

/// Where the camera starts
pub const START_POSITION: Vec3 = Vec3::new(0.0, 5.0, 12.0);
/// Initial look direction, normalized on use
pub const START_DIRECTION: Vec3 = Vec3::new(0.0, -0.5, -2.0);

const DEFAULT_SPEED: f32 = 20.0;
const MIN_SPEED: f32 = 1.0;
const MAX_SPEED: f32 = 100.0;
const SCROLL_SPEED_STEP: f32 = 2.0;
const ACCELERATION_RATE: f32 = 25.0;
const DECELERATION_RATE: f32 = 15.0;
/// Below this speed the camera does not move
const REST_SPEED: f32 = 0.01;
const MOUSE_SENSITIVITY: f32 = 3.0;
/// Degrees of rotation per unit of raw mouse motion at sensitivity 1
const DEGREES_PER_MOUSE_UNIT: f32 = 0.1;

/// Initial ripple amplitude
pub const DEFAULT_RIPPLE_AMPLITUDE: f32 = 0.10;
/// Ripple amplitude range reachable with I/U
pub const MAX_RIPPLE_AMPLITUDE: f32 = 0.2;
/// Amplitude change per second while I/U is held
const RIPPLE_RATE: f32 = 0.6;

/// Turns input into camera motion, projection changes and ripple strength
#[derive(Debug, Clone)]
pub struct ViewController {
    camera: Camera,
    bindings: InputMapper,
    velocity: Vec3,
    speed: f32,
    ripple_amplitude: f32,
    quit_requested: bool,
}

impl ViewController {
    pub fn new() -> Self {
        Self::with_bindings(InputMapper::with_defaults())
    }

    pub fn with_bindings(bindings: InputMapper) -> Self {
        Self {
            camera: Camera::looking_along(START_POSITION, START_DIRECTION),
            bindings,
            velocity: Vec3::ZERO,
            speed: DEFAULT_SPEED,
            ripple_amplitude: DEFAULT_RIPPLE_AMPLITUDE,
            quit_requested: false,
        }
    }

    /// Advance by one frame of `dt` seconds
    pub fn update(&mut self, input: &Input, dt: f32) {
        if self.bindings.is_active(input, ViewerAction::Quit) {
            self.quit_requested = true;
        }

        self.update_speed(input.scroll_delta());
        self.update_look(input.mouse_delta());
        self.update_movement(input, dt);
        self.update_projection(input);
        self.update_ripple(input, dt);
    }

    fn update_speed(&mut self, scroll: Vec2) {
        if scroll.y != 0.0 {
            self.speed = (self.speed + scroll.y * SCROLL_SPEED_STEP).clamp(MIN_SPEED, MAX_SPEED);
            log::debug!("Camera speed {:.1}", self.speed);
        }
    }

    fn update_look(&mut self, delta: Vec2) {
        if delta != Vec2::ZERO {
            let sensitivity = (MOUSE_SENSITIVITY * DEGREES_PER_MOUSE_UNIT).to_radians();
            self.camera.rotate(delta.x, delta.y, sensitivity);
        }
    }

    fn update_movement(&mut self, input: &Input, dt: f32) {
        let right = self.camera.right();
        let up = self.camera.up_vector();
        let axes = [
            (ViewerAction::MoveForward, self.camera.direction),
            (ViewerAction::MoveBackward, -self.camera.direction),
            (ViewerAction::MoveRight, right),
            (ViewerAction::MoveLeft, -right),
            (ViewerAction::MoveUp, up),
            (ViewerAction::MoveDown, -up),
        ];

        let wish: Vec3 = axes
            .into_iter()
            .filter(|(action, _)| self.bindings.is_active(input, *action))
            .map(|(_, axis)| axis)
            .sum();
        let target = wish.normalize_or_zero() * self.speed;

        let rate = if target == Vec3::ZERO {
            DECELERATION_RATE
        } else {
            ACCELERATION_RATE
        };
        self.velocity = self.velocity.lerp(target, (rate * dt).clamp(0.0, 1.0));

        if self.velocity.length() > REST_SPEED {
            self.camera.position += self.velocity * dt;
        }
    }

    fn update_projection(&mut self, input: &Input) {
        if self.bindings.is_triggered(input, ViewerAction::Perspective) {
            self.camera.projection = Projection::Perspective;
            log::debug!("Perspective projection");
        }
        if self.bindings.is_triggered(input, ViewerAction::Orthographic) {
            self.camera.projection = Projection::ORTHOGRAPHIC;
            log::debug!("Orthographic projection");
        }
    }

    fn update_ripple(&mut self, input: &Input, dt: f32) {
        let mut change = 0.0;
        if self.bindings.is_active(input, ViewerAction::RippleUp) {
            change += RIPPLE_RATE * dt;
        }
        if self.bindings.is_active(input, ViewerAction::RippleDown) {
            change -= RIPPLE_RATE * dt;
        }
        self.ripple_amplitude =
            (self.ripple_amplitude + change).clamp(0.0, MAX_RIPPLE_AMPLITUDE);
    }

    /// Push camera matrices and ripple strength, and aim the spotlight
    /// from the camera
    pub fn apply(&self, globals: &mut GlobalUniform, spot: &mut SpotLight) {
        globals.set_camera(&self.camera);
        globals.set_ripple_amplitude(self.ripple_amplitude);
        spot.set_pose(self.camera.position, self.camera.direction);
    }

    /// Match the projection to the window
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Movement speed in units per second
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn ripple_amplitude(&self) -> f32 {
        self.ripple_amplitude
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }
}

impl Default for ViewController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PIXELS_PER_SCROLL_LINE;
    use crate::renderer::LightColors;
    use winit::dpi::PhysicalPosition;
    use winit::event::{ElementState, MouseScrollDelta};
    use winit::keyboard::KeyCode;

    const DT: f32 = 1.0 / 60.0;

    fn press(input: &mut Input, key: KeyCode) {
        input.process_keyboard(key, ElementState::Pressed);
    }

    fn release(input: &mut Input, key: KeyCode) {
        input.process_keyboard(key, ElementState::Released);
    }

    #[test]
    fn test_starting_view() {
        let view = ViewController::new();
        assert_eq!(view.camera().position, START_POSITION);
        assert!(
            view.camera()
                .direction
                .abs_diff_eq(START_DIRECTION.normalize(), 1e-5)
        );
        assert_eq!(view.speed(), DEFAULT_SPEED);
        assert_eq!(view.ripple_amplitude(), DEFAULT_RIPPLE_AMPLITUDE);
        assert_eq!(view.camera().projection, Projection::Perspective);
    }

    #[test]
    fn test_forward_accelerates_along_direction() {
        let mut view = ViewController::new();
        let mut input = Input::new();
        press(&mut input, KeyCode::KeyW);

        let start = view.camera().position;
        for _ in 0..30 {
            view.update(&input, DT);
            input.update();
        }

        let moved = view.camera().position - start;
        assert!(moved.normalize().abs_diff_eq(view.camera().direction, 1e-4));
        assert!(view.velocity().length() <= DEFAULT_SPEED + 1e-3);
        assert!(view.velocity().length() > DEFAULT_SPEED * 0.9);
    }

    #[test]
    fn test_velocity_decays_to_rest() {
        let mut view = ViewController::new();
        let mut input = Input::new();
        press(&mut input, KeyCode::KeyD);
        for _ in 0..30 {
            view.update(&input, DT);
            input.update();
        }
        release(&mut input, KeyCode::KeyD);

        for _ in 0..600 {
            view.update(&input, DT);
            input.update();
        }
        assert!(view.velocity().length() < REST_SPEED);

        let resting = view.camera().position;
        view.update(&input, DT);
        assert_eq!(view.camera().position, resting);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut view = ViewController::new();
        let mut input = Input::new();
        press(&mut input, KeyCode::KeyW);
        press(&mut input, KeyCode::KeyS);
        view.update(&input, DT);
        assert_eq!(view.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_space_and_q_both_rise() {
        for key in [KeyCode::Space, KeyCode::KeyQ] {
            let mut view = ViewController::new();
            let mut input = Input::new();
            press(&mut input, key);
            view.update(&input, DT);
            assert!(view.velocity().y > 0.0);
        }
    }

    #[test]
    fn test_scroll_speed_is_clamped() {
        let mut view = ViewController::new();
        let mut input = Input::new();

        input.process_scroll(Vec2::new(0.0, 1000.0));
        view.update(&input, DT);
        assert_eq!(view.speed(), MAX_SPEED);
        input.update();

        input.process_scroll(Vec2::new(0.0, -1000.0));
        view.update(&input, DT);
        assert_eq!(view.speed(), MIN_SPEED);
        input.update();

        input.process_scroll(Vec2::new(0.0, 2.0));
        view.update(&input, DT);
        assert_eq!(view.speed(), MIN_SPEED + 4.0);
    }

    #[test]
    fn test_rise_follows_camera_up_when_pitched() {
        let mut view = ViewController::new();
        let mut input = Input::new();

        // Look almost straight down
        input.process_mouse_delta(Vec2::new(0.0, 500.0));
        view.update(&input, DT);
        input.update();
        assert!(view.camera().pitch() < -80.0_f32.to_radians());

        press(&mut input, KeyCode::KeyQ);
        view.update(&input, DT);

        let up = view.camera().up_vector();
        assert!(up.y < 0.1);
        assert!(view.velocity().normalize().abs_diff_eq(up, 1e-4));
    }

    #[test]
    fn test_trackpad_flick_changes_speed_by_notches() {
        let mut view = ViewController::new();
        let mut input = Input::new();

        let pixels = 2.0 * PIXELS_PER_SCROLL_LINE as f64;
        input.process_scroll_event(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, pixels)));
        view.update(&input, DT);

        assert!((view.speed() - (DEFAULT_SPEED + 2.0 * SCROLL_SPEED_STEP)).abs() < 1e-5);
    }

    #[test]
    fn test_mouse_rotates_camera() {
        let mut view = ViewController::new();
        let mut input = Input::new();
        let yaw = view.camera().yaw();

        input.process_mouse_delta(Vec2::new(10.0, 0.0));
        view.update(&input, DT);

        let expected = (MOUSE_SENSITIVITY * DEGREES_PER_MOUSE_UNIT * 10.0).to_radians();
        assert!((view.camera().yaw() - yaw - expected).abs() < 1e-5);
    }

    #[test]
    fn test_projection_toggles_only_on_keys() {
        let mut view = ViewController::new();
        let mut input = Input::new();

        press(&mut input, KeyCode::KeyO);
        view.update(&input, DT);
        assert_eq!(view.camera().projection, Projection::ORTHOGRAPHIC);
        input.update();

        // Other keys leave it alone
        press(&mut input, KeyCode::KeyW);
        view.update(&input, DT);
        assert_eq!(view.camera().projection, Projection::ORTHOGRAPHIC);
        input.update();

        press(&mut input, KeyCode::KeyP);
        view.update(&input, DT);
        assert_eq!(view.camera().projection, Projection::Perspective);
    }

    #[test]
    fn test_ripple_amplitude_is_clamped() {
        let mut view = ViewController::new();
        let mut input = Input::new();

        press(&mut input, KeyCode::KeyI);
        for _ in 0..120 {
            view.update(&input, DT);
        }
        assert_eq!(view.ripple_amplitude(), MAX_RIPPLE_AMPLITUDE);

        release(&mut input, KeyCode::KeyI);
        press(&mut input, KeyCode::KeyU);
        for _ in 0..120 {
            view.update(&input, DT);
        }
        assert_eq!(view.ripple_amplitude(), 0.0);
    }

    #[test]
    fn test_ripple_rate_is_per_second() {
        let mut view = ViewController::new();
        let mut input = Input::new();
        press(&mut input, KeyCode::KeyU);
        view.update(&input, 0.1);
        assert!((view.ripple_amplitude() - (DEFAULT_RIPPLE_AMPLITUDE - 0.06)).abs() < 1e-6);
    }

    #[test]
    fn test_escape_requests_quit() {
        let mut view = ViewController::new();
        let mut input = Input::new();
        view.update(&input, DT);
        assert!(!view.quit_requested());

        press(&mut input, KeyCode::Escape);
        view.update(&input, DT);
        assert!(view.quit_requested());
    }

    #[test]
    fn test_apply_aims_spotlight_from_camera() {
        let view = ViewController::new();
        let mut globals = GlobalUniform::new();
        let mut spot = SpotLight::new(Vec3::ZERO, Vec3::NEG_Y, LightColors::grey(0.0, 1.0, 1.0));

        view.apply(&mut globals, &mut spot);

        assert_eq!(spot.position, view.camera().position);
        assert!(spot.direction.abs_diff_eq(view.camera().direction, 1e-6));
        assert_eq!(globals.view(), view.camera().view_matrix());
        assert_eq!(globals.ripple_amplitude(), DEFAULT_RIPPLE_AMPLITUDE);
    }
}
