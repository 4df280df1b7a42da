//! Application loop driving a [`Game`] through winit

use std::sync::Arc;

use serde::Deserialize;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorGrabMode, Window, WindowId},
};

use crate::core::Time;
use crate::core::debug::DebugInfo;
use crate::core::error::EngineError;
use crate::input::Input;
use crate::renderer::{Renderer, ShadowConfig};

/// Window and presentation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window title
    pub title: String,
    /// Initial window width
    pub width: u32,
    /// Initial window height
    pub height: u32,
    /// Enable VSync
    pub vsync: bool,
    /// Hide and capture the cursor for mouse look
    pub grab_cursor: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: String::from("Mug Scene"),
            width: 1000,
            height: 800,
            vsync: true,
            grab_cursor: true,
        }
    }
}

impl EngineConfig {
    /// Create a new config with a title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set window dimensions
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Enable or disable VSync
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Enable or disable cursor capture
    pub fn with_grab_cursor(mut self, grab: bool) -> Self {
        self.grab_cursor = grab;
        self
    }
}

/// Callbacks the application loop drives
pub trait Game: 'static {
    /// Called once after the renderer exists
    fn init(&mut self, engine: &mut EngineContext);

    /// Called every frame before rendering
    fn update(&mut self, engine: &mut EngineContext);

    /// Called every frame to draw
    fn render(&mut self, engine: &mut EngineContext);

    /// Called when the window is resized
    fn on_resize(&mut self, _engine: &mut EngineContext, _width: u32, _height: u32) {}

    /// Called when the loop is shutting down
    fn shutdown(&mut self, _engine: &mut EngineContext) {}
}

/// State handed to game callbacks
pub struct EngineContext {
    /// Time tracking
    pub time: Time,
    /// Input state
    pub input: Input,
    /// Frame statistics
    pub debug: DebugInfo,
    renderer: Option<Renderer>,
    window_size: PhysicalSize<u32>,
    should_quit: bool,
}

impl EngineContext {
    fn new(width: u32, height: u32) -> Self {
        Self {
            time: Time::new(),
            input: Input::new(),
            debug: DebugInfo::default(),
            renderer: None,
            window_size: PhysicalSize::new(width, height),
            should_quit: false,
        }
    }

    /// Get the renderer, if the window is up
    pub fn renderer(&self) -> Option<&Renderer> {
        self.renderer.as_ref()
    }

    /// Get the renderer mutably, if the window is up
    pub fn renderer_mut(&mut self) -> Option<&mut Renderer> {
        self.renderer.as_mut()
    }

    /// Get window width
    pub fn width(&self) -> u32 {
        self.window_size.width
    }

    /// Get window height
    pub fn height(&self) -> u32 {
        self.window_size.height
    }

    /// Request shutdown at the end of the frame
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Check if shutdown was requested
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

/// Owns the window, the renderer and the game
pub struct Engine<G: Game> {
    config: EngineConfig,
    shadow: ShadowConfig,
    game: G,
    context: EngineContext,
    window: Option<Arc<Window>>,
    initialized: bool,
    error: Option<EngineError>,
}

impl<G: Game> Engine<G> {
    /// Create a new engine with the given game
    pub fn new(config: EngineConfig, game: G) -> Self {
        let context = EngineContext::new(config.width, config.height);
        Self {
            config,
            shadow: ShadowConfig::default(),
            game,
            context,
            window: None,
            initialized: false,
            error: None,
        }
    }

    /// Override the shadow map settings
    pub fn with_shadow_config(mut self, shadow: ShadowConfig) -> Self {
        self.shadow = shadow;
        self
    }

    /// Run until the window closes or the game quits
    pub fn run(mut self) -> Result<(), EngineError> {
        log::info!("Starting: {}", self.config.title);

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;

        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), EngineError> {
        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);

        if self.config.grab_cursor {
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                log::warn!("Cursor capture unavailable: {e}");
            }
            window.set_cursor_visible(false);
        }

        let renderer = pollster::block_on(Renderer::new(
            Arc::clone(&window),
            self.config.vsync,
            self.shadow.clone(),
        ))?;

        self.context.window_size = window.inner_size();
        self.context.renderer = Some(renderer);
        self.window = Some(window);
        Ok(())
    }

    fn shut_down(&mut self, event_loop: &ActiveEventLoop) {
        self.game.shutdown(&mut self.context);
        event_loop.exit();
    }
}

impl<G: Game> ApplicationHandler for Engine<G> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.create_window(event_loop) {
            log::error!("Initialization failed: {e}");
            self.error = Some(e);
            event_loop.exit();
            return;
        }

        if !self.initialized {
            self.game.init(&mut self.context);
            let (width, height) = (self.context.width(), self.context.height());
            self.game.on_resize(&mut self.context, width, height);
            self.initialized = true;
            log::info!("Initialized successfully");
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down");
                self.shut_down(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                if new_size.width > 0 && new_size.height > 0 {
                    self.context.window_size = new_size;
                    if let Some(renderer) = &mut self.context.renderer {
                        renderer.resize(new_size.width, new_size.height);
                    }
                    self.game
                        .on_resize(&mut self.context, new_size.width, new_size.height);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let winit::keyboard::PhysicalKey::Code(key_code) = event.physical_key {
                    self.context.input.process_keyboard(key_code, event.state);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                self.context.input.process_mouse_button(button, state);
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.context
                    .input
                    .process_cursor_position(glam::Vec2::new(position.x as f32, position.y as f32));
            }

            WindowEvent::MouseWheel { delta, .. } => {
                self.context.input.process_scroll_event(delta);
            }

            WindowEvent::RedrawRequested => {
                self.context.time.update();

                if self.context.debug.record_frame(self.context.time.delta()) {
                    log::debug!("{}", self.context.debug.frame_stats.format_stats());
                }

                self.game.update(&mut self.context);

                if self.context.should_quit() {
                    self.shut_down(event_loop);
                    return;
                }

                self.game.render(&mut self.context);

                self.context.input.update();

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.context
                .input
                .process_mouse_delta(glam::Vec2::new(delta.0 as f32, delta.1 as f32));
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
