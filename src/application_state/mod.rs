//! # Application State Management
//!
//! This module handles the application's state management, including:
//! - Window creation and pointer grabbing
//! - Input handling
//! - Application lifecycle events
//! - The transition from model loading to the running simulation

pub mod input_manager;
pub mod input_state;

use std::sync::Arc;

use input_manager::InputManager;
use log::{error, info, warn};

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::ActiveEventLoop,
    window::{CursorGrabMode, Window, WindowId},
};

use crate::engine_state::{
    assets::{source::ModelSource, AssetLoader, AssetManifest},
    config::EngineConfig,
    mode::PointerCapture,
    rendering::FrameRenderer,
    EngineState,
};

/// Title shown in the window bar.
const WINDOW_TITLE: &str = "Nether Island";

/// Window size requested at startup.
const INITIAL_SIZE: PhysicalSize<u32> = PhysicalSize::new(1280, 720);

/// Where the application is in its lifecycle.
pub enum Phase {
    /// Models are still resolving.
    Loading(AssetLoader),
    /// The island is built and simulating.
    Running(Box<EngineState>),
    /// Between phases.
    Empty,
}

/// The main application state container that manages the application's lifecycle.
///
/// It implements `ApplicationHandler` to handle window and device events.
pub struct ApplicationState {
    /// Configuration the engine is built from
    pub config: EngineConfig,

    /// Loading or running
    pub phase: Phase,

    /// Handle to the application window, once created
    pub window: Option<Arc<Window>>,

    /// Manages input state and event processing
    pub input_manager: InputManager,

    /// Draws each frame
    pub renderer: Box<dyn FrameRenderer>,

    /// Timestamp of the last frame for delta time calculations
    pub last_wait_time: web_time::Instant,
}

impl ApplicationState {
    /// Starts loading the configured models.
    ///
    /// # Arguments
    /// * `config` - Engine configuration
    /// * `source` - Reader for model files
    /// * `renderer` - Receives every frame once the island is built
    pub fn new(
        config: EngineConfig,
        source: Arc<dyn ModelSource>,
        renderer: Box<dyn FrameRenderer>,
    ) -> Self {
        let manifest = AssetManifest::from_config(&config.assets);
        let loader = AssetLoader::start(
            &manifest,
            source,
            config.assets.workers,
            web_time::Duration::from_secs_f32(config.assets.deadline_secs),
        );

        Self {
            config,
            phase: Phase::Loading(loader),
            window: None,
            input_manager: InputManager::new(),
            renderer,
            last_wait_time: web_time::Instant::now(),
        }
    }

    fn window_size(&self) -> PhysicalSize<u32> {
        self.window
            .as_ref()
            .map_or(INITIAL_SIZE, |window| window.inner_size())
    }

    /// Polls the loader and builds the engine once loading completes.
    fn poll_loading(&mut self) {
        let Phase::Loading(loader) = &mut self.phase else {
            return;
        };
        if loader.poll().is_none() {
            let percent = loader.progress().percent();
            if let Some(window) = &self.window {
                window.set_title(&format!("{WINDOW_TITLE} - loading models {percent}%"));
            }
            return;
        }

        let Phase::Loading(loader) = std::mem::replace(&mut self.phase, Phase::Empty) else {
            return;
        };
        let (library, report) = loader.finish();
        if !report.missing().is_empty() {
            warn!(
                "Building without {} models; their placements will be skipped",
                report.missing().len()
            );
        }

        let size = self.window_size();
        let engine = EngineState::new(self.config.clone(), library, size.width, size.height);
        self.renderer.resize(size.width, size.height);
        if let Some(window) = &self.window {
            window.set_title(WINDOW_TITLE);
        }
        self.input_manager.release_all();
        self.last_wait_time = web_time::Instant::now();
        self.phase = Phase::Running(Box::new(engine));
        info!("Simulation started");
    }
}

impl ApplicationHandler for ApplicationState {
    /// Handles window-related events such as resize, focus changes, and input events.
    ///
    /// # Arguments
    /// * `event_loop` - Reference to the active event loop
    /// * `_window_id` - ID of the window that generated the event
    /// * `event` - The window event to process
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        self.input_manager.intake_input(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Phase::Running(engine) = &mut self.phase {
                    engine.resize(size.width, size.height);
                }
                self.renderer.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                if let Phase::Running(engine) = &self.phase {
                    engine.render(self.renderer.as_mut());
                }
            }
            _ => (),
        }
    }

    /// Handles device-level input events such as mouse motion.
    ///
    /// # Arguments
    /// * `_event_loop` - Reference to the active event loop
    /// * `_device_id` - ID of the device that generated the event
    /// * `event` - The device event to process
    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input_manager.intake_mouse_motion(delta);
        }
    }

    /// Creates the window the first time the application is resumed.
    ///
    /// # Arguments
    /// * `event_loop` - Reference to the active event loop
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(INITIAL_SIZE);
        match event_loop.create_window(attributes) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(error) => {
                error!("Failed to create window: {error}");
                event_loop.exit();
            }
        }
    }

    /// Called before the event loop goes to sleep.
    ///
    /// This method handles frame timing, input processing, and triggers rendering
    /// of the next frame.
    ///
    /// # Arguments
    /// * `_event_loop` - Reference to the active event loop
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.poll_loading();

        let Phase::Running(engine) = &mut self.phase else {
            return;
        };
        let now = web_time::Instant::now();
        let wait_dt = now - self.last_wait_time;
        self.last_wait_time = now;

        let processed_input = self.input_manager.get_and_reset_processed_input();
        engine.set_input_commands(&processed_input);

        let mut pointer = WindowPointer {
            window: self.window.as_deref(),
        };
        engine.advance(wait_dt, &mut pointer);

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Grabs the platform cursor for first-person look.
pub struct WindowPointer<'a> {
    window: Option<&'a Window>,
}

impl PointerCapture for WindowPointer<'_> {
    fn capture(&mut self) {
        let Some(window) = self.window else {
            return;
        };
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
        if let Err(error) = grabbed {
            warn!("Could not grab the cursor: {error}");
        }
        window.set_cursor_visible(false);
    }

    fn release(&mut self) {
        let Some(window) = self.window else {
            return;
        };
        if let Err(error) = window.set_cursor_grab(CursorGrabMode::None) {
            warn!("Could not release the cursor: {error}");
        }
        window.set_cursor_visible(true);
    }
}
