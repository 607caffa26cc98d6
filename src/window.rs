//! Windowed front end: winit event loop driving the engine and the renderer.
//!
//! Window callbacks only translate events and push them to the engine; the
//! engine mutates its state inside the per-frame tick on redraw.

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::{LaunchOptions, Scene};
use crate::error::RunError;
use crate::gpu::{CanvasBatch, Renderer};
use crate::input::{InputEvent, InputTranslator, KeyCode};
use crate::layers::{LayerConfig, LayerScheduler};
use crate::simulation::Simulation;
use crate::time::FrameClock;

const DEFAULT_WIDTH: u32 = 1280;
const DEFAULT_HEIGHT: u32 = 720;

/// What the front end does with a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    ToggleScene,
    ClearCanvas,
    /// Steer the attractor layers.
    Steer(KeyCode),
    /// Hand the key to the canvas engine.
    Forward(KeyCode),
    Ignore,
}

/// Map a key press to an action for the active scene.
pub fn key_action(key: KeyCode, scene: Scene) -> KeyAction {
    match (key, scene) {
        (KeyCode::Escape, _) => KeyAction::Quit,
        (KeyCode::Tab, _) => KeyAction::ToggleScene,
        (KeyCode::Delete, Scene::Canvas) => KeyAction::ClearCanvas,
        (key, Scene::Attractor) if key.is_arrow() => KeyAction::Steer(key),
        (key, Scene::Canvas) => KeyAction::Forward(key),
        _ => KeyAction::Ignore,
    }
}

pub struct App {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    simulation: Simulation,
    layers: LayerScheduler,
    scene: Scene,
    translator: InputTranslator,
    clock: FrameClock,
    batch: CanvasBatch,
    error: Option<RunError>,
}

impl App {
    pub fn new(options: LaunchOptions) -> Self {
        let mut simulation =
            Simulation::new(DEFAULT_WIDTH as f32, DEFAULT_HEIGHT as f32).with_config(options.engine);
        let layers = match options.seed {
            Some(seed) => {
                simulation = simulation.with_seed(seed);
                LayerScheduler::with_seed(LayerConfig::default(), seed)
            }
            None => LayerScheduler::new(LayerConfig::default()),
        };

        Self {
            window: None,
            renderer: None,
            simulation,
            layers,
            scene: options.scene,
            translator: InputTranslator::new(),
            clock: FrameClock::new(),
            batch: CanvasBatch::new(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: RunError) {
        error!("{}", err);
        self.error = Some(err);
        event_loop.exit();
    }

    fn handle_input(&mut self, event_loop: &ActiveEventLoop, event: InputEvent) {
        let InputEvent::KeyPress(key) = event else {
            if self.scene == Scene::Canvas || matches!(event, InputEvent::Resize(_)) {
                self.simulation.push_input(event);
            }
            return;
        };

        match key_action(key, self.scene) {
            KeyAction::Quit => event_loop.exit(),
            KeyAction::ToggleScene => {
                self.scene = self.scene.toggled();
                info!(scene = ?self.scene, "scene switched");
            }
            KeyAction::ClearCanvas => self.simulation.clear(),
            KeyAction::Steer(key) => {
                self.layers.handle_key(key);
            }
            KeyAction::Forward(key) => self.simulation.push_input(InputEvent::KeyPress(key)),
            KeyAction::Ignore => {}
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let delta = self.clock.update();
        let Some(renderer) = &mut self.renderer else {
            return;
        };

        let result = match self.scene {
            Scene::Canvas => {
                self.simulation.tick(self.clock.elapsed(), &mut self.batch);
                renderer.render_canvas(&self.batch)
            }
            Scene::Attractor => {
                self.layers.tick(delta);
                renderer.render_cloud(&self.layers)
            }
        };

        match result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("surface lost, reconfiguring");
                renderer.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => warn!("Render error: {:?}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("kaleido")
            .with_inner_size(winit::dpi::LogicalSize::new(DEFAULT_WIDTH, DEFAULT_HEIGHT));
        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let size = window.inner_size();
        self.simulation.resize(size.width as f32, size.height as f32);

        match pollster::block_on(Renderer::new(window.clone())) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(e) => return self.fail(event_loop, e.into()),
        }
        info!(width = size.width, height = size.height, scene = ?self.scene, "window ready");

        self.clock.reset();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            event => {
                if let WindowEvent::Resized(size) = event {
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(size);
                    }
                }
                if let Some(input) = self.translator.translate(&event) {
                    self.handle_input(event_loop, input);
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Open the window and run until it closes.
pub fn run(options: LaunchOptions) -> Result<(), RunError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(options);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_keys() {
        for scene in [Scene::Canvas, Scene::Attractor] {
            assert_eq!(key_action(KeyCode::Escape, scene), KeyAction::Quit);
            assert_eq!(key_action(KeyCode::Tab, scene), KeyAction::ToggleScene);
        }
    }

    #[test]
    fn test_canvas_keys() {
        assert_eq!(key_action(KeyCode::Delete, Scene::Canvas), KeyAction::ClearCanvas);
        assert_eq!(
            key_action(KeyCode::Up, Scene::Canvas),
            KeyAction::Forward(KeyCode::Up)
        );
        assert_eq!(
            key_action(KeyCode::Character('x'), Scene::Canvas),
            KeyAction::Forward(KeyCode::Character('x'))
        );
    }

    #[test]
    fn test_attractor_keys() {
        assert_eq!(key_action(KeyCode::Left, Scene::Attractor), KeyAction::Steer(KeyCode::Left));
        assert_eq!(key_action(KeyCode::Character('x'), Scene::Attractor), KeyAction::Ignore);
        assert_eq!(key_action(KeyCode::Delete, Scene::Attractor), KeyAction::Ignore);
    }
}
