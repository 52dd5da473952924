//! Windowed editor application
//!
//! [`EditorApp`] wires the editor core to winit: UI edits and pointer drags are
//! queued as [`EditorAction`]s, applied between frames, and every redraw
//! composes the scene through the wgpu [`RenderEngine`].

use anyhow::Context;
use log::{error, info};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::EditorConfig;
use crate::gfx::{
    backend::RenderBackend,
    geometry::MeshLibrary,
    rendering::{FrameStats, RenderEngine, Renderer},
    scene::{EditorAction, Scene},
};
use crate::ui::{editor_panel, PanelState, UiManager};

/// Everything that exists only once the window is up
struct GpuState {
    window: Arc<Window>,
    engine: RenderEngine,
    library: MeshLibrary,
    ui: UiManager,
}

pub struct EditorApp {
    config: EditorConfig,
    gpu: Option<GpuState>,
    renderer: Renderer,
    scene: Scene,
    panel: PanelState,
    pending: Vec<EditorAction>,
    dragging: bool,
    cursor: Option<PhysicalPosition<f64>>,
    fatal: Option<anyhow::Error>,
}

impl EditorApp {
    pub fn new(config: EditorConfig) -> anyhow::Result<Self> {
        let mut scene = Scene::new(&config);
        if config.demo_scene {
            scene
                .populate_demo()
                .context("Failed to populate demo scene")?;
        }

        Ok(Self {
            renderer: Renderer::new(config.projection, config.clear_color),
            config,
            gpu: None,
            scene,
            panel: PanelState::default(),
            pending: Vec::new(),
            dragging: false,
            cursor: None,
            fatal: None,
        })
    }

    /// Opens the window and runs the event loop until the window closes
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = EventLoop::new().context("Failed to create event loop")?;
        event_loop.set_control_flow(ControlFlow::Wait);
        event_loop
            .run_app(&mut self)
            .context("Event loop terminated abnormally")?;

        match self.fatal.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    fn init_gpu(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<GpuState> {
        let window_config = &self.config.window;
        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title(window_config.title.clone())
                    .with_inner_size(LogicalSize::new(window_config.width, window_config.height)),
            )
            .context("Failed to create window")?;
        let window = Arc::new(window);

        let (width, height) = window.inner_size().into();
        let mut engine = pollster::block_on(RenderEngine::new(window.clone(), width, height))
            .context("Failed to initialise the render engine")?;

        let library = MeshLibrary::build(&mut engine, self.config.arena, &self.config.templates)
            .context("Failed to generate mesh templates")?;

        let ui = UiManager::new(
            engine.device(),
            engine.queue(),
            engine.surface_format(),
            &window,
        );

        info!("Editor window ready ({}x{})", width, height);
        Ok(GpuState {
            window,
            engine,
            library,
            ui,
        })
    }

    fn redraw(&mut self) -> anyhow::Result<()> {
        let Some(gpu) = self.gpu.as_mut() else {
            return Ok(());
        };

        let stats = self.scene.statistics(&gpu.library);
        let last_frame: FrameStats = self.renderer.last_stats();
        let scene = &self.scene;
        let panel = &mut self.panel;
        let ui_actions = gpu.ui.update_logic(&gpu.window, |ui| {
            editor_panel(ui, panel, scene, &stats, last_frame)
        })?;
        self.pending.extend(ui_actions);

        self.scene.apply_all(self.pending.drain(..));

        let composed = self
            .renderer
            .render_frame(&mut self.scene, &gpu.library, &mut gpu.engine)
            .context("Failed to compose frame");
        if composed.is_err() {
            gpu.ui.discard_frame();
        }
        composed?;

        let ui = &mut gpu.ui;
        let presented = gpu
            .engine
            .present(Some(|device: &wgpu::Device, queue: &wgpu::Queue, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView| {
                ui.render_display_only(device, queue, encoder, view);
            }))
            .context("Failed to present frame");
        // No-op when the overlay ran; ends the frame when the surface was skipped
        gpu.ui.discard_frame();
        presented
    }

    fn pointer_moved(&mut self, position: PhysicalPosition<f64>) {
        if let Some(previous) = self.cursor.replace(position) {
            if self.dragging {
                let dx = (position.x - previous.x) as f32;
                let dy = (position.y - previous.y) as f32;
                if dx != 0.0 || dy != 0.0 {
                    self.pending.push(EditorAction::DragSelected { dx, dy: -dy });
                }
            }
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, e: anyhow::Error) {
        error!("{:#}", e);
        self.fatal = Some(e);
        event_loop.exit();
    }
}

impl ApplicationHandler for EditorApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match self.init_gpu(event_loop) {
            Ok(gpu) => {
                gpu.window.request_redraw();
                self.gpu = Some(gpu);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let ui_captured = gpu.ui.handle_input(&gpu.window, window_id, &event);
        if !matches!(event, WindowEvent::RedrawRequested) {
            gpu.engine.request_frame();
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event: key, .. }
                if key.physical_key == PhysicalKey::Code(KeyCode::Escape) && !ui_captured =>
            {
                event_loop.exit()
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                gpu.engine.resize(width, height);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = state == ElementState::Pressed && !gpu.ui.wants_mouse();
            }
            WindowEvent::CursorMoved { position, .. } => {
                if ui_captured {
                    self.dragging = false;
                }
                self.pointer_moved(position);
            }
            WindowEvent::CursorLeft { .. } => {
                self.dragging = false;
                self.cursor = None;
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
                }
            }
            _ => (),
        }
    }
}
