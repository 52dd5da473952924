// src/ui/manager.rs
//! ImGui integration for the editor window
//!
//! Glues imgui to winit input and to the wgpu frame produced by
//! [`RenderEngine::present`](crate::gfx::rendering::RenderEngine::present).

use anyhow::Context as _;
use imgui::{Context, FontConfig, FontSource, MouseCursor};
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use log::error;
use std::time::Instant;
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::{
    event::{Event, WindowEvent},
    window::{Window, WindowId},
};

/// ImGui context, platform glue and wgpu renderer
pub struct UiManager {
    context: Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
    last_cursor: Option<MouseCursor>,
    /// A frame has been started and not yet rendered
    frame_open: bool,
}

impl UiManager {
    pub fn new(
        device: &Device,
        queue: &Queue,
        output_color_format: TextureFormat,
        window: &Window,
    ) -> Self {
        let mut context = Context::create();
        context.set_ini_filename(None);

        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Locked(1.0));

        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: 16.0,
                ..Default::default()
            }),
        }]);

        let renderer_config = RendererConfig {
            texture_format: output_color_format,
            ..Default::default()
        };
        let renderer = Renderer::new(&mut context, device, queue, renderer_config);

        Self {
            context,
            platform,
            renderer,
            last_frame: Instant::now(),
            last_cursor: None,
            frame_open: false,
        }
    }

    /// Feeds an input event to imgui
    ///
    /// Returns `true` if imgui wants the pointer or keyboard, in which case
    /// the event should not reach the viewport.
    pub fn handle_input(&mut self, window: &Window, window_id: WindowId, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { .. }
            | WindowEvent::MouseInput { .. }
            | WindowEvent::MouseWheel { .. }
            | WindowEvent::KeyboardInput { .. }
            | WindowEvent::ModifiersChanged(_)
            | WindowEvent::Focused(_)
            | WindowEvent::Resized(_)
            | WindowEvent::ScaleFactorChanged { .. } => {
                let wrapped: Event<()> = Event::WindowEvent {
                    window_id,
                    event: event.clone(),
                };
                self.platform
                    .handle_event(self.context.io_mut(), window, &wrapped);
                self.wants_input()
            }
            _ => false,
        }
    }

    pub fn wants_input(&self) -> bool {
        let io = self.context.io();
        io.want_capture_mouse || io.want_capture_keyboard
    }

    pub fn wants_mouse(&self) -> bool {
        self.context.io().want_capture_mouse
    }

    /// Starts an imgui frame and builds it with `run_ui`
    pub fn update_logic<F, R>(&mut self, window: &Window, run_ui: F) -> anyhow::Result<R>
    where
        F: FnOnce(&imgui::Ui) -> R,
    {
        self.discard_frame();

        let now = Instant::now();
        self.context
            .io_mut()
            .update_delta_time(now - self.last_frame);
        self.last_frame = now;

        self.platform
            .prepare_frame(self.context.io_mut(), window)
            .context("Failed to prepare imgui frame")?;

        let ui = self.context.frame();
        self.frame_open = true;
        let result = run_ui(ui);

        if self.last_cursor != ui.mouse_cursor() {
            self.last_cursor = ui.mouse_cursor();
            self.platform.prepare_render(ui, window);
        }

        Ok(result)
    }

    /// Ends the current frame without drawing it
    ///
    /// Called when the surface frame was skipped or composing failed, so the
    /// next [`update_logic`](Self::update_logic) starts from a closed frame.
    pub fn discard_frame(&mut self) {
        end_open_frame(&mut self.context, &mut self.frame_open);
    }

    /// Renders the frame built by the last [`update_logic`](Self::update_logic)
    /// on top of `color_attachment`
    pub fn render_display_only(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        color_attachment: &TextureView,
    ) {
        self.frame_open = false;
        let draw_data = self.context.render();
        if draw_data.display_size[0] <= 0.0 || draw_data.display_size[1] <= 0.0 {
            return;
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("imgui_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_attachment,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Err(e) = self
            .renderer
            .render(draw_data, queue, device, &mut render_pass)
        {
            error!("Failed to render imgui overlay: {:?}", e);
        }
    }
}

/// Renders and drops an unfinished frame; returns whether one was open
fn end_open_frame(context: &mut Context, frame_open: &mut bool) -> bool {
    if !std::mem::take(frame_open) {
        return false;
    }
    context.render();
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_frame_is_ended_before_next() {
        let mut context = Context::create();
        context.set_ini_filename(None);
        context.io_mut().display_size = [800.0, 600.0];
        context.fonts().build_rgba32_texture();

        let mut frame_open = false;
        assert!(!end_open_frame(&mut context, &mut frame_open));

        context.new_frame();
        frame_open = true;
        assert!(end_open_frame(&mut context, &mut frame_open));
        assert!(!frame_open);
        assert!(!end_open_frame(&mut context, &mut frame_open));

        context.new_frame();
        let draw_data = context.render();
        assert_eq!(draw_data.display_size, [800.0, 600.0]);
    }
}
