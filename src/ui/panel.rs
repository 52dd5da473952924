// src/ui/panel.rs
//! The "Scene Editor" control panel
//!
//! The panel reads the scene and reports edits as [`EditorAction`]s; the app
//! applies them between frames. Widget state that is not part of the scene
//! (combo choice, hex text being typed) lives in [`PanelState`].

use cgmath::{Point3, Vector3};
use imgui::{Condition, TreeNodeFlags};

use crate::gfx::{
    camera::ProjectionMode,
    color::{parse_hex_color, to_hex_color},
    geometry::PrimitiveKind,
    rendering::FrameStats,
    scene::{EditorAction, Scene, SceneStatistics},
};

const SCALE_RANGE: (f32, f32) = (0.0, 200.0);
const CAMERA_RANGE: (f32, f32) = (-2000.0, 2000.0);

/// Widget state kept between frames
#[derive(Debug, Clone, Default)]
pub struct PanelState {
    kind_index: usize,
    hex_input: String,
    /// Object whose colour `hex_input` was last synced from
    hex_source: Option<String>,
}

impl PanelState {
    pub fn selected_kind(&self) -> PrimitiveKind {
        PrimitiveKind::ALL[self.kind_index.min(PrimitiveKind::ALL.len() - 1)]
    }
}

/// Builds the editor window and returns the edits requested this frame
pub fn editor_panel(
    ui: &imgui::Ui,
    state: &mut PanelState,
    scene: &Scene,
    stats: &SceneStatistics,
    frame: FrameStats,
) -> Vec<EditorAction> {
    let mut actions = Vec::new();

    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return actions;
    }

    ui.window("Scene Editor")
        .size([380.0, display_size[1] * 0.9], Condition::FirstUseEver)
        .position([10.0, 10.0], Condition::FirstUseEver)
        .resizable(true)
        .collapsible(true)
        .build(|| {
            render_create_controls(ui, state, &mut actions);
            ui.separator();
            render_object_list(ui, scene, &mut actions);
            ui.separator();
            render_selected_controls(ui, state, scene, &mut actions);
            ui.separator();
            render_view_controls(ui, scene, &mut actions);
            ui.separator();
            render_statistics(ui, stats, frame);
        });

    actions
}

fn render_create_controls(ui: &imgui::Ui, state: &mut PanelState, actions: &mut Vec<EditorAction>) {
    let names = PrimitiveKind::ALL.map(|kind| kind.as_str());
    ui.combo_simple_string("Type", &mut state.kind_index, &names);
    ui.same_line();
    if ui.button("Create") {
        actions.push(EditorAction::CreateObject(state.selected_kind()));
    }
}

fn render_object_list(ui: &imgui::Ui, scene: &Scene, actions: &mut Vec<EditorAction>) {
    ui.text(format!("Objects ({})", scene.objects().len()));

    ui.child_window("object_list")
        .size([0.0, 150.0])
        .border(true)
        .build(|| {
            for object in scene.objects() {
                let is_selected = scene.selected_name() == Some(object.name());
                if ui
                    .selectable_config(object.name())
                    .selected(is_selected)
                    .build()
                    && !is_selected
                {
                    actions.push(EditorAction::SelectObject(object.name().to_string()));
                }
            }
        });

    if let Some(name) = scene.selected_name() {
        if ui.button("Delete") {
            actions.push(EditorAction::DeleteObject(name.to_string()));
        }
        ui.same_line();
    }
    if ui.button("Clear") {
        actions.push(EditorAction::Reset);
    }
}

fn render_selected_controls(
    ui: &imgui::Ui,
    state: &mut PanelState,
    scene: &Scene,
    actions: &mut Vec<EditorAction>,
) {
    let Some(object) = scene.selected() else {
        ui.text_disabled("No object selected");
        return;
    };

    if !ui.collapsing_header("Selected object", TreeNodeFlags::DEFAULT_OPEN) {
        return;
    }
    ui.text(format!("{} ({})", object.name(), object.kind()));

    let bounds = scene.bounds();
    let transform = *object.transform();
    let mut scale: [f32; 3] = transform.scale.into();
    let mut rotate: [f32; 3] = transform.rotate.into();
    let mut translate: [f32; 3] = transform.translate.into();

    let mut changed = ui
        .slider_config("Scale", SCALE_RANGE.0, SCALE_RANGE.1)
        .build_array(&mut scale);
    changed |= ui
        .slider_config("Rotate", bounds.rotate_min.x, bounds.rotate_max.x)
        .build_array(&mut rotate);
    changed |= ui
        .slider_config("Position", bounds.translate_min.x, bounds.translate_max.x)
        .build_array(&mut translate);
    if changed {
        actions.push(EditorAction::SetTransform {
            scale: Vector3::from(scale),
            rotate: Vector3::from(rotate),
            translate: Vector3::from(translate),
        });
    }

    if state.hex_source.as_deref() != Some(object.name()) {
        state.hex_input = scene.picker_color().to_string();
        state.hex_source = Some(object.name().to_string());
    }

    let [r, g, b, _] = object.color();
    let mut rgb = [r, g, b];
    if ui.color_edit3("Color", &mut rgb) {
        let hex = to_hex_color([rgb[0], rgb[1], rgb[2], 1.0]);
        state.hex_input = hex.clone();
        actions.push(EditorAction::SetColor(hex));
    }

    if ui
        .input_text("Hex", &mut state.hex_input)
        .enter_returns_true(true)
        .build()
    {
        actions.push(EditorAction::SetColor(state.hex_input.clone()));
    }
    if parse_hex_color(&state.hex_input).is_err() {
        ui.text_colored([1.0, 0.4, 0.4, 1.0], "expected #rrggbb");
    }
}

fn render_view_controls(ui: &imgui::Ui, scene: &Scene, actions: &mut Vec<EditorAction>) {
    if ui.collapsing_header("Camera", TreeNodeFlags::DEFAULT_OPEN) {
        let camera = scene.camera();
        let mut eye: [f32; 3] = camera.eye.into();
        let mut look_at: [f32; 3] = camera.look_at.into();

        let mut changed = ui
            .slider_config("Eye", CAMERA_RANGE.0, CAMERA_RANGE.1)
            .build_array(&mut eye);
        changed |= ui
            .slider_config("Look at", CAMERA_RANGE.0, CAMERA_RANGE.1)
            .build_array(&mut look_at);
        if changed {
            actions.push(EditorAction::SetCamera {
                eye: Point3::from(eye),
                look_at: Point3::from(look_at),
            });
        }

        let mode = scene.projection();
        if ui.radio_button_bool("Perspective", mode == ProjectionMode::Perspective) {
            actions.push(EditorAction::SetProjection(ProjectionMode::Perspective));
        }
        ui.same_line();
        if ui.radio_button_bool("Orthographic", mode == ProjectionMode::Orthographic) {
            actions.push(EditorAction::SetProjection(ProjectionMode::Orthographic));
        }
    }

    let mut animating = scene.is_animating();
    if ui.checkbox("Animate lights", &mut animating) {
        actions.push(EditorAction::SetAnimating(animating));
    }
}

fn render_statistics(ui: &imgui::Ui, stats: &SceneStatistics, frame: FrameStats) {
    ui.text(format!("Frame: {}", frame.frame));
    ui.text(format!("Draw calls: {}", frame.draw_calls));
    ui.text(format!("Objects: {}", stats.object_count));
    ui.text(format!("Lights: {}", stats.light_count));
    ui.text(format!("Triangles: {}", stats.total_triangles));
    ui.text(format!("Vertices: {}", stats.total_vertices));
}
