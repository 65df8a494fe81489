//! Drawing toolbar: tool selection, colors, brush width, history controls,
//! image import, and the mint trigger.

use eframe::egui;

use crate::canvas::{CanvasState, DrawTool, MAX_STROKE_WIDTH, MIN_STROKE_WIDTH};
use crate::components::toasts::Toasts;
use crate::log_warn;
use crate::workflow::MintPhase;

/// Things the toolbar cannot do on its own and hands back to the shell.
pub enum ToolbarAction {
    MintRequested,
}

pub fn show(
    ui: &mut egui::Ui,
    canvas: &mut CanvasState,
    toasts: &mut Toasts,
    mint_phase: MintPhase,
) -> Option<ToolbarAction> {
    let mut action = None;

    ui.horizontal_wrapped(|ui| {
        ui.label("Background:");
        let mut bg = canvas.tool_state.background_color;
        if ui.color_edit_button_srgb(&mut bg).changed() {
            canvas.set_background_color(bg);
        }

        ui.separator();

        let eraser = canvas.tool_state.tool == DrawTool::Eraser;
        if ui.selectable_label(!eraser, "✏ Pen").clicked() {
            canvas.tool_state.tool = DrawTool::Pen;
        }
        if ui.selectable_label(eraser, "◻ Eraser").clicked() {
            canvas.tool_state.tool = DrawTool::Eraser;
        }

        ui.label("Color:");
        ui.color_edit_button_srgb(&mut canvas.tool_state.stroke_color);

        ui.label("Width:");
        ui.add(
            egui::Slider::new(
                &mut canvas.tool_state.stroke_width,
                MIN_STROKE_WIDTH..=MAX_STROKE_WIDTH,
            )
            .fixed_decimals(0),
        );

        ui.separator();

        if ui
            .add_enabled(canvas.history.can_undo(), egui::Button::new("⟲ Undo"))
            .clicked()
        {
            canvas.undo();
        }
        if ui
            .add_enabled(canvas.history.can_redo(), egui::Button::new("⟳ Redo"))
            .clicked()
        {
            canvas.redo();
        }
        if ui.button("🗑 Clear").clicked() {
            canvas.clear();
        }

        ui.separator();

        if ui.button("🖼 Import Image").clicked() {
            import_image(canvas, toasts);
        }

        let idle = mint_phase == MintPhase::Idle;
        let mint_label = if idle { "⬆ Mint NFT" } else { mint_phase.label() };
        if ui
            .add_enabled(idle, egui::Button::new(mint_label))
            .clicked()
        {
            action = Some(ToolbarAction::MintRequested);
        }
        if !idle && mint_phase != MintPhase::Confirmed {
            ui.spinner();
        }
    });

    action
}

fn import_image(canvas: &mut CanvasState, toasts: &mut Toasts) {
    let Some(path) = rfd::FileDialog::new()
        .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp", "bmp"])
        .pick_file()
    else {
        return;
    };
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log_warn!("Could not read {}: {}", path.display(), e);
            toasts.error("Could not read file", Some(e.to_string()));
            return;
        }
    };
    if let Err(e) = canvas.import_image(&bytes) {
        log_warn!("Image import failed: {}", e);
        toasts.error("Import failed", Some(e));
    }
}
