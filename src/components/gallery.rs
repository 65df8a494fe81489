//! Collection page: grid of owned NFTs with their metadata and images.

use std::collections::HashMap;

use eframe::egui;

use crate::collection::NftRecord;
use crate::config::AppConfig;
use crate::theme::Theme;

const CARD_WIDTH: f32 = 220.0;
const IMAGE_SIDE: f32 = 200.0;

pub fn show(
    ui: &mut egui::Ui,
    theme: &Theme,
    config: &AppConfig,
    records: &[NftRecord],
    images: &HashMap<u64, egui::TextureHandle>,
    loading: bool,
) {
    if loading {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.spinner();
            ui.label("Loading your collection…");
        });
        return;
    }
    if records.is_empty() {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading("No NFTs yet");
            ui.label(
                egui::RichText::new("Mint something from the canvas to see it here.")
                    .color(theme.muted_text()),
            );
        });
        return;
    }

    let columns = ((ui.available_width() / (CARD_WIDTH + 16.0)).floor() as usize).max(1);
    egui::ScrollArea::vertical().show(ui, |ui| {
        egui::Grid::new("nft_gallery")
            .num_columns(columns)
            .spacing([16.0, 16.0])
            .show(ui, |ui| {
                for (i, record) in records.iter().enumerate() {
                    card(ui, theme, config, record, images.get(&record.token_id));
                    if (i + 1) % columns == 0 {
                        ui.end_row();
                    }
                }
            });
    });
}

fn card(
    ui: &mut egui::Ui,
    theme: &Theme,
    config: &AppConfig,
    record: &NftRecord,
    texture: Option<&egui::TextureHandle>,
) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(CARD_WIDTH);
        ui.vertical(|ui| {
            match texture {
                Some(tex) => {
                    let size = fitted(tex.size_vec2());
                    ui.add(egui::Image::new((tex.id(), size)));
                }
                None => {
                    let (rect, _) = ui.allocate_exact_size(
                        egui::vec2(IMAGE_SIDE, IMAGE_SIDE),
                        egui::Sense::hover(),
                    );
                    ui.painter().rect_filled(
                        rect,
                        4.0,
                        ui.visuals().extreme_bg_color,
                    );
                    let label = if record.load_failed { "⚠" } else { "…" };
                    ui.painter().text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        label,
                        egui::FontId::proportional(28.0),
                        theme.muted_text(),
                    );
                }
            }
            ui.add_space(6.0);
            ui.strong(&record.name);
            ui.label(
                egui::RichText::new(&record.description)
                    .small()
                    .color(theme.muted_text()),
            );
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(format!("#{}", record.token_id))
                        .small()
                        .color(theme.accent),
                );
                ui.hyperlink_to(
                    egui::RichText::new("View on explorer").small(),
                    config.nft_explorer_url(&record.contract_address, record.token_id),
                );
            });
        });
    });
}

fn fitted(size: egui::Vec2) -> egui::Vec2 {
    if size.x <= 0.0 || size.y <= 0.0 {
        return egui::vec2(IMAGE_SIDE, IMAGE_SIDE);
    }
    let scale = (IMAGE_SIDE / size.x).min(IMAGE_SIDE / size.y);
    size * scale
}
