//! Modal collecting the NFT name and description before submission.

use eframe::egui;

pub struct MintRequest {
    pub name: String,
    pub description: String,
}

#[derive(Default)]
pub struct MintDialog {
    pub open: bool,
    name: String,
    description: String,
}

impl MintDialog {
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Returns the submitted request the frame the user confirms.
    pub fn show(&mut self, ctx: &egui::Context) -> Option<MintRequest> {
        if !self.open {
            return None;
        }
        let mut request = None;
        let mut open = self.open;

        egui::Window::new("Mint your artwork")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label("Name");
                ui.text_edit_singleline(&mut self.name);
                ui.add_space(6.0);
                ui.label("Description");
                ui.add(
                    egui::TextEdit::multiline(&mut self.description)
                        .desired_rows(3)
                        .desired_width(280.0),
                );
                ui.add_space(10.0);

                let complete =
                    !self.name.trim().is_empty() && !self.description.trim().is_empty();
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(complete, egui::Button::new("Mint"))
                        .clicked()
                    {
                        request = Some(MintRequest {
                            name: self.name.trim().to_string(),
                            description: self.description.trim().to_string(),
                        });
                    }
                    if ui.button("Cancel").clicked() {
                        self.open = false;
                    }
                });
                if !complete {
                    ui.label(
                        egui::RichText::new("Both fields are required.")
                            .small()
                            .weak(),
                    );
                }
            });

        if !open {
            self.open = false;
        }
        if request.is_some() {
            self.open = false;
            self.name.clear();
            self.description.clear();
        }
        request
    }
}
