//! Wallet connection modal: RPC endpoint plus signing key.

use eframe::egui;

pub struct ConnectRequest {
    pub rpc_url: String,
    pub private_key: String,
}

pub struct ConnectDialog {
    pub open: bool,
    rpc_url: String,
    private_key: String,
}

impl ConnectDialog {
    pub fn new(default_rpc_url: &str) -> Self {
        Self {
            open: false,
            rpc_url: default_rpc_url.to_string(),
            private_key: String::new(),
        }
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn show(&mut self, ctx: &egui::Context, busy: bool) -> Option<ConnectRequest> {
        if !self.open {
            return None;
        }
        let mut request = None;
        let mut open = self.open;

        egui::Window::new("Connect wallet")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label("RPC endpoint");
                ui.text_edit_singleline(&mut self.rpc_url);
                ui.add_space(6.0);
                ui.label("Private key");
                ui.add(egui::TextEdit::singleline(&mut self.private_key).password(true));
                ui.add_space(10.0);

                let complete =
                    !self.rpc_url.trim().is_empty() && !self.private_key.trim().is_empty();
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(complete && !busy, egui::Button::new("Connect"))
                        .clicked()
                    {
                        request = Some(ConnectRequest {
                            rpc_url: self.rpc_url.trim().to_string(),
                            private_key: self.private_key.trim().to_string(),
                        });
                    }
                    if busy {
                        ui.spinner();
                        ui.label("Connecting…");
                    }
                });
            });

        if !open {
            self.open = false;
        }
        if request.is_some() {
            self.open = false;
            // Never keep key material around longer than the dialog needs it.
            self.private_key.clear();
        }
        request
    }
}
