//! Token factory page: deployment form and the list of tokens this
//! installation has deployed.

use eframe::egui;

use crate::config::AppConfig;
use crate::storage::token_log::DeployedTokenRecord;
use crate::theme::Theme;

pub struct TokenDeployRequest {
    pub name: String,
    pub symbol: String,
    pub supply: String,
    pub recipient: String,
}

pub struct TokenForm {
    name: String,
    symbol: String,
    supply: String,
    recipient: String,
}

impl Default for TokenForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            symbol: String::new(),
            supply: "1000000".to_string(),
            recipient: String::new(),
        }
    }
}

impl TokenForm {
    /// Prefill the recipient with the connected account once known.
    pub fn suggest_recipient(&mut self, account: &str) {
        if self.recipient.is_empty() {
            self.recipient = account.to_string();
        }
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        theme: &Theme,
        config: &AppConfig,
        records: &[DeployedTokenRecord],
        deploying: bool,
    ) -> Option<TokenDeployRequest> {
        let mut request = None;

        ui.heading("Create a token");
        ui.label(
            egui::RichText::new("Deploy an ERC-20 through the token factory.")
                .color(theme.muted_text()),
        );
        ui.add_space(8.0);

        egui::Grid::new("token_form")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("Name");
                ui.text_edit_singleline(&mut self.name);
                ui.end_row();

                ui.label("Symbol");
                if ui.text_edit_singleline(&mut self.symbol).changed() {
                    self.symbol = self
                        .symbol
                        .chars()
                        .filter(|c| c.is_ascii_alphanumeric())
                        .take(5)
                        .collect::<String>()
                        .to_ascii_uppercase();
                }
                ui.end_row();

                ui.label("Total supply");
                ui.text_edit_singleline(&mut self.supply);
                ui.end_row();

                ui.label("Recipient");
                ui.text_edit_singleline(&mut self.recipient);
                ui.end_row();
            });

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            let label = if deploying { "Deploying…" } else { "Deploy token" };
            if ui
                .add_enabled(!deploying, egui::Button::new(label))
                .clicked()
            {
                request = Some(TokenDeployRequest {
                    name: self.name.trim().to_string(),
                    symbol: self.symbol.trim().to_string(),
                    supply: self.supply.trim().to_string(),
                    recipient: self.recipient.trim().to_string(),
                });
            }
            if deploying {
                ui.spinner();
            }
        });

        ui.add_space(16.0);
        ui.separator();
        ui.heading("Deployed tokens");
        if records.is_empty() {
            ui.label(
                egui::RichText::new("Nothing deployed from this machine yet.")
                    .color(theme.muted_text()),
            );
        } else {
            for record in records.iter().rev() {
                ui.horizontal(|ui| {
                    ui.strong(format!("{} ({})", record.name, record.symbol));
                    ui.hyperlink_to(
                        shorten(&record.address),
                        config.token_explorer_url(&record.address),
                    );
                });
            }
        }

        request
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn shorten(address: &str) -> String {
    if address.len() > 12 {
        format!("{}…{}", &address[..6], &address[address.len() - 4..])
    } else {
        address.to_string()
    }
}
