//! Light/dark theming for the egui shell.

use eframe::egui;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

#[derive(Clone, Copy)]
pub struct Theme {
    pub mode: ThemeMode,
    pub accent: egui::Color32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            mode: ThemeMode::Dark,
            accent: egui::Color32::from_rgb(49, 130, 206),
        }
    }

    pub fn light() -> Self {
        Self {
            mode: ThemeMode::Light,
            accent: egui::Color32::from_rgb(49, 130, 206),
        }
    }

    pub fn toggled(self) -> Self {
        match self.mode {
            ThemeMode::Light => Self::dark(),
            ThemeMode::Dark => Self::light(),
        }
    }

    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = match self.mode {
            ThemeMode::Dark => egui::Visuals::dark(),
            ThemeMode::Light => egui::Visuals::light(),
        };
        visuals.selection.bg_fill = self.accent;
        visuals.hyperlink_color = self.accent;
        visuals.widgets.hovered.bg_stroke.color = self.accent;
        visuals.widgets.active.bg_stroke.color = self.accent;
        ctx.set_visuals(visuals);
    }

    /// Secondary text color for captions and descriptions.
    pub fn muted_text(&self) -> egui::Color32 {
        match self.mode {
            ThemeMode::Dark => egui::Color32::from_gray(160),
            ThemeMode::Light => egui::Color32::from_gray(100),
        }
    }

    pub fn success(&self) -> egui::Color32 {
        egui::Color32::from_rgb(72, 187, 120)
    }

    pub fn danger(&self) -> egui::Color32 {
        egui::Color32::from_rgb(245, 101, 101)
    }

    pub fn warning(&self) -> egui::Color32 {
        egui::Color32::from_rgb(237, 137, 54)
    }
}
