//! Transient notification stack, rendered bottom-right.
//!
//! Every recoverable error in the app ends up here; nothing modal, nothing
//! fatal. Entries expire on their own but can be dismissed early.

use std::time::{Duration, Instant};

use eframe::egui;

use crate::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl ToastLevel {
    fn default_ttl(self) -> Duration {
        match self {
            ToastLevel::Info => Duration::from_secs(4),
            ToastLevel::Success => Duration::from_secs(10),
            ToastLevel::Warning => Duration::from_secs(3),
            ToastLevel::Error => Duration::from_secs(7),
        }
    }
}

pub struct Toast {
    pub level: ToastLevel,
    pub title: String,
    pub detail: Option<String>,
    created: Instant,
    ttl: Duration,
}

#[derive(Default)]
pub struct Toasts {
    entries: Vec<Toast>,
}

impl Toasts {
    pub fn push(&mut self, level: ToastLevel, title: impl Into<String>, detail: Option<String>) {
        self.entries.push(Toast {
            level,
            title: title.into(),
            detail,
            created: Instant::now(),
            ttl: level.default_ttl(),
        });
    }

    pub fn info(&mut self, title: impl Into<String>) {
        self.push(ToastLevel::Info, title, None);
    }

    pub fn success(&mut self, title: impl Into<String>, detail: Option<String>) {
        self.push(ToastLevel::Success, title, detail);
    }

    pub fn warning(&mut self, title: impl Into<String>) {
        self.push(ToastLevel::Warning, title, None);
    }

    pub fn error(&mut self, title: impl Into<String>, detail: Option<String>) {
        self.push(ToastLevel::Error, title, detail);
    }

    pub fn show(&mut self, ctx: &egui::Context, theme: &Theme) {
        self.entries.retain(|t| t.created.elapsed() < t.ttl);
        if self.entries.is_empty() {
            return;
        }
        // Keep the clock ticking so expiry happens without user input.
        ctx.request_repaint_after(Duration::from_millis(250));

        egui::Area::new(egui::Id::new("toast_stack"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                ui.set_max_width(340.0);
                let mut dismiss: Option<usize> = None;
                for (i, toast) in self.entries.iter().enumerate() {
                    let stripe = match toast.level {
                        ToastLevel::Info => theme.accent,
                        ToastLevel::Success => theme.success(),
                        ToastLevel::Warning => theme.warning(),
                        ToastLevel::Error => theme.danger(),
                    };
                    egui::Frame::popup(ui.style())
                        .stroke(egui::Stroke::new(1.5, stripe))
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.vertical(|ui| {
                                    ui.strong(&toast.title);
                                    if let Some(detail) = &toast.detail {
                                        ui.label(
                                            egui::RichText::new(detail)
                                                .small()
                                                .color(theme.muted_text()),
                                        );
                                    }
                                });
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Min),
                                    |ui| {
                                        if ui.small_button("✕").clicked() {
                                            dismiss = Some(i);
                                        }
                                    },
                                );
                            });
                        });
                    ui.add_space(6.0);
                }
                if let Some(i) = dismiss {
                    self.entries.remove(i);
                }
            });
    }
}
