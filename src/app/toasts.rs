//! Stacked toast notifications (bottom-right, fade out, pause on hover)

use super::App;
use crate::theme;
use crate::types::{Notice, NoticeLevel};
use eframe::egui;
use std::time::Instant;

const VISIBLE_SECS: f32 = 4.0;
const FADE_SECS: f32 = 0.5;
const MAX_SHOWN: usize = 4;

pub(crate) struct Toast {
    pub notice: Notice,
    pub start: Instant,
}

impl Toast {
    pub fn new(notice: Notice) -> Self {
        Self {
            notice,
            start: Instant::now(),
        }
    }

    fn lifetime(&self) -> f32 {
        // Celebrations and errors linger a little longer
        match self.notice.level {
            NoticeLevel::Celebrate | NoticeLevel::Error => VISIBLE_SECS * 1.5,
            _ => VISIBLE_SECS,
        }
    }

    fn alpha(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        let visible = self.lifetime();
        if elapsed > visible {
            ((visible + FADE_SECS - elapsed) / FADE_SECS).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    fn expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= self.lifetime() + FADE_SECS
    }
}

impl App {
    pub(crate) fn render_toasts(&mut self, ctx: &egui::Context) {
        self.toasts.retain(|t| !t.expired());
        if self.toasts.is_empty() {
            return;
        }
        let excess = self.toasts.len().saturating_sub(MAX_SHOWN);
        self.toasts.drain(..excess);

        let screen = ctx.screen_rect();
        let margin = 16.0;
        let mut bottom = screen.bottom() - margin;
        let mut hovered = Vec::new();

        for (i, toast) in self.toasts.iter().enumerate().rev() {
            let alpha = toast.alpha();
            let accent = theme::notice_color(toast.notice.level);
            let response = egui::Area::new(egui::Id::new(("toast", i)))
                .fixed_pos(egui::pos2(screen.right() - margin, bottom))
                .pivot(egui::Align2::RIGHT_BOTTOM)
                .order(egui::Order::Foreground)
                .show(ctx, |ui| {
                    egui::Frame::new()
                        .fill(theme::BG_CARD.gamma_multiply(alpha))
                        .stroke(egui::Stroke::new(theme::STROKE_DEFAULT, accent.gamma_multiply(alpha * 0.6)))
                        .corner_radius(theme::RADIUS_LARGE)
                        .inner_margin(egui::Margin::symmetric(16, 10))
                        .show(ui, |ui| {
                            ui.set_max_width(theme::TOAST_WIDTH);
                            ui.label(
                                egui::RichText::new(&toast.notice.title)
                                    .strong()
                                    .color(accent.gamma_multiply(alpha)),
                            );
                            if !toast.notice.body.is_empty() {
                                ui.label(
                                    egui::RichText::new(&toast.notice.body)
                                        .size(theme::FONT_LABEL)
                                        .color(theme::TEXT_SECONDARY.gamma_multiply(alpha)),
                                );
                            }
                        });
                })
                .response;
            if response.hovered() {
                hovered.push(i);
            }
            bottom = response.rect.top() - theme::SPACING_MD;
        }

        // Pause timer while hovering
        for i in hovered {
            self.toasts[i].start = Instant::now();
        }
        ctx.request_repaint();
    }
}
