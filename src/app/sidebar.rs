//! Left navigation panel with the player summary

use super::{App, Page};
use crate::constants::{APP_NAME, APP_TAGLINE, APP_VERSION};
use crate::theme;
use crate::ui::components;
use crate::utils::{format_points, now_local};
use eframe::egui;
use egui_phosphor::regular as icons;

const NAV_HEIGHT: f32 = 34.0;
const EVENTS_SHOWN: usize = 2;

impl App {
    pub(crate) fn render_sidebar(&mut self, ui: &mut egui::Ui) {
        ui.add_space(theme::SPACING_LG);
        ui.with_layout(egui::Layout::top_down(egui::Align::Center), |ui| {
            ui.add(
                egui::Label::new(
                    egui::RichText::new(APP_NAME)
                        .size(theme::FONT_HERO)
                        .strong()
                        .color(theme::ACCENT_LIGHT),
                )
                .selectable(false),
            );
            ui.add(
                egui::Label::new(
                    egui::RichText::new(APP_TAGLINE)
                        .size(theme::FONT_SMALL)
                        .color(theme::TEXT_DIM),
                )
                .wrap()
                .selectable(false),
            );
        });
        ui.add_space(theme::SPACING_LG);

        self.render_player_summary(ui);
        ui.add_space(theme::SPACING_LG);

        let mut clicked = None;
        for page in Page::ALL {
            if nav_button(ui, page, self.page == page) {
                clicked = Some(page);
            }
        }
        if let Some(page) = clicked {
            self.set_page(page);
        }

        ui.with_layout(egui::Layout::bottom_up(egui::Align::Center), |ui| {
            ui.add_space(theme::SPACING_SM);
            ui.add(
                egui::Label::new(
                    egui::RichText::new(format!("v{}", APP_VERSION))
                        .size(theme::FONT_SMALL)
                        .color(theme::TEXT_DIM),
                )
                .selectable(false),
            );
        });
    }

    fn render_player_summary(&self, ui: &mut egui::Ui) {
        let now = now_local();
        let user = self.game.user();
        theme::card_frame()
            .inner_margin(egui::Margin::same(theme::SPACING_LG as i8))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(&self.settings.username)
                            .size(theme::FONT_HEADING)
                            .strong()
                            .color(theme::TEXT_PRIMARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        components::rank_badge(ui, self.game.player_rank());
                    });
                });
                ui.add_space(theme::SPACING_SM);

                ui.label(
                    egui::RichText::new(format!(
                        "{} {} day streak  (x{:.2})",
                        icons::FIRE,
                        user.streak,
                        user.multipliers.streak
                    ))
                    .color(theme::STREAK_FIRE),
                );
                let job = self.game.current_job().map_or("Unemployed", |j| j.name);
                ui.label(
                    egui::RichText::new(format!("{} {}", icons::BRIEFCASE, job))
                        .size(theme::FONT_LABEL)
                        .color(theme::TEXT_SECONDARY),
                );
                ui.label(
                    egui::RichText::new(format!(
                        "{} {} total points",
                        icons::STAR,
                        format_points(user.attributes.total())
                    ))
                    .size(theme::FONT_LABEL)
                    .color(theme::TEXT_MUTED),
                );
                if self.game.has_active_penalty(now) {
                    ui.label(
                        egui::RichText::new(format!("{} Penalty active", icons::WARNING))
                            .size(theme::FONT_LABEL)
                            .color(theme::STATUS_ERROR),
                    );
                }

                let active: Vec<(String, egui::Color32)> = user
                    .active_events
                    .iter()
                    .filter_map(|e| e.definition())
                    .map(|def| (format!("{} {}", def.icon, def.name), theme::rarity_color(def.rarity)))
                    .chain(self.game.state().dynamic_events.iter().map(|e| {
                        let color = theme::parse_hex_color(&e.color)
                            .unwrap_or_else(|| theme::rarity_color(e.rarity));
                        (format!("{} {}", e.icon, e.name), color)
                    }))
                    .collect();
                if !active.is_empty() {
                    ui.add_space(theme::SPACING_SM);
                    for (text, color) in active.iter().take(EVENTS_SHOWN) {
                        ui.label(egui::RichText::new(text).size(theme::FONT_SMALL).color(*color));
                    }
                    if active.len() > EVENTS_SHOWN {
                        ui.label(
                            egui::RichText::new(format!("+{} more", active.len() - EVENTS_SHOWN))
                                .size(theme::FONT_SMALL)
                                .color(theme::TEXT_DIM),
                        );
                    }
                }
            });
    }
}

/// Full-width navigation row. Returns true when clicked.
fn nav_button(ui: &mut egui::Ui, page: Page, selected: bool) -> bool {
    let (rect, response) =
        ui.allocate_exact_size(egui::vec2(ui.available_width(), NAV_HEIGHT), egui::Sense::click());
    if response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }
    if ui.is_rect_visible(rect) {
        let base = if selected { theme::BG_HOVER } else { theme::BG_SIDEBAR };
        let (fill, draw_rect) = theme::button_visual(&response, base, rect);
        let painter = ui.painter();
        painter.rect_filled(draw_rect, theme::RADIUS_DEFAULT, fill);
        if selected {
            let bar = egui::Rect::from_min_size(draw_rect.min, egui::vec2(3.0, draw_rect.height()));
            painter.rect_filled(bar, theme::RADIUS_SMALL, theme::ACCENT);
        }
        let color = if selected { theme::TEXT_PRIMARY } else { theme::TEXT_MUTED };
        painter.text(
            egui::pos2(draw_rect.min.x + 14.0, draw_rect.center().y),
            egui::Align2::LEFT_CENTER,
            format!("{}   {}", page.icon(), page.label()),
            egui::FontId::proportional(theme::FONT_BODY),
            color,
        );
    }
    response.clicked()
}
