//! Events page: running special events, dynamic events and history

use super::App;
use crate::constants::EVENT_HISTORY_SHOWN;
use crate::dynamic_events::DynamicEvent;
use crate::events::{EventInstance, EventKind};
use crate::theme;
use crate::ui::components;
use crate::utils::{format_remaining, format_time_ago, now_local};
use chrono::NaiveDateTime;
use eframe::egui;
use egui_phosphor::regular as icons;

impl App {
    pub(crate) fn render_events_page(&mut self, ui: &mut egui::Ui) {
        let now = now_local();
        let user = self.game.user();

        ui.horizontal_wrapped(|ui| {
            components::stat_card(
                ui,
                icons::LIGHTNING,
                "Event Multiplier",
                &format!("x{:.2}", self.game.active_event_multiplier()),
            );
            components::stat_card(
                ui,
                icons::SPARKLE,
                "Active Events",
                &(user.active_events.len() + self.game.state().dynamic_events.len()).to_string(),
            );
            components::stat_card(
                ui,
                icons::CLOCK_COUNTER_CLOCKWISE,
                "Past Events",
                &user.event_history.len().to_string(),
            );
        });
        ui.add_space(theme::SPACING_LG);

        components::section_header(ui, icons::CALENDAR_CHECK, "Special Events");
        if user.active_events.is_empty() {
            ui.label(
                egui::RichText::new("No special events right now. Check back later!")
                    .color(theme::TEXT_DIM),
            );
        }
        for instance in &user.active_events {
            special_event_card(ui, instance, now);
            ui.add_space(theme::SPACING_SM);
        }
        ui.add_space(theme::SPACING_LG);

        components::section_header(ui, icons::SHUFFLE, "Dynamic Events");
        let dynamic = &self.game.state().dynamic_events;
        if dynamic.is_empty() {
            ui.label(egui::RichText::new("No dynamic events active").color(theme::TEXT_DIM));
        }
        for event in dynamic {
            dynamic_event_card(ui, event, now);
            ui.add_space(theme::SPACING_SM);
        }
        ui.add_space(theme::SPACING_LG);

        let mut toggle_history = false;
        ui.horizontal(|ui| {
            components::section_header(ui, icons::CLOCK_COUNTER_CLOCKWISE, "History");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = if self.events_show_history { "Hide" } else { "Show" };
                toggle_history = ui.add(theme::button(label)).clicked();
            });
        });
        if self.events_show_history {
            let history = &self.game.user().event_history;
            if history.is_empty() {
                ui.label(egui::RichText::new("No past events").color(theme::TEXT_DIM));
            }
            for instance in history.iter().rev().take(EVENT_HISTORY_SHOWN) {
                history_row(ui, instance, now);
            }
        }
        if toggle_history {
            self.events_show_history = !self.events_show_history;
        }
    }
}

fn special_event_card(ui: &mut egui::Ui, instance: &EventInstance, now: NaiveDateTime) {
    let Some(event) = instance.definition() else {
        return;
    };
    let color = theme::rarity_color(event.rarity);
    theme::accent_card_frame(color).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(event.icon).size(theme::FONT_TITLE));
            ui.vertical(|ui| {
                let target = instance.attribute.map(|a| format!(" ({})", a)).unwrap_or_default();
                ui.label(
                    egui::RichText::new(format!("{}{}", event.name, target))
                        .size(theme::FONT_HEADING)
                        .strong()
                        .color(color),
                );
                ui.label(egui::RichText::new(event.description).color(theme::TEXT_MUTED));
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                components::pill(
                    ui,
                    &format!("{} {}", icons::TIMER, format_remaining(instance.ends_at, now)),
                    theme::TEXT_SECONDARY,
                );
                if event.kind == EventKind::Challenge {
                    components::pill(ui, "Challenge", theme::STATUS_WARNING);
                }
                components::pill(ui, event.rarity.label(), color);
            });
        });
    });
}

fn dynamic_event_card(ui: &mut egui::Ui, event: &DynamicEvent, now: NaiveDateTime) {
    let color = theme::parse_hex_color(&event.color).unwrap_or_else(|| theme::rarity_color(event.rarity));
    theme::accent_card_frame(color).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(&event.icon).size(theme::FONT_TITLE));
            ui.vertical(|ui| {
                ui.label(
                    egui::RichText::new(&event.name)
                        .size(theme::FONT_HEADING)
                        .strong()
                        .color(color),
                );
                ui.label(
                    egui::RichText::new(format!("{} {}", event.effect.kind.icon(), event.effect.description))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.label(
                    egui::RichText::new(event.condition.description())
                        .size(theme::FONT_LABEL)
                        .color(theme::TEXT_MUTED),
                );
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                components::pill(
                    ui,
                    &format!("{} {}", icons::TIMER, format_remaining(event.ends_at(), now)),
                    theme::TEXT_SECONDARY,
                );
                if event.triggered {
                    components::pill(ui, "Active", theme::STATUS_SUCCESS);
                } else {
                    components::pill(ui, "Waiting", theme::TEXT_DIM);
                }
                components::pill(ui, event.rarity.label(), color);
            });
        });
        if let Some(challenge) = &event.challenge {
            ui.add_space(theme::SPACING_SM);
            ui.label(
                egui::RichText::new(format!("{} Bonus challenge: {}", icons::FLAG, challenge.description()))
                    .size(theme::FONT_LABEL)
                    .color(theme::STATUS_WARNING),
            );
            if let Some(reward) = &event.bonus_reward {
                ui.label(
                    egui::RichText::new(&reward.description)
                        .size(theme::FONT_SMALL)
                        .color(theme::TEXT_DIM),
                );
            }
        }
    });
}

fn history_row(ui: &mut egui::Ui, instance: &EventInstance, now: NaiveDateTime) {
    let (name, icon) = instance
        .definition()
        .map_or((instance.event.as_str(), "•"), |e| (e.name, e.icon));
    ui.horizontal(|ui| {
        ui.label(format!("{} {}", icon, name));
        match instance.challenge_completed {
            Some(true) => {
                components::pill(ui, "Succeeded", theme::STATUS_SUCCESS);
            }
            Some(false) => {
                components::pill(ui, "Failed", theme::STATUS_ERROR);
            }
            None => {}
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let ended = instance.completed_at.unwrap_or(instance.ends_at);
            ui.label(
                egui::RichText::new(format_time_ago(ended, now))
                    .size(theme::FONT_SMALL)
                    .color(theme::TEXT_DIM),
            );
        });
    });
}
