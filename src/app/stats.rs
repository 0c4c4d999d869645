//! Statistics page

use super::App;
use crate::theme;
use crate::types::PenaltyTarget;
use crate::ui::components;
use crate::utils::{format_points, now_local};
use eframe::egui;
use egui_phosphor::regular as icons;

const ROW_HEIGHT: f32 = 22.0;
const HEADER_HEIGHT: f32 = 24.0;
const PENALTIES_SHOWN: usize = 20;

fn header_label(ui: &mut egui::Ui, text: &str) {
    ui.label(
        egui::RichText::new(text)
            .size(theme::FONT_LABEL)
            .strong()
            .color(theme::TEXT_MUTED),
    );
}

impl App {
    pub(crate) fn render_stats_page(&mut self, ui: &mut egui::Ui) {
        use egui_extras::{Column, TableBuilder};

        let now = now_local();
        let tasks = self.game.task_stats();
        let attrs = self.game.attribute_stats();
        let career = self.game.career_stats(now);
        let penalties = self.game.penalty_stats();
        let achievements = self.game.achievement_stats();
        let logged = self.db.as_ref().and_then(|db| db.completion_count().ok());

        components::section_header(ui, icons::LIST_CHECKS, "Tasks");
        ui.horizontal_wrapped(|ui| {
            components::stat_card(
                ui,
                icons::CHECK_CIRCLE,
                "Completed Today",
                &format!("{}/{}", tasks.completed, tasks.total),
            );
            components::stat_card(
                ui,
                icons::PERCENT,
                "Completion Rate",
                &format!("{:.0}%", tasks.completion_rate * 100.0),
            );
            components::stat_card(ui, icons::SUN, "Daily Done", &tasks.daily_completed.to_string());
            components::stat_card(ui, icons::CALENDAR, "Weekly Done", &tasks.weekly_completed.to_string());
            components::stat_card(ui, icons::FIRE, "Best Streak", &format!("{} days", tasks.max_streak));
            components::stat_card(
                ui,
                icons::INFINITY,
                "Lifetime",
                &logged.map_or(tasks.lifetime_completed, |n| tasks.lifetime_completed.max(n as u64)).to_string(),
            );
        });
        ui.add_space(theme::SPACING_LG);

        components::section_header(ui, icons::POLYGON, "Attributes");
        ui.horizontal_wrapped(|ui| {
            components::stat_card(
                ui,
                icons::CROWN,
                "Strongest",
                &format!("{} ({})", attrs.highest, format_points(attrs.highest_value)),
            );
            components::stat_card(ui, icons::STAR, "Total", &format_points(attrs.total));
            components::stat_card(ui, icons::SCALES, "Average", &format!("{:.1}", attrs.average));
            components::stat_card(
                ui,
                icons::TREND_UP,
                "Points Earned",
                &format_points(self.game.user().stats.total_points_earned),
            );
        });
        ui.add_space(theme::SPACING_LG);

        theme::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            components::section_header(ui, icons::CALENDAR_BLANK, "Activity by Weekday and Hour");
            let map = *self.heatmap();
            components::heatmap(ui, &map);
        });
        ui.add_space(theme::SPACING_LG);

        components::section_header(ui, icons::TROPHY, "Achievements");
        ui.horizontal_wrapped(|ui| {
            components::stat_card(ui, icons::MEDAL, "Unlocked", &achievements.total_completed.to_string());
            components::stat_card(
                ui,
                icons::PERCENT,
                "Progress",
                &format!("{:.0}%", achievements.completion_rate * 100.0),
            );
        });
        if !achievements.recent.is_empty() {
            ui.horizontal_wrapped(|ui| {
                ui.label(egui::RichText::new("Recent:").color(theme::TEXT_DIM));
                for a in &achievements.recent {
                    components::pill(ui, &format!("{} {}", a.icon, a.name), theme::rarity_color(a.rarity));
                }
            });
        }
        ui.add_space(theme::SPACING_LG);

        components::section_header(ui, icons::BRIEFCASE, "Career");
        ui.horizontal_wrapped(|ui| {
            components::stat_card(
                ui,
                icons::USER,
                "Current Job",
                career.current_job.as_deref().unwrap_or("None"),
            );
            components::stat_card(ui, icons::STACK, "Jobs Held", &career.jobs_held.to_string());
            components::stat_card(
                ui,
                icons::HOURGLASS,
                "Avg. Tenure",
                &format!("{:.1} days", career.average_job_days),
            );
        });
        let history = &self.game.user().job_history;
        if !history.is_empty() {
            ui.add_space(theme::SPACING_SM);
            TableBuilder::new(ui)
                .id_salt("job_history")
                .striped(true)
                .resizable(false)
                .vscroll(false)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .column(Column::remainder())
                .column(Column::exact(180.0))
                .header(HEADER_HEIGHT, |mut header| {
                    header.col(|ui| header_label(ui, "Job"));
                    header.col(|ui| header_label(ui, "Accepted"));
                })
                .body(|mut body| {
                    for record in history.iter().rev() {
                        body.row(ROW_HEIGHT, |mut row| {
                            row.col(|ui| {
                                ui.label(&record.job);
                            });
                            row.col(|ui| {
                                ui.label(
                                    egui::RichText::new(record.accepted_at.format("%Y-%m-%d %H:%M").to_string())
                                        .color(theme::TEXT_MUTED),
                                );
                            });
                        });
                    }
                });
        }
        ui.add_space(theme::SPACING_LG);

        components::section_header(ui, icons::WARNING, "Penalties");
        ui.horizontal_wrapped(|ui| {
            components::stat_card(ui, icons::WARNING_CIRCLE, "Total", &penalties.total.to_string());
            components::stat_card(ui, icons::GAUGE, "Avg. Level", &format!("{:.1}", penalties.average_level));
            components::stat_card(
                ui,
                icons::ARROW_COUNTER_CLOCKWISE,
                "Recovered",
                &format!("{:.0}%", penalties.completion_percent),
            );
            components::stat_card(
                ui,
                icons::SHIELD_CHECK,
                "Recovery Streak",
                &penalties.completed_streak.to_string(),
            );
        });
        let records = &self.game.state().penalty_history;
        if !records.is_empty() {
            ui.add_space(theme::SPACING_SM);
            TableBuilder::new(ui)
                .id_salt("penalty_history")
                .striped(true)
                .resizable(false)
                .vscroll(false)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .column(Column::exact(140.0))
                .column(Column::exact(60.0))
                .column(Column::remainder())
                .column(Column::exact(80.0))
                .column(Column::exact(90.0))
                .header(HEADER_HEIGHT, |mut header| {
                    header.col(|ui| header_label(ui, "Applied"));
                    header.col(|ui| header_label(ui, "Level"));
                    header.col(|ui| header_label(ui, "Target"));
                    header.col(|ui| header_label(ui, "Points"));
                    header.col(|ui| header_label(ui, "Status"));
                })
                .body(|mut body| {
                    for record in records.iter().rev().take(PENALTIES_SHOWN) {
                        body.row(ROW_HEIGHT, |mut row| {
                            row.col(|ui| {
                                ui.label(record.applied_at.format("%Y-%m-%d %H:%M").to_string());
                            });
                            row.col(|ui| {
                                ui.label(record.level.to_string());
                            });
                            row.col(|ui| {
                                let target = match record.target {
                                    PenaltyTarget::Single(attr) => attr.name().to_string(),
                                    PenaltyTarget::All => "All attributes".to_string(),
                                };
                                ui.label(target);
                            });
                            row.col(|ui| {
                                ui.label(
                                    egui::RichText::new(format!("-{}", format_points(record.points)))
                                        .color(theme::STATUS_ERROR),
                                );
                            });
                            row.col(|ui| {
                                let (text, color) = if record.completed {
                                    ("Recovered", theme::STATUS_SUCCESS)
                                } else if record.recover_by > now {
                                    ("Open", theme::STATUS_WARNING)
                                } else {
                                    ("Missed", theme::TEXT_DIM)
                                };
                                ui.label(egui::RichText::new(text).color(color));
                            });
                        });
                    }
                });
        }
    }
}
