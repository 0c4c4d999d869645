//! Jobs and achievements pages

use super::App;
use crate::achievements::{format_reward, format_rewards, Achievement, CHAINS};
use crate::jobs::{jobs_in_tier, Job, JobTier};
use crate::theme;
use crate::ui::components;
use crate::utils::{format_points, format_time_ago, now_local};
use eframe::egui;
use egui_phosphor::regular as icons;

impl App {
    pub(crate) fn render_jobs_page(&mut self, ui: &mut egui::Ui) {
        let now = now_local();
        let current = self.game.current_job();

        components::section_header(ui, icons::BRIEFCASE, "Current Job");
        theme::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            match current {
                Some(job) => {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(job.icon).size(theme::FONT_HERO));
                        ui.vertical(|ui| {
                            ui.label(
                                egui::RichText::new(job.name)
                                    .size(theme::FONT_TITLE)
                                    .strong()
                                    .color(theme::TEXT_PRIMARY),
                            );
                            ui.label(egui::RichText::new(job.perk).color(theme::STATUS_SUCCESS));
                        });
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            components::pill(ui, &format!("x{:.2} gains", job.multiplier), theme::ACCENT_LIGHT);
                        });
                    });
                    if let Some(record) = self.game.user().job_history.last() {
                        ui.label(
                            egui::RichText::new(format!(
                                "Hired {}",
                                format_time_ago(record.accepted_at, now)
                            ))
                            .size(theme::FONT_SMALL)
                            .color(theme::TEXT_DIM),
                        );
                    }
                }
                None => {
                    ui.label(
                        egui::RichText::new("No job yet. Train your attributes to unlock careers.")
                            .color(theme::TEXT_MUTED),
                    );
                }
            }
        });
        let open = self
            .game
            .available_jobs()
            .into_iter()
            .filter(|j| !current.is_some_and(|c| c.name == j.name))
            .count();
        ui.label(
            egui::RichText::new(format!("{} job(s) open to you", open))
                .size(theme::FONT_LABEL)
                .color(theme::TEXT_MUTED),
        );
        ui.add_space(theme::SPACING_LG);

        let mut accept = None;
        for tier in JobTier::ALL {
            components::section_header(ui, icons::CARET_DOUBLE_UP, tier.label());
            for job in jobs_in_tier(tier) {
                let is_current = current.is_some_and(|c| c.name == job.name);
                if self.job_card(ui, job, is_current) {
                    accept = Some(job.name);
                }
                ui.add_space(theme::SPACING_SM);
            }
            ui.add_space(theme::SPACING_MD);
        }
        if let Some(name) = accept {
            self.accept_job(name);
        }
    }

    /// Returns true when the accept button was clicked
    fn job_card(&self, ui: &mut egui::Ui, job: &Job, is_current: bool) -> bool {
        let eligible = self.game.check_requirements(job);
        let attributes = &self.game.user().attributes;
        let frame = if is_current {
            theme::accent_card_frame(theme::ACCENT)
        } else {
            theme::card_frame()
        };
        let mut clicked = false;
        frame.show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(job.icon).size(theme::FONT_TITLE));
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.label(
                            egui::RichText::new(job.name)
                                .size(theme::FONT_HEADING)
                                .strong()
                                .color(theme::TEXT_PRIMARY),
                        );
                        components::rank_badge(ui, job.rank);
                    });
                    ui.label(egui::RichText::new(job.description).color(theme::TEXT_MUTED));
                    ui.label(
                        egui::RichText::new(job.perk)
                            .size(theme::FONT_LABEL)
                            .color(theme::STATUS_SUCCESS),
                    );
                    if !job.requirements.is_empty() {
                        ui.horizontal_wrapped(|ui| {
                            for &(attr, needed) in job.requirements {
                                let have = attributes.get(attr);
                                let color = if have >= needed {
                                    theme::STATUS_SUCCESS
                                } else {
                                    theme::STATUS_ERROR
                                };
                                components::pill(
                                    ui,
                                    &format!("{} {}/{}", attr, format_points(have), format_points(needed)),
                                    color,
                                );
                            }
                        });
                    }
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if is_current {
                        components::pill(ui, "Current", theme::ACCENT_LIGHT);
                    } else if eligible {
                        clicked = ui.add(theme::button_accent("Accept")).clicked();
                    } else {
                        ui.label(egui::RichText::new(icons::LOCK).color(theme::TEXT_DIM))
                            .on_hover_text("Requirements not met");
                    }
                });
            });
        });
        clicked
    }

    pub(crate) fn render_achievements_page(&mut self, ui: &mut egui::Ui) {
        let stats = self.game.achievement_stats();
        ui.horizontal_wrapped(|ui| {
            components::stat_card(ui, icons::TROPHY, "Unlocked", &stats.total_completed.to_string());
            components::stat_card(
                ui,
                icons::PERCENT,
                "Completion",
                &format!("{:.0}%", stats.completion_rate * 100.0),
            );
            components::stat_card(
                ui,
                icons::LIGHTNING,
                "Streak Bonus",
                &format!("x{:.2}", self.game.earned_streak_multiplier()),
            );
        });
        ui.add_space(theme::SPACING_LG);

        components::section_header(ui, icons::LINK, "Achievement Chains");
        for chain in CHAINS {
            let progress = self.game.chain_progress(chain.id);
            let color = theme::rarity_color(chain.rarity);
            theme::accent_card_frame(color).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(chain.icon).size(theme::FONT_TITLE));
                    ui.vertical(|ui| {
                        ui.label(
                            egui::RichText::new(chain.name)
                                .size(theme::FONT_HEADING)
                                .strong()
                                .color(color),
                        );
                        ui.label(egui::RichText::new(chain.description).color(theme::TEXT_MUTED));
                    });
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let done = progress.current_stage.min(chain.stages.len());
                        components::pill(ui, &format!("{}/{}", done, chain.stages.len()), color);
                    });
                });
                components::progress_bar(ui, progress.fraction(chain), color);
                ui.add_space(theme::SPACING_SM);
                for (i, stage) in chain.stages.iter().enumerate() {
                    let cleared = progress.completed || i < progress.current_stage;
                    let (icon, text_color) = if cleared {
                        (icons::CHECK_CIRCLE, theme::STATUS_SUCCESS)
                    } else if i == progress.current_stage {
                        (icons::CIRCLE_DASHED, theme::TEXT_PRIMARY)
                    } else {
                        (icons::CIRCLE, theme::TEXT_DIM)
                    };
                    ui.label(
                        egui::RichText::new(format!(
                            "{} {}: {} ({})",
                            icon,
                            stage.name,
                            stage.description,
                            format_rewards(stage.rewards)
                        ))
                        .size(theme::FONT_LABEL)
                        .color(text_color),
                    );
                }
            });
            ui.add_space(theme::SPACING_SM);
        }
        ui.add_space(theme::SPACING_LG);

        components::section_header(ui, icons::TARGET, "Available");
        for achievement in self.game.available_achievements() {
            achievement_card(ui, achievement, false);
            ui.add_space(theme::SPACING_SM);
        }
        ui.add_space(theme::SPACING_LG);

        components::section_header(ui, icons::MEDAL, "Completed");
        let completed = self.game.completed_achievements();
        if completed.is_empty() {
            ui.label(egui::RichText::new("Nothing unlocked yet").color(theme::TEXT_DIM));
        }
        for achievement in completed {
            achievement_card(ui, achievement, true);
            ui.add_space(theme::SPACING_SM);
        }
    }
}

fn achievement_card(ui: &mut egui::Ui, achievement: &Achievement, unlocked: bool) {
    let color = theme::rarity_color(achievement.rarity);
    let frame = if unlocked {
        theme::accent_card_frame(color)
    } else {
        theme::card_frame()
    };
    frame.show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            let icon = egui::RichText::new(achievement.icon).size(theme::FONT_TITLE);
            ui.label(if unlocked { icon } else { icon.color(theme::TEXT_DIM) });
            ui.vertical(|ui| {
                ui.label(
                    egui::RichText::new(achievement.name)
                        .strong()
                        .color(if unlocked { color } else { theme::TEXT_PRIMARY }),
                );
                ui.label(egui::RichText::new(achievement.description).color(theme::TEXT_MUTED));
                ui.label(
                    egui::RichText::new(format!("Reward: {}", format_reward(&achievement.reward)))
                        .size(theme::FONT_SMALL)
                        .color(theme::TEXT_DIM),
                );
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                components::pill(ui, achievement.rarity.label(), color);
            });
        });
    });
}
