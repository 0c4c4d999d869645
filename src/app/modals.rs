//! Settings page, data management and the confirmation modal

use super::{App, Confirm};
use crate::constants::EXPORT_FILE_NAME;
use crate::engine::SaveState;
use crate::error::StoreResult;
use crate::theme;
use crate::types::Notice;
use crate::ui::components;
use crate::utils::{format_time_ago, now_local};
use chrono::NaiveDateTime;
use eframe::egui;
use egui_phosphor::regular as icons;
use tracing::{info, warn};

const BACKUPS_SHOWN: usize = 15;

fn group_label(ui: &mut egui::Ui, text: &str) {
    ui.add(
        egui::Label::new(egui::RichText::new(text).size(13.0).color(theme::ACCENT))
            .selectable(false),
    );
    ui.add_space(2.0);
}

/// `backup_20240510_120000.json` -> timestamp, if the name carries one
fn backup_time(name: &str) -> Option<NaiveDateTime> {
    let stamp = name
        .trim_end_matches(".json")
        .trim_start_matches("pre_reset_")
        .trim_start_matches("backup_");
    let stamp = stamp.get(..15)?;
    NaiveDateTime::parse_from_str(stamp, "%Y%m%d_%H%M%S").ok()
}

impl App {
    pub(crate) fn render_settings_page(&mut self, ui: &mut egui::Ui) {
        components::section_header(ui, icons::GEAR, "Settings");
        theme::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            let mut changed = false;

            group_label(ui, "Profile");
            ui.horizontal(|ui| {
                ui.label("Username");
                let resp = ui.add(
                    egui::TextEdit::singleline(&mut self.settings.username).desired_width(200.0),
                );
                if resp.lost_focus() {
                    let trimmed = self.settings.username.trim().to_string();
                    self.settings.username = if trimmed.is_empty() {
                        crate::constants::DEFAULT_USERNAME.to_string()
                    } else {
                        trimmed
                    };
                    changed = true;
                }
            });

            ui.add_space(theme::SPACING_MD);
            ui.separator();
            ui.add_space(theme::SPACING_SM);

            group_label(ui, "Notifications");
            if theme::settings_checkbox(ui, self.settings.show_toasts, "Show toast notifications") {
                self.settings.show_toasts = !self.settings.show_toasts;
                changed = true;
            }
            if theme::settings_checkbox(ui, self.settings.confirm_delete, "Confirm before deleting") {
                self.settings.confirm_delete = !self.settings.confirm_delete;
                changed = true;
            }

            ui.add_space(theme::SPACING_MD);
            ui.separator();
            ui.add_space(theme::SPACING_SM);

            group_label(ui, "Backups");
            ui.horizontal(|ui| {
                ui.label("Backups to keep");
                let resp = ui.add(egui::DragValue::new(&mut self.settings.max_backups).range(1..=100));
                if resp.changed() {
                    self.store.set_max_backups(self.settings.max_backups);
                    changed = true;
                }
            });

            if changed {
                self.save_settings();
            }
        });
        ui.add_space(theme::SPACING_LG);

        self.render_data_management(ui);
    }

    fn render_data_management(&mut self, ui: &mut egui::Ui) {
        components::section_header(ui, icons::DATABASE, "Data");
        let mut pending = None;
        theme::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                egui::RichText::new(self.data_dir.display().to_string())
                    .size(theme::FONT_SMALL)
                    .color(theme::TEXT_DIM),
            );
            ui.add_space(theme::SPACING_SM);
            ui.horizontal_wrapped(|ui| {
                if ui.add(theme::button(format!("{} Export", icons::EXPORT))).clicked() {
                    self.export_progress();
                }
                if ui.add(theme::button(format!("{} Import", icons::DOWNLOAD_SIMPLE))).clicked() {
                    self.import_progress();
                }
                if ui.add(theme::button(format!("{} Open Folder", icons::FOLDER_OPEN))).clicked() {
                    if let Err(e) = open::that(&self.data_dir) {
                        warn!(error = %e, "Failed to open data folder");
                    }
                }
                if ui.add(theme::button_danger(format!("{} Reset Progress", icons::TRASH))).clicked() {
                    pending = Some(Confirm::Reset);
                }
            });
        });
        ui.add_space(theme::SPACING_LG);

        ui.horizontal(|ui| {
            components::section_header(ui, icons::CLOCK_COUNTER_CLOCKWISE, "Backups");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.add(theme::button(icons::ARROWS_CLOCKWISE)).on_hover_text("Refresh").clicked() {
                    self.refresh_backups();
                }
            });
        });
        if self.backups.is_empty() {
            ui.label(egui::RichText::new("No backups yet").color(theme::TEXT_DIM));
        }
        let now = now_local();
        for backup in self.backups.iter().take(BACKUPS_SHOWN) {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&backup.name).color(theme::TEXT_SECONDARY));
                if backup.pre_reset {
                    components::pill(ui, "Pre-reset", theme::STATUS_WARNING);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.add(theme::button("Restore")).clicked() {
                        pending = Some(Confirm::RestoreBackup(backup.name.clone()));
                    }
                    if let Some(at) = backup_time(&backup.name) {
                        ui.label(
                            egui::RichText::new(format_time_ago(at, now))
                                .size(theme::FONT_SMALL)
                                .color(theme::TEXT_DIM),
                        );
                    }
                });
            });
        }
        if let Some(action) = pending {
            self.request(action);
        }
    }

    // ========================================================================
    // DATA ACTIONS
    // ========================================================================

    fn export_progress(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(EXPORT_FILE_NAME)
            .add_filter("JSON", &["json"])
            .save_file()
        else {
            return;
        };
        match self.store.export_to(&path, self.game.state(), now_local()) {
            Ok(()) => self.notify(vec![Notice::success(
                "Progress exported",
                path.display().to_string(),
            )]),
            Err(e) => self.report_error("Export failed", &e),
        }
    }

    fn import_progress(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        else {
            return;
        };
        let result = self.store.import_from(&path, self.game.state(), now_local());
        self.apply_loaded(result, "Progress imported", "Import failed");
    }

    pub(crate) fn restore_backup(&mut self, name: &str) {
        let result = self.store.restore_backup(name, self.game.state(), now_local());
        self.apply_loaded(result, "Backup restored", "Could not restore backup");
    }

    pub(crate) fn reset_progress(&mut self) {
        let result = self.store.reset(self.game.state(), now_local());
        if result.is_ok() {
            if let Some(db) = &self.db {
                if let Err(e) = db.clear_completions() {
                    warn!(error = %e, "Failed to clear completion log");
                }
            }
        }
        self.apply_loaded(result, "Progress reset", "Reset failed");
    }

    /// Swap in a state that the store has already written to disk
    fn apply_loaded(&mut self, result: StoreResult<SaveState>, success: &str, failure: &str) {
        match result {
            Ok(state) => {
                info!("{}", success);
                self.game.replace_state(state);
                self.heatmap = None;
                self.refresh_backups();
                if let Some(db) = &self.db {
                    if let Err(e) = db.save_profile(&self.settings.username, self.game.state()) {
                        warn!(error = %e, "Failed to mirror profile to database");
                    }
                }
                self.notify(vec![Notice::success(success, "")]);
            }
            Err(e) => self.report_error(failure, &e),
        }
    }

    // ========================================================================
    // CONFIRMATION MODAL
    // ========================================================================

    pub(crate) fn render_confirm_modal(&mut self, ctx: &egui::Context) {
        let Some(action) = self.confirm.clone() else {
            return;
        };
        let (title, body, danger_label) = match &action {
            Confirm::DeleteTask { name, .. } => (
                "Delete task?",
                format!("\"{}\" will be removed.", name),
                "Delete",
            ),
            Confirm::DeleteTemplate { name, .. } => (
                "Delete template?",
                format!("The template \"{}\" will be removed.", name),
                "Delete",
            ),
            Confirm::RestoreBackup(name) => (
                "Restore backup?",
                format!("Current progress is backed up first, then replaced with {}.", name),
                "Restore",
            ),
            Confirm::Reset => (
                "Reset all progress?",
                "A backup is written first. Attributes, tasks and history start over.".to_string(),
                "Reset",
            ),
        };

        let mut decision = None;
        let modal = egui::Modal::new(egui::Id::new("confirm_modal"))
            .backdrop_color(egui::Color32::from_black_alpha(120))
            .frame(theme::modal_frame())
            .show(ctx, |ui| {
                ui.set_width(320.0);
                ui.add(
                    egui::Label::new(egui::RichText::new(title).size(16.0).strong())
                        .selectable(false),
                );
                ui.add_space(theme::SPACING_SM);
                ui.separator();
                ui.add_space(theme::SPACING_SM);
                ui.add(egui::Label::new(egui::RichText::new(body).color(theme::TEXT_SECONDARY)).wrap());
                ui.add_space(theme::SPACING_LG);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.add(theme::button_danger(danger_label)).clicked() {
                        decision = Some(true);
                    }
                    if ui.add(theme::button("Cancel")).clicked() {
                        decision = Some(false);
                    }
                });
            });
        if modal.should_close() && decision.is_none() {
            decision = Some(false);
        }

        match decision {
            Some(true) => {
                self.confirm = None;
                self.run_confirmed(action);
            }
            Some(false) => self.confirm = None,
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_time_parses_names() {
        let expected = NaiveDateTime::parse_from_str("2024-05-10 12:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(backup_time("backup_20240510_123000.json"), Some(expected));
        assert_eq!(backup_time("backup_20240510_123000_2.json"), Some(expected));
        assert_eq!(backup_time("pre_reset_backup_20240510_123000.json"), Some(expected));
        assert_eq!(backup_time("notes.json"), None);
    }
}
