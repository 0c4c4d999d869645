//! Dashboard, task list and template pages

use super::{App, Confirm, TemplateForm};
use crate::constants::{DASHBOARD_QUOTE, DESCRIPTION_MAX_CHARS, WEEKLY_FREQUENCY_MAX};
use crate::templates::{parse_tags, TaskTemplate};
use crate::theme;
use crate::types::{Attribute, Notice, Task, TaskKind};
use crate::ui::components;
use crate::utils::{format_points, format_remaining, format_time_ago, now_local};
use eframe::egui;
use egui_phosphor::regular as icons;

/// Days shown in the dashboard activity chart
const HISTORY_DAYS: i64 = 7;

enum TaskAction {
    Complete(TaskKind, String),
    Delete(TaskKind, String, String),
}

enum TemplateAction {
    Use(String),
    Delete(String, String),
}

fn attribute_combo(ui: &mut egui::Ui, id: &str, value: &mut Attribute) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(value.name())
        .width(150.0)
        .show_ui(ui, |ui| {
            for attr in Attribute::ALL {
                ui.selectable_value(value, attr, attr.name());
            }
        });
}

fn kind_combo(ui: &mut egui::Ui, id: &str, value: &mut TaskKind) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(value.short_label())
        .width(150.0)
        .show_ui(ui, |ui| {
            for kind in TaskKind::CREATABLE {
                ui.selectable_value(value, kind, kind.short_label());
            }
        });
}

fn field_label(ui: &mut egui::Ui, text: &str) {
    ui.label(
        egui::RichText::new(text)
            .size(theme::FONT_LABEL)
            .color(theme::TEXT_MUTED),
    );
}

impl App {
    // ========================================================================
    // DASHBOARD
    // ========================================================================

    pub(crate) fn render_dashboard(&mut self, ui: &mut egui::Ui) {
        let now = now_local();
        ui.add(
            egui::Label::new(
                egui::RichText::new(DASHBOARD_QUOTE)
                    .italics()
                    .color(theme::TEXT_MUTED),
            )
            .wrap(),
        );
        ui.add_space(theme::SPACING_LG);

        let user = self.game.user();
        if let Some(deadline) = user.makeup_deadline.filter(|d| *d > now) {
            theme::accent_card_frame(theme::STATUS_WARNING).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(
                    egui::RichText::new(format!(
                        "{} Makeup window open: complete a task within {} to keep your streak",
                        icons::HOURGLASS,
                        format_remaining(deadline, now)
                    ))
                    .color(theme::STATUS_WARNING),
                );
            });
            ui.add_space(theme::SPACING_MD);
        }
        if self.game.has_active_penalty(now) {
            theme::accent_card_frame(theme::STATUS_ERROR).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(
                    egui::RichText::new(format!(
                        "{} You have an active penalty. Complete a task to recover.",
                        icons::WARNING
                    ))
                    .color(theme::STATUS_ERROR),
                );
            });
            ui.add_space(theme::SPACING_MD);
        }

        let task_stats = self.game.task_stats();
        let attr_stats = self.game.attribute_stats();
        ui.horizontal_wrapped(|ui| {
            components::stat_card(ui, icons::STAR, "Total Points", &format_points(attr_stats.total));
            components::stat_card(ui, icons::FIRE, "Streak", &format!("{} days", task_stats.streak));
            components::stat_card(
                ui,
                icons::CHECK_CIRCLE,
                "Today",
                &format!("{}/{}", task_stats.completed, task_stats.total),
            );
            components::stat_card(
                ui,
                icons::TROPHY,
                "Achievements",
                &self.game.user().completed_achievements.len().to_string(),
            );
        });
        ui.add_space(theme::SPACING_LG);

        ui.horizontal_top(|ui| {
            theme::card_frame().show(ui, |ui| {
                components::section_header(ui, icons::POLYGON, "Attributes");
                let ranks: Vec<_> = attr_stats
                    .ranks
                    .iter()
                    .map(|(attr, progress)| (*attr, progress.rank))
                    .collect();
                components::radar_chart(ui, &ranks);
            });
            theme::card_frame().show(ui, |ui| {
                ui.set_width(ui.available_width());
                components::section_header(ui, icons::TREND_UP, "Rank Progress");
                for (attr, progress) in &attr_stats.ranks {
                    let value = self.game.user().attributes.get(*attr);
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(attr.name()).color(theme::TEXT_SECONDARY));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            let next = progress
                                .next
                                .map_or("MAX".to_string(), |n| format!("next {}", n));
                            ui.label(
                                egui::RichText::new(format!("{} pts · {}", format_points(value), next))
                                    .size(theme::FONT_SMALL)
                                    .color(theme::TEXT_DIM),
                            );
                            components::rank_badge(ui, progress.rank);
                        });
                    });
                    components::progress_bar(ui, progress.progress, theme::rank_color(progress.rank));
                    ui.add_space(theme::SPACING_SM);
                }
            });
        });
        ui.add_space(theme::SPACING_LG);

        theme::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            components::section_header(ui, icons::CHART_LINE, "Last 7 Days");
            let series: Vec<(String, f64)> = self
                .game
                .daily_history(now, HISTORY_DAYS)
                .into_iter()
                .map(|(day, stats)| (day, stats.points))
                .collect();
            components::bar_chart(ui, &series, 120.0);
        });
    }

    // ========================================================================
    // TASKS
    // ========================================================================

    pub(crate) fn render_tasks_page(&mut self, ui: &mut egui::Ui) {
        components::section_header(ui, icons::PLUS_CIRCLE, "New Task");
        theme::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            let mut submit = false;
            ui.horizontal(|ui| {
                field_label(ui, "Name");
                let resp = ui.add(
                    egui::TextEdit::singleline(&mut self.task_form.name)
                        .hint_text("e.g. Morning run")
                        .desired_width(220.0),
                );
                submit |= resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                field_label(ui, "Type");
                kind_combo(ui, "task_kind", &mut self.task_form.kind);
                field_label(ui, "Attribute");
                attribute_combo(ui, "task_attribute", &mut self.task_form.attribute);
            });
            if self.task_form.kind == TaskKind::Weekly {
                ui.horizontal(|ui| {
                    field_label(ui, "Times per week");
                    ui.add(egui::Slider::new(
                        &mut self.task_form.frequency,
                        1..=WEEKLY_FREQUENCY_MAX,
                    ));
                });
            }
            field_label(ui, "Description");
            ui.add(
                egui::TextEdit::multiline(&mut self.task_form.description)
                    .char_limit(DESCRIPTION_MAX_CHARS)
                    .desired_rows(2)
                    .desired_width(f32::INFINITY),
            );
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(format!(
                        "{}/{}",
                        self.task_form.description.chars().count(),
                        DESCRIPTION_MAX_CHARS
                    ))
                    .size(theme::FONT_SMALL)
                    .color(theme::TEXT_DIM),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    submit |= ui
                        .add(theme::button_accent(format!("{} Add Task", icons::PLUS)))
                        .clicked();
                });
            });
            if submit {
                self.submit_task_form();
            }
        });
        ui.add_space(theme::SPACING_LG);

        let now = now_local();
        let mut action = None;
        for kind in TaskKind::ALL {
            let tasks: Vec<&Task> = self.game.tasks().tasks(kind).collect();
            if kind == TaskKind::Penalty && tasks.is_empty() {
                continue;
            }
            let done = tasks.iter().filter(|t| t.completed).count();
            components::section_header(
                ui,
                icons::LIST_CHECKS,
                &format!("{} ({}/{})", kind.label(), done, tasks.len()),
            );
            if tasks.is_empty() {
                ui.label(egui::RichText::new("No tasks yet").color(theme::TEXT_DIM));
            }
            for task in tasks {
                if let Some(a) = task_row(ui, task, now) {
                    action = Some(a);
                }
                ui.add_space(theme::SPACING_SM);
            }
            ui.add_space(theme::SPACING_LG);
        }

        match action {
            Some(TaskAction::Complete(kind, id)) => self.complete_task(kind, &id),
            Some(TaskAction::Delete(kind, id, name)) => {
                self.request(Confirm::DeleteTask { kind, id, name })
            }
            None => {}
        }
    }

    // ========================================================================
    // TEMPLATES
    // ========================================================================

    fn submit_template_form(&mut self) {
        let form = &self.template_form;
        let template = TaskTemplate {
            name: form.name.clone(),
            task_type: form.kind,
            attribute: form.attribute,
            points: form.points,
            description: form.description.trim().to_string(),
            requirements: form.requirements.lines().map(|l| l.trim().to_string()).collect(),
            tags: parse_tags(&form.tags),
            created_at: now_local(),
        };
        match self.game.add_template(template, now_local()) {
            Ok(_) => {
                self.notify(vec![Notice::success("Template saved", self.template_form.name.trim())]);
                self.template_form = TemplateForm::default();
                self.show_template_form = false;
                self.persist();
            }
            Err(e) => self.report_error("Could not save template", &e),
        }
    }

    pub(crate) fn render_templates_page(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            components::section_header(ui, icons::COPY, "Task Templates");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = if self.show_template_form {
                    format!("{} Close", icons::X)
                } else {
                    format!("{} New Template", icons::PLUS)
                };
                if ui.add(theme::button(label)).clicked() {
                    self.show_template_form = !self.show_template_form;
                }
            });
        });

        if self.show_template_form {
            self.render_template_form(ui);
            ui.add_space(theme::SPACING_LG);
        }

        // Filters
        theme::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            let filter = &mut self.template_filter;
            ui.horizontal(|ui| {
                ui.label(icons::MAGNIFYING_GLASS);
                ui.add(
                    egui::TextEdit::singleline(&mut filter.search)
                        .hint_text("Search name, description or tags")
                        .desired_width(f32::INFINITY),
                );
            });
            ui.add_space(theme::SPACING_SM);
            ui.horizontal_wrapped(|ui| {
                for kind in TaskKind::CREATABLE {
                    let selected = filter.types.contains(&kind);
                    if components::styled_checkbox(ui, selected, kind.short_label()).clicked() {
                        toggle(&mut filter.types, kind);
                    }
                }
                ui.separator();
                for attr in Attribute::ALL {
                    let selected = filter.attributes.contains(&attr);
                    if components::styled_checkbox(ui, selected, attr.name()).clicked() {
                        toggle(&mut filter.attributes, attr);
                    }
                }
            });
        });
        ui.add_space(theme::SPACING_LG);

        let matches = self.game.filter_templates(
            &self.template_filter.types,
            &self.template_filter.attributes,
            &self.template_filter.search,
        );
        if matches.is_empty() {
            ui.label(egui::RichText::new("No templates match the current filters").color(theme::TEXT_DIM));
        }
        let mut action = None;
        for (id, template) in matches {
            if let Some(a) = template_card(ui, id, template) {
                action = Some(a);
            }
            ui.add_space(theme::SPACING_SM);
        }

        match action {
            Some(TemplateAction::Use(id)) => self.use_template(&id),
            Some(TemplateAction::Delete(id, name)) => self.request(Confirm::DeleteTemplate { id, name }),
            None => {}
        }
    }

    fn render_template_form(&mut self, ui: &mut egui::Ui) {
        let mut submit = false;
        theme::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            let form = &mut self.template_form;
            egui::Grid::new("template_form")
                .num_columns(2)
                .spacing([theme::SPACING_LG, theme::SPACING_MD])
                .show(ui, |ui| {
                    field_label(ui, "Name");
                    ui.add(egui::TextEdit::singleline(&mut form.name).desired_width(260.0));
                    ui.end_row();

                    field_label(ui, "Type");
                    kind_combo(ui, "template_kind", &mut form.kind);
                    ui.end_row();

                    field_label(ui, "Attribute");
                    attribute_combo(ui, "template_attribute", &mut form.attribute);
                    ui.end_row();

                    field_label(ui, "Points");
                    ui.add(egui::DragValue::new(&mut form.points).range(1..=50));
                    ui.end_row();

                    field_label(ui, "Description");
                    ui.add(
                        egui::TextEdit::multiline(&mut form.description)
                            .char_limit(DESCRIPTION_MAX_CHARS)
                            .desired_rows(2)
                            .desired_width(260.0),
                    );
                    ui.end_row();

                    field_label(ui, "Requirements");
                    ui.add(
                        egui::TextEdit::multiline(&mut form.requirements)
                            .hint_text("One per line")
                            .desired_rows(3)
                            .desired_width(260.0),
                    );
                    ui.end_row();

                    field_label(ui, "Tags");
                    ui.add(
                        egui::TextEdit::singleline(&mut form.tags)
                            .hint_text("comma, separated")
                            .desired_width(260.0),
                    );
                    ui.end_row();
                });
            ui.add_space(theme::SPACING_MD);
            submit = ui
                .add(theme::button_accent(format!("{} Save Template", icons::FLOPPY_DISK)))
                .clicked();
        });
        if submit {
            self.submit_template_form();
        }
    }
}

fn toggle<T: PartialEq>(list: &mut Vec<T>, value: T) {
    if let Some(pos) = list.iter().position(|v| *v == value) {
        list.remove(pos);
    } else {
        list.push(value);
    }
}

fn task_row(ui: &mut egui::Ui, task: &Task, now: chrono::NaiveDateTime) -> Option<TaskAction> {
    let mut action = None;
    let frame = if task.kind == TaskKind::Penalty {
        theme::accent_card_frame(theme::STATUS_ERROR)
    } else {
        theme::card_frame()
    };
    frame.inner_margin(egui::Margin::same(theme::SPACING_LG as i8)).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            if task.completed {
                ui.label(
                    egui::RichText::new(icons::CHECK_CIRCLE)
                        .size(theme::FONT_TITLE)
                        .color(theme::STATUS_SUCCESS),
                );
            } else if ui
                .add(theme::button_accent(icons::CHECK))
                .on_hover_text("Complete")
                .clicked()
            {
                action = Some(TaskAction::Complete(task.kind, task.id.clone()));
            }

            ui.vertical(|ui| {
                let name = egui::RichText::new(&task.name).size(theme::FONT_BODY).strong();
                let name = if task.completed {
                    name.strikethrough().color(theme::TEXT_DIM)
                } else {
                    name.color(theme::TEXT_PRIMARY)
                };
                ui.label(name);
                if !task.description.is_empty() {
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new(&task.description)
                                .size(theme::FONT_LABEL)
                                .color(theme::TEXT_MUTED),
                        )
                        .wrap(),
                    );
                }
                for req in &task.requirements {
                    ui.label(
                        egui::RichText::new(format!("• {}", req))
                            .size(theme::FONT_SMALL)
                            .color(theme::TEXT_DIM),
                    );
                }
                if let Some(done) = task.completed_at {
                    ui.label(
                        egui::RichText::new(format!("Completed {}", format_time_ago(done, now)))
                            .size(theme::FONT_SMALL)
                            .color(theme::TEXT_DIM),
                    );
                }
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add(theme::button(icons::TRASH))
                    .on_hover_text("Delete")
                    .clicked()
                {
                    action = Some(TaskAction::Delete(task.kind, task.id.clone(), task.name.clone()));
                }
                components::pill(ui, &format!("+{}", task.points), theme::STATUS_SUCCESS);
                components::pill(ui, task.attribute.name(), theme::ACCENT_LIGHT);
            });
        });
    });
    action
}

fn template_card(ui: &mut egui::Ui, id: &str, template: &TaskTemplate) -> Option<TemplateAction> {
    let mut action = None;
    theme::card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(&template.name)
                    .size(theme::FONT_HEADING)
                    .strong()
                    .color(theme::TEXT_PRIMARY),
            );
            components::pill(ui, template.task_type.short_label(), theme::STATUS_INFO);
            components::pill(ui, template.attribute.name(), theme::ACCENT_LIGHT);
            components::pill(ui, &format!("+{}", template.points), theme::STATUS_SUCCESS);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.add(theme::button(icons::TRASH)).on_hover_text("Delete").clicked() {
                    action = Some(TemplateAction::Delete(id.to_string(), template.name.clone()));
                }
                if ui
                    .add(theme::button_accent(format!("{} Use", icons::PLAY)))
                    .clicked()
                {
                    action = Some(TemplateAction::Use(id.to_string()));
                }
            });
        });
        if !template.description.is_empty() {
            ui.label(egui::RichText::new(&template.description).color(theme::TEXT_MUTED));
        }
        for req in &template.requirements {
            ui.label(
                egui::RichText::new(format!("• {}", req))
                    .size(theme::FONT_SMALL)
                    .color(theme::TEXT_DIM),
            );
        }
        if !template.tags.is_empty() {
            ui.horizontal_wrapped(|ui| {
                for tag in &template.tags {
                    components::pill(ui, &format!("#{}", tag), theme::TEXT_DIM);
                }
            });
        }
    });
    action
}
