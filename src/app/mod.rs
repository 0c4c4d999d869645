//! App module - application state, persistence and page routing

mod career;
mod event_board;
mod modals;
mod sidebar;
mod stats;
mod toasts;
mod views;

use crate::db::Database;
use crate::engine::Game;
use crate::progress::{activity_heatmap, Heatmap};
use crate::settings::Settings;
use crate::store::{BackupInfo, DataStore};
use crate::theme;
use crate::types::{Attribute, Notice, TaskKind};
use crate::utils::now_local;
use chrono::{NaiveDateTime, Timelike};
use eframe::egui;
use std::path::PathBuf;
use tracing::{debug, error, warn};

pub(crate) use toasts::Toast;

// ============================================================================
// PAGES & FORM STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Tasks,
    Templates,
    Jobs,
    Achievements,
    Events,
    Stats,
    Settings,
}

impl Page {
    pub const ALL: [Page; 8] = [
        Page::Dashboard,
        Page::Tasks,
        Page::Templates,
        Page::Jobs,
        Page::Achievements,
        Page::Events,
        Page::Stats,
        Page::Settings,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::Tasks => "tasks",
            Page::Templates => "templates",
            Page::Jobs => "jobs",
            Page::Achievements => "achievements",
            Page::Events => "events",
            Page::Stats => "stats",
            Page::Settings => "settings",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Tasks => "Tasks",
            Page::Templates => "Templates",
            Page::Jobs => "Jobs",
            Page::Achievements => "Achievements",
            Page::Events => "Events",
            Page::Stats => "Stats",
            Page::Settings => "Settings",
        }
    }

    pub fn icon(self) -> &'static str {
        use egui_phosphor::regular as icons;
        match self {
            Page::Dashboard => icons::HOUSE,
            Page::Tasks => icons::LIST_CHECKS,
            Page::Templates => icons::COPY,
            Page::Jobs => icons::BRIEFCASE,
            Page::Achievements => icons::TROPHY,
            Page::Events => icons::SPARKLE,
            Page::Stats => icons::CHART_BAR,
            Page::Settings => icons::GEAR,
        }
    }
}

pub(crate) struct TaskForm {
    pub name: String,
    pub description: String,
    pub kind: TaskKind,
    pub attribute: Attribute,
    pub frequency: u32,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            kind: TaskKind::Daily,
            attribute: Attribute::Health,
            frequency: 1,
        }
    }
}

pub(crate) struct TemplateForm {
    pub name: String,
    pub kind: TaskKind,
    pub attribute: Attribute,
    pub points: u32,
    pub description: String,
    /// One requirement per line
    pub requirements: String,
    /// Comma separated
    pub tags: String,
}

impl Default for TemplateForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: TaskKind::Daily,
            attribute: Attribute::Health,
            points: 1,
            description: String::new(),
            requirements: String::new(),
            tags: String::new(),
        }
    }
}

#[derive(Default)]
pub(crate) struct TemplateFilter {
    pub types: Vec<TaskKind>,
    pub attributes: Vec<Attribute>,
    pub search: String,
}

/// Destructive actions waiting for confirmation
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Confirm {
    DeleteTask { kind: TaskKind, id: String, name: String },
    DeleteTemplate { id: String, name: String },
    RestoreBackup(String),
    Reset,
}

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    pub(crate) game: Game,
    pub(crate) store: DataStore,
    pub(crate) db: Option<Database>,
    pub(crate) settings: Settings,
    pub(crate) data_dir: PathBuf,
    pub(crate) page: Page,
    pub(crate) last_tick: NaiveDateTime,
    pub(crate) toasts: Vec<Toast>,
    pub(crate) task_form: TaskForm,
    pub(crate) template_form: TemplateForm,
    pub(crate) template_filter: TemplateFilter,
    pub(crate) show_template_form: bool,
    pub(crate) events_show_history: bool,
    pub(crate) confirm: Option<Confirm>,
    pub(crate) heatmap: Option<Heatmap>,
    pub(crate) backups: Vec<BackupInfo>,
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
    pub(crate) needs_center: bool,
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        game: Game,
        store: DataStore,
        db: Option<Database>,
        settings: Settings,
        data_dir: PathBuf,
        startup_notices: Vec<Notice>,
    ) -> Self {
        // Force dark theme
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        // Add Phosphor icons font
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        theme::apply_visuals(&cc.egui_ctx);

        let page = Page::from_key(&settings.last_page).unwrap_or(Page::Dashboard);
        let now = now_local();
        let mut app = Self {
            game,
            store,
            db,
            settings,
            data_dir,
            page,
            last_tick: now,
            toasts: Vec::new(),
            task_form: TaskForm::default(),
            template_form: TemplateForm::default(),
            template_filter: TemplateFilter::default(),
            show_template_form: false,
            events_show_history: false,
            confirm: None,
            heatmap: None,
            backups: Vec::new(),
            window_pos: None,
            window_size: None,
            needs_center: false,
        };
        app.notify(startup_notices);
        app.tick(now);
        app
    }

    pub fn save_settings(&mut self) {
        self.settings.window_x = self.window_pos.map(|p| p.x);
        self.settings.window_y = self.window_pos.map(|p| p.y);
        self.settings.window_w = self.window_size.map(|s| s.x);
        self.settings.window_h = self.window_size.map(|s| s.y);
        self.settings.last_page = self.page.key().to_string();
        self.settings.save(&self.data_dir);
    }

    /// Write the save file (with backup) and mirror the profile to SQLite
    pub(crate) fn persist(&mut self) {
        let now = now_local();
        if let Err(e) = self.store.save(self.game.state(), now) {
            self.report_error("Could not save progress", &e);
        }
        if let Some(db) = &self.db {
            if let Err(e) = db.save_profile(&self.settings.username, self.game.state()) {
                warn!(error = %e, "Failed to mirror profile to database");
            }
        }
    }

    pub(crate) fn notify(&mut self, notices: Vec<Notice>) {
        for notice in notices {
            debug!(title = %notice.title, "notice");
            if self.settings.show_toasts {
                self.toasts.push(Toast::new(notice));
            }
        }
    }

    /// Errors always reach the user, even with toasts switched off
    pub(crate) fn report_error(&mut self, title: &str, err: &dyn std::fmt::Display) {
        error!(error = %err, "{}", title);
        self.toasts.push(Toast::new(Notice::error(title, err.to_string())));
    }

    /// Run the periodic update when the wall clock crosses an hour boundary
    pub(crate) fn maybe_tick(&mut self) {
        let now = now_local();
        if now.date() != self.last_tick.date() || now.hour() != self.last_tick.hour() {
            self.tick(now);
        }
    }

    fn tick(&mut self, now: NaiveDateTime) {
        self.last_tick = now;
        let notices = self.game.tick(now, &mut rand::rng());
        self.notify(notices);
        self.persist();
    }

    pub(crate) fn set_page(&mut self, page: Page) {
        if self.page == page {
            return;
        }
        self.page = page;
        match page {
            Page::Stats => self.heatmap = None,
            Page::Settings => self.refresh_backups(),
            _ => {}
        }
    }

    pub(crate) fn refresh_backups(&mut self) {
        self.backups = match self.store.list_backups() {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "Failed to list backups");
                Vec::new()
            }
        };
    }

    /// Completion heatmap from the SQLite log, falling back to the save file
    pub(crate) fn heatmap(&mut self) -> &Heatmap {
        if self.heatmap.is_none() {
            let logged = self.db.as_ref().and_then(|db| {
                db.completions_since(NaiveDateTime::default())
                    .map_err(|e| warn!(error = %e, "Failed to read completion log"))
                    .ok()
            });
            let map = match logged {
                Some(rows) if !rows.is_empty() => {
                    activity_heatmap(rows.into_iter().map(|r| r.completed_at))
                }
                _ => activity_heatmap(self.game.completion_times()),
            };
            self.heatmap = Some(map);
        }
        self.heatmap.get_or_insert([[0; 24]; 7])
    }

    // ========================================================================
    // GAME ACTIONS
    // ========================================================================

    pub(crate) fn submit_task_form(&mut self) {
        let form = &self.task_form;
        let result = self.game.create_task(
            &form.name,
            &form.description,
            form.kind,
            form.attribute,
            form.frequency,
            now_local(),
        );
        match result {
            Ok(_) => {
                self.notify(vec![Notice::success("Task added", self.task_form.name.trim())]);
                self.task_form = TaskForm {
                    kind: self.task_form.kind,
                    attribute: self.task_form.attribute,
                    ..TaskForm::default()
                };
                self.persist();
            }
            Err(e) => self.report_error("Could not add task", &e),
        }
    }

    pub(crate) fn complete_task(&mut self, kind: TaskKind, id: &str) {
        let now = now_local();
        match self.game.complete_task(kind, id, now) {
            Ok(completion) => {
                if let Some(db) = &self.db {
                    if let Err(e) = db.log_completion(&completion, now) {
                        warn!(error = %e, "Failed to log completion");
                    }
                }
                self.heatmap = None;
                self.notify(completion.notices);
                self.persist();
            }
            Err(e) => self.report_error("Could not complete task", &e),
        }
    }

    pub(crate) fn delete_task(&mut self, kind: TaskKind, id: &str) {
        match self.game.remove_task(kind, id) {
            Ok(task) => {
                self.notify(vec![Notice::info("Task deleted", task.name)]);
                self.persist();
            }
            Err(e) => self.report_error("Could not delete task", &e),
        }
    }

    pub(crate) fn accept_job(&mut self, name: &str) {
        match self.game.accept_job(name, now_local()) {
            Ok(notice) => {
                self.notify(vec![notice]);
                self.persist();
            }
            Err(e) => self.report_error("Could not accept job", &e),
        }
    }

    pub(crate) fn use_template(&mut self, id: &str) {
        match self.game.use_template(id, now_local()) {
            Ok(_) => {
                self.notify(vec![Notice::success("Task created from template!", "")]);
                self.persist();
            }
            Err(e) => self.report_error("Could not use template", &e),
        }
    }

    pub(crate) fn delete_template(&mut self, id: &str) {
        match self.game.delete_template(id) {
            Ok(template) => {
                self.notify(vec![Notice::info("Template deleted", template.name)]);
                self.persist();
            }
            Err(e) => self.report_error("Could not delete template", &e),
        }
    }

    /// Routes destructive actions through the confirmation modal when enabled
    pub(crate) fn request(&mut self, action: Confirm) {
        if self.settings.confirm_delete || action == Confirm::Reset {
            self.confirm = Some(action);
        } else {
            self.run_confirmed(action);
        }
    }

    pub(crate) fn run_confirmed(&mut self, action: Confirm) {
        match action {
            Confirm::DeleteTask { kind, id, .. } => self.delete_task(kind, &id),
            Confirm::DeleteTemplate { id, .. } => self.delete_template(&id),
            Confirm::RestoreBackup(name) => self.restore_backup(&name),
            Confirm::Reset => self.reset_progress(),
        }
    }
}
