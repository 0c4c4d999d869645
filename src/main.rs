#![windows_subsystem = "windows"]
//! ZERO2ONE - Main entry point

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod achievements;
mod app;
mod constants;
mod db;
mod dynamic_events;
mod engine;
mod error;
mod events;
mod jobs;
mod progress;
mod settings;
mod store;
mod tasks;
mod templates;
mod theme;
mod types;
mod ui;
mod utils;

use app::{App, Page};
use constants::*;
use db::Database;
use eframe::egui;
use engine::Game;
use store::{DataStore, LoadSource};
use tracing::{debug, error, info, warn};
use types::Notice;
use utils::{get_data_dir, now_local};

/// Initialize file logging. Returns a guard that must be held for the app lifetime.
fn init_logging(data_dir: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let logs_dir = data_dir.join("logs");
    std::fs::create_dir_all(&logs_dir).ok();

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "zero2one.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,zero2one=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    guard
}

fn main() -> eframe::Result<()> {
    let data_dir = get_data_dir();
    std::fs::create_dir_all(&data_dir).ok();

    // Initialize logging - guard must live for entire app lifetime
    let _log_guard = init_logging(&data_dir);

    info!(version = APP_VERSION, "ZERO2ONE starting");

    let settings = settings::Settings::load(&data_dir);
    let now = now_local();

    let store = match DataStore::open(&data_dir, settings.max_backups) {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, path = %data_dir.display(), "Failed to open data directory");
            eprintln!("ZERO2ONE: cannot use data directory {}: {}", data_dir.display(), e);
            std::process::exit(1);
        }
    };

    // SQLite mirror is optional; the JSON save file stays authoritative
    let db_path = data_dir.join(DB_FILE);
    let db = match Database::open(&db_path) {
        Ok(db) => {
            info!(path = %db_path.display(), "Database opened");
            match db.get_db_version() {
                Ok(Some(v)) if v != SAVE_FORMAT_VERSION => {
                    info!(from = %v, to = SAVE_FORMAT_VERSION, "Database version updated")
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Failed to read database version"),
            }
            if let Err(e) = db.set_db_version(SAVE_FORMAT_VERSION) {
                warn!(error = %e, "Failed to write database version");
            }
            Some(db)
        }
        Err(e) => {
            warn!(error = %e, path = %db_path.display(), "Database unavailable, continuing without it");
            None
        }
    };

    let mut startup_notices = Vec::new();
    let (mut state, source) = store.load(now);
    match source {
        LoadSource::Main => debug!("Loaded main save file"),
        LoadSource::Backup(name) => startup_notices.push(Notice::warning(
            "Recovered from backup",
            format!("The save file could not be read. Loaded {}.", name),
        )),
        LoadSource::Fresh => {
            let profile = db.as_ref().and_then(|db| {
                db.load_profile(&settings.username)
                    .map_err(|e| warn!(error = %e, "Failed to read profile mirror"))
                    .ok()
                    .flatten()
            });
            if let Some(profile) = profile {
                info!(username = %settings.username, "Rebuilding save from database profile");
                state = profile.into_state(now);
                startup_notices.push(Notice::warning(
                    "Recovered from database",
                    "No save file was found. Progress was rebuilt from the profile mirror.",
                ));
            }
        }
    }
    let game = Game::new(state);

    // Load saved window position/size
    let win_pos = match (settings.window_x, settings.window_y) {
        (Some(x), Some(y)) => Some(egui::pos2(x, y)),
        _ => None,
    };
    let win_size = match (settings.window_w, settings.window_h) {
        (Some(w), Some(h)) => Some(egui::vec2(w, h)),
        _ => None,
    };

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size(win_size.unwrap_or(egui::vec2(1280.0, 820.0)))
        .with_min_inner_size([980.0, 640.0])
        .with_title(APP_NAME);

    let needs_center = win_pos.is_none();

    if let Some(pos) = win_pos {
        viewport = viewport.with_position(pos);
    }

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| {
            let mut app = App::new(cc, game, store, db, settings, data_dir, startup_notices);
            app.needs_center = needs_center;
            Ok(Box::new(app))
        }),
    )
}

// ============================================================================
// MAIN UPDATE LOOP
// ============================================================================

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Track window position/size for saving on exit
        ctx.input(|i| {
            if let Some(rect) = i.viewport().outer_rect {
                self.window_pos = Some(rect.min);
            }
            if let Some(rect) = i.viewport().inner_rect {
                self.window_size = Some(rect.size());
            }
        });

        // Center window on first launch
        if self.needs_center {
            self.needs_center = false;
            if let Some(cmd) = egui::ViewportCommand::center_on_screen(ctx) {
                ctx.send_viewport_cmd(cmd);
            }
        }

        self.maybe_tick();

        // Left sidebar (must be added BEFORE CentralPanel)
        egui::SidePanel::left("nav_panel")
            .exact_width(theme::SIDEBAR_WIDTH)
            .resizable(false)
            .show_separator_line(false)
            .frame(theme::sidebar_frame())
            .show(ctx, |ui| {
                self.render_sidebar(ui);
            });

        egui::CentralPanel::default()
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin::same(24)),
            )
            .show(ctx, |ui| {
                ui.add(
                    egui::Label::new(
                        egui::RichText::new(format!("{}  {}", self.page.icon(), self.page.label()))
                            .size(theme::FONT_HERO)
                            .strong()
                            .color(theme::TEXT_PRIMARY),
                    )
                    .selectable(false),
                );
                ui.add_space(theme::SPACING_LG);

                egui::ScrollArea::vertical()
                    .id_salt(self.page.key())
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.set_max_width(theme::CONTENT_MAX_WIDTH);
                        match self.page {
                            Page::Dashboard => self.render_dashboard(ui),
                            Page::Tasks => self.render_tasks_page(ui),
                            Page::Templates => self.render_templates_page(ui),
                            Page::Jobs => self.render_jobs_page(ui),
                            Page::Achievements => self.render_achievements_page(ui),
                            Page::Events => self.render_events_page(ui),
                            Page::Stats => self.render_stats_page(ui),
                            Page::Settings => self.render_settings_page(ui),
                        }
                        ui.add_space(theme::SPACING_XL);
                    });
            });

        self.render_confirm_modal(ctx);
        self.render_toasts(ctx);

        // Wake up for event expiry and the hourly rolls even when idle
        ctx.request_repaint_after(std::time::Duration::from_secs(60));
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application shutting down");
        self.save_settings();
        self.persist();
    }
}
