//! Reusable UI components
//!
//! Custom-painted widgets shared by the pages: progress bars, badges,
//! the attribute radar and the activity heatmap.

use crate::progress::Heatmap;
use crate::theme;
use crate::types::{Attribute, Rank};
use eframe::egui;
use egui::{Color32, Pos2, Stroke};

/// Horizontal progress bar. `fraction` is clamped to 0..=1.
pub fn progress_bar(ui: &mut egui::Ui, fraction: f32, color: Color32) -> egui::Response {
    let width = ui.available_width();
    let (rect, response) =
        ui.allocate_exact_size(egui::vec2(width, theme::PROGRESS_HEIGHT), egui::Sense::hover());
    if ui.is_rect_visible(rect) {
        let painter = ui.painter();
        let radius = theme::PROGRESS_HEIGHT / 2.0;
        painter.rect_filled(rect, radius, theme::PROGRESS_TRACK);
        let fraction = fraction.clamp(0.0, 1.0);
        if fraction > 0.0 {
            let mut fill = rect;
            fill.set_width((rect.width() * fraction).max(theme::PROGRESS_HEIGHT));
            painter.rect_filled(fill, radius, color);
        }
    }
    response
}

/// Rounded pill with colored text and a faint matching background
pub fn pill(ui: &mut egui::Ui, text: &str, color: Color32) -> egui::Response {
    let galley = ui.painter().layout_no_wrap(
        text.to_string(),
        egui::FontId::proportional(theme::FONT_SMALL),
        color,
    );
    let size = egui::vec2(galley.size().x + 16.0, theme::BADGE_HEIGHT);
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::hover());
    if ui.is_rect_visible(rect) {
        let painter = ui.painter();
        painter.rect_filled(rect, theme::BADGE_HEIGHT / 2.0, color.gamma_multiply(0.15));
        painter.rect_stroke(
            rect,
            theme::BADGE_HEIGHT / 2.0,
            Stroke::new(theme::STROKE_DEFAULT, color.gamma_multiply(0.5)),
            egui::StrokeKind::Inside,
        );
        painter.galley(rect.center() - galley.size() / 2.0, galley, color);
    }
    response
}

pub fn rank_badge(ui: &mut egui::Ui, rank: Rank) -> egui::Response {
    pill(ui, &format!("Rank {}", rank), theme::rank_color(rank))
}

pub fn section_header(ui: &mut egui::Ui, icon: &str, title: &str) {
    ui.add(
        egui::Label::new(
            egui::RichText::new(format!("{}  {}", icon, title))
                .size(theme::FONT_HEADING)
                .strong()
                .color(theme::TEXT_PRIMARY),
        )
        .selectable(false),
    );
    ui.add_space(theme::SPACING_SM);
}

/// Small card showing one headline number
pub fn stat_card(ui: &mut egui::Ui, icon: &str, label: &str, value: &str) {
    theme::card_frame().show(ui, |ui| {
        ui.set_min_width(140.0);
        ui.vertical(|ui| {
            ui.label(
                egui::RichText::new(format!("{}  {}", icon, label))
                    .size(theme::FONT_SMALL)
                    .color(theme::TEXT_MUTED),
            );
            ui.label(
                egui::RichText::new(value)
                    .size(theme::FONT_TITLE)
                    .strong()
                    .color(theme::TEXT_PRIMARY),
            );
        });
    });
}

/// Toggle-style checkbox used in filter rows
pub fn styled_checkbox(ui: &mut egui::Ui, selected: bool, label: &str) -> egui::Response {
    let size = 16.0;
    let galley = ui.painter().layout_no_wrap(
        label.to_string(),
        egui::FontId::proportional(theme::FONT_LABEL),
        theme::TEXT_SECONDARY,
    );
    let (rect, response) = ui.allocate_exact_size(
        egui::vec2(size + 6.0 + galley.size().x, size.max(galley.size().y)),
        egui::Sense::click(),
    );

    if ui.is_rect_visible(rect) {
        let painter = ui.painter();
        let box_rect = egui::Rect::from_min_size(
            egui::pos2(rect.min.x, rect.center().y - size / 2.0),
            egui::vec2(size, size),
        );
        if selected {
            painter.rect_filled(box_rect, 3.0, theme::ACCENT);
            painter.text(
                box_rect.center(),
                egui::Align2::CENTER_CENTER,
                egui_phosphor::regular::CHECK,
                egui::FontId::proportional(size * 0.7),
                Color32::WHITE,
            );
        } else {
            painter.rect_stroke(
                box_rect,
                3.0,
                Stroke::new(theme::STROKE_MEDIUM, theme::BORDER_DEFAULT),
                egui::StrokeKind::Inside,
            );
        }
        painter.galley(
            egui::pos2(box_rect.max.x + 6.0, rect.center().y - galley.size().y / 2.0),
            galley,
            theme::TEXT_SECONDARY,
        );
    }
    if response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }
    response
}

fn radar_point(center: Pos2, radius: f32, index: usize, count: usize) -> Pos2 {
    let angle = -std::f32::consts::FRAC_PI_2 + index as f32 / count as f32 * std::f32::consts::TAU;
    center + radius * egui::vec2(angle.cos(), angle.sin())
}

/// Radar of attribute ranks on a 0..=8 scale (E = 1, SSS = 8) over
/// red-to-green bands.
pub fn radar_chart(ui: &mut egui::Ui, ranks: &[(Attribute, Rank)]) {
    let size = theme::RADAR_SIZE;
    let (rect, _) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::hover());
    if !ui.is_rect_visible(rect) || ranks.is_empty() {
        return;
    }
    let painter = ui.painter();
    let center = rect.center();
    let radius = size / 2.0 - 34.0;
    let count = ranks.len();
    let max_value = Rank::SSS.value() as f32;

    for (i, color) in theme::RADAR_ZONES.iter().enumerate().rev() {
        let r = radius * (i + 1) as f32 / theme::RADAR_ZONES.len() as f32;
        painter.circle_filled(center, r, *color);
    }
    let grid = Stroke::new(theme::STROKE_DEFAULT, Color32::from_white_alpha(25));
    for ring in 1..=Rank::ALL.len() {
        let r = radius * ring as f32 / max_value;
        let points: Vec<Pos2> = (0..count).map(|i| radar_point(center, r, i, count)).collect();
        painter.add(egui::Shape::closed_line(points, grid));
    }

    let mut outline = Vec::with_capacity(count);
    for (i, (attr, rank)) in ranks.iter().enumerate() {
        painter.line_segment([center, radar_point(center, radius, i, count)], grid);
        let label_pos = radar_point(center, radius + 20.0, i, count);
        painter.text(
            label_pos,
            egui::Align2::CENTER_CENTER,
            format!("{}\n{}", attr, rank),
            egui::FontId::proportional(theme::FONT_SMALL),
            theme::TEXT_MUTED,
        );
        let r = radius * rank.value() as f32 / max_value;
        outline.push(radar_point(center, r, i, count));
    }

    // Fan of triangles from the center so non-convex outlines fill correctly
    let mut mesh = egui::Mesh::default();
    let fill = Color32::from_white_alpha(26);
    mesh.colored_vertex(center, fill);
    for p in &outline {
        mesh.colored_vertex(*p, fill);
    }
    for i in 0..count as u32 {
        mesh.add_triangle(0, i + 1, (i + 1) % count as u32 + 1);
    }
    painter.add(egui::Shape::mesh(mesh));
    painter.add(egui::Shape::closed_line(
        outline.clone(),
        Stroke::new(theme::STROKE_THICK, Color32::WHITE),
    ));
    for p in outline {
        painter.circle_filled(p, 3.0, theme::ACCENT_LIGHT);
    }
}

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Weekday by hour grid, cell intensity relative to the busiest slot
pub fn heatmap(ui: &mut egui::Ui, map: &Heatmap) {
    let cell = theme::HEATMAP_CELL;
    let gap = 2.0;
    let label_w = 34.0;
    let size = egui::vec2(label_w + 24.0 * (cell + gap), 7.0 * (cell + gap) + 14.0);
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::hover());
    if !ui.is_rect_visible(rect) {
        return;
    }
    let painter = ui.painter();
    let max = map.iter().flatten().copied().max().unwrap_or(0);
    let mut hovered: Option<(usize, usize)> = None;

    for (day, row) in map.iter().enumerate() {
        let y = rect.min.y + day as f32 * (cell + gap);
        painter.text(
            egui::pos2(rect.min.x, y + cell / 2.0),
            egui::Align2::LEFT_CENTER,
            WEEKDAYS[day],
            egui::FontId::proportional(theme::FONT_SMALL),
            theme::TEXT_DIM,
        );
        for (hour, &count) in row.iter().enumerate() {
            let x = rect.min.x + label_w + hour as f32 * (cell + gap);
            let cell_rect = egui::Rect::from_min_size(egui::pos2(x, y), egui::vec2(cell, cell));
            let color = if count == 0 || max == 0 {
                theme::HEATMAP_EMPTY
            } else {
                let t = 0.25 + 0.75 * count as f32 / max as f32;
                theme::ACCENT.gamma_multiply(t)
            };
            painter.rect_filled(cell_rect, theme::RADIUS_SMALL, color);
            if response.hover_pos().is_some_and(|p| cell_rect.contains(p)) {
                hovered = Some((day, hour));
            }
        }
    }
    for hour in (0..24).step_by(6) {
        painter.text(
            egui::pos2(
                rect.min.x + label_w + hour as f32 * (cell + gap),
                rect.max.y - 6.0,
            ),
            egui::Align2::LEFT_CENTER,
            format!("{:02}:00", hour),
            egui::FontId::proportional(theme::FONT_SMALL - 1.0),
            theme::TEXT_DIM,
        );
    }

    if let Some((day, hour)) = hovered {
        response.on_hover_text(format!(
            "{} {:02}:00 - {} completions",
            WEEKDAYS[day], hour, map[day][hour]
        ));
    }
}

/// Vertical bars for a short labelled series
pub fn bar_chart(ui: &mut egui::Ui, series: &[(String, f64)], height: f32) {
    let width = ui.available_width();
    let (rect, response) = ui.allocate_exact_size(egui::vec2(width, height), egui::Sense::hover());
    if !ui.is_rect_visible(rect) || series.is_empty() {
        return;
    }
    let painter = ui.painter();
    let max = series.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let slot = rect.width() / series.len() as f32;
    let chart_h = rect.height() - 16.0;
    let mut tip = None;

    for (i, (label, value)) in series.iter().enumerate() {
        let x = rect.min.x + i as f32 * slot;
        let h = if max > 0.0 {
            (*value / max) as f32 * chart_h
        } else {
            0.0
        };
        let bar = egui::Rect::from_min_max(
            egui::pos2(x + slot * 0.2, rect.min.y + chart_h - h.max(1.0)),
            egui::pos2(x + slot * 0.8, rect.min.y + chart_h),
        );
        painter.rect_filled(bar, theme::RADIUS_SMALL, theme::ACCENT);
        let short = label.get(5..).unwrap_or(label);
        painter.text(
            egui::pos2(x + slot / 2.0, rect.max.y - 6.0),
            egui::Align2::CENTER_CENTER,
            short,
            egui::FontId::proportional(theme::FONT_SMALL - 1.0),
            theme::TEXT_DIM,
        );
        let column = egui::Rect::from_min_max(egui::pos2(x, rect.min.y), egui::pos2(x + slot, rect.max.y));
        if response.hover_pos().is_some_and(|p| column.contains(p)) {
            tip = Some(format!("{}: {:.1}", label, value));
        }
    }
    if let Some(tip) = tip {
        response.on_hover_text(tip);
    }
}
