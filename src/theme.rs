//! Centralized theme constants for ZERO2ONE
//! All colors, sizes, and styling should reference these constants

use crate::types::{NoticeLevel, Rank, Rarity};
use egui::Color32;

// =============================================================================
// COLORS - Backgrounds
// =============================================================================
pub const BG_BASE: Color32 = Color32::from_rgb(0x1a, 0x1a, 0x1a);
pub const BG_SIDEBAR: Color32 = Color32::from_rgb(0x14, 0x14, 0x14);
pub const BG_CARD: Color32 = Color32::from_rgb(0x2d, 0x2d, 0x2d);
pub const BG_INPUT: Color32 = Color32::from_rgb(0x22, 0x22, 0x22);
pub const BG_HOVER: Color32 = Color32::from_rgb(0x2a, 0x22, 0x3d); // purple tinted hover

// =============================================================================
// COLORS - Accent (Purple)
// =============================================================================
pub const ACCENT: Color32 = Color32::from_rgb(0x8b, 0x5c, 0xf6); // violet-500
pub const ACCENT_LIGHT: Color32 = Color32::from_rgb(0xa7, 0x8b, 0xfa); // violet-400
pub const ACCENT_DARK: Color32 = Color32::from_rgb(0x6d, 0x28, 0xd9); // violet-700

// =============================================================================
// COLORS - Text
// =============================================================================
pub const TEXT_PRIMARY: Color32 = Color32::WHITE;
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(0xe4, 0xe4, 0xe7);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(0xa1, 0xa1, 0xaa);
pub const TEXT_DIM: Color32 = Color32::from_rgb(0x71, 0x71, 0x7a);

// =============================================================================
// COLORS - Borders
// =============================================================================
pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(0x33, 0x33, 0x33);
pub const BORDER_DEFAULT: Color32 = Color32::from_rgb(0x44, 0x44, 0x44);

// =============================================================================
// COLORS - Status
// =============================================================================
pub const STATUS_SUCCESS: Color32 = Color32::from_rgb(0x34, 0xd3, 0x99);
pub const STATUS_WARNING: Color32 = Color32::from_rgb(0xfb, 0xbf, 0x24);
pub const STATUS_ERROR: Color32 = Color32::from_rgb(0xf8, 0x71, 0x71);
pub const STATUS_INFO: Color32 = Color32::from_rgb(0x60, 0xa5, 0xfa);

// =============================================================================
// COLORS - Progress and charts
// =============================================================================
pub const PROGRESS_TRACK: Color32 = Color32::from_rgb(0x3a, 0x3a, 0x3a);
pub const STREAK_FIRE: Color32 = Color32::from_rgb(0xfb, 0x92, 0x3c);
pub const HEATMAP_EMPTY: Color32 = Color32::from_rgb(0x26, 0x26, 0x26);

/// Radar background bands from the center outwards
pub const RADAR_ZONES: [Color32; 4] = [
    Color32::from_rgba_premultiplied(0x26, 0x00, 0x00, 0x26), // red
    Color32::from_rgba_premultiplied(0x26, 0x18, 0x00, 0x26), // orange
    Color32::from_rgba_premultiplied(0x26, 0x26, 0x00, 0x26), // yellow
    Color32::from_rgba_premultiplied(0x00, 0x26, 0x00, 0x26), // green
];

// =============================================================================
// COLORS - Buttons
// =============================================================================
pub const BTN_DEFAULT: Color32 = Color32::from_rgb(0x3a, 0x3a, 0x3a);
pub const BTN_ACCENT: Color32 = ACCENT;
pub const BTN_DANGER: Color32 = Color32::from_rgb(0xdc, 0x26, 0x26);

pub fn rarity_color(rarity: Rarity) -> Color32 {
    match rarity {
        Rarity::Common => Color32::from_rgb(0x9c, 0xa3, 0xaf),
        Rarity::Uncommon => Color32::from_rgb(0x34, 0xd3, 0x99),
        Rarity::Rare => Color32::from_rgb(0x60, 0xa5, 0xfa),
        Rarity::Epic => Color32::from_rgb(0xc0, 0x84, 0xfc),
        Rarity::Legendary => Color32::from_rgb(0xfb, 0xbf, 0x24),
        Rarity::Mythical => Color32::from_rgb(0xf4, 0x3f, 0x5e),
    }
}

pub fn rank_color(rank: Rank) -> Color32 {
    match rank {
        Rank::E => Color32::from_rgb(0x9c, 0xa3, 0xaf),
        Rank::D => Color32::from_rgb(0x34, 0xd3, 0x99),
        Rank::C => Color32::from_rgb(0x60, 0xa5, 0xfa),
        Rank::B => Color32::from_rgb(0xa7, 0x8b, 0xfa),
        Rank::A => Color32::from_rgb(0xf4, 0x72, 0xb6),
        Rank::S => Color32::from_rgb(0xfb, 0x92, 0x3c),
        Rank::SS => Color32::from_rgb(0xfb, 0xbf, 0x24),
        Rank::SSS => Color32::from_rgb(0xf4, 0x3f, 0x5e),
    }
}

pub fn notice_color(level: NoticeLevel) -> Color32 {
    match level {
        NoticeLevel::Info => STATUS_INFO,
        NoticeLevel::Success => STATUS_SUCCESS,
        NoticeLevel::Warning => STATUS_WARNING,
        NoticeLevel::Error => STATUS_ERROR,
        NoticeLevel::Celebrate => ACCENT_LIGHT,
    }
}

/// Parse `#RRGGBB` (leading `#` optional)
pub fn parse_hex_color(hex: &str) -> Option<Color32> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}

// =============================================================================
// TYPOGRAPHY - Font Sizes
// =============================================================================
pub const FONT_HERO: f32 = 28.0;
pub const FONT_TITLE: f32 = 20.0;
pub const FONT_HEADING: f32 = 16.0;
pub const FONT_BODY: f32 = 14.0;
pub const FONT_LABEL: f32 = 13.0;
pub const FONT_SMALL: f32 = 11.0;

// =============================================================================
// DIMENSIONS
// =============================================================================
pub const SIDEBAR_WIDTH: f32 = 240.0;
pub const CONTENT_MAX_WIDTH: f32 = 980.0;
pub const PROGRESS_HEIGHT: f32 = 8.0;
pub const BADGE_HEIGHT: f32 = 22.0;
pub const RADAR_SIZE: f32 = 260.0;
pub const HEATMAP_CELL: f32 = 14.0;
pub const TOAST_WIDTH: f32 = 320.0;

// =============================================================================
// CORNER RADIUS
// =============================================================================
pub const RADIUS_SMALL: f32 = 2.0;
pub const RADIUS_DEFAULT: f32 = 4.0;
pub const RADIUS_LARGE: f32 = 8.0;
pub const RADIUS_CARD: f32 = 10.0;

// =============================================================================
// STROKE WIDTHS
// =============================================================================
pub const STROKE_DEFAULT: f32 = 1.0;
pub const STROKE_MEDIUM: f32 = 1.5;
pub const STROKE_THICK: f32 = 2.0;

// =============================================================================
// SPACING
// =============================================================================
pub const SPACING_SM: f32 = 4.0;
pub const SPACING_MD: f32 = 8.0;
pub const SPACING_LG: f32 = 12.0;
pub const SPACING_XL: f32 = 16.0;

// =============================================================================
// HELPER - Apply global visuals
// =============================================================================
pub fn apply_visuals(ctx: &egui::Context) {
    let widget = |bg_fill: Color32, weak_bg_fill: Color32, stroke: egui::Stroke, fg: Color32| {
        egui::style::WidgetVisuals {
            bg_fill,
            weak_bg_fill,
            bg_stroke: stroke,
            fg_stroke: egui::Stroke::new(STROKE_DEFAULT, fg),
            corner_radius: RADIUS_DEFAULT.into(),
            expansion: 0.0,
        }
    };
    let subtle = egui::Stroke::new(STROKE_DEFAULT, BORDER_SUBTLE);

    ctx.set_visuals(egui::Visuals {
        dark_mode: true,
        panel_fill: BG_BASE,
        window_fill: BG_CARD,
        extreme_bg_color: BG_INPUT,
        faint_bg_color: BG_CARD,
        hyperlink_color: ACCENT_LIGHT,
        selection: egui::style::Selection {
            bg_fill: ACCENT_DARK,
            stroke: egui::Stroke::new(STROKE_DEFAULT, TEXT_PRIMARY),
        },
        widgets: egui::style::Widgets {
            noninteractive: widget(BG_CARD, BG_CARD, subtle, TEXT_PRIMARY),
            inactive: widget(Color32::TRANSPARENT, BTN_DEFAULT, subtle, TEXT_SECONDARY),
            hovered: widget(BG_HOVER, lighten(BTN_DEFAULT, 0.1), egui::Stroke::NONE, TEXT_PRIMARY),
            active: widget(ACCENT_DARK, ACCENT_DARK, egui::Stroke::NONE, TEXT_PRIMARY),
            open: widget(BG_CARD, BG_CARD, subtle, TEXT_PRIMARY),
        },
        striped: false,
        slider_trailing_fill: true,
        interact_cursor: Some(egui::CursorIcon::PointingHand),
        window_stroke: subtle,
        window_corner_radius: egui::CornerRadius::same(RADIUS_LARGE as u8),
        menu_corner_radius: egui::CornerRadius::same(RADIUS_LARGE as u8),
        ..egui::Visuals::dark()
    });

    ctx.style_mut(|style| {
        style.interaction.selectable_labels = false;
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.spacing.button_padding = egui::vec2(12.0, 6.0);
        style.spacing.scroll.bar_width = 6.0;
        style.spacing.scroll.floating = false;
    });
}

// =============================================================================
// HELPER - Frames
// =============================================================================
pub fn card_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(BG_CARD)
        .stroke(egui::Stroke::new(STROKE_DEFAULT, BORDER_SUBTLE))
        .corner_radius(RADIUS_CARD)
        .inner_margin(egui::Margin::same(SPACING_XL as i8))
}

/// Card with a colored left edge, used for rarity-tinted items
pub fn accent_card_frame(color: Color32) -> egui::Frame {
    card_frame().stroke(egui::Stroke::new(STROKE_MEDIUM, color.gamma_multiply(0.6)))
}

pub fn sidebar_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(BG_SIDEBAR)
        .inner_margin(egui::Margin::same(SPACING_LG as i8))
        .stroke(egui::Stroke::new(STROKE_DEFAULT, BORDER_SUBTLE))
}

pub fn modal_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(BG_CARD)
        .stroke(egui::Stroke::new(STROKE_DEFAULT, BORDER_DEFAULT))
        .corner_radius(RADIUS_LARGE)
        .inner_margin(SPACING_XL)
}

// =============================================================================
// HELPER - Buttons
// =============================================================================

pub fn button(text: impl Into<String>) -> egui::Button<'static> {
    egui::Button::new(text.into())
        .fill(BTN_DEFAULT)
        .corner_radius(RADIUS_DEFAULT)
}

/// Purple button for primary actions
pub fn button_accent(text: impl Into<String>) -> egui::Button<'static> {
    egui::Button::new(egui::RichText::new(text.into()).color(TEXT_PRIMARY))
        .fill(BTN_ACCENT)
        .corner_radius(RADIUS_DEFAULT)
}

/// Red button for destructive actions
pub fn button_danger(text: impl Into<String>) -> egui::Button<'static> {
    egui::Button::new(egui::RichText::new(text.into()).color(TEXT_PRIMARY))
        .fill(BTN_DANGER)
        .corner_radius(RADIUS_DEFAULT)
}

/// Settings checkbox row. Returns true if toggled.
pub fn settings_checkbox(ui: &mut egui::Ui, checked: bool, label: &str) -> bool {
    let full_width = ui.available_width();
    let (row_rect, row_resp) =
        ui.allocate_exact_size(egui::vec2(full_width, 22.0), egui::Sense::click());
    if row_resp.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }
    let painter = ui.painter();
    let cb_size = 16.0;
    let cb_rect = egui::Rect::from_min_size(
        egui::pos2(row_rect.min.x, row_rect.center().y - cb_size / 2.0),
        egui::vec2(cb_size, cb_size),
    );
    let border = if checked { ACCENT } else { BORDER_DEFAULT };
    painter.rect_stroke(cb_rect, 3.0, egui::Stroke::new(STROKE_MEDIUM, border), egui::StrokeKind::Inside);
    if checked {
        painter.rect_filled(cb_rect.shrink(3.0), 2.0, ACCENT);
    }
    painter.text(
        egui::pos2(cb_rect.max.x + 8.0, row_rect.center().y),
        egui::Align2::LEFT_CENTER,
        label,
        egui::FontId::proportional(FONT_BODY),
        TEXT_PRIMARY,
    );
    row_resp.clicked()
}

/// Returns (fill, draw_rect) for a custom-painted button with hover/press effects.
/// Lightens on hover, slightly lightens + shrinks on press.
pub fn button_visual(
    response: &egui::Response,
    base_fill: Color32,
    rect: egui::Rect,
) -> (Color32, egui::Rect) {
    if response.is_pointer_button_down_on() {
        (lighten(base_fill, 0.06), rect.shrink(1.5))
    } else if response.hovered() {
        (lighten(base_fill, 0.12), rect)
    } else {
        (base_fill, rect)
    }
}

pub fn lighten(c: Color32, amount: f32) -> Color32 {
    let mix = |v: u8| (v as f32 + (255.0 - v as f32) * amount) as u8;
    Color32::from_rgb(mix(c.r()), mix(c.g()), mix(c.b()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic_events::{rarity_hex, DYNAMIC_RARITIES};

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#8B5CF6"), Some(ACCENT));
        assert_eq!(parse_hex_color("1a1a1a"), Some(BG_BASE));
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
        assert_eq!(parse_hex_color("#ééé"), None);
    }

    #[test]
    fn test_generated_event_colors_parse() {
        for (rarity, _) in DYNAMIC_RARITIES {
            assert!(parse_hex_color(rarity_hex(rarity)).is_some(), "{rarity}");
        }
    }

    #[test]
    fn test_lighten_moves_towards_white() {
        assert_eq!(lighten(Color32::BLACK, 1.0), Color32::WHITE);
        assert_eq!(lighten(BG_CARD, 0.0), BG_CARD);
        let lighter = lighten(ACCENT, 0.5);
        assert!(lighter.r() > ACCENT.r() && lighter.g() > ACCENT.g());
    }

    #[test]
    fn test_rank_colors_are_distinct() {
        let colors: std::collections::HashSet<_> = Rank::ALL.iter().map(|r| rank_color(*r)).collect();
        assert_eq!(colors.len(), Rank::ALL.len());
    }
}
