//! Theme data model: built-in palettes and resolution from config.
//!
//! Two built-in palettes (dark and light) plus custom hex overrides from the
//! config file.

use ratatui::style::Color;

use crate::config::ThemeColorsConfig;

/// All runtime colors used in the UI.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Tree panel
    pub tree_fg: Color,
    pub tree_dir_fg: Color,
    pub tree_selected_bg: Color,
    pub tree_selected_fg: Color,
    pub tree_selected_inactive_bg: Color,

    // Status bar
    pub status_bg: Color,
    pub status_fg: Color,

    // Borders
    pub border_fg: Color,
    pub border_focused_fg: Color,

    // Help overlay
    pub dialog_bg: Color,
    pub dialog_border_fg: Color,

    // Semantic colors (not configurable)
    pub error_fg: Color,
    pub info_fg: Color,
    pub accent_fg: Color,
    pub dim_fg: Color,
}

impl Default for ThemeColors {
    fn default() -> Self {
        dark_theme()
    }
}

/// Dark theme using the Tokyo Night palette.
pub fn dark_theme() -> ThemeColors {
    ThemeColors {
        tree_fg: Color::Rgb(169, 177, 214),          // #a9b1d6 (fg dark)
        tree_dir_fg: Color::Rgb(122, 162, 247),      // #7aa2f7 (blue)
        tree_selected_bg: Color::Rgb(122, 162, 247), // #7aa2f7
        tree_selected_fg: Color::Rgb(26, 27, 38),    // #1a1b26 (bg)
        tree_selected_inactive_bg: Color::Rgb(59, 66, 97), // #3b4261

        status_bg: Color::Rgb(22, 22, 30), // #16161e
        status_fg: Color::Rgb(192, 202, 245),

        border_fg: Color::Rgb(59, 66, 97),           // #3b4261
        border_focused_fg: Color::Rgb(122, 162, 247), // #7aa2f7

        dialog_bg: Color::Rgb(36, 40, 59), // #24283b (storm)
        dialog_border_fg: Color::Rgb(187, 154, 247), // #bb9af7 (magenta)

        error_fg: Color::Rgb(255, 107, 107), // #ff6b6b
        info_fg: Color::Rgb(125, 207, 255),  // #7dcfff (cyan)
        accent_fg: Color::Rgb(224, 175, 104), // #e0af68 (yellow)
        dim_fg: Color::Rgb(86, 95, 137),     // #565f89 (comment)
    }
}

/// Light theme using the Tokyo Night Day palette.
pub fn light_theme() -> ThemeColors {
    ThemeColors {
        tree_fg: Color::Rgb(55, 96, 191),           // #3760bf (fg)
        tree_dir_fg: Color::Rgb(46, 126, 233),      // #2e7de9 (blue)
        tree_selected_bg: Color::Rgb(46, 126, 233), // #2e7de9
        tree_selected_fg: Color::Rgb(225, 226, 231), // #e1e2e7 (bg)
        tree_selected_inactive_bg: Color::Rgb(196, 200, 218), // #c4c8da

        status_bg: Color::Rgb(208, 213, 227), // #d0d5e3
        status_fg: Color::Rgb(55, 96, 191),

        border_fg: Color::Rgb(168, 174, 203),       // #a8aecb
        border_focused_fg: Color::Rgb(46, 126, 233), // #2e7de9

        dialog_bg: Color::Rgb(233, 233, 237), // #e9e9ed
        dialog_border_fg: Color::Rgb(152, 84, 241), // #9854f1 (magenta)

        error_fg: Color::Rgb(245, 42, 101),  // #f52a65
        info_fg: Color::Rgb(0, 113, 151),    // #007197 (cyan)
        accent_fg: Color::Rgb(140, 108, 62), // #8c6c3e (yellow)
        dim_fg: Color::Rgb(132, 140, 181),   // #848cb5 (comment)
    }
}

/// Parse a hex color string like `"#aabbcc"` into a `ratatui::style::Color`.
/// Returns `None` for malformed input.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

/// Resolve the final `ThemeColors` for `scheme`.
///
/// Unrecognized schemes fall back to dark. `"custom"` starts from dark and
/// applies the `[theme.custom]` overrides.
pub fn resolve_theme(scheme: &str, custom: Option<&ThemeColorsConfig>) -> ThemeColors {
    match scheme {
        "light" => light_theme(),
        "custom" => {
            let mut theme = dark_theme();
            if let Some(custom) = custom {
                apply_custom_colors(&mut theme, custom);
            }
            theme
        }
        _ => dark_theme(),
    }
}

fn apply(slot: &mut Color, hex: &Option<String>) {
    if let Some(color) = hex.as_deref().and_then(parse_hex_color) {
        *slot = color;
    }
}

fn apply_custom_colors(theme: &mut ThemeColors, custom: &ThemeColorsConfig) {
    apply(&mut theme.tree_fg, &custom.tree_fg);
    apply(&mut theme.tree_dir_fg, &custom.tree_dir_fg);
    apply(&mut theme.tree_selected_bg, &custom.tree_selected_bg);
    apply(&mut theme.tree_selected_fg, &custom.tree_selected_fg);
    apply(
        &mut theme.tree_selected_inactive_bg,
        &custom.tree_selected_inactive_bg,
    );
    apply(&mut theme.status_bg, &custom.status_bg);
    apply(&mut theme.status_fg, &custom.status_fg);
    apply(&mut theme.border_fg, &custom.border_fg);
    apply(&mut theme.border_focused_fg, &custom.border_focused_fg);
    apply(&mut theme.dialog_bg, &custom.dialog_bg);
    apply(&mut theme.dialog_border_fg, &custom.dialog_border_fg);
}
