//! Shared UI color constants.

use ratatui::style::Color;

pub const SELECTED_BG: Color = Color::Rgb(40, 60, 80);
pub const SELECTED_BG_DIM: Color = Color::Rgb(30, 30, 30);
pub const FLASH_BG: Color = Color::Rgb(70, 100, 60);

pub const HEADER_BG: Color = Color::Rgb(20, 20, 20);
pub const FOOTER_BG: Color = Color::Rgb(25, 25, 25);
pub const KEY_HINT_BG: Color = Color::Rgb(60, 60, 60);

pub const BORDER_DEFAULT: Color = Color::Rgb(70, 70, 70);
pub const BORDER_DISABLED: Color = Color::Rgb(40, 40, 40);

pub const TEXT_PRIMARY: Color = Color::Rgb(220, 220, 220);
pub const TEXT_MUTED: Color = Color::Rgb(120, 120, 120);

pub const ACCENT_PRIMARY: Color = Color::Rgb(97, 175, 239);
pub const ACCENT_SUCCESS: Color = Color::Rgb(152, 195, 121);
pub const ACCENT_WARNING: Color = Color::Rgb(229, 192, 123);
pub const ACCENT_ERROR: Color = Color::Rgb(224, 108, 117);
