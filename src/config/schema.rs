use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());

pub const FONT_SIZE_RANGE: std::ops::RangeInclusive<u32> = 10..=120;
pub const TEXT_OPACITY_RANGE: std::ops::RangeInclusive<f64> = 0.1..=1.0;
pub const BG_OPACITY_RANGE: std::ops::RangeInclusive<f64> = 0.0..=1.0;

/// Persisted overlay settings.
///
/// Keys missing from a stored file take their default individually, so a
/// partial file still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub font_size: u32,
    pub font_color: String,
    pub stroke_color: String,
    pub text_opacity: f64,
    pub bg_opacity: f64,
    pub window_width: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            font_size: 48,
            font_color: "#FFFFFF".to_string(),
            stroke_color: "#000000".to_string(),
            text_opacity: 1.0,
            bg_opacity: 0.6,
            window_width: 800,
        }
    }
}

/// Raw user input for one settings field.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsEdit {
    FontSize(String),
    FontColor(String),
    StrokeColor(String),
    TextOpacity(String),
    BgOpacity(String),
    WindowWidth(String),
}

impl SettingsEdit {
    /// Build an edit from a field name as typed on the control surface.
    pub fn parse(field: &str, value: &str) -> Option<Self> {
        let value = value.to_string();
        let edit = match field.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "fontsize" => Self::FontSize(value),
            "fontcolor" => Self::FontColor(value),
            "strokecolor" => Self::StrokeColor(value),
            "textopacity" => Self::TextOpacity(value),
            "bgopacity" => Self::BgOpacity(value),
            "windowwidth" | "width" => Self::WindowWidth(value),
            _ => return None,
        };
        Some(edit)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum EditError {
    #[error("not a number: {0:?}")]
    NotANumber(String),
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: String },
    #[error("not a #RRGGBB colour: {0:?}")]
    BadColor(String),
}

impl AppConfig {
    /// Validate and apply one edit. On error the configuration is left
    /// untouched, so the previous valid value stays in effect.
    pub fn apply_edit(&mut self, edit: &SettingsEdit) -> Result<(), EditError> {
        match edit {
            SettingsEdit::FontSize(raw) => {
                let value = parse_int(raw)?;
                if !FONT_SIZE_RANGE.contains(&value) {
                    return Err(out_of_range("fontSize", raw));
                }
                self.font_size = value;
            }
            SettingsEdit::WindowWidth(raw) => {
                let value = parse_int(raw)?;
                if value == 0 {
                    return Err(out_of_range("windowWidth", raw));
                }
                self.window_width = value;
            }
            SettingsEdit::TextOpacity(raw) => {
                let value = parse_float(raw)?;
                if !TEXT_OPACITY_RANGE.contains(&value) {
                    return Err(out_of_range("textOpacity", raw));
                }
                self.text_opacity = value;
            }
            SettingsEdit::BgOpacity(raw) => {
                let value = parse_float(raw)?;
                if !BG_OPACITY_RANGE.contains(&value) {
                    return Err(out_of_range("bgOpacity", raw));
                }
                self.bg_opacity = value;
            }
            SettingsEdit::FontColor(raw) => self.font_color = parse_color(raw)?,
            SettingsEdit::StrokeColor(raw) => self.stroke_color = parse_color(raw)?,
        }
        Ok(())
    }
}

fn parse_int(raw: &str) -> Result<u32, EditError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| EditError::NotANumber(raw.to_string()))
}

fn parse_float(raw: &str) -> Result<f64, EditError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| EditError::NotANumber(raw.to_string()))
}

fn parse_color(raw: &str) -> Result<String, EditError> {
    let trimmed = raw.trim();
    if HEX_COLOR_RE.is_match(trimmed) {
        Ok(trimmed.to_uppercase())
    } else {
        Err(EditError::BadColor(raw.to_string()))
    }
}

fn out_of_range(field: &'static str, raw: &str) -> EditError {
    EditError::OutOfRange {
        field,
        value: raw.to_string(),
    }
}
