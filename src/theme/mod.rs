//! Button and text colors derived from a dashboard's theme settings.

use crate::models::{ButtonColorMode, Dashboard, Group, DEFAULT_SOLID_COLOR};
use crate::normalize::hex_str;

const LIGHT_TEXT: &str = "#f8fafc";
const DARK_TEXT: &str = "#0f172a";
const DARK_LUMINANCE: f64 = 0.52;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ColorPair {
    pub base: String,
    pub hover: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Rgb(u8, u8, u8);

fn hex_to_rgb(value: &str) -> Option<Rgb> {
    let hex = hex_str(value);
    if hex.is_empty() {
        return None;
    }
    let channel = |at: usize| u8::from_str_radix(&hex[at..at + 2], 16).ok();
    Some(Rgb(channel(1)?, channel(3)?, channel(5)?))
}

fn rgb_to_hex(r: f64, g: f64, b: f64) -> String {
    let byte = |c: f64| c.round().clamp(0.0, 255.0) as u8;
    format!("#{:02x}{:02x}{:02x}", byte(r), byte(g), byte(b))
}

/// `overlay` laid over `background` at `alpha`.
pub(crate) fn blend_hex(background: &str, overlay: &str, alpha: f64) -> String {
    let (Some(bg), Some(fg)) = (hex_to_rgb(background), hex_to_rgb(overlay)) else {
        let bg = hex_str(background);
        return if bg.is_empty() { hex_str(overlay) } else { bg };
    };
    let a = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 0.0 };
    let mix = |b: u8, f: u8| f64::from(b) * (1.0 - a) + f64::from(f) * a;
    rgb_to_hex(mix(bg.0, fg.0), mix(bg.1, fg.1), mix(bg.2, fg.2))
}

fn srgb_to_linear(channel: u8) -> f64 {
    let v = f64::from(channel) / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance below 0.52. Unparseable colors count as dark.
pub(crate) fn is_hex_dark(value: &str) -> bool {
    let Some(Rgb(r, g, b)) = hex_to_rgb(value) else {
        return true;
    };
    let luminance =
        0.2126 * srgb_to_linear(r) + 0.7152 * srgb_to_linear(g) + 0.0722 * srgb_to_linear(b);
    luminance < DARK_LUMINANCE
}

pub(crate) fn contrast_text(background: &str) -> &'static str {
    if is_hex_dark(background) {
        LIGHT_TEXT
    } else {
        DARK_TEXT
    }
}

/// Integral values print without a fraction, like CSS authors write them.
fn css_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn cycle_color(index: usize, hue_step: f64, saturation: f64, lightness: f64) -> ColorPair {
    let hue = (index as f64 * hue_step) % 360.0;
    let hover_lightness = if lightness > 52.0 {
        (lightness - 11.0).max(40.0)
    } else {
        (lightness + 9.0).min(82.0)
    };
    let hsl = |l: f64| {
        format!(
            "hsl({}, {}%, {}%)",
            css_number(hue),
            css_number(saturation),
            css_number(l)
        )
    };
    ColorPair {
        base: hsl(lightness),
        hover: hsl(hover_lightness),
    }
}

fn solid_color(base: &str) -> ColorPair {
    let base = match hex_str(base) {
        s if s.is_empty() => DEFAULT_SOLID_COLOR.to_string(),
        s => s,
    };
    let hover = if is_hex_dark(&base) {
        blend_hex(&base, "#ffffff", 0.14)
    } else {
        blend_hex(&base, "#000000", 0.12)
    };
    ColorPair {
        hover: if hover.is_empty() { base.clone() } else { hover },
        base,
    }
}

/// Color of the `index`-th button on a dashboard (counted across groups).
pub(crate) fn button_color_pair(dashboard: &Dashboard, group: &Group, index: usize) -> ColorPair {
    match dashboard.button_color_mode {
        ButtonColorMode::CycleCustom => cycle_color(
            index,
            dashboard.button_cycle_hue_step,
            dashboard.button_cycle_saturation,
            dashboard.button_cycle_lightness,
        ),
        ButtonColorMode::SolidAll => solid_color(&dashboard.button_solid_color),
        ButtonColorMode::SolidPerGroup => {
            if group.button_solid_color.is_empty() {
                solid_color(&dashboard.button_solid_color)
            } else {
                solid_color(&group.button_solid_color)
            }
        }
    }
}

/// Label color on a button: the dashboard's explicit choice, else whatever
/// contrasts with the button fill.
pub(crate) fn button_text_color(dashboard: &Dashboard) -> String {
    if !dashboard.button_text_color.is_empty() {
        return dashboard.button_text_color.clone();
    }
    let fill_is_dark = match dashboard.button_color_mode {
        ButtonColorMode::CycleCustom => dashboard.button_cycle_lightness <= 52.0,
        ButtonColorMode::SolidAll | ButtonColorMode::SolidPerGroup => {
            is_hex_dark(&dashboard.button_solid_color)
        }
    };
    if fill_is_dark { LIGHT_TEXT } else { DARK_TEXT }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn group(color: &str) -> Group {
        Group {
            id: "g".to_string(),
            title: "G".to_string(),
            group_end: false,
            button_solid_color: color.to_string(),
            entries: vec![],
        }
    }

    #[test]
    fn test_cycle_colors_step_through_hues() {
        let d = Dashboard::new("d".to_string(), "D".to_string());
        let pair = button_color_pair(&d, &group(""), 3);
        assert_eq!(pair.base, "hsl(45, 70%, 74%)");
        assert_eq!(pair.hover, "hsl(45, 70%, 63%)");
        assert_eq!(button_color_pair(&d, &group(""), 24).base, "hsl(0, 70%, 74%)");
    }

    #[test]
    fn test_cycle_hover_lightens_dark_bases() {
        let pair = cycle_color(1, 7.5, 50.0, 30.0);
        assert_eq!(pair.base, "hsl(7.5, 50%, 30%)");
        assert_eq!(pair.hover, "hsl(7.5, 50%, 39%)");
        assert_eq!(cycle_color(0, 15.0, 50.0, 78.0).hover, "hsl(0, 50%, 67%)");
    }

    #[test]
    fn test_solid_per_group_falls_back_to_dashboard() {
        let mut d = Dashboard::new("d".to_string(), "D".to_string());
        d.button_color_mode = ButtonColorMode::SolidPerGroup;
        d.button_solid_color = "#000000".to_string();
        assert_eq!(button_color_pair(&d, &group("#ffffff"), 0).base, "#ffffff");
        assert_eq!(button_color_pair(&d, &group("#ffffff"), 0).hover, "#e0e0e0");
        let fallback = button_color_pair(&d, &group(""), 0);
        assert_eq!(fallback.base, "#000000");
        assert_eq!(fallback.hover, "#242424");
    }

    #[test]
    fn test_dark_detection_and_contrast() {
        assert!(is_hex_dark("#1e293b"));
        assert!(!is_hex_dark("#ffffff"));
        assert!(is_hex_dark("not a color"));
        assert_eq!(contrast_text("#ffffff"), DARK_TEXT);
        assert_eq!(contrast_text(""), LIGHT_TEXT);
    }

    #[test]
    fn test_button_text_color() {
        let mut d = Dashboard::new("d".to_string(), "D".to_string());
        assert_eq!(button_text_color(&d), DARK_TEXT);
        d.button_cycle_lightness = 30.0;
        assert_eq!(button_text_color(&d), LIGHT_TEXT);
        d.button_text_color = "#123456".to_string();
        assert_eq!(button_text_color(&d), "#123456");
    }

    #[test]
    fn test_blend_with_invalid_input() {
        assert_eq!(blend_hex("#ff0000", "nope", 0.5), "#ff0000");
        assert_eq!(blend_hex("nope", "#00ff00", 0.5), "#00ff00");
        assert_eq!(blend_hex("#000000", "#ffffff", 0.5), "#808080");
    }
}
