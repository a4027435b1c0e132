//! Stroke and fill of boundary-region polygons.

use bevy::log::warn;
use bevy::prelude::{Alpha, Color, Srgba};

/// Stroke and fill of the default region outline (pale gold).
const AREA_DEFAULT_HEX: &str = "#d7c38b";

/// Extra fill opacity while a region is highlighted.
const HOVER_FILL_BOOST: f32 = 0.2;

/// Highlighted fill opacity never exceeds this.
const HOVER_FILL_CAP: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaStyle {
    pub stroke: Color,
    pub weight: f32,
    pub fill: Color,
    pub fill_opacity: f32,
}

impl Default for AreaStyle {
    fn default() -> Self {
        let gold = parse_hex(AREA_DEFAULT_HEX).unwrap_or(Color::srgb(0.84, 0.76, 0.55));
        Self {
            stroke: gold,
            weight: 2.0,
            fill: gold,
            fill_opacity: 0.0,
        }
    }
}

/// Per-record overrides as they appear in the feed.
#[derive(Debug, Clone, Default)]
pub struct StyleOverrides<'a> {
    pub stroke: Option<&'a str>,
    pub fill: Option<&'a str>,
    pub fill_opacity: Option<f32>,
    pub weight: Option<f32>,
}

impl AreaStyle {
    /// Default style with any valid overrides applied. Unparseable colors are
    /// logged and ignored.
    pub fn with_overrides(overrides: &StyleOverrides) -> Self {
        let mut style = Self::default();
        if let Some(stroke) = overrides.stroke {
            match parse_hex(stroke) {
                Some(color) => style.stroke = color,
                None => warn!("Ignoring invalid stroke color {:?}", stroke),
            }
        }
        if let Some(fill) = overrides.fill {
            match parse_hex(fill) {
                Some(color) => style.fill = color,
                None => warn!("Ignoring invalid fill color {:?}", fill),
            }
        }
        if let Some(opacity) = overrides.fill_opacity.filter(|o| o.is_finite()) {
            style.fill_opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(weight) = overrides.weight.filter(|w| w.is_finite() && *w >= 0.0) {
            style.weight = weight;
        }
        style
    }

    /// Style while the region's marker is hovered or its popup is open.
    pub fn hover(&self) -> Self {
        Self {
            fill_opacity: (self.fill_opacity + HOVER_FILL_BOOST).min(HOVER_FILL_CAP),
            ..*self
        }
    }

    pub fn fill_color(&self) -> Color {
        self.fill.with_alpha(self.fill_opacity)
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    Srgba::hex(hex.trim()).ok().map(Color::from)
}
