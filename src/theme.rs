//! Centralized color theme for the application.
//!
//! This module provides all colors used throughout the map overlay and UI.
//! Modify values here to change the application's color scheme.

use bevy::prelude::Color;
use bevy_egui::egui;

use crate::atlas::AnnotationKind;

// ============================================================================
// Canvas
// ============================================================================

/// Background shown around and behind the map image
pub const CANVAS_BACKGROUND: Color = Color::srgb(0.11, 0.10, 0.09);

/// Outline of the blank canvas when no map image is configured
pub const CANVAS_OUTLINE: Color = Color::srgba(0.84, 0.76, 0.55, 0.35);

// ============================================================================
// Marker Colors
// ============================================================================

pub const CITY_PIN: Color = Color::srgb(0.95, 0.78, 0.36);
pub const TOWN_PIN: Color = Color::srgb(0.86, 0.86, 0.78);
pub const RUIN_PIN: Color = Color::srgb(0.62, 0.58, 0.55);
pub const POI_PIN: Color = Color::srgb(0.45, 0.72, 0.95);
pub const KINGDOM_PIN: Color = Color::srgb(0.84, 0.76, 0.55);
pub const OTHER_PIN: Color = Color::srgb(0.75, 0.55, 0.85);

/// Marker label text
pub const MARKER_LABEL: Color = Color::srgb(0.96, 0.94, 0.88);

/// Pin color for a place kind
pub fn pin_color(kind: &AnnotationKind) -> Color {
    match kind {
        AnnotationKind::City => CITY_PIN,
        AnnotationKind::Town => TOWN_PIN,
        AnnotationKind::Ruin => RUIN_PIN,
        AnnotationKind::PointOfInterest => POI_PIN,
        AnnotationKind::Kingdom => KINGDOM_PIN,
        AnnotationKind::Other(_) => OTHER_PIN,
    }
}

// ============================================================================
// Measurement Colors
// ============================================================================

/// Ruler path and preview (#ffd780)
pub const RULER_LINE: Color = Color::srgb(1.0, 0.843, 0.502);

/// Expanding ring drawn at a focused place
pub const SPOTLIGHT: Color = Color::srgb(1.0, 0.92, 0.6);

// ============================================================================
// UI Colors (egui)
// ============================================================================

pub mod ui {
    use bevy_egui::egui;

    /// Light grey for label text
    pub const LABEL_TEXT: egui::Color32 = egui::Color32::LIGHT_GRAY;

    /// Grey for help/hint text
    pub const HINT_TEXT: egui::Color32 = egui::Color32::GRAY;

    /// Red for error messages
    pub const ERROR_TEXT: egui::Color32 = egui::Color32::RED;

    /// Ruler label and readout text
    pub const RULER_TEXT: egui::Color32 = egui::Color32::from_rgb(255, 215, 128);

    /// Dark translucent plate behind on-map text
    pub const LABEL_PLATE: egui::Color32 = egui::Color32::from_black_alpha(180);

    /// Scale bar ink
    pub const SCALE_BAR: egui::Color32 = egui::Color32::from_rgb(240, 236, 224);
}

// ============================================================================
// Color Conversion Utilities
// ============================================================================

/// Convert a Bevy Color to egui Color32 (preserving alpha)
pub fn bevy_to_egui(color: Color) -> egui::Color32 {
    let srgba = color.to_srgba();
    egui::Color32::from_rgba_unmultiplied(
        (srgba.red * 255.0) as u8,
        (srgba.green * 255.0) as u8,
        (srgba.blue * 255.0) as u8,
        (srgba.alpha * 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bevy_to_egui_keeps_alpha() {
        let color = bevy_to_egui(Color::srgba(1.0, 0.0, 0.0, 0.5));
        assert_eq!(color.a(), 127);
    }

    #[test]
    fn test_every_kind_has_a_pin_color() {
        assert_eq!(pin_color(&AnnotationKind::City), CITY_PIN);
        assert_eq!(pin_color(&AnnotationKind::Other("shrine".into())), OTHER_PIN);
    }
}
