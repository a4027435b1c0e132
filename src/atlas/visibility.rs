//! Zoom-based show/hide decisions.

use super::annotation::Annotation;
use super::calibrator::{RegionBand, ZoomThresholds};

/// Which parts of an annotation should be on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilityState {
    /// Pin, hit area and label.
    pub marker: bool,
    /// Boundary polygon (boundary regions only).
    pub area: bool,
}

impl VisibilityState {
    pub const HIDDEN: Self = Self {
        marker: false,
        area: false,
    };

    pub fn any(&self) -> bool {
        self.marker || self.area
    }
}

/// Visible from `threshold` upward; no threshold means always visible.
pub fn threshold_visible(threshold: Option<f32>, zoom: f32) -> bool {
    threshold.is_none_or(|t| zoom >= t)
}

impl RegionBand {
    /// `pin_min <= zoom < pin_max`; an empty band is never visible.
    pub fn pin_visible(&self, zoom: f32) -> bool {
        self.pin_min <= zoom && zoom < self.pin_max
    }

    pub fn area_visible(&self, zoom: f32) -> bool {
        zoom >= self.area_min
    }
}

/// Zoom visibility of one annotation.
pub fn resolve(annotation: &Annotation, zoom: f32, thresholds: &ZoomThresholds) -> VisibilityState {
    if annotation.kind.is_boundary_region() {
        let band = thresholds.region;
        return VisibilityState {
            marker: band.pin_visible(zoom),
            area: annotation.has_area() && band.area_visible(zoom),
        };
    }

    VisibilityState {
        marker: threshold_visible(thresholds.for_kind(&annotation.kind), zoom),
        area: false,
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::Vec2;

    use super::*;
    use crate::atlas::annotation::AnnotationKind;
    use crate::atlas::calibrator::{RegionBandFractions, VisibilityFractions, ZoomRange};

    fn thresholds(band: RegionBandFractions) -> ZoomThresholds {
        ZoomThresholds::compute(&VisibilityFractions::default(), &band, ZoomRange::default())
    }

    fn kingdom() -> Annotation {
        Annotation::point("k1", "Vessa", AnnotationKind::Kingdom, Vec2::new(500.0, 500.0)).with_area(
            vec![
                Vec2::new(400.0, 400.0),
                Vec2::new(600.0, 400.0),
                Vec2::new(500.0, 650.0),
            ],
        )
    }

    #[test]
    fn test_threshold_step_is_monotone() {
        let t = thresholds(RegionBandFractions::default());
        let city = Annotation::point("c", "Kest", AnnotationKind::City, Vec2::ZERO);
        let threshold = t.city.unwrap();

        let mut zoom = -4.0;
        while zoom <= 2.0 {
            let visible = resolve(&city, zoom, &t).marker;
            assert_eq!(visible, zoom >= threshold, "zoom {}", zoom);
            zoom += 0.25;
        }
        assert!(resolve(&city, threshold, &t).marker);
    }

    #[test]
    fn test_unknown_kind_always_visible() {
        let t = thresholds(RegionBandFractions::default());
        let shrine = Annotation::point("s", "Shrine", AnnotationKind::parse("shrine"), Vec2::ZERO);
        assert!(resolve(&shrine, -4.0, &t).marker);
        assert!(resolve(&shrine, 2.0, &t).marker);
    }

    #[test]
    fn test_region_bands_at_mid_and_high_zoom() {
        let t = thresholds(RegionBandFractions::default());
        let region = kingdom();

        let mid = resolve(&region, -1.0, &t);
        assert!(mid.marker);
        assert!(mid.area);

        let high = resolve(&region, 1.4, &t);
        assert!(!high.marker);
        assert!(high.area);

        let low = resolve(&region, -3.0, &t);
        assert_eq!(low, VisibilityState::HIDDEN);
    }

    #[test]
    fn test_pin_band_upper_bound_is_exclusive() {
        let t = thresholds(RegionBandFractions::default());
        assert!(!t.region.pin_visible(t.region.pin_max));
        assert!(t.region.pin_visible(t.region.pin_min));
    }

    #[test]
    fn test_empty_pin_band_never_visible() {
        let t = thresholds(RegionBandFractions {
            pin_min: 0.5,
            pin_max: 0.5,
            area_min: 0.9,
        });
        let region = kingdom();
        for zoom in [-4.0, -1.0, 0.0, 2.0] {
            assert!(!resolve(&region, zoom, &t).marker);
        }
    }

    #[test]
    fn test_area_band_may_start_after_pin_band() {
        let t = thresholds(RegionBandFractions {
            pin_min: 0.1,
            pin_max: 0.4,
            area_min: 0.7,
        });
        let region = kingdom();
        let between = resolve(&region, pct(0.55), &t);
        assert_eq!(between, VisibilityState::HIDDEN);
    }

    #[test]
    fn test_region_without_polygon_has_no_area() {
        let t = thresholds(RegionBandFractions::default());
        let bare = Annotation::point("k2", "Bare", AnnotationKind::Kingdom, Vec2::ZERO);
        assert!(!resolve(&bare, 2.0, &t).area);
    }

    #[test]
    fn test_nan_zoom_hides_thresholded_kinds() {
        let t = thresholds(RegionBandFractions::default());
        let town = Annotation::point("t", "Town", AnnotationKind::Town, Vec2::ZERO);
        assert!(!resolve(&town, f32::NAN, &t).marker);
        assert_eq!(resolve(&kingdom(), f32::NAN, &t), VisibilityState::HIDDEN);
    }

    fn pct(fraction: f32) -> f32 {
        crate::atlas::calibrator::pct_to_zoom(fraction, ZoomRange::default())
    }
}
