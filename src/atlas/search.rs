//! Place list filtering and fly-to targets.

use bevy::math::Vec2;

use super::annotation::Annotation;
use super::calibrator::ZoomThresholds;
use super::host::MapSurface;

/// Where inside a region's pin band a fly-to lands (fraction of the band).
const REGION_FOCUS_FRACTION: f32 = 0.4;

/// Share of the screen height kept free above a focused pin for its popup.
const HEADROOM_SCREEN_FRACTION: f32 = 0.22;
const HEADROOM_MIN_PX: f32 = 120.0;
const HEADROOM_MAX_PX: f32 = 220.0;

/// Indices of annotations whose name, description or group contains `query`
/// (case-insensitive). An empty query matches everything.
pub fn filter_places(annotations: &[Annotation], query: &str) -> Vec<usize> {
    let needle = query.trim().to_lowercase();
    annotations
        .iter()
        .enumerate()
        .filter(|(_, a)| needle.is_empty() || a.search_text().contains(&needle))
        .map(|(index, _)| index)
        .collect()
}

/// Lowest zoom at which the annotation's marker shows.
pub fn required_zoom(annotation: &Annotation, thresholds: &ZoomThresholds, current_zoom: f32) -> f32 {
    if annotation.kind.is_boundary_region() {
        let band = thresholds.region;
        return band.pin_min + (band.pin_max - band.pin_min) * REGION_FOCUS_FRACTION;
    }
    thresholds
        .for_kind(&annotation.kind)
        .unwrap_or(current_zoom)
}

/// Screen pixels between the view center and a focused pin.
pub fn headroom_px(screen_height: f32) -> f32 {
    (screen_height * HEADROOM_SCREEN_FRACTION)
        .round()
        .clamp(HEADROOM_MIN_PX, HEADROOM_MAX_PX)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusTarget {
    pub center: Vec2,
    pub zoom: f32,
}

/// View that shows `annotation` with room above it for its popup. Never zooms out.
pub fn focus_target<H: MapSurface + ?Sized>(
    host: &H,
    annotation: &Annotation,
    thresholds: &ZoomThresholds,
) -> FocusTarget {
    let current = host.zoom();
    let zoom = host
        .zoom_range()
        .clamp(current.max(required_zoom(annotation, thresholds, current)));
    let projected = host.project(annotation.position, zoom);
    let shifted = projected + Vec2::new(0.0, headroom_px(host.size().y));
    FocusTarget {
        center: host.unproject(shifted, zoom),
        zoom,
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::StubSurface;
    use super::*;
    use crate::atlas::annotation::AnnotationKind;
    use crate::atlas::calibrator::{RegionBandFractions, VisibilityFractions, ZoomRange};

    fn thresholds() -> ZoomThresholds {
        ZoomThresholds::compute(
            &VisibilityFractions::default(),
            &RegionBandFractions::default(),
            ZoomRange::default(),
        )
    }

    fn places() -> Vec<Annotation> {
        let mut ford = Annotation::point("1", "Ashford", AnnotationKind::Town, Vec2::ZERO);
        ford.description = "Mill town on the river".into();
        vec![
            ford,
            Annotation::point("2", "Kest", AnnotationKind::City, Vec2::ZERO),
            Annotation::point("3", "Vessa", AnnotationKind::Kingdom, Vec2::ZERO),
        ]
    }

    #[test]
    fn test_empty_query_matches_all() {
        assert_eq!(filter_places(&places(), "  "), vec![0, 1, 2]);
    }

    #[test]
    fn test_query_matches_name_description_and_group() {
        let annotations = places();
        assert_eq!(filter_places(&annotations, "KEST"), vec![1]);
        assert_eq!(filter_places(&annotations, "river"), vec![0]);
        assert_eq!(filter_places(&annotations, "kingdoms"), vec![2]);
        assert!(filter_places(&annotations, "dragon").is_empty());
    }

    #[test]
    fn test_required_zoom() {
        let t = thresholds();
        let annotations = places();
        assert_eq!(required_zoom(&annotations[1], &t, -3.0), t.city.unwrap());
        let band = t.region;
        let expected = band.pin_min + (band.pin_max - band.pin_min) * 0.4;
        assert_eq!(required_zoom(&annotations[2], &t, -3.0), expected);
        let shrine = Annotation::point("s", "Shrine", AnnotationKind::parse("shrine"), Vec2::ZERO);
        assert_eq!(required_zoom(&shrine, &t, -3.0), -3.0);
    }

    #[test]
    fn test_headroom_is_clamped() {
        assert_eq!(headroom_px(300.0), 120.0);
        assert_eq!(headroom_px(700.0), 154.0);
        assert_eq!(headroom_px(2000.0), 220.0);
    }

    #[test]
    fn test_focus_never_zooms_out_and_centers_below_pin() {
        let mut host = StubSurface::default();
        host.zoom = 1.5;
        host.size = Vec2::new(1000.0, 1000.0);
        let city = Annotation::point("c", "Kest", AnnotationKind::City, Vec2::new(400.0, 400.0));

        let target = focus_target(&host, &city, &thresholds());
        assert_eq!(target.zoom, 1.5);
        // 220 screen px at zoom 1.5 is 220 / 2^1.5 source px, below the pin (y up).
        let expected_y = 400.0 - 220.0 / 1.5f32.exp2();
        assert!((target.center.y - expected_y).abs() < 1e-3);
        assert!((target.center.x - 400.0).abs() < 1e-3);
    }

    #[test]
    fn test_focus_zooms_in_to_threshold() {
        let mut host = StubSurface::default();
        host.zoom = -4.0;
        let town = Annotation::point("t", "Ford", AnnotationKind::Town, Vec2::new(10.0, 10.0));
        let t = thresholds();
        assert_eq!(focus_target(&host, &town, &t).zoom, t.town.unwrap());
    }
}
