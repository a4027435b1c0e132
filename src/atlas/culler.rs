//! Keeps the render layer limited to annotations near the screen.
//!
//! Viewport notifications only schedule work. The pass itself runs from the
//! host's frame callback, so any burst of pan and zoom events within one frame
//! costs a single pass, and a pass whose bounds barely moved is skipped.

use std::collections::HashSet;

use bevy::log::trace;
use bevy::math::Rect;
use serde::{Deserialize, Serialize};

use super::annotation::Annotation;
use super::calibrator::ZoomThresholds;
use super::geometry::{bounds_within, is_degenerate, pad_rect, rects_overlap};
use super::host::{ElementKey, MapSurface};
use super::visibility::{resolve, VisibilityState};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CullSettings {
    /// Fraction of the viewport size added on every side.
    pub padding: f32,
    /// Bounds whose edges all moved less than this (source pixels) are not re-culled.
    pub epsilon: f32,
}

impl Default for CullSettings {
    fn default() -> Self {
        Self {
            padding: 0.2,
            epsilon: 0.5,
        }
    }
}

#[derive(Debug, Default)]
pub struct ViewportCuller {
    settings: CullSettings,
    pass_scheduled: bool,
    last_bounds: Option<Rect>,
    /// Current render-layer membership, indexed like the annotation list.
    shown: Vec<VisibilityState>,
    passes: u64,
}

impl ViewportCuller {
    pub fn new(settings: CullSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> CullSettings {
        self.settings
    }

    /// Number of full passes run so far.
    pub fn passes_run(&self) -> u64 {
        self.passes
    }

    pub fn shown(&self, index: usize) -> Option<VisibilityState> {
        self.shown.get(index).copied()
    }

    /// Request a pass on the next frame. Repeated calls before that frame are free.
    pub fn schedule<H: MapSurface + ?Sized>(&mut self, host: &mut H) {
        if self.pass_scheduled {
            return;
        }
        self.pass_scheduled = true;
        host.request_frame();
    }

    /// Make the next pass run even if the bounds did not move.
    pub fn invalidate(&mut self) {
        self.last_bounds = None;
    }

    /// Forget all membership after the annotation set was replaced. The host
    /// starts the new set with every element out of the layer.
    pub fn reset(&mut self, count: usize) {
        self.shown = vec![VisibilityState::HIDDEN; count];
        self.last_bounds = None;
    }

    /// Frame callback. Returns whether a full pass ran.
    pub fn run_frame<H: MapSurface + ?Sized>(
        &mut self,
        host: &mut H,
        annotations: &[Annotation],
        thresholds: &ZoomThresholds,
        hidden_groups: &HashSet<String>,
    ) -> bool {
        if !self.pass_scheduled {
            return false;
        }
        self.pass_scheduled = false;

        let bounds = host.bounds();
        if let Some(last) = self.last_bounds
            && bounds_within(bounds, last, self.settings.epsilon)
        {
            trace!("Viewport unchanged, skipping cull pass");
            return false;
        }
        self.last_bounds = Some(bounds);

        self.cull(host, bounds, annotations, thresholds, hidden_groups);
        self.passes += 1;
        true
    }

    fn cull<H: MapSurface + ?Sized>(
        &mut self,
        host: &mut H,
        bounds: Rect,
        annotations: &[Annotation],
        thresholds: &ZoomThresholds,
        hidden_groups: &HashSet<String>,
    ) {
        if self.shown.len() != annotations.len() {
            self.shown.resize(annotations.len(), VisibilityState::HIDDEN);
        }

        let zoom = host.zoom();
        let region = (!is_degenerate(bounds)).then(|| pad_rect(bounds, self.settings.padding));

        for (index, annotation) in annotations.iter().enumerate() {
            let wanted = if hidden_groups.contains(&annotation.group) {
                VisibilityState::HIDDEN
            } else {
                desired_state(annotation, zoom, thresholds, region)
            };

            let current = self.shown[index];
            if wanted.marker != current.marker {
                host.set_element_shown(ElementKey::marker(index), wanted.marker);
            }
            if wanted.area != current.area {
                host.set_element_shown(ElementKey::area(index), wanted.area);
            }
            self.shown[index] = wanted;
        }
    }
}

/// Zoom visibility narrowed to the padded region. No region means nothing is visible.
fn desired_state(
    annotation: &Annotation,
    zoom: f32,
    thresholds: &ZoomThresholds,
    region: Option<Rect>,
) -> VisibilityState {
    let Some(region) = region else {
        return VisibilityState::HIDDEN;
    };
    let by_zoom = resolve(annotation, zoom, thresholds);
    if !by_zoom.any() {
        return VisibilityState::HIDDEN;
    }

    VisibilityState {
        marker: by_zoom.marker && region.contains(annotation.position),
        area: by_zoom.area
            && annotation
                .area_bounds()
                .is_some_and(|area| rects_overlap(area, region)),
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::Vec2;

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
        vec![
            Annotation::point("center", "Center", AnnotationKind::City, Vec2::new(500.0, 500.0)),
            Annotation::point("far", "Far", AnnotationKind::City, Vec2::new(5000.0, 5000.0)),
            Annotation::point("edge", "Edge", AnnotationKind::City, Vec2::new(1100.0, 500.0)),
        ]
    }

    fn run(culler: &mut ViewportCuller, host: &mut StubSurface, annotations: &[Annotation]) -> bool {
        culler.schedule(host);
        culler.run_frame(host, annotations, &thresholds(), &HashSet::new())
    }

    #[test]
    fn test_schedule_requests_one_frame() {
        let mut host = StubSurface::default();
        let mut culler = ViewportCuller::new(CullSettings::default());
        culler.schedule(&mut host);
        culler.schedule(&mut host);
        culler.schedule(&mut host);
        assert_eq!(host.frame_requests, 1);
        assert!(culler.pass_scheduled);
    }

    #[test]
    fn test_run_frame_without_schedule_does_nothing() {
        let mut host = StubSurface::default();
        let mut culler = ViewportCuller::new(CullSettings::default());
        assert!(!culler.run_frame(&mut host, &places(), &thresholds(), &HashSet::new()));
        assert_eq!(culler.passes_run(), 0);
    }

    #[test]
    fn test_padding_keeps_near_edge_markers() {
        let mut host = StubSurface::default();
        let annotations = places();
        let mut culler = ViewportCuller::new(CullSettings::default());
        culler.reset(annotations.len());
        assert!(run(&mut culler, &mut host, &annotations));

        assert!(host.is_shown(ElementKey::marker(0)));
        assert!(!host.is_shown(ElementKey::marker(1)));
        // 1100 is inside the 20% padding of a 0..1000 view.
        assert!(host.is_shown(ElementKey::marker(2)));
    }

    #[test]
    fn test_center_is_never_culled() {
        let annotations = vec![Annotation::point(
            "c",
            "Center",
            AnnotationKind::parse("shrine"),
            Vec2::new(321.0, 123.0),
        )];
        for padding in [0.001, 0.2, 1.0, 5.0] {
            for zoom in [-4.0, -1.5, 0.0, 2.0] {
                let mut host = StubSurface::default();
                host.look_at(Vec2::new(321.0, 123.0), zoom);
                let mut culler = ViewportCuller::new(CullSettings {
                    padding,
                    epsilon: 0.5,
                });
                culler.reset(1);
                run(&mut culler, &mut host, &annotations);
                assert!(host.is_shown(ElementKey::marker(0)), "padding {} zoom {}", padding, zoom);
            }
        }
    }

    #[test]
    fn test_small_moves_skip_second_pass() {
        let mut host = StubSurface::default();
        let annotations = places();
        let mut culler = ViewportCuller::new(CullSettings::default());
        culler.reset(annotations.len());

        assert!(run(&mut culler, &mut host, &annotations));
        host.bounds = Rect::new(0.1, 0.2, 1000.3, 999.9);
        assert!(!run(&mut culler, &mut host, &annotations));
        assert_eq!(culler.passes_run(), 1);

        host.bounds = Rect::new(50.0, 0.0, 1050.0, 1000.0);
        assert!(run(&mut culler, &mut host, &annotations));
        assert_eq!(culler.passes_run(), 2);
    }

    #[test]
    fn test_invalidate_forces_pass() {
        let mut host = StubSurface::default();
        let annotations = places();
        let mut culler = ViewportCuller::new(CullSettings::default());
        culler.reset(annotations.len());
        run(&mut culler, &mut host, &annotations);
        culler.invalidate();
        assert!(run(&mut culler, &mut host, &annotations));
    }

    #[test]
    fn test_membership_toggled_only_on_change() {
        let mut host = StubSurface::default();
        let annotations = places();
        let mut culler = ViewportCuller::new(CullSettings::default());
        culler.reset(annotations.len());
        run(&mut culler, &mut host, &annotations);
        let calls = host.layer_calls;

        host.bounds = Rect::new(10.0, 10.0, 1010.0, 1010.0);
        run(&mut culler, &mut host, &annotations);
        assert_eq!(host.layer_calls, calls);
    }

    #[test]
    fn test_zoom_hidden_markers_are_removed() {
        let mut host = StubSurface::default();
        let annotations = places();
        let mut culler = ViewportCuller::new(CullSettings::default());
        culler.reset(annotations.len());
        run(&mut culler, &mut host, &annotations);
        assert!(host.is_shown(ElementKey::marker(0)));

        host.look_at(Vec2::new(500.0, 500.0), -4.0);
        run(&mut culler, &mut host, &annotations);
        assert!(!host.is_shown(ElementKey::marker(0)));
        assert_eq!(culler.shown(0), Some(VisibilityState::HIDDEN));
    }

    #[test]
    fn test_zero_size_viewport_hides_everything() {
        let mut host = StubSurface::default();
        let annotations = places();
        let mut culler = ViewportCuller::new(CullSettings::default());
        culler.reset(annotations.len());
        run(&mut culler, &mut host, &annotations);

        host.bounds = Rect::new(500.0, 500.0, 500.0, 500.0);
        run(&mut culler, &mut host, &annotations);
        assert!(host.shown.is_empty());
    }

    #[test]
    fn test_area_culled_by_bounding_box() {
        let mut host = StubSurface::default();
        host.look_at(Vec2::new(500.0, 500.0), -1.0);
        let region = Annotation::point("k", "Realm", AnnotationKind::Kingdom, Vec2::new(-5000.0, 0.0))
            .with_area(vec![
                Vec2::new(-6000.0, -100.0),
                Vec2::new(100.0, -100.0),
                Vec2::new(100.0, 100.0),
            ]);
        let annotations = vec![region];
        let mut culler = ViewportCuller::new(CullSettings::default());
        culler.reset(1);
        run(&mut culler, &mut host, &annotations);

        assert!(!host.is_shown(ElementKey::marker(0)));
        assert!(host.is_shown(ElementKey::area(0)));
    }

    #[test]
    fn test_hidden_group_removed() {
        let mut host = StubSurface::default();
        let annotations = places();
        let mut culler = ViewportCuller::new(CullSettings::default());
        culler.reset(annotations.len());
        culler.schedule(&mut host);
        let hidden = HashSet::from(["Cities".to_string()]);
        culler.run_frame(&mut host, &annotations, &thresholds(), &hidden);
        assert!(host.shown.is_empty());
    }
}
