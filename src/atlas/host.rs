//! Capabilities the engine consumes from the map surface it is drawn on.
//!
//! The engine never owns its host. Every engine call that needs the surface
//! receives it by `&mut` reference, so one host can be a Bevy `SystemParam`
//! bundle and another a plain test stub.

use bevy::math::{Rect, Vec2};

use super::calibrator::ZoomRange;

/// Boolean host settings that a single component may temporarily take over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostFlag {
    /// Pointer events delivered to the marker and label layers.
    MarkerPointerEvents,
    /// Zoom-in on double click.
    DoubleClickZoom,
}

/// The render-layer element of an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerElement {
    /// Pin, hit area and label.
    Marker,
    /// Boundary polygon.
    Area,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementKey {
    /// Index into the engine's annotation list.
    pub index: usize,
    pub element: LayerElement,
}

impl ElementKey {
    pub fn marker(index: usize) -> Self {
        Self {
            index,
            element: LayerElement::Marker,
        }
    }

    pub fn area(index: usize) -> Self {
        Self {
            index,
            element: LayerElement::Area,
        }
    }
}

/// Notifications raised by the host and by user input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    ZoomEnd,
    Move,
    Resize,
    ZoomRangeChanged,
    DragStart,
    DragEnd,
    /// Primary click at a source-pixel position.
    PointerDown(Vec2),
    PointerMove(Vec2),
    /// Double click / double tap at a source-pixel position.
    DoubleActivation(Vec2),
    /// Context click or undo key.
    Undo,
    /// Escape.
    Cancel,
}

pub trait MapSurface {
    /// Current zoom level (log2 of screen pixels per source pixel).
    fn zoom(&self) -> f32;

    /// Zoom limits currently enforced by the host.
    fn zoom_range(&self) -> ZoomRange;

    /// Visible region in source-pixel space.
    fn bounds(&self) -> Rect;

    /// Screen size in pixels.
    fn size(&self) -> Vec2;

    /// Source position (y up) to projected pixel coordinates at `zoom`, where
    /// y grows downward.
    fn project(&self, position: Vec2, zoom: f32) -> Vec2;

    /// Inverse of [`MapSurface::project`].
    fn unproject(&self, point: Vec2, zoom: f32) -> Vec2;

    /// How many times larger one unit drawn at `from` appears at `to`.
    fn zoom_scale(&self, from: f32, to: f32) -> f32;

    fn flag(&self, flag: HostFlag) -> bool;

    fn set_flag(&mut self, flag: HostFlag, enabled: bool);

    /// Add an element to, or remove it from, its render layer.
    fn set_element_shown(&mut self, key: ElementKey, shown: bool);

    /// Ask for [`crate::atlas::AtlasEngine::on_frame`] to be called before the next frame is drawn.
    fn request_frame(&mut self);
}

/// Projection of a flat image map where zoom 0 draws one source pixel per
/// screen pixel and every zoom step doubles the scale. The y axis is flipped
/// so projected y grows downward.
pub fn simple_project(position: Vec2, zoom: f32) -> Vec2 {
    let scale = zoom.exp2();
    Vec2::new(position.x * scale, -position.y * scale)
}

pub fn simple_unproject(point: Vec2, zoom: f32) -> Vec2 {
    let scale = zoom.exp2();
    Vec2::new(point.x / scale, -point.y / scale)
}

pub fn simple_zoom_scale(from: f32, to: f32) -> f32 {
    (to - from).exp2()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_projection_roundtrip() {
        let position = Vec2::new(512.0, 300.0);
        let projected = simple_project(position, 1.0);
        assert_eq!(projected, Vec2::new(1024.0, -600.0));
        assert_eq!(simple_unproject(projected, 1.0), position);
    }

    #[test]
    fn test_projected_y_grows_downward() {
        let north = simple_project(Vec2::new(0.0, 200.0), 0.0);
        let south = simple_project(Vec2::new(0.0, 100.0), 0.0);
        assert!(north.y < south.y);
    }

    #[test]
    fn test_zoom_scale_doubles_per_level() {
        assert_eq!(simple_zoom_scale(0.0, 1.0), 2.0);
        assert_eq!(simple_zoom_scale(0.0, -2.0), 0.25);
        assert_eq!(simple_zoom_scale(-1.0, -1.0), 1.0);
    }
}
