//! The Bevy side of [`MapSurface`]: the view, the host flags, and the marker
//! entities the engine adds to and removes from the render layer.

use std::collections::HashSet;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::atlas::host::{simple_project, simple_unproject, simple_zoom_scale};
use crate::atlas::{ElementKey, HostFlag, LayerElement, MapSurface, ZoomRange};

use super::camera::MapView;

/// Settings the overlay may temporarily take over.
#[derive(Resource, Debug, Clone, Copy)]
pub struct HostFlags {
    /// Hover and click delivery to markers and labels
    pub marker_pointer_events: bool,
    pub double_click_zoom: bool,
}

impl Default for HostFlags {
    fn default() -> Self {
        Self {
            marker_pointer_events: true,
            double_click_zoom: true,
        }
    }
}

impl HostFlags {
    fn slot(&mut self, flag: HostFlag) -> &mut bool {
        match flag {
            HostFlag::MarkerPointerEvents => &mut self.marker_pointer_events,
            HostFlag::DoubleClickZoom => &mut self.double_click_zoom,
        }
    }
}

/// Set when the engine asked for a frame callback.
#[derive(Resource, Default)]
pub struct FrameRequest {
    pending: bool,
}

/// Annotation indices whose boundary polygon is in the render layer.
#[derive(Resource, Default)]
pub struct AreaLayer {
    shown: HashSet<usize>,
}

impl AreaLayer {
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.shown.iter().copied()
    }

    pub fn clear(&mut self) {
        self.shown.clear();
    }
}

/// Marker root entity (pin and label) of one annotation.
#[derive(Component)]
pub struct MarkerPin {
    pub index: usize,
}

/// Marker entities by annotation index.
#[derive(Resource, Default)]
pub struct MarkerIndex {
    pub entities: Vec<Entity>,
}

/// Everything the engine needs from the running app, bundled as one param.
#[derive(SystemParam)]
pub struct MapSurfaceParams<'w, 's> {
    view: Res<'w, MapView>,
    flags: ResMut<'w, HostFlags>,
    frame: ResMut<'w, FrameRequest>,
    areas: ResMut<'w, AreaLayer>,
    markers: Res<'w, MarkerIndex>,
    visibility: Query<'w, 's, &'static mut Visibility, With<MarkerPin>>,
}

impl MapSurfaceParams<'_, '_> {
    pub fn view(&self) -> &MapView {
        &self.view
    }

    /// Consume the pending frame callback request.
    pub fn take_frame_request(&mut self) -> bool {
        std::mem::take(&mut self.frame.pending)
    }
}

impl MapSurface for MapSurfaceParams<'_, '_> {
    fn zoom(&self) -> f32 {
        self.view.zoom
    }

    fn zoom_range(&self) -> ZoomRange {
        self.view.range
    }

    fn bounds(&self) -> Rect {
        self.view.bounds()
    }

    fn size(&self) -> Vec2 {
        self.view.screen
    }

    fn project(&self, position: Vec2, zoom: f32) -> Vec2 {
        simple_project(position, zoom)
    }

    fn unproject(&self, point: Vec2, zoom: f32) -> Vec2 {
        simple_unproject(point, zoom)
    }

    fn zoom_scale(&self, from: f32, to: f32) -> f32 {
        simple_zoom_scale(from, to)
    }

    fn flag(&self, flag: HostFlag) -> bool {
        match flag {
            HostFlag::MarkerPointerEvents => self.flags.marker_pointer_events,
            HostFlag::DoubleClickZoom => self.flags.double_click_zoom,
        }
    }

    fn set_flag(&mut self, flag: HostFlag, enabled: bool) {
        *self.flags.slot(flag) = enabled;
    }

    fn set_element_shown(&mut self, key: ElementKey, shown: bool) {
        match key.element {
            LayerElement::Marker => {
                let Some(&entity) = self.markers.entities.get(key.index) else {
                    warn!("No marker entity for annotation {}", key.index);
                    return;
                };
                if let Ok(mut visibility) = self.visibility.get_mut(entity) {
                    *visibility = if shown {
                        Visibility::Inherited
                    } else {
                        Visibility::Hidden
                    };
                }
            }
            LayerElement::Area => {
                if shown {
                    self.areas.shown.insert(key.index);
                } else {
                    self.areas.shown.remove(&key.index);
                }
            }
        }
    }

    fn request_frame(&mut self) {
        self.frame.pending = true;
    }
}
