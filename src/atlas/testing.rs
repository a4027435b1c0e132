//! Counting host stub for engine tests.

use std::collections::{HashMap, HashSet};

use bevy::math::{Rect, Vec2};

use super::calibrator::ZoomRange;
use super::host::{
    simple_project, simple_unproject, simple_zoom_scale, ElementKey, HostFlag, MapSurface,
};

pub struct StubSurface {
    pub zoom: f32,
    pub range: ZoomRange,
    pub bounds: Rect,
    pub size: Vec2,
    pub flags: HashMap<HostFlag, bool>,
    /// Elements currently in the render layer.
    pub shown: HashSet<ElementKey>,
    pub frame_requests: usize,
    pub layer_calls: usize,
}

impl Default for StubSurface {
    fn default() -> Self {
        Self {
            zoom: 0.0,
            range: ZoomRange::default(),
            bounds: Rect::new(0.0, 0.0, 1000.0, 1000.0),
            size: Vec2::new(1000.0, 1000.0),
            flags: HashMap::from([
                (HostFlag::MarkerPointerEvents, true),
                (HostFlag::DoubleClickZoom, true),
            ]),
            shown: HashSet::new(),
            frame_requests: 0,
            layer_calls: 0,
        }
    }
}

impl StubSurface {
    pub fn is_shown(&self, key: ElementKey) -> bool {
        self.shown.contains(&key)
    }

    /// Center the view on `center` at `zoom`, deriving the bounds from the screen size.
    pub fn look_at(&mut self, center: Vec2, zoom: f32) {
        self.zoom = zoom;
        let half = self.size / 2.0 / zoom.exp2();
        self.bounds = Rect {
            min: center - half,
            max: center + half,
        };
    }
}

impl MapSurface for StubSurface {
    fn zoom(&self) -> f32 {
        self.zoom
    }

    fn zoom_range(&self) -> ZoomRange {
        self.range
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn size(&self) -> Vec2 {
        self.size
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
        self.flags.get(&flag).copied().unwrap_or(false)
    }

    fn set_flag(&mut self, flag: HostFlag, enabled: bool) {
        self.flags.insert(flag, enabled);
    }

    fn set_element_shown(&mut self, key: ElementKey, shown: bool) {
        self.layer_calls += 1;
        if shown {
            self.shown.insert(key);
        } else {
            self.shown.remove(&key);
        }
    }

    fn request_frame(&mut self) {
        self.frame_requests += 1;
    }
}
