//! The overlay engine: one instance per map.

use std::collections::{HashMap, HashSet};

use bevy::log::{debug, info, warn};
use bevy::prelude::Resource;

use super::annotation::Annotation;
use super::calibration::{CalibrationError, ScaleCalibration};
use super::calibrator::{RegionBandFractions, ThresholdCache, VisibilityFractions, ZoomThresholds};
use super::culler::{CullSettings, ViewportCuller};
use super::host::{HostFlag, MapEvent, MapSurface};
use super::lease::{release_slot, FlagLease};
use super::ruler::{Ruler, RulerOverlay};
use super::scale_bar::{ScaleBar, ScaleBarReading};
use super::search::{filter_places, focus_target, FocusTarget};
use super::visibility::{resolve, VisibilityState};

/// Construction parameters, normally taken from the app config.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub fractions: VisibilityFractions,
    pub region_band: RegionBandFractions,
    pub cull: CullSettings,
    pub scale_bar_width: f32,
    pub scale_bar_decimals: usize,
    pub calibration: ScaleCalibration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fractions: VisibilityFractions::default(),
            region_band: RegionBandFractions::default(),
            cull: CullSettings::default(),
            scale_bar_width: 120.0,
            scale_bar_decimals: 2,
            calibration: ScaleCalibration::default(),
        }
    }
}

#[derive(Resource)]
pub struct AtlasEngine {
    annotations: Vec<Annotation>,
    index_by_id: HashMap<String, usize>,
    hidden_groups: HashSet<String>,
    thresholds: ThresholdCache,
    culler: ViewportCuller,
    ruler: Ruler,
    scale_bar: ScaleBar,
    calibration: ScaleCalibration,
    /// Held while the map is being dragged.
    drag_lease: Option<FlagLease>,
}

impl Default for AtlasEngine {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

impl AtlasEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            annotations: Vec::new(),
            index_by_id: HashMap::new(),
            hidden_groups: HashSet::new(),
            thresholds: ThresholdCache::new(settings.fractions, settings.region_band),
            culler: ViewportCuller::new(settings.cull),
            ruler: Ruler::default(),
            scale_bar: ScaleBar::new(settings.scale_bar_width, settings.scale_bar_decimals),
            calibration: settings.calibration,
            drag_lease: None,
        }
    }

    /// Replace the annotation set. The host must have created the new
    /// elements outside the render layer; a full pass is scheduled.
    pub fn load_annotations<H: MapSurface + ?Sized>(&mut self, host: &mut H, annotations: Vec<Annotation>) {
        self.index_by_id = annotations
            .iter()
            .enumerate()
            .map(|(index, a)| (a.id.clone(), index))
            .collect();
        self.annotations = annotations;
        self.culler.reset(self.annotations.len());
        self.culler.schedule(host);
        info!("Atlas holds {} annotations", self.annotations.len());
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn annotation(&self, id: &str) -> Option<&Annotation> {
        self.index_of(id).map(|index| &self.annotations[index])
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    /// Feed a host notification or user input into the engine.
    /// Returns `true` when the event was consumed by the measurement tool.
    pub fn handle<H: MapSurface + ?Sized>(&mut self, host: &mut H, event: MapEvent) -> bool {
        match event {
            MapEvent::ZoomEnd | MapEvent::Resize => {
                self.culler.schedule(host);
                self.scale_bar.refresh(host, &self.calibration);
                false
            }
            MapEvent::Move => {
                self.culler.schedule(host);
                false
            }
            MapEvent::ZoomRangeChanged => {
                debug!("Zoom range changed to {:?}", host.zoom_range());
                self.thresholds.invalidate();
                self.culler.invalidate();
                self.culler.schedule(host);
                self.scale_bar.refresh(host, &self.calibration);
                false
            }
            MapEvent::DragStart => {
                if self.drag_lease.is_none() {
                    self.drag_lease =
                        Some(FlagLease::acquire(host, HostFlag::MarkerPointerEvents, false));
                }
                false
            }
            MapEvent::DragEnd => {
                release_slot(&mut self.drag_lease, host);
                false
            }
            MapEvent::PointerDown(position) => self.ruler.click(position, &self.calibration),
            MapEvent::PointerMove(position) => {
                self.ruler.pointer_move(position, &self.calibration)
            }
            MapEvent::DoubleActivation(_) => {
                if !self.ruler.is_active() {
                    return false;
                }
                self.ruler.finish(host, &self.calibration);
                true
            }
            MapEvent::Undo => self.ruler.undo(&self.calibration),
            MapEvent::Cancel => {
                if !self.ruler.is_active() {
                    return false;
                }
                self.ruler.cancel(host);
                true
            }
        }
    }

    /// Host frame callback. Runs the pending cull pass, if any.
    pub fn on_frame<H: MapSurface + ?Sized>(&mut self, host: &mut H) -> bool {
        let thresholds = self.thresholds.get(host.zoom_range());
        self.culler
            .run_frame(host, &self.annotations, thresholds, &self.hidden_groups)
    }

    /// Full cull passes run so far.
    pub fn cull_passes(&self) -> u64 {
        self.culler.passes_run()
    }

    /// Current render-layer membership of an annotation.
    pub fn visibility(&self, id: &str) -> Option<VisibilityState> {
        self.index_of(id).and_then(|index| self.culler.shown(index))
    }

    /// Zoom-only visibility at `zoom`, ignoring the viewport.
    pub fn zoom_visibility<H: MapSurface + ?Sized>(&mut self, host: &H, id: &str, zoom: f32) -> Option<VisibilityState> {
        let index = self.index_of(id)?;
        let thresholds = self.thresholds.get(host.zoom_range());
        Some(resolve(&self.annotations[index], zoom, thresholds))
    }

    pub fn thresholds<H: MapSurface + ?Sized>(&mut self, host: &H) -> &ZoomThresholds {
        self.thresholds.get(host.zoom_range())
    }

    pub fn group_visible(&self, group: &str) -> bool {
        !self.hidden_groups.contains(group)
    }

    /// Layer-group toggle from the UI.
    pub fn set_group_visible<H: MapSurface + ?Sized>(&mut self, host: &mut H, group: &str, visible: bool) {
        let changed = if visible {
            self.hidden_groups.remove(group)
        } else {
            self.hidden_groups.insert(group.to_string())
        };
        if changed {
            self.culler.invalidate();
            self.culler.schedule(host);
        }
    }

    /// Distinct layer groups in feed order.
    pub fn groups(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.annotations
            .iter()
            .map(|a| a.group.as_str())
            .filter(|g| seen.insert(*g))
            .collect()
    }

    pub fn calibration(&self) -> &ScaleCalibration {
        &self.calibration
    }

    /// Change the calibration; rejected values leave the current one in place.
    /// The ruler label and the scale bar are refreshed immediately.
    pub fn set_calibration<H: MapSurface + ?Sized>(
        &mut self,
        host: &H,
        units_per_px: f32,
        unit: Option<&str>,
    ) -> Result<(), CalibrationError> {
        if let Err(e) = self.calibration.set(units_per_px, unit) {
            warn!("Rejected scale calibration: {}", e);
            return Err(e);
        }
        self.ruler.refresh_label(&self.calibration);
        self.scale_bar.refresh(host, &self.calibration);
        info!(
            "Scale set to {} {} per px",
            self.calibration.units_per_px(),
            self.calibration.unit()
        );
        Ok(())
    }

    pub fn ruler(&self) -> &Ruler {
        &self.ruler
    }

    pub fn ruler_overlay(&self) -> RulerOverlay<'_> {
        self.ruler.overlay()
    }

    pub fn toggle_ruler<H: MapSurface + ?Sized>(&mut self, host: &mut H) {
        self.ruler.toggle(host, &self.calibration);
    }

    /// Committed path length in source pixels.
    pub fn measured_length(&self) -> f32 {
        self.ruler.total_length()
    }

    /// Committed length including the preview segment.
    pub fn live_length(&self) -> f32 {
        self.ruler.live_length()
    }

    pub fn scale_bar(&self) -> Option<&ScaleBarReading> {
        self.scale_bar.reading()
    }

    pub fn search(&self, query: &str) -> Vec<usize> {
        filter_places(&self.annotations, query)
    }

    pub fn focus_target<H: MapSurface + ?Sized>(&mut self, host: &H, id: &str) -> Option<FocusTarget> {
        let index = self.index_of(id)?;
        let thresholds = self.thresholds.get(host.zoom_range());
        Some(focus_target(host, &self.annotations[index], thresholds))
    }

    /// Hand back every host flag the engine holds. Called on teardown.
    pub fn shutdown<H: MapSurface + ?Sized>(&mut self, host: &mut H) {
        release_slot(&mut self.drag_lease, host);
        self.ruler.shutdown(host);
        debug!("Atlas engine released host flags");
    }
}
