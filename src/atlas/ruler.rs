//! Distance measurement tool.
//!
//! Clicks commit points of a multi-segment path; moving the pointer previews
//! the next segment. While the tool is active it holds the host's
//! double-click zoom so double clicks can finish a measurement.

use bevy::log::debug;
use bevy::math::Vec2;

use super::calibration::ScaleCalibration;
use super::geometry::path_length;
use super::host::{HostFlag, MapSurface};
use super::lease::{release_slot, FlagLease};
use super::scale_bar::MagnitudeFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RulerPhase {
    #[default]
    Inactive,
    /// Active with no committed points.
    Placing,
    /// Active with at least one committed point.
    Measuring,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RulerLabel {
    pub position: Vec2,
    pub text: String,
}

/// What the host should draw for the ruler this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RulerOverlay<'a> {
    pub path: &'a [Vec2],
    /// Last committed point to cursor.
    pub preview: Option<(Vec2, Vec2)>,
    pub label: Option<&'a RulerLabel>,
}

impl RulerOverlay<'_> {
    pub fn is_empty(&self) -> bool {
        self.path.is_empty() && self.preview.is_none() && self.label.is_none()
    }
}

#[derive(Debug, Default)]
pub struct Ruler {
    phase: RulerPhase,
    points: Vec<Vec2>,
    preview: Option<Vec2>,
    label: Option<RulerLabel>,
    double_click: Option<FlagLease>,
}

/// `"{px} px • {value} {unit}"`.
pub fn format_measurement(source_px: f32, calibration: &ScaleCalibration) -> String {
    format!(
        "{:.0} px • {} {}",
        source_px.round(),
        MagnitudeFormat::RULER.format(calibration.convert(source_px)),
        calibration.unit()
    )
}

impl Ruler {
    pub fn phase(&self) -> RulerPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != RulerPhase::Inactive
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn preview(&self) -> Option<Vec2> {
        self.preview
    }

    pub fn label(&self) -> Option<&RulerLabel> {
        self.label.as_ref()
    }

    /// Length of the committed path in source pixels.
    pub fn total_length(&self) -> f32 {
        path_length(&self.points)
    }

    /// Committed length plus the preview segment.
    pub fn live_length(&self) -> f32 {
        let preview = match (self.points.last(), self.preview) {
            (Some(last), Some(cursor)) => last.distance(cursor),
            _ => 0.0,
        };
        self.total_length() + preview
    }

    pub fn overlay(&self) -> RulerOverlay<'_> {
        RulerOverlay {
            path: &self.points,
            preview: self.points.last().copied().zip(self.preview),
            label: self.label.as_ref(),
        }
    }

    /// Start a fresh measurement. Works from any phase.
    pub fn activate<H: MapSurface + ?Sized>(&mut self, host: &mut H) {
        self.reset_artifacts();
        if self.double_click.is_none() {
            self.double_click = Some(FlagLease::acquire(host, HostFlag::DoubleClickZoom, false));
        }
        self.phase = RulerPhase::Placing;
        debug!("Ruler activated");
    }

    /// Toolbar toggle: start when inactive, finish when active.
    pub fn toggle<H: MapSurface + ?Sized>(&mut self, host: &mut H, calibration: &ScaleCalibration) {
        if self.is_active() {
            self.finish(host, calibration);
        } else {
            self.activate(host);
        }
    }

    /// Commit a point. Returns whether the click was consumed.
    pub fn click(&mut self, position: Vec2, calibration: &ScaleCalibration) -> bool {
        if !self.is_active() {
            return false;
        }
        self.points.push(position);
        self.phase = RulerPhase::Measuring;
        self.preview = None;
        self.label_at_last_point(calibration);
        true
    }

    pub fn pointer_move(&mut self, position: Vec2, calibration: &ScaleCalibration) -> bool {
        if self.phase != RulerPhase::Measuring {
            return false;
        }
        self.preview = Some(position);
        self.label = Some(RulerLabel {
            position,
            text: format_measurement(self.live_length(), calibration),
        });
        true
    }

    /// Drop the last committed point. Returns whether the input was consumed.
    pub fn undo(&mut self, calibration: &ScaleCalibration) -> bool {
        if !self.is_active() {
            return false;
        }
        if self.points.pop().is_none() {
            return true;
        }
        if self.points.is_empty() {
            self.reset_artifacts();
            self.phase = RulerPhase::Placing;
        } else {
            self.preview = None;
            self.label_at_last_point(calibration);
        }
        true
    }

    /// Keep the committed path and its label, drop the preview, deactivate.
    pub fn finish<H: MapSurface + ?Sized>(&mut self, host: &mut H, calibration: &ScaleCalibration) {
        if !self.is_active() {
            return;
        }
        self.preview = None;
        if self.points.is_empty() {
            self.label = None;
        } else {
            self.label_at_last_point(calibration);
        }
        self.deactivate(host);
        debug!("Ruler finished at {:.1} px", self.total_length());
    }

    /// Tear everything down and deactivate.
    pub fn cancel<H: MapSurface + ?Sized>(&mut self, host: &mut H) {
        if !self.is_active() {
            return;
        }
        self.reset_artifacts();
        self.deactivate(host);
        debug!("Ruler cancelled");
    }

    /// Hand the double-click flag back without touching the measurement.
    pub fn shutdown<H: MapSurface + ?Sized>(&mut self, host: &mut H) {
        self.phase = RulerPhase::Inactive;
        self.preview = None;
        release_slot(&mut self.double_click, host);
    }

    /// Rebuild the label text after a calibration change.
    pub fn refresh_label(&mut self, calibration: &ScaleCalibration) {
        let length = self.live_length();
        if let Some(label) = self.label.as_mut() {
            label.text = format_measurement(length, calibration);
        }
    }

    fn deactivate<H: MapSurface + ?Sized>(&mut self, host: &mut H) {
        self.phase = RulerPhase::Inactive;
        release_slot(&mut self.double_click, host);
    }

    fn label_at_last_point(&mut self, calibration: &ScaleCalibration) {
        self.label = self.points.last().map(|&position| RulerLabel {
            position,
            text: format_measurement(self.total_length(), calibration),
        });
    }

    fn reset_artifacts(&mut self) {
        self.points.clear();
        self.preview = None;
        self.label = None;
    }
}
