//! Maps designer fractions of the zoom range onto absolute zoom levels.

use serde::{Deserialize, Serialize};

use super::annotation::AnnotationKind;

/// Zoom limits of the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min: f32,
    pub max: f32,
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self { min: -4.0, max: 2.0 }
    }
}

impl ZoomRange {
    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    pub fn clamp(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min, self.max.max(self.min))
    }
}

/// `min + fraction * (max - min)`.
pub fn pct_to_zoom(fraction: f32, range: ZoomRange) -> f32 {
    range.min + fraction * range.span()
}

/// Fraction of the zoom range at which each point kind appears.
/// `None` leaves the kind visible at every zoom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityFractions {
    pub city: Option<f32>,
    pub town: Option<f32>,
    pub ruin: Option<f32>,
    pub poi: Option<f32>,
}

impl Default for VisibilityFractions {
    fn default() -> Self {
        Self {
            city: Some(0.6),
            town: Some(0.8),
            ruin: Some(0.8),
            poi: Some(0.8),
        }
    }
}

/// Zoom bands of boundary regions as fractions of the zoom range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionBandFractions {
    pub pin_min: f32,
    pub pin_max: f32,
    pub area_min: f32,
}

impl Default for RegionBandFractions {
    fn default() -> Self {
        Self {
            pin_min: 0.3,
            pin_max: 0.85,
            area_min: 0.3,
        }
    }
}

/// Absolute zoom levels of a boundary region's two bands.
///
/// The pin band is `[pin_min, pin_max)` and the area band `[area_min, inf)`.
/// Nothing orders `pin_max` against `area_min`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionBand {
    pub pin_min: f32,
    pub pin_max: f32,
    pub area_min: f32,
}

/// Absolute thresholds for one zoom range.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomThresholds {
    pub range: ZoomRange,
    pub city: Option<f32>,
    pub town: Option<f32>,
    pub ruin: Option<f32>,
    pub poi: Option<f32>,
    pub region: RegionBand,
}

impl ZoomThresholds {
    pub fn compute(
        fractions: &VisibilityFractions,
        band: &RegionBandFractions,
        range: ZoomRange,
    ) -> Self {
        let to_zoom = |f: Option<f32>| f.map(|f| pct_to_zoom(f, range));
        Self {
            range,
            city: to_zoom(fractions.city),
            town: to_zoom(fractions.town),
            ruin: to_zoom(fractions.ruin),
            poi: to_zoom(fractions.poi),
            region: RegionBand {
                pin_min: pct_to_zoom(band.pin_min, range),
                pin_max: pct_to_zoom(band.pin_max, range),
                area_min: pct_to_zoom(band.area_min, range),
            },
        }
    }

    /// Threshold for point kinds. Boundary regions use [`ZoomThresholds::region`].
    pub fn for_kind(&self, kind: &AnnotationKind) -> Option<f32> {
        match kind {
            AnnotationKind::City => self.city,
            AnnotationKind::Town => self.town,
            AnnotationKind::Ruin => self.ruin,
            AnnotationKind::PointOfInterest => self.poi,
            AnnotationKind::Kingdom | AnnotationKind::Other(_) => None,
        }
    }
}

/// Thresholds cached for the last zoom range seen.
#[derive(Debug, Clone)]
pub struct ThresholdCache {
    fractions: VisibilityFractions,
    band: RegionBandFractions,
    cached: Option<ZoomThresholds>,
}

impl ThresholdCache {
    pub fn new(fractions: VisibilityFractions, band: RegionBandFractions) -> Self {
        Self {
            fractions,
            band,
            cached: None,
        }
    }

    pub fn get(&mut self, range: ZoomRange) -> &ZoomThresholds {
        if self.cached.as_ref().is_some_and(|t| t.range != range) {
            self.cached = None;
        }
        self.cached
            .get_or_insert_with(|| ZoomThresholds::compute(&self.fractions, &self.band, range))
    }

    /// Forget the cached thresholds; called on zoom-range change.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
