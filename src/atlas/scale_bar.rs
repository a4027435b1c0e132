//! Fixed-width scale bar and the distance formatting it shares with the ruler.

use super::calibration::ScaleCalibration;
use super::host::MapSurface;

/// Decimal places by order of magnitude. Fixed-point only, never exponential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagnitudeFormat {
    /// Decimals below 1; `None` falls through to `below_ten`.
    pub below_one: Option<usize>,
    pub below_ten: usize,
    pub below_hundred: usize,
}

impl MagnitudeFormat {
    /// Ruler label format: `>= 100` integer, `>= 10` one decimal, else two.
    pub const RULER: Self = Self {
        below_one: None,
        below_ten: 2,
        below_hundred: 1,
    };

    pub fn scale_bar(small_decimals: usize) -> Self {
        Self {
            below_one: Some(3),
            below_ten: small_decimals,
            below_hundred: 1,
        }
    }

    pub fn format(&self, value: f32) -> String {
        if !value.is_finite() {
            return "0".to_string();
        }
        let magnitude = value.abs();
        let decimals = if magnitude >= 100.0 {
            return format!("{:.0}", value.round());
        } else if magnitude >= 10.0 {
            self.below_hundred
        } else if magnitude >= 1.0 {
            self.below_ten
        } else {
            self.below_one.unwrap_or(self.below_ten)
        };
        format!("{:.*}", decimals, value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScaleBarReading {
    /// On-screen width of the bar.
    pub width_px: f32,
    /// Source-image pixels covered by the bar at the current zoom.
    pub source_px: f32,
    /// `source_px` converted with the calibration.
    pub value: f32,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ScaleBar {
    width_px: f32,
    format: MagnitudeFormat,
    reading: Option<ScaleBarReading>,
}

impl ScaleBar {
    pub fn new(width_px: f32, small_decimals: usize) -> Self {
        Self {
            width_px,
            format: MagnitudeFormat::scale_bar(small_decimals),
            reading: None,
        }
    }

    pub fn width_px(&self) -> f32 {
        self.width_px
    }

    pub fn reading(&self) -> Option<&ScaleBarReading> {
        self.reading.as_ref()
    }

    /// Recompute from the host's current zoom; called on zoom end, resize and
    /// calibration change.
    pub fn refresh<H: MapSurface + ?Sized>(
        &mut self,
        host: &H,
        calibration: &ScaleCalibration,
    ) -> &ScaleBarReading {
        let source_per_screen = host.zoom_scale(host.zoom(), 0.0);
        let reading = self.compute(source_per_screen, calibration);
        self.reading.insert(reading)
    }

    pub fn compute(&self, source_per_screen_px: f32, calibration: &ScaleCalibration) -> ScaleBarReading {
        let source_px = self.width_px * source_per_screen_px;
        let value = calibration.convert(source_px);
        ScaleBarReading {
            width_px: self.width_px,
            source_px,
            value,
            text: format!("{} {}", self.format.format(value), calibration.unit()),
        }
    }
}
