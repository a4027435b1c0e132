//! Conversion ratio between source-image pixels and real-world units.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationError {
    NotPositive(f32),
    NotFinite,
    Unparseable(String),
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationError::NotPositive(v) => write!(f, "Scale must be positive (got {})", v),
            CalibrationError::NotFinite => write!(f, "Scale must be a finite number"),
            CalibrationError::Unparseable(input) => {
                write!(f, "Expected \"<units per px> <unit>\", got {:?}", input)
            }
        }
    }
}

impl std::error::Error for CalibrationError {}

/// Real-world units per source-image pixel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleCalibration {
    units_per_px: f32,
    unit: String,
}

impl Default for ScaleCalibration {
    fn default() -> Self {
        Self {
            units_per_px: 1.9,
            unit: "miles".to_string(),
        }
    }
}

impl ScaleCalibration {
    pub fn new(units_per_px: f32, unit: impl Into<String>) -> Result<Self, CalibrationError> {
        validate(units_per_px)?;
        Ok(Self {
            units_per_px,
            unit: unit.into(),
        })
    }

    pub fn units_per_px(&self) -> f32 {
        self.units_per_px
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Replace the ratio, and the unit when one is given. On error nothing changes.
    pub fn set(&mut self, units_per_px: f32, unit: Option<&str>) -> Result<(), CalibrationError> {
        validate(units_per_px)?;
        self.units_per_px = units_per_px;
        if let Some(unit) = unit.map(str::trim).filter(|u| !u.is_empty()) {
            self.unit = unit.to_string();
        }
        Ok(())
    }

    pub fn convert(&self, source_px: f32) -> f32 {
        source_px * self.units_per_px
    }

    /// A calibration read from disk that fails validation falls back to the default.
    pub fn sanitized(self) -> Self {
        if validate(self.units_per_px).is_ok() {
            self
        } else {
            Self::default()
        }
    }
}

fn validate(units_per_px: f32) -> Result<(), CalibrationError> {
    if !units_per_px.is_finite() {
        return Err(CalibrationError::NotFinite);
    }
    if units_per_px <= 0.0 {
        return Err(CalibrationError::NotPositive(units_per_px));
    }
    Ok(())
}

/// Parse `"<units per px> <unit words>"`, e.g. `"0.1 miles"` or `"2 league marks"`.
/// The unit is optional.
pub fn parse_scale_input(input: &str) -> Result<(f32, Option<String>), CalibrationError> {
    let mut parts = input.split_whitespace();
    let value = parts
        .next()
        .and_then(|v| v.parse::<f32>().ok())
        .ok_or_else(|| CalibrationError::Unparseable(input.to_string()))?;
    let unit = parts.collect::<Vec<_>>().join(" ");
    Ok((value, (!unit.is_empty()).then_some(unit)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_and_keeps_prior() {
        let mut cal = ScaleCalibration::new(0.5, "km").unwrap();
        assert_eq!(cal.set(0.0, None), Err(CalibrationError::NotPositive(0.0)));
        assert_eq!(cal.set(-2.0, Some("mi")), Err(CalibrationError::NotPositive(-2.0)));
        assert_eq!(cal.set(f32::NAN, None), Err(CalibrationError::NotFinite));
        assert_eq!(cal.set(f32::INFINITY, None), Err(CalibrationError::NotFinite));
        assert_eq!(cal.units_per_px(), 0.5);
        assert_eq!(cal.unit(), "km");
    }

    #[test]
    fn test_set_without_unit_keeps_unit() {
        let mut cal = ScaleCalibration::default();
        cal.set(0.1, None).unwrap();
        assert_eq!(cal.units_per_px(), 0.1);
        assert_eq!(cal.unit(), "miles");
        cal.set(0.2, Some("  leagues ")).unwrap();
        assert_eq!(cal.unit(), "leagues");
    }

    #[test]
    fn test_parse_scale_input() {
        assert_eq!(
            parse_scale_input("0.1 miles").unwrap(),
            (0.1, Some("miles".to_string()))
        );
        assert_eq!(
            parse_scale_input("  2   league   marks ").unwrap(),
            (2.0, Some("league marks".to_string()))
        );
        assert_eq!(parse_scale_input("3").unwrap(), (3.0, None));
        assert!(parse_scale_input("miles").is_err());
        assert!(parse_scale_input("").is_err());
    }

    #[test]
    fn test_sanitized_replaces_invalid() {
        let bad: ScaleCalibration =
            serde_json::from_str(r#"{"units_per_px": -1.0, "unit": "mi"}"#).unwrap();
        assert_eq!(bad.sanitized(), ScaleCalibration::default());
    }
}
