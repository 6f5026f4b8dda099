//! Reduction of a boundary series to its mean and the Nusselt number
//!
//! Nu = h̄ · L / k
//!
//! where h̄ is the face-averaged wall heat-transfer coefficient, L the
//! characteristic length and k the fluid thermal conductivity. Every face
//! value has equal weight; no area weighting or outlier rejection.

use crate::error::PostError;
use crate::snapshot::Snapshot;
use crate::units::{Meters, WattsPerMeterKelvin, WattsPerSquareMeterKelvin};
use serde::{Deserialize, Serialize};

/// Constants applied uniformly to every snapshot of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    /// Characteristic length (pipe diameter, plate length)
    pub characteristic_length: Meters,
    /// Fluid thermal conductivity
    pub thermal_conductivity: WattsPerMeterKelvin,
}

impl PhysicalConstants {
    /// Validate and bundle the constants.
    ///
    /// # Errors
    /// Returns [`PostError::InvalidConstant`] if the length is not finite and
    /// positive, or the conductivity is not finite and non-zero.
    pub fn new(characteristic_length: f64, thermal_conductivity: f64) -> Result<Self, PostError> {
        if !characteristic_length.is_finite() || characteristic_length <= 0.0 {
            return Err(PostError::InvalidConstant {
                name: "characteristic_length",
                value: characteristic_length,
                reason: "must be finite and positive",
            });
        }
        if !thermal_conductivity.is_finite() || thermal_conductivity == 0.0 {
            return Err(PostError::InvalidConstant {
                name: "thermal_conductivity",
                value: thermal_conductivity,
                reason: "must be finite and non-zero",
            });
        }
        Ok(Self {
            characteristic_length: Meters::new(characteristic_length),
            thermal_conductivity: WattsPerMeterKelvin::new(thermal_conductivity),
        })
    }

    /// Re-run the range checks, e.g. after deserializing.
    ///
    /// # Errors
    /// Same conditions as [`PhysicalConstants::new`].
    pub fn validated(self) -> Result<Self, PostError> {
        Self::new(*self.characteristic_length, *self.thermal_conductivity)
    }
}

/// Result of reducing one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    /// Snapshot directory name
    pub label: String,
    /// Snapshot time in seconds
    pub time: f64,
    /// Mean wall heat-transfer coefficient
    pub mean_h: WattsPerSquareMeterKelvin,
    /// Nusselt number
    pub nusselt: f64,
}

/// Arithmetic mean using Neumaier compensated summation.
///
/// # Errors
/// Returns [`PostError::InvalidInput`] for an empty series.
pub fn mean(values: &[f64]) -> Result<f64, PostError> {
    if values.is_empty() {
        return Err(PostError::InvalidInput(
            "cannot average an empty series".to_string(),
        ));
    }

    let mut sum = 0.0_f64;
    let mut compensation = 0.0_f64;
    for &v in values {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            compensation += (sum - t) + v;
        } else {
            compensation += (v - t) + sum;
        }
        sum = t;
    }

    // An overflowed or infinite sum leaves a NaN compensation term
    if !sum.is_finite() {
        return Ok(sum / values.len() as f64);
    }
    Ok((sum + compensation) / values.len() as f64)
}

/// Nusselt number `h · L / k`.
///
/// # Errors
/// Returns [`PostError::DivisionByZero`] when `k` is zero.
pub fn nusselt_number(
    mean_h: f64,
    characteristic_length: Meters,
    thermal_conductivity: WattsPerMeterKelvin,
) -> Result<f64, PostError> {
    if *thermal_conductivity == 0.0 {
        return Err(PostError::DivisionByZero);
    }
    Ok(mean_h * *characteristic_length / *thermal_conductivity)
}

/// Reduce one snapshot's series to a record.
///
/// # Errors
/// Returns [`PostError::InvalidInput`] for an empty series and
/// [`PostError::DivisionByZero`] for a zero conductivity.
pub fn aggregate(
    snapshot: &Snapshot,
    values: &[f64],
    constants: &PhysicalConstants,
) -> Result<AggregateRecord, PostError> {
    let mean_h = mean(values)?;
    let nusselt = nusselt_number(
        mean_h,
        constants.characteristic_length,
        constants.thermal_conductivity,
    )?;
    Ok(AggregateRecord {
        label: snapshot.label.clone(),
        time: snapshot.time,
        mean_h: WattsPerSquareMeterKelvin::new(mean_h),
        nusselt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::path::PathBuf;

    fn snapshot(label: &str) -> Snapshot {
        Snapshot {
            label: label.to_string(),
            time: label.parse().unwrap(),
            path: PathBuf::from(label),
        }
    }

    #[test]
    fn test_mean_and_nusselt_reference_case() {
        let constants = PhysicalConstants::new(0.5, 0.025).unwrap();
        let record = aggregate(&snapshot("3"), &[1.0, 2.0, 3.0], &constants).unwrap();
        assert_relative_eq!(*record.mean_h, 2.0);
        assert_relative_eq!(record.nusselt, 40.0, epsilon = 1e-9);
        assert_eq!(record.label, "3");
        assert_eq!(record.time, 3.0);
    }

    #[test]
    fn test_zero_conductivity_is_division_by_zero() {
        let err = nusselt_number(2.0, Meters::new(0.5), WattsPerMeterKelvin::new(0.0)).unwrap_err();
        assert!(matches!(err, PostError::DivisionByZero));
    }

    #[test]
    fn test_empty_series_is_invalid_input() {
        assert!(matches!(mean(&[]), Err(PostError::InvalidInput(_))));

        let constants = PhysicalConstants::new(1.0, 1.0).unwrap();
        let err = aggregate(&snapshot("1"), &[], &constants).unwrap_err();
        assert!(matches!(err, PostError::InvalidInput(_)));
    }

    #[test]
    fn test_compensated_sum_keeps_small_terms() {
        // Naive summation loses every 1.0 against 1e16
        let values = [1e16, 1.0, 1.0, 1.0, 1.0, -1e16];
        assert_relative_eq!(mean(&values).unwrap(), 4.0 / 6.0, epsilon = 1e-15);
    }

    #[test]
    fn test_infinite_sum_is_not_nan() {
        assert_eq!(mean(&[f64::INFINITY, 1.0]).unwrap(), f64::INFINITY);
        assert_eq!(mean(&[1e308, 1e308]).unwrap(), f64::INFINITY);
        assert_eq!(mean(&[-1e308, -1e308]).unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_negative_conductivity_is_accepted() {
        // Only zero is rejected; the sign is the caller's business
        let constants = PhysicalConstants::new(1.0, -2.0).unwrap();
        let record = aggregate(&snapshot("0"), &[4.0], &constants).unwrap();
        assert_relative_eq!(record.nusselt, -2.0);
    }

    #[test]
    fn test_invalid_constants_rejected() {
        for (length, k) in [(0.0, 1.0), (-1.0, 1.0), (f64::NAN, 1.0), (1.0, 0.0), (1.0, f64::INFINITY)] {
            let err = PhysicalConstants::new(length, k).unwrap_err();
            assert!(matches!(err, PostError::InvalidConstant { .. }), "{length}, {k}");
        }
    }

    #[test]
    fn test_validated_catches_deserialized_zero() {
        let constants: PhysicalConstants =
            serde_json::from_str(r#"{"characteristic_length": 0.5, "thermal_conductivity": 0.0}"#)
                .unwrap();
        assert!(constants.validated().is_err());
    }
}
