//! Semantic unit types for the quantities entering the Nusselt number
//!
//! Newtype wrappers keep the characteristic length, the fluid conductivity and
//! the wall heat-transfer coefficient from being swapped at call sites.
//!
//! # Usage
//! ```
//! use foam_post_core::units::{Meters, WattsPerMeterKelvin};
//!
//! let length = Meters::new(0.5);
//! let k = WattsPerMeterKelvin::new(0.025);
//! assert!((*length / *k - 20.0).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;

/// Compare f64 values with total ordering using Rust's built-in `total_cmp`
#[inline]
fn f64_total_cmp(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

// ============================================================================
// LENGTH
// ============================================================================

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Meters(f64);

impl Meters {
    /// Create a new length. Range checks belong to the caller.
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Meters(value)
    }
}

impl Deref for Meters {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl fmt::Display for Meters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} m", self.0)
    }
}

// ============================================================================
// THERMAL CONDUCTIVITY
// ============================================================================

/// Thermal conductivity in W/(m·K)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct WattsPerMeterKelvin(f64);

impl WattsPerMeterKelvin {
    /// Create a new conductivity. Range checks belong to the caller.
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        WattsPerMeterKelvin(value)
    }
}

impl Deref for WattsPerMeterKelvin {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl fmt::Display for WattsPerMeterKelvin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} W/(m·K)", self.0)
    }
}

// ============================================================================
// HEAT-TRANSFER COEFFICIENT
// ============================================================================

/// Convective heat-transfer coefficient in W/(m²·K)
///
/// Ordered with `total_cmp` so series of coefficients can be sorted even when
/// a solver wrote `nan` into a boundary face.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct WattsPerSquareMeterKelvin(f64);

impl Eq for WattsPerSquareMeterKelvin {}

impl PartialOrd for WattsPerSquareMeterKelvin {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WattsPerSquareMeterKelvin {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl WattsPerSquareMeterKelvin {
    /// Create a new heat-transfer coefficient.
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        WattsPerSquareMeterKelvin(value)
    }
}

impl Deref for WattsPerSquareMeterKelvin {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl fmt::Display for WattsPerSquareMeterKelvin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} W/(m²·K)", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deref_exposes_raw_value() {
        assert_eq!(*Meters::new(0.5), 0.5);
        assert_eq!(*WattsPerMeterKelvin::new(0.025), 0.025);
        assert_eq!(*WattsPerSquareMeterKelvin::new(12.0), 12.0);
    }

    #[test]
    fn test_coefficient_total_ordering() {
        let mut values = vec![
            WattsPerSquareMeterKelvin::new(3.0),
            WattsPerSquareMeterKelvin::new(f64::NAN),
            WattsPerSquareMeterKelvin::new(1.0),
        ];
        values.sort();
        assert_eq!(*values[0], 1.0);
        assert_eq!(*values[1], 3.0);
        assert!(values[2].is_nan());
    }

    #[test]
    fn test_serializes_as_bare_number() {
        let json = serde_json::to_string(&Meters::new(0.5)).unwrap();
        assert_eq!(json, "0.5");
    }

    #[test]
    fn test_display_includes_unit() {
        assert_eq!(format!("{}", Meters::new(0.5)), "0.5 m");
    }
}
