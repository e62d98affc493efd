//! Host length units and their meters-per-unit factors

use serde::{Deserialize, Serialize};

/// Length unit a host document is modeled in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Millimeters,
    Centimeters,
    #[default]
    Meters,
    Kilometers,
    Inches,
    Feet,
    Yards,
    Miles,
    /// Anything the host reports that we do not recognize
    #[serde(other)]
    Unknown,
}

impl LengthUnit {
    /// Multiplier taking one host unit to meters
    ///
    /// Unrecognized units are treated as meters.
    pub const fn meters_per_unit(&self) -> f64 {
        match self {
            LengthUnit::Millimeters => 0.001,
            LengthUnit::Centimeters => 0.01,
            LengthUnit::Meters => 1.0,
            LengthUnit::Kilometers => 1000.0,
            LengthUnit::Inches => 0.0254,
            LengthUnit::Feet => 0.3048,
            LengthUnit::Yards => 0.9144,
            LengthUnit::Miles => 1609.344,
            LengthUnit::Unknown => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meters_per_unit_table() {
        assert_eq!(LengthUnit::Millimeters.meters_per_unit(), 0.001);
        assert_eq!(LengthUnit::Centimeters.meters_per_unit(), 0.01);
        assert_eq!(LengthUnit::Meters.meters_per_unit(), 1.0);
        assert_eq!(LengthUnit::Kilometers.meters_per_unit(), 1000.0);
        assert_eq!(LengthUnit::Inches.meters_per_unit(), 0.0254);
        assert_eq!(LengthUnit::Feet.meters_per_unit(), 0.3048);
        assert_eq!(LengthUnit::Yards.meters_per_unit(), 0.9144);
        assert_eq!(LengthUnit::Miles.meters_per_unit(), 1609.344);
    }

    #[test]
    fn test_unknown_unit_is_meters() {
        assert_eq!(LengthUnit::Unknown.meters_per_unit(), 1.0);
    }

    #[test]
    fn test_unrecognized_unit_name_deserializes_to_unknown() {
        let unit: LengthUnit = serde_json::from_str("\"parsecs\"").unwrap();
        assert_eq!(unit, LengthUnit::Unknown);

        let unit: LengthUnit = serde_json::from_str("\"feet\"").unwrap();
        assert_eq!(unit, LengthUnit::Feet);
    }
}
