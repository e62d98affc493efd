//! Core value types shared by the pipeline stages

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier the host assigns to a light for the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LightId(pub u32);

impl fmt::Display for LightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Plain 3-component vector used for both points and directions
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

/// Orientation in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    pub pitch: f64,
    pub yaw: f64,
    /// Always 0: host directions carry no twist
    pub roll: f64,
}

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RGB({},{},{})", self.r, self.g, self.b)
    }
}

/// Light category as sent to the receiver
///
/// The string forms are a closed set and never need JSON escaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Directional,
    Point,
    Spot,
    Ambient,
    Unknown,
}

impl LightKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LightKind::Directional => "Directional",
            LightKind::Point => "Point",
            LightKind::Spot => "Spot",
            LightKind::Ambient => "Ambient",
            LightKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for LightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spot cone angles in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotParams {
    pub inner_angle_deg: f64,
    pub outer_angle_deg: f64,
}

/// One converted light, ready for encoding
///
/// `spot` is `Some` exactly when `kind` is [`LightKind::Spot`]; the snapshot
/// builder is the only place records are made.
#[derive(Debug, Clone, PartialEq)]
pub struct LightRecord {
    pub id: LightId,
    pub kind: LightKind,
    /// Meters
    pub position: Vec3,
    /// Host direction vector, as read
    pub direction: Vec3,
    pub orientation: Rotation,
    pub intensity: f64,
    pub color: Rgb,
    pub spot: Option<SpotParams>,
}

/// Why a pipeline run happened; metadata only, never affects which lights are sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLabel {
    Added,
    Deleted,
    Undeleted,
    Modified,
    Unknown,
}

impl EventLabel {
    /// Wire string for the `event` field
    pub const fn as_str(&self) -> &'static str {
        match self {
            EventLabel::Added => "Light Added",
            EventLabel::Deleted => "Light Deleted",
            EventLabel::Undeleted => "Light Undeleted",
            EventLabel::Modified => "Light Modified",
            EventLabel::Unknown => "Unknown Light Event",
        }
    }

    /// Map a raw host event code (0 added, 1 deleted, 2 undeleted, 3 modified)
    pub const fn from_host_code(code: i32) -> Self {
        match code {
            0 => EventLabel::Added,
            1 => EventLabel::Deleted,
            2 => EventLabel::Undeleted,
            3 => EventLabel::Modified,
            _ => EventLabel::Unknown,
        }
    }
}

impl fmt::Display for EventLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_label_from_host_code() {
        assert_eq!(EventLabel::from_host_code(0), EventLabel::Added);
        assert_eq!(EventLabel::from_host_code(1), EventLabel::Deleted);
        assert_eq!(EventLabel::from_host_code(2), EventLabel::Undeleted);
        assert_eq!(EventLabel::from_host_code(3), EventLabel::Modified);
        assert_eq!(EventLabel::from_host_code(42), EventLabel::Unknown);
        assert_eq!(EventLabel::from_host_code(-1), EventLabel::Unknown);
    }

    #[test]
    fn test_vec3_length_and_scale() {
        let v = Vec3::new(3.0, 4.0, 0.0);
        assert_eq!(v.length(), 5.0);
        assert_eq!(v.scaled(2.0), Vec3::new(6.0, 8.0, 0.0));
        assert!(!Vec3::new(f64::NAN, 0.0, 0.0).is_finite());
    }

    #[test]
    fn test_rgb_display() {
        assert_eq!(Rgb::new(255, 128, 0).to_string(), "RGB(255,128,0)");
    }
}
