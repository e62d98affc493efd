//! Capability interface for the host modeling application
//!
//! The pipeline only sees these traits. An adapter at the plug-in boundary
//! binds them to the host's real document and light table; [`crate::scene`]
//! provides an in-memory implementation.

use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::types::{LightId, LightKind, Rgb, Vec3};
use crate::units::LengthUnit;

/// Host light style, including camera/world variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightStyle {
    CameraDirectional,
    WorldDirectional,
    CameraPoint,
    WorldPoint,
    CameraSpot,
    WorldSpot,
    Ambient,
    #[serde(other)]
    Unknown,
}

impl LightStyle {
    pub const fn kind(&self) -> LightKind {
        match self {
            LightStyle::CameraDirectional | LightStyle::WorldDirectional => LightKind::Directional,
            LightStyle::CameraPoint | LightStyle::WorldPoint => LightKind::Point,
            LightStyle::CameraSpot | LightStyle::WorldSpot => LightKind::Spot,
            LightStyle::Ambient => LightKind::Ambient,
            LightStyle::Unknown => LightKind::Unknown,
        }
    }
}

/// Light data as the host stores it, in document units
#[derive(Debug, Clone, PartialEq)]
pub struct RawLight {
    pub style: LightStyle,
    pub enabled: bool,
    pub location: Vec3,
    pub direction: Vec3,
    pub intensity: f64,
    pub diffuse: Rgb,
    /// Only meaningful for spot styles
    pub inner_angle_deg: f64,
    pub outer_angle_deg: f64,
}

/// A document's light table
pub trait LightTable {
    fn unit_system(&self) -> LengthUnit;

    /// Ids in the host's stable sort order, including disabled and
    /// deleted-but-still-listed lights
    fn sorted_ids(&self) -> Vec<LightId>;

    fn read_light(&self, id: LightId) -> Result<RawLight, HostError>;
}

/// The running host application
pub trait Host {
    /// `None` when no document is open
    fn active_document(&self) -> Option<&dyn LightTable>;
}
