//! In-memory host document loaded from JSON
//!
//! Stands in for the modeling application when driving the pipeline from the
//! command line, and in tests.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::HostError;
use crate::host::{Host, LightStyle, LightTable, RawLight};
use crate::types::{LightId, Rgb, Vec3};
use crate::units::LengthUnit;

/// One light entry in a scene file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneLight {
    pub id: LightId,
    pub style: LightStyle,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub location: [f64; 3],
    #[serde(default = "default_direction")]
    pub direction: [f64; 3],
    pub intensity: f64,
    pub color: [u8; 3],
    #[serde(default)]
    pub inner_angle_deg: f64,
    #[serde(default)]
    pub outer_angle_deg: f64,
}

fn default_enabled() -> bool {
    true
}

fn default_direction() -> [f64; 3] {
    [0.0, 0.0, -1.0]
}

impl SceneLight {
    fn to_raw(&self) -> RawLight {
        RawLight {
            style: self.style,
            enabled: self.enabled,
            location: Vec3::from(self.location),
            direction: Vec3::from(self.direction),
            intensity: self.intensity,
            diffuse: Rgb::from(self.color),
            inner_angle_deg: self.inner_angle_deg,
            outer_angle_deg: self.outer_angle_deg,
        }
    }
}

/// A document: unit system plus lights in sort order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default)]
    pub units: LengthUnit,
    #[serde(default)]
    pub lights: Vec<SceneLight>,
}

impl SceneDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .context(format!("Failed to read scene file {}", path.display()))?;
        let document: SceneDocument = serde_json::from_str(&contents)
            .context(format!("Failed to parse scene file {}", path.display()))?;
        info!(path = %path.display(), lights = document.lights.len(), units = ?document.units, "Loaded scene");
        Ok(document)
    }

    pub fn light_mut(&mut self, id: LightId) -> Option<&mut SceneLight> {
        self.lights.iter_mut().find(|light| light.id == id)
    }
}

impl LightTable for SceneDocument {
    fn unit_system(&self) -> LengthUnit {
        self.units
    }

    fn sorted_ids(&self) -> Vec<LightId> {
        self.lights.iter().map(|light| light.id).collect()
    }

    fn read_light(&self, id: LightId) -> Result<RawLight, HostError> {
        self.lights
            .iter()
            .find(|light| light.id == id)
            .map(SceneLight::to_raw)
            .ok_or(HostError::MissingLight(id))
    }
}

/// Host session with at most one open document
#[derive(Debug, Default)]
pub struct SceneSession {
    pub document: Option<SceneDocument>,
}

impl SceneSession {
    pub fn new(document: SceneDocument) -> Self {
        Self {
            document: Some(document),
        }
    }

    /// Session with nothing open
    pub fn empty() -> Self {
        Self::default()
    }
}

impl Host for SceneSession {
    fn active_document(&self) -> Option<&dyn LightTable> {
        self.document.as_ref().map(|doc| doc as &dyn LightTable)
    }
}
