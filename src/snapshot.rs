//! Point-in-time light snapshots
//!
//! Enumerates the host light table, drops disabled and blacklisted lights,
//! converts units and orientation, and packs [`LightRecord`]s in host order.

use tracing::{debug, warn};

use crate::blacklist::BlacklistTracker;
use crate::error::{ConversionError, LightError};
use crate::host::{LightTable, RawLight};
use crate::orientation::direction_to_rotation;
use crate::types::{LightId, LightKind, LightRecord, SpotParams};

/// Immutable, ordered set of converted lights
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    records: Vec<LightRecord>,
}

impl Snapshot {
    pub fn records(&self) -> &[LightRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LightRecord> {
        self.records.iter()
    }
}

impl FromIterator<LightRecord> for Snapshot {
    fn from_iter<I: IntoIterator<Item = LightRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Builds snapshots for one document unit scale
#[derive(Debug, Clone, Copy)]
pub struct SnapshotBuilder {
    meters_per_unit: f64,
}

impl SnapshotBuilder {
    pub fn new(meters_per_unit: f64) -> Self {
        Self { meters_per_unit }
    }

    /// Builder using the table's own unit system
    pub fn for_table(table: &dyn LightTable) -> Self {
        Self::new(table.unit_system().meters_per_unit())
    }

    /// Never fails as a whole; unreadable or unconvertible lights are skipped
    pub fn build(&self, table: &dyn LightTable, blacklist: &BlacklistTracker) -> Snapshot {
        let ids = table.sorted_ids();
        let mut records = Vec::with_capacity(ids.len());
        let mut skipped = 0usize;

        for id in ids {
            if blacklist.contains(id) {
                debug!(light = %id, "Skipping blacklisted light");
                continue;
            }
            match self.read_record(table, id) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => debug!(light = %id, "Skipping disabled light"),
                Err(e) => {
                    skipped += 1;
                    warn!(light = %id, error = %e, "Skipping light that could not be converted");
                }
            }
        }

        if skipped > 0 {
            warn!(skipped = skipped, included = records.len(), "Snapshot built with skipped lights");
        }
        Snapshot { records }
    }

    /// `Ok(None)` for lights the host reports as off
    fn read_record(&self, table: &dyn LightTable, id: LightId) -> Result<Option<LightRecord>, LightError> {
        let raw = table.read_light(id)?;
        if !raw.enabled {
            return Ok(None);
        }
        self.convert(id, &raw)
            .map(Some)
            .map_err(|source| LightError::Conversion { id, source })
    }

    fn convert(&self, id: LightId, raw: &RawLight) -> Result<LightRecord, ConversionError> {
        if !raw.location.is_finite() {
            return Err(ConversionError::NonFinite { field: "location" });
        }
        if !raw.intensity.is_finite() {
            return Err(ConversionError::NonFinite { field: "intensity" });
        }
        if raw.intensity < 0.0 {
            return Err(ConversionError::NegativeIntensity(raw.intensity));
        }

        let kind = raw.style.kind();
        let spot = if kind == LightKind::Spot {
            if !raw.inner_angle_deg.is_finite() || !raw.outer_angle_deg.is_finite() {
                return Err(ConversionError::NonFinite { field: "spot angle" });
            }
            Some(SpotParams {
                inner_angle_deg: raw.inner_angle_deg,
                outer_angle_deg: raw.outer_angle_deg,
            })
        } else {
            None
        };

        // Only the position is a length; direction, intensity and color pass through
        let position = raw.location.scaled(self.meters_per_unit);
        if !position.is_finite() {
            return Err(ConversionError::NonFinite { field: "location" });
        }

        Ok(LightRecord {
            id,
            kind,
            position,
            direction: raw.direction,
            orientation: direction_to_rotation(raw.direction)?,
            intensity: raw.intensity,
            color: raw.diffuse,
            spot,
        })
    }
}
