//! Backup text file and console inventory
//!
//! Same snapshot data as the wire payload, written for people: one line per
//! light in the backup file, a multi-line report for the console.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::export::{APP_DIR, FILENAME, HEADER_FORMAT, HEADER_TITLE};
use crate::snapshot::Snapshot;
use crate::types::LightRecord;
use crate::wire::fixed;

/// `<data_local_dir>/light-sync/Lights.txt`, or the working directory if the
/// platform has no data dir
pub fn default_backup_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path.push(FILENAME);
    path
}

/// Render the backup file contents
pub fn format_backup(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    out.push_str(HEADER_TITLE);
    out.push('\n');
    out.push_str(HEADER_FORMAT);
    out.push('\n');
    let _ = writeln!(out, "# Total Lights: {}", snapshot.len());
    out.push('\n');

    for record in snapshot.iter() {
        out.push_str(&backup_line(record));
        out.push('\n');
    }
    out
}

/// `<Type> (x,y,z) (azimuth°, elevation°, 0.00°) <intensity> RGB(r,g,b) [inner° outer°]`
fn backup_line(record: &LightRecord) -> String {
    let p = &record.position;
    // Elevation is measured upwards, pitch downwards
    let azimuth = record.orientation.yaw;
    let elevation = -record.orientation.pitch;

    let mut line = format!(
        "{} ({},{},{}) ({}°, {}°, 0.00°) {} {}",
        record.kind,
        fixed(p.x, 6),
        fixed(p.y, 6),
        fixed(p.z, 6),
        fixed(azimuth, 2),
        fixed(elevation, 2),
        fixed(record.intensity, 3),
        record.color,
    );
    if let Some(spot) = &record.spot {
        let _ = write!(
            line,
            " {}° {}°",
            fixed(spot.inner_angle_deg, 2),
            fixed(spot.outer_angle_deg, 2)
        );
    }
    line
}

/// Overwrite the backup file, creating parent directories as needed
pub fn write_backup(path: &Path, snapshot: &Snapshot) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create export directory: {}", parent.display()))?;
        }
    }
    fs::write(path, format_backup(snapshot))
        .context(format!("Failed to write light export: {}", path.display()))?;
    info!(path = %path.display(), lights = snapshot.len(), "Wrote light export");
    Ok(())
}

/// Human-readable inventory report
pub fn format_inventory(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Light Inventory Report ===");
    let _ = writeln!(out, "Scene contains {} light(s):", snapshot.len());
    out.push('\n');

    for (i, record) in snapshot.iter().enumerate() {
        let p = &record.position;
        let d = &record.direction;
        let r = &record.orientation;
        let _ = writeln!(out, "Light {} (id {}):", i + 1, record.id);
        let _ = writeln!(out, "  Type: {}", record.kind);
        let _ = writeln!(out, "  Position: ({:.3}, {:.3}, {:.3}) m", p.x, p.y, p.z);
        let _ = writeln!(out, "  Direction: ({:.3}, {:.3}, {:.3})", d.x, d.y, d.z);
        let _ = writeln!(out, "  Rotation: pitch {:.3}°, yaw {:.3}°, roll {:.3}°", r.pitch, r.yaw, r.roll);
        let _ = writeln!(out, "  Intensity: {:.3}", record.intensity);
        let _ = writeln!(out, "  Color: {}", record.color);
        if let Some(spot) = &record.spot {
            let _ = writeln!(out, "  Inner Angle: {:.2}°", spot.inner_angle_deg);
            let _ = writeln!(out, "  Outer Angle: {:.2}°", spot.outer_angle_deg);
        }
        out.push('\n');
    }

    out.push_str("=== End of Light Report ===\n");
    out
}
