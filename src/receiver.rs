//! Companion listener for pushed snapshots
//!
//! Accepts one connection per payload, reads until the sender closes, and
//! decodes the JSON into typed structs.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::io::Read;
use std::net::{SocketAddr, SocketAddrV4, TcpListener, TcpStream};
use std::time::Duration;
use tracing::{info, warn};

use crate::constants::network::{LOOPBACK, MAX_PAYLOAD_SIZE, RECEIVER_READ_TIMEOUT_SECS};

/// Decoded payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedSnapshot {
    pub event: String,
    pub light_count: usize,
    pub lights: Vec<ReceivedLight>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedLight {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: ReceivedLocation,
    pub rotation: ReceivedRotation,
    pub intensity: f64,
    pub color: ReceivedColor,
    #[serde(default)]
    pub spot_light: Option<ReceivedSpot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ReceivedLocation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ReceivedRotation {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ReceivedColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedSpot {
    pub inner_angle: f64,
    pub outer_angle: f64,
}

/// Loopback listener
pub struct SnapshotReceiver {
    listener: TcpListener,
    read_timeout: Duration,
}

impl SnapshotReceiver {
    /// Bind on loopback; port 0 picks a free port
    pub fn bind(port: u16) -> Result<Self> {
        let addr = SocketAddrV4::new(LOOPBACK, port);
        let listener = TcpListener::bind(addr)
            .context(format!("Failed to bind receiver on {}", addr))?;
        Ok(Self {
            listener,
            read_timeout: Duration::from_secs(RECEIVER_READ_TIMEOUT_SECS),
        })
    }

    /// Give up on a connection that goes quiet for longer than `timeout`
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().context("Failed to read receiver address")
    }

    /// Block until one payload arrives
    pub fn accept_one(&self) -> Result<ReceivedSnapshot> {
        let (stream, peer) = self.listener.accept()
            .context("Failed to accept snapshot connection")?;
        stream
            .set_read_timeout(Some(self.read_timeout))
            .context("Failed to set read timeout")?;
        read_snapshot(stream).context(format!("Bad payload from {}", peer))
    }

    /// Accept payloads forever, handing each to `on_snapshot`
    ///
    /// A malformed payload is logged and skipped.
    pub fn run(&self, mut on_snapshot: impl FnMut(ReceivedSnapshot)) -> Result<()> {
        info!(addr = ?self.local_addr()?, "Receiver listening");
        loop {
            match self.accept_one() {
                Ok(snapshot) => on_snapshot(snapshot),
                Err(e) => warn!(error = ?e, "Dropping payload"),
            }
        }
    }
}

/// Read to EOF and decode
pub fn read_snapshot(stream: TcpStream) -> Result<ReceivedSnapshot> {
    let mut buf = Vec::new();
    stream
        .take(MAX_PAYLOAD_SIZE + 1)
        .read_to_end(&mut buf)
        .context("Failed to read payload")?;

    // Sanity check (prevent unbounded buffering)
    if buf.len() as u64 > MAX_PAYLOAD_SIZE {
        return Err(anyhow!("Payload too large (max: {} bytes)", MAX_PAYLOAD_SIZE));
    }

    let snapshot: ReceivedSnapshot =
        serde_json::from_slice(&buf).context("Failed to decode payload JSON")?;
    if snapshot.light_count != snapshot.lights.len() {
        warn!(
            light_count = snapshot.light_count,
            lights = snapshot.lights.len(),
            "lightCount does not match lights array"
        );
    }
    Ok(snapshot)
}

/// One-line summary per light for console output
pub fn describe(snapshot: &ReceivedSnapshot) -> String {
    let mut out = format!("{} ({} light(s))", snapshot.event, snapshot.light_count);
    for light in &snapshot.lights {
        out.push_str(&format!(
            "\n  #{} {} at ({:.3}, {:.3}, {:.3}) pitch {:.1} yaw {:.1} intensity {:.2}",
            light.id,
            light.kind,
            light.location.x,
            light.location.y,
            light.location.z,
            light.rotation.pitch,
            light.rotation.yaw,
            light.intensity,
        ));
        if let Some(spot) = &light.spot_light {
            out.push_str(&format!(" cone {:.1}/{:.1}", spot.inner_angle, spot.outer_angle));
        }
    }
    out
}
