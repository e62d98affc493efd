//! Snapshot wire encoding
//!
//! Produces pretty-printed JSON by hand so every number has a fixed number of
//! decimals, independent of locale or float formatting heuristics. All strings
//! written here come from closed enums ([`EventLabel`], [`LightKind`]) and are
//! emitted without escaping. Do not route free-form text through this module.

use std::fmt::Write;

use crate::constants::wire::{
    INTENSITY_PRECISION, LOCATION_PRECISION, ROTATION_PRECISION, SPOT_ANGLE_PRECISION,
};
use crate::snapshot::Snapshot;
use crate::types::{EventLabel, LightRecord};

/// Encode an event label and snapshot as a UTF-8 payload
pub fn encode(label: EventLabel, snapshot: &Snapshot) -> Vec<u8> {
    encode_string(label, snapshot).into_bytes()
}

pub fn encode_string(label: EventLabel, snapshot: &Snapshot) -> String {
    let mut out = String::with_capacity(128 + snapshot.len() * 384);

    out.push_str("{\n");
    line(&mut out, 1, format_args!("\"event\": \"{}\",", label.as_str()));
    line(&mut out, 1, format_args!("\"lightCount\": {},", snapshot.len()));
    if snapshot.is_empty() {
        line(&mut out, 1, format_args!("\"lights\": []"));
    } else {
        line(&mut out, 1, format_args!("\"lights\": ["));
        let last = snapshot.len() - 1;
        for (i, record) in snapshot.iter().enumerate() {
            write_light(&mut out, record, i == last);
        }
        line(&mut out, 1, format_args!("]"));
    }
    out.push('}');
    out
}

fn write_light(out: &mut String, record: &LightRecord, last: bool) {
    let p = &record.position;
    let r = &record.orientation;
    let c = &record.color;

    line(out, 2, format_args!("{{"));
    line(out, 3, format_args!("\"id\": {},", record.id));
    line(out, 3, format_args!("\"type\": \"{}\",", record.kind.as_str()));
    line(
        out,
        3,
        format_args!(
            "\"location\": {{\"x\": {}, \"y\": {}, \"z\": {}}},",
            fixed(p.x, LOCATION_PRECISION),
            fixed(p.y, LOCATION_PRECISION),
            fixed(p.z, LOCATION_PRECISION),
        ),
    );
    line(
        out,
        3,
        format_args!(
            "\"rotation\": {{\"pitch\": {}, \"yaw\": {}, \"roll\": {}}},",
            fixed(r.pitch, ROTATION_PRECISION),
            fixed(r.yaw, ROTATION_PRECISION),
            fixed(r.roll, ROTATION_PRECISION),
        ),
    );
    line(
        out,
        3,
        format_args!("\"intensity\": {},", fixed(record.intensity, INTENSITY_PRECISION)),
    );

    let color = format!("\"color\": {{\"r\": {}, \"g\": {}, \"b\": {}}}", c.r, c.g, c.b);
    match &record.spot {
        Some(spot) => {
            line(out, 3, format_args!("{color},"));
            line(
                out,
                3,
                format_args!(
                    "\"spotLight\": {{\"innerAngle\": {}, \"outerAngle\": {}}}",
                    fixed(spot.inner_angle_deg, SPOT_ANGLE_PRECISION),
                    fixed(spot.outer_angle_deg, SPOT_ANGLE_PRECISION),
                ),
            );
        }
        None => line(out, 3, format_args!("{color}")),
    }

    line(out, 2, format_args!("{}", if last { "}" } else { "}," }));
}

fn line(out: &mut String, depth: usize, args: std::fmt::Arguments<'_>) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    // Writing into a String cannot fail
    let _ = out.write_fmt(args);
    out.push('\n');
}

/// Fixed-precision decimal; negative zero (including values that round to
/// zero) prints unsigned
///
/// Callers pass finite values only: the snapshot builder rejects lights with
/// any non-finite field before they reach a record.
pub(crate) fn fixed(value: f64, precision: usize) -> String {
    debug_assert!(value.is_finite(), "non-finite value reached the encoder");
    let text = format!("{value:.precision$}");
    match text.strip_prefix('-') {
        Some(rest) if rest.bytes().all(|b| b == b'0' || b == b'.') => rest.to_string(),
        _ => text,
    }
}
