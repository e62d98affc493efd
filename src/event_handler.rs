//! Host light-table events to pushed snapshots
//!
//! Every event triggers a full resend: blacklist update (delete/undelete
//! only), snapshot, encode, hand-off to the payload sink, optional backup
//! export. Nothing raised here, error or panic, may reach the host.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use crate::blacklist::BlacklistTracker;
use crate::error::PipelineError;
use crate::export;
use crate::host::{Host, RawLight};
use crate::snapshot::SnapshotBuilder;
use crate::transport::PayloadSink;
use crate::types::{EventLabel, LightId};
use crate::wire;

/// Callbacks the host adapter forwards light-table notifications to
pub trait LightChangeObserver {
    fn on_added(&mut self, host: &dyn Host, id: LightId, light: Option<&RawLight>);
    fn on_deleted(&mut self, host: &dyn Host, id: LightId, light: Option<&RawLight>);
    fn on_undeleted(&mut self, host: &dyn Host, id: LightId, light: Option<&RawLight>);
    fn on_modified(&mut self, host: &dyn Host, id: LightId, light: Option<&RawLight>);
}

/// Result of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub lights: usize,
    pub bytes: usize,
}

/// Owns the blacklist and the delivery sink for one host session
pub struct EventDispatcher<S: PayloadSink> {
    blacklist: BlacklistTracker,
    sink: S,
    export_path: Option<PathBuf>,
}

impl<S: PayloadSink> EventDispatcher<S> {
    pub fn new(sink: S) -> Self {
        Self {
            blacklist: BlacklistTracker::new(),
            sink,
            export_path: None,
        }
    }

    /// Also rewrite the backup file after each run
    pub fn with_export_path(mut self, path: Option<PathBuf>) -> Self {
        self.export_path = path;
        self
    }

    pub fn blacklist(&self) -> &BlacklistTracker {
        &self.blacklist
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Entry point for every host notification; never fails, never panics
    pub fn handle_event(&mut self, host: &dyn Host, label: EventLabel, id: LightId, light: Option<&RawLight>) {
        match label {
            EventLabel::Deleted => self.blacklist.add(id),
            EventLabel::Undeleted => self.blacklist.remove(id),
            EventLabel::Added | EventLabel::Modified | EventLabel::Unknown => {}
        }
        if let Some(light) = light {
            debug!(light = %id, style = ?light.style, enabled = light.enabled, "Event carried light data");
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run_pipeline(host, label)))
            .unwrap_or_else(|payload| Err(PipelineError::Unexpected(panic_message(payload.as_ref()))));

        match outcome {
            Ok(summary) => info!(
                event = %label,
                light = %id,
                lights = summary.lights,
                bytes = summary.bytes,
                "Light event synced"
            ),
            Err(PipelineError::HostUnavailable) => {
                warn!(event = %label, light = %id, "No active document for light event")
            }
            Err(e) => error!(event = %label, light = %id, error = %e, "Light event pipeline failed"),
        }
    }

    /// One full snapshot build and hand-off
    pub fn run_pipeline(&mut self, host: &dyn Host, label: EventLabel) -> Result<RunSummary, PipelineError> {
        let table = host.active_document().ok_or(PipelineError::HostUnavailable)?;
        let snapshot = SnapshotBuilder::for_table(table).build(table, &self.blacklist);

        let payload = wire::encode(label, &snapshot);
        let summary = RunSummary {
            lights: snapshot.len(),
            bytes: payload.len(),
        };
        self.sink.push(payload);

        if let Some(path) = &self.export_path {
            if let Err(e) = export::write_backup(path, &snapshot) {
                warn!(path = %path.display(), error = ?e, "Failed to write light export");
            }
        }
        Ok(summary)
    }
}

impl<S: PayloadSink> LightChangeObserver for EventDispatcher<S> {
    fn on_added(&mut self, host: &dyn Host, id: LightId, light: Option<&RawLight>) {
        self.handle_event(host, EventLabel::Added, id, light);
    }

    fn on_deleted(&mut self, host: &dyn Host, id: LightId, light: Option<&RawLight>) {
        self.handle_event(host, EventLabel::Deleted, id, light);
    }

    fn on_undeleted(&mut self, host: &dyn Host, id: LightId, light: Option<&RawLight>) {
        self.handle_event(host, EventLabel::Undeleted, id, light);
    }

    fn on_modified(&mut self, host: &dyn Host, id: LightId, light: Option<&RawLight>) {
        self.handle_event(host, EventLabel::Modified, id, light);
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
