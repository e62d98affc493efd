//! Light-table change propagation from a modeling host to a local listener
//!
//! A host adapter forwards light events to [`event_handler::EventDispatcher`],
//! which rebuilds a full [`snapshot::Snapshot`], encodes it with [`wire`] and
//! hands it to a fire-and-forget [`transport::AsyncTransport`].

#![forbid(unsafe_code)]

pub mod blacklist;
pub mod config;
pub mod constants;
pub mod error;
pub mod event_handler;
pub mod export;
pub mod host;
pub mod orientation;
pub mod receiver;
pub mod scene;
pub mod snapshot;
pub mod transport;
pub mod types;
pub mod units;
pub mod wire;
