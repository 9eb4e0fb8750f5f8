//! # Shm Control: Control-Plane Bridge for a Shared-Memory Media Worker
//!
//! This crate is the control side of a media setup in which the actual
//! RTP/RTX/data-channel traffic is relayed by an out-of-process worker through
//! a shared-memory segment instead of a network socket. The worker owns the
//! data plane; this crate owns the handles, the lifecycle, and the event and
//! statistics surfaces that mirror it in-process.
//!
//! ## Architecture
//!
//! - **[`worker::Channel`]**: correlated request/response command channel to
//!   the worker. Every request carries a fresh id and resolves exactly once.
//! - **[`worker::Demultiplexer`]**: consumes the worker's message stream and
//!   routes responses to the channel's pending map and notifications, by
//!   target id, to the owning transport. Notifications for ids that are no
//!   longer registered (e.g. after a local close) are dropped silently.
//! - **[`worker::HandleRegistry`]**: at most one live local mirror per
//!   worker-side object; entries exist exactly while the mirror is not closed.
//! - **[`transport::ShmTransport`]**: the per-transport control object with
//!   `connect`, `get_stats` and `close`, an event surface for
//!   `sctpstatechange` and an observer channel for structural lifecycle
//!   events.
//! - **[`router::Router`]**: the owning collaborator. Creates transports and
//!   tears them down in bulk without racing per-transport worker commands.
//!
//! The crate does not own the worker process or its pipe. The embedder wires
//! the channel's request stream and the demultiplexer's message stream to
//! whatever transport actually reaches the worker.
//!
//! ## Quick Start
//!
//! ```no_run
//! use shm_control::router::Router;
//! use shm_control::transport::options::{
//!     ShmConnectParameters, ShmTransportOptions, TransportListenIp,
//! };
//! use shm_control::worker::{Channel, Demultiplexer, HandleRegistry};
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // The embedder owns the worker pipe: requests drained from
//!     // `request_rx` go to the worker, everything the worker emits is fed
//!     // into `message_tx`.
//!     let (request_tx, _request_rx) = mpsc::unbounded_channel();
//!     let (_message_tx, message_rx) = mpsc::unbounded_channel();
//!
//!     let channel = Channel::new(request_tx);
//!     let registry = Arc::new(HandleRegistry::new());
//!     Demultiplexer::new(message_rx, channel.clone(), registry.clone()).spawn();
//!
//!     let router = Router::new("router-1", channel, registry);
//!     let transport = router
//!         .create_shm_transport(
//!             ShmTransportOptions::new(TransportListenIp::new("127.0.0.1"), "/media-shm")
//!                 .with_log_name("shm-writer"),
//!         )
//!         .await?;
//!
//!     // Lifecycle events arrive on the observer channel.
//!     let mut observer_events = transport.observer().subscribe();
//!
//!     transport
//!         .connect(ShmConnectParameters {
//!             shm: "/media-shm".to_owned(),
//!         })
//!         .await?;
//!
//!     let stats = transport.get_stats().await?;
//!     println!("{} stat sample(s)", stats.len());
//!
//!     transport.close();
//!     while let Some(event) = observer_events.recv().await {
//!         println!("observer event: {event:?}");
//!     }
//!     Ok(())
//! }
//! ```

#![warn(rust_2018_idioms)]
#![allow(dead_code)]

pub use shared;

pub mod router;
pub mod transport;
pub mod worker;

#[cfg(test)]
pub(crate) mod testutil;

pub use router::Router;
pub use transport::ShmTransport;
