//! Worker-facing plumbing: the correlated command channel, the message wire
//! types, the notification demultiplexer and the transport handle registry.
//!
//! The worker process itself (and the pipe carrying these messages) is owned
//! by the embedder; this module only defines what flows over it and how it is
//! routed once it arrives.

pub mod channel;
pub mod demux;
pub mod message;
pub mod registry;

pub use channel::Channel;
pub use demux::Demultiplexer;
pub use message::{ChannelRequest, ChannelResponse, Notification, RequestMethod, WorkerMessage};
pub use registry::HandleRegistry;
