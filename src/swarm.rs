//! Swarms that incoming peers can be dispatched to.
//!
//! A swarm is any type implementing [`SwarmHandle`]. Handles are registered
//! in a [`SwarmRegistry`] keyed by [`SwarmId`], the info hash that remote
//! peers quote in their handshake. [`PeerQueue`] is a ready-made handle that
//! hands peers to a tokio channel.

mod handle;
mod id;
mod queue;
mod registry;

pub use handle::SwarmHandle;
pub use id::SwarmId;
pub use queue::PeerQueue;
pub use registry::SwarmRegistry;

#[cfg(test)]
mod tests;
