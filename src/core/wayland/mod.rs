//! Wayland backend.
//!
//! [`WaylandConnection`] implements [`CompositorConnection`] on top of
//! `wayland-client` and xdg-shell. Event handling is split per protocol
//! object like the request side: `dispatch.rs` holds the `Dispatch` impls
//! that turn compositor events into [`BackendEvent`]s.
//!
//! [`CompositorConnection`]: crate::core::protocol::CompositorConnection
//! [`BackendEvent`]: crate::core::protocol::BackendEvent

pub mod connection;
mod dispatch;

pub use connection::WaylandConnection;
