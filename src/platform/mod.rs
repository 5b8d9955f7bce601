//! Window-system integration.
//!
//! The driver never owns native windows. Everything it needs to know about
//! them and everything it asks of them goes through [`WindowSystem`].
//! `stub` provides an in-memory window system for tests and the headless
//! binary.

pub mod api;
pub mod stub;

pub use api::{
    ExStyle, MonitorInfo, SetPosFlags, SizeMove, WindowHandle, WindowStyle, WindowSystem,
};
pub use stub::StubWindowSystem;
