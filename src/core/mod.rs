pub mod errors;
pub mod protocol;
pub mod presentation;
pub mod surface;
pub mod window;
pub mod driver;
pub mod wayland;

// Re-export key types
pub use driver::{Driver, DriverMessage, UpdateFlags};
pub use protocol::{BackendEvent, CompositorConnection, SurfaceId};
pub use surface::{CompositorSurface, Configuration, ConfigState, SharedSurface, SurfaceRole};
pub use window::{Registry, WindowRecord, WindowRects};
