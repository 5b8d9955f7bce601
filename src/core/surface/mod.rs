pub mod surface;
pub mod role;
pub mod config;

pub use surface::{CompositorSurface, ConfigurePlan, SharedSurface};
pub use role::SurfaceRole;
pub use config::{ConfigState, Configuration, WindowConfig};
