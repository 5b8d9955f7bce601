//! Common imports for code embedding the driver.

pub use std::sync::Arc;

pub use crate::config::DriverConfig;
pub use crate::core::driver::{Driver, DriverMessage, SysCommand, SysCommandResult};
pub use crate::core::errors::{CoreError, Result};
pub use crate::core::presentation::{ClientSurface, PresentationSurface};
pub use crate::core::protocol::{BackendEvent, CompositorConnection};
pub use crate::core::window::WindowRects;
pub use crate::platform::{SetPosFlags, WindowHandle, WindowStyle, WindowSystem};
pub use crate::util::geometry::Rect;
