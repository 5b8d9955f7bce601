// waydrv
//
// Wayland window driver core: keeps a tree of native application windows
// mapped onto compositor surfaces. Window-system and compositor specifics
// sit behind the traits in platform/ and core/protocol.rs.

pub mod core;
pub mod platform;
pub mod config;
pub mod util;
pub mod prelude;

pub use crate::config::DriverConfig;
pub use crate::core::driver::{Driver, DriverMessage, SysCommand, SysCommandResult};
pub use crate::core::errors::{CoreError, Result};
pub use crate::platform::{WindowHandle, WindowSystem};

#[cfg(test)]
mod tests;
