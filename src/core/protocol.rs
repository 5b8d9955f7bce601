//! Compositor connection interface.
//!
//! The driver speaks to the compositor only through [`CompositorConnection`].
//! Requests are fire-and-forget: they are queued on the connection and
//! written out on [`CompositorConnection::flush`]. Replies come back
//! asynchronously as [`BackendEvent`]s.

use std::fmt;

use crate::core::surface::Configuration;
use crate::core::window::resize::ResizeEdge;
use crate::platform::WindowHandle;

/// Identity of a compositor surface object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(pub u32);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Requests the driver issues to the compositor.
pub trait CompositorConnection: Send + Sync {
    /// Create a role-less surface for `window`. `None` on allocation failure.
    fn create_surface(&self, window: WindowHandle) -> Option<SurfaceId>;
    fn destroy_surface(&self, surface: SurfaceId);

    /// Give a role-less surface the top-level role.
    fn make_toplevel(&self, surface: SurfaceId) -> bool;
    /// Give a role-less surface the sub-surface role under `parent`.
    fn make_subsurface(&self, surface: SurfaceId, parent: SurfaceId) -> bool;
    /// Drop whatever role the surface has.
    fn clear_role(&self, surface: SurfaceId);

    fn set_title(&self, surface: SurfaceId, title: &str);
    fn set_maximized(&self, surface: SurfaceId);
    fn unset_maximized(&self, surface: SurfaceId);
    /// Fullscreen on whatever output the compositor picks.
    fn set_fullscreen(&self, surface: SurfaceId);
    fn unset_fullscreen(&self, surface: SurfaceId);

    fn ack_configure(&self, surface: SurfaceId, serial: u32);

    /// Start a compositor-driven move bound to an input serial.
    fn interactive_move(&self, surface: SurfaceId, serial: u32) -> bool;
    /// Start a compositor-driven resize bound to an input serial.
    fn interactive_resize(&self, surface: SurfaceId, serial: u32, edge: ResizeEdge) -> bool;

    /// Write queued requests to the compositor.
    fn flush(&self);
}

/// Events surfaced by a compositor backend for the driver to consume.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    /// A complete configure sequence for a toplevel surface.
    Configure { window: WindowHandle, config: Configuration },
    /// Pointer entered a window's surface, or left all of ours.
    PointerFocus { window: Option<WindowHandle> },
    /// Pointer button press with its input serial.
    PointerButton { serial: u32 },
}
