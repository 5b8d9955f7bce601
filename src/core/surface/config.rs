//! Compositor configuration snapshots.

use bitflags::bitflags;

use crate::util::geometry::Rect;

bitflags! {
    /// Window state bits carried by a configure.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ConfigState: u32 {
        const MAXIMIZED = 1 << 0;
        const FULLSCREEN = 1 << 1;
        const RESIZING = 1 << 2;
        const TILED = 1 << 3;
    }
}

/// One compositor configure, in surface coordinates.
///
/// `serial == 0` means "no snapshot".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Configuration {
    pub serial: u32,
    pub processed: bool,
    pub width: i32,
    pub height: i32,
    pub state: ConfigState,
}

impl Configuration {
    pub fn new(serial: u32, width: i32, height: i32, state: ConfigState) -> Self {
        Self {
            serial,
            processed: false,
            width,
            height,
            state,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.serial != 0
    }

    /// Whether a surface of `width`x`height` in window state `state` can
    /// be presented for this configure.
    ///
    /// Maximized requires matching state and exactly the configured size.
    /// A fullscreen size is an upper bound.
    pub fn is_compatible(&self, width: i32, height: i32, state: ConfigState) -> bool {
        let mask = ConfigState::MAXIMIZED;
        if (state & mask) != (self.state & mask) {
            return false;
        }
        if self.state.contains(ConfigState::MAXIMIZED) && (width != self.width || height != self.height) {
            return false;
        }
        if self.state.contains(ConfigState::FULLSCREEN) && (width > self.width || height > self.height) {
            return false;
        }
        true
    }
}

/// What the window system currently wants the surface to look like.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowConfig {
    pub rect: Rect,
    pub client_rect: Rect,
    pub state: ConfigState,
    pub scale: f64,
    pub visible: bool,
    pub managed: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            rect: Rect::default(),
            client_rect: Rect::default(),
            state: ConfigState::empty(),
            scale: 1.0,
            visible: false,
            managed: false,
        }
    }
}
