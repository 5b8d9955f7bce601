//! Pointer focus tracking.

use crate::platform::WindowHandle;

/// Which window has pointer focus and the serial of the last button press
/// on it. Interactive moves and resizes must cite that serial.
#[derive(Debug, Default)]
pub struct PointerFocus {
    /// The window whose surface currently has pointer focus.
    pub focused: Option<WindowHandle>,
    /// Serial of the last button press while `focused` was set.
    pub button_serial: u32,
}

impl PointerFocus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set pointer focus to a specific window.
    pub fn set_focus(&mut self, window: Option<WindowHandle>) {
        if self.focused != window {
            self.button_serial = 0;
        }
        self.focused = window;
    }

    pub fn record_button(&mut self, serial: u32) {
        if self.focused.is_some() {
            self.button_serial = serial;
        }
    }

    /// Button serial usable for an interactive operation on `window`.
    pub fn serial_for(&self, window: WindowHandle) -> Option<u32> {
        match self.focused {
            Some(focused) if focused == window && self.button_serial != 0 => Some(self.button_serial),
            _ => None,
        }
    }
}
