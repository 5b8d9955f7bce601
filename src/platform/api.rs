//! Window-system API trait
//!
//! Narrow query/command surface consumed by the driver. Implementations
//! must be callable from any thread; the driver calls into them while
//! holding its registry lock, so they must not call back into the driver.

use std::fmt;

use bitflags::bitflags;

use crate::core::driver::DriverMessage;
use crate::util::geometry::Rect;

/// Opaque native window identity, stable for the window's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowHandle(pub u64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

bitflags! {
    /// Window style bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WindowStyle: u32 {
        const POPUP = 0x8000_0000;
        const CHILD = 0x4000_0000;
        const MINIMIZE = 0x2000_0000;
        const VISIBLE = 0x1000_0000;
        const MAXIMIZE = 0x0100_0000;
        const BORDER = 0x0080_0000;
        const DLG_FRAME = 0x0040_0000;
        /// Title bar: border plus dialog frame.
        const CAPTION = Self::BORDER.bits() | Self::DLG_FRAME.bits();
        const SYSMENU = 0x0008_0000;
        const THICKFRAME = 0x0004_0000;
    }
}

bitflags! {
    /// Extended window style bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ExStyle: u32 {
        const APP_WINDOW = 0x0004_0000;
    }
}

bitflags! {
    /// Flags for geometry changes, both observed and issued.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SetPosFlags: u32 {
        const NO_SIZE = 0x0001;
        const NO_MOVE = 0x0002;
        const NO_ZORDER = 0x0004;
        const NO_ACTIVATE = 0x0010;
        const FRAME_CHANGED = 0x0020;
        const HIDE_WINDOW = 0x0080;
        const NO_OWNER_ZORDER = 0x0200;
        /// The window system must not let the application adjust the size.
        const NO_SEND_CHANGING = 0x0400;
    }
}

/// Monitor geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonitorInfo {
    pub bounds: Rect,
    pub work_area: Rect,
}

/// Interactive size/move loop notifications sent synchronously to a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeMove {
    Enter,
    Exit,
}

/// Window-system interface.
pub trait WindowSystem: Send + Sync {
    /// The root desktop window.
    fn desktop_window(&self) -> WindowHandle;

    /// Direct parent, `None` for the desktop and for message-only roots.
    fn parent(&self, window: WindowHandle) -> Option<WindowHandle>;

    /// Owner window (popup ownership, not ancestry).
    fn owner(&self, window: WindowHandle) -> Option<WindowHandle>;

    /// Whether `window` is a structural descendant of `ancestor`.
    fn is_descendant(&self, ancestor: WindowHandle, window: WindowHandle) -> bool {
        let mut current = window;
        while let Some(parent) = self.parent(current) {
            if parent == ancestor {
                return true;
            }
            current = parent;
        }
        false
    }

    fn style(&self, window: WindowHandle) -> WindowStyle;
    fn set_style(&self, window: WindowHandle, style: WindowStyle);
    fn ex_style(&self, window: WindowHandle) -> ExStyle;

    /// Visible, and every ancestor visible too.
    fn is_visible(&self, window: WindowHandle) -> bool;

    fn foreground_window(&self) -> Option<WindowHandle>;
    fn set_foreground_window(&self, window: WindowHandle) -> bool;
    /// Active window of the calling thread.
    fn active_window(&self) -> Option<WindowHandle>;

    fn monitors(&self) -> Vec<MonitorInfo>;
    /// Monitor a window is on, primary if it is on none.
    fn monitor_for_window(&self, window: WindowHandle) -> MonitorInfo;

    /// Whether `rect` covers the full bounds of some monitor.
    fn is_rect_fullscreen(&self, rect: &Rect) -> bool {
        self.monitors().iter().any(|m| rect.contains_rect(&m.bounds))
    }

    fn window_dpi(&self, window: WindowHandle) -> u32;

    /// All top-level windows, topmost first.
    fn window_list(&self) -> Vec<WindowHandle>;

    /// Current caption text.
    fn window_text(&self, window: WindowHandle) -> String;

    /// Resize a window, keeping its position unless `flags` says otherwise.
    fn set_window_size(&self, window: WindowHandle, width: i32, height: i32, flags: SetPosFlags) -> bool;

    /// Synchronous size-move notification.
    fn notify_size_move(&self, window: WindowHandle, event: SizeMove);

    /// Queue a driver message to the window's procedure.
    fn post_message(&self, window: WindowHandle, message: DriverMessage);

    /// Display configuration changed; re-enumerate display devices.
    fn display_mode_changed(&self);

    /// Re-apply the current cursor clip rectangle, if any.
    fn reapply_cursor_clip(&self);
}
