//! Per-window bookkeeping.

use std::sync::Arc;

use crate::config::DriverConfig;
use crate::core::presentation::{self, PresentationSurface};
use crate::core::surface::{ConfigState, SharedSurface, WindowConfig};
use crate::platform::{WindowHandle, WindowStyle, WindowSystem};
use crate::util::geometry::Rect;

/// Geometry reported with a window position change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowRects {
    pub window: Rect,
    pub client: Rect,
    pub visible: Rect,
}

impl WindowRects {
    pub fn new(window: Rect, client: Rect, visible: Rect) -> Self {
        Self { window, client, visible }
    }

    /// Frameless window: all three rects coincide.
    pub fn uniform(rect: Rect) -> Self {
        Self::new(rect, rect, rect)
    }
}

/// Everything the driver tracks for one native window.
pub struct WindowRecord {
    pub handle: WindowHandle,
    pub window_rect: Rect,
    pub client_rect: Rect,
    pub visible_rect: Rect,
    /// Participates in top-level compositor placement.
    pub managed: bool,
    pub surface: Option<SharedSurface>,
    pub presentation: Option<Arc<dyn PresentationSurface>>,
}

impl WindowRecord {
    pub fn new(handle: WindowHandle, rects: &WindowRects) -> Self {
        Self {
            handle,
            window_rect: rects.window,
            client_rect: rects.client,
            visible_rect: rects.visible,
            managed: false,
            surface: None,
            presentation: None,
        }
    }

    pub fn set_rects(&mut self, rects: &WindowRects) {
        self.window_rect = rects.window;
        self.client_rect = rects.client;
        self.visible_rect = rects.visible;
    }

    /// Whether this window's surface hosts a client presentation surface.
    pub fn surface_has_client(&self) -> bool {
        self.surface.as_ref().is_some_and(|s| s.lock().has_client())
    }

    /// Unbind the presentation from any compositor surface.
    pub fn detach_presentation(&self) {
        if let Some(p) = &self.presentation {
            presentation::detach(p.as_ref());
        }
    }

    /// Detach presentation, then destroy and drop the surface.
    pub fn destroy_surface(&mut self) {
        if let Some(surface) = self.surface.take() {
            self.detach_presentation();
            surface.lock().destroy();
        }
    }

    /// Release everything the record owns. Runs outside the registry lock.
    pub fn teardown(mut self) {
        self.detach_presentation();
        self.presentation = None;
        if let Some(surface) = self.surface.take() {
            surface.lock().destroy();
        }
    }

    /// Derive the compositor-facing target state from the window.
    pub fn window_config(&self, windows: &dyn WindowSystem, config: &DriverConfig) -> WindowConfig {
        let style = windows.style(self.handle);
        let mut state = ConfigState::empty();

        tracing::trace!("window={} style={:?}", self.window_rect, style);

        // Fullscreen is implied by position and style.
        if windows.is_rect_fullscreen(&self.window_rect) {
            if style.contains(WindowStyle::MAXIMIZE) && style.contains(WindowStyle::CAPTION) {
                state |= ConfigState::MAXIMIZED;
            } else if !style.contains(WindowStyle::MINIMIZE) {
                state |= ConfigState::FULLSCREEN;
            }
        } else if style.contains(WindowStyle::MAXIMIZE) {
            state |= ConfigState::MAXIMIZED;
        }

        WindowConfig {
            rect: self.window_rect,
            client_rect: self.client_rect,
            state,
            scale: config.scale_for_dpi(windows.window_dpi(self.handle)),
            visible: style.contains(WindowStyle::VISIBLE),
            managed: self.managed,
        }
    }
}

impl std::fmt::Debug for WindowRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowRecord")
            .field("handle", &self.handle)
            .field("window_rect", &self.window_rect)
            .field("managed", &self.managed)
            .field("surface", &self.surface)
            .field("presentation", &self.presentation.is_some())
            .finish()
    }
}
