//! Presentation bridge.
//!
//! A window's drawn content reaches the compositor through a presentation
//! object owned by the window record. The bridge only tracks where that
//! object should present; it never creates or destroys roles itself.

use std::sync::Arc;

use crate::core::protocol::{CompositorConnection, SurfaceId};
use crate::core::surface::SharedSurface;
use crate::core::window::WindowRecord;
use crate::platform::WindowHandle;
use crate::util::geometry::Rect;

/// Per-window presentation object (a window surface, in driver terms).
pub trait PresentationSurface: Send + Sync {
    /// Re-point presentation at `surface` with the given visible rect.
    /// `None` detaches the presentation from any compositor surface.
    fn update_wayland_surface(&self, visible_rect: Option<&Rect>, surface: Option<&SharedSurface>);

    /// Push pending drawing to whatever surface is bound.
    fn flush(&self);
}

/// Re-point the presentation of `record` at its current surface.
///
/// Called under the registry lock with the surface unlocked; the
/// implementation may lock the surface itself.
pub fn update_binding(record: &WindowRecord) {
    let Some(presentation) = &record.presentation else {
        return;
    };
    match &record.surface {
        Some(surface) => presentation.update_wayland_surface(Some(&record.visible_rect), Some(surface)),
        None => presentation.update_wayland_surface(None, None),
    }
}

/// Detach presentation from any compositor surface.
pub fn detach(presentation: &dyn PresentationSurface) {
    presentation.update_wayland_surface(None, None);
}

pub fn flush(record: &WindowRecord) {
    if let Some(presentation) = &record.presentation {
        presentation.flush();
    }
}

/// Compositor surface created on behalf of an external client renderer
/// (a GL or Vulkan swapchain, say) and placed above a window's surface.
pub struct ClientSurface {
    id: SurfaceId,
    window: WindowHandle,
    connection: Arc<dyn CompositorConnection>,
}

impl ClientSurface {
    pub fn create(connection: Arc<dyn CompositorConnection>, window: WindowHandle) -> Option<Arc<Self>> {
        let id = connection.create_surface(window)?;
        tracing::debug!("Created client surface {} for window {}", id, window);
        Some(Arc::new(Self {
            id,
            window,
            connection,
        }))
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn window(&self) -> WindowHandle {
        self.window
    }
}

impl Drop for ClientSurface {
    fn drop(&mut self) {
        self.connection.destroy_surface(self.id);
    }
}

impl std::fmt::Debug for ClientSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSurface")
            .field("id", &self.id)
            .field("window", &self.window)
            .finish()
    }
}
