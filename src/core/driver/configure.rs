//! Configure reconciliation, both directions.

use super::Driver;
use crate::core::window::RegistryGuard;
use crate::platform::{WindowHandle, WindowStyle};
use crate::core::surface::ConfigState;

impl Driver {
    /// Window state to compositor state. While a compositor configure is
    /// being processed this only marks it reconciled.
    pub(crate) fn update_wayland_state(&self, registry: &RegistryGuard<'_>, window: WindowHandle) {
        let Some(surface) = registry.get(window).and_then(|r| r.surface.clone()) else {
            return;
        };
        surface.lock().sync_window_state();
        self.connection.flush();
    }

    /// Drain the pending compositor configure of `window` into window
    /// geometry. Runs on the window's thread in response to
    /// [`DriverMessage::Configure`](super::DriverMessage::Configure).
    pub(crate) fn configure_window(&self, window: WindowHandle) {
        let Some(surface) = self.surface_for(window) else {
            return;
        };

        let plan = surface.lock().drain_configure();
        let Some(plan) = plan else {
            tracing::trace!("No configure to drain for window {}", window);
            return;
        };

        tracing::debug!(
            "Window {} configure serial={} -> {}x{} flags={:?}",
            window, plan.serial, plan.width, plan.height, plan.flags
        );

        if let Some(event) = plan.size_move {
            self.windows.notify_size_move(window, event);
        }

        let style = self.windows.style(window);
        if plan.state.contains(ConfigState::MAXIMIZED) != style.contains(WindowStyle::MAXIMIZE) {
            self.windows.set_style(window, style ^ WindowStyle::MAXIMIZE);
        }

        self.windows.set_window_size(window, plan.width, plan.height, plan.flags);
    }
}
