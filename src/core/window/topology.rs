//! Topology resolution: which top-level window anchors a child, and
//! whether a window needs its own compositor surface.

use super::record::WindowRecord;
use super::registry::RegistryGuard;
use crate::platform::{WindowHandle, WindowSystem};

/// Outermost non-desktop ancestor of `window`, or `None` when `window` is
/// itself top-level.
pub fn top_level_window(windows: &dyn WindowSystem, window: WindowHandle) -> Option<WindowHandle> {
    let desktop = windows.desktop_window();
    let mut current = window;
    while let Some(parent) = windows.parent(current) {
        if parent == desktop {
            break;
        }
        current = parent;
    }
    (current != window).then_some(current)
}

/// Record of the window anchoring `window`, if it has one and it is
/// tracked.
pub fn top_level_anchor<'r>(
    windows: &dyn WindowSystem,
    registry: &'r RegistryGuard<'_>,
    window: WindowHandle,
) -> Option<&'r WindowRecord> {
    top_level_window(windows, window).and_then(|top| registry.get(top))
}

/// Whether `record` needs a dedicated compositor surface.
///
/// Surfaces are locked one at a time, each only to read whether it hosts
/// a client surface.
pub fn needs_surface(windows: &dyn WindowSystem, record: &WindowRecord, anchor: Option<&WindowRecord>) -> bool {
    match windows.parent(record.handle) {
        None => return true,
        Some(parent) if parent == windows.desktop_window() => return true,
        Some(_) => {}
    }

    // Keep a surface that hosts live client content.
    if record.surface_has_client() {
        return true;
    }

    // A client surface on the anchor may obscure us.
    anchor.is_some_and(|anchor| anchor.surface_has_client())
}
