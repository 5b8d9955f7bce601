//! Managed-window heuristic.
//!
//! There is no authoritative signal for "this is a real top-level the user
//! interacts with", so classification runs through a fixed decision table
//! over style bits, activation and owned popups.
//!
//! Must be called without the registry lock held: the owned-popup scan
//! looks up other windows' records.

use super::registry::Registry;
use crate::platform::{ExStyle, SetPosFlags, WindowHandle, WindowStyle, WindowSystem};
use crate::util::geometry::Rect;

pub fn is_window_managed(
    windows: &dyn WindowSystem,
    registry: &Registry,
    window: WindowHandle,
    flags: SetPosFlags,
    window_rect: &Rect,
) -> bool {
    let style = windows.style(window);

    // child windows are not managed
    if style.contains(WindowStyle::CHILD) && !style.contains(WindowStyle::POPUP) {
        return false;
    }
    // activated windows are managed
    if !flags.intersects(SetPosFlags::NO_ACTIVATE | SetPosFlags::HIDE_WINDOW) {
        return true;
    }
    if windows.active_window() == Some(window) {
        return true;
    }
    if style.contains(WindowStyle::CAPTION) {
        return true;
    }
    if style.contains(WindowStyle::THICKFRAME) {
        return true;
    }
    if style.contains(WindowStyle::POPUP) {
        // popup with sysmenu == caption
        if style.contains(WindowStyle::SYSMENU) {
            return true;
        }
        // full-screen popups
        let work_area = windows.monitor_for_window(window).work_area;
        if window_rect.contains_rect(&work_area) {
            return true;
        }
    }
    if windows.ex_style(window).contains(ExStyle::APP_WINDOW) {
        return true;
    }
    has_owned_popups(windows, registry, window)
}

/// Whether `window` owns a managed popup. Popups always sit above their
/// owner, so only windows above it in z-order are considered.
pub fn has_owned_popups(windows: &dyn WindowSystem, registry: &Registry, window: WindowHandle) -> bool {
    windows
        .window_list()
        .into_iter()
        .take_while(|&w| w != window)
        .filter(|&w| windows.owner(w) == Some(window))
        .any(|w| is_managed(registry, w))
}

/// Last recorded classification of `window`; `false` if untracked.
pub fn is_managed(registry: &Registry, window: WindowHandle) -> bool {
    registry.get(window).is_some_and(|record| record.managed)
}
