//! In-memory window system.
//!
//! Keeps a window tree, styles, captions and monitors in memory and records
//! every command the driver issues, so the driver can run without a native
//! window system (tests, the headless binary).

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::api::{
    ExStyle, MonitorInfo, SetPosFlags, SizeMove, WindowHandle, WindowStyle, WindowSystem,
};
use crate::core::driver::DriverMessage;
use crate::util::geometry::Rect;
use crate::util::lock_unpoisoned;

/// Desktop window handle.
pub const DESKTOP: WindowHandle = WindowHandle(0x1);
/// Root of message-only windows; it has no parent itself.
pub const MESSAGE_ROOT: WindowHandle = WindowHandle(0x2);

const DEFAULT_DPI: u32 = 96;

#[derive(Debug, Clone)]
struct StubWindow {
    parent: Option<WindowHandle>,
    owner: Option<WindowHandle>,
    style: WindowStyle,
    ex_style: ExStyle,
    rect: Rect,
    text: String,
    dpi: u32,
}

/// A resize issued through [`WindowSystem::set_window_size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeCall {
    pub window: WindowHandle,
    pub width: i32,
    pub height: i32,
    pub flags: SetPosFlags,
}

#[derive(Debug)]
struct StubState {
    windows: HashMap<WindowHandle, StubWindow>,
    /// Topmost first.
    z_order: Vec<WindowHandle>,
    foreground: Option<WindowHandle>,
    active: Option<WindowHandle>,
    monitors: Vec<MonitorInfo>,
    next_handle: u64,
    posted: VecDeque<(WindowHandle, DriverMessage)>,
    size_calls: Vec<SizeCall>,
    size_moves: Vec<(WindowHandle, SizeMove)>,
    cursor_clip_reapplied: usize,
    display_mode_changes: usize,
}

/// In-memory [`WindowSystem`].
#[derive(Debug)]
pub struct StubWindowSystem {
    state: Mutex<StubState>,
}

impl Default for StubWindowSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl StubWindowSystem {
    /// One 1920x1080 monitor with a 40px taskbar at the bottom.
    pub fn new() -> Self {
        Self::with_monitors(vec![MonitorInfo {
            bounds: Rect::new(0, 0, 1920, 1080),
            work_area: Rect::new(0, 0, 1920, 1040),
        }])
    }

    pub fn with_monitors(monitors: Vec<MonitorInfo>) -> Self {
        Self {
            state: Mutex::new(StubState {
                windows: HashMap::new(),
                z_order: Vec::new(),
                foreground: None,
                active: None,
                monitors,
                next_handle: 0x10,
                posted: VecDeque::new(),
                size_calls: Vec::new(),
                size_moves: Vec::new(),
                cursor_clip_reapplied: 0,
                display_mode_changes: 0,
            }),
        }
    }

    /// Create a window under `parent` (desktop for top-levels), placed on
    /// top of the z-order.
    pub fn add_window(&self, parent: WindowHandle, style: WindowStyle, rect: Rect, text: &str) -> WindowHandle {
        let mut state = lock_unpoisoned(&self.state);
        let handle = WindowHandle(state.next_handle);
        state.next_handle += 1;
        state.windows.insert(handle, StubWindow {
            parent: Some(parent),
            owner: None,
            style,
            ex_style: ExStyle::empty(),
            rect,
            text: text.to_string(),
            dpi: DEFAULT_DPI,
        });
        if parent == DESKTOP {
            state.z_order.insert(0, handle);
        }
        handle
    }

    pub fn remove_window(&self, window: WindowHandle) {
        let mut state = lock_unpoisoned(&self.state);
        state.windows.remove(&window);
        state.z_order.retain(|&w| w != window);
    }

    pub fn set_owner(&self, window: WindowHandle, owner: Option<WindowHandle>) {
        self.update(window, |w| w.owner = owner);
    }

    pub fn set_ex_style(&self, window: WindowHandle, ex_style: ExStyle) {
        self.update(window, |w| w.ex_style = ex_style);
    }

    pub fn set_rect(&self, window: WindowHandle, rect: Rect) {
        self.update(window, |w| w.rect = rect);
    }

    pub fn set_text(&self, window: WindowHandle, text: &str) {
        self.update(window, |w| w.text = text.to_string());
    }

    pub fn set_dpi(&self, window: WindowHandle, dpi: u32) {
        self.update(window, |w| w.dpi = dpi);
    }

    pub fn set_parent(&self, window: WindowHandle, parent: WindowHandle) {
        self.update(window, |w| w.parent = Some(parent));
        let mut state = lock_unpoisoned(&self.state);
        state.z_order.retain(|&w| w != window);
        if parent == DESKTOP {
            state.z_order.insert(0, window);
        }
    }

    pub fn set_visible(&self, window: WindowHandle, visible: bool) {
        self.update(window, |w| w.style.set(WindowStyle::VISIBLE, visible));
    }

    pub fn set_active(&self, window: Option<WindowHandle>) {
        lock_unpoisoned(&self.state).active = window;
    }

    pub fn rect(&self, window: WindowHandle) -> Option<Rect> {
        lock_unpoisoned(&self.state).windows.get(&window).map(|w| w.rect)
    }

    /// Drain messages queued with [`WindowSystem::post_message`].
    pub fn take_posted(&self) -> Vec<(WindowHandle, DriverMessage)> {
        lock_unpoisoned(&self.state).posted.drain(..).collect()
    }

    /// Drain resizes issued by the driver.
    pub fn take_size_calls(&self) -> Vec<SizeCall> {
        std::mem::take(&mut lock_unpoisoned(&self.state).size_calls)
    }

    pub fn size_moves(&self) -> Vec<(WindowHandle, SizeMove)> {
        lock_unpoisoned(&self.state).size_moves.clone()
    }

    pub fn cursor_clip_reapplied(&self) -> usize {
        lock_unpoisoned(&self.state).cursor_clip_reapplied
    }

    pub fn display_mode_changes(&self) -> usize {
        lock_unpoisoned(&self.state).display_mode_changes
    }

    fn update(&self, window: WindowHandle, f: impl FnOnce(&mut StubWindow)) {
        if let Some(w) = lock_unpoisoned(&self.state).windows.get_mut(&window) {
            f(w);
        }
    }

    fn read<T>(&self, window: WindowHandle, f: impl FnOnce(&StubWindow) -> T) -> Option<T> {
        lock_unpoisoned(&self.state).windows.get(&window).map(f)
    }
}

impl WindowSystem for StubWindowSystem {
    fn desktop_window(&self) -> WindowHandle {
        DESKTOP
    }

    fn parent(&self, window: WindowHandle) -> Option<WindowHandle> {
        if window == MESSAGE_ROOT {
            return None;
        }
        self.read(window, |w| w.parent).flatten()
    }

    fn owner(&self, window: WindowHandle) -> Option<WindowHandle> {
        self.read(window, |w| w.owner).flatten()
    }

    fn style(&self, window: WindowHandle) -> WindowStyle {
        self.read(window, |w| w.style).unwrap_or_default()
    }

    fn set_style(&self, window: WindowHandle, style: WindowStyle) {
        self.update(window, |w| w.style = style);
    }

    fn ex_style(&self, window: WindowHandle) -> ExStyle {
        self.read(window, |w| w.ex_style).unwrap_or_default()
    }

    fn is_visible(&self, window: WindowHandle) -> bool {
        let state = lock_unpoisoned(&self.state);
        let mut current = window;
        loop {
            if current == DESKTOP {
                return true;
            }
            match state.windows.get(&current) {
                Some(w) if w.style.contains(WindowStyle::VISIBLE) => match w.parent {
                    Some(parent) => current = parent,
                    None => return true,
                },
                _ => return false,
            }
        }
    }

    fn foreground_window(&self) -> Option<WindowHandle> {
        lock_unpoisoned(&self.state).foreground
    }

    fn set_foreground_window(&self, window: WindowHandle) -> bool {
        let mut state = lock_unpoisoned(&self.state);
        if !state.windows.contains_key(&window) {
            return false;
        }
        state.foreground = Some(window);
        state.active = Some(window);
        true
    }

    fn active_window(&self) -> Option<WindowHandle> {
        lock_unpoisoned(&self.state).active
    }

    fn monitors(&self) -> Vec<MonitorInfo> {
        lock_unpoisoned(&self.state).monitors.clone()
    }

    fn monitor_for_window(&self, window: WindowHandle) -> MonitorInfo {
        let state = lock_unpoisoned(&self.state);
        // No monitors reads as an empty one.
        let primary = state.monitors.first().copied().unwrap_or_default();
        let Some(w) = state.windows.get(&window) else {
            return primary;
        };
        let (cx, cy) = ((w.rect.left + w.rect.right) / 2, (w.rect.top + w.rect.bottom) / 2);
        state
            .monitors
            .iter()
            .copied()
            .find(|m| m.bounds.contains_point(cx, cy))
            .unwrap_or(primary)
    }

    fn window_dpi(&self, window: WindowHandle) -> u32 {
        self.read(window, |w| w.dpi).unwrap_or(DEFAULT_DPI)
    }

    fn window_list(&self) -> Vec<WindowHandle> {
        lock_unpoisoned(&self.state).z_order.clone()
    }

    fn window_text(&self, window: WindowHandle) -> String {
        self.read(window, |w| w.text.clone()).unwrap_or_default()
    }

    fn set_window_size(&self, window: WindowHandle, width: i32, height: i32, flags: SetPosFlags) -> bool {
        let mut state = lock_unpoisoned(&self.state);
        let Some(w) = state.windows.get_mut(&window) else {
            return false;
        };
        if !flags.contains(SetPosFlags::NO_SIZE) {
            w.rect = w.rect.with_size(width, height);
        }
        state.size_calls.push(SizeCall { window, width, height, flags });
        true
    }

    fn notify_size_move(&self, window: WindowHandle, event: SizeMove) {
        lock_unpoisoned(&self.state).size_moves.push((window, event));
    }

    fn post_message(&self, window: WindowHandle, message: DriverMessage) {
        lock_unpoisoned(&self.state).posted.push_back((window, message));
    }

    fn display_mode_changed(&self) {
        lock_unpoisoned(&self.state).display_mode_changes += 1;
    }

    fn reapply_cursor_clip(&self) {
        lock_unpoisoned(&self.state).cursor_clip_reapplied += 1;
    }
}
