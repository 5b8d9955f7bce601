//! Window driver.
//!
//! Entry points called by the window system (position changes, destroy,
//! captions, driver messages, system commands) and by the compositor
//! backend (configures, pointer events). All state lives in the
//! [`Registry`]; compositor and window-system access go through the
//! [`CompositorConnection`] and [`WindowSystem`] seams.
//!
//! Lock order is registry before surface. Surface locks are never held
//! while calling back into the window system for geometry changes.

pub mod messages;
mod configure;
mod roles;

use std::sync::{Arc, Mutex};

use bitflags::bitflags;

pub use messages::{DriverMessage, SysCommand, SysCommandResult};

use crate::config::DriverConfig;
use crate::core::presentation::{self, ClientSurface, PresentationSurface};
use crate::core::protocol::{BackendEvent, CompositorConnection};
use crate::core::surface::{Configuration, SharedSurface, SurfaceRole};
use crate::core::window::focus::PointerFocus;
use crate::core::window::{managed, topology, Registry, WindowRects};
use crate::platform::{SetPosFlags, WindowHandle, WindowSystem};
use crate::util::lock_unpoisoned;
use crate::util::logging::DRIVER;
use crate::wlog;

bitflags! {
    /// Options for a surface role update.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct UpdateFlags: u32 {
        /// Re-establish the role even if it looks unchanged.
        const FORCE_ROLE_UPDATE = 1 << 0;
        /// Create a surface even if the window would not need one.
        const FORCE_CREATE = 1 << 1;
        /// Do not propagate to descendants.
        const NO_UPDATE_CHILDREN = 1 << 2;
    }
}

pub struct Driver {
    registry: Registry,
    windows: Arc<dyn WindowSystem>,
    connection: Arc<dyn CompositorConnection>,
    pointer: Mutex<PointerFocus>,
    config: DriverConfig,
}

impl Driver {
    pub fn new(
        windows: Arc<dyn WindowSystem>,
        connection: Arc<dyn CompositorConnection>,
        config: DriverConfig,
    ) -> Self {
        wlog!(DRIVER, "Window driver initialized (base dpi {})", config.base_dpi);
        Self {
            registry: Registry::new(),
            windows,
            connection,
            pointer: Mutex::new(PointerFocus::new()),
            config,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// A window is about to move or resize. Creates its record on first
    /// sight and reports whether it needs a dedicated compositor-backed
    /// presentation surface (`false`: use the default one).
    pub fn window_pos_changing(&self, window: WindowHandle, rects: &WindowRects) -> bool {
        let windows = self.windows.as_ref();

        tracing::trace!(
            "window_pos_changing {} window {} client {} visible {}",
            window, rects.window, rects.client, rects.visible
        );

        let Some(record) = self
            .registry
            .get(window)
            .or_else(|| self.registry.create(windows, window, rects))
        else {
            return false;
        };

        match windows.parent(window) {
            Some(parent) if parent != windows.desktop_window() => {
                let anchor = topology::top_level_anchor(windows, record.registry(), window);
                topology::needs_surface(windows, &record, anchor)
            }
            _ => true,
        }
    }

    /// A window moved, resized, changed visibility or style.
    pub fn window_pos_changed(
        &self,
        window: WindowHandle,
        flags: SetPosFlags,
        rects: &WindowRects,
        presentation: Option<Arc<dyn PresentationSurface>>,
    ) {
        tracing::trace!(
            "window_pos_changed {} window {} client {} visible {} flags {:?}",
            window, rects.window, rects.client, rects.visible, flags
        );

        // The heuristic looks up other records, so run it unlocked.
        let managed = managed::is_window_managed(self.windows.as_ref(), &self.registry, window, flags, &rects.window);

        let Some(mut record) = self.registry.get(window) else {
            return;
        };

        record.set_rects(rects);
        record.managed = managed;
        record.presentation = presentation;

        self.update_wayland_surface(record.registry_mut(), window, UpdateFlags::empty());
        if record.surface.is_some() {
            self.update_wayland_state(record.registry(), window);
        }
    }

    pub fn destroy_window(&self, window: WindowHandle) {
        tracing::trace!("destroy_window {}", window);
        if let Some(record) = self.registry.get(window) {
            self.registry.destroy(record);
            self.connection.flush();
        }
    }

    pub fn set_window_text(&self, window: WindowHandle, text: &str) {
        tracing::trace!("set_window_text {} {:?}", window, text);
        if let Some(surface) = self.surface_for(window) {
            surface.lock().set_title(&self.truncate_title(text));
            self.connection.flush();
        }
    }

    fn truncate_title(&self, text: &str) -> String {
        text.chars().take(self.config.max_title_len).collect()
    }

    /// Apply a reconciled configure, then push pending drawing.
    pub fn flush_window(&self, window: WindowHandle) {
        let Some(record) = self.registry.get(window) else {
            return;
        };

        let applied = record.surface.as_ref().is_some_and(|surface| surface.lock().reconfigure());
        presentation::flush(&record);
        record.release();

        if applied {
            self.connection.flush();
        }
    }

    /// The window's compositor surface, if it has one.
    pub fn surface_for(&self, window: WindowHandle) -> Option<SharedSurface> {
        self.registry.get(window)?.surface.clone()
    }

    /// Like [`surface_for`](Self::surface_for), but creates a surface for
    /// an anchored child on demand so accelerated content can target it.
    pub fn accel_surface_for(&self, window: WindowHandle) -> Option<SharedSurface> {
        let mut record = self.registry.get(window)?;

        // Only children of a tracked top-level; anything else would come
        // up as a toplevel of its own.
        let anchored = topology::top_level_anchor(self.windows.as_ref(), record.registry(), window).is_some();
        if record.surface.is_none() && anchored {
            self.update_wayland_surface(record.registry_mut(), window, UpdateFlags::FORCE_CREATE);
            if record.surface.is_some() {
                self.update_wayland_state(record.registry(), window);
            }
        }

        record.surface.clone()
    }

    /// Allocate a client surface for `window`'s accelerated content.
    pub fn create_client_surface(&self, window: WindowHandle) -> Option<Arc<ClientSurface>> {
        ClientSurface::create(self.connection.clone(), window)
    }

    /// Place `client` above `window`'s surface, creating the surface if
    /// needed. `false` if the window has no surface to host it.
    pub fn attach_client_surface(&self, window: WindowHandle, client: Arc<ClientSurface>) -> bool {
        let Some(surface) = self.accel_surface_for(window) else {
            return false;
        };
        surface.lock().attach_client(client);
        self.connection.flush();
        true
    }

    pub fn detach_client_surface(&self, window: WindowHandle) -> Option<Arc<ClientSurface>> {
        let client = self.surface_for(window)?.lock().detach_client();
        self.connection.flush();
        client
    }

    /// Store a compositor configure for `window` and schedule its drain on
    /// the window's thread. Overwrites any configure not yet drained.
    pub fn handle_configure(&self, window: WindowHandle, config: Configuration) {
        let Some(surface) = self.surface_for(window) else {
            tracing::debug!("Configure for window {} without a surface", window);
            return;
        };

        {
            let mut surface = surface.lock();
            if surface.role() != SurfaceRole::Toplevel {
                return;
            }
            tracing::trace!(
                "Window {} requested configure serial={} {}x{} state={:?}",
                window, config.serial, config.width, config.height, config.state
            );
            surface.requested = config;
        }

        self.windows.post_message(window, DriverMessage::Configure);
    }

    pub fn handle_backend_event(&self, event: BackendEvent) {
        match event {
            BackendEvent::Configure { window, config } => self.handle_configure(window, config),
            BackendEvent::PointerFocus { window } => self.pointer_focus(window),
            BackendEvent::PointerButton { serial } => self.pointer_button(serial),
        }
    }

    pub fn pointer_focus(&self, window: Option<WindowHandle>) {
        lock_unpoisoned(&self.pointer).set_focus(window);
    }

    /// Record a button press on the pointer-focused window.
    pub fn pointer_button(&self, serial: u32) {
        lock_unpoisoned(&self.pointer).record_button(serial);
    }

    /// Handle a driver message posted earlier to `window`.
    pub fn window_message(&self, window: WindowHandle, message: DriverMessage) {
        match message {
            DriverMessage::InitDisplayDevices => self.windows.display_mode_changed(),
            DriverMessage::Configure => self.configure_window(window),
            DriverMessage::SetForeground => {
                self.windows.set_foreground_window(window);
            }
            DriverMessage::Unknown(code) => {
                tracing::warn!("Got unknown window message {:#x} for window {}", code, window);
            }
        }
    }

    /// Turn a move/size system command into an interactive compositor
    /// operation, bound to the last button press on the window.
    pub fn sys_command(&self, window: WindowHandle, command: SysCommand) -> SysCommandResult {
        tracing::trace!("sys_command {:?} window {}", command, window);

        let serial = lock_unpoisoned(&self.pointer).serial_for(window);

        let result = match command {
            SysCommand::Move | SysCommand::Size(_) => match (serial, self.surface_for(window)) {
                (None, _) => {
                    tracing::debug!("No button serial for {:?} on window {}", command, window);
                    SysCommandResult::NotHandled
                }
                (Some(_), None) => SysCommandResult::NotHandled,
                (Some(serial), Some(surface)) => {
                    let surface = surface.lock();
                    if surface.role() != SurfaceRole::Toplevel {
                        SysCommandResult::NotHandled
                    } else {
                        let started = match command {
                            SysCommand::Size(edge) => self.connection.interactive_resize(surface.id(), serial, edge),
                            _ => self.connection.interactive_move(surface.id(), serial),
                        };
                        if started {
                            SysCommandResult::Handled
                        } else {
                            SysCommandResult::NotHandled
                        }
                    }
                }
            },
            SysCommand::Other(_) => SysCommandResult::NotHandled,
        };

        self.connection.flush();
        result
    }

    /// Drop every window record and its surfaces.
    pub fn teardown(&self) {
        self.registry.teardown();
        self.connection.flush();
        wlog!(DRIVER, "Window driver shut down");
    }
}
