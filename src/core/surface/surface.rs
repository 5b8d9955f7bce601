use std::sync::{Arc, Mutex, MutexGuard};

use super::config::{ConfigState, Configuration, WindowConfig};
use super::role::SurfaceRole;
use crate::core::errors::{CoreError, Result};
use crate::core::presentation::ClientSurface;
use crate::core::protocol::{CompositorConnection, SurfaceId};
use crate::platform::{SetPosFlags, SizeMove, WindowHandle};
use crate::util::lock_unpoisoned;

/// Window-system changes that follow from draining a configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigurePlan {
    pub serial: u32,
    /// New window size in window coordinates; 0 on an axis means keep it.
    pub width: i32,
    pub height: i32,
    pub state: ConfigState,
    pub flags: SetPosFlags,
    pub size_move: Option<SizeMove>,
}

/// The compositor-side presence of one native window.
///
/// Holds at most one role at a time. A role can be re-established as the
/// same role, but switching to a different one requires [`clear_role`]
/// first; the role setters refuse otherwise.
///
/// [`clear_role`]: CompositorSurface::clear_role
pub struct CompositorSurface {
    id: SurfaceId,
    window: WindowHandle,
    role: SurfaceRole,
    /// Anchor window of a subsurface. Identity only: resolving it
    /// requires a registry lookup, which may fail.
    parent_ref: Option<WindowHandle>,
    /// Compositor configure not yet drained.
    pub requested: Configuration,
    /// Configure being reconciled into window geometry.
    pub processing: Configuration,
    /// Last fully applied configure.
    pub current: Configuration,
    /// A compositor-driven interactive resize is in progress.
    pub resizing: bool,
    /// Target state derived from the native window.
    pub window_config: WindowConfig,
    client: Option<Arc<ClientSurface>>,
    connection: Arc<dyn CompositorConnection>,
    destroyed: bool,
}

impl CompositorSurface {
    /// Allocate a role-less surface. `None` if the compositor refuses.
    pub fn create(connection: Arc<dyn CompositorConnection>, window: WindowHandle) -> Option<Self> {
        let id = connection.create_surface(window)?;
        tracing::debug!("Created surface {} for window {}", id, window);
        Some(Self {
            id,
            window,
            role: SurfaceRole::None,
            parent_ref: None,
            requested: Configuration::default(),
            processing: Configuration::default(),
            current: Configuration::default(),
            resizing: false,
            window_config: WindowConfig::default(),
            client: None,
            connection,
            destroyed: false,
        })
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn window(&self) -> WindowHandle {
        self.window
    }

    pub fn role(&self) -> SurfaceRole {
        self.role
    }

    pub fn parent_ref(&self) -> Option<WindowHandle> {
        self.parent_ref
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    pub fn client(&self) -> Option<Arc<ClientSurface>> {
        self.client.clone()
    }

    fn check_role(&self, role: SurfaceRole) -> Result<()> {
        if self.destroyed {
            return Err(CoreError::SurfaceDestroyed(self.id));
        }
        if !self.role.is_none() && self.role != role {
            return Err(CoreError::RoleConflict {
                surface: self.id,
                current: self.role,
                requested: role,
            });
        }
        Ok(())
    }

    /// Give the surface the top-level role.
    pub fn make_toplevel(&mut self) -> Result<()> {
        self.check_role(SurfaceRole::Toplevel)?;
        if self.role == SurfaceRole::Toplevel {
            return Ok(());
        }
        if !self.connection.make_toplevel(self.id) {
            return Err(CoreError::RoleRejected {
                surface: self.id,
                role: SurfaceRole::Toplevel,
            });
        }
        self.role = SurfaceRole::Toplevel;
        tracing::debug!("Surface {} (window {}) is now a toplevel", self.id, self.window);
        Ok(())
    }

    /// Give the surface the sub-surface role under `anchor`.
    ///
    /// The caller holds `anchor`'s lock for the duration of the call.
    pub fn make_subsurface(&mut self, anchor: &CompositorSurface) -> Result<()> {
        self.check_role(SurfaceRole::Subsurface)?;
        if anchor.destroyed {
            return Err(CoreError::SurfaceDestroyed(anchor.id));
        }
        if self.role == SurfaceRole::Subsurface {
            if self.parent_ref == Some(anchor.window) {
                return Ok(());
            }
            // Re-parenting is a role change too.
            return Err(CoreError::RoleConflict {
                surface: self.id,
                current: self.role,
                requested: SurfaceRole::Subsurface,
            });
        }
        if !self.connection.make_subsurface(self.id, anchor.id) {
            return Err(CoreError::RoleRejected {
                surface: self.id,
                role: SurfaceRole::Subsurface,
            });
        }
        self.role = SurfaceRole::Subsurface;
        self.parent_ref = Some(anchor.window);
        tracing::debug!(
            "Surface {} (window {}) is now a subsurface of {} (window {})",
            self.id, self.window, anchor.id, anchor.window
        );
        Ok(())
    }

    /// Drop the current role and every configure tied to it.
    pub fn clear_role(&mut self) {
        if self.role.is_none() {
            return;
        }
        tracing::debug!("Surface {} clearing {} role", self.id, self.role.name());
        self.connection.clear_role(self.id);
        self.role = SurfaceRole::None;
        self.parent_ref = None;
        self.requested = Configuration::default();
        self.processing = Configuration::default();
        self.current = Configuration::default();
        self.resizing = false;
    }

    pub fn set_title(&self, title: &str) {
        if self.role == SurfaceRole::Toplevel {
            self.connection.set_title(self.id, title);
        }
    }

    /// Place a client presentation surface on top of this surface.
    pub fn attach_client(&mut self, client: Arc<ClientSurface>) {
        if self.client.as_ref().is_some_and(|c| Arc::ptr_eq(c, &client)) {
            return;
        }
        self.detach_client();
        if self.connection.make_subsurface(client.id(), self.id) {
            tracing::debug!("Attached client surface {} to surface {}", client.id(), self.id);
            self.client = Some(client);
        } else {
            tracing::warn!("Failed to attach client surface {} to surface {}", client.id(), self.id);
        }
    }

    pub fn detach_client(&mut self) -> Option<Arc<ClientSurface>> {
        let client = self.client.take()?;
        self.connection.clear_role(client.id());
        tracing::debug!("Detached client surface {} from surface {}", client.id(), self.id);
        Some(client)
    }

    /// Window coordinates to surface coordinates.
    pub fn coords_from_window(&self, x: i32, y: i32) -> (i32, i32) {
        let scale = self.window_config.scale;
        ((x as f64 / scale).round() as i32, (y as f64 / scale).round() as i32)
    }

    /// Surface coordinates to window coordinates.
    pub fn coords_to_window(&self, x: i32, y: i32) -> (i32, i32) {
        let scale = self.window_config.scale;
        ((x as f64 * scale).round() as i32, (y as f64 * scale).round() as i32)
    }

    /// Promote `requested` to `processing` and work out the window
    /// geometry change it asks for.
    ///
    /// Returns `None` when there is nothing to drain, or when the surface
    /// has no geometry of its own (subsurfaces only get the bookkeeping).
    pub fn drain_configure(&mut self) -> Option<ConfigurePlan> {
        if self.role.is_none() || !self.requested.is_pending() {
            return None;
        }

        self.processing = std::mem::take(&mut self.requested);

        if self.role == SurfaceRole::Subsurface {
            self.processing.processed = true;
            return None;
        }

        let serial = self.processing.serial;
        let state = self.processing.state;
        // A stateless configure only suggests a size.
        let (width, height) = if state.is_empty() {
            (0, 0)
        } else {
            (self.processing.width, self.processing.height)
        };

        let mut flags = SetPosFlags::NO_ACTIVATE
            | SetPosFlags::NO_ZORDER
            | SetPosFlags::NO_OWNER_ZORDER
            | SetPosFlags::NO_MOVE;
        let mut size_move = None;

        if state.contains(ConfigState::RESIZING) && !self.resizing {
            self.resizing = true;
            size_move = Some(SizeMove::Enter);
        } else if !state.contains(ConfigState::RESIZING) && self.resizing {
            self.resizing = false;
            size_move = Some(SizeMove::Exit);
        }

        if (state ^ self.current.state).intersects(ConfigState::MAXIMIZED | ConfigState::FULLSCREEN) {
            flags |= SetPosFlags::FRAME_CHANGED;
        }

        // Applications can be insistent about their fullscreen size, so
        // leave it alone if the compositor can live with it.
        let (surface_width, surface_height) =
            self.coords_from_window(self.window_config.rect.width(), self.window_config.rect.height());
        if self.window_config.state.contains(ConfigState::FULLSCREEN)
            && self.processing.is_compatible(surface_width, surface_height, self.window_config.state)
        {
            flags |= SetPosFlags::NO_SIZE;
        }

        let (window_width, window_height) = self.coords_to_window(width, height);
        if window_width == 0 || window_height == 0 {
            flags |= SetPosFlags::NO_SIZE;
        }

        if state.intersects(ConfigState::MAXIMIZED | ConfigState::FULLSCREEN | ConfigState::TILED) {
            flags |= SetPosFlags::NO_SEND_CHANGING;
        }

        tracing::trace!(
            "Surface {} draining configure serial={} {}x{} state={:?}",
            self.id, serial, width, height, state
        );

        Some(ConfigurePlan {
            serial,
            width: window_width,
            height: window_height,
            state,
            flags,
            size_move,
        })
    }

    /// Push window-driven state to the compositor, or mark an in-flight
    /// compositor configure as reconciled.
    pub fn sync_window_state(&mut self) {
        match self.role {
            SurfaceRole::None => {}
            SurfaceRole::Subsurface => {
                // No configure channel of their own; only mark them updated.
                self.processing.serial = 1;
                self.processing.processed = true;
            }
            SurfaceRole::Toplevel => {
                if self.processing.is_pending() && !self.processing.processed {
                    self.processing.processed = true;
                    return;
                }

                let wanted = self.window_config.state;
                let current = self.current.state;
                tracing::trace!(
                    "Surface {} window_state={:?} current_state={:?}",
                    self.id, wanted, current
                );

                // Unset before set; some compositors misbehave otherwise.
                if !wanted.contains(ConfigState::MAXIMIZED) && current.contains(ConfigState::MAXIMIZED) {
                    self.connection.unset_maximized(self.id);
                }
                if !wanted.contains(ConfigState::FULLSCREEN) && current.contains(ConfigState::FULLSCREEN) {
                    self.connection.unset_fullscreen(self.id);
                }
                if wanted.contains(ConfigState::MAXIMIZED) && !current.contains(ConfigState::MAXIMIZED) {
                    self.connection.set_maximized(self.id);
                }
                if wanted.contains(ConfigState::FULLSCREEN) && !current.contains(ConfigState::FULLSCREEN) {
                    self.connection.set_fullscreen(self.id);
                }
            }
        }
    }

    /// Move a reconciled `processing` configure to `current`, acking it
    /// for toplevels. Returns whether anything was applied.
    pub fn reconfigure(&mut self) -> bool {
        if !self.processing.is_pending() || !self.processing.processed {
            return false;
        }

        if self.role == SurfaceRole::Toplevel {
            let (width, height) =
                self.coords_from_window(self.window_config.rect.width(), self.window_config.rect.height());
            if !self.processing.is_compatible(width, height, self.window_config.state) {
                tracing::debug!(
                    "Surface {} acking configure {} with incompatible size {}x{}",
                    self.id, self.processing.serial, width, height
                );
            }
            self.connection.ack_configure(self.id, self.processing.serial);
        }

        self.current = std::mem::take(&mut self.processing);
        true
    }

    /// Tear down the role and the compositor object. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.detach_client();
        self.clear_role();
        self.connection.destroy_surface(self.id);
        self.destroyed = true;
        tracing::debug!("Destroyed surface {} of window {}", self.id, self.window);
    }
}

impl Drop for CompositorSurface {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Reference-counted, lockable [`CompositorSurface`].
#[derive(Clone)]
pub struct SharedSurface(Arc<Mutex<CompositorSurface>>);

impl SharedSurface {
    pub fn new(surface: CompositorSurface) -> Self {
        Self(Arc::new(Mutex::new(surface)))
    }

    pub fn lock(&self) -> MutexGuard<'_, CompositorSurface> {
        lock_unpoisoned(&self.0)
    }
}

impl std::fmt::Debug for SharedSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.try_lock() {
            Ok(surface) => f
                .debug_struct("SharedSurface")
                .field("id", &surface.id)
                .field("window", &surface.window)
                .field("role", &surface.role)
                .finish(),
            Err(_) => f.write_str("SharedSurface(<locked>)"),
        }
    }
}
