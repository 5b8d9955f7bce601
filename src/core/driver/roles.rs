//! Surface role management.
//!
//! Decides whether a window's compositor surface should be absent, a
//! toplevel or a subsurface of its top-level anchor, and moves it there.
//! Roles are never changed in place: a surface whose role conflicts with
//! the wanted one is destroyed and replaced, and a surface that only needs
//! a role refresh has its role cleared first.

use super::{Driver, UpdateFlags};
use crate::core::presentation;
use crate::core::surface::{CompositorSurface, SharedSurface, SurfaceRole};
use crate::core::window::{topology, RegistryGuard};
use crate::platform::WindowHandle;

impl Driver {
    /// Bring `window`'s surface in line with its current state, then
    /// refresh descendants that own surfaces (one level, never recursive).
    pub(crate) fn update_wayland_surface(&self, registry: &mut RegistryGuard<'_>, window: WindowHandle, flags: UpdateFlags) {
        let surface_changed = self.sync_surface(registry, window, flags);

        if flags.contains(UpdateFlags::NO_UPDATE_CHILDREN) {
            return;
        }

        // Descendants cannot see that their anchor's surface was replaced,
        // so make them redo their roles.
        let mut child_flags = UpdateFlags::NO_UPDATE_CHILDREN;
        if surface_changed {
            child_flags |= UpdateFlags::FORCE_ROLE_UPDATE;
        }

        registry.for_each_descendant(self.windows.as_ref(), window, |registry, child| {
            let has_surface = registry.get(child).is_some_and(|r| r.surface.is_some());
            if !has_surface {
                return;
            }
            self.sync_surface(registry, child, child_flags);
            self.update_wayland_state(registry, child);
        });
    }

    /// Role synchronization for a single window. Returns whether the
    /// window's surface identity changed.
    fn sync_surface(&self, registry: &mut RegistryGuard<'_>, window: WindowHandle, flags: UpdateFlags) -> bool {
        let windows = self.windows.as_ref();

        tracing::trace!("Updating surface of window {} flags={:?}", window, flags);

        let Some(record) = registry.get(window) else {
            return false;
        };

        // Children anchor to their top-level window.
        let anchor = topology::top_level_anchor(windows, registry, window);
        let anchor_handle = anchor.map(|a| a.handle);
        let anchor_surface = anchor.and_then(|a| a.surface.clone());
        let needs_surface = topology::needs_surface(windows, record, anchor);

        let Some(record) = registry.get_mut(window) else {
            return false;
        };

        // Drop unused surfaces of child windows.
        if !needs_surface && !flags.contains(UpdateFlags::FORCE_CREATE) {
            let had_surface = record.surface.is_some();
            record.destroy_surface();
            if had_surface {
                tracing::debug!("Window {} no longer needs a surface", window);
            }
            return had_surface;
        }

        let role = if !windows.is_visible(window) {
            SurfaceRole::None
        } else if anchor_surface.is_some() {
            SurfaceRole::Subsurface
        } else {
            SurfaceRole::Toplevel
        };

        let mut surface = record.surface.clone();
        let mut client = None;
        let mut surface_changed = false;

        // A surface can lose its role and get it back later, but it can
        // never take a different role. Replace it instead.
        let conflict = surface.as_ref().is_some_and(|existing| {
            let existing = existing.lock();
            !role.is_none()
                && !existing.role().is_none()
                && (existing.role() != role
                    || (role == SurfaceRole::Subsurface && existing.parent_ref() != anchor_handle))
        });
        if conflict {
            if let Some(existing) = surface.take() {
                tracing::debug!("Replacing surface of window {} for {} role", window, role.name());
                record.detach_presentation();
                let mut existing = existing.lock();
                client = existing.client();
                existing.destroy();
                record.surface = None;
                surface_changed = true;
            }
        }

        let surface = match surface {
            Some(surface) => surface,
            None => match CompositorSurface::create(self.connection.clone(), window) {
                Some(created) => {
                    surface_changed = true;
                    SharedSurface::new(created)
                }
                None => {
                    tracing::warn!("Failed to create surface for window {}", window);
                    return surface_changed;
                }
            },
        };

        {
            let mut locked = surface.lock();

            let role_mismatch = (role == SurfaceRole::Toplevel) != (locked.role() == SurfaceRole::Toplevel)
                || (role == SurfaceRole::Subsurface) != (locked.role() == SurfaceRole::Subsurface)
                || (role == SurfaceRole::Subsurface
                    && locked.parent_ref().is_some()
                    && locked.parent_ref() != anchor_handle);

            if role_mismatch || flags.contains(UpdateFlags::FORCE_ROLE_UPDATE) {
                locked.clear_role();
                // Invisible windows stay role-less so the compositor is not
                // polluted with unused role objects.
                match role {
                    SurfaceRole::Toplevel => match locked.make_toplevel() {
                        Ok(()) => {
                            let title: String = windows
                                .window_text(window)
                                .chars()
                                .take(self.config.max_title_len)
                                .collect();
                            locked.set_title(&title);
                        }
                        Err(e) => tracing::warn!("Window {}: {}", window, e),
                    },
                    SurfaceRole::Subsurface => {
                        if let Some(anchor_surface) = &anchor_surface {
                            let anchor = anchor_surface.lock();
                            if let Err(e) = locked.make_subsurface(&anchor) {
                                tracing::warn!("Window {}: {}", window, e);
                            }
                        }
                    }
                    SurfaceRole::None => {}
                }
            }

            locked.window_config = record.window_config(windows, &self.config);
            if let Some(client) = client.take() {
                locked.attach_client(client);
            }
        }

        record.surface = Some(surface);
        presentation::update_binding(record);

        // Geometry changes move the effective pointer constraint.
        if windows.foreground_window() == Some(window) {
            windows.reapply_cursor_clip();
        }

        tracing::trace!("Window {} surface changed={}", window, surface_changed);
        surface_changed
    }
}
