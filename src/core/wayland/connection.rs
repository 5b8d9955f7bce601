//! Client connection to the compositor.

use std::collections::HashMap;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::sync::Mutex;

use wayland_client::globals::registry_queue_init;
use wayland_client::protocol::{
    wl_compositor::WlCompositor, wl_pointer::WlPointer, wl_seat::WlSeat,
    wl_subcompositor::WlSubcompositor, wl_subsurface::WlSubsurface, wl_surface::WlSurface,
};
use wayland_client::{Connection, EventQueue, Proxy, QueueHandle};
use wayland_protocols::xdg::shell::client::{xdg_surface::XdgSurface, xdg_toplevel, xdg_wm_base::XdgWmBase};

use crate::core::errors::{CoreError, Result};
use crate::core::protocol::{BackendEvent, CompositorConnection, SurfaceId};
use crate::core::surface::Configuration;
use crate::core::window::resize::ResizeEdge;
use crate::platform::WindowHandle;
use crate::util::lock_unpoisoned;
use crate::util::logging::WAYLAND;
use crate::wlog;

/// User data attached to every per-window protocol object.
#[derive(Debug, Clone, Copy)]
pub(super) struct SurfaceData {
    pub id: SurfaceId,
    pub window: WindowHandle,
}

/// Protocol objects backing one [`SurfaceId`].
pub(super) struct SurfaceObjects {
    pub wl_surface: WlSurface,
    pub xdg_surface: Option<XdgSurface>,
    pub xdg_toplevel: Option<xdg_toplevel::XdgToplevel>,
    pub subsurface: Option<WlSubsurface>,
    /// Toplevel configure accumulated until the xdg_surface serial.
    pub pending: Configuration,
}

impl SurfaceObjects {
    fn clear_role(&mut self) {
        if let Some(subsurface) = self.subsurface.take() {
            subsurface.destroy();
        }
        if let Some(toplevel) = self.xdg_toplevel.take() {
            toplevel.destroy();
        }
        if let Some(xdg_surface) = self.xdg_surface.take() {
            xdg_surface.destroy();
        }
        self.pending = Configuration::default();
        // Unmap until a new role is set up.
        self.wl_surface.attach(None, 0, 0);
        self.wl_surface.commit();
    }
}

/// Dispatch state of the event queue.
pub(super) struct EventSink {
    pub compositor: WlCompositor,
    pub subcompositor: WlSubcompositor,
    pub wm_base: XdgWmBase,
    pub seat: Option<WlSeat>,
    pub pointer: Option<WlPointer>,
    pub surfaces: HashMap<SurfaceId, SurfaceObjects>,
    pub events: Vec<BackendEvent>,
    next_id: u32,
}

impl EventSink {
    fn allocate_id(&mut self) -> SurfaceId {
        self.next_id += 1;
        SurfaceId(self.next_id)
    }
}

struct Inner {
    queue: EventQueue<EventSink>,
    sink: EventSink,
}

/// Compositor connection over a Wayland socket.
pub struct WaylandConnection {
    connection: Connection,
    qh: QueueHandle<EventSink>,
    inner: Mutex<Inner>,
}

impl WaylandConnection {
    /// Connect to `display`, or to `$WAYLAND_DISPLAY` when `None`.
    pub fn connect(display: Option<&str>) -> Result<Self> {
        let connection = match display {
            Some(name) => {
                let stream = UnixStream::connect(socket_path(name))
                    .map_err(|e| CoreError::connection(format!("{}: {}", name, e)))?;
                Connection::from_socket(stream).map_err(|e| CoreError::connection(e.to_string()))?
            }
            None => Connection::connect_to_env().map_err(|e| CoreError::connection(e.to_string()))?,
        };

        let (globals, mut queue) =
            registry_queue_init::<EventSink>(&connection).map_err(|e| CoreError::connection(e.to_string()))?;
        let qh = queue.handle();

        let compositor = globals
            .bind::<WlCompositor, _, _>(&qh, 4..=6, ())
            .map_err(|_| CoreError::MissingGlobal("wl_compositor"))?;
        let subcompositor = globals
            .bind::<WlSubcompositor, _, _>(&qh, 1..=1, ())
            .map_err(|_| CoreError::MissingGlobal("wl_subcompositor"))?;
        let wm_base = globals
            .bind::<XdgWmBase, _, _>(&qh, 1..=5, ())
            .map_err(|_| CoreError::MissingGlobal("xdg_wm_base"))?;
        let seat = globals.bind::<WlSeat, _, _>(&qh, 1..=7, ()).ok();
        if seat.is_none() {
            tracing::warn!("No wl_seat; interactive move/resize unavailable");
        }

        let mut sink = EventSink {
            compositor,
            subcompositor,
            wm_base,
            seat,
            pointer: None,
            surfaces: HashMap::new(),
            events: Vec::new(),
            next_id: 0,
        };

        // Pick up seat capabilities before the first window shows up.
        queue
            .roundtrip(&mut sink)
            .map_err(|e| CoreError::dispatch(e.to_string()))?;

        wlog!(WAYLAND, "Connected to compositor");

        Ok(Self {
            connection,
            qh,
            inner: Mutex::new(Inner { queue, sink }),
        })
    }

    /// Dispatch whatever is already queued and return the resulting events.
    pub fn dispatch_pending(&self) -> Result<Vec<BackendEvent>> {
        let mut inner = lock_unpoisoned(&self.inner);
        let Inner { queue, sink } = &mut *inner;
        queue
            .dispatch_pending(sink)
            .map_err(|e| CoreError::dispatch(e.to_string()))?;
        Ok(std::mem::take(&mut sink.events))
    }

    /// Wait for compositor events and return them.
    ///
    /// The socket read happens without holding the request lock, so other
    /// threads can keep issuing requests meanwhile.
    pub fn blocking_dispatch(&self) -> Result<Vec<BackendEvent>> {
        let events = self.dispatch_pending()?;
        if !events.is_empty() {
            return Ok(events);
        }

        self.connection
            .flush()
            .map_err(|e| CoreError::dispatch(e.to_string()))?;
        if let Some(guard) = self.connection.prepare_read() {
            guard.read().map_err(|e| CoreError::dispatch(e.to_string()))?;
        }

        self.dispatch_pending()
    }

    fn with_surface<T>(&self, surface: SurfaceId, f: impl FnOnce(&mut SurfaceObjects, &EventSinkRefs<'_>) -> T) -> Option<T> {
        let mut inner = lock_unpoisoned(&self.inner);
        let sink = &mut inner.sink;
        let refs = EventSinkRefs {
            subcompositor: &sink.subcompositor,
            wm_base: &sink.wm_base,
            seat: sink.seat.as_ref(),
            qh: &self.qh,
        };
        match sink.surfaces.get_mut(&surface) {
            Some(objects) => Some(f(objects, &refs)),
            None => {
                tracing::debug!("Request for unknown surface {}", surface);
                None
            }
        }
    }
}

/// Globals a per-surface request may need.
struct EventSinkRefs<'a> {
    subcompositor: &'a WlSubcompositor,
    wm_base: &'a XdgWmBase,
    seat: Option<&'a WlSeat>,
    qh: &'a QueueHandle<EventSink>,
}

fn socket_path(name: &str) -> PathBuf {
    let path = PathBuf::from(name);
    if path.is_absolute() {
        return path;
    }
    std::env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(path)
}

fn xdg_edge(edge: ResizeEdge) -> xdg_toplevel::ResizeEdge {
    match edge {
        ResizeEdge::None => xdg_toplevel::ResizeEdge::None,
        ResizeEdge::Top => xdg_toplevel::ResizeEdge::Top,
        ResizeEdge::Bottom => xdg_toplevel::ResizeEdge::Bottom,
        ResizeEdge::Left => xdg_toplevel::ResizeEdge::Left,
        ResizeEdge::TopLeft => xdg_toplevel::ResizeEdge::TopLeft,
        ResizeEdge::BottomLeft => xdg_toplevel::ResizeEdge::BottomLeft,
        ResizeEdge::Right => xdg_toplevel::ResizeEdge::Right,
        ResizeEdge::TopRight => xdg_toplevel::ResizeEdge::TopRight,
        ResizeEdge::BottomRight => xdg_toplevel::ResizeEdge::BottomRight,
    }
}

impl CompositorConnection for WaylandConnection {
    fn create_surface(&self, window: WindowHandle) -> Option<SurfaceId> {
        let mut inner = lock_unpoisoned(&self.inner);
        let sink = &mut inner.sink;
        let id = sink.allocate_id();
        let wl_surface = sink.compositor.create_surface(&self.qh, SurfaceData { id, window });
        sink.surfaces.insert(
            id,
            SurfaceObjects {
                wl_surface,
                xdg_surface: None,
                xdg_toplevel: None,
                subsurface: None,
                pending: Configuration::default(),
            },
        );
        Some(id)
    }

    fn destroy_surface(&self, surface: SurfaceId) {
        let mut inner = lock_unpoisoned(&self.inner);
        if let Some(mut objects) = inner.sink.surfaces.remove(&surface) {
            if let Some(subsurface) = objects.subsurface.take() {
                subsurface.destroy();
            }
            if let Some(toplevel) = objects.xdg_toplevel.take() {
                toplevel.destroy();
            }
            if let Some(xdg_surface) = objects.xdg_surface.take() {
                xdg_surface.destroy();
            }
            objects.wl_surface.destroy();
        }
    }

    fn make_toplevel(&self, surface: SurfaceId) -> bool {
        self.with_surface(surface, |objects, refs| {
            let Some(data) = objects.wl_surface.data::<SurfaceData>().copied() else {
                return false;
            };
            let xdg_surface = refs.wm_base.get_xdg_surface(&objects.wl_surface, refs.qh, data);
            let toplevel = xdg_surface.get_toplevel(refs.qh, data);
            // The initial commit asks the compositor for a first configure.
            objects.wl_surface.commit();
            objects.xdg_surface = Some(xdg_surface);
            objects.xdg_toplevel = Some(toplevel);
            true
        })
        .unwrap_or(false)
    }

    fn make_subsurface(&self, surface: SurfaceId, parent: SurfaceId) -> bool {
        let mut inner = lock_unpoisoned(&self.inner);
        let sink = &mut inner.sink;
        let Some(parent_surface) = sink.surfaces.get(&parent).map(|p| p.wl_surface.clone()) else {
            return false;
        };
        let Some(objects) = sink.surfaces.get_mut(&surface) else {
            return false;
        };
        let subsurface = sink
            .subcompositor
            .get_subsurface(&objects.wl_surface, &parent_surface, &self.qh, ());
        subsurface.set_desync();
        objects.subsurface = Some(subsurface);
        true
    }

    fn clear_role(&self, surface: SurfaceId) {
        self.with_surface(surface, |objects, _| objects.clear_role());
    }

    fn set_title(&self, surface: SurfaceId, title: &str) {
        self.with_surface(surface, |objects, _| {
            if let Some(toplevel) = &objects.xdg_toplevel {
                toplevel.set_title(title.to_string());
            }
        });
    }

    fn set_maximized(&self, surface: SurfaceId) {
        self.with_surface(surface, |objects, _| {
            if let Some(toplevel) = &objects.xdg_toplevel {
                toplevel.set_maximized();
            }
        });
    }

    fn unset_maximized(&self, surface: SurfaceId) {
        self.with_surface(surface, |objects, _| {
            if let Some(toplevel) = &objects.xdg_toplevel {
                toplevel.unset_maximized();
            }
        });
    }

    fn set_fullscreen(&self, surface: SurfaceId) {
        self.with_surface(surface, |objects, _| {
            if let Some(toplevel) = &objects.xdg_toplevel {
                toplevel.set_fullscreen(None);
            }
        });
    }

    fn unset_fullscreen(&self, surface: SurfaceId) {
        self.with_surface(surface, |objects, _| {
            if let Some(toplevel) = &objects.xdg_toplevel {
                toplevel.unset_fullscreen();
            }
        });
    }

    fn ack_configure(&self, surface: SurfaceId, serial: u32) {
        self.with_surface(surface, |objects, _| {
            if let Some(xdg_surface) = &objects.xdg_surface {
                tracing::trace!("xdg_surface.ack_configure({}) on surface {}", serial, surface);
                xdg_surface.ack_configure(serial);
            }
        });
    }

    fn interactive_move(&self, surface: SurfaceId, serial: u32) -> bool {
        self.with_surface(surface, |objects, refs| match (&objects.xdg_toplevel, refs.seat) {
            (Some(toplevel), Some(seat)) => {
                toplevel._move(seat, serial);
                true
            }
            _ => false,
        })
        .unwrap_or(false)
    }

    fn interactive_resize(&self, surface: SurfaceId, serial: u32, edge: ResizeEdge) -> bool {
        self.with_surface(surface, |objects, refs| match (&objects.xdg_toplevel, refs.seat) {
            (Some(toplevel), Some(seat)) => {
                toplevel.resize(seat, serial, xdg_edge(edge));
                true
            }
            _ => false,
        })
        .unwrap_or(false)
    }

    fn flush(&self) {
        if let Err(e) = self.connection.flush() {
            tracing::warn!("Failed to flush compositor connection: {}", e);
        }
    }
}
