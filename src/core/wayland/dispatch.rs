//! Event dispatch for the client-side protocol objects.

use wayland_client::globals::GlobalListContents;
use wayland_client::protocol::{
    wl_compositor, wl_pointer, wl_registry, wl_seat, wl_subcompositor, wl_subsurface, wl_surface,
};
use wayland_client::{Connection, Dispatch, Proxy, QueueHandle, WEnum};
use wayland_protocols::xdg::shell::client::{xdg_surface, xdg_toplevel, xdg_wm_base};

use super::connection::{EventSink, SurfaceData};
use crate::core::protocol::BackendEvent;
use crate::core::surface::{ConfigState, Configuration};

/// Decode an xdg_toplevel state array (native-endian u32 values).
pub(super) fn decode_states(states: &[u8]) -> ConfigState {
    let mut state = ConfigState::empty();
    for chunk in states.chunks_exact(4) {
        let raw = u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        match xdg_toplevel::State::try_from(raw) {
            Ok(xdg_toplevel::State::Maximized) => state |= ConfigState::MAXIMIZED,
            Ok(xdg_toplevel::State::Fullscreen) => state |= ConfigState::FULLSCREEN,
            Ok(xdg_toplevel::State::Resizing) => state |= ConfigState::RESIZING,
            Ok(
                xdg_toplevel::State::TiledLeft
                | xdg_toplevel::State::TiledRight
                | xdg_toplevel::State::TiledTop
                | xdg_toplevel::State::TiledBottom,
            ) => state |= ConfigState::TILED,
            _ => {}
        }
    }
    state
}

impl Dispatch<wl_registry::WlRegistry, GlobalListContents> for EventSink {
    fn event(
        _: &mut Self,
        _: &wl_registry::WlRegistry,
        event: wl_registry::Event,
        _: &GlobalListContents,
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let wl_registry::Event::GlobalRemove { name } = event {
            tracing::debug!("wl_registry.global_remove: {}", name);
        }
    }
}

impl Dispatch<xdg_wm_base::XdgWmBase, ()> for EventSink {
    fn event(
        _: &mut Self,
        wm_base: &xdg_wm_base::XdgWmBase,
        event: xdg_wm_base::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let xdg_wm_base::Event::Ping { serial } = event {
            wm_base.pong(serial);
        }
    }
}

impl Dispatch<xdg_surface::XdgSurface, SurfaceData> for EventSink {
    fn event(
        state: &mut Self,
        _: &xdg_surface::XdgSurface,
        event: xdg_surface::Event,
        data: &SurfaceData,
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        let xdg_surface::Event::Configure { serial } = event else {
            return;
        };
        let Some(objects) = state.surfaces.get_mut(&data.id) else {
            return;
        };
        if objects.xdg_toplevel.is_none() {
            return;
        }

        // The xdg_surface serial seals everything sent since the last one.
        let mut config = std::mem::take(&mut objects.pending);
        config.serial = serial;
        tracing::trace!(
            "xdg_surface.configure serial={} {}x{} state={:?} on surface {}",
            serial, config.width, config.height, config.state, data.id
        );
        state.events.push(BackendEvent::Configure {
            window: data.window,
            config,
        });
    }
}

impl Dispatch<xdg_toplevel::XdgToplevel, SurfaceData> for EventSink {
    fn event(
        state: &mut Self,
        _: &xdg_toplevel::XdgToplevel,
        event: xdg_toplevel::Event,
        data: &SurfaceData,
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            xdg_toplevel::Event::Configure { width, height, states } => {
                if let Some(objects) = state.surfaces.get_mut(&data.id) {
                    objects.pending = Configuration::new(0, width, height, decode_states(&states));
                }
            }
            xdg_toplevel::Event::Close => {
                tracing::debug!("xdg_toplevel.close for window {}", data.window);
            }
            _ => {}
        }
    }
}

impl Dispatch<wl_seat::WlSeat, ()> for EventSink {
    fn event(
        state: &mut Self,
        seat: &wl_seat::WlSeat,
        event: wl_seat::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        if let wl_seat::Event::Capabilities { capabilities: WEnum::Value(caps) } = event {
            let has_pointer = caps.contains(wl_seat::Capability::Pointer);
            match (state.pointer.is_some(), has_pointer) {
                (false, true) => state.pointer = Some(seat.get_pointer(qh, ())),
                (true, false) => {
                    if let Some(pointer) = state.pointer.take() {
                        if pointer.version() >= 3 {
                            pointer.release();
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

impl Dispatch<wl_pointer::WlPointer, ()> for EventSink {
    fn event(
        state: &mut Self,
        _: &wl_pointer::WlPointer,
        event: wl_pointer::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            wl_pointer::Event::Enter { surface, .. } => {
                let window = surface.data::<SurfaceData>().map(|d| d.window);
                state.events.push(BackendEvent::PointerFocus { window });
            }
            wl_pointer::Event::Leave { .. } => {
                state.events.push(BackendEvent::PointerFocus { window: None });
            }
            wl_pointer::Event::Button {
                serial,
                state: WEnum::Value(wl_pointer::ButtonState::Pressed),
                ..
            } => {
                state.events.push(BackendEvent::PointerButton { serial });
            }
            _ => {}
        }
    }
}

impl Dispatch<wl_surface::WlSurface, SurfaceData> for EventSink {
    fn event(
        _: &mut Self,
        _: &wl_surface::WlSurface,
        _: wl_surface::Event,
        _: &SurfaceData,
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
    }
}

impl Dispatch<wl_compositor::WlCompositor, ()> for EventSink {
    fn event(
        _: &mut Self,
        _: &wl_compositor::WlCompositor,
        _: wl_compositor::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
    }
}

impl Dispatch<wl_subcompositor::WlSubcompositor, ()> for EventSink {
    fn event(
        _: &mut Self,
        _: &wl_subcompositor::WlSubcompositor,
        _: wl_subcompositor::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
    }
}

impl Dispatch<wl_subsurface::WlSubsurface, ()> for EventSink {
    fn event(
        _: &mut Self,
        _: &wl_subsurface::WlSubsurface,
        _: wl_subsurface::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(states: &[xdg_toplevel::State]) -> Vec<u8> {
        states.iter().flat_map(|s| (*s as u32).to_ne_bytes()).collect()
    }

    #[test]
    fn test_decode_states() {
        assert_eq!(decode_states(&[]), ConfigState::empty());
        assert_eq!(
            decode_states(&encode(&[xdg_toplevel::State::Maximized, xdg_toplevel::State::Activated])),
            ConfigState::MAXIMIZED
        );
        assert_eq!(
            decode_states(&encode(&[xdg_toplevel::State::Fullscreen, xdg_toplevel::State::Resizing])),
            ConfigState::FULLSCREEN | ConfigState::RESIZING
        );
        assert_eq!(
            decode_states(&encode(&[xdg_toplevel::State::TiledLeft, xdg_toplevel::State::TiledBottom])),
            ConfigState::TILED
        );
    }

    #[test]
    fn test_decode_ignores_unknown_and_trailing_bytes() {
        let mut raw = 9999u32.to_ne_bytes().to_vec();
        raw.extend_from_slice(&encode(&[xdg_toplevel::State::Maximized]));
        raw.push(0xff);
        assert_eq!(decode_states(&raw), ConfigState::MAXIMIZED);
    }
}
