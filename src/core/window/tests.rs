#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use crate::config::DriverConfig;
    use crate::core::presentation::PresentationSurface;
    use crate::core::surface::{CompositorSurface, ConfigState, SharedSurface};
    use crate::core::window::focus::PointerFocus;
    use crate::core::window::resize::ResizeEdge;
    use crate::core::window::{managed, topology, Registry, WindowRects};
    use crate::platform::stub::{StubWindowSystem, DESKTOP, MESSAGE_ROOT};
    use crate::platform::{ExStyle, SetPosFlags, WindowHandle, WindowStyle, WindowSystem};
    use crate::tests::harness::{Call, CallLog, RecordingCompositor, RecordingPresentation, CAPTIONED};
    use crate::util::geometry::Rect;

    const RECT: Rect = Rect::new(0, 0, 800, 600);

    fn rects() -> WindowRects {
        WindowRects::uniform(RECT)
    }

    #[test]
    fn test_create_and_get() {
        let ws = StubWindowSystem::new();
        let registry = Registry::new();
        let top = ws.add_window(DESKTOP, CAPTIONED, RECT, "top");

        let record = registry.create(&ws, top, &rects()).unwrap();
        assert_eq!(record.handle, top);
        assert_eq!(record.window_rect, RECT);
        record.release();

        assert!(registry.get(top).is_some());
        assert!(registry.get(WindowHandle(0x999)).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_no_record_for_desktop_or_message_windows() {
        let ws = StubWindowSystem::new();
        let registry = Registry::new();
        let message_only = ws.add_window(MESSAGE_ROOT, WindowStyle::empty(), RECT, "");

        assert!(registry.create(&ws, DESKTOP, &rects()).is_none());
        assert!(registry.create(&ws, message_only, &rects()).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_create_returns_existing_record() {
        let ws = StubWindowSystem::new();
        let registry = Registry::new();
        let top = ws.add_window(DESKTOP, CAPTIONED, RECT, "top");

        registry.create(&ws, top, &rects()).unwrap().managed = true;
        let again = registry
            .create(&ws, top, &WindowRects::uniform(Rect::new(0, 0, 10, 10)))
            .unwrap();
        // The first record wins; the second allocation is discarded.
        assert!(again.managed);
        assert_eq!(again.window_rect, RECT);
    }

    #[test]
    fn test_concurrent_create_converges() {
        let ws = StubWindowSystem::new();
        let registry = Registry::new();
        let top = ws.add_window(DESKTOP, CAPTIONED, RECT, "top");

        thread::scope(|s| {
            for i in 0..8 {
                let (ws, registry) = (&ws, &registry);
                s.spawn(move || {
                    for _ in 0..100 {
                        let rect = Rect::new(0, 0, 100 + i, 100);
                        let record = registry.create(ws, top, &WindowRects::uniform(rect));
                        assert!(record.is_some());
                    }
                });
            }
        });

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_destroy_detaches_presentation_before_surface() {
        let ws = StubWindowSystem::new();
        let registry = Registry::new();
        let log: CallLog = Default::default();
        let compositor = Arc::new(RecordingCompositor::new(log.clone()));
        let top = ws.add_window(DESKTOP, CAPTIONED, RECT, "top");
        let presentation = RecordingPresentation::new(top, log.clone());

        {
            let mut record = registry.create(&ws, top, &rects()).unwrap();
            let surface = CompositorSurface::create(compositor.clone(), top).unwrap();
            record.surface = Some(SharedSurface::new(surface));
            record.presentation = Some(presentation.clone() as Arc<dyn PresentationSurface>);
        }

        let record = registry.get(top).unwrap();
        registry.destroy(record);

        assert!(registry.get(top).is_none());
        assert_eq!(presentation.bound(), None);
        let calls = log.lock().unwrap().clone();
        let unbind = calls.iter().position(|c| *c == Call::Bind(top, None)).unwrap();
        let destroy = calls.iter().position(|c| matches!(c, Call::Destroy(_))).unwrap();
        assert!(unbind < destroy);
    }

    #[test]
    fn test_for_each_descendant() {
        let ws = StubWindowSystem::new();
        let registry = Registry::new();
        let top = ws.add_window(DESKTOP, CAPTIONED, RECT, "top");
        let child = ws.add_window(top, WindowStyle::CHILD, RECT, "");
        let grandchild = ws.add_window(child, WindowStyle::CHILD, RECT, "");
        let other = ws.add_window(DESKTOP, CAPTIONED, RECT, "other");
        for w in [top, child, grandchild, other] {
            registry.create(&ws, w, &rects()).unwrap();
        }

        let mut visited = Vec::new();
        registry.lock().for_each_descendant(&ws, top, |_, w| visited.push(w));
        assert_eq!(visited, vec![child, grandchild]);
    }

    #[test]
    fn test_top_level_anchor() {
        let ws = StubWindowSystem::new();
        let registry = Registry::new();
        let top = ws.add_window(DESKTOP, CAPTIONED, RECT, "top");
        let child = ws.add_window(top, WindowStyle::CHILD, RECT, "");
        let grandchild = ws.add_window(child, WindowStyle::CHILD, RECT, "");

        assert_eq!(topology::top_level_window(&ws, top), None);
        assert_eq!(topology::top_level_window(&ws, grandchild), Some(top));

        let guard = registry.lock();
        assert!(topology::top_level_anchor(&ws, &guard, grandchild).is_none());
        drop(guard);

        registry.create(&ws, top, &rects()).unwrap();
        let guard = registry.lock();
        assert_eq!(topology::top_level_anchor(&ws, &guard, grandchild).map(|r| r.handle), Some(top));
    }

    #[test]
    fn test_needs_surface() {
        let ws = StubWindowSystem::new();
        let registry = Registry::new();
        let compositor = RecordingCompositor::standalone();
        let top = ws.add_window(DESKTOP, CAPTIONED, RECT, "top");
        let child = ws.add_window(top, WindowStyle::CHILD | WindowStyle::VISIBLE, RECT, "");
        registry.create(&ws, top, &rects()).unwrap();
        registry.create(&ws, child, &rects()).unwrap();

        {
            let guard = registry.lock();
            let anchor = topology::top_level_anchor(&ws, &guard, child);
            assert!(topology::needs_surface(&ws, guard.get(top).unwrap(), None));
            assert!(!topology::needs_surface(&ws, guard.get(child).unwrap(), anchor));
        }

        // A client surface on the anchor may cover the child.
        let mut anchor_surface = CompositorSurface::create(compositor.clone(), top).unwrap();
        anchor_surface.make_toplevel().unwrap();
        let client = crate::core::presentation::ClientSurface::create(compositor.clone(), top).unwrap();
        anchor_surface.attach_client(client);
        registry.lock().get_mut(top).unwrap().surface = Some(SharedSurface::new(anchor_surface));

        let guard = registry.lock();
        let anchor = topology::top_level_anchor(&ws, &guard, child);
        assert!(topology::needs_surface(&ws, guard.get(child).unwrap(), anchor));
    }

    #[test]
    fn test_managed_heuristic() {
        let ws = StubWindowSystem::new();
        let registry = Registry::new();
        let quiet = SetPosFlags::NO_ACTIVATE;

        let child = ws.add_window(DESKTOP, WindowStyle::CHILD, RECT, "");
        assert!(!managed::is_window_managed(&ws, &registry, child, SetPosFlags::empty(), &RECT));

        let plain = ws.add_window(DESKTOP, WindowStyle::VISIBLE, RECT, "");
        assert!(managed::is_window_managed(&ws, &registry, plain, SetPosFlags::empty(), &RECT));
        assert!(!managed::is_window_managed(&ws, &registry, plain, quiet, &RECT));
        assert!(!managed::is_window_managed(&ws, &registry, plain, SetPosFlags::HIDE_WINDOW, &RECT));

        ws.set_active(Some(plain));
        assert!(managed::is_window_managed(&ws, &registry, plain, quiet, &RECT));
        ws.set_active(None);

        let captioned = ws.add_window(DESKTOP, WindowStyle::CAPTION, RECT, "");
        assert!(managed::is_window_managed(&ws, &registry, captioned, quiet, &RECT));
        let border_only = ws.add_window(DESKTOP, WindowStyle::BORDER, RECT, "");
        assert!(!managed::is_window_managed(&ws, &registry, border_only, quiet, &RECT));
        let thick = ws.add_window(DESKTOP, WindowStyle::THICKFRAME, RECT, "");
        assert!(managed::is_window_managed(&ws, &registry, thick, quiet, &RECT));

        let menu_popup = ws.add_window(DESKTOP, WindowStyle::POPUP | WindowStyle::SYSMENU, RECT, "");
        assert!(managed::is_window_managed(&ws, &registry, menu_popup, quiet, &RECT));
        let popup = ws.add_window(DESKTOP, WindowStyle::POPUP, RECT, "");
        assert!(!managed::is_window_managed(&ws, &registry, popup, quiet, &RECT));
        let work_area = Rect::new(0, 0, 1920, 1040);
        assert!(managed::is_window_managed(&ws, &registry, popup, quiet, &work_area));

        let app = ws.add_window(DESKTOP, WindowStyle::empty(), RECT, "");
        ws.set_ex_style(app, ExStyle::APP_WINDOW);
        assert!(managed::is_window_managed(&ws, &registry, app, quiet, &RECT));
    }

    #[test]
    fn test_owner_of_managed_popup_is_managed() {
        let ws = StubWindowSystem::new();
        let registry = Registry::new();
        let owner = ws.add_window(DESKTOP, WindowStyle::empty(), RECT, "");
        let popup = ws.add_window(DESKTOP, WindowStyle::POPUP | WindowStyle::SYSMENU, RECT, "");
        ws.set_owner(popup, Some(owner));

        assert!(!managed::has_owned_popups(&ws, &registry, owner));

        registry.create(&ws, popup, &rects()).unwrap().managed = true;
        assert!(managed::has_owned_popups(&ws, &registry, owner));
        assert!(managed::is_window_managed(&ws, &registry, owner, SetPosFlags::NO_ACTIVATE, &RECT));
    }

    #[test]
    fn test_window_state_inference() {
        let ws = StubWindowSystem::new();
        let registry = Registry::new();
        let config = DriverConfig::default();
        let monitor = Rect::new(0, 0, 1920, 1080);
        let window = ws.add_window(DESKTOP, CAPTIONED, RECT, "");
        let mut record = registry.create(&ws, window, &rects()).unwrap();

        let conf = record.window_config(&ws, &config);
        assert_eq!(conf.state, ConfigState::empty());
        assert!(conf.visible);
        assert_eq!(conf.scale, 1.0);

        ws.set_style(window, CAPTIONED | WindowStyle::MAXIMIZE);
        assert_eq!(record.window_config(&ws, &config).state, ConfigState::MAXIMIZED);

        record.set_rects(&WindowRects::uniform(monitor));
        assert_eq!(record.window_config(&ws, &config).state, ConfigState::MAXIMIZED);

        ws.set_style(window, WindowStyle::VISIBLE | WindowStyle::POPUP);
        assert_eq!(record.window_config(&ws, &config).state, ConfigState::FULLSCREEN);

        ws.set_style(window, WindowStyle::POPUP | WindowStyle::MINIMIZE);
        let conf = record.window_config(&ws, &config);
        assert_eq!(conf.state, ConfigState::empty());
        assert!(!conf.visible);

        ws.set_dpi(window, 144);
        assert_eq!(record.window_config(&ws, &config).scale, 1.5);
    }

    #[test]
    fn test_pointer_focus_serial() {
        let mut focus = PointerFocus::new();
        let (a, b) = (WindowHandle(0x10), WindowHandle(0x11));

        focus.record_button(5);
        assert_eq!(focus.serial_for(a), None);

        focus.set_focus(Some(a));
        assert_eq!(focus.serial_for(a), None);
        focus.record_button(7);
        assert_eq!(focus.serial_for(a), Some(7));
        assert_eq!(focus.serial_for(b), None);

        focus.set_focus(Some(b));
        assert_eq!(focus.serial_for(a), None);
        assert_eq!(focus.serial_for(b), None);
        focus.record_button(9);
        assert_eq!(focus.serial_for(b), Some(9));
    }

    #[test]
    fn test_resize_edge_from_sizing_edge() {
        assert_eq!(ResizeEdge::from_sizing_edge(1), ResizeEdge::Left);
        assert_eq!(ResizeEdge::from_sizing_edge(5), ResizeEdge::TopRight);
        assert_eq!(ResizeEdge::from_sizing_edge(8), ResizeEdge::BottomRight);
        assert_eq!(ResizeEdge::from_sizing_edge(0), ResizeEdge::None);
        assert_eq!(ResizeEdge::from_sizing_edge(9), ResizeEdge::None);
    }
}
