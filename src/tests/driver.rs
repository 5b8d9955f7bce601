use std::sync::Arc;

use crate::core::driver::{DriverMessage, SysCommand, SysCommandResult};
use crate::core::protocol::{BackendEvent, SurfaceId};
use crate::core::surface::{ConfigState, Configuration, SurfaceRole};
use crate::core::window::resize::ResizeEdge;
use crate::platform::stub::DESKTOP;
use crate::platform::{SetPosFlags, SizeMove, WindowStyle, WindowSystem};
use crate::tests::harness::{Call, TestEnv, CAPTIONED};
use crate::util::geometry::Rect;

const RECT: Rect = Rect::new(0, 0, 800, 600);
const MONITOR: Rect = Rect::new(0, 0, 1920, 1080);

#[test]
fn test_toplevel_creation() {
    let env = TestEnv::new();
    let window = env.toplevel(RECT, "Notepad");

    let surface = env.driver.surface_for(window).unwrap();
    let surface = surface.lock();
    assert_eq!(surface.role(), SurfaceRole::Toplevel);
    assert!(surface.current.state.is_empty());
    assert_eq!(
        env.calls(),
        vec![
            Call::Create(SurfaceId(1), window),
            Call::Toplevel(SurfaceId(1)),
            Call::Title(SurfaceId(1), "Notepad".to_string()),
        ]
    );
}

#[test]
fn test_title_is_truncated() {
    let env = TestEnv::new();
    let long = "x".repeat(2000);
    let window = env.toplevel(RECT, &long);
    let id = env.surface_id(window).unwrap();

    let expected = "x".repeat(env.driver.config().max_title_len);
    assert!(env.calls().contains(&Call::Title(id, expected)));

    env.clear();
    env.driver.set_window_text(window, "Renamed");
    assert_eq!(env.calls(), vec![Call::Title(id, "Renamed".to_string())]);
}

#[test]
fn test_window_pos_changing() {
    let env = TestEnv::new();
    let top = env.toplevel(RECT, "top");
    let child = env.child(top, Rect::new(10, 10, 100, 100));
    let rects = crate::core::window::WindowRects::uniform(RECT);

    assert!(env.driver.window_pos_changing(top, &rects));
    assert!(!env.driver.window_pos_changing(child, &rects));
    assert!(!env.driver.window_pos_changing(DESKTOP, &rects));
}

#[test]
fn test_hidden_window_has_no_role() {
    let env = TestEnv::new();
    let window = env
        .windows
        .add_window(DESKTOP, CAPTIONED - WindowStyle::VISIBLE, RECT, "hidden");
    env.update(window);

    let id = env.surface_id(window).unwrap();
    assert_eq!(env.compositor.role_of(id), SurfaceRole::None);

    env.windows.set_visible(window, true);
    env.update(window);
    assert_eq!(env.compositor.role_of(id), SurfaceRole::Toplevel);

    env.windows.set_visible(window, false);
    env.update(window);
    assert_eq!(env.compositor.role_of(id), SurfaceRole::None);
    // The surface itself survives a hide.
    assert_eq!(env.surface_id(window), Some(id));
}

#[test]
fn test_child_without_client_gets_no_surface() {
    let env = TestEnv::new();
    let top = env.toplevel(RECT, "top");
    let child = env.child(top, Rect::new(10, 10, 100, 100));
    assert!(env.driver.surface_for(child).is_none());

    // Forced for accelerated content, then dropped on the next update.
    let forced = env.driver.accel_surface_for(child).unwrap();
    let child_id = forced.lock().id();
    assert_eq!(forced.lock().role(), SurfaceRole::Subsurface);
    drop(forced);

    env.clear();
    env.update(child);
    assert!(env.driver.surface_for(child).is_none());
    assert_eq!(env.calls(), vec![Call::ClearRole(child_id), Call::Destroy(child_id)]);
}

#[test]
fn test_child_of_untracked_top_level_is_not_forced() {
    let env = TestEnv::new();
    // Never updated, so the driver has no record for it.
    let top = env.windows.add_window(DESKTOP, CAPTIONED, RECT, "top");
    let child = env.child(top, Rect::new(10, 10, 100, 100));
    assert!(env.driver.registry().get(top).is_none());
    assert!(env.driver.registry().get(child).is_some());

    assert!(env.driver.accel_surface_for(child).is_none());
    let client = env.driver.create_client_surface(child).unwrap();
    assert!(!env.driver.attach_client_surface(child, client));
    assert!(env.driver.surface_for(child).is_none());
    assert!(!env.calls().iter().any(|call| matches!(call, Call::Toplevel(_))));
}

#[test]
fn test_child_with_client_surface_is_anchored() {
    let env = TestEnv::new();
    let top = env.toplevel(RECT, "top");
    let child = env.child(top, Rect::new(10, 10, 100, 100));
    let top_id = env.surface_id(top).unwrap();

    let client = env.driver.create_client_surface(child).unwrap();
    assert!(env.driver.attach_client_surface(child, client.clone()));
    let child_id = env.surface_id(child).unwrap();
    assert!(env.calls().contains(&Call::Subsurface(child_id, top_id)));
    assert!(env.calls().contains(&Call::Subsurface(client.id(), child_id)));

    // The client keeps the child's surface alive across updates.
    env.update(child);
    assert_eq!(env.surface_id(child), Some(child_id));

    assert!(Arc::ptr_eq(&env.driver.detach_client_surface(child).unwrap(), &client));
    env.update(child);
    assert!(env.driver.surface_for(child).is_none());
    assert_eq!(env.compositor.role_violations(), 0);
}

#[test]
fn test_role_change_replaces_surface() {
    let env = TestEnv::new();
    let host = env.toplevel(RECT, "host");
    let window = env.windows.add_window(DESKTOP, CAPTIONED, RECT, "window");
    let presentation = env.present(window);
    env.update(window);

    let host_id = env.surface_id(host).unwrap();
    let old_id = env.surface_id(window).unwrap();
    let client = env.driver.create_client_surface(window).unwrap();
    assert!(env.driver.attach_client_surface(window, client.clone()));
    assert_eq!(presentation.bound(), Some(old_id));

    // Reparent under another top-level: toplevel -> subsurface.
    env.windows.set_parent(window, host);
    env.windows.set_style(window, WindowStyle::VISIBLE | WindowStyle::CHILD);
    env.clear();
    env.update(window);

    let new_id = env.surface_id(window).unwrap();
    assert_ne!(new_id, old_id);
    let surface = env.driver.surface_for(window).unwrap();
    assert_eq!(surface.lock().role(), SurfaceRole::Subsurface);
    assert!(surface.lock().has_client());
    assert_eq!(presentation.bound(), Some(new_id));

    let calls = env.calls();
    let pos = |call: &Call| calls.iter().position(|c| c == call).unwrap();
    assert!(pos(&Call::Bind(window, None)) < pos(&Call::Destroy(old_id)));
    assert!(pos(&Call::ClearRole(old_id)) < pos(&Call::Destroy(old_id)));
    assert!(pos(&Call::Destroy(old_id)) < pos(&Call::Create(new_id, window)));
    assert!(pos(&Call::Create(new_id, window)) < pos(&Call::Subsurface(new_id, host_id)));
    assert!(pos(&Call::Subsurface(new_id, host_id)) < pos(&Call::Subsurface(client.id(), new_id)));
    assert_eq!(env.compositor.role_violations(), 0);
}

#[test]
fn test_parent_visibility_propagates_to_children() {
    let env = TestEnv::new();
    let top = env.toplevel(RECT, "top");
    let child = env.child(top, Rect::new(10, 10, 100, 100));
    let client = env.driver.create_client_surface(child).unwrap();
    env.driver.attach_client_surface(child, client);
    let top_id = env.surface_id(top).unwrap();
    let child_id = env.surface_id(child).unwrap();

    env.windows.set_visible(top, false);
    env.update(top);
    assert_eq!(env.compositor.role_of(top_id), SurfaceRole::None);
    assert_eq!(env.compositor.role_of(child_id), SurfaceRole::None);

    env.clear();
    env.windows.set_visible(top, true);
    env.update(top);
    let calls = env.calls();
    let pos = |call: &Call| calls.iter().position(|c| c == call).unwrap();
    assert!(pos(&Call::Toplevel(top_id)) < pos(&Call::Subsurface(child_id, top_id)));
    assert_eq!(env.compositor.role_violations(), 0);
}

#[test]
fn test_configure_coalescing() {
    let env = TestEnv::new();
    let window = env.toplevel(RECT, "top");
    let id = env.surface_id(window).unwrap();

    env.driver.handle_configure(window, Configuration::new(5, 1920, 1080, ConfigState::MAXIMIZED));
    env.driver.handle_configure(window, Configuration::new(6, 1920, 1200, ConfigState::FULLSCREEN));
    assert_eq!(env.windows.take_posted().len(), 2);

    env.driver.window_message(window, DriverMessage::Configure);
    env.driver.window_message(window, DriverMessage::Configure);

    let surface = env.driver.surface_for(window).unwrap();
    assert_eq!(surface.lock().processing.serial, 6);
    assert_eq!(surface.lock().processing.state, ConfigState::FULLSCREEN);

    let sizes = env.windows.take_size_calls();
    assert_eq!(sizes.len(), 1);
    assert_eq!((sizes[0].width, sizes[0].height), (1920, 1200));
    assert!(!sizes[0].flags.contains(SetPosFlags::NO_SIZE));
    assert!(sizes[0].flags.contains(
        SetPosFlags::NO_MOVE | SetPosFlags::NO_ZORDER | SetPosFlags::NO_ACTIVATE | SetPosFlags::NO_SEND_CHANGING
    ));
    // The maximized snapshot never reached the window.
    assert!(!env.windows.style(window).contains(WindowStyle::MAXIMIZE));

    // The window follows; the configure is reconciled and acked on flush.
    env.update(window);
    assert!(surface.lock().processing.processed);
    env.driver.flush_window(window);
    assert_eq!(surface.lock().current.serial, 6);
    assert!(env.calls().contains(&Call::Ack(id, 6)));
    assert!(!env.calls().contains(&Call::Ack(id, 5)));
}

#[test]
fn test_configure_round_trip_through_messages() {
    let env = TestEnv::new();
    let window = env.toplevel(RECT, "top");
    let id = env.surface_id(window).unwrap();

    env.driver.handle_backend_event(BackendEvent::Configure {
        window,
        config: Configuration::new(2, 1920, 1040, ConfigState::MAXIMIZED),
    });
    env.pump();

    assert!(env.windows.style(window).contains(WindowStyle::MAXIMIZE));
    assert_eq!(env.windows.rect(window), Some(Rect::new(0, 0, 1920, 1040)));
    assert!(env.calls().contains(&Call::Ack(id, 2)));
    let surface = env.driver.surface_for(window).unwrap();
    assert_eq!(surface.lock().current.state, ConfigState::MAXIMIZED);

    // The window agrees with the compositor; nothing more to request.
    env.clear();
    env.update(window);
    assert!(env.calls().is_empty());
}

#[test]
fn test_interactive_resize_notifications() {
    let env = TestEnv::new();
    let window = env.toplevel(RECT, "top");

    env.driver.handle_configure(window, Configuration::new(1, 900, 600, ConfigState::RESIZING));
    env.pump();
    env.driver.handle_configure(window, Configuration::new(2, 900, 600, ConfigState::empty()));
    env.pump();

    assert_eq!(
        env.windows.size_moves(),
        vec![(window, SizeMove::Enter), (window, SizeMove::Exit)]
    );
}

#[test]
fn test_fullscreen_size_is_kept() {
    let env = TestEnv::new();
    let window = env
        .windows
        .add_window(DESKTOP, WindowStyle::VISIBLE | WindowStyle::POPUP, MONITOR, "game");
    env.update(window);
    let id = env.surface_id(window).unwrap();
    assert!(env.calls().contains(&Call::SetFullscreen(id)));

    env.driver.handle_configure(window, Configuration::new(3, 2560, 1440, ConfigState::FULLSCREEN));
    env.pump();

    let sizes = env.windows.take_size_calls();
    assert!(sizes.is_empty(), "size calls were fed back by pump");
    assert_eq!(env.windows.rect(window), Some(MONITOR));
    assert!(env.calls().contains(&Call::Ack(id, 3)));
}

#[test]
fn test_unset_before_set() {
    let env = TestEnv::new();
    let window = env.toplevel(RECT, "top");
    let id = env.surface_id(window).unwrap();

    env.driver.handle_configure(window, Configuration::new(2, 1920, 1040, ConfigState::MAXIMIZED));
    env.pump();

    // The application goes borderless fullscreen.
    env.windows.set_style(window, WindowStyle::VISIBLE | WindowStyle::POPUP);
    env.windows.set_rect(window, MONITOR);
    env.clear();
    env.update(window);

    assert_eq!(env.calls(), vec![Call::UnsetMaximized(id), Call::SetFullscreen(id)]);
}

#[test]
fn test_destroy_unbinds_presentation_first() {
    let env = TestEnv::new();
    let window = env.windows.add_window(DESKTOP, CAPTIONED, RECT, "top");
    let presentation = env.present(window);
    env.update(window);
    let id = env.surface_id(window).unwrap();
    assert_eq!(presentation.bound(), Some(id));

    env.clear();
    env.driver.destroy_window(window);

    assert_eq!(presentation.bound(), None);
    assert!(env.driver.registry().get(window).is_none());
    assert_eq!(
        env.calls(),
        vec![Call::Bind(window, None), Call::ClearRole(id), Call::Destroy(id)]
    );
}

#[test]
fn test_flush_forwards_to_presentation() {
    let env = TestEnv::new();
    let window = env.windows.add_window(DESKTOP, CAPTIONED, RECT, "top");
    env.present(window);
    env.update(window);
    env.clear();

    env.driver.flush_window(window);
    assert_eq!(env.calls(), vec![Call::Present(window)]);
}

#[test]
fn test_sys_command_needs_button_serial() {
    let env = TestEnv::new();
    let window = env.toplevel(RECT, "top");
    let id = env.surface_id(window).unwrap();
    env.clear();

    assert_eq!(env.driver.sys_command(window, SysCommand::Move), SysCommandResult::NotHandled);

    env.driver.handle_backend_event(BackendEvent::PointerFocus { window: Some(window) });
    env.driver.handle_backend_event(BackendEvent::PointerButton { serial: 42 });
    assert_eq!(env.driver.sys_command(window, SysCommand::Move), SysCommandResult::Handled);
    assert_eq!(
        env.driver.sys_command(window, SysCommand::from_wparam(0xF008)),
        SysCommandResult::Handled
    );
    assert_eq!(
        env.driver.sys_command(window, SysCommand::Other(0xF060)),
        SysCommandResult::NotHandled
    );
    assert_eq!(
        env.calls(),
        vec![Call::Move(id, 42), Call::Resize(id, 42, ResizeEdge::BottomRight)]
    );

    env.driver.pointer_focus(None);
    assert_eq!(env.driver.sys_command(window, SysCommand::Move), SysCommandResult::NotHandled);
}

#[test]
fn test_window_messages() {
    let env = TestEnv::new();
    let window = env.toplevel(RECT, "top");
    env.clear();

    env.driver.window_message(window, DriverMessage::from(0x0400));
    assert!(env.calls().is_empty());

    env.driver.window_message(window, DriverMessage::InitDisplayDevices);
    assert_eq!(env.windows.display_mode_changes(), 1);

    env.driver.window_message(window, DriverMessage::SetForeground);
    assert_eq!(env.windows.foreground_window(), Some(window));

    // Foreground windows get their cursor clip refreshed on updates.
    let before = env.windows.cursor_clip_reapplied();
    env.update(window);
    assert_eq!(env.windows.cursor_clip_reapplied(), before + 1);
}

#[test]
fn test_surface_creation_failure_falls_back() {
    let env = TestEnv::new();
    env.compositor.set_fail_create(true);
    let window = env.toplevel(RECT, "top");
    assert!(env.driver.surface_for(window).is_none());
    assert!(env.driver.registry().get(window).is_some());
}

#[test]
fn test_teardown() {
    let env = TestEnv::new();
    let a = env.toplevel(RECT, "a");
    let b = env.toplevel(RECT, "b");
    let (a_id, b_id) = (env.surface_id(a).unwrap(), env.surface_id(b).unwrap());

    env.driver.teardown();
    assert!(env.driver.registry().is_empty());
    assert!(env.calls().contains(&Call::Destroy(a_id)));
    assert!(env.calls().contains(&Call::Destroy(b_id)));
}
