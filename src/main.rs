use anyhow::Context;
use waydrv::core::wayland::WaylandConnection;
use waydrv::platform::stub::{StubWindowSystem, DESKTOP};
use waydrv::prelude::*;
use waydrv::util::logging::MAIN;
use waydrv::wlog;

fn main() -> anyhow::Result<()> {
    let config = DriverConfig::from_env();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", &config.log_filter);
    }
    // Initialize logging with standardized format
    tracing_subscriber::fmt()
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_ansi(false)
        .init();

    let connection = Arc::new(
        WaylandConnection::connect(config.display_name.as_deref()).context("Failed to connect to compositor")?,
    );

    // No native window system here: one captioned window in memory.
    let windows = Arc::new(StubWindowSystem::new());
    let style = WindowStyle::VISIBLE | WindowStyle::CAPTION | WindowStyle::SYSMENU | WindowStyle::THICKFRAME;
    let window = windows.add_window(DESKTOP, style, Rect::new(0, 0, 800, 600), "waydrv");

    let driver = Driver::new(windows.clone(), connection.clone(), config);

    let update = |flags: SetPosFlags| {
        let rects = WindowRects::uniform(windows.rect(window).unwrap_or_default());
        let presentation: Option<Arc<dyn PresentationSurface>> = None;
        driver.window_pos_changing(window, &rects);
        driver.window_pos_changed(window, flags, &rects, presentation);
    };

    update(SetPosFlags::empty());
    wlog!(MAIN, "Mapped window {}; waiting for compositor events", window);

    loop {
        let events = match connection.blocking_dispatch() {
            Ok(events) => events,
            Err(e) => {
                wlog!(MAIN, "Compositor connection closed: {}", e);
                break;
            }
        };
        for event in events {
            driver.handle_backend_event(event);
        }

        for (target, message) in windows.take_posted() {
            driver.window_message(target, message);
            for call in windows.take_size_calls() {
                tracing::info!("Window {} resized to {}x{}", call.window, call.width, call.height);
                update(SetPosFlags::NO_ACTIVATE);
            }
            driver.flush_window(target);
        }
    }

    driver.teardown();
    Ok(())
}
