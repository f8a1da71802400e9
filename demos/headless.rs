use gosub_webview::engine::backends::null::NullBrowser;
use gosub_webview::render::backends::null::NullTextureBackend;
use gosub_webview::render::{DisplayItem, NormalizedRect, Point, RenderList, ViewSize};
use gosub_webview::{
    ControlState, EngineRuntime, EventResponse, HostFrame, HostMouseButton, Platform, RuntimeSettings, WebView,
    WebViewConfig, WebViewEvent,
};
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // The null browser stands in for the real engine. It records every command and lets us
    // play the engine side by hand: finish session creation, paint frames, report titles.
    let browser = Arc::new(NullBrowser::new());

    // One runtime per process. We pretend to be on Linux so the demo behaves the same
    // everywhere.
    let runtime = Arc::new(EngineRuntime::new(
        browser.clone(),
        Platform::Linux,
        RuntimeSettings::default(),
    ));

    let config = WebViewConfig::builder()
        .start_url("https://gosub.io")
        .zoom(1.0)
        .build()?;

    let mut view = WebView::new(config, runtime, NullTextureBackend::new());

    // Print everything the engine tells us. Popups are opened in place by the control
    // unless an observer handles them.
    view.subscribe(|event: &WebViewEvent| {
        log::info!("event: {}", event.name());
        if let WebViewEvent::TitleChanged { title } = event {
            println!("title changed to '{}'", title);
        }
        EventResponse::Ignored
    });
    view.enable();

    // The control covers the left half of an 1280x720 viewport.
    let frame = HostFrame::new(
        ViewSize::new(1280, 720),
        NormalizedRect::new(0.0, 0.0, 0.5, 1.0),
        8192,
    );
    let mut canvas = RenderList::new(frame.viewport_size, true);

    // First tick creates the session. It is not usable until the engine confirms it.
    view.render(&mut canvas, &frame);
    println!("state after first tick: {:?}, view {:?}", view.session_state(), view.view_size());

    let Some(id) = view.session_id() else {
        anyhow::bail!("no session was created");
    };
    browser.complete_creation(id);

    // The engine paints at the size the control asked for.
    view.render(&mut canvas, &frame);
    browser.paint(id, 0x80);
    if let Some(client) = browser.client(id) {
        client.on_title_change("Gosub");
    }

    canvas.clear();
    view.render(&mut canvas, &frame);
    println!("state: {:?}, texture: {:?}", view.session_state(), view.texture());

    for item in &canvas.items {
        if let DisplayItem::Quad { rect, texture, .. } = item {
            println!("quad {:?} at {:?}", texture, rect);
        }
    }

    // Click into the page
    let state = ControlState {
        pointer: Point::new(0.5, 0.5),
        ..ControlState::default()
    };
    let outcome = view.on_pointer_down(&state, HostMouseButton::Left);
    println!("pointer down handled: {}, focus: {:?}", outcome.handled, outcome.focus);
    view.on_pointer_up(&state, HostMouseButton::Left);

    view.load_url("   https://example.com");

    println!("commands sent to the engine:");
    for call in browser.calls() {
        println!("  {:?}", call);
    }

    view.disable();
    println!("state after disable: {:?}", view.session_state());

    Ok(())
}
