//! Engine callbacks to host notifications.
//!
//! The engine calls into [`ClientBridge`] from its own threads. Paints go straight into
//! the [`FrameBuffer`], view size and cursor live in [`ViewState`]; everything else is
//! queued as a [`WebViewEvent`] on an unbounded channel. The control drains the queue
//! through [`EventRelay::drain`] once per render tick and hands each event to the
//! registered observers, so observers always run on the render thread and in arrival
//! order.

use crate::engine::backend::SessionId;
use crate::engine::client::{BeforeDownloadCallback, DownloadItem, DownloadItemCallback, EngineClient, FrameInfo};
use crate::engine::events::{CursorKind, EventResponse, LoadState, WebViewEvent};
use crate::render::{FrameBuffer, PaintElementType, PixelRect, ViewSize};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Handle returned by [`EventRelay::subscribe`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

type Observer = Box<dyn FnMut(&WebViewEvent) -> EventResponse>;

/// State the engine reads and writes from its own threads.
#[derive(Debug, Default)]
pub struct ViewState {
    size: RwLock<ViewSize>,
    cursor: RwLock<CursorKind>,
}

impl ViewState {
    pub fn size(&self) -> ViewSize {
        *self.size.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_size(&self, size: ViewSize) {
        *self.size.write().unwrap_or_else(PoisonError::into_inner) = size;
    }

    pub fn cursor(&self) -> CursorKind {
        *self.cursor.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_cursor(&self, cursor: CursorKind) {
        *self.cursor.write().unwrap_or_else(PoisonError::into_inner) = cursor;
    }
}

/// The [`EngineClient`] registered with every session.
pub struct ClientBridge {
    frames: Arc<FrameBuffer>,
    view: Arc<ViewState>,
    events: mpsc::UnboundedSender<WebViewEvent>,
}

impl ClientBridge {
    pub fn new(frames: Arc<FrameBuffer>, view: Arc<ViewState>, events: mpsc::UnboundedSender<WebViewEvent>) -> Self {
        Self { frames, view, events }
    }

    fn send(&self, event: WebViewEvent) {
        if let Err(e) = self.events.send(event) {
            // Receiver is gone when the control was dropped before the engine settled
            log::trace!("client bridge: dropping {}", e.0.name());
        }
    }
}

impl EngineClient for ClientBridge {
    fn on_after_created(&self, session: SessionId) {
        self.send(WebViewEvent::SessionCreated { session });
    }

    fn get_view_rect(&self) -> PixelRect {
        PixelRect::from_size(self.view.size())
    }

    fn get_screen_point(&self, x: i32, y: i32) -> (i32, i32) {
        // The simulated screen is the view rect, so popups stay inside the view
        (x, y)
    }

    fn on_paint(&self, kind: PaintElementType, dirty_rects: &[PixelRect], pixels: &[u8], width: u32, height: u32) {
        if kind == PaintElementType::View {
            let view = self.view.size();
            if view != ViewSize::new(width, height) {
                log::trace!("client bridge: stale {}x{} paint for {:?} view", width, height, view);
                return;
            }
        }

        if let Err(e) = self.frames.on_engine_paint(kind, dirty_rects, pixels, width, height) {
            log::warn!("client bridge: paint rejected: {}", e);
        }
    }

    fn on_cursor_change(&self, cursor: CursorKind) {
        self.view.set_cursor(cursor);
        self.send(WebViewEvent::CursorChanged { cursor });
    }

    fn on_title_change(&self, title: &str) {
        self.send(WebViewEvent::TitleChanged {
            title: title.to_string(),
        });
    }

    fn on_address_change(&self, frame: &FrameInfo, url: &str) {
        self.send(WebViewEvent::AddressChanged {
            frame: frame.clone(),
            url: url.to_string(),
        });
    }

    fn on_target_url_change(&self, url: &str) {
        self.send(WebViewEvent::TargetUrlChanged { url: url.to_string() });
    }

    fn on_tooltip(&self, text: &str) -> bool {
        self.send(WebViewEvent::Tooltip { text: text.to_string() });
        false
    }

    fn on_loading_state_change(&self, state: LoadState) {
        self.send(WebViewEvent::LoadingStateChanged(state));
    }

    fn on_load_start(&self, frame: &FrameInfo) {
        self.send(WebViewEvent::LoadStart { frame: frame.clone() });
    }

    fn on_load_end(&self, frame: &FrameInfo, http_status: i32) {
        self.send(WebViewEvent::LoadEnd {
            frame: frame.clone(),
            http_status,
        });
    }

    fn on_load_error(&self, frame: &FrameInfo, error_code: i32, error_text: &str, failed_url: &str) {
        self.send(WebViewEvent::LoadError {
            frame: frame.clone(),
            error_code,
            error_text: error_text.to_string(),
            failed_url: failed_url.to_string(),
        });
    }

    fn on_before_popup(&self, target_url: &str) -> bool {
        // Never open a native window. The control decides what happens when it drains the event.
        self.send(WebViewEvent::BeforePopup {
            target_url: target_url.to_string(),
        });
        true
    }

    fn on_before_download(&self, item: &DownloadItem, suggested_name: &str, callback: Arc<dyn BeforeDownloadCallback>) {
        self.send(WebViewEvent::DownloadBefore {
            item: item.clone(),
            suggested_name: suggested_name.to_string(),
            callback,
        });
    }

    fn on_download_updated(&self, item: &DownloadItem, callback: Arc<dyn DownloadItemCallback>) {
        self.send(WebViewEvent::DownloadUpdated {
            item: item.clone(),
            callback,
        });
    }
}

/// Queue of engine notifications plus the observers they fan out to.
pub struct EventRelay {
    tx: mpsc::UnboundedSender<WebViewEvent>,
    rx: mpsc::UnboundedReceiver<WebViewEvent>,
    observers: Vec<(SubscriptionId, Observer)>,
}

impl Default for EventRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRelay {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            observers: Vec::new(),
        }
    }

    /// A client for a new session, feeding this relay.
    pub fn bridge(&self, frames: Arc<FrameBuffer>, view: Arc<ViewState>) -> Arc<ClientBridge> {
        Arc::new(ClientBridge::new(frames, view, self.tx.clone()))
    }

    /// Registers an observer. Observers see every event, in registration order.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&WebViewEvent) -> EventResponse + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes an observer. Returns false for unknown ids.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Takes every queued event without blocking.
    pub fn drain(&mut self) -> Vec<WebViewEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Hands the event to all observers. Returns true when any of them handled it.
    pub fn dispatch(&mut self, event: &WebViewEvent) -> bool {
        let mut handled = false;
        for (_, observer) in self.observers.iter_mut() {
            if observer(event) == EventResponse::Handled {
                handled = true;
            }
        }
        handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;
    use std::sync::Mutex;
    use std::thread;

    /// Engine side of the download callbacks; remembers every decision.
    #[derive(Debug, Default)]
    struct RecordingCallback {
        decisions: Mutex<Vec<String>>,
    }

    impl RecordingCallback {
        fn record(&self, decision: String) {
            self.decisions.lock().unwrap().push(decision);
        }

        fn decisions(&self) -> Vec<String> {
            self.decisions.lock().unwrap().clone()
        }
    }

    impl BeforeDownloadCallback for RecordingCallback {
        fn accept(&self, path: Option<&Path>, show_dialog: bool) {
            let path = path.map(|p| p.display().to_string()).unwrap_or_default();
            self.record(format!("accept {} {}", path, show_dialog));
        }

        fn cancel(&self) {
            self.record("cancel download".into());
        }
    }

    impl DownloadItemCallback for RecordingCallback {
        fn resume(&self) {
            self.record("resume".into());
        }

        fn pause(&self) {
            self.record("pause".into());
        }

        fn cancel(&self) {
            self.record("cancel item".into());
        }
    }

    fn drain_into_observers(relay: &mut EventRelay) {
        for event in relay.drain() {
            relay.dispatch(&event);
        }
    }

    fn relay_with_bridge(size: ViewSize) -> (EventRelay, Arc<ClientBridge>, Arc<FrameBuffer>, Arc<ViewState>) {
        let relay = EventRelay::new();
        let frames = Arc::new(FrameBuffer::new());
        let view = Arc::new(ViewState::default());
        view.set_size(size);
        let bridge = relay.bridge(frames.clone(), view.clone());
        (relay, bridge, frames, view)
    }

    #[test]
    fn events_arrive_in_order_from_other_threads() {
        let (mut relay, bridge, _, _) = relay_with_bridge(ViewSize::new(1, 1));

        let worker = {
            let bridge = bridge.clone();
            thread::spawn(move || {
                bridge.on_title_change("one");
                bridge.on_load_start(&FrameInfo::main("https://example.com"));
                bridge.on_title_change("two");
            })
        };
        worker.join().unwrap();

        let names: Vec<_> = relay.drain().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["TitleChanged", "LoadStart", "TitleChanged"]);
        assert!(relay.drain().is_empty());
    }

    #[test]
    fn all_observers_see_every_event() {
        let (mut relay, bridge, _, _) = relay_with_bridge(ViewSize::new(1, 1));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let a = seen.clone();
        relay.subscribe(move |e| {
            a.borrow_mut().push(format!("a:{}", e.name()));
            EventResponse::Handled
        });
        let b = seen.clone();
        relay.subscribe(move |e| {
            b.borrow_mut().push(format!("b:{}", e.name()));
            EventResponse::Ignored
        });

        bridge.on_target_url_change("https://example.com/link");
        for event in relay.drain() {
            assert!(relay.dispatch(&event));
        }
        assert_eq!(*seen.borrow(), vec!["a:TargetUrlChanged", "b:TargetUrlChanged"]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut relay = EventRelay::new();
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        let id = relay.subscribe(move |_| {
            *c.borrow_mut() += 1;
            EventResponse::Ignored
        });

        let event = WebViewEvent::TitleChanged { title: "t".into() };
        assert!(!relay.dispatch(&event));
        assert!(relay.unsubscribe(id));
        assert!(!relay.unsubscribe(id));
        relay.dispatch(&event);

        assert_eq!(*count.borrow(), 1);
        assert_eq!(relay.observer_count(), 0);
    }

    #[test]
    fn popups_are_always_suppressed_and_tooltips_declined() {
        let (mut relay, bridge, _, _) = relay_with_bridge(ViewSize::new(1, 1));
        assert!(bridge.on_before_popup("https://example.com/popup"));
        assert!(!bridge.on_tooltip("hint"));

        let events = relay.drain();
        assert!(matches!(&events[0], WebViewEvent::BeforePopup { target_url } if target_url == "https://example.com/popup"));
        assert!(matches!(&events[1], WebViewEvent::Tooltip { text } if text == "hint"));
    }

    #[test]
    fn download_decisions_reach_the_engine() {
        let (mut relay, bridge, _, _) = relay_with_bridge(ViewSize::new(1, 1));
        let names = Rc::new(RefCell::new(Vec::new()));

        let n = names.clone();
        relay.subscribe(move |e| {
            match e {
                WebViewEvent::DownloadBefore {
                    item,
                    suggested_name,
                    callback,
                } => {
                    n.borrow_mut().push(suggested_name.clone());
                    if item.id == 1 {
                        callback.accept(Some(Path::new("/downloads/report.pdf")), false);
                    } else {
                        callback.cancel();
                    }
                }
                WebViewEvent::DownloadUpdated { item, callback } => {
                    if item.is_in_progress {
                        callback.pause();
                        callback.resume();
                    } else {
                        callback.cancel();
                    }
                }
                _ => return EventResponse::Ignored,
            }
            EventResponse::Handled
        });

        let engine = Arc::new(RecordingCallback::default());
        let report = DownloadItem {
            id: 1,
            url: "https://example.com/report.pdf".into(),
            mime_type: "application/pdf".into(),
            total_bytes: 1024,
            percent_complete: -1,
            ..DownloadItem::default()
        };
        let other = DownloadItem {
            id: 2,
            ..report.clone()
        };

        bridge.on_before_download(&report, "report.pdf", engine.clone());
        bridge.on_before_download(&other, "other.zip", engine.clone());
        bridge.on_download_updated(
            &DownloadItem {
                received_bytes: 512,
                percent_complete: 50,
                is_in_progress: true,
                ..report.clone()
            },
            engine.clone(),
        );
        bridge.on_download_updated(&other, engine.clone());

        // Nothing is decided before the render tick drains the queue
        assert!(engine.decisions().is_empty());
        drain_into_observers(&mut relay);

        assert_eq!(*names.borrow(), vec!["report.pdf", "other.zip"]);
        assert_eq!(
            engine.decisions(),
            vec![
                "accept /downloads/report.pdf false",
                "cancel download",
                "pause",
                "resume",
                "cancel item",
            ]
        );
    }

    #[test]
    fn load_errors_reach_observers() {
        let (mut relay, bridge, _, _) = relay_with_bridge(ViewSize::new(1, 1));
        let seen = Rc::new(RefCell::new(None));

        let s = seen.clone();
        relay.subscribe(move |e| {
            if let WebViewEvent::LoadError {
                frame,
                error_code,
                error_text,
                failed_url,
            } = e
            {
                *s.borrow_mut() = Some((frame.is_main, *error_code, error_text.clone(), failed_url.clone()));
            }
            EventResponse::Ignored
        });

        bridge.on_load_error(
            &FrameInfo::main("https://nope.invalid/"),
            -105,
            "ERR_NAME_NOT_RESOLVED",
            "https://nope.invalid/",
        );
        drain_into_observers(&mut relay);

        assert_eq!(
            *seen.borrow(),
            Some((
                true,
                -105,
                "ERR_NAME_NOT_RESOLVED".to_string(),
                "https://nope.invalid/".to_string()
            ))
        );
    }

    #[test]
    fn view_rect_and_screen_point() {
        let (_, bridge, _, view) = relay_with_bridge(ViewSize::new(640, 480));
        assert_eq!(bridge.get_view_rect(), PixelRect::new(0, 0, 640, 480));
        view.set_size(ViewSize::new(320, 240));
        assert_eq!(bridge.get_view_rect(), PixelRect::new(0, 0, 320, 240));
        assert_eq!(bridge.get_screen_point(10, 20), (10, 20));
    }

    #[test]
    fn stale_paints_are_dropped() {
        let (_, bridge, frames, _) = relay_with_bridge(ViewSize::new(4, 4));

        bridge.on_paint(PaintElementType::View, &[], &[0u8; 8 * 8 * 4], 8, 8);
        assert!(frames.snapshot().is_none());

        bridge.on_paint(PaintElementType::View, &[], &[1u8; 4 * 4 * 4], 4, 4);
        assert_eq!(frames.snapshot().unwrap().size, ViewSize::new(4, 4));
    }

    #[test]
    fn cursor_is_written_immediately() {
        let (mut relay, bridge, _, view) = relay_with_bridge(ViewSize::new(1, 1));
        bridge.on_cursor_change(CursorKind::Hand);

        assert_eq!(view.cursor(), CursorKind::Hand);
        assert!(matches!(
            relay.drain()[0],
            WebViewEvent::CursorChanged {
                cursor: CursorKind::Hand
            }
        ));
    }

    #[test]
    fn bridge_outliving_relay_does_not_panic() {
        let (relay, bridge, _, _) = relay_with_bridge(ViewSize::new(1, 1));
        drop(relay);
        bridge.on_title_change("late");
        bridge.on_load_end(&FrameInfo::main("about:blank"), 200);
    }
}
