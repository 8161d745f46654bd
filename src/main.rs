//! Valentine entry point
//!
//! Browser: wires DOM events, the Canvas 2D surface and the frame loop to
//! `Story`. Native: plays a scripted session against virtual time.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlCanvasElement,
        HtmlElement, MouseEvent, TouchEvent, Window,
    };

    use valentine::app::{ActiveStage, StageText};
    use valentine::renderer::CanvasSurface;
    use valentine::story::{CardVisual, scroll_to_center};
    use valentine::{Stage, Story, StoryConfig, StoryEvent, StoryInput};

    /// Event listener that unregisters itself on drop
    struct Listener {
        target: EventTarget,
        kind: &'static str,
        capture: bool,
        closure: Closure<dyn FnMut(Event)>,
    }

    impl Listener {
        fn new(
            target: &EventTarget,
            kind: &'static str,
            capture: bool,
            f: impl FnMut(Event) + 'static,
        ) -> Result<Self, JsValue> {
            let closure = Closure::<dyn FnMut(Event)>::new(f);
            target.add_event_listener_with_callback_and_bool(
                kind,
                closure.as_ref().unchecked_ref(),
                capture,
            )?;
            Ok(Self {
                target: target.clone(),
                kind,
                capture,
                closure,
            })
        }

        /// Bubble-phase listener allowed to call `prevent_default`
        ///
        /// Touch listeners on the document are passive unless told otherwise.
        fn active(
            target: &EventTarget,
            kind: &'static str,
            f: impl FnMut(Event) + 'static,
        ) -> Result<Self, JsValue> {
            let closure = Closure::<dyn FnMut(Event)>::new(f);
            let options = AddEventListenerOptions::new();
            options.set_passive(false);
            target.add_event_listener_with_callback_and_add_event_listener_options(
                kind,
                closure.as_ref().unchecked_ref(),
                &options,
            )?;
            Ok(Self {
                target: target.clone(),
                kind,
                capture: false,
                closure,
            })
        }
    }

    impl Drop for Listener {
        fn drop(&mut self) {
            let _ = self.target.remove_event_listener_with_callback_and_bool(
                self.kind,
                self.closure.as_ref().unchecked_ref(),
                self.capture,
            );
        }
    }

    /// requestAnimationFrame loop; the pending frame is cancelled on drop
    struct FrameLoop {
        window: Window,
        id: Rc<RefCell<Option<i32>>>,
        _closure: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
    }

    impl FrameLoop {
        fn start(window: &Window, mut on_frame: impl FnMut(f64) + 'static) -> Self {
            let id = Rc::new(RefCell::new(None));
            let closure: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> =
                Rc::new(RefCell::new(None));

            let id_loop = id.clone();
            let closure_loop = Rc::downgrade(&closure);
            let window_loop = window.clone();
            *closure.borrow_mut() = Some(Closure::new(move |time: f64| {
                on_frame(time);
                // The loop ends once the owning FrameLoop is gone
                let Some(cell) = closure_loop.upgrade() else {
                    return;
                };
                if let Some(cb) = cell.borrow().as_ref()
                    && let Ok(next) = window_loop.request_animation_frame(cb.as_ref().unchecked_ref())
                {
                    *id_loop.borrow_mut() = Some(next);
                }
            }));

            if let Some(cb) = closure.borrow().as_ref()
                && let Ok(first) = window.request_animation_frame(cb.as_ref().unchecked_ref())
            {
                *id.borrow_mut() = Some(first);
            }

            Self {
                window: window.clone(),
                id,
                _closure: closure,
            }
        }
    }

    impl Drop for FrameLoop {
        fn drop(&mut self) {
            if let Some(id) = self.id.borrow_mut().take() {
                let _ = self.window.cancel_animation_frame(id);
            }
        }
    }

    /// Page-side state shared by every callback
    struct Host {
        story: Story,
        surface: CanvasSurface,
        window: Window,
        document: Document,
        /// Timer callback; owned by `App`
        wake_fn: Option<js_sys::Function>,
        wake_handle: Option<i32>,
        /// Timeline event last scrolled into the middle of the track
        centered: Option<u32>,
        /// Ripple elements currently in `#heart-ripples`
        ripples_drawn: usize,
    }

    impl Host {
        fn now(&self) -> f64 {
            self.window
                .performance()
                .map(|p| p.now())
                .unwrap_or_default()
        }

        fn input(&mut self, input: StoryInput) {
            let now = self.now();
            self.story.handle(input, now);
            match input {
                StoryInput::CardHover { id, .. }
                | StoryInput::CardLeave(id)
                | StoryInput::ImageLoaded(id)
                | StoryInput::ImageFailed(id) => self.sync_card(id),
                _ => {}
            }
            self.sync();
        }

        fn wake(&mut self) {
            self.wake_handle = None;
            let now = self.now();
            self.story.poll(now);
            self.sync();
        }

        fn frame(&mut self, time: f64) {
            self.story.frame(time, &mut self.surface);
            self.draw_ripples(time);
        }

        /// Rebuild the heart's ripple rings; cheap at a handful of taps
        fn draw_ripples(&mut self, time: f64) {
            let ripples = self.story.ripples(time);
            if ripples.is_empty() && self.ripples_drawn == 0 {
                return;
            }
            let Some(container) = self.document.get_element_by_id("heart-ripples") else {
                return;
            };
            container.set_inner_html("");
            for (id, progress) in &ripples {
                let Some(ring) = self
                    .document
                    .create_element("span")
                    .ok()
                    .and_then(|el| el.dyn_into::<HtmlElement>().ok())
                else {
                    continue;
                };
                let _ = ring.set_attribute("class", "ripple");
                let _ = ring.set_attribute("data-id", &id.to_string());
                let style = ring.style();
                let _ = style.set_property("transform", &format!("scale({:.3})", 1.0 + 2.0 * progress));
                let _ = style.set_property("opacity", &format!("{:.3}", 1.0 - progress));
                let _ = container.append_child(&ring);
            }
            self.ripples_drawn = ripples.len();
        }

        fn resize(&mut self) {
            let (w, h) = viewport(&self.window);
            self.surface.resize(w as u32, h as u32);
            self.input(StoryInput::Resize {
                width: w,
                height: h,
            });
        }

        /// Push story events and text into the page, then re-arm the wake-up
        fn sync(&mut self) {
            for event in self.story.drain_events() {
                self.apply(&event);
            }

            let text = self.story.text();
            set_text(&self.document, "stage-title", &text.title);
            set_text(&self.document, "stage-body", &text.body);
            set_text(&self.document, "stage-action", &text.action);
            self.sync_items(&text);
            self.sync_progress(text.progress);
            if let Some(choices) = &text.choices {
                set_text(&self.document, "yes-button", &choices.yes);
                set_text(&self.document, "no-button", &choices.no);
                if let Some(body) = self.document.body() {
                    set_flag(&body, "data-choices", choices.interactive);
                }
            }
            self.center_timeline();

            self.schedule();
        }

        /// Item state and content onto `#{stage}-{id}` (heart dots: `#heart-dot-{i}`)
        fn sync_items(&self, text: &StageText) {
            let stage = self.story.current_stage();
            for item in &text.items {
                let el_id = match stage {
                    Stage::Heart => format!("heart-dot-{}", item.id),
                    _ => format!("{}-{}", stage.as_str(), item.id),
                };
                let Some(el) = self.document.get_element_by_id(&el_id) else {
                    continue;
                };
                set_flag(&el, "data-acted", item.acted);
                set_flag(&el, "data-active", item.active);
                set_slot(&el, "label", &item.label);
                set_slot(&el, "detail", &item.detail);
                if let Some(src) = &item.image
                    && let Ok(Some(img)) = el.query_selector("img[data-memory-image]")
                    && img.get_attribute("src").as_deref() != Some(src.as_str())
                {
                    let _ = img.set_attribute("src", src);
                }
            }
        }

        fn sync_progress(&self, progress: Option<f32>) {
            let Some(bar) = self
                .document
                .get_element_by_id("stage-progress")
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            else {
                return;
            };
            match progress {
                Some(p) => {
                    bar.set_hidden(false);
                    let _ = bar
                        .style()
                        .set_property("width", &format!("{:.1}%", p * 100.0));
                }
                None => bar.set_hidden(true),
            }
        }

        /// Scroll the newly active timeline event to the middle of `#timeline-track`
        fn center_timeline(&mut self) {
            let active = match self.story.active() {
                Some(ActiveStage::Timeline(timeline)) => timeline.active(),
                _ => {
                    self.centered = None;
                    return;
                }
            };
            if self.centered == Some(active) {
                return;
            }
            self.centered = Some(active);

            let (Some(track), Some(event)) = (
                self.document.get_element_by_id("timeline-track"),
                self.document
                    .get_element_by_id(&format!("timeline-{}", active))
                    .and_then(|el| el.dyn_into::<HtmlElement>().ok()),
            ) else {
                return;
            };
            let left = scroll_to_center(
                track.client_width() as f32,
                event.offset_left() as f32,
                event.offset_width() as f32,
            );
            track.set_scroll_left(left.max(0.0).round() as i32);
        }

        fn apply(&self, event: &StoryEvent) {
            let body = self.document.body();
            match event {
                StoryEvent::StageEntered(stage) => {
                    log::info!("Entering {}", stage.as_str());
                    if let Some(body) = &body {
                        let _ = body.set_attribute("data-stage", stage.as_str());
                        let _ = body.set_attribute("data-transition", "true");
                    }
                }
                StoryEvent::StageMounted(stage) => {
                    if let Some(body) = &body {
                        let _ = body.set_attribute("data-stage", stage.as_str());
                        let _ = body.remove_attribute("data-transition");
                        let _ = body.set_attribute(
                            "data-memory",
                            self.story.config().memory_stage.as_str(),
                        );
                    }
                }
                StoryEvent::ItemActed { stage, id, .. } => {
                    if let Some(el) = self
                        .document
                        .get_element_by_id(&format!("{}-{}", stage.as_str(), id))
                    {
                        let _ = el.set_attribute("data-acted", "true");
                    }
                }
                StoryEvent::HeartUnlocked => {
                    if let Some(el) = self.document.get_element_by_id("heart") {
                        let _ = el.set_attribute("data-unlocked", "true");
                    }
                }
                StoryEvent::Evaded { offset } => {
                    set_transform(
                        &self.document,
                        "no-button",
                        &format!("translate({:.1}px, {:.1}px)", offset.x, offset.y),
                    );
                }
                StoryEvent::Answered => {
                    if let Some(body) = &body {
                        let _ = body.set_attribute("data-answered", "true");
                    }
                }
                other => log::debug!("{:?}", other),
            }
        }

        /// Tilt and placeholder state of one memory card
        fn sync_card(&self, id: u32) {
            let Some(ActiveStage::Gallery(gallery)) = self.story.active() else {
                return;
            };
            let card_id = format!("memory-{}", id);
            let tilt = gallery.tilt(id);
            set_transform(
                &self.document,
                &card_id,
                &format!(
                    "perspective(800px) rotateX({:.2}deg) rotateY({:.2}deg) scale({})",
                    tilt.rotate_x, tilt.rotate_y, tilt.scale
                ),
            );
            if let Some(el) = self.document.get_element_by_id(&card_id) {
                let visual = match gallery.visual(id) {
                    CardVisual::Image => "image",
                    CardVisual::Placeholder => "placeholder",
                };
                let _ = el.set_attribute("data-visual", visual);
            }
        }

        /// One pending setTimeout for the story's next deadline
        fn schedule(&mut self) {
            self.cancel_wake();
            let (Some(deadline), Some(f)) = (self.story.next_deadline(), &self.wake_fn) else {
                return;
            };
            let delay = (deadline - self.now()).max(0.0).ceil() as i32;
            self.wake_handle = self
                .window
                .set_timeout_with_callback_and_timeout_and_arguments_0(f, delay)
                .ok();
        }

        fn cancel_wake(&mut self) {
            if let Some(handle) = self.wake_handle.take() {
                self.window.clear_timeout_with_handle(handle);
            }
        }
    }

    /// Everything that must be released when the page stops the story
    struct App {
        host: Rc<RefCell<Host>>,
        _frame: FrameLoop,
        _listeners: Vec<Listener>,
        _wake: Closure<dyn FnMut()>,
    }

    impl Drop for App {
        fn drop(&mut self) {
            let mut host = self.host.borrow_mut();
            host.cancel_wake();
            host.wake_fn = None;
            log::info!("Valentine stopped");
        }
    }

    thread_local! {
        static APP: RefCell<Option<App>> = const { RefCell::new(None) };
    }

    fn viewport(window: &Window) -> (f32, f32) {
        let w = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or_default();
        let h = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or_default();
        (w as f32, h as f32)
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id)
            && el.text_content().as_deref() != Some(text)
        {
            el.set_text_content(Some(text));
        }
    }

    fn set_flag(el: &Element, name: &str, on: bool) {
        if on {
            let _ = el.set_attribute(name, "true");
        } else {
            let _ = el.remove_attribute(name);
        }
    }

    /// Text of the `[data-slot=...]` child of an item element
    fn set_slot(el: &Element, slot: &str, text: &str) {
        if let Ok(Some(child)) = el.query_selector(&format!("[data-slot={}]", slot))
            && child.text_content().as_deref() != Some(text)
        {
            child.set_text_content(Some(text));
        }
    }

    fn set_transform(document: &Document, id: &str, transform: &str) {
        if let Some(el) = document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            let _ = el.style().set_property("transform", transform);
        }
    }

    /// Nearest ancestor-or-self of the event target matching `selector`
    fn target_matching(event: &Event, selector: &str) -> Option<Element> {
        event
            .target()?
            .dyn_into::<Element>()
            .ok()?
            .closest(selector)
            .ok()
            .flatten()
    }

    fn data_id(el: &Element) -> Option<u32> {
        el.get_attribute("data-id")?.parse().ok()
    }

    /// Map a click on a `[data-action]` element to a story input
    fn click_input(event: &Event) -> Option<StoryInput> {
        let el = target_matching(event, "[data-action]")?;
        let action = el.get_attribute("data-action")?;
        match action.as_str() {
            "open" => Some(StoryInput::Open),
            "heart" => Some(StoryInput::TapHeart),
            "note" => data_id(&el).map(StoryInput::OpenNote),
            "memory" => data_id(&el).map(StoryInput::RevealMemory),
            "event" => data_id(&el).map(StoryInput::SelectEvent),
            "yes" => Some(StoryInput::ChooseYes),
            _ => None,
        }
    }

    fn with_host(host: &Weak<RefCell<Host>>, f: impl FnOnce(&mut Host)) {
        if let Some(host) = host.upgrade() {
            f(&mut host.borrow_mut());
        }
    }

    fn listeners(
        window: &Window,
        document: &Document,
        host: &Rc<RefCell<Host>>,
    ) -> Result<Vec<Listener>, JsValue> {
        let mut out = Vec::new();

        {
            let host = Rc::downgrade(host);
            out.push(Listener::new(window, "resize", false, move |_| {
                with_host(&host, |h| h.resize());
            })?);
        }

        {
            let host = Rc::downgrade(host);
            out.push(Listener::new(document, "click", false, move |event| {
                if let Some(input) = click_input(&event) {
                    with_host(&host, |h| h.input(input));
                }
            })?);
        }

        {
            let host = Rc::downgrade(host);
            out.push(Listener::new(window, "mousemove", false, move |event| {
                let Ok(mouse) = event.dyn_into::<MouseEvent>() else {
                    return;
                };
                let (x, y) = (mouse.client_x() as f32, mouse.client_y() as f32);
                let card = target_matching(&mouse, "[data-action=memory]");
                with_host(&host, |h| {
                    h.input(StoryInput::PointerMove { x, y });
                    if let Some(card) = card
                        && let Some(id) = data_id(&card)
                    {
                        let rect = card.get_bounding_client_rect();
                        if rect.width() > 0.0 && rect.height() > 0.0 {
                            let local = Vec2::new(
                                ((x as f64 - rect.left()) / rect.width()) as f32,
                                ((y as f64 - rect.top()) / rect.height()) as f32,
                            );
                            h.input(StoryInput::CardHover {
                                id,
                                x: local.x,
                                y: local.y,
                            });
                        }
                    }
                });
            })?);
        }

        // mouseenter/mouseleave do not bubble; capture them at the document
        {
            let host = Rc::downgrade(host);
            out.push(Listener::new(document, "mouseenter", true, move |event| {
                if let Some(el) = event.target().and_then(|t| t.dyn_into::<Element>().ok())
                    && el.matches("[data-action=no]").unwrap_or(false)
                {
                    with_host(&host, |h| h.input(StoryInput::HoverNo));
                }
            })?);
        }

        {
            let host = Rc::downgrade(host);
            out.push(Listener::new(document, "mouseleave", true, move |event| {
                if let Some(el) = event.target().and_then(|t| t.dyn_into::<Element>().ok())
                    && el.matches("[data-action=memory]").unwrap_or(false)
                    && let Some(id) = data_id(&el)
                {
                    with_host(&host, |h| h.input(StoryInput::CardLeave(id)));
                }
            })?);
        }

        {
            let host = Rc::downgrade(host);
            out.push(Listener::active(document, "touchstart", move |event| {
                let Ok(touch) = event.dyn_into::<TouchEvent>() else {
                    return;
                };
                if target_matching(&touch, "[data-action=no]").is_some() {
                    // Keep the tap from turning into a click on the dodging button
                    touch.prevent_default();
                    with_host(&host, |h| h.input(StoryInput::HoverNo));
                } else if let Some(t) = touch.touches().get(0) {
                    let (x, y) = (t.client_x() as f32, t.client_y() as f32);
                    with_host(&host, |h| h.input(StoryInput::PointerMove { x, y }));
                }
            })?);
        }

        // load/error do not bubble either
        for (kind, loaded) in [("load", true), ("error", false)] {
            let host = Rc::downgrade(host);
            out.push(Listener::new(document, kind, true, move |event| {
                let Some(el) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                    return;
                };
                if !el.has_attribute("data-memory-image") {
                    return;
                }
                if let Some(id) = data_id(&el) {
                    let input = if loaded {
                        StoryInput::ImageLoaded(id)
                    } else {
                        StoryInput::ImageFailed(id)
                    };
                    with_host(&host, |h| h.input(input));
                }
            })?);
        }

        Ok(out)
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Valentine starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("ambient")
            .ok_or("no #ambient canvas")?
            .dyn_into()
            .map_err(|_| "#ambient is not a canvas")?;
        let surface = CanvasSurface::new(canvas).map_err(|e| JsValue::from_str(&e))?;

        let (w, h) = viewport(&window);
        surface.resize(w as u32, h as u32);

        let config = StoryConfig::load();
        let seed = js_sys::Date::now() as u64;
        let now = window.performance().map(|p| p.now()).unwrap_or_default();
        let story = Story::new(config, seed, Vec2::new(w, h), now);

        let host = Rc::new(RefCell::new(Host {
            story,
            surface,
            window: window.clone(),
            document: document.clone(),
            wake_fn: None,
            wake_handle: None,
            centered: None,
            ripples_drawn: 0,
        }));

        let wake = {
            let host = Rc::downgrade(&host);
            Closure::<dyn FnMut()>::new(move || with_host(&host, |h| h.wake()))
        };
        {
            let mut h = host.borrow_mut();
            h.wake_fn = Some(wake.as_ref().unchecked_ref::<js_sys::Function>().clone());
            h.sync();
        }

        let listeners = listeners(&window, &document, &host)?;
        let frame = {
            let host = Rc::downgrade(&host);
            FrameLoop::start(&window, move |time| with_host(&host, |h| h.frame(time)))
        };

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        APP.with(|app| {
            *app.borrow_mut() = Some(App {
                host,
                _frame: frame,
                _listeners: listeners,
                _wake: wake,
            });
        });

        log::info!("Valentine running!");
        Ok(())
    }

    /// Tear down the frame loop, listeners and pending timer
    pub fn stop() {
        let app = APP.with(|app| app.borrow_mut().take());
        drop(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    web::run()
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn stop() {
    web::stop();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Valentine (native) starting...");
    log::info!("Native mode plays a scripted session - run with `trunk serve` for the web version");

    if let Err(e) = headless::walkthrough() {
        log::error!("Walkthrough failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted session against virtual time
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;

    use valentine::app::ActiveStage;
    use valentine::config::MemoryStageKind;
    use valentine::renderer::RecordingSurface;
    use valentine::{Millis, Stage, Story, StoryConfig, StoryEvent, StoryInput};

    /// Virtual frame length
    const FRAME_MS: Millis = 16.0;
    /// Pause between scripted inputs
    const INPUT_GAP_MS: Millis = 250.0;
    /// Give up if the story stalls this long
    const TIMEOUT_MS: Millis = 120_000.0;

    struct Session {
        story: Story,
        surface: RecordingSurface,
        clock: Millis,
        frames: u64,
    }

    impl Session {
        fn step(&mut self, ms: Millis) {
            let end = self.clock + ms;
            while self.clock < end {
                self.clock = (self.clock + FRAME_MS).min(end);
                self.story.poll(self.clock);
                self.surface.reset();
                self.story.frame(self.clock, &mut self.surface);
                self.frames += 1;
                self.log_events();
            }
        }

        fn input(&mut self, input: StoryInput) {
            self.story.handle(input, self.clock);
            self.log_events();
            self.step(INPUT_GAP_MS);
        }

        fn wait_until(&mut self, what: &str, done: impl Fn(&Story) -> bool) -> Result<(), String> {
            while !done(&self.story) {
                if self.clock > TIMEOUT_MS {
                    return Err(format!("timed out waiting for {}", what));
                }
                self.step(FRAME_MS);
            }
            Ok(())
        }

        fn wait_for_stage(&mut self, stage: Stage) -> Result<(), String> {
            self.wait_until(stage.as_str(), |s| {
                s.current_stage() == stage && s.active().is_some()
            })
        }

        fn log_events(&mut self) {
            for event in self.story.drain_events() {
                match event {
                    StoryEvent::StageEntered(stage) => {
                        log::info!("[{:>7.0} ms] entering {}", self.clock, stage.as_str())
                    }
                    StoryEvent::Answered => log::info!("[{:>7.0} ms] answered yes", self.clock),
                    other => log::debug!("[{:>7.0} ms] {:?}", self.clock, other),
                }
            }
        }
    }

    pub fn walkthrough() -> Result<(), String> {
        let mut config = StoryConfig::load();
        if let Ok(kind) = std::env::var("VALENTINE_MEMORY_STAGE") {
            match MemoryStageKind::from_str(&kind) {
                Some(kind) => config.memory_stage = kind,
                None => log::warn!("Unknown memory stage '{}', keeping {}", kind, config.memory_stage.as_str()),
            }
        }
        config.validate().map_err(|e| e.to_string())?;

        let affirmations = config.heart_affirmation.affirmations.len();
        let memory_ids: Vec<u32> = match config.memory_stage {
            MemoryStageKind::Gallery => config.memory_gallery.memories.iter().map(|m| m.id).collect(),
            MemoryStageKind::Notes => config.love_notes.notes.iter().map(|n| n.id).collect(),
        };
        let memory_stage = config.memory_stage;
        let event_ids: Vec<u32> = config.love_timeline.events.iter().map(|e| e.id).collect();

        let mut session = Session {
            story: Story::new(config, 0x5EED, Vec2::new(1280.0, 720.0), 0.0),
            surface: RecordingSurface::new(),
            clock: 0.0,
            frames: 0,
        };

        session.step(INPUT_GAP_MS);
        session.input(StoryInput::PointerMove { x: 900.0, y: 200.0 });
        session.input(StoryInput::Open);

        session.wait_for_stage(Stage::Heart)?;
        for _ in 0..affirmations {
            session.input(StoryInput::TapHeart);
        }

        session.wait_for_stage(Stage::Memory)?;
        for (i, &id) in memory_ids.iter().rev().enumerate() {
            match memory_stage {
                MemoryStageKind::Gallery => {
                    // Exercise both image outcomes
                    if i % 2 == 0 {
                        session.input(StoryInput::ImageLoaded(id));
                    } else {
                        session.input(StoryInput::ImageFailed(id));
                    }
                    session.input(StoryInput::RevealMemory(id));
                    session.input(StoryInput::CardHover { id, x: 0.8, y: 0.3 });
                    session.input(StoryInput::CardLeave(id));
                }
                MemoryStageKind::Notes => session.input(StoryInput::OpenNote(id)),
            }
        }

        session.wait_for_stage(Stage::Timeline)?;
        for &id in &event_ids {
            session.input(StoryInput::SelectEvent(id));
        }

        session.wait_for_stage(Stage::Reveal)?;
        session.wait_until("choices", |s| {
            matches!(s.active(), Some(ActiveStage::Reveal(r)) if r.choices_interactive())
        })?;
        for _ in 0..3 {
            session.input(StoryInput::HoverNo);
        }
        session.input(StoryInput::ChooseYes);

        session.wait_for_stage(Stage::Celebration)?;
        let text = session.story.text();
        log::info!("{}", text.title);

        let visited: Vec<&str> = session
            .story
            .controller()
            .visited()
            .iter()
            .map(|s| s.as_str())
            .collect();
        log::info!(
            "Walkthrough complete at {:.0} ms after {} frames: {}",
            session.clock,
            session.frames,
            visited.join(" -> ")
        );
        Ok(())
    }
}
