//! The browser side of [`Host`], [`OverlaySurface`] and [`ClickEvent`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures_util::future::LocalBoxFuture;
use js_sys::{Function, Reflect};
use tracing::{debug, warn};
use transitfx_effects::{ColorPalette, Stage};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, HtmlAnchorElement, HtmlElement, KeyboardEvent, MouseEvent,
    MouseEventInit, ShadowRootInit, ShadowRootMode, Window,
};

use crate::error::TransitionError;
use crate::host::{Host, OverlaySurface, TimerId, UrlParts};
use crate::interceptor::{ClickEvent, LinkInfo, Modifiers, Probe};
use crate::overlay::{
    CONTAINER_CLASS, FLASH_OUT_CLASS, HOST_STYLE, OVERLAY_CLASS, OVERLAY_HOST_ID, SKIP_CLASS,
    SKIP_LABEL, overlay_css,
};
use crate::settings::{PageFilter, Settings};
use crate::storage;

/// Property set on our re-dispatched clicks.
const SYNTHETIC_MARK: &str = "__transitfxSynthetic";

pub(crate) fn window() -> Result<Window, TransitionError> {
    web_sys::window().ok_or(TransitionError::MissingApi("window"))
}

pub(crate) fn document() -> Result<Document, TransitionError> {
    window()?
        .document()
        .ok_or(TransitionError::MissingApi("document"))
}

#[derive(Debug, Default)]
pub struct DomHost;

impl Host for DomHost {
    type Overlay = DomOverlay;

    fn context_valid(&self) -> bool {
        storage::context_valid()
    }

    fn load_settings(&self) -> LocalBoxFuture<'static, Result<Settings, TransitionError>> {
        Box::pin(storage::load_settings())
    }

    fn hostname(&self) -> String {
        window()
            .ok()
            .and_then(|window| window.location().hostname().ok())
            .unwrap_or_default()
    }

    fn location(&self) -> Option<UrlParts> {
        let location = window().ok()?.location();

        Some(UrlParts {
            href: location.href().ok()?,
            origin: location.origin().ok()?,
            pathname: location.pathname().ok()?,
            search: location.search().ok()?,
            hash: location.hash().ok()?,
        })
    }

    fn parse_url(&self, href: &str, base: &str) -> Option<UrlParts> {
        let url = web_sys::Url::new_with_base(href, base).ok()?;

        Some(UrlParts {
            href: url.href(),
            origin: url.origin(),
            pathname: url.pathname(),
            search: url.search(),
            hash: url.hash(),
        })
    }

    fn prefers_reduced_motion(&self) -> bool {
        window()
            .ok()
            .and_then(|window| window.match_media("(prefers-reduced-motion: reduce)").ok())
            .flatten()
            .is_some_and(|query| query.matches())
    }

    fn prefetch(&self, url: &str) {
        if let Err(err) = prefetch(url) {
            debug!(%err, "prefetch hint skipped");
        }
    }

    fn mount_overlay(
        &self,
        palette: &ColorPalette,
        filter: PageFilter,
    ) -> Result<DomOverlay, TransitionError> {
        DomOverlay::mount(&document()?, palette, filter)
    }

    fn set_timeout(
        &self,
        delay_ms: u32,
        callback: Box<dyn FnOnce()>,
    ) -> Result<TimerId, TransitionError> {
        let callback = Closure::once_into_js(move || callback());
        let id = window()?.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            i32::try_from(delay_ms).unwrap_or(i32::MAX),
        )?;

        Ok(TimerId(id))
    }

    fn clear_timeout(&self, id: TimerId) {
        if let Ok(window) = window() {
            window.clear_timeout_with_handle(id.0);
        }
    }

    fn random(&self) -> f64 {
        js_sys::Math::random()
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }

    fn assign_location(&self, href: &str) {
        if let Err(err) = window().and_then(|window| Ok(window.location().set_href(href)?)) {
            warn!(%err, href, "navigation failed");
        }
    }
}

fn prefetch(url: &str) -> Result<(), TransitionError> {
    let window = window()?;
    let document = document()?;
    let head = document.head().ok_or(TransitionError::MissingApi("document.head"))?;

    let link = document.create_element("link")?;
    link.set_attribute("rel", "prefetch")?;
    link.set_attribute("href", url)?;
    head.append_child(&link)?;

    let target = web_sys::Url::new(url)?;
    if target.origin() != window.location().origin()? {
        let preconnect = document.create_element("link")?;
        preconnect.set_attribute("rel", "preconnect")?;
        preconnect.set_attribute("href", &target.origin())?;
        head.append_child(&preconnect)?;
    }

    Ok(())
}

struct SkipListeners {
    on_click: Closure<dyn FnMut(web_sys::Event)>,
    on_key: Closure<dyn FnMut(KeyboardEvent)>,
}

/// The overlay host element and the pieces inside its closed shadow root.
pub struct DomOverlay {
    host: HtmlElement,
    overlay: HtmlElement,
    skip_button: HtmlElement,
    stage: Stage,
    listeners: RefCell<Option<SkipListeners>>,
}

impl DomOverlay {
    fn mount(
        document: &Document,
        palette: &ColorPalette,
        filter: PageFilter,
    ) -> Result<Self, TransitionError> {
        let root = document
            .document_element()
            .ok_or(TransitionError::MissingApi("document.documentElement"))?;

        let host = create(document, "div")?;
        host.set_id(OVERLAY_HOST_ID);
        host.style().set_css_text(HOST_STYLE);
        root.append_child(&host)?;

        match Self::build(document, &host, palette, filter) {
            Ok(overlay) => Ok(overlay),
            Err(err) => {
                host.remove();
                Err(err)
            }
        }
    }

    fn build(
        document: &Document,
        host: &HtmlElement,
        palette: &ColorPalette,
        filter: PageFilter,
    ) -> Result<Self, TransitionError> {
        let init = ShadowRootInit::new(ShadowRootMode::Closed);
        let shadow = host.attach_shadow(&init)?;

        let style = create(document, "style")?;
        style.set_text_content(Some(&overlay_css(palette, filter)));
        shadow.append_child(&style)?;

        let overlay = create(document, "div")?;
        overlay.set_class_name(OVERLAY_CLASS);
        let overlay_style = overlay.style();
        for (name, value) in palette.css_variables() {
            overlay_style.set_property(name, value)?;
        }

        let container = create(document, "div")?;
        container.set_class_name(CONTAINER_CLASS);
        overlay.append_child(&container)?;

        let skip_button = create(document, "button")?;
        skip_button.set_class_name(SKIP_CLASS);
        skip_button.set_text_content(Some(SKIP_LABEL));
        overlay.append_child(&skip_button)?;

        shadow.append_child(&overlay)?;
        host.style().set_property("pointer-events", "auto")?;

        Ok(Self {
            host: host.clone(),
            overlay: overlay.clone(),
            skip_button,
            stage: Stage {
                overlay,
                container,
                palette: *palette,
            },
            listeners: RefCell::new(None),
        })
    }
}

impl OverlaySurface for DomOverlay {
    type Stage = Stage;

    fn stage(&self) -> &Stage {
        &self.stage
    }

    fn arm_skip(&self, on_skip: Rc<dyn Fn()>) -> Result<(), TransitionError> {
        self.disarm_skip();

        let on_click = {
            let on_skip = on_skip.clone();
            Closure::wrap(Box::new(move |_event: web_sys::Event| on_skip())
                as Box<dyn FnMut(web_sys::Event)>)
        };
        let on_key = Closure::wrap(Box::new(move |event: KeyboardEvent| {
            if event.key() == "Escape" {
                on_skip();
            }
        }) as Box<dyn FnMut(KeyboardEvent)>);

        self.skip_button
            .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        document()?.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())?;

        *self.listeners.borrow_mut() = Some(SkipListeners { on_click, on_key });
        Ok(())
    }

    fn disarm_skip(&self) {
        let Some(listeners) = self.listeners.borrow_mut().take() else {
            return;
        };

        let _ = self.skip_button.remove_event_listener_with_callback(
            "click",
            listeners.on_click.as_ref().unchecked_ref(),
        );
        if let Ok(document) = document() {
            let _ = document.remove_event_listener_with_callback(
                "keydown",
                listeners.on_key.as_ref().unchecked_ref(),
            );
        }
    }

    fn flash_out(&self) {
        let _ = self.overlay.class_list().add_1(FLASH_OUT_CLASS);
    }

    fn remove(&self) {
        self.host.remove();
    }
}

impl std::fmt::Debug for DomOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomOverlay")
            .field("attached", &self.host.is_connected())
            .field("skip_armed", &self.listeners.borrow().is_some())
            .finish()
    }
}

fn create(document: &Document, tag: &str) -> Result<HtmlElement, TransitionError> {
    Ok(document.create_element(tag)?.unchecked_into())
}

/// Swaps `history.pushState` and `history.replaceState` for recording
/// wrappers until dropped.
pub struct HistoryProbe {
    history: JsValue,
    original_push: JsValue,
    original_replace: JsValue,
    touched: Rc<Cell<bool>>,
    _push: Closure<dyn FnMut(JsValue, JsValue, JsValue) -> Result<JsValue, JsValue>>,
    _replace: Closure<dyn FnMut(JsValue, JsValue, JsValue) -> Result<JsValue, JsValue>>,
}

impl HistoryProbe {
    pub fn install() -> Result<Self, TransitionError> {
        let history: JsValue = window()?.history()?.into();
        let original_push = Reflect::get(&history, &JsValue::from_str("pushState"))?;
        let original_replace = Reflect::get(&history, &JsValue::from_str("replaceState"))?;
        let touched = Rc::new(Cell::new(false));

        let push = recording_wrapper(&history, &original_push, &touched)?;
        let replace = recording_wrapper(&history, &original_replace, &touched)?;

        Reflect::set(&history, &JsValue::from_str("pushState"), push.as_ref())?;
        if let Err(err) = Reflect::set(&history, &JsValue::from_str("replaceState"), replace.as_ref()) {
            let _ = Reflect::set(&history, &JsValue::from_str("pushState"), &original_push);
            return Err(err.into());
        }

        Ok(Self {
            history,
            original_push,
            original_replace,
            touched,
            _push: push,
            _replace: replace,
        })
    }

    /// Either primitive ran since [`HistoryProbe::install`].
    pub fn touched(&self) -> bool {
        self.touched.get()
    }
}

impl Drop for HistoryProbe {
    fn drop(&mut self) {
        let _ = Reflect::set(&self.history, &JsValue::from_str("pushState"), &self.original_push);
        let _ = Reflect::set(
            &self.history,
            &JsValue::from_str("replaceState"),
            &self.original_replace,
        );
    }
}

impl std::fmt::Debug for HistoryProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryProbe")
            .field("touched", &self.touched.get())
            .finish()
    }
}

fn recording_wrapper(
    history: &JsValue,
    original: &JsValue,
    touched: &Rc<Cell<bool>>,
) -> Result<Closure<dyn FnMut(JsValue, JsValue, JsValue) -> Result<JsValue, JsValue>>, TransitionError>
{
    let original: Function = original
        .clone()
        .dyn_into()
        .map_err(|_| TransitionError::MissingApi("history.pushState"))?;
    let history = history.clone();
    let touched = touched.clone();

    Ok(Closure::wrap(Box::new(
        move |state: JsValue, title: JsValue, url: JsValue| {
            touched.set(true);
            original.call3(&history, &state, &title, &url)
        },
    )
        as Box<dyn FnMut(JsValue, JsValue, JsValue) -> Result<JsValue, JsValue>>))
}

/// A real document click.
#[derive(Debug)]
pub struct DomClick {
    event: MouseEvent,
    anchor: Option<HtmlAnchorElement>,
}

impl DomClick {
    pub fn new(event: MouseEvent) -> Self {
        let anchor = event
            .target()
            .and_then(|target| target.dyn_into::<Element>().ok())
            .and_then(|element| element.closest("a").ok().flatten())
            .and_then(|anchor| anchor.dyn_into::<HtmlAnchorElement>().ok());

        Self { event, anchor }
    }

    fn synthetic_copy(&self) -> Result<MouseEvent, TransitionError> {
        let init = MouseEventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        init.set_view(Some(&window()?));
        init.set_ctrl_key(self.event.ctrl_key());
        init.set_shift_key(self.event.shift_key());
        init.set_alt_key(self.event.alt_key());
        init.set_meta_key(self.event.meta_key());

        let synthetic = MouseEvent::new_with_mouse_event_init_dict("click", &init)?;
        Reflect::set(&synthetic, &JsValue::from_str(SYNTHETIC_MARK), &JsValue::TRUE)?;
        Ok(synthetic)
    }
}

impl ClickEvent for DomClick {
    fn is_synthetic(&self) -> bool {
        Reflect::get(&self.event, &JsValue::from_str(SYNTHETIC_MARK))
            .is_ok_and(|mark| mark.is_truthy())
    }

    fn link(&self) -> Option<LinkInfo> {
        let anchor = self.anchor.as_ref()?;

        Some(LinkInfo {
            href: anchor.href(),
            raw_href: anchor.get_attribute("href"),
            target: anchor.target(),
            download: anchor.has_attribute("download"),
        })
    }

    fn modifiers(&self) -> Modifiers {
        Modifiers {
            ctrl: self.event.ctrl_key(),
            meta: self.event.meta_key(),
            shift: self.event.shift_key(),
            alt: self.event.alt_key(),
        }
    }

    fn suppress(&self) {
        self.event.prevent_default();
        self.event.stop_immediate_propagation();
    }

    fn redispatch_probed(&self) -> Result<Probe, TransitionError> {
        let anchor = self
            .anchor
            .as_ref()
            .ok_or(TransitionError::Dom("click has no anchor".to_owned()))?;
        let synthetic = self.synthetic_copy()?;

        // Dispatch is synchronous: every page handler has run when it returns.
        let probe = HistoryProbe::install()?;
        anchor.dispatch_event(&synthetic)?;
        let touched = probe.touched();
        drop(probe);

        Ok(if touched {
            Probe::HistoryTouched
        } else {
            Probe::Untouched
        })
    }
}
