#![allow(missing_docs)]
//! Page transitions for same-origin navigations.
//!
//! A capture-phase [`Interceptor`] picks out clicks that would load a new
//! document, and the [`Controller`] plays a short effect over the page before
//! letting the real navigation through.

pub mod prelude;

pub use js_sys;
pub use transitfx_effects as effects;
pub use wasm_bindgen;
pub use web_sys;

pub mod background;
pub mod content;
pub mod controller;
pub mod dom;
pub mod error;
pub mod host;
pub mod interceptor;
pub mod logging;
pub mod message;
pub mod overlay;
pub mod page_filter;
mod session;
pub mod settings;
pub mod storage;
pub mod theme;

pub use controller::{Bypass, Controller, Outcome};
pub use error::TransitionError;
pub use host::{Host, Navigate, OverlaySurface, StageOf, TimerId, UrlParts};
pub use interceptor::{ClickEvent, Decision, IgnoreReason, Interceptor, LinkInfo, Modifiers, Probe};
pub use session::TransitionSession;
pub use settings::{PageFilter, Settings, SettingsPatch, SiteMode, Speed};

#[cfg(target_arch = "wasm32")]
mod entry {
    use wasm_bindgen::prelude::*;

    use crate::{background, content, dom, logging, page_filter};

    /// Content script at `document_idle`.
    #[wasm_bindgen(js_name = startContent)]
    pub fn start_content() -> Result<(), JsValue> {
        logging::init();
        content::start().map_err(Into::into)
    }

    #[wasm_bindgen(js_name = startBackground)]
    pub fn start_background() -> Result<(), JsValue> {
        logging::init();
        background::start().map_err(Into::into)
    }

    /// Content script at `document_start`: re-apply the cached page filter.
    #[wasm_bindgen(js_name = applyEarlyFilter)]
    pub fn apply_early_filter() -> Result<(), JsValue> {
        let document = dom::document()?;
        page_filter::apply_cached(&document).map_err(Into::into)
    }
}
