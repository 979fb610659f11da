//! Content script wiring: click capture, skip messages, live filter sync.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::MouseEvent;

use crate::controller::Controller;
use crate::dom::{self, DomClick, DomHost};
use crate::error::TransitionError;
use crate::interceptor::Interceptor;
use crate::message::Message;
use crate::page_filter;
use crate::settings::PageFilter;
use crate::storage;

pub fn start() -> Result<(), TransitionError> {
    if !storage::context_valid() {
        debug!("extension context unavailable, content script idle");
        return Ok(());
    }

    let controller = Rc::new(Controller::new(
        Rc::new(DomHost),
        transitfx_effects::default_registry(),
    ));
    let active_filter = Rc::new(Cell::new(None::<PageFilter>));

    sync_filter_from_storage(active_filter.clone());
    watch_filter(controller.clone(), active_filter)?;
    listen_for_skip(controller.clone())?;
    intercept_clicks(Interceptor::new(controller))?;

    info!("content script ready");
    Ok(())
}

// The early script already applied the cached filter; correct it from storage.
fn sync_filter_from_storage(active_filter: Rc<Cell<Option<PageFilter>>>) {
    wasm_bindgen_futures::spawn_local(async move {
        let settings = match storage::load_settings().await {
            Ok(settings) => settings,
            Err(err) => {
                debug!(%err, "filter sync skipped");
                return;
            }
        };

        active_filter.set(Some(settings.page_filter));
        if let Err(err) = dom::document().and_then(|doc| page_filter::sync(&doc, settings.page_filter)) {
            warn!(%err, "page filter not applied");
        }
    });
}

fn watch_filter(
    controller: Rc<Controller<DomHost>>,
    active_filter: Rc<Cell<Option<PageFilter>>>,
) -> Result<(), TransitionError> {
    storage::watch_settings(move |settings| {
        if !storage::context_valid() {
            return;
        }

        let changed = active_filter.replace(Some(settings.page_filter)) != Some(settings.page_filter);
        if changed && controller.is_active() {
            controller.cleanup();
        }

        if let Err(err) = dom::document().and_then(|doc| page_filter::sync(&doc, settings.page_filter)) {
            warn!(%err, "page filter not applied");
        }
    })
}

fn listen_for_skip(controller: Rc<Controller<DomHost>>) -> Result<(), TransitionError> {
    storage::on_message(move |message, _send_response| {
        if let Ok(Message::SkipEffect) = storage::from_js::<Message>(&message) {
            controller.skip();
        }
        false
    })
}

fn intercept_clicks(interceptor: Interceptor<DomHost>) -> Result<(), TransitionError> {
    let on_click = Closure::wrap(Box::new(move |event: MouseEvent| {
        interceptor.handle_click(&DomClick::new(event));
    }) as Box<dyn FnMut(MouseEvent)>);

    // Capture phase, ahead of any router on the page.
    dom::document()?.add_event_listener_with_callback_and_bool(
        "click",
        on_click.as_ref().unchecked_ref(),
        true,
    )?;
    on_click.forget();

    Ok(())
}
