//! `chrome.*` extension APIs reached through `js_sys::Reflect`.

use js_sys::{Function, Object, Promise, Reflect};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::error::TransitionError;
use crate::settings::{SETTINGS_KEY, Settings, SettingsPatch};

/// Walk `chrome.<path>` from the global object.
pub(crate) fn chrome_api(path: &[&'static str]) -> Result<JsValue, TransitionError> {
    let mut value = Reflect::get(&js_sys::global(), &JsValue::from_str("chrome"))
        .map_err(|_| TransitionError::ContextInvalidated)?;

    for &segment in path {
        if value.is_undefined() || value.is_null() {
            return Err(TransitionError::MissingApi(segment));
        }
        value = Reflect::get(&value, &JsValue::from_str(segment))
            .map_err(|_| TransitionError::ContextInvalidated)?;
    }

    if value.is_undefined() || value.is_null() {
        return Err(TransitionError::MissingApi(path.last().copied().unwrap_or("chrome")));
    }

    Ok(value)
}

/// Call `chrome.<path>.<method>(args..)` with `this` bound to the namespace.
pub(crate) fn call(
    path: &[&'static str],
    method: &'static str,
    args: &[JsValue],
) -> Result<JsValue, TransitionError> {
    let namespace = chrome_api(path)?;
    let function: Function = Reflect::get(&namespace, &JsValue::from_str(method))?
        .dyn_into()
        .map_err(|_| TransitionError::MissingApi(method))?;

    let args: js_sys::Array = args.iter().collect();
    Ok(function.apply(&namespace, &args)?)
}

pub(crate) async fn call_async(
    path: &[&'static str],
    method: &'static str,
    args: &[JsValue],
) -> Result<JsValue, TransitionError> {
    let promise: Promise = call(path, method, args)?
        .dyn_into()
        .map_err(|_| TransitionError::MissingApi(method))?;

    Ok(JsFuture::from(promise).await?)
}

/// `chrome.runtime.id` goes away when the extension is reloaded under a live
/// page; touching it afterwards may also throw.
pub fn context_valid() -> bool {
    chrome_api(&["runtime", "id"]).is_ok_and(|id| id.is_truthy())
}

pub(crate) fn to_js<T: Serialize>(value: &T) -> Result<JsValue, TransitionError> {
    let json = serde_json::to_string(value)?;
    Ok(js_sys::JSON::parse(&json)?)
}

pub(crate) fn from_js<T: DeserializeOwned>(value: &JsValue) -> Result<T, TransitionError> {
    let json: String = js_sys::JSON::stringify(value)?.into();
    Ok(serde_json::from_str(&json)?)
}

/// Read settings from `chrome.storage.sync`, migrating legacy keys in place.
pub async fn load_settings() -> Result<Settings, TransitionError> {
    let items = call_async(
        &["storage", "sync"],
        "get",
        &[JsValue::from_str(SETTINGS_KEY)],
    )
    .await?;

    let raw = Reflect::get(&items, &JsValue::from_str(SETTINGS_KEY))?;
    let stored: Option<serde_json::Value> = if raw.is_undefined() || raw.is_null() {
        None
    } else {
        Some(from_js(&raw)?)
    };

    let (settings, migrated) = Settings::from_stored(stored.as_ref());
    if migrated {
        debug!("migrating legacy settings");
        if let Err(err) = save_settings(&settings).await {
            warn!(%err, "could not write migrated settings");
        }
    }

    Ok(settings)
}

pub async fn save_settings(settings: &Settings) -> Result<(), TransitionError> {
    let items = Object::new();
    Reflect::set(&items, &JsValue::from_str(SETTINGS_KEY), &to_js(settings)?)?;
    call_async(&["storage", "sync"], "set", &[items.into()]).await?;
    Ok(())
}

/// Merge `patch` into the stored settings and return the result.
pub async fn update_settings(patch: SettingsPatch) -> Result<Settings, TransitionError> {
    let mut settings = load_settings().await?;
    settings.apply(patch);
    save_settings(&settings).await?;
    Ok(settings)
}

/// Run `on_change` with the new settings whenever another context writes them.
pub fn watch_settings<F>(mut on_change: F) -> Result<(), TransitionError>
where
    F: FnMut(Settings) + 'static,
{
    let listener = Closure::wrap(Box::new(move |changes: JsValue, area: JsValue| {
        if area.as_string().as_deref() != Some("sync") {
            return;
        }

        let Ok(change) = Reflect::get(&changes, &JsValue::from_str(SETTINGS_KEY)) else {
            return;
        };
        if change.is_undefined() {
            return;
        }

        let new_value = Reflect::get(&change, &JsValue::from_str("newValue"))
            .ok()
            .filter(|value| !value.is_undefined() && !value.is_null());
        let stored = match new_value.as_ref().map(from_js::<serde_json::Value>) {
            Some(Ok(stored)) => Some(stored),
            Some(Err(err)) => {
                warn!(%err, "unreadable settings change");
                return;
            }
            None => None,
        };

        on_change(Settings::from_stored(stored.as_ref()).0);
    }) as Box<dyn FnMut(JsValue, JsValue)>);

    call(
        &["storage", "onChanged"],
        "addListener",
        &[listener.as_ref().clone()],
    )?;
    listener.forget();

    Ok(())
}

/// Subscribe to `chrome.runtime.onMessage`.
///
/// `on_message` gets the raw message and a `sendResponse` callback; returning
/// `true` keeps the channel open for an asynchronous response.
pub fn on_message<F>(mut on_message: F) -> Result<(), TransitionError>
where
    F: FnMut(JsValue, Function) -> bool + 'static,
{
    let listener = Closure::wrap(Box::new(
        move |message: JsValue, _sender: JsValue, send_response: JsValue| -> bool {
            match send_response.dyn_into::<Function>() {
                Ok(send_response) => on_message(message, send_response),
                Err(_) => false,
            }
        },
    ) as Box<dyn FnMut(JsValue, JsValue, JsValue) -> bool>);

    call(
        &["runtime", "onMessage"],
        "addListener",
        &[listener.as_ref().clone()],
    )?;
    listener.forget();

    Ok(())
}
