//! Service worker: keyboard commands and settings requests from the popup.

use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use tracing::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::error::TransitionError;
use crate::message::{Command, Message};
use crate::settings::{Settings, SettingsPatch};
use crate::storage::{self, call, call_async, from_js, to_js};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActiveTabQuery {
    active: bool,
    current_window: bool,
}

pub fn start() -> Result<(), TransitionError> {
    let on_command = Closure::wrap(Box::new(move |name: JsValue| {
        let Some(command) = name.as_string().as_deref().and_then(Command::parse) else {
            return;
        };

        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = run_command(command).await {
                warn!(?command, %err, "command failed");
            }
        });
    }) as Box<dyn FnMut(JsValue)>);

    call(
        &["commands", "onCommand"],
        "addListener",
        &[on_command.as_ref().clone()],
    )?;
    on_command.forget();

    storage::on_message(handle_message)?;

    info!("background worker ready");
    Ok(())
}

pub async fn run_command(command: Command) -> Result<(), TransitionError> {
    match command {
        Command::ToggleExtension => {
            let settings = storage::load_settings().await?;
            let updated = storage::update_settings(SettingsPatch {
                enabled: Some(!settings.enabled),
                ..SettingsPatch::default()
            })
            .await?;
            info!(enabled = updated.enabled, "extension toggled");
        }
        Command::SkipEffect => {
            let Some(tab_id) = active_tab_id().await? else {
                return Ok(());
            };

            // No content script in this tab (e.g. a browser page) is fine.
            if let Err(err) = call_async(
                &["tabs"],
                "sendMessage",
                &[JsValue::from_f64(tab_id), to_js(&Message::SkipEffect)?],
            )
            .await
            {
                debug!(%err, tab_id, "skip message not delivered");
            }
        }
    }

    Ok(())
}

async fn active_tab_id() -> Result<Option<f64>, TransitionError> {
    let query = to_js(&ActiveTabQuery {
        active: true,
        current_window: true,
    })?;
    let tabs: Array = call_async(&["tabs"], "query", &[query])
        .await?
        .dyn_into()
        .map_err(|_| TransitionError::MissingApi("tabs.query"))?;

    let tab = tabs.get(0);
    if tab.is_undefined() {
        return Ok(None);
    }

    Ok(Reflect::get(&tab, &JsValue::from_str("id"))?.as_f64())
}

fn handle_message(message: JsValue, send_response: Function) -> bool {
    let message = match from_js::<Message>(&message) {
        Ok(message) => message,
        Err(err) => {
            debug!(%err, "ignoring message");
            return false;
        }
    };

    match message {
        Message::GetSettings => {
            respond_later(send_response, storage::load_settings());
            true
        }
        Message::UpdateSettings { payload } => {
            respond_later(send_response, storage::update_settings(payload));
            true
        }
        Message::SkipEffect => false,
    }
}

fn respond_later<F>(send_response: Function, settings: F)
where
    F: std::future::Future<Output = Result<Settings, TransitionError>> + 'static,
{
    wasm_bindgen_futures::spawn_local(async move {
        let response = settings.await.and_then(|settings| to_js(&settings));
        match response {
            Ok(response) => {
                let _ = send_response.call1(&JsValue::NULL, &response);
            }
            Err(err) => {
                warn!(%err, "settings request failed");
                let _ = send_response.call0(&JsValue::NULL);
            }
        }
    });
}
