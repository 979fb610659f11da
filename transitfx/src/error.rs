use thiserror::Error;
use transitfx_effects::EffectError;
use wasm_bindgen::JsValue;

/// Everything that can go wrong between a click and the real navigation.
///
/// None of these ever block navigation; callers log them and let the browser
/// proceed.
#[derive(Debug, Error)]
pub enum TransitionError {
    /// The extension was reloaded or removed under the page.
    #[error("extension context invalidated")]
    ContextInvalidated,

    #[error("browser API unavailable: {0}")]
    MissingApi(&'static str),

    #[error("settings could not be decoded: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("DOM operation failed: {0}")]
    Dom(String),

    #[error(transparent)]
    Effect(#[from] EffectError),
}

impl From<JsValue> for TransitionError {
    fn from(value: JsValue) -> Self {
        if let Some(message) = value.as_string() {
            return TransitionError::Dom(message);
        }

        let message = js_sys::Reflect::get(&value, &JsValue::from_str("message"))
            .ok()
            .and_then(|message| message.as_string())
            .unwrap_or_else(|| format!("{value:?}"));

        TransitionError::Dom(message)
    }
}

impl From<TransitionError> for JsValue {
    fn from(error: TransitionError) -> Self {
        js_sys::Error::new(&error.to_string()).into()
    }
}
