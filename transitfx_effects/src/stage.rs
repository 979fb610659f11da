use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement};

use crate::{ColorPalette, EffectError};

/// Where a browser effect draws.
///
/// `overlay` is the full-viewport surface (canvases and panels go there);
/// `container` is the centred column for labels and progress bars.
#[derive(Debug, Clone)]
pub struct Stage {
    pub overlay: HtmlElement,
    pub container: HtmlElement,
    pub palette: ColorPalette,
}

impl Stage {
    pub fn document(&self) -> Result<Document, EffectError> {
        self.overlay
            .owner_document()
            .ok_or_else(|| EffectError::Dom("overlay is not attached to a document".to_owned()))
    }

    /// Create an element of `tag` with the given class list, unattached.
    pub fn element(&self, tag: &str, class: &str) -> Result<HtmlElement, EffectError> {
        let element = self.document()?.create_element(tag)?;
        if !class.is_empty() {
            element.set_class_name(class);
        }

        Ok(element.unchecked_into())
    }

    /// Append a `<style>` block scoped to this effect.
    pub fn add_style(&self, css: &str) -> Result<(), EffectError> {
        let style = self.element("style", "")?;
        style.set_text_content(Some(css));
        self.container.append_child(&style)?;
        Ok(())
    }

    /// Append a `div` with optional text to the centred container.
    pub fn add_text(&self, class: &str, text: &str) -> Result<HtmlElement, EffectError> {
        let element = self.element("div", class)?;
        if !text.is_empty() {
            element.set_text_content(Some(text));
        }
        self.container.append_child(&element)?;
        Ok(element)
    }

    /// Append an empty `div` to the full-viewport overlay.
    pub fn add_layer(&self, class: &str) -> Result<HtmlElement, EffectError> {
        let element = self.element("div", class)?;
        self.overlay.append_child(&element)?;
        Ok(element)
    }

    /// Full-viewport canvas behind the container, sized in device pixels of
    /// the overlay (or the window when the overlay reports no size yet).
    pub fn add_canvas(
        &self,
        class: &str,
    ) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), EffectError> {
        let canvas: HtmlCanvasElement = self.element("canvas", class)?.unchecked_into();
        if class.is_empty() {
            canvas.style().set_css_text(
                "position:absolute;top:0;left:0;width:100%;height:100%;z-index:5;",
            );
        }
        self.overlay.append_child(&canvas)?;

        let (width, height) = self.viewport_size()?;
        canvas.set_width(width);
        canvas.set_height(height);

        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| EffectError::Dom("2d canvas context unavailable".to_owned()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(JsValue::from)?;

        Ok((canvas, context))
    }

    fn viewport_size(&self) -> Result<(u32, u32), EffectError> {
        let width = self.overlay.client_width();
        let height = self.overlay.client_height();

        if width > 0 && height > 0 {
            return Ok((width as u32, height as u32));
        }

        let window = web_sys::window().ok_or(EffectError::NoWindow)?;
        let width = window.inner_width()?.as_f64().unwrap_or(0.0);
        let height = window.inner_height()?.as_f64().unwrap_or(0.0);

        Ok((width.max(1.0) as u32, height.max(1.0) as u32))
    }
}

/// Sample in `[0, 1)` from the browser's generator.
pub(crate) fn roll() -> f64 {
    js_sys::Math::random()
}

/// Random element of a non-empty slice.
pub(crate) fn pick<T: Copy>(items: &[T]) -> T {
    let idx = ((roll() * items.len() as f64) as usize).min(items.len().saturating_sub(1));
    items[idx]
}

/// Milliseconds since the epoch, as `Date.now()`.
pub(crate) fn now_ms() -> f64 {
    js_sys::Date::now()
}
