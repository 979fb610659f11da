//! Whole-page colour filters: terminal tints, scanlines and a CRT look.

use serde::{Deserialize, Serialize};
use tracing::debug;
use web_sys::Document;

use crate::error::TransitionError;
use crate::settings::PageFilter;

const STYLE_ID: &str = "transitfx-page-filter";
const TINT_ID: &str = "transitfx-page-filter-overlay";
const SCANLINE_ID: &str = "transitfx-page-filter-scanlines";
const CACHE_KEY: &str = "transitfx-page-filter-cache";

const LAYER_STYLE: &str = "position:fixed;top:0;left:0;width:100vw;height:100vh;\
                           z-index:2147483647;pointer-events:none;";
const SCANLINES: &str = "repeating-linear-gradient(0deg, rgba(0,0,0,0.12) 0px, \
                         rgba(0,0,0,0.12) 2px, transparent 2px, transparent 4px)";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilterCache {
    page_filter: PageFilter,
}

/// Scrollbar thumb and track colours.
fn scrollbar_colors(filter: PageFilter) -> Option<(&'static str, &'static str)> {
    match filter {
        PageFilter::GreenTerminal => Some(("#1acc00", "#0a3300")),
        PageFilter::BlueTerminal => Some(("#00ccff", "#002a33")),
        PageFilter::PinkTerminal => Some(("#ff0055", "#330011")),
        PageFilter::YellowTerminal => Some(("#ffff00", "#333300")),
        PageFilter::Crt => Some(("#666666", "#1a1a1a")),
        PageFilter::Off => None,
    }
}

/// Colour-blend layer for terminal filters: colour and opacity.
pub fn tint(filter: PageFilter) -> Option<(&'static str, &'static str)> {
    match filter {
        PageFilter::GreenTerminal => Some(("#1acc00", "0.85")),
        PageFilter::BlueTerminal => Some(("#00ccff", "0.85")),
        PageFilter::PinkTerminal => Some(("#ff0055", "0.92")),
        PageFilter::YellowTerminal => Some(("#ffff00", "0.92")),
        PageFilter::Off | PageFilter::Crt => None,
    }
}

/// Stylesheet injected into the page for `filter`.
pub fn filter_css(filter: PageFilter) -> Option<String> {
    let base = if filter.is_terminal() {
        "html { filter: contrast(1.2) brightness(0.9) !important; }"
    } else if filter == PageFilter::Crt {
        "html { filter: contrast(1.15) saturate(0.9) !important; }"
    } else {
        return None;
    };

    let mut css = base.to_owned();
    if let Some((color, track)) = scrollbar_colors(filter) {
        css.push_str(&format!(
            r#"
    html {{
      scrollbar-color: {color} {track} !important;
    }}
    ::-webkit-scrollbar {{ width: 12px; }}
    ::-webkit-scrollbar-track {{ background: {track} !important; }}
    ::-webkit-scrollbar-thumb {{ background: {color} !important; border-radius: 6px; }}
    ::-webkit-scrollbar-thumb:hover {{ filter: brightness(1.2); }}
  "#
        ));
    }

    Some(css)
}

/// Replace whatever filter is on the page with `filter` and cache it.
pub fn apply(document: &Document, filter: PageFilter) -> Result<(), TransitionError> {
    remove_layers(document);
    write_cache(filter);

    let Some(root) = document.document_element() else {
        return Err(TransitionError::MissingApi("document.documentElement"));
    };

    if let Some(css) = filter_css(filter) {
        let style = document.create_element("style")?;
        style.set_id(STYLE_ID);
        style.set_text_content(Some(&css));
        root.append_child(&style)?;
    }

    if let Some((color, opacity)) = tint(filter) {
        let layer = document.create_element("div")?;
        layer.set_id(TINT_ID);
        layer.set_attribute(
            "style",
            &format!(
                "{LAYER_STYLE}background-color:{color};mix-blend-mode:color;opacity:{opacity};"
            ),
        )?;
        root.append_child(&layer)?;
    }

    if filter.has_scanlines() {
        let layer = document.create_element("div")?;
        layer.set_id(SCANLINE_ID);
        layer.set_attribute("style", &format!("{LAYER_STYLE}background:{SCANLINES};"))?;
        root.append_child(&layer)?;
    }

    debug!(filter = filter.as_str(), "page filter applied");
    Ok(())
}

/// Take every filter layer off the page and forget the cached filter.
pub fn remove(document: &Document) {
    remove_layers(document);
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(CACHE_KEY);
    }
}

/// Apply the filter remembered from the last page, without waiting for
/// extension storage. Runs at `document_start`.
pub fn apply_cached(document: &Document) -> Result<(), TransitionError> {
    let Some(raw) = local_storage().and_then(|storage| storage.get_item(CACHE_KEY).ok().flatten())
    else {
        return Ok(());
    };

    let cache: FilterCache = serde_json::from_str(&raw)?;
    if cache.page_filter == PageFilter::Off {
        return Ok(());
    }

    apply(document, cache.page_filter)
}

/// Bring the page in line with the stored setting.
pub fn sync(document: &Document, filter: PageFilter) -> Result<(), TransitionError> {
    if filter == PageFilter::Off {
        remove(document);
        Ok(())
    } else {
        apply(document, filter)
    }
}

fn remove_layers(document: &Document) {
    for id in [STYLE_ID, TINT_ID, SCANLINE_ID] {
        if let Some(element) = document.get_element_by_id(id) {
            element.remove();
        }
    }
}

fn write_cache(filter: PageFilter) {
    let Some(storage) = local_storage() else {
        return;
    };

    if let Ok(raw) = serde_json::to_string(&FilterCache {
        page_filter: filter,
    }) {
        let _ = storage.set_item(CACHE_KEY, &raw);
    }
}

// `localStorage` throws on opaque origins and when storage is disabled.
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_injects_nothing() {
        assert_eq!(filter_css(PageFilter::Off), None);
        assert_eq!(tint(PageFilter::Off), None);
    }

    #[test]
    fn terminal_filters_tint_and_recolour_scrollbars() {
        let css = filter_css(PageFilter::PinkTerminal).unwrap();

        assert!(css.starts_with("html { filter: contrast(1.2) brightness(0.9) !important; }"));
        assert!(css.contains("scrollbar-color: #ff0055 #330011 !important;"));
        assert_eq!(tint(PageFilter::PinkTerminal), Some(("#ff0055", "0.92")));
        assert_eq!(tint(PageFilter::GreenTerminal), Some(("#1acc00", "0.85")));
    }

    #[test]
    fn crt_has_its_own_contrast_but_no_tint() {
        let css = filter_css(PageFilter::Crt).unwrap();

        assert!(css.contains("saturate(0.9)"));
        assert!(css.contains("#666666"));
        assert_eq!(tint(PageFilter::Crt), None);
    }

    #[test]
    fn cache_format_matches_the_early_script() {
        let raw = serde_json::to_string(&FilterCache {
            page_filter: PageFilter::BlueTerminal,
        })
        .unwrap();

        assert_eq!(raw, r#"{"pageFilter":"blue-terminal"}"#);
    }
}
