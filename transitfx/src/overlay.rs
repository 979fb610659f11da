use transitfx_effects::ColorPalette;

use crate::settings::PageFilter;

pub const OVERLAY_HOST_ID: &str = "transitfx-overlay-host";
pub const OVERLAY_CLASS: &str = "transitfx-overlay";
pub const CONTAINER_CLASS: &str = "transitfx-container";
pub const SKIP_CLASS: &str = "transitfx-skip";
pub const FLASH_OUT_CLASS: &str = "transitfx-flash-out";
pub const SKIP_LABEL: &str = "SKIP [ESC]";

/// Inline style of the host element, input-transparent until built.
pub const HOST_STYLE: &str = "position:fixed;top:0;left:0;width:100vw;height:100vh;\
                              z-index:2147483647;pointer-events:none;";

/// Shadow-root stylesheet for a transition drawn in `palette`.
pub fn overlay_css(palette: &ColorPalette, filter: PageFilter) -> String {
    let ColorPalette {
        green,
        green_dim,
        cyan,
        bg,
        ..
    } = *palette;

    let mut css = format!(
        r#"
    :host {{
      all: initial;
    }}
    * {{ margin: 0; padding: 0; box-sizing: border-box; }}

    .{OVERLAY_CLASS} {{
      position: fixed;
      top: 0;
      left: 0;
      width: 100vw;
      height: 100vh;
      background: {bg};
      color: {green};
      font-family: 'Courier New', 'Consolas', monospace;
      display: flex;
      align-items: center;
      justify-content: center;
      z-index: 2147483647;
      overflow: hidden;
    }}

    .{CONTAINER_CLASS} {{
      text-align: center;
      z-index: 10;
      max-width: 700px;
      width: 90%;
      position: relative;
    }}

    .{SKIP_CLASS} {{
      position: absolute;
      bottom: 20px;
      right: 20px;
      background: transparent;
      border: 1px solid {green_dim};
      color: {green_dim};
      font-family: 'Courier New', monospace;
      font-size: 11px;
      letter-spacing: 2px;
      padding: 6px 14px;
      cursor: pointer;
      pointer-events: auto;
      z-index: 1001;
      transition: color 0.2s, border-color 0.2s;
    }}

    .{SKIP_CLASS}:hover {{
      color: {cyan};
      border-color: {cyan};
    }}

    /* Holds on the theme background so the old page never shows through. */
    .{FLASH_OUT_CLASS} {{
      transition: opacity 0.25s ease-out;
      opacity: 1 !important;
      background: {bg} !important;
    }}

    @keyframes transitfx-pulse {{
      from {{ opacity: 0.6; }}
      to {{ opacity: 1; }}
    }}

    @keyframes transitfx-fade-in {{
      from {{ opacity: 0; }}
      to {{ opacity: 1; }}
    }}

    @keyframes transitfx-slide-up {{
      from {{ transform: translateY(100%); }}
      to {{ transform: translateY(0); }}
    }}
  "#
    );

    if filter == PageFilter::Crt {
        css.push_str(CRT_SCANLINES_CSS);
    }

    css
}

const CRT_SCANLINES_CSS: &str = r#"
    .transitfx-overlay::after {
      content: '';
      position: absolute;
      top: 0;
      left: 0;
      width: 100%;
      height: 100%;
      background: repeating-linear-gradient(
        0deg,
        rgba(0, 0, 0, 0.15) 0px,
        rgba(0, 0, 0, 0.15) 2px,
        transparent 2px,
        transparent 4px
      );
      pointer-events: none;
      z-index: 1000;
    }
  "#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stylesheet_uses_the_palette() {
        let css = overlay_css(&ColorPalette::NEO, PageFilter::Off);

        assert!(css.contains("background: #0a0012;"));
        assert!(css.contains("border: 1px solid #991a5c;"));
        assert!(css.contains(".transitfx-skip:hover"));
        assert!(!css.contains("::after"));
    }

    #[test]
    fn crt_filter_adds_scanlines() {
        let css = overlay_css(&ColorPalette::CYBERPUNK, PageFilter::Crt);

        assert!(css.contains(".transitfx-overlay::after"));
        assert!(css.contains("repeating-linear-gradient"));
    }
}
