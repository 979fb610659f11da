#![allow(missing_docs)]

/// Colours an effect draws with. Field names follow the cyberpunk pack's
/// roles (`green` is the primary colour of every palette).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPalette {
    pub green: &'static str,
    pub green_dim: &'static str,
    pub amber: &'static str,
    pub red: &'static str,
    pub cyan: &'static str,
    pub bg: &'static str,
    pub panel_bg: &'static str,
}

impl ColorPalette {
    pub const CYBERPUNK: ColorPalette = ColorPalette {
        green: "#00ff41",
        green_dim: "#00aa2a",
        amber: "#ffb000",
        red: "#ff0040",
        cyan: "#00e5ff",
        bg: "#0a0a0a",
        panel_bg: "#0d0d0d",
    };

    pub const CLEAN: ColorPalette = ColorPalette {
        green: "#a0a0a0",
        green_dim: "#666666",
        amber: "#c8a050",
        red: "#c05050",
        cyan: "#6090c0",
        bg: "#1a1a1a",
        panel_bg: "#222222",
    };

    pub const RETRO: ColorPalette = ColorPalette {
        green: "#ff71ce",
        green_dim: "#b34d8f",
        amber: "#b967ff",
        red: "#ff6b9d",
        cyan: "#01cdfe",
        bg: "#1a0a2e",
        panel_bg: "#200d3a",
    };

    pub const NEO: ColorPalette = ColorPalette {
        green: "#ff2d95",
        green_dim: "#991a5c",
        amber: "#b967ff",
        red: "#ff0040",
        cyan: "#00d4ff",
        bg: "#0a0012",
        panel_bg: "#12001f",
    };

    /// Single-hue palette used while a terminal page filter is active.
    pub const fn monochrome(bright: &'static str, dim: &'static str) -> ColorPalette {
        ColorPalette {
            green: bright,
            green_dim: dim,
            amber: bright,
            red: dim,
            cyan: bright,
            bg: "#0a0a0a",
            panel_bg: "#0d0d0d",
        }
    }

    /// CSS custom properties exposing the palette to effect stylesheets.
    pub fn css_variables(&self) -> [(&'static str, &'static str); 6] {
        [
            ("--tfx-green", self.green),
            ("--tfx-green-dim", self.green_dim),
            ("--tfx-amber", self.amber),
            ("--tfx-red", self.red),
            ("--tfx-cyan", self.cyan),
            ("--tfx-bg", self.bg),
        ]
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        ColorPalette::CYBERPUNK
    }
}
