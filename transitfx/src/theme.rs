use transitfx_effects::{ColorPalette, EffectRegistry};

use crate::settings::PageFilter;

/// Monochrome palette a terminal filter forces onto every effect.
pub fn filter_palette(filter: PageFilter) -> Option<ColorPalette> {
    let palette = match filter {
        PageFilter::GreenTerminal => ColorPalette::monochrome("#1acc00", "#0f7a00"),
        PageFilter::BlueTerminal => ColorPalette::monochrome("#00ccff", "#007a99"),
        PageFilter::PinkTerminal => ColorPalette::monochrome("#ff0055", "#990033"),
        PageFilter::YellowTerminal => ColorPalette::monochrome("#ffff00", "#999900"),
        PageFilter::Off | PageFilter::Crt => return None,
    };

    Some(palette)
}

/// Colours for `effect_id` under `filter`: the filter's palette if it has one,
/// otherwise the effect's own pack palette.
pub fn resolve_palette<S>(
    registry: &EffectRegistry<S>,
    effect_id: &str,
    filter: PageFilter,
) -> ColorPalette {
    filter_palette(filter).unwrap_or_else(|| {
        registry
            .pack_for(effect_id)
            .map(|pack| pack.colors)
            .unwrap_or(ColorPalette::CYBERPUNK)
    })
}
