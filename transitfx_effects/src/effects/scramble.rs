// Character-scramble reveal shared by the decrypt-style effects: the target
// URL resolves left to right while unresolved positions show random glyphs.

use transitfx_utils::{escape_html, escape_html_char};

/// Markup for one scramble frame.
///
/// `progress` in `[0, 1]` decides how many leading characters of `text` are
/// resolved; resolved characters are wrapped in `revealed_class`. Every
/// character, resolved or random, is escaped.
pub(super) fn compose(
    text: &[char],
    progress: f64,
    glyphs: &[char],
    revealed_class: &str,
    mut roll: impl FnMut() -> f64,
) -> String {
    let revealed = revealed_count(text.len(), progress);
    let mut markup = String::with_capacity(text.len() * 8);

    for (idx, &ch) in text.iter().enumerate() {
        if idx < revealed {
            markup.push_str("<span class=\"");
            markup.push_str(revealed_class);
            markup.push_str("\">");
            markup.push_str(&escape_html_char(ch));
            markup.push_str("</span>");
        } else if let Some(&glyph) = glyphs.get(pick(roll(), glyphs.len())) {
            markup.push_str(&escape_html(glyph.encode_utf8(&mut [0; 4])));
        }
    }

    markup
}

pub(super) fn revealed_count(len: usize, progress: f64) -> usize {
    let progress = if progress.is_finite() { progress.clamp(0.0, 1.0) } else { 0.0 };
    ((progress * len as f64).floor() as usize).min(len)
}

/// First `max` characters of `text`.
pub(super) fn display_chars(text: &str, max: usize) -> Vec<char> {
    text.chars().take(max).collect()
}

fn pick(roll: f64, len: usize) -> usize {
    ((roll * len as f64) as usize).min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_revealed_at_start() {
        let text = display_chars("https://a.b", 60);
        let markup = compose(&text, 0.0, &['#'], "ok", || 0.0);

        assert_eq!(markup, "#".repeat(text.len()));
    }

    #[test]
    fn fully_revealed_text_is_escaped() {
        let text = display_chars("/q?<b>x y", 60);
        let markup = compose(&text, 1.0, &['#'], "ok", || 0.0);

        assert!(!markup.contains("<b>"));
        assert!(markup.contains("<span class=\"ok\">&lt;</span>"));
        assert!(markup.contains("<span class=\"ok\">&nbsp;</span>"));
        assert!(!markup.contains('#'));
    }

    #[test]
    fn random_glyphs_are_escaped_too() {
        let text = display_chars("abc", 60);
        let markup = compose(&text, 0.0, &['<', '>'], "ok", || 0.0);

        assert_eq!(markup, "&lt;&lt;&lt;");
    }

    #[test]
    fn reveal_grows_with_progress() {
        assert_eq!(revealed_count(10, 0.55), 5);
        assert_eq!(revealed_count(10, 2.0), 10);
        assert_eq!(revealed_count(10, f64::NAN), 0);
        assert_eq!(display_chars("abcdef", 4).len(), 4);
    }
}
