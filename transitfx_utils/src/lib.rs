#![allow(missing_docs)]

// String helpers shared by the core and the effects. Everything here is pure so
// it can be exercised natively.

/// Escape text so it can be spliced into markup built with `set_inner_html`.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }

    escaped
}

/// Same as [`escape_html`] but for a single character, with spaces kept visible.
pub fn escape_html_char(ch: char) -> String {
    match ch {
        ' ' => "&nbsp;".to_owned(),
        _ => escape_html(ch.encode_utf8(&mut [0; 4])),
    }
}

/// Cut `text` to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }

    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

/// Host and path of an absolute URL (`https://a.b/c?d` -> `a.b/c`).
///
/// Falls back to the input when it does not look like `scheme://authority`.
pub fn host_and_path(url: &str) -> &str {
    let Some((_, rest)) = url.split_once("://") else {
        return url;
    };

    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    &rest[..end]
}

/// Hostname of an absolute URL, without port or credentials.
pub fn hostname(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let authority = &rest[..rest.find(['/', '?', '#']).unwrap_or(rest.len())];
    let host_port = authority.rsplit('@').next().unwrap_or(authority);

    let host = if host_port.starts_with('[') {
        &host_port[..host_port.find(']').map(|i| i + 1).unwrap_or(host_port.len())]
    } else {
        host_port.split(':').next().unwrap_or(host_port)
    };

    if host.is_empty() { None } else { Some(host) }
}

/// Parse `#rrggbb` (leading `#` optional) into its channels.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim().trim_start_matches('#');

    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();

    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_neutralises_markup() {
        assert_eq!(
            escape_html("<img src=x onerror=\"alert('x')\">&"),
            "&lt;img src=x onerror=&quot;alert(&#39;x&#39;)&quot;&gt;&amp;"
        );
        assert_eq!(escape_html("plain/path"), "plain/path");
    }

    #[test]
    fn escape_html_char_keeps_spaces_visible() {
        assert_eq!(escape_html_char(' '), "&nbsp;");
        assert_eq!(escape_html_char('<'), "&lt;");
        assert_eq!(escape_html_char('a'), "a");
    }

    #[test]
    fn truncate_chars_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdefgh", 4), "abcd...");
        assert_eq!(truncate_chars("電脳網絡接続", 2), "電脳...");
    }

    #[test]
    fn host_and_path_strips_scheme_query_and_fragment() {
        assert_eq!(
            host_and_path("https://example.com/docs/intro?x=1#top"),
            "example.com/docs/intro"
        );
        assert_eq!(host_and_path("not a url"), "not a url");
    }

    #[test]
    fn hostname_handles_ports_credentials_and_ipv6() {
        assert_eq!(hostname("https://example.com/a"), Some("example.com"));
        assert_eq!(hostname("http://user:pw@example.com:8080/"), Some("example.com"));
        assert_eq!(hostname("http://[::1]:3000/x"), Some("[::1]"));
        assert_eq!(hostname("mailto:someone"), None);
        assert_eq!(hostname("file:///etc/hosts"), None);
    }

    #[test]
    fn hex_to_rgb_parses_palette_colours() {
        assert_eq!(hex_to_rgb("#00e5ff"), Some((0, 229, 255)));
        assert_eq!(hex_to_rgb("ff0040"), Some((255, 0, 64)));
        assert_eq!(hex_to_rgb("#fff"), None);
        assert_eq!(hex_to_rgb("#zzzzzz"), None);
    }
}
