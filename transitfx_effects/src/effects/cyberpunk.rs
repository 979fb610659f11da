use web_sys::HtmlElement;

use super::rain::Rain;
use super::scramble;
use crate::stage::{now_ms, roll};
use crate::{ColorPalette, Effect, EffectEntry, EffectError, Pack, Schedule, Stage};

pub(crate) fn pack() -> Pack<Stage> {
    Pack {
        id: "cyberpunk",
        name: "CYBERPUNK",
        description: "Hacker-themed transitions with decrypt sequences, matrix rain, and glitch effects",
        colors: ColorPalette::CYBERPUNK,
        effects: vec![
            EffectEntry::new(
                "decrypt",
                "Decrypt",
                "Scrambled characters gradually reveal the target URL",
                1800,
                super::build::<Decrypt>,
            ),
            EffectEntry::new(
                "matrix-rain",
                "Matrix Rain",
                "Falling characters cascade down the screen",
                1800,
                super::build::<MatrixRain>,
            ),
            EffectEntry::new(
                "glitch",
                "Glitch",
                "Glitchy text distortion with scan bars",
                1800,
                super::build::<Glitch>,
            ),
            EffectEntry::new(
                "dos-boot",
                "DOS Boot",
                "Simulated BIOS/DOS boot sequence with POST checks",
                1800,
                super::build::<DosBoot>,
            ),
            EffectEntry::new(
                "typewriter",
                "Typewriter",
                "Characters typed out one by one with a blinking cursor",
                1500,
                super::build::<Typewriter>,
            ),
        ],
    }
}

const DECRYPT_CSS: &str = r#"
  .fx-decrypt-label {
    font-size: 11px;
    letter-spacing: 3px;
    color: var(--tfx-amber, #ffb000);
    text-shadow: 0 0 5px rgba(255,176,0,0.5);
    margin-bottom: 20px;
  }
  .fx-decrypt-scramble {
    font-size: 13px;
    color: var(--tfx-green, #00ff41);
    text-shadow: 0 0 5px rgba(0,255,65,0.5);
    word-break: break-all;
    line-height: 1.8;
    min-height: 60px;
    margin-bottom: 24px;
  }
  .fx-decrypt-track {
    height: 2px;
    background: #1a1a1a;
    border: 1px solid rgba(0,255,65,0.15);
    margin-bottom: 12px;
    overflow: hidden;
  }
  .fx-decrypt-bar {
    height: 100%;
    width: 0%;
    background: linear-gradient(90deg, var(--tfx-green, #00ff41), var(--tfx-cyan, #00e5ff));
    box-shadow: 0 0 8px var(--tfx-green, #00ff41);
    transition: width 0.05s linear;
  }
  .fx-decrypt-status {
    font-size: 10px;
    color: var(--tfx-green-dim, #00aa2a);
    letter-spacing: 2px;
  }
  .fx-decrypt-revealed {
    color: var(--tfx-cyan, #00e5ff);
  }
"#;

const DECRYPT_GLYPHS: &str = "0123456789ABCDEF!@#$%^&*()_+-=[]{}|;:<>?/~";

/// Scrambled characters resolve into the target URL.
#[derive(Debug, Default)]
pub(crate) struct Decrypt {
    duration: u32,
    schedule: Schedule,
}

impl Effect<Stage> for Decrypt {
    crate::duration_accessors!();

    fn render(&mut self, stage: &Stage, target_url: &str) -> Result<(), EffectError> {
        stage.add_style(DECRYPT_CSS)?;
        stage.add_text("fx-decrypt-label", "> DECRYPTING INTEL FEED")?;
        let scramble_el = stage.add_text("fx-decrypt-scramble", "")?;

        let track = stage.add_text("fx-decrypt-track", "")?;
        let bar = stage.element("div", "fx-decrypt-bar")?;
        track.append_child(&bar)?;

        let status = stage.add_text("fx-decrypt-status", "ROUTING THROUGH SECURE PROXY...")?;

        let text = scramble::display_chars(target_url, 60);
        let glyphs: Vec<char> = DECRYPT_GLYPHS.chars().collect();
        let started = now_ms();
        let duration = f64::from(self.duration.max(1));

        self.schedule.every(40, move || {
            let progress = ((now_ms() - started) / duration).min(1.0);
            let _ = bar.style().set_property("width", &format!("{}%", progress * 100.0));
            scramble_el.set_inner_html(&scramble::compose(
                &text,
                progress,
                &glyphs,
                "fx-decrypt-revealed",
                roll,
            ));

            if progress >= 1.0 {
                status.set_text_content(Some("CONNECTION ESTABLISHED"));
                let style = status.style();
                let _ = style.set_property("color", "var(--tfx-cyan, #00e5ff)");
                let _ = style.set_property("text-shadow", "0 0 10px rgba(0,229,255,0.6)");
                return false;
            }

            true
        })
    }

    fn destroy(&mut self) {
        self.schedule.clear();
    }
}

const MATRIX_CSS: &str = r#"
  .fx-matrix-canvas {
    position: absolute;
    top: 0; left: 0;
    width: 100%; height: 100%;
    z-index: 5;
  }
  .fx-matrix-label {
    z-index: 10;
    position: relative;
    font-size: 14px;
    letter-spacing: 3px;
    color: var(--tfx-cyan, #00e5ff);
    text-shadow: 0 0 10px rgba(0,229,255,0.6);
    animation: transitfx-pulse 0.8s ease-in-out infinite alternate;
  }
"#;

/// Green glyph columns falling behind a pulsing label.
#[derive(Debug, Default)]
pub(crate) struct MatrixRain {
    duration: u32,
    schedule: Schedule,
}

impl Effect<Stage> for MatrixRain {
    crate::duration_accessors!();

    fn render(&mut self, stage: &Stage, _target_url: &str) -> Result<(), EffectError> {
        stage.add_style(MATRIX_CSS)?;
        let (canvas, ctx) = stage.add_canvas("fx-matrix-canvas")?;
        stage.add_text("fx-matrix-label", "INTERCEPTING SIGNAL")?;

        Rain {
            font_size: 14.0,
            font_family: "Courier New, monospace",
            glyphs: "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789@#$%^&*".chars().collect(),
            fade: "rgba(10, 10, 10, 0.08)".to_owned(),
            primary: stage.palette.green.to_owned(),
            secondary: stage.palette.green.to_owned(),
            bright_heads: false,
            start_depth: 20,
            reset_above: 0.975,
            swap_chance: 0.0,
        }
        .start(&mut self.schedule, canvas, ctx)
    }

    fn destroy(&mut self) {
        self.schedule.clear();
    }
}

const TYPEWRITER_CSS: &str = r#"
  .fx-type-screen {
    text-align: left;
    max-width: 500px;
    margin: 0 auto;
    padding: 20px;
    border: 1px solid rgba(0,255,65,0.1);
    background: rgba(0,0,0,0.3);
    min-height: 120px;
  }
  .fx-type-line {
    font-size: 13px;
    color: var(--tfx-green, #00ff41);
    line-height: 1.8;
    min-height: 1.8em;
  }
  .fx-type-prompt { color: var(--tfx-amber, #ffb000); }
  .fx-type-url { color: var(--tfx-cyan, #00e5ff); word-break: break-all; }
  .fx-type-ok { color: var(--tfx-green, #00ff41); }
  .fx-type-cursor {
    display: inline-block;
    width: 8px;
    height: 14px;
    background: var(--tfx-green, #00ff41);
    animation: fx-type-blink 0.5s step-end infinite;
    vertical-align: text-bottom;
    margin-left: 2px;
  }
  @keyframes fx-type-blink {
    50% { opacity: 0; }
  }
"#;

const CHAR_PERIOD_MS: i32 = 30;
// Pause between lines, in ticks of CHAR_PERIOD_MS.
const LINE_PAUSE_TICKS: u32 = 7;

struct TypedLine {
    prefix: String,
    text: String,
    prefix_el: HtmlElement,
    text_el: HtmlElement,
    line_el: HtmlElement,
}

/// A DOS prompt types out the destination.
#[derive(Debug, Default)]
pub(crate) struct Typewriter {
    duration: u32,
    schedule: Schedule,
}

impl Effect<Stage> for Typewriter {
    crate::duration_accessors!();

    fn render(&mut self, stage: &Stage, target_url: &str) -> Result<(), EffectError> {
        stage.add_style(TYPEWRITER_CSS)?;
        let screen = stage.add_text("fx-type-screen", "")?;

        let short_url = transitfx_utils::truncate_chars(transitfx_utils::host_and_path(target_url), 40);
        let script = [
            ("C:\\> ", format!("cd {short_url}"), "fx-type-prompt", "fx-type-url"),
            ("", "Connecting...".to_owned(), "", ""),
            ("", "Route established.".to_owned(), "", ""),
            ("", "[OK]".to_owned(), "", "fx-type-ok"),
        ];

        let mut lines = Vec::with_capacity(script.len());
        for (prefix, text, prefix_class, text_class) in script {
            let line_el = stage.element("div", "fx-type-line")?;
            let prefix_el = stage.element("span", prefix_class)?;
            let text_el = stage.element("span", text_class)?;
            line_el.append_child(&prefix_el)?;
            line_el.append_child(&text_el)?;
            screen.append_child(&line_el)?;

            lines.push(TypedLine {
                prefix: prefix.to_owned(),
                text,
                prefix_el,
                text_el,
                line_el,
            });
        }

        let cursor = stage.element("span", "fx-type-cursor")?;
        let mut line_idx = 0;
        let mut char_idx = 0;
        let mut pause = 0;

        self.schedule.every(CHAR_PERIOD_MS, move || {
            if pause > 0 {
                pause -= 1;
                return true;
            }

            let Some(line) = lines.get(line_idx) else {
                return false;
            };

            let prefix_len = line.prefix.chars().count();
            let mut chars = line.prefix.chars().chain(line.text.chars()).skip(char_idx);

            match chars.next() {
                Some(ch) => {
                    let target = if char_idx < prefix_len { &line.prefix_el } else { &line.text_el };
                    let mut typed = target.text_content().unwrap_or_default();
                    typed.push(ch);
                    target.set_text_content(Some(&typed));
                    let _ = line.line_el.append_child(&cursor);
                    char_idx += 1;
                    true
                }
                None => {
                    line_idx += 1;
                    char_idx = 0;
                    pause = LINE_PAUSE_TICKS;
                    // The cursor stays parked on the last line.
                    line_idx < lines.len()
                }
            }
        })
    }

    fn destroy(&mut self) {
        self.schedule.clear();
    }
}

const GLITCH_CSS: &str = r#"
  .fx-glitch-text {
    font-size: 28px;
    letter-spacing: 6px;
    color: var(--tfx-green, #00ff41);
    text-shadow: 0 0 10px rgba(0,255,65,0.6);
    position: relative;
    margin-bottom: 20px;
    animation: fx-glitch-skew 0.5s infinite linear alternate-reverse;
    display: inline-block;
  }
  .fx-glitch-text::before,
  .fx-glitch-text::after {
    content: attr(data-text);
    position: absolute;
    top: 0; left: 0;
    width: 100%; height: 100%;
  }
  .fx-glitch-text::before {
    animation: fx-glitch-top 0.3s infinite linear alternate-reverse;
    clip-path: polygon(0 0, 100% 0, 100% 45%, 0 45%);
    color: var(--tfx-red, #ff0040);
    text-shadow: -2px 0 var(--tfx-cyan, #00e5ff);
  }
  .fx-glitch-text::after {
    animation: fx-glitch-bottom 0.3s infinite linear alternate-reverse;
    clip-path: polygon(0 55%, 100% 55%, 100% 100%, 0 100%);
    color: var(--tfx-cyan, #00e5ff);
    text-shadow: 2px 0 var(--tfx-red, #ff0040);
  }
  .fx-glitch-sub {
    font-size: 11px;
    color: var(--tfx-amber, #ffb000);
    letter-spacing: 3px;
    text-shadow: 0 0 5px rgba(255,176,0,0.4);
  }
  .fx-glitch-bar {
    position: absolute;
    left: 0;
    width: 100%;
    height: 3px;
    opacity: 0;
    z-index: 50;
    box-shadow: 0 0 10px var(--tfx-green, #00ff41);
  }
  @keyframes fx-glitch-skew {
    0% { transform: skew(0deg); }
    20% { transform: skew(-1deg); }
    40% { transform: skew(0.5deg); }
    60% { transform: skew(-0.3deg); }
    80% { transform: skew(0.8deg); }
    100% { transform: skew(0deg); }
  }
  @keyframes fx-glitch-top {
    0% { transform: translate(0); }
    20% { transform: translate(-3px, 2px); }
    40% { transform: translate(3px, -1px); }
    60% { transform: translate(-1px, 1px); }
    80% { transform: translate(2px, -2px); }
    100% { transform: translate(0); }
  }
  @keyframes fx-glitch-bottom {
    0% { transform: translate(0); }
    20% { transform: translate(2px, -1px); }
    40% { transform: translate(-2px, 2px); }
    60% { transform: translate(1px, -1px); }
    80% { transform: translate(-3px, 1px); }
    100% { transform: translate(0); }
  }
"#;

const BAR_PERIOD_MS: i32 = 80;
// The label locks this long before the transition ends.
const LOCK_LEAD_MS: u32 = 400;

/// One horizontal scan bar flashed across the overlay.
#[derive(Debug, Clone, PartialEq)]
struct ScanBar {
    top_pct: u32,
    height_px: f64,
    opacity: f64,
    red: bool,
    lifetime_ms: f64,
}

impl ScanBar {
    fn random(mut roll: impl FnMut() -> f64) -> Self {
        Self {
            top_pct: ((roll() * 100.0) as u32).min(99),
            height_px: 2.0 + roll() * 6.0,
            opacity: 0.7 + roll() * 0.3,
            red: roll() <= 0.5,
            lifetime_ms: 100.0 + roll() * 150.0,
        }
    }

    fn color(&self) -> &'static str {
        if self.red {
            "var(--tfx-red, #ff0040)"
        } else {
            "var(--tfx-green, #00ff41)"
        }
    }
}

/// Split-channel label over flickering scan bars, locking near the end.
#[derive(Debug, Default)]
pub(crate) struct Glitch {
    duration: u32,
    schedule: Schedule,
}

impl Effect<Stage> for Glitch {
    crate::duration_accessors!();

    fn render(&mut self, stage: &Stage, _target_url: &str) -> Result<(), EffectError> {
        stage.add_style(GLITCH_CSS)?;
        let label = stage.add_text("fx-glitch-text", "SIGNAL LOCK")?;
        label.set_attribute("data-text", "SIGNAL LOCK")?;
        let sub = stage.add_text("fx-glitch-sub", "ACQUIRING TARGET FEED...")?;

        let lock_at = self.duration.saturating_sub(LOCK_LEAD_MS);
        let bars_stage = stage.clone();
        let started = now_ms();
        let mut live: Vec<(HtmlElement, f64)> = Vec::new();

        self.schedule.every(BAR_PERIOD_MS, move || {
            let now = now_ms();
            let locked = now - started >= f64::from(lock_at);

            live.retain(|(bar, expires)| {
                let keep = !locked && *expires > now;
                if !keep {
                    bar.remove();
                }
                keep
            });

            if locked {
                return false;
            }

            let spec = ScanBar::random(roll);
            let Ok(bar) = bars_stage.add_layer("fx-glitch-bar") else {
                return true;
            };
            let style = bar.style();
            let _ = style.set_property("top", &format!("{}%", spec.top_pct));
            let _ = style.set_property("height", &format!("{}px", spec.height_px));
            let _ = style.set_property("opacity", &spec.opacity.to_string());
            let _ = style.set_property("background", spec.color());
            live.push((bar, now + spec.lifetime_ms));

            true
        })?;

        self.schedule.after(lock_at as i32, move || {
            label.set_text_content(Some("LOCKED"));
            let _ = label.set_attribute("data-text", "LOCKED");
            sub.set_text_content(Some("ROUTING COMPLETE"));
            let _ = sub.style().set_property("color", "var(--tfx-cyan, #00e5ff)");
        })
    }

    fn destroy(&mut self) {
        self.schedule.clear();
    }
}

const DOS_CSS: &str = r#"
  .fx-dos-screen {
    text-align: left;
    max-width: 550px;
    margin: 0 auto;
    font-size: 13px;
    line-height: 1.6;
  }
  .fx-dos-line {
    opacity: 0;
    transition: opacity 0.05s;
    white-space: pre;
  }
  .fx-dos-line.visible { opacity: 1; }
  .fx-dos-ok { color: var(--tfx-green, #00ff41); }
  .fx-dos-warn { color: var(--tfx-amber, #ffb000); }
  .fx-dos-header {
    color: var(--tfx-cyan, #00e5ff);
    margin-bottom: 8px;
  }
  .fx-dos-dim { color: #555; }
  .fx-dos-cursor {
    display: inline-block;
    width: 8px;
    height: 13px;
    background: var(--tfx-green, #00ff41);
    animation: fx-dos-blink 0.5s step-end infinite;
    vertical-align: text-bottom;
  }
  @keyframes fx-dos-blink {
    50% { opacity: 0; }
  }
"#;

/// POST lines with their tone class, ending on `Ready.`.
fn boot_script(hostname: &str) -> Vec<(String, &'static str)> {
    [
        ("TransitFX BIOS v1.0", "fx-dos-header"),
        ("Copyright (C) 2026 TransitFX Systems", "fx-dos-dim"),
        ("", ""),
        ("Memory Test: 640K OK", "fx-dos-ok"),
        ("Detecting network adapter...    [OK]", ""),
        ("Loading routing tables...       [OK]", ""),
        ("", "fx-dos-warn"),
        ("DNS lookup complete.            [OK]", "fx-dos-ok"),
        ("Establishing TCP connection...  [OK]", ""),
        ("TLS handshake...                [OK]", "fx-dos-ok"),
        ("", ""),
        ("Ready.", "fx-dos-ok"),
    ]
    .into_iter()
    .map(|(text, class)| {
        let text = if class == "fx-dos-warn" {
            format!("Resolving {hostname}...")
        } else {
            text.to_owned()
        };
        (text, class)
    })
    .collect()
}

/// Spacing between lines so the prompt appears one slot before the end.
fn line_interval(duration: u32, lines: usize) -> f64 {
    f64::from(duration) / (lines + 2) as f64
}

/// A BIOS screen prints its checks line by line, then a blinking prompt.
#[derive(Debug, Default)]
pub(crate) struct DosBoot {
    duration: u32,
    schedule: Schedule,
}

impl Effect<Stage> for DosBoot {
    crate::duration_accessors!();

    fn render(&mut self, stage: &Stage, target_url: &str) -> Result<(), EffectError> {
        stage.add_style(DOS_CSS)?;
        let screen = stage.add_text("fx-dos-screen", "")?;

        let script = boot_script(transitfx_utils::hostname(target_url).unwrap_or("unknown"));
        let interval = line_interval(self.duration, script.len());
        let reveal_at = |slot: usize| (slot as f64 * interval) as i32;

        for (idx, (text, class)) in script.iter().enumerate() {
            let classes = if class.is_empty() {
                "fx-dos-line".to_owned()
            } else {
                format!("fx-dos-line {class}")
            };
            let line = stage.element("div", &classes)?;
            line.set_text_content(Some(text));
            screen.append_child(&line)?;

            self.schedule.after(reveal_at(idx + 1), move || {
                let _ = line.class_list().add_1("visible");
            })?;
        }

        let prompt_line = stage.element("div", "fx-dos-line")?;
        let prompt = stage.element("span", "")?;
        prompt.set_text_content(Some("C:\\> "));
        let cursor = stage.element("span", "fx-dos-cursor")?;
        prompt_line.append_child(&prompt)?;
        prompt_line.append_child(&cursor)?;
        screen.append_child(&prompt_line)?;

        self.schedule.after(reveal_at(script.len() + 1), move || {
            let _ = prompt_line.class_list().add_1("visible");
        })
    }

    fn destroy(&mut self) {
        self.schedule.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_bars_stay_on_screen() {
        let low = ScanBar::random(|| 0.0);
        assert_eq!(low.top_pct, 0);
        assert_eq!(low.height_px, 2.0);
        assert!(low.red);
        assert_eq!(low.lifetime_ms, 100.0);

        let high = ScanBar::random(|| 0.999);
        assert_eq!(high.top_pct, 99);
        assert!(high.opacity <= 1.0);
        assert!(!high.red);
        assert_eq!(high.color(), "var(--tfx-green, #00ff41)");
    }

    #[test]
    fn boot_script_resolves_the_target_host() {
        let script = boot_script("docs.rs");

        assert_eq!(script.len(), 12);
        assert_eq!(script[6], ("Resolving docs.rs...".to_owned(), "fx-dos-warn"));
        assert_eq!(script.last().map(|(text, _)| text.as_str()), Some("Ready."));
    }

    #[test]
    fn prompt_appears_before_the_transition_ends() {
        let interval = line_interval(1800, 12);

        assert!((interval - 128.57).abs() < 0.01);
        assert!(13.0 * interval < 1800.0);
    }
}
