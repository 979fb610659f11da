use std::collections::VecDeque;
use std::f64::consts::TAU;

use web_sys::CanvasRenderingContext2d;

use super::build;
use super::rain::Rain;
use super::scramble;
use crate::stage::{now_ms, pick, roll};
use crate::{ColorPalette, Effect, EffectEntry, EffectError, Pack, Schedule, Stage};

pub(crate) fn pack() -> Pack<Stage> {
    Pack {
        id: "neo",
        name: "NEO // Eastern",
        description: "Neon-soaked CJK transitions: kanji decryption, neon rain, and spirit gates",
        colors: ColorPalette::NEO,
        effects: vec![
            EffectEntry::new(
                "kanji-decode",
                "Kanji Decode",
                "URL translates through scripts: Latin → Katakana → Kanji → decoded",
                2000,
                build::<KanjiDecode>,
            ),
            EffectEntry::new(
                "neon-rain",
                "Neon Rain",
                "CJK + Hangul + Thai characters rain in hot pink and cyan neon columns",
                1800,
                build::<NeonRain>,
            ),
            EffectEntry::new(
                "cipher-scroll",
                "Cipher Scroll",
                "Horizontal scroll of mixed-script cipher text that locks in as it decodes the URL",
                1800,
                build::<CipherScroll>,
            ),
            EffectEntry::new(
                "pulse-grid",
                "Pulse Grid",
                "Grid of CJK characters ripple outward from center in neon pink waves",
                1800,
                build::<PulseGrid>,
            ),
            EffectEntry::new(
                "spirit-gate",
                "Spirit Gate",
                "Kanji columns slide in like a torii gate, cherry-blossom particles fill the gap",
                2000,
                build::<SpiritGate>,
            ),
        ],
    }
}

const KATAKANA: &str =
    "アイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワヲン";
const KANJI: &str = "電脳網絡接続通信暗号解読転送変換認証起動制御光速量子";
const HANGUL: &str = "가나다라마바사아자차카타파하";
const THAI: &str = "กขคงจฉชซฌญฎฏฐ";

const KANJI_CSS: &str = r#"
  .fx-kanji-label {
    font-size: 11px;
    letter-spacing: 3px;
    color: var(--tfx-amber, #b967ff);
    text-shadow: 0 0 8px rgba(185, 103, 255, 0.5);
    margin-bottom: 20px;
  }
  .fx-kanji-scramble {
    font-size: 16px;
    color: var(--tfx-green, #ff2d95);
    text-shadow: 0 0 8px rgba(255, 45, 149, 0.5);
    word-break: break-all;
    line-height: 2;
    min-height: 60px;
    margin-bottom: 24px;
    letter-spacing: 2px;
  }
  .fx-kanji-track {
    height: 2px;
    background: rgba(255, 45, 149, 0.15);
    border: 1px solid rgba(255, 45, 149, 0.2);
    margin-bottom: 12px;
    overflow: hidden;
  }
  .fx-kanji-bar {
    height: 100%;
    width: 0%;
    background: linear-gradient(90deg, var(--tfx-green, #ff2d95), var(--tfx-cyan, #00d4ff));
    box-shadow: 0 0 8px var(--tfx-green, #ff2d95);
    transition: width 0.05s linear;
  }
  .fx-kanji-status {
    font-size: 10px;
    color: var(--tfx-green-dim, #991a5c);
    letter-spacing: 2px;
  }
  .fx-kanji-resolved {
    color: var(--tfx-cyan, #00d4ff);
    text-shadow: 0 0 6px rgba(0, 212, 255, 0.6);
  }
"#;

struct ScriptPhase {
    glyphs: Vec<char>,
    status: &'static str,
}

fn script_phases() -> [ScriptPhase; 3] {
    [
        ScriptPhase {
            glyphs: KATAKANA.chars().collect(),
            status: "カタカナ変換...",
        },
        ScriptPhase {
            glyphs: KANJI.chars().chain(HANGUL.chars()).collect(),
            status: "漢字解読中...",
        },
        ScriptPhase {
            glyphs: KANJI.chars().chain(THAI.chars()).chain(HANGUL.chars()).collect(),
            status: "最終復号化...",
        },
    ]
}

/// Index of the script phase active at `progress`.
fn phase_index(progress: f64, phases: usize) -> usize {
    let progress = progress.clamp(0.0, 1.0);
    ((progress * phases as f64).floor() as usize).min(phases.saturating_sub(1))
}

/// The URL resolves through katakana, then kanji and hangul, then a mixed set.
#[derive(Debug, Default)]
pub(crate) struct KanjiDecode {
    duration: u32,
    schedule: Schedule,
}

impl Effect<Stage> for KanjiDecode {
    crate::duration_accessors!();

    fn render(&mut self, stage: &Stage, target_url: &str) -> Result<(), EffectError> {
        stage.add_style(KANJI_CSS)?;
        stage.add_text("fx-kanji-label", "> 解読中...DECODING")?;
        let scramble_el = stage.add_text("fx-kanji-scramble", "")?;

        let track = stage.add_text("fx-kanji-track", "")?;
        let bar = stage.element("div", "fx-kanji-bar")?;
        track.append_child(&bar)?;

        let status = stage.add_text("fx-kanji-status", "スクリプト変換中...")?;

        let phases = script_phases();
        let text = scramble::display_chars(target_url, 50);
        let started = now_ms();
        let duration = f64::from(self.duration.max(1));

        self.schedule.every(40, move || {
            let progress = ((now_ms() - started) / duration).min(1.0);
            let _ = bar.style().set_property("width", &format!("{}%", progress * 100.0));

            let phase = &phases[phase_index(progress, phases.len())];
            status.set_text_content(Some(phase.status));
            scramble_el.set_inner_html(&scramble::compose(
                &text,
                progress,
                &phase.glyphs,
                "fx-kanji-resolved",
                roll,
            ));

            if progress >= 1.0 {
                status.set_text_content(Some("接続完了 // CONNECTION ESTABLISHED"));
                let style = status.style();
                let _ = style.set_property("color", "var(--tfx-cyan, #00d4ff)");
                let _ = style.set_property("text-shadow", "0 0 10px rgba(0, 212, 255, 0.6)");
                return false;
            }

            true
        })
    }

    fn destroy(&mut self) {
        self.schedule.clear();
    }
}

const NEON_RAIN_CSS: &str = r#"
  .fx-nrain-canvas {
    position: absolute;
    top: 0; left: 0;
    width: 100%; height: 100%;
    z-index: 5;
  }
  .fx-nrain-label {
    z-index: 10;
    position: relative;
    font-size: 14px;
    letter-spacing: 3px;
    color: var(--tfx-cyan, #00d4ff);
    text-shadow: 0 0 12px rgba(0, 212, 255, 0.6);
    animation: transitfx-pulse 0.8s ease-in-out infinite alternate;
  }
"#;

#[derive(Debug, Default)]
pub(crate) struct NeonRain {
    duration: u32,
    schedule: Schedule,
}

impl Effect<Stage> for NeonRain {
    crate::duration_accessors!();

    fn render(&mut self, stage: &Stage, _target_url: &str) -> Result<(), EffectError> {
        stage.add_style(NEON_RAIN_CSS)?;
        let (canvas, ctx) = stage.add_canvas("fx-nrain-canvas")?;
        stage.add_text("fx-nrain-label", "ネオン接続 // NEON LINK")?;

        let glyphs = "アイウエオカキクケコサシスセソタチツテト\
                      電脳網絡接続通信暗号解読\
                      가나다라마바사아자차카타파하\
                      กขคงจฉชซฌญฎฏ\
                      01234567ABCDEF";

        Rain {
            font_size: 16.0,
            font_family: "'MS Gothic', 'Noto Sans CJK', monospace",
            glyphs: glyphs.chars().collect(),
            // 0x14 alpha, roughly 8%.
            fade: format!("{}14", stage.palette.bg),
            primary: stage.palette.green.to_owned(),
            secondary: stage.palette.cyan.to_owned(),
            bright_heads: true,
            start_depth: 30,
            reset_above: 0.97,
            swap_chance: 0.3,
        }
        .start(&mut self.schedule, canvas, ctx)
    }

    fn destroy(&mut self) {
        self.schedule.clear();
    }
}

const PULSE_GRID_CSS: &str = r#"
  .fx-pgrid-status {
    position: relative;
    z-index: 10;
    font-size: 10px;
    letter-spacing: 2px;
    color: var(--tfx-green-dim, #991a5c);
    margin-top: 8px;
  }
"#;

const GRID_GLYPHS: &str = "電脳網絡接続通信暗号解読転送変換認証起動制御光速量子アイウエオカキクケコ가나다라마바사";
const CELL_SIZE: f64 = 24.0;
const WAVE_WIDTH: f64 = 4.0;
// Chance that a cell settles on the next hostname character.
const URL_CELL_CHANCE: f64 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tone {
    /// On the expanding wave front.
    Front,
    /// Behind the wave, showing its final glyph.
    Settled,
    /// Reached by the wave but still scrambling.
    Passed,
    /// Not reached yet.
    Dim,
}

#[derive(Debug, Clone)]
struct GridCell {
    glyph: char,
    final_glyph: char,
    dist: f64,
    settled: bool,
}

/// Cells of the ripple grid, kept apart from the canvas.
#[derive(Debug, Clone)]
struct RippleGrid {
    cols: usize,
    cells: Vec<GridCell>,
    max_dist: f64,
}

impl RippleGrid {
    fn new(cols: usize, rows: usize, hostname: &str, glyphs: &[char], mut roll: impl FnMut() -> f64) -> Self {
        let cx = cols as f64 / 2.0;
        let cy = rows as f64 / 2.0;
        let mut url_chars = hostname.chars();
        let pick = |roll: f64| glyphs[((roll * glyphs.len() as f64) as usize).min(glyphs.len() - 1)];

        let mut cells = Vec::with_capacity(cols * rows);
        for r in 0..rows {
            for c in 0..cols {
                let dx = c as f64 - cx;
                let dy = r as f64 - cy;
                let mut final_glyph = pick(roll());
                if roll() < URL_CELL_CHANCE {
                    if let Some(ch) = url_chars.next() {
                        final_glyph = ch;
                    }
                }
                cells.push(GridCell {
                    glyph: pick(roll()),
                    final_glyph,
                    dist: (dx * dx + dy * dy).sqrt(),
                    settled: false,
                });
            }
        }

        Self {
            cols,
            cells,
            max_dist: (cx * cx + cy * cy).sqrt(),
        }
    }

    /// Advance the ripple to `progress` and report each cell's tone.
    ///
    /// Cells settle once the wave front is two widths past them; until then a
    /// reached cell rerolls its glyph every call.
    fn sweep(&mut self, progress: f64, glyphs: &[char], mut roll: impl FnMut() -> f64) -> Vec<Tone> {
        let radius = progress.clamp(0.0, 1.0) * self.max_dist * 1.5;

        self.cells
            .iter_mut()
            .map(|cell| {
                let hit = cell.dist < radius;
                let front = (cell.dist - radius).abs() < WAVE_WIDTH;

                if hit && !cell.settled {
                    if cell.dist < radius - WAVE_WIDTH * 2.0 {
                        cell.settled = true;
                        cell.glyph = cell.final_glyph;
                    } else if !glyphs.is_empty() {
                        let idx = ((roll() * glyphs.len() as f64) as usize).min(glyphs.len() - 1);
                        cell.glyph = glyphs[idx];
                    }
                }

                if front {
                    Tone::Front
                } else if cell.settled {
                    Tone::Settled
                } else if hit {
                    Tone::Passed
                } else {
                    Tone::Dim
                }
            })
            .collect()
    }
}

fn paint_cell(ctx: &CanvasRenderingContext2d, tone: Tone, primary: &str, secondary: &str, dim: &str) {
    match tone {
        Tone::Front => {
            ctx.set_fill_style_str("#ffffff");
            ctx.set_shadow_color(primary);
            ctx.set_shadow_blur(12.0);
        }
        Tone::Settled => {
            ctx.set_fill_style_str(primary);
            ctx.set_shadow_color(primary);
            ctx.set_shadow_blur(4.0);
        }
        Tone::Passed => {
            ctx.set_fill_style_str(secondary);
            ctx.set_shadow_color(secondary);
            ctx.set_shadow_blur(2.0);
        }
        Tone::Dim => {
            ctx.set_fill_style_str(dim);
            ctx.set_shadow_blur(0.0);
        }
    }
}

/// Glyph grid that settles as a ripple spreads from the centre.
#[derive(Debug, Default)]
pub(crate) struct PulseGrid {
    duration: u32,
    schedule: Schedule,
}

impl Effect<Stage> for PulseGrid {
    crate::duration_accessors!();

    fn render(&mut self, stage: &Stage, target_url: &str) -> Result<(), EffectError> {
        let (canvas, ctx) = stage.add_canvas("")?;
        stage.add_style(PULSE_GRID_CSS)?;
        let status = stage.add_text("fx-pgrid-status", "パルス同期中 // SYNCING")?;

        let w = f64::from(canvas.width());
        let h = f64::from(canvas.height());
        let cols = (w / CELL_SIZE).ceil() as usize;
        let rows = (h / CELL_SIZE).ceil() as usize;

        let glyphs: Vec<char> = GRID_GLYPHS.chars().collect();
        let hostname = transitfx_utils::hostname(target_url).unwrap_or(target_url);
        let mut grid = RippleGrid::new(cols, rows, hostname, &glyphs, roll);

        let primary = stage.palette.green.to_owned();
        let secondary = stage.palette.cyan.to_owned();
        let (r, g, b) = transitfx_utils::hex_to_rgb(&primary).unwrap_or((255, 45, 149));
        let dim = format!("rgba({r}, {g}, {b}, 0.15)");
        let font = format!("{}px 'MS Gothic', 'Noto Sans CJK', monospace", CELL_SIZE - 4.0);

        let duration = f64::from(self.duration.max(1));
        let mut started = None;

        self.schedule.animate(move |now| {
            let start = *started.get_or_insert(now);
            let progress = ((now - start) / duration).min(1.0);

            ctx.clear_rect(0.0, 0.0, w, h);
            ctx.set_font(&font);
            ctx.set_text_align("center");
            ctx.set_text_baseline("middle");

            let tones = grid.sweep(progress, &glyphs, roll);
            for (idx, (cell, tone)) in grid.cells.iter().zip(tones).enumerate() {
                let x = (idx % grid.cols) as f64 * CELL_SIZE + CELL_SIZE / 2.0;
                let y = (idx / grid.cols) as f64 * CELL_SIZE + CELL_SIZE / 2.0;

                paint_cell(&ctx, tone, &primary, &secondary, &dim);
                let _ = ctx.fill_text(cell.glyph.encode_utf8(&mut [0; 4]), x, y);
                ctx.set_shadow_blur(0.0);
            }

            if progress >= 1.0 {
                status.set_text_content(Some("同期完了 // SYNCED"));
                let _ = status.style().set_property("color", "var(--tfx-cyan, #00d4ff)");
                return false;
            }

            true
        })
    }

    fn destroy(&mut self) {
        self.schedule.clear();
    }
}

const CIPHER_CSS: &str = r#"
  .fx-cipher-decoded {
    position: relative;
    z-index: 10;
    font-size: 13px;
    color: var(--tfx-cyan, #00d4ff);
    text-shadow: 0 0 8px rgba(0, 212, 255, 0.5);
    word-break: break-all;
    letter-spacing: 1px;
    margin-bottom: 16px;
    min-height: 1.5em;
  }
  .fx-cipher-status {
    position: relative;
    z-index: 10;
    font-size: 10px;
    letter-spacing: 2px;
    color: var(--tfx-green-dim, #991a5c);
  }
"#;

const CIPHER_GLYPHS: &str = "漢字解読暗号電脳ハングルカタカナกขคงΔΩΣΞΛΠ01ABCDEF";
const CIPHER_FONT: f64 = 18.0;

/// One band of cipher text scrolling left.
#[derive(Debug, Clone)]
struct CipherRow {
    offset: f64,
    speed: f64,
    y: f64,
    text: VecDeque<char>,
}

impl CipherRow {
    /// Slide by `speed`; each whole glyph scrolled off the left is replaced
    /// on the right by `next()`.
    fn scroll(&mut self, mut next: impl FnMut() -> char) {
        self.offset += self.speed;
        if self.offset > CIPHER_FONT {
            self.offset -= CIPHER_FONT;
            self.text.pop_front();
            self.text.push_back(next());
        }
    }
}

fn cipher_rows(w: f64, h: f64, glyphs: &[char], mut roll: impl FnMut() -> f64) -> Vec<CipherRow> {
    let rows = (h / (CIPHER_FONT * 2.0)).floor().max(0.0) as usize;
    let per_row = (w / CIPHER_FONT).ceil().max(0.0) as usize + 10;
    let glyph = |roll: f64| glyphs[((roll * glyphs.len() as f64) as usize).min(glyphs.len() - 1)];

    (0..rows)
        .map(|r| CipherRow {
            offset: 0.0,
            speed: 0.5 + roll() * 2.0,
            y: r as f64 * CIPHER_FONT * 2.0 + CIPHER_FONT,
            text: (0..per_row).map(|_| glyph(roll())).collect(),
        })
        .collect()
}

/// The decoded part of `url` at `progress`, with a block cursor until done.
fn decoded_prefix(url: &[char], progress: f64) -> String {
    let progress = progress.clamp(0.0, 1.0);
    let len = ((progress * url.len() as f64).floor() as usize).min(url.len());

    let mut shown: String = url[..len].iter().collect();
    if progress < 1.0 {
        shown.push('█');
    }
    shown
}

/// Rows of mixed-script cipher scroll past while the URL locks in.
#[derive(Debug, Default)]
pub(crate) struct CipherScroll {
    duration: u32,
    schedule: Schedule,
}

impl Effect<Stage> for CipherScroll {
    crate::duration_accessors!();

    fn render(&mut self, stage: &Stage, target_url: &str) -> Result<(), EffectError> {
        let (canvas, ctx) = stage.add_canvas("")?;
        stage.add_style(CIPHER_CSS)?;
        let decoded = stage.add_text("fx-cipher-decoded", "")?;
        let status = stage.add_text("fx-cipher-status", "暗号解読 // DECIPHERING")?;

        let (w, h) = (f64::from(canvas.width()), f64::from(canvas.height()));
        let glyphs: Vec<char> = CIPHER_GLYPHS.chars().collect();
        let mut rows = cipher_rows(w, h, &glyphs, roll);

        let (gr, gg, gb) = transitfx_utils::hex_to_rgb(stage.palette.green).unwrap_or((255, 45, 149));
        let (cr, cg, cb) = transitfx_utils::hex_to_rgb(stage.palette.cyan).unwrap_or((0, 212, 255));
        let accents = [
            (w * 0.25, stage.palette.green.to_owned()),
            (w * 0.5, stage.palette.amber.to_owned()),
            (w * 0.75, stage.palette.cyan.to_owned()),
        ];

        let url: Vec<char> =
            transitfx_utils::truncate_chars(transitfx_utils::host_and_path(target_url), 40)
                .chars()
                .collect();
        let font = format!("{CIPHER_FONT}px 'MS Gothic', 'Noto Sans CJK', monospace");
        let duration = f64::from(self.duration.max(1));
        let mut started = None;

        self.schedule.animate(move |now| {
            let start = *started.get_or_insert(now);
            let progress = ((now - start) / duration).min(1.0);

            ctx.set_fill_style_str("rgba(10, 0, 18, 0.15)");
            ctx.fill_rect(0.0, 0.0, w, h);
            ctx.set_font(&font);

            for (idx, row) in rows.iter_mut().enumerate() {
                row.scroll(|| pick(&glyphs));

                let alpha = 0.3 + roll() * 0.2;
                ctx.set_fill_style_str(&if idx % 2 == 0 {
                    format!("rgba({gr}, {gg}, {gb}, {alpha})")
                } else {
                    format!("rgba({cr}, {cg}, {cb}, {alpha})")
                });

                for (col, glyph) in row.text.iter().enumerate() {
                    let x = col as f64 * CIPHER_FONT - row.offset;
                    if x > -CIPHER_FONT && x < w + CIPHER_FONT {
                        let _ = ctx.fill_text(glyph.encode_utf8(&mut [0; 4]), x, row.y);
                    }
                }
            }

            for (idx, (x, color)) in accents.iter().enumerate() {
                ctx.set_stroke_style_str(color);
                ctx.set_global_alpha(0.1 + (now / 200.0 + idx as f64).sin() * 0.1);
                ctx.set_line_width(1.0);
                ctx.begin_path();
                ctx.move_to(*x, 0.0);
                ctx.line_to(*x, h);
                ctx.stroke();
            }
            ctx.set_global_alpha(1.0);

            decoded.set_text_content(Some(&decoded_prefix(&url, progress)));

            if progress >= 1.0 {
                status.set_text_content(Some("復号完了 // DECIPHERED"));
                let _ = status.style().set_property("color", "var(--tfx-cyan, #00d4ff)");
                return false;
            }

            true
        })
    }

    fn destroy(&mut self) {
        self.schedule.clear();
    }
}

const GATE_CSS: &str = r#"
  .fx-gate-text {
    position: relative;
    z-index: 10;
    font-size: 12px;
    letter-spacing: 3px;
    color: var(--tfx-cyan, #00d4ff);
    text-shadow: 0 0 10px rgba(0, 212, 255, 0.6);
    opacity: 0;
    transition: opacity 0.4s;
  }
  .fx-gate-text.visible { opacity: 1; }
"#;

const GATE_KANJI: &str = "鳥居門神社光道霊魂永遠夢幻桜花風月星雲";
const GATE_FONT: f64 = 28.0;
const COLUMN_WIDTH: f64 = 60.0;
const GATE_GAP: f64 = 200.0;
const PETAL_TINTS: [&str; 2] = ["#ffb3d9", "#ffffff"];

/// Where the gate columns stand and how visible they are.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GatePose {
    left_x: f64,
    right_x: f64,
    alpha: f64,
    beam_alpha: f64,
}

/// Columns slide in until 35%, hold until 70%, then fade. The crossbar
/// fades in from 30%.
fn gate_pose(progress: f64, w: f64) -> GatePose {
    let progress = progress.clamp(0.0, 1.0);
    let left_target = (w - GATE_GAP) / 2.0 - COLUMN_WIDTH;
    let right_target = (w + GATE_GAP) / 2.0;

    let (left_x, right_x, alpha) = if progress < 0.35 {
        let eased = 1.0 - (1.0 - progress / 0.35).powi(3);
        (
            -COLUMN_WIDTH + eased * (left_target + COLUMN_WIDTH),
            w - eased * (w - right_target),
            1.0,
        )
    } else if progress < 0.7 {
        (left_target, right_target, 1.0)
    } else {
        (left_target, right_target, (1.0 - (progress - 0.7) / 0.3).max(0.0))
    };

    let beam_alpha = if progress > 0.3 {
        alpha * ((progress - 0.3) / 0.1).min(1.0)
    } else {
        0.0
    };

    GatePose {
        left_x,
        right_x,
        alpha,
        beam_alpha,
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Petal {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    size: f64,
    alpha: f64,
    rotation: f64,
    spin: f64,
    tint: usize,
}

/// Blossom particles released through the gate while it stands.
#[derive(Debug, Default)]
struct Petals {
    items: Vec<Petal>,
}

impl Petals {
    fn step(&mut self, progress: f64, w: f64, h: f64, tints: usize, mut roll: impl FnMut() -> f64) {
        if progress > 0.25 && progress < 0.8 && roll() < 0.5 {
            let burst = if progress < 0.5 { 8 } else { 3 };
            for _ in 0..burst {
                self.items.push(Petal {
                    x: w * 0.3 + roll() * w * 0.4,
                    y: roll() * h,
                    vx: (roll() - 0.5) * 3.0,
                    vy: (roll() - 0.5) * 2.0 - 0.5,
                    size: 2.0 + roll() * 4.0,
                    alpha: 0.6 + roll() * 0.4,
                    rotation: roll() * TAU,
                    spin: (roll() - 0.5) * 0.1,
                    tint: ((roll() * tints as f64) as usize).min(tints.saturating_sub(1)),
                });
            }
        }

        for petal in &mut self.items {
            petal.x += petal.vx;
            petal.y += petal.vy;
            petal.rotation += petal.spin;
            petal.alpha -= 0.005;
        }
        self.items.retain(|petal| {
            petal.alpha > 0.0
                && (-20.0..=w + 20.0).contains(&petal.x)
                && (-20.0..=h + 20.0).contains(&petal.y)
        });
    }
}

/// Kanji columns close in like a torii gate and blossoms drift through it.
#[derive(Debug, Default)]
pub(crate) struct SpiritGate {
    duration: u32,
    schedule: Schedule,
}

impl Effect<Stage> for SpiritGate {
    crate::duration_accessors!();

    fn render(&mut self, stage: &Stage, _target_url: &str) -> Result<(), EffectError> {
        let (canvas, ctx) = stage.add_canvas("")?;
        stage.add_style(GATE_CSS)?;
        let text = stage.add_text("fx-gate-text", "通過 // PASSAGE")?;

        let (w, h) = (f64::from(canvas.width()), f64::from(canvas.height()));
        let kanji: Vec<char> = GATE_KANJI.chars().collect();
        let column_len = (h / GATE_FONT).ceil().max(0.0) as usize;
        let left: Vec<char> = (0..column_len).map(|_| pick(&kanji)).collect();
        let right: Vec<char> = (0..column_len).map(|_| pick(&kanji)).collect();

        let palette = stage.palette;
        let tints: Vec<&'static str> = [palette.green, palette.green_dim, palette.red]
            .into_iter()
            .chain(PETAL_TINTS)
            .collect();
        let font = format!("{GATE_FONT}px 'MS Gothic', 'Noto Sans CJK', serif");

        let duration = f64::from(self.duration.max(1));
        let mut petals = Petals::default();
        let mut started = None;

        self.schedule.animate(move |now| {
            let start = *started.get_or_insert(now);
            let progress = ((now - start) / duration).min(1.0);
            let pose = gate_pose(progress, w);

            ctx.set_fill_style_str("rgba(10, 0, 18, 0.12)");
            ctx.fill_rect(0.0, 0.0, w, h);

            ctx.set_font(&font);
            ctx.set_text_align("center");
            ctx.set_global_alpha(pose.alpha);
            ctx.set_shadow_blur(8.0);
            let columns = [
                (pose.left_x, &left, palette.green),
                (pose.right_x, &right, palette.cyan),
            ];
            for (x, column, color) in columns {
                ctx.set_fill_style_str(color);
                ctx.set_shadow_color(color);
                for (idx, glyph) in column.iter().enumerate() {
                    let y = idx as f64 * GATE_FONT + GATE_FONT;
                    let _ = ctx.fill_text(glyph.encode_utf8(&mut [0; 4]), x + COLUMN_WIDTH / 2.0, y);
                }
            }

            if pose.beam_alpha > 0.0 {
                ctx.set_global_alpha(pose.beam_alpha);
                ctx.set_fill_style_str(palette.amber);
                ctx.set_shadow_color(palette.amber);
                ctx.set_shadow_blur(12.0);
                ctx.fill_rect(pose.left_x, h * 0.15, pose.right_x + COLUMN_WIDTH - pose.left_x, 4.0);
            }
            ctx.set_global_alpha(1.0);
            ctx.set_shadow_blur(0.0);

            petals.step(progress, w, h, tints.len(), roll);
            for petal in &petals.items {
                ctx.save();
                let _ = ctx.translate(petal.x, petal.y);
                let _ = ctx.rotate(petal.rotation);
                ctx.set_global_alpha(petal.alpha);
                ctx.set_fill_style_str(tints[petal.tint]);
                ctx.set_shadow_color(palette.green);
                ctx.set_shadow_blur(4.0);
                ctx.begin_path();
                let _ = ctx.ellipse(0.0, 0.0, petal.size, petal.size * 0.6, 0.0, 0.0, TAU);
                ctx.fill();
                ctx.restore();
            }
            ctx.set_global_alpha(1.0);

            if progress > 0.6 {
                let _ = text.class_list().add_1("visible");
            }

            progress < 1.0
        })
    }

    fn destroy(&mut self) {
        self.schedule.clear();
    }
}
