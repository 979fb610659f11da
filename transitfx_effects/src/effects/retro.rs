use std::f64::consts::{FRAC_PI_2, TAU};

use wasm_bindgen::Clamped;
use web_sys::{CanvasRenderingContext2d, ImageData};

use super::build;
use crate::stage::{pick, roll};
use crate::{ColorPalette, Effect, EffectEntry, EffectError, Pack, Schedule, Stage};

pub(crate) fn pack() -> Pack<Stage> {
    Pack {
        id: "retro",
        name: "STATIC // Retro",
        description: "Old-school tech nostalgia: VHS glitches, CRT shutdowns, and teletext pages",
        colors: ColorPalette::RETRO,
        effects: vec![
            EffectEntry::new(
                "crt-shutdown",
                "CRT Shutdown",
                "Classic CRT monitor shutdown, collapsing to a horizontal line then a dot",
                1200,
                build::<CrtShutdown>,
            ),
            EffectEntry::new(
                "teletext",
                "Teletext",
                "Ceefax/Teletext blocky character page with page number loading",
                1500,
                build::<Teletext>,
            ),
            EffectEntry::new(
                "vhs-tracking",
                "VHS Tracking",
                "Warped VHS tracking lines with static noise",
                1400,
                build::<VhsTracking>,
            ),
            EffectEntry::new(
                "channel-flip",
                "Channel Flip",
                "TV channel-change static burst with channel number overlay",
                1400,
                build::<ChannelFlip>,
            ),
            EffectEntry::new(
                "filmstrip",
                "Filmstrip",
                "Old film countdown leader with sprocket holes and scratches",
                1600,
                build::<Filmstrip>,
            ),
        ],
    }
}

const CRT_CSS: &str = r#"
  .fx-crt-screen {
    position: absolute;
    top: 0; left: 0;
    width: 100%; height: 100%;
    background: #111;
    z-index: 5;
  }
  .fx-crt-glow {
    position: absolute;
    left: 50%;
    top: 50%;
    transform: translate(-50%, -50%);
    width: 100%;
    height: 100%;
    background: #fff;
    z-index: 6;
    transition: width 0.3s, height 0.3s;
  }
  .fx-crt-text {
    position: relative;
    z-index: 10;
    font-size: 12px;
    letter-spacing: 3px;
    color: #888;
    opacity: 0;
  }
"#;

/// Inline style of the glow and label at one point of the shutdown.
#[derive(Debug, Clone, PartialEq)]
struct CrtFrame {
    glow: Vec<(&'static str, String)>,
    text_opacity: Option<f64>,
}

/// Flash, vertical collapse to a line, line to a dot, dot fades out.
fn crt_frame(progress: f64) -> CrtFrame {
    let progress = progress.clamp(0.0, 1.0);

    if progress < 0.15 {
        let t = progress / 0.15;
        CrtFrame {
            glow: vec![
                ("opacity", format!("{}", 0.8 * (1.0 - t))),
                ("width", "100%".to_owned()),
                ("height", "100%".to_owned()),
            ],
            text_opacity: None,
        }
    } else if progress < 0.5 {
        let t = (progress - 0.15) / 0.35;
        let shade = 200.0 - t * 150.0;
        CrtFrame {
            glow: vec![
                ("opacity", "1".to_owned()),
                ("width", "100%".to_owned()),
                ("height", format!("{}%", ((1.0 - t * t) * 100.0).max(2.0))),
                ("background", format!("rgb({shade}, {shade}, {shade})")),
            ],
            text_opacity: None,
        }
    } else if progress < 0.75 {
        let t = (progress - 0.5) / 0.25;
        CrtFrame {
            glow: vec![
                ("height", "2px".to_owned()),
                ("width", format!("{}%", ((1.0 - t * t) * 100.0).max(4.0))),
                ("background", "#aaa".to_owned()),
                (
                    "box-shadow",
                    format!("0 0 {}px rgba(255,255,255,{})", 20.0 - t * 15.0, 0.5 - t * 0.4),
                ),
            ],
            text_opacity: None,
        }
    } else {
        let t = (progress - 0.75) / 0.25;
        CrtFrame {
            glow: vec![
                ("width", "4px".to_owned()),
                ("height", "2px".to_owned()),
                ("opacity", format!("{}", (1.0 - t * 2.0).max(0.0))),
            ],
            text_opacity: Some((t * 2.0).min(1.0)),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct CrtShutdown {
    duration: u32,
    schedule: Schedule,
}

impl Effect<Stage> for CrtShutdown {
    crate::duration_accessors!();

    fn render(&mut self, stage: &Stage, _target_url: &str) -> Result<(), EffectError> {
        stage.add_style(CRT_CSS)?;
        stage.add_layer("fx-crt-screen")?;
        let glow = stage.add_layer("fx-crt-glow")?;
        let text = stage.add_text("fx-crt-text", "NO SIGNAL")?;

        let duration = f64::from(self.duration.max(1));
        let mut started = None;

        self.schedule.animate(move |now| {
            let start = *started.get_or_insert(now);
            let progress = ((now - start) / duration).min(1.0);
            let frame = crt_frame(progress);

            let glow_style = glow.style();
            for (property, value) in &frame.glow {
                let _ = glow_style.set_property(property, value);
            }
            if let Some(opacity) = frame.text_opacity {
                let _ = text.style().set_property("opacity", &opacity.to_string());
            }

            progress < 1.0
        })
    }

    fn destroy(&mut self) {
        self.schedule.clear();
    }
}

const TELETEXT_CSS: &str = r#"
  .fx-ttx-screen {
    text-align: left;
    max-width: 520px;
    margin: 0 auto;
    background: #000;
    padding: 16px 20px;
    border: 2px solid #333;
    font-size: 14px;
    line-height: 1.5;
  }
  .fx-ttx-header {
    display: flex;
    justify-content: space-between;
    margin-bottom: 8px;
    padding-bottom: 4px;
    border-bottom: 2px solid #ffff00;
  }
  .fx-ttx-service {
    color: #fff;
    background: #ff0000;
    padding: 0 8px;
    font-weight: bold;
    letter-spacing: 1px;
  }
  .fx-ttx-page { color: #ffff00; letter-spacing: 2px; }
  .fx-ttx-body { color: #00ff41; min-height: 120px; }
  .fx-ttx-line { opacity: 0; transition: opacity 0.08s; white-space: pre; }
  .fx-ttx-line.visible { opacity: 1; }
  .fx-ttx-cyan { color: #00ffff; }
  .fx-ttx-yellow { color: #ffff00; }
  .fx-ttx-white { color: #ffffff; }
  .fx-ttx-magenta { color: #ff00ff; }
  .fx-ttx-footer {
    margin-top: 8px;
    padding-top: 4px;
    border-top: 2px solid #00ffff;
    color: #00ffff;
    font-size: 12px;
    display: flex;
    justify-content: space-between;
  }
  .fx-ttx-loading {
    color: #ffff00;
    animation: fx-ttx-blink 0.4s step-end infinite;
  }
  @keyframes fx-ttx-blink { 50% { opacity: 0; } }
"#;

const BLOCKS: &str = "█ ▓ ▒ ░ ▄ ▀ ■ ▐ ▌";

/// A teletext page whose lines appear one by one.
#[derive(Debug, Default)]
pub(crate) struct Teletext {
    duration: u32,
    schedule: Schedule,
}

impl Effect<Stage> for Teletext {
    crate::duration_accessors!();

    fn render(&mut self, stage: &Stage, target_url: &str) -> Result<(), EffectError> {
        stage.add_style(TELETEXT_CSS)?;

        let hostname = transitfx_utils::hostname(target_url).unwrap_or("unknown");
        let page = 100 + (roll() * 800.0) as u32;

        let screen = stage.add_text("fx-ttx-screen", "")?;

        let header = stage.element("div", "fx-ttx-header")?;
        header.set_inner_html(&format!(
            "<span class=\"fx-ttx-service\">TRANSITFX</span><span class=\"fx-ttx-page\">P{page}</span>"
        ));
        screen.append_child(&header)?;

        let body = stage.element("div", "fx-ttx-body")?;
        let content = [
            ("  ████ NAVIGATION SERVICE ████".to_owned(), "fx-ttx-yellow"),
            (String::new(), ""),
            (format!("  Destination: {hostname}"), "fx-ttx-white"),
            (String::new(), ""),
            ("  Status: Connecting...".to_owned(), "fx-ttx-cyan"),
            (String::new(), ""),
            (format!("  {BLOCKS} {BLOCKS}"), "fx-ttx-magenta"),
            (String::new(), ""),
            ("  Route: SECURE".to_owned(), "fx-ttx-cyan"),
            ("  Protocol: HTTPS/TLS".to_owned(), "fx-ttx-cyan"),
            (String::new(), ""),
            ("  >>> LINK ESTABLISHED <<<".to_owned(), "fx-ttx-yellow"),
        ];

        let mut lines = Vec::with_capacity(content.len());
        for (text, color) in &content {
            let class = if color.is_empty() {
                "fx-ttx-line".to_owned()
            } else {
                format!("fx-ttx-line {color}")
            };
            let line = stage.element("div", &class)?;
            line.set_text_content(Some(text));
            body.append_child(&line)?;
            lines.push(line);
        }
        screen.append_child(&body)?;

        let footer = stage.element("div", "fx-ttx-footer")?;
        let nav = stage.element("span", "")?;
        nav.set_text_content(Some(&format!("◄ 100  Main Index  {page} ►")));
        let loading = stage.element("span", "fx-ttx-loading")?;
        loading.set_text_content(Some("LOADING..."));
        footer.append_child(&nav)?;
        footer.append_child(&loading)?;
        screen.append_child(&footer)?;

        let step = f64::from(self.duration) / (lines.len() + 3) as f64;
        for (idx, line) in lines.into_iter().enumerate() {
            let delay = ((idx + 1) as f64 * step) as i32;
            self.schedule.after(delay, move || {
                let _ = line.class_list().add_1("visible");
            })?;
        }

        let ready_at = self.duration.saturating_sub(200) as i32;
        self.schedule.after(ready_at, move || {
            let _ = loading.style().set_property("animation", "none");
            loading.set_text_content(Some("READY"));
        })
    }

    fn destroy(&mut self) {
        self.schedule.clear();
    }
}

const VHS_CSS: &str = r#"
  .fx-vhs-text {
    position: relative;
    z-index: 10;
    font-size: 14px;
    letter-spacing: 3px;
    color: #ddd;
    text-shadow: 2px 0 var(--tfx-red, #ff0040), -2px 0 var(--tfx-cyan, #00e5ff);
    opacity: 0;
    animation: fx-vhs-flicker 0.15s ease-in-out 0.3s forwards;
  }
  @keyframes fx-vhs-flicker {
    0% { opacity: 0; }
    50% { opacity: 0.7; }
    70% { opacity: 0.3; }
    100% { opacity: 0.9; }
  }
  .fx-vhs-rec {
    position: absolute;
    top: 20px;
    left: 24px;
    z-index: 10;
    font-size: 13px;
    color: var(--tfx-red, #ff0040);
    letter-spacing: 2px;
    animation: transitfx-pulse 0.6s ease-in-out infinite alternate;
  }
  .fx-vhs-timestamp {
    position: absolute;
    bottom: 20px;
    right: 24px;
    z-index: 10;
    font-size: 12px;
    color: #ddd;
    letter-spacing: 1px;
    opacity: 0.7;
  }
"#;

/// Static noise with drifting tracking bands and a REC marker.
#[derive(Debug, Default)]
pub(crate) struct VhsTracking {
    duration: u32,
    schedule: Schedule,
}

impl Effect<Stage> for VhsTracking {
    crate::duration_accessors!();

    fn render(&mut self, stage: &Stage, _target_url: &str) -> Result<(), EffectError> {
        let (canvas, ctx) = stage.add_canvas("")?;
        stage.add_style(VHS_CSS)?;
        stage.add_text("fx-vhs-text", "PLAY >")?;

        let rec = stage.add_layer("fx-vhs-rec")?;
        rec.set_text_content(Some("REC"));

        let clock = js_sys::Date::new_0();
        let timestamp = stage.add_layer("fx-vhs-timestamp")?;
        timestamp.set_text_content(Some(&format!(
            "{:02}:{:02}:{:02}",
            clock.get_hours(),
            clock.get_minutes(),
            clock.get_seconds()
        )));

        let (cr, cg, cb) = transitfx_utils::hex_to_rgb(stage.palette.cyan).unwrap_or((0, 229, 255));
        let (rr, rg, rb) = transitfx_utils::hex_to_rgb(stage.palette.red).unwrap_or((255, 0, 64));

        let width = canvas.width();
        let height = canvas.height();
        let (w, h) = (f64::from(width), f64::from(height));
        let mut noise = vec![0_u8; (width * height * 4) as usize];
        let mut frame: u32 = 0;

        self.schedule.animate(move |_now| {
            for pixel in noise.chunks_exact_mut(4) {
                let level = (roll() * 40.0) as u8;
                pixel[0] = level;
                pixel[1] = level;
                pixel[2] = level;
                pixel[3] = (30.0 + roll() * 25.0) as u8;
            }
            if let Ok(image) =
                ImageData::new_with_u8_clamped_array_and_sh(Clamped(&noise[..]), width, height)
            {
                let _ = ctx.put_image_data(&image, 0.0, 0.0);
            }

            let bands = pick(&[2, 3, 4]);
            for band in 0..bands {
                let y = f64::from((frame * 3 + band * 180) % height.max(1));
                let band_height = 4.0 + roll() * 20.0;
                ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", 0.03 + roll() * 0.06));
                ctx.fill_rect(0.0, y, w, band_height);

                let offset = (roll() - 0.5) * 20.0;
                let _ = ctx
                    .draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                        &canvas,
                        0.0,
                        y,
                        w,
                        band_height,
                        offset,
                        y,
                        w,
                        band_height,
                    );
            }

            if frame % 4 == 0 {
                let line_y = roll() * h;
                ctx.set_fill_style_str(&format!("rgba({cr}, {cg}, {cb}, 0.04)"));
                ctx.fill_rect(0.0, line_y, w, 2.0);
                ctx.set_fill_style_str(&format!("rgba({rr}, {rg}, {rb}, 0.04)"));
                ctx.fill_rect(0.0, line_y + 2.0, w, 2.0);
            }

            frame = frame.wrapping_add(1);
            true
        })
    }

    fn destroy(&mut self) {
        self.schedule.clear();
    }
}

const CHANNEL_CSS: &str = r#"
  .fx-chflip-channel {
    position: absolute;
    top: 30px;
    right: 40px;
    z-index: 10;
    font-size: 42px;
    font-weight: bold;
    color: #fff;
    text-shadow: 0 0 10px rgba(255,255,255,0.7), 2px 2px 0 rgba(0,0,0,0.5);
    opacity: 0;
    transition: opacity 0.15s;
    font-family: 'Courier New', monospace;
  }
  .fx-chflip-channel.visible { opacity: 1; }
  .fx-chflip-bar {
    position: absolute;
    bottom: 50px;
    left: 50%;
    transform: translateX(-50%);
    z-index: 10;
    display: flex;
    gap: 3px;
    opacity: 0;
    transition: opacity 0.2s;
  }
  .fx-chflip-bar.visible { opacity: 0.7; }
  .fx-chflip-pip {
    width: 6px;
    height: 6px;
    background: #555;
    border-radius: 50%;
  }
  .fx-chflip-pip.active {
    background: #fff;
    box-shadow: 0 0 4px #fff;
  }
"#;

const PIP_COUNT: usize = 5;
const FLIP_COUNT: usize = 4;
const FIRST_FLIP_MS: f64 = 200.0;
const FLIP_PERIOD_MS: f64 = 250.0;
const SETTLE_PAUSE_MS: f64 = 100.0;
const STATIC_BLOCK: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Reception {
    Static,
    /// Number of channel changes shown so far.
    Flipping(usize),
    Settled,
}

fn reception_at(elapsed_ms: f64) -> Reception {
    let settle_at = FIRST_FLIP_MS + FLIP_COUNT as f64 * FLIP_PERIOD_MS + SETTLE_PAUSE_MS;

    if elapsed_ms >= settle_at {
        Reception::Settled
    } else if elapsed_ms < FIRST_FLIP_MS {
        Reception::Static
    } else {
        let flips = ((elapsed_ms - FIRST_FLIP_MS) / FLIP_PERIOD_MS).floor() as usize + 1;
        Reception::Flipping(flips.min(FLIP_COUNT))
    }
}

fn channel_label(channel: u32) -> String {
    format!("CH {channel:02}")
}

/// Fill `pixels` with blocky snow at `alpha`; a few blocks get a colour cast.
fn fill_static(pixels: &mut [u8], width: u32, height: u32, alpha: u8, mut roll: impl FnMut() -> f64) {
    for by in (0..height).step_by(STATIC_BLOCK as usize) {
        for bx in (0..width).step_by(STATIC_BLOCK as usize) {
            let level = (roll() * 255.0) as u8;
            let rgb = if roll() < 0.05 {
                [(roll() * 255.0) as u8, (roll() * 100.0) as u8, (roll() * 255.0) as u8]
            } else {
                [level; 3]
            };

            for y in by..(by + STATIC_BLOCK).min(height) {
                for x in bx..(bx + STATIC_BLOCK).min(width) {
                    let idx = ((y * width + x) * 4) as usize;
                    if let Some(pixel) = pixels.get_mut(idx..idx + 4) {
                        pixel[..3].copy_from_slice(&rgb);
                        pixel[3] = alpha;
                    }
                }
            }
        }
    }
}

/// Snow, a few channel changes with an on-screen number, then the tube goes dark.
#[derive(Debug, Default)]
pub(crate) struct ChannelFlip {
    duration: u32,
    schedule: Schedule,
}

impl Effect<Stage> for ChannelFlip {
    crate::duration_accessors!();

    fn render(&mut self, stage: &Stage, _target_url: &str) -> Result<(), EffectError> {
        let (canvas, ctx) = stage.add_canvas("")?;
        stage.add_style(CHANNEL_CSS)?;

        let channel = stage.add_layer("fx-chflip-channel")?;
        let bar = stage.add_layer("fx-chflip-bar")?;
        let mut pips = Vec::with_capacity(PIP_COUNT);
        for _ in 0..PIP_COUNT {
            let pip = stage.element("div", "fx-chflip-pip")?;
            bar.append_child(&pip)?;
            pips.push(pip);
        }

        let (width, height) = (canvas.width(), canvas.height());
        let (w, h) = (f64::from(width), f64::from(height));
        let mut snow = vec![0_u8; (width * height * 4) as usize];
        let mut number = 10 + (roll() * 80.0) as u32;
        let mut shown = 0;
        let mut started = None;

        self.schedule.animate(move |now| {
            let start = *started.get_or_insert(now);
            let reception = reception_at(now - start);

            if let Reception::Flipping(flips) = reception {
                if flips > shown {
                    while shown < flips {
                        number += 1 + (roll() * 10.0) as u32;
                        shown += 1;
                    }
                    channel.set_text_content(Some(&channel_label(number)));
                    let _ = channel.class_list().add_1("visible");
                    let _ = bar.class_list().add_1("visible");
                    for (idx, pip) in pips.iter().enumerate() {
                        let _ = pip.class_list().toggle_with_force("active", idx < shown);
                    }
                }
            }

            if reception == Reception::Settled {
                ctx.set_fill_style_str("rgba(10, 10, 10, 0.15)");
                ctx.fill_rect(0.0, 0.0, w, h);
                return true;
            }

            let flipping = matches!(reception, Reception::Flipping(_));
            fill_static(&mut snow, width, height, if flipping { 180 } else { 120 }, roll);
            if let Ok(image) =
                ImageData::new_with_u8_clamped_array_and_sh(Clamped(&snow[..]), width, height)
            {
                let _ = ctx.put_image_data(&image, 0.0, 0.0);
            }

            if flipping {
                for _ in 0..3 {
                    let y = roll() * h;
                    ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", 0.1 + roll() * 0.15));
                    ctx.fill_rect(0.0, y, w, 2.0 + roll() * 6.0);
                }
            }

            true
        })
    }

    fn destroy(&mut self) {
        self.schedule.clear();
    }
}

const FILM_CSS: &str = r#"
  .fx-film-count {
    position: relative;
    z-index: 10;
    font-size: 120px;
    font-weight: bold;
    color: #ddd;
    text-shadow: 0 0 30px rgba(255,255,255,0.4);
    opacity: 0;
    transition: opacity 0.1s;
    line-height: 1;
  }
  .fx-film-count.visible { opacity: 1; }
  .fx-film-count.flash { color: #fff; text-shadow: 0 0 60px rgba(255,255,255,0.8); }
"#;

const COUNT_STEP_MS: f64 = 400.0;
// Width of the sprocket strip on each side of the frame.
const STRIP: f64 = 50.0;

/// Leader number on screen after `elapsed_ms`; `None` once the countdown
/// has run out and the frame flashes.
fn countdown_at(elapsed_ms: f64) -> Option<u32> {
    if elapsed_ms >= 3.0 * COUNT_STEP_MS {
        return None;
    }

    Some(3 - (elapsed_ms.max(0.0) / COUNT_STEP_MS).floor() as u32)
}

fn draw_leader(ctx: &CanvasRenderingContext2d, w: f64, h: f64, now: f64) {
    let (cx, cy) = (w / 2.0, h / 2.0);
    let radius = w.min(h) * 0.2;

    ctx.set_fill_style_str("#1a1510");
    ctx.fill_rect(STRIP, 0.0, w - STRIP * 2.0, h);

    ctx.set_stroke_style_str("rgba(200, 180, 140, 0.3)");
    ctx.set_line_width(1.0);
    ctx.begin_path();
    ctx.move_to(cx, 0.0);
    ctx.line_to(cx, h);
    ctx.move_to(STRIP, cy);
    ctx.line_to(w - STRIP, cy);
    ctx.stroke();

    ctx.set_stroke_style_str("rgba(200, 180, 140, 0.5)");
    ctx.set_line_width(2.0);
    ctx.begin_path();
    let _ = ctx.arc(cx, cy, radius, 0.0, TAU);
    ctx.stroke();

    let angle = -FRAC_PI_2 + (now % 1000.0) / 1000.0 * TAU;
    ctx.set_stroke_style_str("rgba(220, 200, 160, 0.6)");
    ctx.set_line_width(3.0);
    ctx.begin_path();
    ctx.move_to(cx, cy);
    ctx.line_to(cx + angle.cos() * radius, cy + angle.sin() * radius);
    ctx.stroke();
}

fn draw_sprockets(ctx: &CanvasRenderingContext2d, w: f64, h: f64) {
    ctx.set_fill_style_str("rgba(30, 25, 15, 0.9)");
    ctx.fill_rect(0.0, 0.0, STRIP, h);
    ctx.fill_rect(w - STRIP, 0.0, STRIP, h);

    ctx.set_fill_style_str("#000");
    ctx.set_stroke_style_str("rgba(255,255,255,0.1)");
    let mut y = 10.0;
    while y < h {
        for x in [16.0, w - 32.0] {
            ctx.fill_rect(x, y, 16.0, 22.0);
            ctx.stroke_rect(x, y, 16.0, 22.0);
        }
        y += 40.0;
    }
}

fn draw_grain(ctx: &CanvasRenderingContext2d, w: f64, h: f64, intensity: f64) {
    if w <= STRIP * 2.0 || h <= 0.0 {
        return;
    }

    if let Ok(image) = ctx.get_image_data(STRIP, 0.0, w - STRIP * 2.0, h) {
        let mut data = image.data().0;
        for pixel in data.chunks_mut(16) {
            let noise = (roll() - 0.5) * intensity;
            for channel in pixel.iter_mut().take(3) {
                *channel = (f64::from(*channel) + noise).clamp(0.0, 255.0) as u8;
            }
        }
        if let Ok(grained) =
            ImageData::new_with_u8_clamped_array_and_sh(Clamped(&data[..]), image.width(), image.height())
        {
            let _ = ctx.put_image_data(&grained, STRIP, 0.0);
        }
    }

    for _ in 0..3 {
        if roll() < 0.4 {
            let x = 60.0 + roll() * (w - 120.0);
            ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.03 + roll() * 0.06));
            ctx.set_line_width(1.0);
            ctx.begin_path();
            ctx.move_to(x, 0.0);
            ctx.line_to(x + (roll() - 0.5) * 5.0, h);
            ctx.stroke();
        }
    }
}

/// A film leader counts down 3, 2, 1 between sprocket strips and flashes white.
#[derive(Debug, Default)]
pub(crate) struct Filmstrip {
    duration: u32,
    schedule: Schedule,
}

impl Effect<Stage> for Filmstrip {
    crate::duration_accessors!();

    fn render(&mut self, stage: &Stage, _target_url: &str) -> Result<(), EffectError> {
        let (canvas, ctx) = stage.add_canvas("")?;
        stage.add_style(FILM_CSS)?;
        let count = stage.add_text("fx-film-count", "")?;

        let (w, h) = (f64::from(canvas.width()), f64::from(canvas.height()));
        let mut started = None;

        self.schedule.animate(move |now| {
            let start = *started.get_or_insert(now);

            let Some(number) = countdown_at(now - start) else {
                let _ = count.class_list().add_1("flash");
                count.set_text_content(None);
                ctx.set_fill_style_str("rgba(255, 250, 240, 0.8)");
                ctx.fill_rect(0.0, 0.0, w, h);
                return false;
            };

            draw_leader(&ctx, w, h, now);
            draw_sprockets(&ctx, w, h);
            draw_grain(&ctx, w, h, 50.0);

            count.set_text_content(Some(&number.to_string()));
            let _ = count.class_list().add_1("visible");
            true
        })
    }

    fn destroy(&mut self) {
        self.schedule.clear();
    }
}
