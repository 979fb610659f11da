use wasm_bindgen::Clamped;
use web_sys::ImageData;

use super::build;
use crate::stage::{now_ms, roll};
use crate::{ColorPalette, Effect, EffectEntry, EffectError, Pack, Schedule, Stage};

pub(crate) fn pack() -> Pack<Stage> {
    Pack {
        id: "clean",
        name: "CLEAN // Minimal",
        description: "Subtle, professional transitions: curtains, wipes, and smooth slides",
        colors: ColorPalette::CLEAN,
        effects: vec![
            EffectEntry::new(
                "curtain",
                "Curtain",
                "Two panels slide in from left and right",
                1100,
                build::<Curtain>,
            ),
            EffectEntry::new(
                "slide",
                "Slide",
                "Panel slides up with a progress bar",
                1000,
                build::<Slide>,
            ),
            EffectEntry::new(
                "dissolve",
                "Dissolve",
                "Particles scatter and dissolve across the screen",
                1200,
                build::<Dissolve>,
            ),
            EffectEntry::new(
                "blinds",
                "Blinds",
                "Horizontal slats close like venetian blinds",
                1100,
                build::<Blinds>,
            ),
            EffectEntry::new(
                "morph-wipe",
                "Morph Wipe",
                "Diagonal wipe with a soft feathered edge",
                1000,
                build::<MorphWipe>,
            ),
        ],
    }
}

const CURTAIN_CSS: &str = r#"
  .fx-curtain-left,
  .fx-curtain-right {
    position: absolute;
    top: 0;
    width: 50%;
    height: 100%;
    background: var(--tfx-bg, #1a1a1a);
    z-index: 5;
  }
  .fx-curtain-left {
    left: 0;
    transform: translateX(-100%);
    animation: fx-curtain-slide-right 0.5s ease-out forwards;
    border-right: 1px solid var(--tfx-green-dim, rgba(160,160,160,0.2));
  }
  .fx-curtain-right {
    right: 0;
    transform: translateX(100%);
    animation: fx-curtain-slide-left 0.5s ease-out forwards;
    border-left: 1px solid var(--tfx-green-dim, rgba(160,160,160,0.2));
  }
  @keyframes fx-curtain-slide-right { to { transform: translateX(0); } }
  @keyframes fx-curtain-slide-left { to { transform: translateX(0); } }
  .fx-curtain-center {
    position: relative;
    z-index: 10;
    opacity: 0;
    animation: fx-curtain-reveal 0.3s ease-out 0.45s forwards;
  }
  @keyframes fx-curtain-reveal { to { opacity: 1; } }
  .fx-curtain-line {
    width: 40px;
    height: 1px;
    background: var(--tfx-green-dim, #666);
    margin: 0 auto 12px;
  }
  .fx-curtain-text {
    font-size: 11px;
    letter-spacing: 3px;
    color: var(--tfx-green-dim, #666);
  }
"#;

/// Two panels close over the page. Pure CSS, nothing to cancel.
#[derive(Debug, Default)]
pub(crate) struct Curtain {
    duration: u32,
}

impl Effect<Stage> for Curtain {
    crate::duration_accessors!();

    fn render(&mut self, stage: &Stage, _target_url: &str) -> Result<(), EffectError> {
        stage.add_style(CURTAIN_CSS)?;
        stage.add_layer("fx-curtain-left")?;
        stage.add_layer("fx-curtain-right")?;

        let center = stage.add_text("fx-curtain-center", "")?;
        let line = stage.element("div", "fx-curtain-line")?;
        center.append_child(&line)?;

        let text = stage.element("div", "fx-curtain-text")?;
        text.set_text_content(Some("LOADING"));
        center.append_child(&text)?;

        Ok(())
    }

    fn destroy(&mut self) {}
}

const SLIDE_CSS: &str = r#"
  .fx-slide-overlay-anim {
    animation: fx-slide-up 0.45s cubic-bezier(0.22, 1, 0.36, 1) forwards;
  }
  @keyframes fx-slide-up {
    from { transform: translateY(100%); }
    to { transform: translateY(0); }
  }
  .fx-slide-progress-track {
    width: 120px;
    height: 2px;
    background: rgba(160,160,160,0.15);
    margin: 0 auto 14px;
    overflow: hidden;
    border-radius: 1px;
    opacity: 0;
    animation: fx-slide-fade 0.3s ease-out 0.35s forwards;
  }
  .fx-slide-progress-bar {
    height: 100%;
    width: 0%;
    background: var(--tfx-green, #a0a0a0);
    transition: width 0.05s linear;
  }
  @keyframes fx-slide-fade { to { opacity: 1; } }
  .fx-slide-text {
    font-size: 11px;
    letter-spacing: 3px;
    color: var(--tfx-green-dim, #666);
    opacity: 0;
    animation: fx-slide-fade 0.3s ease-out 0.4s forwards;
  }
"#;

/// The whole overlay slides up from the bottom edge.
#[derive(Debug, Default)]
pub(crate) struct Slide {
    duration: u32,
    schedule: Schedule,
}

impl Effect<Stage> for Slide {
    crate::duration_accessors!();

    fn render(&mut self, stage: &Stage, _target_url: &str) -> Result<(), EffectError> {
        stage.add_style(SLIDE_CSS)?;
        stage.overlay.style().set_property("transform", "translateY(100%)")?;
        stage.overlay.class_list().add_1("fx-slide-overlay-anim")?;

        let track = stage.add_text("fx-slide-progress-track", "")?;
        let bar = stage.element("div", "fx-slide-progress-bar")?;
        track.append_child(&bar)?;
        stage.add_text("fx-slide-text", "LOADING")?;

        let started = now_ms();
        let duration = f64::from(self.duration.max(1));

        self.schedule.every(40, move || {
            let progress = ((now_ms() - started) / duration).min(1.0);
            let _ = bar.style().set_property("width", &format!("{}%", progress * 100.0));
            progress < 1.0
        })
    }

    fn destroy(&mut self) {
        self.schedule.clear();
    }
}

const BLINDS_CSS: &str = r#"
  .fx-blinds-slat {
    position: absolute;
    left: 0;
    width: 100%;
    background: var(--tfx-bg, #1a1a1a);
    transform: scaleY(0);
    transform-origin: top;
    z-index: 5;
    border-bottom: 1px solid var(--tfx-green-dim, rgba(160,160,160,0.1));
  }
  .fx-blinds-text {
    position: relative;
    z-index: 10;
    font-size: 11px;
    letter-spacing: 3px;
    color: var(--tfx-green-dim, #666);
    opacity: 0;
    animation: fx-blinds-fade 0.3s ease-out 0.7s forwards;
  }
  @keyframes fx-blinds-fade { to { opacity: 1; } }
"#;

const SLAT_COUNT: u32 = 12;

/// Horizontal slats close one after another.
#[derive(Debug, Default)]
pub(crate) struct Blinds {
    duration: u32,
    schedule: Schedule,
}

impl Effect<Stage> for Blinds {
    crate::duration_accessors!();

    fn render(&mut self, stage: &Stage, _target_url: &str) -> Result<(), EffectError> {
        stage.add_style(BLINDS_CSS)?;

        let slat_height = 100.0 / f64::from(SLAT_COUNT);
        let mut slats = Vec::with_capacity(SLAT_COUNT as usize);

        for i in 0..SLAT_COUNT {
            let slat = stage.add_layer("fx-blinds-slat")?;
            let style = slat.style();
            style.set_property("top", &format!("{}%", f64::from(i) * slat_height))?;
            style.set_property("height", &format!("{slat_height}%"))?;
            style.set_property(
                "transition",
                &format!("transform 0.35s cubic-bezier(0.22, 1, 0.36, 1) {}ms", i * 40),
            )?;
            slats.push(slat);
        }

        stage.add_text("fx-blinds-text", "LOADING")?;

        // Flip the transform on the next frame so the transitions fire.
        self.schedule.animate(move |_now| {
            for slat in &slats {
                let _ = slat.style().set_property("transform", "scaleY(1)");
            }
            false
        })
    }

    fn destroy(&mut self) {
        self.schedule.clear();
    }
}

const DISSOLVE_CSS: &str = r#"
  .fx-dissolve-text {
    position: relative;
    z-index: 10;
    font-size: 11px;
    letter-spacing: 3px;
    color: var(--tfx-green-dim, #666);
    opacity: 0;
    animation: fx-dissolve-fade 0.5s ease-out 0.3s forwards;
  }
  @keyframes fx-dissolve-fade {
    to { opacity: 1; }
  }
"#;

const WAVE_SIZE: usize = 30;
const WAVE_EVERY_FRAMES: u32 = 8;
const MAX_PARTICLES: usize = 300;

#[derive(Debug, Clone, PartialEq)]
struct Particle {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    size: f64,
    alpha: f64,
    decay: f64,
    bright: bool,
}

/// Drifting specks that fade out; a new wave spawns every few frames.
#[derive(Debug, Default)]
struct Particles {
    items: Vec<Particle>,
    frame: u32,
}

impl Particles {
    fn step(&mut self, width: f64, height: f64, mut roll: impl FnMut() -> f64) {
        if self.frame % WAVE_EVERY_FRAMES == 0 && self.items.len() < MAX_PARTICLES {
            for _ in 0..WAVE_SIZE {
                self.items.push(Particle {
                    x: roll() * width,
                    y: roll() * height,
                    vx: (roll() - 0.5) * 3.0,
                    vy: (roll() - 0.5) * 3.0,
                    size: 1.0 + roll() * 3.0,
                    alpha: 0.6 + roll() * 0.4,
                    decay: 0.005 + roll() * 0.01,
                    bright: roll() < 0.5,
                });
            }
        }

        for particle in &mut self.items {
            particle.x += particle.vx;
            particle.y += particle.vy;
            particle.alpha -= particle.decay;
        }
        self.items.retain(|particle| particle.alpha > 0.0);
        self.frame = self.frame.wrapping_add(1);
    }
}

/// Particles scatter over a fading backdrop.
#[derive(Debug, Default)]
pub(crate) struct Dissolve {
    duration: u32,
    schedule: Schedule,
}

impl Effect<Stage> for Dissolve {
    crate::duration_accessors!();

    fn render(&mut self, stage: &Stage, _target_url: &str) -> Result<(), EffectError> {
        let (canvas, ctx) = stage.add_canvas("")?;
        stage.add_style(DISSOLVE_CSS)?;
        stage.add_text("fx-dissolve-text", "NAVIGATING")?;

        let (w, h) = (f64::from(canvas.width()), f64::from(canvas.height()));
        let (r, g, b) = transitfx_utils::hex_to_rgb(stage.palette.bg).unwrap_or((26, 26, 26));
        let backdrop = format!("rgba({r}, {g}, {b}, 0.1)");
        let bright = stage.palette.green.to_owned();
        let dim = stage.palette.green_dim.to_owned();
        let mut particles = Particles::default();

        self.schedule.animate(move |_now| {
            ctx.set_fill_style_str(&backdrop);
            ctx.fill_rect(0.0, 0.0, w, h);

            particles.step(w, h, roll);
            for particle in &particles.items {
                ctx.set_global_alpha(particle.alpha);
                ctx.set_fill_style_str(if particle.bright { &bright } else { &dim });
                ctx.fill_rect(particle.x, particle.y, particle.size, particle.size);
            }
            ctx.set_global_alpha(1.0);

            true
        })
    }

    fn destroy(&mut self) {
        self.schedule.clear();
    }
}

const MORPH_CSS: &str = r#"
  .fx-morph-text {
    position: relative;
    z-index: 10;
    font-size: 11px;
    letter-spacing: 3px;
    color: var(--tfx-green-dim, #666);
    opacity: 0;
    animation: fx-morph-fade 0.3s ease-out 0.5s forwards;
  }
  @keyframes fx-morph-fade {
    to { opacity: 1; }
  }
"#;

// Width of the soft band either side of the wipe edge, in pixels.
const FEATHER: f64 = 120.0;

/// Position of the wipe edge along the diagonal at `progress`.
fn wipe_edge(progress: f64, diagonal: f64) -> f64 {
    -FEATHER + progress.clamp(0.0, 1.0) * (diagonal + FEATHER * 2.0)
}

/// Backdrop alpha at `dist` along the diagonal: opaque behind the edge,
/// clear ahead of it and linear across the feather.
fn wipe_alpha(dist: f64, edge: f64) -> u8 {
    if dist < edge - FEATHER {
        255
    } else if dist < edge + FEATHER {
        (255.0 * (1.0 - (dist - (edge - FEATHER)) / (FEATHER * 2.0))).round() as u8
    } else {
        0
    }
}

/// The backdrop sweeps in from the top-left corner behind a feathered edge.
#[derive(Debug, Default)]
pub(crate) struct MorphWipe {
    duration: u32,
    schedule: Schedule,
}

impl Effect<Stage> for MorphWipe {
    crate::duration_accessors!();

    fn render(&mut self, stage: &Stage, _target_url: &str) -> Result<(), EffectError> {
        let (canvas, ctx) = stage.add_canvas("")?;
        stage.add_style(MORPH_CSS)?;
        stage.add_text("fx-morph-text", "NAVIGATING")?;

        let (width, height) = (canvas.width(), canvas.height());
        let (w, h) = (f64::from(width), f64::from(height));
        let diagonal = (w * w + h * h).sqrt();
        let scale = diagonal / (w + h).max(1.0);

        let (r, g, b) = transitfx_utils::hex_to_rgb(stage.palette.bg).unwrap_or((26, 26, 26));
        let mut pixels = vec![0_u8; (width * height * 4) as usize];
        for pixel in pixels.chunks_exact_mut(4) {
            pixel[0] = r;
            pixel[1] = g;
            pixel[2] = b;
        }

        let duration = f64::from(self.duration.max(1));
        let mut started = None;

        self.schedule.animate(move |now| {
            let start = *started.get_or_insert(now);
            let progress = ((now - start) / duration).min(1.0);
            let edge = wipe_edge(progress, diagonal);

            for (idx, pixel) in pixels.chunks_exact_mut(4).enumerate() {
                let x = idx as u32 % width.max(1);
                let y = idx as u32 / width.max(1);
                pixel[3] = wipe_alpha(f64::from(x + y) * scale, edge);
            }
            if let Ok(image) =
                ImageData::new_with_u8_clamped_array_and_sh(Clamped(&pixels[..]), width, height)
            {
                ctx.clear_rect(0.0, 0.0, w, h);
                let _ = ctx.put_image_data(&image, 0.0, 0.0);
            }

            progress < 1.0
        })
    }

    fn destroy(&mut self) {
        self.schedule.clear();
    }
}
