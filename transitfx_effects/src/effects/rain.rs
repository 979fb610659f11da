// Falling glyph columns drawn on a canvas, shared by the matrix and neon rain
// effects.

use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::stage::{pick, roll};
use crate::{EffectError, Schedule};

/// Column state, independent of the canvas so it can be tested natively.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct RainField {
    /// Row index of each column's head; negative rows are above the screen.
    pub(super) drops: Vec<i32>,
    /// Whether each column currently uses the secondary colour.
    pub(super) secondary: Vec<bool>,
}

impl RainField {
    pub(super) fn new(columns: usize, start_depth: i32, mut roll: impl FnMut() -> f64) -> Self {
        let mut drops = Vec::with_capacity(columns);
        let mut secondary = Vec::with_capacity(columns);

        for _ in 0..columns {
            drops.push((roll() * -(start_depth as f64)).floor() as i32);
            secondary.push(roll() < 0.5);
        }

        Self { drops, secondary }
    }

    /// Move every column down one row. Columns whose head left the screen
    /// restart at the top when the roll exceeds `reset_above`, swapping colour
    /// with probability `swap_chance`.
    pub(super) fn advance(
        &mut self,
        rows_visible: i32,
        reset_above: f64,
        swap_chance: f64,
        mut roll: impl FnMut() -> f64,
    ) {
        for (drop, secondary) in self.drops.iter_mut().zip(self.secondary.iter_mut()) {
            if *drop > rows_visible && roll() > reset_above {
                *drop = 0;
                if roll() < swap_chance {
                    *secondary = !*secondary;
                }
            }
            *drop += 1;
        }
    }
}

/// Look of one rain variant.
pub(super) struct Rain {
    pub(super) font_size: f64,
    pub(super) font_family: &'static str,
    pub(super) glyphs: Vec<char>,
    /// Translucent fill painted each frame to fade the trails.
    pub(super) fade: String,
    pub(super) primary: String,
    pub(super) secondary: String,
    /// White head glyph with a coloured trail glyph behind it.
    pub(super) bright_heads: bool,
    pub(super) start_depth: i32,
    pub(super) reset_above: f64,
    pub(super) swap_chance: f64,
}

impl Rain {
    pub(super) fn start(
        self,
        schedule: &mut Schedule,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
    ) -> Result<(), EffectError> {
        let width = f64::from(canvas.width());
        let height = f64::from(canvas.height());
        let columns = (width / self.font_size).floor() as usize;
        let rows_visible = (height / self.font_size).ceil() as i32;
        let mut field = RainField::new(columns, self.start_depth, roll);
        let font = format!("{}px {}", self.font_size - 1.0, self.font_family);

        schedule.animate(move |_now| {
            ctx.set_fill_style_str(&self.fade);
            ctx.fill_rect(0.0, 0.0, width, height);
            ctx.set_font(&font);

            for (column, (&drop, &secondary)) in
                field.drops.iter().zip(field.secondary.iter()).enumerate()
            {
                let x = column as f64 * self.font_size;
                let y = f64::from(drop) * self.font_size;
                let color = if secondary { &self.secondary } else { &self.primary };
                let glyph = pick(&self.glyphs).to_string();

                if self.bright_heads {
                    ctx.set_fill_style_str("#ffffff");
                    ctx.set_shadow_color(color);
                    ctx.set_shadow_blur(12.0);
                    let _ = ctx.fill_text(&glyph, x, y);

                    if drop > 1 {
                        let trail = pick(&self.glyphs).to_string();
                        ctx.set_fill_style_str(color);
                        ctx.set_shadow_blur(6.0);
                        let _ = ctx.fill_text(&trail, x, y - self.font_size);
                    }
                } else {
                    ctx.set_fill_style_str(color);
                    ctx.set_shadow_color(color);
                    ctx.set_shadow_blur(8.0);
                    let _ = ctx.fill_text(&glyph, x, y);
                }

                ctx.set_shadow_blur(0.0);
            }

            field.advance(rows_visible, self.reset_above, self.swap_chance, roll);
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_start_above_the_screen() {
        let field = RainField::new(4, 20, || 0.5);

        assert_eq!(field.drops, vec![-10; 4]);
        assert_eq!(field.secondary, vec![false; 4]);
    }

    #[test]
    fn columns_fall_one_row_per_frame() {
        let mut field = RainField::new(2, 20, || 0.0);
        field.advance(30, 0.975, 0.0, || 0.0);
        field.advance(30, 0.975, 0.0, || 0.0);

        assert_eq!(field.drops, vec![2, 2]);
    }

    #[test]
    fn offscreen_columns_restart_and_may_swap_colour() {
        let mut field = RainField {
            drops: vec![40, 5],
            secondary: vec![false, false],
        };

        field.advance(30, 0.97, 0.3, || 0.1);
        assert_eq!(field.drops, vec![41, 6], "low roll keeps falling");

        let mut rolls = [0.99, 0.1].into_iter().cycle();
        field.advance(30, 0.97, 0.3, move || rolls.next().unwrap_or(0.0));
        assert_eq!(field.drops, vec![1, 7]);
        assert_eq!(field.secondary, vec![true, false]);
    }
}
