#![allow(missing_docs)]
//! Visual transition effects and the registry that groups them into packs.
//!
//! An effect is a self-contained render/destroy pair. The core crate never
//! looks inside one: it builds a fresh instance from the registry, hands it a
//! stage and the navigation target, and destroys it when the transition ends.

use thiserror::Error;

mod effects;
mod palette;
mod registry;
mod schedule;
mod stage;

pub use palette::ColorPalette;
pub use registry::{EffectEntry, EffectFactory, EffectRegistry, EffectSelection, Pack};
pub use schedule::Schedule;
pub use stage::Stage;

/// Failure raised while an effect builds its DOM.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EffectError {
    /// No global `window` (worker or detached context).
    #[error("no global window object")]
    NoWindow,

    /// A DOM or canvas call threw.
    #[error("DOM operation failed: {0}")]
    Dom(String),
}

impl From<wasm_bindgen::JsValue> for EffectError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        EffectError::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

/// One animated visual style.
///
/// `S` is whatever surface the effect draws on; in the browser that is a
/// [`Stage`]. Implementations own every timer and frame they schedule and
/// must release them in [`Effect::destroy`].
pub trait Effect<S> {
    /// Nominal length of the animation in milliseconds.
    fn duration(&self) -> u32;

    /// Overwrite the duration (speed multiplier or custom override).
    fn set_duration(&mut self, duration_ms: u32);

    /// Build the effect's visuals inside `stage` and start animating.
    ///
    /// Text taken from `target_url` is escaped before it reaches markup.
    fn render(&mut self, stage: &S, target_url: &str) -> Result<(), EffectError>;

    /// Stop all scheduled work. Safe to call repeatedly or before `render`.
    fn destroy(&mut self);
}

/// Registry of every built-in pack, wired to the browser stage.
pub fn default_registry() -> EffectRegistry<Stage> {
    EffectRegistry::new(vec![
        effects::cyberpunk::pack(),
        effects::clean::pack(),
        effects::retro::pack(),
        effects::neo::pack(),
    ])
}

/// Implements the duration accessors for effects storing it in `self.duration`.
macro_rules! duration_accessors {
    () => {
        fn duration(&self) -> u32 {
            self.duration
        }

        fn set_duration(&mut self, duration_ms: u32) {
            self.duration = duration_ms;
        }
    };
}

pub(crate) use duration_accessors;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_four_packs_of_five() {
        let registry = default_registry();
        let ids: Vec<_> = registry.packs().iter().map(|pack| pack.id).collect();

        assert_eq!(ids, ["cyberpunk", "clean", "retro", "neo"]);
        assert!(registry.packs().iter().all(|pack| pack.effects.len() == 5));
        assert_eq!(registry.len(), 20);
    }

    #[test]
    fn every_pack_lists_its_signature_effects() {
        let registry = default_registry();
        let effect_ids = |pack: &str| -> Vec<&str> {
            registry
                .packs()
                .iter()
                .find(|candidate| candidate.id == pack)
                .map(|found| found.effects.iter().map(|entry| entry.id).collect())
                .unwrap_or_default()
        };

        assert_eq!(
            effect_ids("cyberpunk"),
            ["decrypt", "matrix-rain", "glitch", "dos-boot", "typewriter"]
        );
        assert_eq!(
            effect_ids("clean"),
            ["curtain", "slide", "dissolve", "blinds", "morph-wipe"]
        );
        assert_eq!(
            effect_ids("retro"),
            ["crt-shutdown", "teletext", "vhs-tracking", "channel-flip", "filmstrip"]
        );
        assert_eq!(
            effect_ids("neo"),
            ["kanji-decode", "neon-rain", "cipher-scroll", "pulse-grid", "spirit-gate"]
        );
    }

    #[test]
    fn default_durations_stay_within_transition_window() {
        let registry = default_registry();

        for pack in registry.packs() {
            for entry in &pack.effects {
                assert!(
                    (1000..=2000).contains(&entry.duration_ms),
                    "{} has duration {}",
                    entry.id,
                    entry.duration_ms
                );
            }
        }
    }

    #[test]
    fn dom_errors_carry_the_browser_message() {
        let error = EffectError::Dom("boom".to_owned());
        assert_eq!(error.to_string(), "DOM operation failed: boom");
    }
}
