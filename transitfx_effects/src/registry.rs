use std::collections::HashMap;
use std::fmt;

use crate::{ColorPalette, Effect};

/// Builds a fresh, not yet rendered effect instance.
pub type EffectFactory<S> = fn() -> Box<dyn Effect<S>>;

/// Catalogue metadata for one effect plus the factory that builds it.
pub struct EffectEntry<S> {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Base duration before any speed multiplier, in milliseconds.
    pub duration_ms: u32,
    factory: EffectFactory<S>,
}

impl<S> EffectEntry<S> {
    pub fn new(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        duration_ms: u32,
        factory: EffectFactory<S>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            duration_ms,
            factory,
        }
    }

    /// New effect instance with its base duration applied.
    pub fn instantiate(&self) -> Box<dyn Effect<S>> {
        let mut effect = (self.factory)();
        effect.set_duration(self.duration_ms);
        effect
    }
}

impl<S> fmt::Debug for EffectEntry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectEntry")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("duration_ms", &self.duration_ms)
            .finish_non_exhaustive()
    }
}

/// Named group of effects sharing a colour theme.
#[derive(Debug)]
pub struct Pack<S> {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub colors: ColorPalette,
    pub effects: Vec<EffectEntry<S>>,
}

/// What the user asked for in `selectedEffect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectSelection {
    /// `"random"`: any effect from any pack.
    Random,
    /// `"random:<pack>"`: any effect from one pack.
    RandomInPack(String),
    /// Anything else is taken as an effect id.
    Explicit(String),
}

impl EffectSelection {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        if raw.is_empty() || raw == "random" {
            EffectSelection::Random
        } else if let Some(pack) = raw.strip_prefix("random:") {
            EffectSelection::RandomInPack(pack.to_owned())
        } else {
            EffectSelection::Explicit(raw.to_owned())
        }
    }
}

/// Effect id -> implementation, with packs as a grouping over the same entries.
#[derive(Debug)]
pub struct EffectRegistry<S> {
    packs: Vec<Pack<S>>,
    // effect id -> (pack index, effect index)
    index: HashMap<&'static str, (usize, usize)>,
}

impl<S> EffectRegistry<S> {
    pub fn new(packs: Vec<Pack<S>>) -> Self {
        let mut index = HashMap::new();

        for (pack_idx, pack) in packs.iter().enumerate() {
            for (effect_idx, entry) in pack.effects.iter().enumerate() {
                if index.insert(entry.id, (pack_idx, effect_idx)).is_some() {
                    tracing::warn!(effect = entry.id, "duplicate effect id, last one wins");
                }
            }
        }

        Self { packs, index }
    }

    pub fn packs(&self) -> &[Pack<S>] {
        &self.packs
    }

    pub fn len(&self) -> usize {
        self.packs.iter().map(|pack| pack.effects.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, effect_id: &str) -> Option<&EffectEntry<S>> {
        let &(pack_idx, effect_idx) = self.index.get(effect_id)?;
        Some(&self.packs[pack_idx].effects[effect_idx])
    }

    pub fn pack(&self, pack_id: &str) -> Option<&Pack<S>> {
        self.packs.iter().find(|pack| pack.id == pack_id)
    }

    pub fn pack_for(&self, effect_id: &str) -> Option<&Pack<S>> {
        let &(pack_idx, _) = self.index.get(effect_id)?;
        Some(&self.packs[pack_idx])
    }

    /// Uniform pick over every effect. `roll` is a sample from `[0, 1)`.
    pub fn random(&self, roll: f64) -> Option<&EffectEntry<S>> {
        let total = self.len();
        let mut nth = pick_index(roll, total)?;

        for pack in &self.packs {
            if nth < pack.effects.len() {
                return pack.effects.get(nth);
            }
            nth -= pack.effects.len();
        }

        None
    }

    /// Uniform pick within one pack.
    pub fn random_in_pack(&self, pack_id: &str, roll: f64) -> Option<&EffectEntry<S>> {
        let pack = self.pack(pack_id)?;
        pack.effects.get(pick_index(roll, pack.effects.len())?)
    }

    /// Resolve a selection, falling back to a global random pick when the
    /// pack or effect does not exist. `None` only for an empty registry.
    pub fn resolve(&self, selection: &EffectSelection, roll: f64) -> Option<&EffectEntry<S>> {
        let chosen = match selection {
            EffectSelection::Random => None,
            EffectSelection::RandomInPack(pack_id) => self.random_in_pack(pack_id, roll),
            EffectSelection::Explicit(effect_id) => self.get(effect_id),
        };

        chosen.or_else(|| self.random(roll))
    }
}

fn pick_index(roll: f64, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }

    let roll = if roll.is_finite() { roll.clamp(0.0, 1.0) } else { 0.0 };
    Some(((roll * len as f64) as usize).min(len - 1))
}
