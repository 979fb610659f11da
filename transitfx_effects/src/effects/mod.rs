pub(crate) mod clean;
pub(crate) mod cyberpunk;
pub(crate) mod neo;
pub(crate) mod retro;

mod rain;
mod scramble;

use crate::{Effect, Stage};

/// Factory for effects that start from their `Default` state.
fn build<E>() -> Box<dyn Effect<Stage>>
where
    E: Effect<Stage> + Default + 'static,
{
    Box::new(E::default())
}
