pub use crate::controller::{Bypass, Controller, Outcome};
pub use crate::host::{Host, Navigate, OverlaySurface};
pub use crate::interceptor::{ClickEvent, Decision, Interceptor};
pub use crate::settings::{PageFilter, Settings};
pub use transitfx_effects::{Effect, EffectRegistry, Stage};
pub use wasm_bindgen::JsCast;
