//! The browser capabilities the interceptor and controller depend on.
//!
//! [`crate::dom::DomHost`] implements these against `web-sys`; tests swap in an
//! in-memory host with a manual clock.

use std::rc::Rc;

use futures_util::future::LocalBoxFuture;
use transitfx_effects::ColorPalette;

use crate::error::TransitionError;
use crate::settings::{PageFilter, Settings};

/// The real navigation, run exactly once per intercepted click.
pub type Navigate = Box<dyn FnOnce()>;

/// Stage type effects draw on for a given host.
pub type StageOf<H> = <<H as Host>::Overlay as OverlaySurface>::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub i32);

/// A URL split the way `Location` and `URL` expose it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlParts {
    pub href: String,
    pub origin: String,
    pub pathname: String,
    pub search: String,
    pub hash: String,
}

/// The full-viewport surface a transition draws on.
pub trait OverlaySurface {
    type Stage;

    fn stage(&self) -> &Self::Stage;

    /// Route the skip button and the Escape key to `on_skip`.
    fn arm_skip(&self, on_skip: Rc<dyn Fn()>) -> Result<(), TransitionError>;

    /// Detach the skip listeners. Idempotent.
    fn disarm_skip(&self);

    /// Switch to the exit state shown while the next document loads.
    fn flash_out(&self);

    /// Take the overlay off the page. Idempotent.
    fn remove(&self);
}

pub trait Host: 'static {
    type Overlay: OverlaySurface;

    /// False once the extension has been reloaded under this page.
    fn context_valid(&self) -> bool;

    fn load_settings(&self) -> LocalBoxFuture<'static, Result<Settings, TransitionError>>;

    fn hostname(&self) -> String;

    fn location(&self) -> Option<UrlParts>;

    /// Resolve `href` against `base`; `None` when it does not parse.
    fn parse_url(&self, href: &str, base: &str) -> Option<UrlParts>;

    fn prefers_reduced_motion(&self) -> bool;

    /// Best-effort network hint for the upcoming navigation.
    fn prefetch(&self, url: &str);

    fn mount_overlay(
        &self,
        palette: &ColorPalette,
        filter: PageFilter,
    ) -> Result<Self::Overlay, TransitionError>;

    fn set_timeout(
        &self,
        delay_ms: u32,
        callback: Box<dyn FnOnce()>,
    ) -> Result<TimerId, TransitionError>;

    fn clear_timeout(&self, id: TimerId);

    /// Uniform sample in `[0, 1)`.
    fn random(&self) -> f64;

    fn spawn(&self, task: LocalBoxFuture<'static, ()>);

    fn assign_location(&self, href: &str);
}
