//! Runs at most one transition at a time and guarantees its navigation fires
//! exactly once.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, info, warn};
use transitfx_effects::{EffectRegistry, EffectSelection};

use crate::host::{Host, Navigate, OverlaySurface, StageOf};
use crate::session::{self, SessionHandle, TransitionSession};
use crate::settings::Settings;
use crate::theme::resolve_palette;

/// Why a request navigated straight away instead of playing an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bypass {
    ContextInvalidated,
    SettingsUnavailable,
    Disabled,
    SiteExcluded,
    ReducedMotion,
    /// Another transition was still running; it was finished first.
    Busy,
    NoEffects,
    OverlayFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Bypassed(Bypass),
    Started {
        effect_id: &'static str,
        duration_ms: u32,
    },
}

pub struct Controller<H: Host> {
    host: Rc<H>,
    registry: EffectRegistry<StageOf<H>>,
    current: RefCell<Option<SessionHandle<H>>>,
}

impl<H: Host> Controller<H> {
    pub fn new(host: Rc<H>, registry: EffectRegistry<StageOf<H>>) -> Self {
        Self {
            host,
            registry,
            current: RefCell::new(None),
        }
    }

    pub fn host(&self) -> &Rc<H> {
        &self.host
    }

    /// Play a transition towards `target_url`, then run `navigate`.
    ///
    /// `navigate` runs exactly once on every path: immediately when a guard
    /// declines, otherwise on the deadline or on skip, whichever comes first.
    pub async fn play_transition(&self, target_url: &str, navigate: Navigate) -> Outcome {
        let settings = match self.admit().await {
            Ok(settings) => settings,
            Err(reason) => return bypass(reason, navigate),
        };

        if let Some(previous) = self.take_previous() {
            return bypass(previous, navigate);
        }

        self.host.prefetch(target_url);

        match self.start(target_url, &settings, navigate) {
            Ok(outcome) => outcome,
            Err((reason, navigate)) => bypass(reason, navigate),
        }
    }

    /// Finish the running transition early. Returns whether a navigation fired.
    pub fn skip(&self) -> bool {
        let current = self.current.borrow().clone();

        match current {
            Some(session) => {
                let fired = session::finish(&session, &self.host);
                if fired {
                    debug!("transition skipped");
                }
                fired
            }
            None => false,
        }
    }

    /// Tear down the effect and overlay of the current session, leaving its
    /// navigation armed.
    pub fn cleanup(&self) {
        if let Some(session) = self.current.borrow().as_ref() {
            session.borrow_mut().cleanup();
        }
    }

    /// A transition is on screen and its navigation has not fired.
    pub fn is_active(&self) -> bool {
        self.current
            .borrow()
            .as_ref()
            .is_some_and(|session| session.borrow().is_pending())
    }

    /// Snapshot of the current session for inspection.
    pub fn with_session<R>(&self, inspect: impl FnOnce(Option<&TransitionSession<H>>) -> R) -> R {
        let current = self.current.borrow();
        match current.as_ref() {
            Some(session) => inspect(Some(&*session.borrow())),
            None => inspect(None),
        }
    }

    // Guards, cheapest first.
    async fn admit(&self) -> Result<Settings, Bypass> {
        if !self.host.context_valid() {
            return Err(Bypass::ContextInvalidated);
        }

        let settings = self.host.load_settings().await.map_err(|err| {
            warn!(%err, "settings unreadable, navigating without a transition");
            Bypass::SettingsUnavailable
        })?;

        if !settings.enabled {
            return Err(Bypass::Disabled);
        }
        if !settings.applies_to_host(&self.host.hostname()) {
            return Err(Bypass::SiteExcluded);
        }
        if self.host.prefers_reduced_motion() {
            return Err(Bypass::ReducedMotion);
        }

        Ok(settings)
    }

    // A still-pending session is finished and the new request bypasses; a
    // finished one only leaves its curtain behind, which is taken down.
    fn take_previous(&self) -> Option<Bypass> {
        let previous = self.current.borrow_mut().take()?;

        if previous.borrow().is_pending() {
            session::finish(&previous, &self.host);
            *self.current.borrow_mut() = Some(previous);
            return Some(Bypass::Busy);
        }

        previous.borrow_mut().cleanup();
        None
    }

    fn start(
        &self,
        target_url: &str,
        settings: &Settings,
        navigate: Navigate,
    ) -> Result<Outcome, (Bypass, Navigate)> {
        let selection = EffectSelection::parse(&settings.selected_effect);
        let Some(entry) = self.registry.resolve(&selection, self.host.random()) else {
            return Err((Bypass::NoEffects, navigate));
        };

        let mut effect = entry.instantiate();
        let base_duration = effect.duration();
        let duration_ms = settings.effective_duration(base_duration);
        effect.set_duration(duration_ms);

        let palette = resolve_palette(&self.registry, entry.id, settings.page_filter);
        let overlay = match self.host.mount_overlay(&palette, settings.page_filter) {
            Ok(overlay) => overlay,
            Err(err) => {
                warn!(%err, "overlay could not be mounted");
                return Err((Bypass::OverlayFailed, navigate));
            }
        };

        if let Err(err) = effect.render(overlay.stage(), target_url) {
            // The deadline below still releases the navigation.
            warn!(effect = entry.id, %err, "effect failed to render");
        }

        let session: SessionHandle<H> = Rc::new(RefCell::new(TransitionSession::new(
            target_url.to_owned(),
            effect,
            base_duration,
            overlay,
            navigate,
        )));
        *self.current.borrow_mut() = Some(session.clone());

        let on_skip = skip_callback(Rc::downgrade(&session), Rc::downgrade(&self.host));
        if let Some(overlay) = session.borrow().overlay() {
            if let Err(err) = overlay.arm_skip(on_skip) {
                warn!(%err, "skip controls unavailable");
            }
        }

        let deadline = {
            let session = Rc::downgrade(&session);
            let host = Rc::downgrade(&self.host);
            Box::new(move || {
                if let (Some(session), Some(host)) = (session.upgrade(), host.upgrade()) {
                    if session::expire(&session, &host) {
                        info!("transition finished");
                    }
                }
            })
        };

        match self.host.set_timeout(duration_ms, deadline) {
            Ok(id) => session.borrow_mut().deadline = Some(id),
            Err(err) => {
                warn!(%err, "deadline timer unavailable, finishing now");
                session::finish(&session, &self.host);
            }
        }

        info!(effect = entry.id, duration_ms, url = target_url, "transition started");

        Ok(Outcome::Started {
            effect_id: entry.id,
            duration_ms,
        })
    }
}

fn skip_callback<H: Host>(session: Weak<RefCell<TransitionSession<H>>>, host: Weak<H>) -> Rc<dyn Fn()> {
    Rc::new(move || {
        if let (Some(session), Some(host)) = (session.upgrade(), host.upgrade()) {
            if session::finish(&session, &host) {
                debug!("transition skipped");
            }
        }
    })
}

fn bypass(reason: Bypass, navigate: Navigate) -> Outcome {
    debug!(?reason, "navigating without a transition");
    navigate();
    Outcome::Bypassed(reason)
}

impl<H: Host> fmt::Debug for Controller<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("effects", &self.registry.len())
            .field("current", &self.current.borrow())
            .finish()
    }
}
