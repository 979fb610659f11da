use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use transitfx_effects::Effect;

use crate::host::{Host, Navigate, OverlaySurface, StageOf, TimerId};

pub(crate) type SessionHandle<H> = Rc<RefCell<TransitionSession<H>>>;

/// One in-progress transition: the effect, its overlay, the pending
/// navigation and the deadline that will release it.
pub struct TransitionSession<H: Host> {
    target_url: String,
    effect: Option<Box<dyn Effect<StageOf<H>>>>,
    base_duration: u32,
    overlay: Option<H::Overlay>,
    navigate: Option<Navigate>,
    pub(crate) deadline: Option<TimerId>,
}

impl<H: Host> TransitionSession<H> {
    pub(crate) fn new(
        target_url: String,
        effect: Box<dyn Effect<StageOf<H>>>,
        base_duration: u32,
        overlay: H::Overlay,
        navigate: Navigate,
    ) -> Self {
        Self {
            target_url,
            effect: Some(effect),
            base_duration,
            overlay: Some(overlay),
            navigate: Some(navigate),
            deadline: None,
        }
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    /// The navigation has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.navigate.is_some()
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    pub(crate) fn overlay(&self) -> Option<&H::Overlay> {
        self.overlay.as_ref()
    }

    /// Destroy the effect and take the overlay down. The navigation and its
    /// deadline stay armed.
    pub(crate) fn cleanup(&mut self) {
        self.stop_effect();
        if let Some(overlay) = self.overlay.take() {
            overlay.disarm_skip();
            overlay.remove();
        }
    }

    fn stop_effect(&mut self) {
        if let Some(mut effect) = self.effect.take() {
            effect.set_duration(self.base_duration);
            effect.destroy();
        }
    }

    // Disarms both exits and hands back the continuation; the overlay stays up
    // as a curtain until the next document replaces this one.
    fn settle(&mut self, host: &H) -> Option<Navigate> {
        if let Some(id) = self.deadline.take() {
            host.clear_timeout(id);
        }
        if let Some(overlay) = &self.overlay {
            overlay.disarm_skip();
        }
        self.stop_effect();
        self.navigate.take()
    }
}

/// Stop the effect and run the navigation if it has not run yet.
///
/// Returns whether this call fired the navigation. The session borrow is
/// released before the continuation runs.
pub(crate) fn finish<H: Host>(session: &SessionHandle<H>, host: &H) -> bool {
    let navigate = session.borrow_mut().settle(host);

    match navigate {
        Some(navigate) => {
            navigate();
            true
        }
        None => false,
    }
}

/// Deadline path: flash the overlay out and navigate without waiting for the
/// flash to end.
pub(crate) fn expire<H: Host>(session: &SessionHandle<H>, host: &H) -> bool {
    let navigate = {
        let mut session = session.borrow_mut();
        session.deadline = None;
        if !session.is_pending() {
            return false;
        }
        if let Some(overlay) = &session.overlay {
            overlay.flash_out();
        }
        session.settle(host)
    };

    match navigate {
        Some(navigate) => {
            navigate();
            true
        }
        None => false,
    }
}

impl<H: Host> fmt::Debug for TransitionSession<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionSession")
            .field("target_url", &self.target_url)
            .field("effect_live", &self.effect.is_some())
            .field("overlay", &self.overlay.is_some())
            .field("pending", &self.navigate.is_some())
            .field("deadline", &self.deadline)
            .finish()
    }
}
