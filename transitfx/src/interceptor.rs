//! Decides which clicks are full-page navigations worth a transition.

use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::controller::Controller;
use crate::error::TransitionError;
use crate::host::{Host, Navigate, UrlParts};

/// Snapshot of the anchor a click landed in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkInfo {
    /// Resolved `anchor.href`.
    pub href: String,
    /// The `href` attribute as written.
    pub raw_href: Option<String>,
    /// The anchor's `target` attribute.
    pub target: String,
    pub download: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn opens_new_tab(self) -> bool {
        self.ctrl || self.meta || self.shift
    }
}

/// What the page did with the re-dispatched click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// `pushState` or `replaceState` ran during dispatch.
    HistoryTouched,
    /// No history mutation; a cancelled dispatch still lands here.
    Untouched,
}

/// A document click as the interceptor sees it.
pub trait ClickEvent {
    /// The click is our own re-dispatch.
    fn is_synthetic(&self) -> bool;

    /// The closest anchor around the click target, if any.
    fn link(&self) -> Option<LinkInfo>;

    fn modifiers(&self) -> Modifiers;

    /// `preventDefault` plus `stopImmediatePropagation`.
    fn suppress(&self);

    /// Re-dispatch a marked copy of the click on the anchor while history
    /// mutations are being recorded.
    fn redispatch_probed(&self) -> Result<Probe, TransitionError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Synthetic,
    ContextInvalidated,
    NoAnchor,
    NoHref,
    JavascriptUrl,
    SameDocument,
    Download,
    NewTab,
    MalformedUrl,
    LocationUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Left entirely to the browser.
    Ignored(IgnoreReason),
    /// A client-side router took the click.
    SpaHandled,
    /// Native navigation suppressed; a transition now runs towards `href`.
    Intercepted { href: String },
}

/// Check a link against the current page.
///
/// `target` is `link.href` resolved against `current`, or `None` when it does
/// not parse. `Ok` means the click is a full-navigation candidate.
pub fn classify(
    link: &LinkInfo,
    modifiers: Modifiers,
    current: &UrlParts,
    target: Option<&UrlParts>,
) -> Result<(), IgnoreReason> {
    let href = link.href.trim();

    if href.is_empty() {
        return Err(IgnoreReason::NoHref);
    }
    if href
        .get(..11)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("javascript:"))
    {
        return Err(IgnoreReason::JavascriptUrl);
    }
    if href.starts_with('#')
        || link
            .raw_href
            .as_deref()
            .is_some_and(|raw| raw.trim_start().starts_with('#'))
    {
        return Err(IgnoreReason::SameDocument);
    }
    if link.download {
        return Err(IgnoreReason::Download);
    }

    let target = target.ok_or(IgnoreReason::MalformedUrl)?;
    if target.origin == current.origin
        && target.pathname == current.pathname
        && target.search == current.search
        && !target.hash.is_empty()
    {
        return Err(IgnoreReason::SameDocument);
    }

    if link.target.eq_ignore_ascii_case("_blank") || modifiers.opens_new_tab() {
        return Err(IgnoreReason::NewTab);
    }

    Ok(())
}

/// Capture-phase click handler in front of the [`Controller`].
pub struct Interceptor<H: Host> {
    controller: Rc<Controller<H>>,
}

impl<H: Host> Interceptor<H> {
    pub fn new(controller: Rc<Controller<H>>) -> Self {
        Self { controller }
    }

    pub fn handle_click<E: ClickEvent>(&self, event: &E) -> Decision {
        let decision = self.decide(event);
        debug!(?decision, "click classified");
        decision
    }

    fn decide<E: ClickEvent>(&self, event: &E) -> Decision {
        if event.is_synthetic() {
            return Decision::Ignored(IgnoreReason::Synthetic);
        }

        let host = self.controller.host();
        if !host.context_valid() {
            return Decision::Ignored(IgnoreReason::ContextInvalidated);
        }

        let Some(link) = event.link() else {
            return Decision::Ignored(IgnoreReason::NoAnchor);
        };
        let Some(current) = host.location() else {
            return Decision::Ignored(IgnoreReason::LocationUnavailable);
        };
        let target = host.parse_url(&link.href, &current.href);

        if let Err(reason) = classify(&link, event.modifiers(), &current, target.as_ref()) {
            return Decision::Ignored(reason);
        }

        event.suppress();

        match event.redispatch_probed() {
            Ok(Probe::HistoryTouched) => return Decision::SpaHandled,
            Ok(Probe::Untouched) => {}
            Err(err) => warn!(%err, "could not offer the click to the page"),
        }

        let href = link.href;
        let navigate: Navigate = {
            let host = host.clone();
            let href = href.clone();
            Box::new(move || host.assign_location(&href))
        };

        let controller = self.controller.clone();
        let target_url = href.clone();
        host.spawn(Box::pin(async move {
            controller.play_transition(&target_url, navigate).await;
        }));

        Decision::Intercepted { href }
    }
}

impl<H: Host> fmt::Debug for Interceptor<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor")
            .field("controller", &self.controller)
            .finish()
    }
}
