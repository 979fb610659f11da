#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use futures_util::future::LocalBoxFuture;
use transitfx::effects::{ColorPalette, Effect, EffectEntry, EffectError, EffectRegistry, Pack};
use transitfx::prelude::*;
use transitfx::{LinkInfo, Modifiers, Navigate, Probe, TimerId, TransitionError, UrlParts};

/// What effects draw on in tests: a shared log of lifecycle calls.
#[derive(Debug, Default)]
pub struct FakeStage {
    pub log: Rc<RefCell<Vec<String>>>,
}

/// Observable state of one mounted overlay.
#[derive(Default)]
pub struct OverlayState {
    pub palette: Cell<Option<ColorPalette>>,
    pub filter: Cell<Option<PageFilter>>,
    pub removed: Cell<bool>,
    pub flashed: Cell<bool>,
    pub log: Rc<RefCell<Vec<String>>>,
    skip: RefCell<Option<Rc<dyn Fn()>>>,
}

impl OverlayState {
    pub fn skip_armed(&self) -> bool {
        self.skip.borrow().is_some()
    }

    /// Escape key or the skip button.
    pub fn press_skip(&self) {
        let on_skip = self.skip.borrow().clone();
        if let Some(on_skip) = on_skip {
            on_skip();
        }
    }

    pub fn effect_log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

pub struct FakeOverlay {
    stage: FakeStage,
    state: Rc<OverlayState>,
}

impl OverlaySurface for FakeOverlay {
    type Stage = FakeStage;

    fn stage(&self) -> &FakeStage {
        &self.stage
    }

    fn arm_skip(&self, on_skip: Rc<dyn Fn()>) -> Result<(), TransitionError> {
        *self.state.skip.borrow_mut() = Some(on_skip);
        Ok(())
    }

    fn disarm_skip(&self) {
        self.state.skip.borrow_mut().take();
    }

    fn flash_out(&self) {
        self.state.flashed.set(true);
    }

    fn remove(&self) {
        self.state.removed.set(true);
    }
}

struct Timer {
    id: TimerId,
    due: u64,
    callback: Box<dyn FnOnce()>,
}

/// In-memory browser with a manual clock.
pub struct FakeHost {
    pub settings: RefCell<Option<Settings>>,
    pub context_valid: Cell<bool>,
    pub reduced_motion: Cell<bool>,
    pub location: RefCell<UrlParts>,
    pub roll: Cell<f64>,
    pub fail_mount: Cell<bool>,
    pub fail_timers: Cell<bool>,
    pub navigations: RefCell<Vec<String>>,
    pub prefetched: RefCell<Vec<String>>,
    pub overlays: RefCell<Vec<Rc<OverlayState>>>,
    now: Cell<u64>,
    next_timer: Cell<i32>,
    timers: RefCell<Vec<Timer>>,
    tasks: RefCell<VecDeque<LocalBoxFuture<'static, ()>>>,
}

impl FakeHost {
    /// Browsing `https://site.test/docs` with default settings.
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            settings: RefCell::new(Some(Settings::default())),
            context_valid: Cell::new(true),
            reduced_motion: Cell::new(false),
            location: RefCell::new(parse_url("https://site.test/docs", "").unwrap()),
            roll: Cell::new(0.0),
            fail_mount: Cell::new(false),
            fail_timers: Cell::new(false),
            navigations: RefCell::new(Vec::new()),
            prefetched: RefCell::new(Vec::new()),
            overlays: RefCell::new(Vec::new()),
            now: Cell::new(0),
            next_timer: Cell::new(1),
            timers: RefCell::new(Vec::new()),
            tasks: RefCell::new(VecDeque::new()),
        })
    }

    pub fn update_settings(&self, update: impl FnOnce(&mut Settings)) {
        if let Some(settings) = self.settings.borrow_mut().as_mut() {
            update(settings);
        }
    }

    pub fn now(&self) -> u64 {
        self.now.get()
    }

    /// Move the clock forward, firing due timers in order.
    pub fn advance(&self, ms: u64) {
        let target = self.now.get() + ms;

        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                let due = timers
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.due <= target)
                    .min_by_key(|(_, timer)| timer.due)
                    .map(|(idx, _)| idx);
                due.map(|idx| timers.remove(idx))
            };

            let Some(timer) = next else {
                break;
            };
            self.now.set(timer.due);
            (timer.callback)();
        }

        self.now.set(target);
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Drive every spawned task to completion.
    pub async fn run_tasks(&self) {
        loop {
            let task = self.tasks.borrow_mut().pop_front();
            match task {
                Some(task) => task.await,
                None => break,
            }
        }
    }

    pub fn overlay(&self, idx: usize) -> Rc<OverlayState> {
        self.overlays.borrow()[idx].clone()
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.borrow().len()
    }
}

impl Host for FakeHost {
    type Overlay = FakeOverlay;

    fn context_valid(&self) -> bool {
        self.context_valid.get()
    }

    fn load_settings(&self) -> LocalBoxFuture<'static, Result<Settings, TransitionError>> {
        let settings = self.settings.borrow().clone();
        Box::pin(async move { settings.ok_or(TransitionError::MissingApi("chrome.storage.sync")) })
    }

    fn hostname(&self) -> String {
        let origin = self.location.borrow().origin.clone();
        origin
            .split_once("://")
            .map(|(_, host)| host.to_owned())
            .unwrap_or_default()
    }

    fn location(&self) -> Option<UrlParts> {
        Some(self.location.borrow().clone())
    }

    fn parse_url(&self, href: &str, base: &str) -> Option<UrlParts> {
        parse_url(href, base)
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion.get()
    }

    fn prefetch(&self, url: &str) {
        self.prefetched.borrow_mut().push(url.to_owned());
    }

    fn mount_overlay(
        &self,
        palette: &ColorPalette,
        filter: PageFilter,
    ) -> Result<FakeOverlay, TransitionError> {
        if self.fail_mount.get() {
            return Err(TransitionError::Dom("attachShadow is not supported".to_owned()));
        }

        let state = Rc::new(OverlayState::default());
        state.palette.set(Some(*palette));
        state.filter.set(Some(filter));
        self.overlays.borrow_mut().push(state.clone());

        Ok(FakeOverlay {
            stage: FakeStage {
                log: state.log.clone(),
            },
            state,
        })
    }

    fn set_timeout(
        &self,
        delay_ms: u32,
        callback: Box<dyn FnOnce()>,
    ) -> Result<TimerId, TransitionError> {
        if self.fail_timers.get() {
            return Err(TransitionError::MissingApi("setTimeout"));
        }

        let id = TimerId(self.next_timer.get());
        self.next_timer.set(id.0 + 1);
        self.timers.borrow_mut().push(Timer {
            id,
            due: self.now.get() + u64::from(delay_ms),
            callback,
        });

        Ok(id)
    }

    fn clear_timeout(&self, id: TimerId) {
        self.timers.borrow_mut().retain(|timer| timer.id != id);
    }

    fn random(&self) -> f64 {
        self.roll.get()
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        self.tasks.borrow_mut().push_back(task);
    }

    fn assign_location(&self, href: &str) {
        self.navigations.borrow_mut().push(href.to_owned());
    }
}

/// Minimal URL resolution: absolute URLs, root-relative paths and fragments.
pub fn parse_url(href: &str, base: &str) -> Option<UrlParts> {
    let absolute = if href.contains("://") {
        href.to_owned()
    } else {
        let base = parse_url(base, "")?;
        if href.starts_with('/') {
            format!("{}{href}", base.origin)
        } else if href.starts_with('#') || href.starts_with('?') {
            let keep = if href.starts_with('#') {
                format!("{}{}", base.pathname, base.search)
            } else {
                base.pathname.clone()
            };
            format!("{}{keep}{href}", base.origin)
        } else {
            return None;
        }
    };

    let (scheme, rest) = absolute.split_once("://")?;
    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..authority_end];
    if scheme.is_empty() || authority.is_empty() || authority.contains('[') {
        return None;
    }

    let tail = &rest[authority_end..];
    let (before_hash, hash) = match tail.find('#') {
        Some(idx) => (&tail[..idx], &tail[idx..]),
        None => (tail, ""),
    };
    let (path, search) = match before_hash.find('?') {
        Some(idx) => (&before_hash[..idx], &before_hash[idx..]),
        None => (before_hash, ""),
    };
    let pathname = if path.is_empty() { "/" } else { path };
    let hash = if hash == "#" { "" } else { hash };
    let search = if search == "?" { "" } else { search };
    let origin = format!("{scheme}://{authority}");

    Some(UrlParts {
        href: format!("{origin}{pathname}{search}{hash}"),
        origin,
        pathname: pathname.to_owned(),
        search: search.to_owned(),
        hash: hash.to_owned(),
    })
}

/// Records its lifecycle in the stage log.
struct Recorder {
    duration: u32,
    log: Option<Rc<RefCell<Vec<String>>>>,
    fail: bool,
}

impl Effect<FakeStage> for Recorder {
    fn duration(&self) -> u32 {
        self.duration
    }

    fn set_duration(&mut self, duration_ms: u32) {
        self.duration = duration_ms;
    }

    fn render(&mut self, stage: &FakeStage, target_url: &str) -> Result<(), EffectError> {
        stage
            .log
            .borrow_mut()
            .push(format!("render {target_url} {}", self.duration));
        self.log = Some(stage.log.clone());

        if self.fail {
            return Err(EffectError::Dom("canvas unavailable".to_owned()));
        }
        Ok(())
    }

    fn destroy(&mut self) {
        if let Some(log) = &self.log {
            log.borrow_mut().push("destroy".to_owned());
        }
    }
}

fn recorder() -> Box<dyn Effect<FakeStage>> {
    Box::new(Recorder {
        duration: 0,
        log: None,
        fail: false,
    })
}

fn broken() -> Box<dyn Effect<FakeStage>> {
    Box::new(Recorder {
        duration: 0,
        log: None,
        fail: true,
    })
}

/// Two packs: `steady` (still 1000ms, drift 1500ms) and `faulty` (broken).
pub fn registry() -> EffectRegistry<FakeStage> {
    EffectRegistry::new(vec![
        Pack {
            id: "steady",
            name: "Steady",
            description: "Effects that behave",
            colors: ColorPalette::CLEAN,
            effects: vec![
                EffectEntry::new("still", "Still", "Does nothing", 1000, recorder),
                EffectEntry::new("drift", "Drift", "Does nothing slowly", 1500, recorder),
            ],
        },
        Pack {
            id: "faulty",
            name: "Faulty",
            description: "Effects that fail",
            colors: ColorPalette::RETRO,
            effects: vec![EffectEntry::new("broken", "Broken", "Fails to render", 1200, broken)],
        },
    ])
}

/// Host and controller with `selectedEffect` pinned to `effect`.
pub fn setup(effect: &str) -> (Rc<FakeHost>, Rc<Controller<FakeHost>>) {
    let host = FakeHost::new();
    host.update_settings(|settings| settings.selected_effect = effect.to_owned());
    let controller = Rc::new(Controller::new(host.clone(), registry()));
    (host, controller)
}

/// A continuation that counts how often it ran.
pub fn counted() -> (Rc<Cell<u32>>, Navigate) {
    let count = Rc::new(Cell::new(0));
    let navigate: Navigate = {
        let count = count.clone();
        Box::new(move || count.set(count.get() + 1))
    };
    (count, navigate)
}

/// A click whose page-side behaviour is scripted.
pub struct FakeClick {
    pub synthetic: bool,
    pub link: Option<LinkInfo>,
    pub modifiers: Modifiers,
    pub probe: Option<Probe>,
    pub suppressed: Cell<bool>,
    pub redispatched: Cell<bool>,
}

impl FakeClick {
    /// Plain click on `<a href="{href}">`.
    pub fn on(href: &str) -> Self {
        let resolved = parse_url(href, "https://site.test/docs")
            .map(|url| url.href)
            .unwrap_or_else(|| href.to_owned());

        Self {
            synthetic: false,
            link: Some(LinkInfo {
                href: resolved,
                raw_href: Some(href.to_owned()),
                target: String::new(),
                download: false,
            }),
            modifiers: Modifiers::default(),
            probe: Some(Probe::Untouched),
            suppressed: Cell::new(false),
            redispatched: Cell::new(false),
        }
    }
}

impl ClickEvent for FakeClick {
    fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    fn link(&self) -> Option<LinkInfo> {
        self.link.clone()
    }

    fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    fn suppress(&self) {
        self.suppressed.set(true);
    }

    fn redispatch_probed(&self) -> Result<Probe, TransitionError> {
        self.redispatched.set(true);
        self.probe
            .ok_or_else(|| TransitionError::Dom("dispatchEvent threw".to_owned()))
    }
}
