#![allow(missing_docs)]
#![cfg(not(target_arch = "wasm32"))]

mod helpers;

use std::rc::Rc;

use helpers::{setup, FakeClick, FakeHost};
use transitfx::prelude::*;
use transitfx::{IgnoreReason, Modifiers, Probe};

fn interceptor() -> (Rc<FakeHost>, Rc<Controller<FakeHost>>, Interceptor<FakeHost>) {
    let (host, controller) = setup("still");
    let interceptor = Interceptor::new(controller.clone());
    (host, controller, interceptor)
}

#[tokio::test]
async fn test_plain_link_plays_then_navigates() {
    let (host, controller, interceptor) = interceptor();
    let click = FakeClick::on("/pricing");

    let decision = interceptor.handle_click(&click);

    assert_eq!(
        decision,
        Decision::Intercepted {
            href: "https://site.test/pricing".to_owned()
        }
    );
    assert!(click.suppressed.get());
    assert!(click.redispatched.get());

    host.run_tasks().await;
    assert!(controller.is_active());
    assert_eq!(host.overlay_count(), 1);
    assert!(host.navigations.borrow().is_empty());

    host.advance(1000);
    assert_eq!(
        *host.navigations.borrow(),
        vec!["https://site.test/pricing".to_owned()]
    );
}

#[tokio::test]
async fn test_bypassed_transition_still_navigates() {
    let (host, _, interceptor) = interceptor();
    host.update_settings(|settings| settings.enabled = false);

    let decision = interceptor.handle_click(&FakeClick::on("/pricing"));
    assert!(matches!(decision, Decision::Intercepted { .. }));

    host.run_tasks().await;
    assert_eq!(host.overlay_count(), 0);
    assert_eq!(host.navigations.borrow().len(), 1);
}

#[tokio::test]
async fn test_new_tab_clicks_pass_through() {
    let (host, _, interceptor) = interceptor();

    let mut blank = FakeClick::on("/pricing");
    if let Some(link) = blank.link.as_mut() {
        link.target = "_BLANK".to_owned();
    }
    let mut ctrl = FakeClick::on("/pricing");
    ctrl.modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::default()
    };
    let mut meta = FakeClick::on("/pricing");
    meta.modifiers.meta = true;

    for click in [&blank, &ctrl, &meta] {
        assert_eq!(
            interceptor.handle_click(click),
            Decision::Ignored(IgnoreReason::NewTab)
        );
        assert!(!click.suppressed.get());
    }

    host.run_tasks().await;
    assert_eq!(host.overlay_count(), 0);
    assert!(host.navigations.borrow().is_empty());
}

#[tokio::test]
async fn test_fragment_links_stay_on_the_page() {
    let (_, _, interceptor) = interceptor();

    let anchor = FakeClick::on("#section");
    let same_page = FakeClick::on("https://site.test/docs#api");

    for click in [&anchor, &same_page] {
        assert_eq!(
            interceptor.handle_click(click),
            Decision::Ignored(IgnoreReason::SameDocument)
        );
        assert!(!click.suppressed.get());
    }

    // A fragment on another page is a real navigation.
    let elsewhere = FakeClick::on("/guide#install");
    assert!(matches!(
        interceptor.handle_click(&elsewhere),
        Decision::Intercepted { .. }
    ));
}

#[tokio::test]
async fn test_router_handled_clicks_are_left_alone() {
    let (host, controller, interceptor) = interceptor();
    let mut click = FakeClick::on("/dashboard");
    click.probe = Some(Probe::HistoryTouched);

    assert_eq!(interceptor.handle_click(&click), Decision::SpaHandled);
    assert!(click.suppressed.get());

    host.run_tasks().await;
    assert!(!controller.is_active());
    assert_eq!(host.overlay_count(), 0);
    assert!(host.navigations.borrow().is_empty());
}

#[tokio::test]
async fn test_cancelled_redispatch_without_history_still_navigates() {
    // The page called preventDefault on the re-dispatch but never touched
    // history, which reports as `Untouched`.
    let (host, _, interceptor) = interceptor();
    let mut click = FakeClick::on("/page");
    click.probe = Some(Probe::Untouched);

    assert_eq!(
        interceptor.handle_click(&click),
        Decision::Intercepted {
            href: "https://site.test/page".to_owned()
        }
    );

    host.run_tasks().await;
    assert_eq!(host.overlay_count(), 1);
    host.advance(5000);
    assert_eq!(
        *host.navigations.borrow(),
        vec!["https://site.test/page".to_owned()]
    );
}

#[tokio::test]
async fn test_failed_redispatch_falls_back_to_transition() {
    let (host, _, interceptor) = interceptor();
    let mut click = FakeClick::on("/pricing");
    click.probe = None;

    assert!(matches!(
        interceptor.handle_click(&click),
        Decision::Intercepted { .. }
    ));

    host.run_tasks().await;
    assert_eq!(host.overlay_count(), 1);
}

#[test]
fn test_clicks_that_are_never_candidates() {
    let (host, _, interceptor) = interceptor();

    let mut synthetic = FakeClick::on("/pricing");
    synthetic.synthetic = true;
    assert_eq!(
        interceptor.handle_click(&synthetic),
        Decision::Ignored(IgnoreReason::Synthetic)
    );
    assert!(!synthetic.redispatched.get());

    let mut no_anchor = FakeClick::on("/pricing");
    no_anchor.link = None;
    assert_eq!(
        interceptor.handle_click(&no_anchor),
        Decision::Ignored(IgnoreReason::NoAnchor)
    );

    let mut download = FakeClick::on("/report.pdf");
    if let Some(link) = download.link.as_mut() {
        link.download = true;
    }
    assert_eq!(
        interceptor.handle_click(&download),
        Decision::Ignored(IgnoreReason::Download)
    );

    assert_eq!(
        interceptor.handle_click(&FakeClick::on("JavaScript:void(0)")),
        Decision::Ignored(IgnoreReason::JavascriptUrl)
    );
    assert_eq!(
        interceptor.handle_click(&FakeClick::on("https://")),
        Decision::Ignored(IgnoreReason::MalformedUrl)
    );

    host.context_valid.set(false);
    assert_eq!(
        interceptor.handle_click(&FakeClick::on("/pricing")),
        Decision::Ignored(IgnoreReason::ContextInvalidated)
    );
}

#[test]
fn test_cross_origin_links_are_intercepted() {
    let (_, _, interceptor) = interceptor();

    assert_eq!(
        interceptor.handle_click(&FakeClick::on("https://elsewhere.test/")),
        Decision::Intercepted {
            href: "https://elsewhere.test/".to_owned()
        }
    );
}
