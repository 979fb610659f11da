#![allow(missing_docs)]
#![cfg(not(target_arch = "wasm32"))]

mod helpers;

use helpers::{counted, setup};
use transitfx::effects::ColorPalette;
use transitfx::prelude::*;
use transitfx::{SiteMode, Speed};

const TARGET: &str = "https://site.test/next";

#[tokio::test]
async fn test_navigates_once_when_the_effect_runs_out() {
    let (host, controller) = setup("still");
    let (count, navigate) = counted();

    let outcome = controller.play_transition(TARGET, navigate).await;
    assert_eq!(
        outcome,
        Outcome::Started {
            effect_id: "still",
            duration_ms: 1000
        }
    );
    assert!(controller.is_active());
    assert_eq!(host.overlay_count(), 1);

    host.advance(999);
    assert_eq!(count.get(), 0);

    host.advance(1);
    assert_eq!(count.get(), 1);
    assert!(!controller.is_active());

    // Curtain stays up until the next document replaces the page.
    let overlay = host.overlay(0);
    assert!(overlay.flashed.get());
    assert!(!overlay.removed.get());
    assert!(!overlay.skip_armed());
    assert_eq!(
        overlay.effect_log(),
        vec![format!("render {TARGET} 1000"), "destroy".to_owned()]
    );

    host.advance(10_000);
    assert_eq!(count.get(), 1);
}

#[tokio::test]
async fn test_escape_skips_without_a_second_navigation() {
    let (host, controller) = setup("still");
    let (count, navigate) = counted();

    controller.play_transition(TARGET, navigate).await;
    host.advance(200);
    host.overlay(0).press_skip();

    assert_eq!(count.get(), 1);
    assert_eq!(host.pending_timers(), 0);
    assert!(host.overlay(0).effect_log().contains(&"destroy".to_owned()));
    assert!(!host.overlay(0).flashed.get());

    host.advance(1000);
    assert_eq!(count.get(), 1);
}

#[tokio::test]
async fn test_skip_is_idempotent() {
    let (host, controller) = setup("still");
    let (count, navigate) = counted();

    assert!(!controller.skip());

    controller.play_transition(TARGET, navigate).await;
    assert!(controller.skip());
    assert!(!controller.skip());
    host.overlay(0).press_skip();

    assert_eq!(count.get(), 1);
    let destroys = host
        .overlay(0)
        .effect_log()
        .iter()
        .filter(|entry| *entry == "destroy")
        .count();
    assert_eq!(destroys, 1);
}

#[tokio::test]
async fn test_blocklisted_site_navigates_immediately() {
    let (host, controller) = setup("still");
    host.update_settings(|settings| {
        settings.site_mode = SiteMode::Blocklist;
        settings.site_list = vec!["site.test".to_owned()];
    });
    let (count, navigate) = counted();

    let outcome = controller.play_transition(TARGET, navigate).await;

    assert_eq!(outcome, Outcome::Bypassed(Bypass::SiteExcluded));
    assert_eq!(count.get(), 1);
    assert_eq!(host.overlay_count(), 0);
    assert_eq!(host.pending_timers(), 0);
}

#[tokio::test]
async fn test_allowlist_admits_listed_sites_only() {
    let (host, controller) = setup("still");
    host.update_settings(|settings| {
        settings.site_mode = SiteMode::Allowlist;
        settings.site_list = vec!["other.test".to_owned()];
    });

    let (_, navigate) = counted();
    let outcome = controller.play_transition(TARGET, navigate).await;
    assert_eq!(outcome, Outcome::Bypassed(Bypass::SiteExcluded));

    host.update_settings(|settings| settings.site_list.push("site".to_owned()));
    let (_, navigate) = counted();
    let outcome = controller.play_transition(TARGET, navigate).await;
    assert!(matches!(outcome, Outcome::Started { .. }));
}

#[tokio::test]
async fn test_guards_bypass_without_overlay() {
    let cases = [
        Bypass::ContextInvalidated,
        Bypass::SettingsUnavailable,
        Bypass::Disabled,
        Bypass::ReducedMotion,
        Bypass::OverlayFailed,
    ];

    for expected in cases {
        let (host, controller) = setup("still");
        match expected {
            Bypass::ContextInvalidated => host.context_valid.set(false),
            Bypass::SettingsUnavailable => {
                host.settings.replace(None);
            }
            Bypass::Disabled => host.update_settings(|settings| settings.enabled = false),
            Bypass::ReducedMotion => host.reduced_motion.set(true),
            _ => host.fail_mount.set(true),
        }
        let (count, navigate) = counted();

        let outcome = controller.play_transition(TARGET, navigate).await;

        assert_eq!(outcome, Outcome::Bypassed(expected));
        assert_eq!(count.get(), 1, "{expected:?} must navigate once");
        assert_eq!(host.overlay_count(), 0);
        assert!(!controller.is_active());
    }
}

#[tokio::test]
async fn test_invalid_context_wins_over_other_guards() {
    let (host, controller) = setup("still");
    host.context_valid.set(false);
    host.reduced_motion.set(true);
    host.update_settings(|settings| settings.enabled = false);
    let (_, navigate) = counted();

    let outcome = controller.play_transition(TARGET, navigate).await;

    assert_eq!(outcome, Outcome::Bypassed(Bypass::ContextInvalidated));
}

#[tokio::test]
async fn test_speed_scales_the_deadline() {
    for (speed, expected) in [(Speed::Fast, 900), (Speed::Normal, 1500), (Speed::Slow, 2250)] {
        let (host, controller) = setup("drift");
        host.update_settings(|settings| settings.speed = speed);
        let (count, navigate) = counted();

        let outcome = controller.play_transition(TARGET, navigate).await;
        assert_eq!(
            outcome,
            Outcome::Started {
                effect_id: "drift",
                duration_ms: expected
            }
        );

        host.advance(u64::from(expected) - 1);
        assert_eq!(count.get(), 0);
        host.advance(1);
        assert_eq!(count.get(), 1);
    }
}

#[tokio::test]
async fn test_custom_duration_overrides_speed() {
    let (host, controller) = setup("drift");
    host.update_settings(|settings| {
        settings.speed = Speed::Slow;
        settings.custom_duration = Some(750.0);
    });
    let (count, navigate) = counted();

    controller.play_transition(TARGET, navigate).await;
    assert_eq!(
        host.overlay(0).effect_log(),
        vec![format!("render {TARGET} 750")]
    );

    host.advance(750);
    assert_eq!(count.get(), 1);
}

#[tokio::test]
async fn test_unknown_selection_falls_back_to_random() {
    let (host, controller) = setup("no-such-effect");
    host.roll.set(0.99);
    let (_, navigate) = counted();

    let outcome = controller.play_transition(TARGET, navigate).await;

    assert_eq!(
        outcome,
        Outcome::Started {
            effect_id: "broken",
            duration_ms: 1200
        }
    );
}

#[tokio::test]
async fn test_random_within_pack() {
    let (host, controller) = setup("random:steady");
    host.roll.set(0.75);
    let (_, navigate) = counted();

    let outcome = controller.play_transition(TARGET, navigate).await;

    assert!(matches!(
        outcome,
        Outcome::Started {
            effect_id: "drift",
            ..
        }
    ));
}

#[tokio::test]
async fn test_render_failure_still_navigates_at_deadline() {
    let (host, controller) = setup("broken");
    let (count, navigate) = counted();

    let outcome = controller.play_transition(TARGET, navigate).await;
    assert!(matches!(outcome, Outcome::Started { .. }));

    host.advance(1200);
    assert_eq!(count.get(), 1);
}

#[tokio::test]
async fn test_missing_timer_navigates_right_away() {
    let (host, controller) = setup("still");
    host.fail_timers.set(true);
    let (count, navigate) = counted();

    controller.play_transition(TARGET, navigate).await;

    assert_eq!(count.get(), 1);
    assert!(!controller.is_active());
}

#[tokio::test]
async fn test_overlay_takes_filter_palette() {
    let (host, controller) = setup("broken");
    host.update_settings(|settings| settings.page_filter = PageFilter::GreenTerminal);
    let (_, navigate) = counted();
    controller.play_transition(TARGET, navigate).await;

    let palette = host.overlay(0).palette.get().unwrap();
    assert_eq!(palette.green, "#1acc00");
    assert_eq!(host.overlay(0).filter.get(), Some(PageFilter::GreenTerminal));

    let (host, controller) = setup("broken");
    let (_, navigate) = counted();
    controller.play_transition(TARGET, navigate).await;
    assert_eq!(host.overlay(0).palette.get(), Some(ColorPalette::RETRO));
}

#[tokio::test]
async fn test_cleanup_keeps_the_navigation_armed() {
    let (host, controller) = setup("still");
    let (count, navigate) = counted();

    controller.play_transition(TARGET, navigate).await;
    controller.cleanup();

    let overlay = host.overlay(0);
    assert!(overlay.removed.get());
    assert_eq!(overlay.effect_log().last().map(String::as_str), Some("destroy"));
    assert_eq!(count.get(), 0);
    assert!(controller.is_active());

    host.advance(1000);
    assert_eq!(count.get(), 1);
}

#[tokio::test]
async fn test_second_request_while_busy_finishes_the_first() {
    let (host, controller) = setup("still");
    let (first, navigate) = counted();
    controller.play_transition(TARGET, navigate).await;

    host.advance(300);
    let (second, navigate) = counted();
    let outcome = controller
        .play_transition("https://site.test/other", navigate)
        .await;

    assert_eq!(outcome, Outcome::Bypassed(Bypass::Busy));
    assert_eq!(first.get(), 1);
    assert_eq!(second.get(), 1);
    assert_eq!(host.overlay_count(), 1);

    host.advance(5000);
    assert_eq!(first.get(), 1);
    assert_eq!(second.get(), 1);
}

#[tokio::test]
async fn test_finished_curtain_is_removed_by_the_next_transition() {
    let (host, controller) = setup("still");
    let (_, navigate) = counted();
    controller.play_transition(TARGET, navigate).await;
    host.advance(1000);
    assert!(!host.overlay(0).removed.get());

    let (count, navigate) = counted();
    let outcome = controller
        .play_transition("https://site.test/other", navigate)
        .await;

    assert!(matches!(outcome, Outcome::Started { .. }));
    assert!(host.overlay(0).removed.get());
    assert_eq!(host.overlay_count(), 2);
    assert!(!host.overlay(1).removed.get());
    assert!(controller.with_session(|session| {
        session.is_some_and(|session| session.target_url() == "https://site.test/other")
    }));

    host.advance(1000);
    assert_eq!(count.get(), 1);
}

#[tokio::test]
async fn test_target_is_prefetched() {
    let (host, controller) = setup("still");
    let (_, navigate) = counted();

    controller.play_transition(TARGET, navigate).await;

    assert_eq!(*host.prefetched.borrow(), vec![TARGET.to_owned()]);
}
