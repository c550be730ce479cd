use embassy_futures::block_on;

use super::*;
use crate::{
    input::{ButtonEdge, mock::ScriptedButtons},
    scroll::{SCROLL_STEP_PX, VIEWPORT_PX},
    sync::{
        Provenance,
        testing::{FakeError, ScriptedTransport},
    },
};

#[derive(Debug, PartialEq)]
enum Shown {
    Message {
        text: String,
        offset_px: i32,
        provenance: Option<Provenance>,
        badge: Option<(String, BadgeTone)>,
    },
    Reconnecting {
        dots: u8,
    },
}

fn shown<IN: ButtonSource>(app: &BeaconApp<IN, ScriptedTransport>) -> Shown {
    let mut out = None;
    app.with_screen(|screen| {
        out = Some(match screen {
            Screen::Message {
                text,
                offset_px,
                provenance,
                badge,
                ..
            } => Shown::Message {
                text: text.to_string(),
                offset_px,
                provenance,
                badge: badge.map(|badge| (badge.label.to_string(), badge.tone)),
            },
            Screen::Reconnecting { dots, .. } => Shown::Reconnecting { dots },
        });
    });
    out.unwrap()
}

fn shown_text<IN: ButtonSource>(app: &BeaconApp<IN, ScriptedTransport>) -> String {
    match shown(app) {
        Shown::Message { text, .. } => text,
        Shown::Reconnecting { .. } => panic!("expected a message screen"),
    }
}

fn run<IN: ButtonSource>(
    app: &mut BeaconApp<IN, ScriptedTransport>,
    from_ms: u64,
    to_ms: u64,
    step_ms: u64,
) {
    let mut now = from_ms;
    while now <= to_ms {
        block_on(app.tick(now));
        now += step_ms;
    }
}

fn drain_cues<IN: ButtonSource>(app: &mut BeaconApp<IN, ScriptedTransport>) -> Vec<Cue> {
    core::iter::from_fn(|| app.drain_cue()).collect()
}

fn empty_inbox() -> ScriptedTransport {
    let mut transport = ScriptedTransport::online();
    transport.reply_json("{}");
    transport
}

#[test]
fn sentinel_is_visible_before_the_first_tick() {
    let app = BeaconApp::new(
        ScriptedButtons::idle(),
        ScriptedTransport::online(),
        BeaconConfig::default(),
    );

    assert_eq!(shown_text(&app), "Starting...");
    assert_eq!(app.sync_state().provenance(), None);
}

#[test]
fn first_poll_brings_remote_message_in_from_the_right() {
    let mut transport = ScriptedTransport::online();
    transport.reply_json(r#"{"message":"Hi"}"#);
    let mut app = BeaconApp::new(ScriptedButtons::idle(), transport, BeaconConfig::default());

    assert_eq!(block_on(app.tick(0)), TickResult::RenderRequested);

    assert_eq!(
        shown(&app),
        Shown::Message {
            text: "Hi".to_string(),
            offset_px: VIEWPORT_PX,
            provenance: Some(Provenance::Remote),
            badge: Some(("NEW".to_string(), BadgeTone::Plain)),
        }
    );
    assert_eq!(app.scroll_direction(), ScrollDirection::Leftward);
    assert_eq!(drain_cues(&mut app), vec![Cue::Incoming]);
}

#[test]
fn failed_first_poll_keeps_scrolling_the_sentinel() {
    let mut transport = ScriptedTransport::online();
    transport.reply_get(Err(FakeError::Unreachable));
    let mut app = BeaconApp::new(ScriptedButtons::idle(), transport, BeaconConfig::default());

    assert_eq!(block_on(app.tick(0)), TickResult::RenderRequested);
    assert_eq!(shown_text(&app), "Starting...");
    assert_eq!(app.scroll_offset_px(), VIEWPORT_PX);

    assert_eq!(block_on(app.tick(30)), TickResult::RenderRequested);
    assert_eq!(app.scroll_offset_px(), VIEWPORT_PX - SCROLL_STEP_PX);
}

#[test]
fn single_press_sends_after_the_gap_expires() {
    let edges = [
        ButtonEdge::down(ButtonId::A, 1_000),
        ButtonEdge::up(ButtonId::A, 1_050),
    ];
    let mut app = BeaconApp::new(
        ScriptedButtons::new(&edges),
        empty_inbox(),
        BeaconConfig::default(),
    );

    run(&mut app, 0, 1_440, 10);
    assert!(app.transport().posted.is_empty());

    run(&mut app, 1_450, 1_600, 10);
    assert_eq!(app.transport().posted, vec![r#"{"message":"OK"}"#.to_string()]);
    assert_eq!(app.send_status(), SendStatus::Delivered(200));
}

#[test]
fn quick_double_press_sends_stay_home_once() {
    let edges = [
        ButtonEdge::down(ButtonId::A, 1_000),
        ButtonEdge::up(ButtonId::A, 1_060),
        ButtonEdge::down(ButtonId::A, 1_110),
        ButtonEdge::up(ButtonId::A, 1_170),
    ];
    let mut app = BeaconApp::new(
        ScriptedButtons::new(&edges),
        empty_inbox(),
        BeaconConfig::default(),
    );

    run(&mut app, 0, 3_000, 10);

    assert_eq!(
        app.transport().posted,
        vec![r#"{"message":"Stay Home"}"#.to_string()]
    );
    assert_eq!(shown_text(&app), "Stay Home");
    assert_eq!(app.sync_state().provenance(), Some(Provenance::Local));
    assert_eq!(app.scroll_direction(), ScrollDirection::Rightward);
    assert_eq!(
        drain_cues(&mut app),
        vec![Cue::Press, Cue::Press, Cue::SendOk]
    );
}

#[test]
fn long_press_sends_sos() {
    let edges = [
        ButtonEdge::down(ButtonId::A, 1_000),
        ButtonEdge::up(ButtonId::A, 2_200),
    ];
    let mut app = BeaconApp::new(
        ScriptedButtons::new(&edges),
        empty_inbox(),
        BeaconConfig::default(),
    );

    run(&mut app, 0, 3_000, 10);

    assert_eq!(app.transport().posted, vec![r#"{"message":"SOS"}"#.to_string()]);
    assert_eq!(
        shown(&app),
        Shown::Message {
            text: "SOS".to_string(),
            offset_px: app.scroll_offset_px(),
            provenance: Some(Provenance::Local),
            badge: Some(("SENT 200".to_string(), BadgeTone::Plain)),
        }
    );
}

#[test]
fn edges_batched_into_one_tick_keep_separate_gestures() {
    let edges = [
        ButtonEdge::down(ButtonId::A, 100),
        ButtonEdge::up(ButtonId::A, 150),
        ButtonEdge::down(ButtonId::A, 700),
        ButtonEdge::up(ButtonId::A, 750),
    ];
    let mut app = BeaconApp::new(
        ScriptedButtons::new(&edges),
        empty_inbox(),
        BeaconConfig::default(),
    );

    block_on(app.tick(0));
    block_on(app.tick(800));
    assert_eq!(app.transport().posted.len(), 1);

    block_on(app.tick(1_200));
    assert_eq!(
        app.transport().posted,
        vec![
            r#"{"message":"OK"}"#.to_string(),
            r#"{"message":"OK"}"#.to_string()
        ]
    );
}

#[test]
fn rejected_send_shows_error_badge() {
    let edges = [
        ButtonEdge::down(ButtonId::A, 100),
        ButtonEdge::up(ButtonId::A, 1_300),
    ];
    let mut transport = empty_inbox();
    transport.reply_post(Ok(500));
    let mut app = BeaconApp::new(ScriptedButtons::new(&edges), transport, BeaconConfig::default());

    run(&mut app, 0, 1_400, 10);

    assert_eq!(app.send_status(), SendStatus::Rejected(500));
    // The text stays on screen even though the server refused it.
    match shown(&app) {
        Shown::Message { text, badge, .. } => {
            assert_eq!(text, "SOS");
            assert_eq!(badge, Some(("ERR 500".to_string(), BadgeTone::Alert)));
        }
        other => panic!("unexpected screen {other:?}"),
    }
    assert_eq!(drain_cues(&mut app), vec![Cue::Press, Cue::SendError]);
}

#[test]
fn transport_failure_shows_fail_badge() {
    let edges = [
        ButtonEdge::down(ButtonId::A, 100),
        ButtonEdge::up(ButtonId::A, 1_300),
    ];
    let mut transport = empty_inbox();
    transport.reply_post(Err(FakeError::Unreachable));
    let mut app = BeaconApp::new(ScriptedButtons::new(&edges), transport, BeaconConfig::default());

    run(&mut app, 0, 1_400, 10);

    assert_eq!(app.send_status(), SendStatus::Failed);
    match shown(&app) {
        Shown::Message { badge, .. } => {
            assert_eq!(badge, Some(("FAIL".to_string(), BadgeTone::Alert)));
        }
        other => panic!("unexpected screen {other:?}"),
    }
}

#[test]
fn unchanged_remote_message_does_not_restart_the_marquee() {
    let mut transport = ScriptedTransport::online();
    transport
        .reply_json(r#"{"message":"Hi"}"#)
        .reply_json(r#"{"message":"Hi"}"#);
    let mut app = BeaconApp::new(ScriptedButtons::idle(), transport, BeaconConfig::default());

    run(&mut app, 0, 9_990, 30);
    let before = app.scroll_offset_px();
    assert_eq!(drain_cues(&mut app), vec![Cue::Incoming]);

    block_on(app.tick(10_020));

    assert_eq!(app.transport().get_calls, 2);
    assert_eq!(app.scroll_offset_px(), before - SCROLL_STEP_PX);
    assert!(drain_cues(&mut app).is_empty());
}

#[test]
fn remote_update_replaces_local_message() {
    let edges = [
        ButtonEdge::down(ButtonId::A, 100),
        ButtonEdge::up(ButtonId::A, 1_300),
    ];
    let mut transport = empty_inbox();
    transport.reply_json(r#"{"message":"on my way"}"#);
    let mut app = BeaconApp::new(ScriptedButtons::new(&edges), transport, BeaconConfig::default());

    run(&mut app, 0, 2_000, 10);
    assert_eq!(app.scroll_direction(), ScrollDirection::Rightward);

    block_on(app.tick(10_000));

    assert_eq!(
        shown(&app),
        Shown::Message {
            text: "on my way".to_string(),
            offset_px: VIEWPORT_PX,
            provenance: Some(Provenance::Remote),
            badge: Some(("NEW".to_string(), BadgeTone::Plain)),
        }
    );
    assert_eq!(app.send_status(), SendStatus::Idle);
}

#[test]
fn offline_shows_reconnecting_and_ignores_presses() {
    let edges = [
        ButtonEdge::down(ButtonId::A, 100),
        ButtonEdge::up(ButtonId::A, 150),
    ];
    let mut app = BeaconApp::new(
        ScriptedButtons::new(&edges),
        ScriptedTransport::offline(),
        BeaconConfig::default(),
    );

    assert_eq!(block_on(app.tick(0)), TickResult::RenderRequested);
    assert_eq!(shown(&app), Shown::Reconnecting { dots: 0 });
    assert_eq!(block_on(app.tick(10)), TickResult::NoRender);

    run(&mut app, 20, 600, 10);
    assert_eq!(shown(&app), Shown::Reconnecting { dots: 1 });
    assert!(app.transport().posted.is_empty());
    assert_eq!(app.transport().get_calls, 0);
    assert_eq!(app.sync_state().latest_message(), "Starting...");
    assert_eq!(app.send_status(), SendStatus::Idle);
}

#[test]
fn reconnect_polls_immediately_and_restores_the_marquee() {
    let mut app = BeaconApp::new(
        ScriptedButtons::idle(),
        ScriptedTransport::offline(),
        BeaconConfig::default(),
    );
    run(&mut app, 0, 5_000, 100);

    app.transport_mut().connected = true;
    app.transport_mut().reply_json(r#"{"message":"back"}"#);

    assert_eq!(block_on(app.tick(5_010)), TickResult::RenderRequested);
    assert_eq!(app.transport().get_calls, 1);
    assert_eq!(shown_text(&app), "back");
}

#[test]
fn two_button_profile_maps_b_to_ng() {
    let edges = [
        ButtonEdge::down(ButtonId::B, 1_000),
        ButtonEdge::up(ButtonId::B, 1_050),
    ];
    let mut app = BeaconApp::new(
        ScriptedButtons::new(&edges),
        empty_inbox(),
        BeaconConfig::core2(),
    );

    run(&mut app, 0, 1_600, 10);
    assert!(app.transport().posted.is_empty());

    run(&mut app, 1_660, 1_800, 10);
    assert_eq!(app.transport().posted, vec![r#"{"message":"NG"}"#.to_string()]);
}

#[test]
fn unbound_gesture_is_ignored() {
    let edges = [
        ButtonEdge::down(ButtonId::C, 100),
        ButtonEdge::up(ButtonId::C, 150),
    ];
    let mut app = BeaconApp::new(
        ScriptedButtons::new(&edges),
        empty_inbox(),
        BeaconConfig::default(),
    );

    run(&mut app, 0, 2_000, 10);

    assert!(app.transport().posted.is_empty());
    assert_eq!(drain_cues(&mut app), vec![Cue::Press]);
}

#[test]
fn stick_profile_words_incoming_emoji_but_sends_raw_text() {
    let edges = [
        ButtonEdge::down(ButtonId::A, 100),
        ButtonEdge::up(ButtonId::A, 1_300),
    ];
    let mut transport = ScriptedTransport::online();
    transport
        .reply_json(r#"{"message":"👍"}"#)
        .reply_json(r#"{"message":"see you ✨"}"#);
    let mut app = BeaconApp::new(ScriptedButtons::new(&edges), transport, BeaconConfig::stick());

    block_on(app.tick(0));
    assert_eq!(shown_text(&app), "good");

    run(&mut app, 10, 2_000, 10);
    assert_eq!(app.transport().posted, vec![r#"{"message":"☆"}"#.to_string()]);
    assert_eq!(shown_text(&app), "☆");

    block_on(app.tick(10_000));
    assert_eq!(shown_text(&app), "see you nice");
}

#[test]
fn stick_profile_echo_of_own_star_stays_local() {
    let edges = [
        ButtonEdge::down(ButtonId::A, 100),
        ButtonEdge::up(ButtonId::A, 1_300),
    ];
    let mut transport = empty_inbox();
    transport.reply_json(r#"{"message":"☆"}"#);
    let mut app = BeaconApp::new(ScriptedButtons::new(&edges), transport, BeaconConfig::stick());

    run(&mut app, 0, 2_000, 10);
    assert_eq!(app.sync_state().provenance(), Some(Provenance::Local));
    assert_eq!(drain_cues(&mut app), vec![Cue::Press, Cue::SendOk]);

    block_on(app.tick(10_000));
    assert_eq!(app.transport().get_calls, 2);
    assert_eq!(app.sync_state().provenance(), Some(Provenance::Local));
    assert_eq!(app.scroll_direction(), ScrollDirection::Rightward);
    assert!(drain_cues(&mut app).is_empty());
    match shown(&app) {
        Shown::Message { text, badge, .. } => {
            assert_eq!(text, "☆");
            assert_eq!(badge, Some(("SENT 200".to_string(), BadgeTone::Plain)));
        }
        Shown::Reconnecting { .. } => panic!("expected a message screen"),
    }
}

#[test]
fn cue_queue_keeps_the_newest_entries() {
    let edges: Vec<ButtonEdge> = (0..12u64)
        .flat_map(|i| {
            [
                ButtonEdge::down(ButtonId::C, 100 + i * 1_000),
                ButtonEdge::up(ButtonId::C, 150 + i * 1_000),
            ]
        })
        .collect();
    let mut app = BeaconApp::new(
        ScriptedButtons::new(&edges),
        empty_inbox(),
        BeaconConfig::default(),
    );

    run(&mut app, 0, 13_000, 50);

    assert_eq!(drain_cues(&mut app).len(), CUE_QUEUE);
}
