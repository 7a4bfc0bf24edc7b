use std::time::Duration;

use chrono::{DateTime, Datelike, Local, TimeDelta, TimeZone, Timelike};
use countdown::celebration::CelebrationPhase;
use countdown::clock::{Clock, ManualClock};
use countdown::countdown::{Field, TickOutcome};
use countdown::flip::FLIP_DURATION;
use countdown::ui_ids::*;
use countdown::widget::{CountdownWidget, WidgetOptions, TICK_PERIOD};
use engine::surface::SurfaceSize;
use engine::ui_tree::{UiInput, Visibility};

const SIZE: SurfaceSize = SurfaceSize::new(1024, 640);

fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(y, mo, d, h, mi, s)
        .earliest()
        .expect("local time exists")
}

fn widget_at(
    start: DateTime<Local>,
    options: WidgetOptions,
) -> (CountdownWidget<ManualClock>, ManualClock) {
    let clock = ManualClock::new(start);
    let widget = CountdownWidget::new(clock.clone(), options, SIZE).expect("widget");
    (widget, clock)
}

fn widget_with_offset(offset: TimeDelta) -> (CountdownWidget<ManualClock>, ManualClock) {
    let start = Local::now();
    let options = WidgetOptions {
        target: Some(start + offset),
        ..WidgetOptions::default()
    };
    widget_at(start, options)
}

fn click(widget: &mut CountdownWidget<ManualClock>, pos: (u32, u32)) -> usize {
    widget.process_input(UiInput {
        mouse_pos: Some(pos),
        mouse_down: true,
        mouse_up: false,
    }) + widget.process_input(UiInput {
        mouse_pos: Some(pos),
        mouse_down: false,
        mouse_up: true,
    })
}

#[test]
fn target_90061_seconds_away_shows_one_of_each_unit() {
    let (mut w, _clock) = widget_with_offset(TimeDelta::seconds(90_061));
    w.start_ticking();

    assert_eq!(w.board().values(), ["01", "01", "01", "01"]);
    assert_eq!(w.phase(), CelebrationPhase::Idle);
    assert!(w.is_ticking());
}

#[test]
fn passed_target_shows_zeros_and_celebrates() {
    let (mut w, _clock) = widget_with_offset(TimeDelta::seconds(-5));
    w.start_ticking();

    assert_eq!(w.board().values(), ["00", "00", "00", "00"]);
    assert_eq!(w.last_outcome(), Some(&TickOutcome::Expired));
    assert_eq!(w.phase(), CelebrationPhase::Celebrating);
    assert!(w.fireworks().is_some_and(|fw| fw.is_running()));
    assert!(!w.is_ticking());

    let ui = w.ui();
    assert!(!ui.is_shown(UI_COUNTDOWN_CONTAINER));
    assert!(!ui.is_shown(UI_CARD_SECONDS));
    assert!(!ui.is_shown(UI_TIMEZONE_LABEL));
    assert!(!ui.is_shown(UI_FIRE_BUTTON));
    assert!(ui.is_shown(UI_CELEBRATION_TITLE));
}

#[test]
fn celebration_starts_once_per_zero_crossing() {
    let (mut w, _clock) = widget_with_offset(TimeDelta::seconds(-1));
    w.start_ticking();
    assert_eq!(w.celebration().started_count(), 1);

    assert_eq!(w.tick(), TickOutcome::Expired);
    assert!(!w.start_celebration());
    assert_eq!(w.celebration().started_count(), 1);
    assert_eq!(w.pending_tasks(), 1 + 4);
}

#[test]
fn midnight_crossing_runs_the_full_cycle() {
    let (mut w, clock) = widget_at(local(2030, 12, 31, 23, 59, 50), WidgetOptions::default());
    w.start_ticking();
    assert_eq!(w.target().year(), 2031);
    assert_eq!(w.board().card(Field::Seconds).value(), "10");

    clock.advance(Duration::from_secs(10));
    w.pump();
    assert_eq!(w.phase(), CelebrationPhase::Celebrating);
    assert_eq!(w.title_text().as_deref(), Some("HAPPY NEW YEAR 2031!"));

    // Nothing ticks during the celebration.
    clock.advance(Duration::from_secs(60));
    let ticks = w.ticks();
    w.pump();
    assert_eq!(w.ticks(), ticks);

    clock.advance(Duration::from_secs(2 * 60 * 60));
    w.pump();
    assert_eq!(w.phase(), CelebrationPhase::Idle);
    assert!(w.fireworks().is_none());

    let target = w.target().instant();
    assert_eq!((target.year(), target.month(), target.day()), (2032, 1, 1));
    assert!(target.hour() <= 3);
    assert!(target > clock.wall());
    assert!(matches!(w.last_outcome(), Some(TickOutcome::Running(r)) if r.total_secs() > 0));
    assert_eq!(w.board().card(Field::Days).value(), "364");
    assert!(w.is_ticking());
    assert!(w.ui().is_shown(UI_COUNTDOWN_CONTAINER));
    assert!(!w.ui().is_shown(UI_CELEBRATION_TITLE));
}

#[test]
fn celebration_restores_exact_prior_visibility() {
    let (mut w, clock) = widget_with_offset(TimeDelta::seconds(2));
    w.start_ticking();
    assert!(w.toggle_timezone());
    assert_eq!(w.ui().visibility(UI_TIMEZONE_LABEL), Some(Visibility::Hidden));

    clock.advance(TICK_PERIOD * 2);
    w.pump();
    assert_eq!(w.phase(), CelebrationPhase::Celebrating);

    assert!(w.end_celebration());
    assert_eq!(w.ui().visibility(UI_TIMEZONE_LABEL), Some(Visibility::Hidden));
    assert_eq!(
        w.ui().visibility(UI_COUNTDOWN_CONTAINER),
        Some(Visibility::Visible)
    );
    assert_eq!(
        w.ui().visibility(UI_CONTROLS_CONTAINER),
        Some(Visibility::Visible)
    );
}

#[test]
fn fire_one_shot_twice_stays_idle_with_two_bursts() {
    let (mut w, _clock) = widget_with_offset(TimeDelta::hours(5));
    w.start_ticking();
    assert!(w.burst_surface().is_none());

    w.fire_one_shot(100.0, 80.0);
    w.fire_one_shot(300.0, 120.0);

    assert_eq!(w.phase(), CelebrationPhase::Idle);
    assert_eq!(w.bursts_fired(), 2);
    let surface = w.burst_surface().expect("burst surface created lazily");
    assert_eq!(surface.total_explosions(), 2);
    assert!(!surface.is_running());
    assert!(w.fireworks().is_none());
}

#[test]
fn firing_during_a_celebration_leaves_it_running() {
    let (mut w, _clock) = widget_with_offset(TimeDelta::seconds(-1));
    w.start_ticking();
    w.fire_random();
    assert_eq!(w.phase(), CelebrationPhase::Celebrating);
    assert_eq!(w.bursts_fired(), 1);
}

#[test]
fn identical_ticks_flip_each_card_once() {
    let (mut w, _clock) = widget_with_offset(TimeDelta::seconds(3_725));
    w.start_ticking();
    w.tick();
    for field in Field::ALL {
        assert_eq!(w.board().card(field).transitions(), 1, "{field:?}");
    }
}

#[test]
fn flip_settles_after_flip_duration() {
    let (mut w, clock) = widget_with_offset(TimeDelta::seconds(30));
    w.start_ticking();
    assert!(w.board().card(Field::Seconds).is_flipping());

    clock.advance(FLIP_DURATION);
    w.pump();
    assert!(Field::ALL.iter().all(|f| !w.board().card(*f).is_flipping()));
}

#[test]
fn reduce_motion_updates_without_flipping() {
    let start = Local::now();
    let options = WidgetOptions {
        target: Some(start + TimeDelta::seconds(42)),
        reduce_motion: true,
        ..WidgetOptions::default()
    };
    let (mut w, _clock) = widget_at(start, options);
    w.start_ticking();
    assert_eq!(w.board().card(Field::Seconds).value(), "42");
    assert!(!w.board().card(Field::Seconds).is_flipping());
    assert_eq!(w.pending_tasks(), 1);
}

#[test]
fn restarting_the_tick_does_not_duplicate_timers() {
    let (mut w, clock) = widget_with_offset(TimeDelta::minutes(10));
    w.start_ticking();
    w.start_ticking();
    w.start_ticking();

    clock.advance(FLIP_DURATION);
    w.pump();
    assert_eq!(w.pending_tasks(), 1);

    let ticks = w.ticks();
    clock.advance(TICK_PERIOD);
    w.pump();
    assert_eq!(w.ticks(), ticks + 1);
}

#[test]
fn fire_button_and_sky_clicks_fire_bursts() {
    let (mut w, _clock) = widget_with_offset(TimeDelta::hours(1));
    w.start_ticking();

    let button = w.layout().fire_button;
    assert_eq!(click(&mut w, button.center()), 1);
    assert_eq!(click(&mut w, (SIZE.width / 2, 5)), 1);
    assert_eq!(w.bursts_fired(), 2);
}

#[test]
fn hidden_label_starts_hidden_and_resize_keeps_it() {
    let start = Local::now();
    let options = WidgetOptions {
        show_timezone_label: false,
        timezone_name: "Europe/Oslo".to_owned(),
        ..WidgetOptions::default()
    };
    let (mut w, _clock) = widget_at(start, options);
    assert!(!w.ui().is_shown(UI_TIMEZONE_LABEL));
    assert_eq!(w.timezone_text(), "DETECTED TIME ZONE: Europe/Oslo");

    w.resize(SurfaceSize::new(1920, 1080));
    assert_eq!(w.layout().canvas.w, 1920);
    assert_eq!(w.ui().rect(UI_CANVAS).map(|r| r.h), Some(1080));
    assert!(!w.ui().is_shown(UI_TIMEZONE_LABEL));
}

#[test]
fn effects_report_explosions_and_particles_fade() {
    let (mut w, _clock) = widget_with_offset(TimeDelta::hours(1));
    w.fire_one_shot(50.0, 50.0);
    let explosions = w.advance_effects(Duration::from_millis(16));
    assert_eq!(explosions, vec![(50.0, 50.0)]);

    for _ in 0..60 {
        w.advance_effects(Duration::from_millis(100));
    }
    assert!(w.burst_surface().is_some_and(|s| s.is_idle()));
}

#[test]
fn next_deadline_is_the_next_tick_once_flips_settle() {
    let (mut w, clock) = widget_with_offset(TimeDelta::minutes(3));
    w.start_ticking();
    let start = clock.mono();
    assert_eq!(w.next_deadline(), Some(start + FLIP_DURATION));

    clock.advance(FLIP_DURATION);
    w.pump();
    assert_eq!(w.next_deadline(), Some(start + TICK_PERIOD));
}
