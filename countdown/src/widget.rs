//! The countdown widget: owns the clock, the target, the element tree, every timer, and both
//! fireworks surfaces.
//!
//! Handlers run to completion on the caller's thread. Timers are entries in one
//! [`Scheduler`]; the host calls [`CountdownWidget::pump`] whenever a deadline may have passed.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use engine::scheduler::{Scheduler, TaskHandle};
use engine::surface::SurfaceSize;
use engine::ui_tree::{UiEvent, UiInput, UiTree};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use crate::celebration::{
    CelebrationController, CelebrationPhase, DEFAULT_CELEBRATION_DURATION, DEFAULT_TITLE_PREFIX,
};
use crate::clock::Clock;
use crate::countdown::{evaluate, CountdownError, Field, TargetInstant, TickOutcome};
use crate::fireworks::{Fireworks, FireworksConfig};
use crate::flip::{FlipBoard, FLIP_DURATION};
use crate::layout::{apply_layout, build_tree, compute_layout, WidgetLayout};
use crate::settings::CountdownSettings;
use crate::timezone::timezone_label;
use crate::ui_ids::*;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Mixed into the seed of the one-shot surface so it does not mirror the celebration sky.
const BURST_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetTask {
    Tick,
    SettleFlip(Field),
    EndCelebration,
}

#[derive(Debug, Clone)]
pub struct WidgetOptions {
    pub celebration_duration: Duration,
    pub title_prefix: String,
    pub fireworks: FireworksConfig,
    pub reduce_motion: bool,
    pub show_timezone_label: bool,
    pub timezone_name: String,
    /// Count down to this instant instead of the next new year.
    pub target: Option<DateTime<Local>>,
    pub seed: u64,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            celebration_duration: DEFAULT_CELEBRATION_DURATION,
            title_prefix: DEFAULT_TITLE_PREFIX.to_owned(),
            fireworks: FireworksConfig::default(),
            reduce_motion: false,
            show_timezone_label: true,
            timezone_name: String::from("UTC"),
            target: None,
            seed: 0,
        }
    }
}

impl WidgetOptions {
    pub fn from_settings(settings: &CountdownSettings, timezone_name: String) -> Self {
        Self {
            celebration_duration: settings.celebration.duration,
            title_prefix: settings.celebration.title_prefix.clone(),
            fireworks: settings.fireworks.clone(),
            reduce_motion: settings.display.reduce_motion,
            show_timezone_label: settings.display.show_timezone_label,
            timezone_name,
            ..Self::default()
        }
    }
}

pub struct CountdownWidget<C: Clock> {
    clock: C,
    options: WidgetOptions,
    target: TargetInstant,
    ui: UiTree,
    layout: WidgetLayout,
    scheduler: Scheduler<WidgetTask>,
    tick_task: Option<TaskHandle>,
    board: FlipBoard,
    celebration: CelebrationController,
    fireworks: Option<Fireworks>,
    burst: Option<Fireworks>,
    rng: StdRng,
    last_outcome: Option<TickOutcome>,
    ticks: u64,
    bursts_fired: u64,
}

impl<C: Clock> CountdownWidget<C> {
    /// Builds the widget idle and not yet ticking; call [`start_ticking`](Self::start_ticking).
    pub fn new(clock: C, options: WidgetOptions, size: SurfaceSize) -> Result<Self, CountdownError> {
        let target = match options.target {
            Some(at) => TargetInstant::at(at),
            None => TargetInstant::new_year_after(clock.wall())?,
        };

        let layout = compute_layout(size);
        let mut ui = build_tree(&layout);
        if !options.show_timezone_label {
            ui.set_visibility(UI_TIMEZONE_LABEL, engine::ui_tree::Visibility::Hidden);
        }

        let celebration = CelebrationController::new(
            options.celebration_duration,
            CELEBRATION_HIDDEN,
            UI_CELEBRATION_TITLE,
        )
        .with_title_prefix(options.title_prefix.clone());

        log::info!(
            "counting down to {} (new year {})",
            target.instant().format("%Y-%m-%d %H:%M:%S %:z"),
            target.year()
        );

        Ok(Self {
            rng: StdRng::seed_from_u64(options.seed),
            board: FlipBoard::new(!options.reduce_motion),
            clock,
            options,
            target,
            ui,
            layout,
            scheduler: Scheduler::new(),
            tick_task: None,
            celebration,
            fireworks: None,
            burst: None,
            last_outcome: None,
            ticks: 0,
            bursts_fired: 0,
        })
    }

    /// (Re)arms the recurring tick and runs one tick immediately.
    pub fn start_ticking(&mut self) {
        if let Some(handle) = self.tick_task.take() {
            self.scheduler.cancel(handle);
        }
        let now = self.clock.mono();
        self.tick_task = Some(self.scheduler.schedule_repeating(
            now + TICK_PERIOD,
            TICK_PERIOD,
            WidgetTask::Tick,
        ));
        self.tick();
    }

    /// One Clock Driver step: compute the remaining time, push all four fields in order, and
    /// start the celebration when the target has been reached.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = evaluate(self.clock.wall(), &self.target);
        let now = self.clock.mono();

        let fields = outcome.fields();
        for field in self.board.apply(&fields, now) {
            self.arm_settle(field, now);
        }
        self.ticks += 1;
        log::trace!(
            "tick {}: {} {} {} {}",
            self.ticks,
            fields.get(Field::Days),
            fields.get(Field::Hours),
            fields.get(Field::Minutes),
            fields.get(Field::Seconds)
        );

        if outcome == TickOutcome::Expired {
            self.start_celebration();
        }
        self.last_outcome = Some(outcome.clone());
        outcome
    }

    fn arm_settle(&mut self, field: Field, now: Instant) {
        let handle = self
            .scheduler
            .schedule_after(now, FLIP_DURATION, WidgetTask::SettleFlip(field));
        if let Some(stale) = self.board.card_mut(field).arm_settle(handle) {
            self.scheduler.cancel(stale);
        }
    }

    /// Runs every task due at the clock's current instant. Returns how many ran.
    pub fn pump(&mut self) -> usize {
        let due = self.scheduler.poll_due(self.clock.mono());
        let count = due.len();
        for (handle, task) in due {
            self.run_task(handle, task);
        }
        count
    }

    // A task polled in the same batch may have been superseded by an earlier one, so each
    // handler checks its handle is still the current one.
    fn run_task(&mut self, handle: TaskHandle, task: WidgetTask) {
        match task {
            WidgetTask::Tick => {
                if self.tick_task == Some(handle) {
                    self.tick();
                }
            }
            WidgetTask::SettleFlip(field) => {
                let card = self.board.card_mut(field);
                if card.settle_task() == Some(handle) {
                    card.settle();
                }
            }
            WidgetTask::EndCelebration => {
                let current = self.celebration.session().and_then(|s| s.end_task());
                if current == Some(handle) {
                    self.end_celebration();
                }
            }
        }
    }

    /// Idle → Celebrating. No-op while a celebration is already running.
    pub fn start_celebration(&mut self) -> bool {
        let now = self.clock.mono();
        let year = self.target.year();
        if !self.celebration.start(year, now, &mut self.ui) {
            return false;
        }

        if let Some(handle) = self.tick_task.take() {
            self.scheduler.cancel(handle);
        }

        let mut fireworks = Fireworks::new(self.options.fireworks.clone(), self.options.seed);
        fireworks.start();
        self.fireworks = Some(fireworks);

        let duration = self.celebration.duration();
        let end = self
            .scheduler
            .schedule_after(now, duration, WidgetTask::EndCelebration);
        self.celebration.set_end_task(end);

        log::info!("celebrating {year} for {}s", duration.as_secs());
        true
    }

    /// Celebrating → Idle: clears the fireworks, restores hidden elements, moves the target to
    /// the following new year and resumes ticking.
    pub fn end_celebration(&mut self) -> bool {
        let Some(session) = self.celebration.finish(&mut self.ui) else {
            return false;
        };
        if let Some(handle) = session.end_task() {
            self.scheduler.cancel(handle);
        }
        if let Some(mut fireworks) = self.fireworks.take() {
            fireworks.stop();
            fireworks.clear();
        }

        match self.target.following(self.clock.wall()) {
            Ok(next) => self.target = next,
            Err(err) => {
                log::error!("cannot re-arm countdown after {}: {err}", session.year);
                return true;
            }
        }
        log::info!(
            "celebration of {} over; counting down to {}",
            session.year,
            self.target.year()
        );
        self.start_ticking();
        true
    }

    /// Explodes one shell at `(x, y)` on the one-shot surface, creating it on first use.
    ///
    /// Independent of the celebration state.
    pub fn fire_one_shot(&mut self, x: f32, y: f32) {
        let surface = self.burst.get_or_insert_with(|| {
            Fireworks::new(
                self.options.fireworks.clone(),
                self.options.seed ^ BURST_SEED_SALT,
            )
        });
        surface.burst_at(x, y);
        self.bursts_fired += 1;
        log::debug!("one-shot burst at ({x:.0}, {y:.0})");
    }

    /// Fires at a random point in the upper part of the sky and returns it.
    pub fn fire_random(&mut self) -> (f32, f32) {
        let canvas = self.layout.canvas;
        let x = canvas.w as f32 * self.rng.random_range(0.1..=0.9);
        let y = canvas.h as f32 * self.rng.random_range(0.1..=0.45);
        self.fire_one_shot(x, y);
        (x, y)
    }

    /// Shows or hides the timezone label. Ignored during a celebration, which owns the label's
    /// visibility until it ends.
    pub fn toggle_timezone(&mut self) -> bool {
        if self.celebration.is_active() {
            return false;
        }
        let Some(current) = self.ui.visibility(UI_TIMEZONE_LABEL) else {
            return false;
        };
        self.ui.set_visibility(UI_TIMEZONE_LABEL, current.toggled());
        true
    }

    /// Cancels every timer, ends any celebration without re-arming from it, recomputes the
    /// target from now and starts ticking again.
    pub fn reset(&mut self) {
        self.scheduler.clear();
        self.tick_task = None;
        self.board.settle_all();
        if let Some(session) = self.celebration.finish(&mut self.ui) {
            log::info!("celebration of {} cut short by reset", session.year);
        }
        self.fireworks = None;
        if let Some(burst) = self.burst.as_mut() {
            burst.clear();
        }

        match TargetInstant::new_year_after(self.clock.wall()) {
            Ok(target) => self.target = target,
            Err(err) => log::error!("reset kept the previous target: {err}"),
        }
        self.start_ticking();
    }

    /// Steps both fireworks surfaces and returns where shells exploded.
    pub fn advance_effects(&mut self, dt: Duration) -> Vec<(f32, f32)> {
        let width = self.layout.canvas.w as f32;
        let height = self.layout.canvas.h as f32;
        let mut explosions = Vec::new();
        for surface in [self.fireworks.as_mut(), self.burst.as_mut()]
            .into_iter()
            .flatten()
        {
            surface.step(dt, width, height);
            explosions.extend(surface.take_explosions());
        }
        explosions
    }

    /// Returns `true` if the event fired a burst.
    pub fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        match event {
            UiEvent::Click {
                action: Some(ACTION_FIRE),
                ..
            } => {
                self.fire_random();
                true
            }
            UiEvent::CanvasClick { pos, .. } => {
                self.fire_one_shot(pos.0 as f32, pos.1 as f32);
                true
            }
            _ => false,
        }
    }

    /// Feeds pointer input through the element tree. Returns the number of bursts fired.
    pub fn process_input(&mut self, input: UiInput) -> usize {
        let events = self.ui.process_input(input);
        events
            .into_iter()
            .filter(|event| self.handle_ui_event(*event))
            .count()
    }

    pub fn resize(&mut self, size: SurfaceSize) {
        self.layout = compute_layout(size);
        apply_layout(&mut self.ui, &self.layout);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn target(&self) -> &TargetInstant {
        &self.target
    }

    pub fn phase(&self) -> CelebrationPhase {
        self.celebration.phase()
    }

    pub fn celebration(&self) -> &CelebrationController {
        &self.celebration
    }

    pub fn board(&self) -> &FlipBoard {
        &self.board
    }

    pub fn ui(&self) -> &UiTree {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut UiTree {
        &mut self.ui
    }

    pub fn layout(&self) -> &WidgetLayout {
        &self.layout
    }

    /// The continuous celebration surface; only exists while celebrating.
    pub fn fireworks(&self) -> Option<&Fireworks> {
        self.fireworks.as_ref()
    }

    pub fn burst_surface(&self) -> Option<&Fireworks> {
        self.burst.as_ref()
    }

    pub fn bursts_fired(&self) -> u64 {
        self.bursts_fired
    }

    pub fn last_outcome(&self) -> Option<&TickOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_ticking(&self) -> bool {
        self.tick_task
            .is_some_and(|handle| self.scheduler.is_scheduled(handle))
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    pub fn timezone_text(&self) -> String {
        timezone_label(&self.options.timezone_name)
    }

    /// The celebration title while one is running.
    pub fn title_text(&self) -> Option<String> {
        self.celebration
            .session()
            .map(|session| self.celebration.title_text(session.year))
    }
}
