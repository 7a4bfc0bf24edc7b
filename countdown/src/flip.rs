//! Flip-card display state.
//!
//! A card only animates when its value actually changes. The caller owns the timer: when
//! [`FlipCard::set`] reports a change it arms a settle task after [`FLIP_DURATION`] and hands the
//! handle back with [`FlipCard::arm_settle`]; [`FlipCard::settle`] clears the flipping mark.

use std::time::{Duration, Instant};

use engine::scheduler::TaskHandle;

use crate::countdown::{Field, FieldValues};

/// Length of one flip. The renderer's flap animation spans exactly this long.
pub const FLIP_DURATION: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Default)]
pub struct FlipCard {
    top: String,
    bottom: String,
    previous: String,
    flipping_since: Option<Instant>,
    settle_task: Option<TaskHandle>,
    transitions: u64,
}

impl FlipCard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last rendered value.
    pub fn value(&self) -> &str {
        &self.top
    }

    pub fn bottom(&self) -> &str {
        &self.bottom
    }

    /// Value shown before the current flip started.
    pub fn previous(&self) -> &str {
        &self.previous
    }

    /// Returns `false` without touching anything when `value` is already displayed.
    pub fn set(&mut self, value: &str, now: Instant) -> bool {
        if self.top == value {
            return false;
        }
        self.previous = std::mem::replace(&mut self.top, value.to_owned());
        self.bottom = value.to_owned();
        self.flipping_since = Some(now);
        self.transitions += 1;
        true
    }

    /// Records the pending settle task and returns the one it replaces, which the caller must
    /// cancel.
    pub fn arm_settle(&mut self, handle: TaskHandle) -> Option<TaskHandle> {
        self.settle_task.replace(handle)
    }

    pub fn settle_task(&self) -> Option<TaskHandle> {
        self.settle_task
    }

    pub fn settle(&mut self) {
        self.flipping_since = None;
        self.settle_task = None;
    }

    pub fn is_flipping(&self) -> bool {
        self.flipping_since.is_some()
    }

    /// Animation progress in `0.0..=1.0`, or `None` when the card is at rest.
    pub fn progress(&self, now: Instant) -> Option<f32> {
        let since = self.flipping_since?;
        let t = now.saturating_duration_since(since).as_secs_f32() / FLIP_DURATION.as_secs_f32();
        Some(t.clamp(0.0, 1.0))
    }

    /// Number of value changes applied so far.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }
}

/// The four cards in display order.
#[derive(Debug, Clone)]
pub struct FlipBoard {
    cards: [FlipCard; 4],
    animate: bool,
}

impl FlipBoard {
    pub fn new(animate: bool) -> Self {
        Self {
            cards: Default::default(),
            animate,
        }
    }

    pub fn animates(&self) -> bool {
        self.animate
    }

    pub fn card(&self, field: Field) -> &FlipCard {
        &self.cards[field.index()]
    }

    pub fn card_mut(&mut self, field: Field) -> &mut FlipCard {
        &mut self.cards[field.index()]
    }

    /// Pushes one tick's values in display order and returns the fields that started a flip
    /// and need a settle task.
    ///
    /// Without animation the values still change but every card settles immediately.
    pub fn apply(&mut self, values: &FieldValues, now: Instant) -> Vec<Field> {
        let mut flipped = Vec::new();
        for (field, value) in values.iter() {
            let card = &mut self.cards[field.index()];
            if !card.set(value, now) {
                continue;
            }
            if self.animate {
                flipped.push(field);
            } else {
                card.settle();
            }
        }
        flipped
    }

    /// Settles every card and returns the settle tasks that were still pending.
    pub fn settle_all(&mut self) -> Vec<TaskHandle> {
        self.cards
            .iter_mut()
            .filter_map(|card| {
                let pending = card.settle_task;
                card.settle();
                pending
            })
            .collect()
    }

    pub fn values(&self) -> [&str; 4] {
        [
            self.cards[0].value(),
            self.cards[1].value(),
            self.cards[2].value(),
            self.cards[3].value(),
        ]
    }
}
