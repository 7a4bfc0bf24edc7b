use engine::graphics::{line_advance_y, text_width, GLYPH_H};
use engine::surface::SurfaceSize;
use engine::ui::{Anchor, Insets, Rect, Size};
use engine::ui_tree::{UiTree, Visibility};

use crate::countdown::Field;
use crate::ui_ids::*;

const MARGIN: u32 = 24;
const CARD_GAP: u32 = 16;
const CONTROLS_H: u32 = 48;
const FIRE_BUTTON: Size = Size { w: 120, h: 36 };
const LABEL_SCALE: u32 = 2;
const MAX_DIGIT_SCALE: u32 = 24;

/// Widest value a card is sized for; longer day counts still render, just tighter.
const CARD_SAMPLE: &str = "000";
const TITLE_SAMPLE: &str = "HAPPY NEW YEAR 0000!";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WidgetLayout {
    pub canvas: Rect,
    pub timezone: Rect,
    pub countdown: Rect,
    pub cards: [Rect; 4],
    pub captions: [Rect; 4],
    pub controls: Rect,
    pub fire_button: Rect,
    pub hint: Rect,
    pub title: Rect,
    pub digit_scale: u32,
    pub label_scale: u32,
    pub title_scale: u32,
}

impl WidgetLayout {
    pub fn card(&self, field: Field) -> Rect {
        self.cards[field.index()]
    }

    pub fn caption(&self, field: Field) -> Rect {
        self.captions[field.index()]
    }
}

pub fn compute_layout(size: SurfaceSize) -> WidgetLayout {
    let canvas = Rect::from_size(size.width, size.height);
    let safe = canvas.inset(Insets::all(MARGIN));
    if safe.is_empty() {
        return WidgetLayout {
            canvas,
            digit_scale: 1,
            label_scale: 1,
            title_scale: 1,
            ..WidgetLayout::default()
        };
    }

    let label_h = line_advance_y(LABEL_SCALE);
    let timezone = Rect::new(safe.x, safe.y, safe.w, label_h);

    let controls_h = CONTROLS_H.min(safe.h / 4);
    let controls = Rect::new(safe.x, safe.bottom() - controls_h, safe.w, controls_h);
    let fire_button = controls.place(FIRE_BUTTON, Anchor::CenterLeft);
    let hint_x = fire_button.right() + CARD_GAP;
    let hint = Rect::new(
        hint_x.min(controls.right()),
        controls.y,
        controls.right().saturating_sub(hint_x),
        controls.h,
    );

    // Cards fill the band between the timezone label and the controls.
    let band_top = timezone.bottom() + CARD_GAP;
    let band = Rect::new(
        safe.x,
        band_top,
        safe.w,
        controls.y.saturating_sub(band_top + CARD_GAP),
    );
    let col_w = safe.w.saturating_sub(CARD_GAP * 3) / 4;
    let caption_h = label_h + LABEL_SCALE * 2;
    let card_h = (col_w * 3 / 4).min(band.h.saturating_sub(caption_h));
    let digit_scale = (col_w / (text_width(CARD_SAMPLE, 1) + 2))
        .min(card_h / (GLYPH_H + 2))
        .clamp(1, MAX_DIGIT_SCALE);

    let countdown = band.place(Size::new(band.w, card_h + caption_h), Anchor::Center);
    let row = Rect::new(countdown.x, countdown.y, countdown.w, card_h);
    let columns = row.split_columns(4, CARD_GAP);
    let mut cards = [Rect::default(); 4];
    let mut captions = [Rect::default(); 4];
    for (i, col) in columns.into_iter().enumerate().take(4) {
        cards[i] = col;
        captions[i] = Rect::new(col.x, col.bottom(), col.w, caption_h);
    }

    let title_scale = (safe.w / (text_width(TITLE_SAMPLE, 1) + 1)).clamp(1, MAX_DIGIT_SCALE);

    WidgetLayout {
        canvas,
        timezone,
        countdown,
        cards,
        captions,
        controls,
        fire_button,
        hint,
        title: safe,
        digit_scale,
        label_scale: LABEL_SCALE,
        title_scale,
    }
}

/// Builds the element tree for `layout`. The celebration title starts hidden.
pub fn build_tree(layout: &WidgetLayout) -> UiTree {
    let mut ui = UiTree::new();
    ui.insert_canvas(UI_CANVAS, layout.canvas);
    ui.insert_label(UI_CANVAS, UI_TIMEZONE_LABEL, layout.timezone);
    ui.insert_container(UI_CANVAS, UI_COUNTDOWN_CONTAINER, layout.countdown);
    for field in Field::ALL {
        ui.insert_label(UI_COUNTDOWN_CONTAINER, card_id(field), layout.card(field));
    }
    ui.insert_container(UI_CANVAS, UI_CONTROLS_CONTAINER, layout.controls);
    ui.insert_button(
        UI_CONTROLS_CONTAINER,
        UI_FIRE_BUTTON,
        layout.fire_button,
        Some(ACTION_FIRE),
    );
    ui.insert_label(UI_CONTROLS_CONTAINER, UI_HINT_LABEL, layout.hint);
    ui.insert_label(UI_CANVAS, UI_CELEBRATION_TITLE, layout.title);
    ui.set_visibility(UI_CELEBRATION_TITLE, Visibility::Hidden);
    ui
}

/// Moves every element to its rect in `layout` without touching visibility.
pub fn apply_layout(ui: &mut UiTree, layout: &WidgetLayout) {
    ui.set_rect(UI_CANVAS, layout.canvas);
    ui.set_rect(UI_TIMEZONE_LABEL, layout.timezone);
    ui.set_rect(UI_COUNTDOWN_CONTAINER, layout.countdown);
    for field in Field::ALL {
        ui.set_rect(card_id(field), layout.card(field));
    }
    ui.set_rect(UI_CONTROLS_CONTAINER, layout.controls);
    ui.set_rect(UI_FIRE_BUTTON, layout.fire_button);
    ui.set_rect(UI_HINT_LABEL, layout.hint);
    ui.set_rect(UI_CELEBRATION_TITLE, layout.title);
}
