use engine::ui_tree::{UiAction, UiId};

use crate::countdown::Field;

pub const UI_CANVAS: UiId = UiId(1);

pub const UI_COUNTDOWN_CONTAINER: UiId = UiId(100);
pub const UI_CARD_DAYS: UiId = UiId(101);
pub const UI_CARD_HOURS: UiId = UiId(102);
pub const UI_CARD_MINUTES: UiId = UiId(103);
pub const UI_CARD_SECONDS: UiId = UiId(104);

pub const UI_TIMEZONE_LABEL: UiId = UiId(200);

pub const UI_CONTROLS_CONTAINER: UiId = UiId(300);
pub const UI_FIRE_BUTTON: UiId = UiId(301);
pub const UI_HINT_LABEL: UiId = UiId(302);

pub const UI_CELEBRATION_TITLE: UiId = UiId(400);

pub const ACTION_FIRE: UiAction = UiAction(1);

/// Elements hidden for the duration of a celebration, in capture order.
pub const CELEBRATION_HIDDEN: [UiId; 3] = [
    UI_COUNTDOWN_CONTAINER,
    UI_TIMEZONE_LABEL,
    UI_CONTROLS_CONTAINER,
];

pub fn card_id(field: Field) -> UiId {
    match field {
        Field::Days => UI_CARD_DAYS,
        Field::Hours => UI_CARD_HOURS,
        Field::Minutes => UI_CARD_MINUTES,
        Field::Seconds => UI_CARD_SECONDS,
    }
}
