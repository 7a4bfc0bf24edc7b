//! New-year countdown widget: a flip-clock counting down to January 1 of next year and a
//! fireworks celebration when it reaches zero.

pub mod app;
pub mod celebration;
pub mod clock;
pub mod countdown;
pub mod fireworks;
pub mod flip;
pub mod layout;
pub mod render;
pub mod serde_duration;
pub mod settings;
pub mod sound;
pub mod timezone;
pub mod ui_ids;
pub mod widget;
