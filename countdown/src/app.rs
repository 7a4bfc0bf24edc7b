use std::time::{Duration, Instant};

use engine::app::{App, AppControl, InputFrame};
use engine::graphics::Renderer2d;
use engine::surface::SurfaceSize;
use winit::event::VirtualKeyCode;

use crate::clock::{Clock, SystemClock};
use crate::render::draw_widget;
use crate::sound::SoundBank;
use crate::widget::CountdownWidget;

/// Longest frame gap fed to the particle simulation.
const MAX_FRAME_DT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Fire,
    ToggleTimezone,
    Reset,
    Quit,
}

pub fn key_command(key: VirtualKeyCode) -> Option<KeyCommand> {
    match key {
        VirtualKeyCode::Space | VirtualKeyCode::F => Some(KeyCommand::Fire),
        VirtualKeyCode::T => Some(KeyCommand::ToggleTimezone),
        VirtualKeyCode::R => Some(KeyCommand::Reset),
        VirtualKeyCode::Escape => Some(KeyCommand::Quit),
        _ => None,
    }
}

/// Applies one keyboard command. Returns `Exit` for quit.
pub fn apply_command<C: Clock>(widget: &mut CountdownWidget<C>, command: KeyCommand) -> AppControl {
    match command {
        KeyCommand::Fire => {
            widget.fire_random();
        }
        KeyCommand::ToggleTimezone => {
            widget.toggle_timezone();
        }
        KeyCommand::Reset => {
            log::info!("reset requested");
            widget.reset();
        }
        KeyCommand::Quit => return AppControl::Exit,
    }
    AppControl::Continue
}

pub struct CountdownApp {
    widget: CountdownWidget<SystemClock>,
    sounds: SoundBank,
    last_frame: Option<Instant>,
}

impl CountdownApp {
    pub fn new(widget: CountdownWidget<SystemClock>, sounds: SoundBank) -> Self {
        Self {
            widget,
            sounds,
            last_frame: None,
        }
    }
}

impl App for CountdownApp {
    fn init(&mut self, size: SurfaceSize) {
        self.widget.resize(size);
        self.widget.start_ticking();
    }

    fn resized(&mut self, size: SurfaceSize) {
        self.widget.resize(size);
    }

    fn update(&mut self, input: &InputFrame, now: Instant) -> AppControl {
        for key in &input.keys_pressed {
            if let Some(command) = key_command(*key) {
                if apply_command(&mut self.widget, command) == AppControl::Exit {
                    return AppControl::Exit;
                }
            }
        }
        self.widget.process_input(input.ui_input());
        self.widget.pump();

        let dt = self
            .last_frame
            .map(|last| now.saturating_duration_since(last).min(MAX_FRAME_DT))
            .unwrap_or_default();
        self.last_frame = Some(now);
        for _ in self.widget.advance_effects(dt) {
            self.sounds.play_random();
        }
        AppControl::Continue
    }

    fn render(&mut self, renderer: &mut dyn Renderer2d) {
        draw_widget(&self.widget, renderer, self.widget.clock().mono());
    }

    fn next_wakeup(&self) -> Option<Instant> {
        self.widget.next_deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(key_command(VirtualKeyCode::Space), Some(KeyCommand::Fire));
        assert_eq!(key_command(VirtualKeyCode::F), Some(KeyCommand::Fire));
        assert_eq!(key_command(VirtualKeyCode::T), Some(KeyCommand::ToggleTimezone));
        assert_eq!(key_command(VirtualKeyCode::R), Some(KeyCommand::Reset));
        assert_eq!(key_command(VirtualKeyCode::Escape), Some(KeyCommand::Quit));
        assert_eq!(key_command(VirtualKeyCode::A), None);
    }
}
