use std::time::Instant;

use engine::graphics::{line_advance_y, Color, Renderer2d};
use engine::ui::Rect;
use engine::ui_tree::UiTree;

use crate::clock::Clock;
use crate::countdown::Field;
use crate::flip::FlipCard;
use crate::ui_ids::*;
use crate::widget::CountdownWidget;

pub const COLOR_BACKGROUND: Color = [8, 10, 28, 255];
pub const COLOR_CARD_TOP: Color = [40, 42, 60, 255];
pub const COLOR_CARD_BOTTOM: Color = [30, 32, 48, 255];
pub const COLOR_CARD_SEAM: Color = [6, 6, 12, 255];
pub const COLOR_DIGIT: Color = [236, 236, 246, 255];
pub const COLOR_CAPTION: Color = [150, 160, 190, 255];
pub const COLOR_BUTTON: Color = [190, 56, 64, 255];
pub const COLOR_BUTTON_HOVER: Color = [226, 88, 96, 255];
pub const COLOR_BUTTON_PRESSED: Color = [150, 40, 48, 255];
pub const COLOR_BUTTON_TEXT: Color = [255, 255, 255, 255];
pub const COLOR_TITLE: Color = [255, 214, 92, 255];

const FLAP_SHADE_ALPHA: f32 = 110.0;

pub const HINT_TEXT: &str = "SPACE/F FIRE   T TIME ZONE   R RESET   ESC QUIT";

pub fn draw_widget<C: Clock>(widget: &CountdownWidget<C>, r: &mut dyn Renderer2d, now: Instant) {
    r.clear(COLOR_BACKGROUND);

    let ui = widget.ui();
    let layout = widget.layout();

    if ui.is_shown(UI_TIMEZONE_LABEL) {
        r.draw_text_centered(
            layout.timezone,
            &widget.timezone_text(),
            COLOR_CAPTION,
            layout.label_scale,
        );
    }

    for field in Field::ALL {
        if !ui.is_shown(card_id(field)) {
            continue;
        }
        draw_card(r, layout.card(field), widget.board().card(field), now, layout.digit_scale);
        r.draw_text_centered(
            layout.caption(field),
            field.caption(),
            COLOR_CAPTION,
            layout.label_scale,
        );
    }

    draw_controls(r, ui, layout.label_scale);

    if let Some(fireworks) = widget.fireworks() {
        fireworks.draw(r);
    }
    if let Some(burst) = widget.burst_surface() {
        burst.draw(r);
    }

    if ui.is_shown(UI_CELEBRATION_TITLE) {
        if let Some(title) = widget.title_text() {
            r.draw_text_centered(layout.title, &title, COLOR_TITLE, layout.title_scale);
        }
    }
}

/// Split card with the current value; while flipping, a flap folds down over the top half and
/// then unfolds over the bottom half.
pub fn draw_card(r: &mut dyn Renderer2d, rect: Rect, card: &FlipCard, now: Instant, scale: u32) {
    if rect.is_empty() {
        return;
    }
    let top = rect.top_half();
    let bottom = rect.bottom_half();
    r.fill_rect(top, COLOR_CARD_TOP);
    r.fill_rect(bottom, COLOR_CARD_BOTTOM);
    r.draw_text_centered(rect, card.value(), COLOR_DIGIT, scale);

    if let Some(progress) = card.progress(now) {
        if progress < 0.5 {
            let h = (top.h as f32 * (1.0 - progress * 2.0)) as u32;
            let flap = Rect::new(top.x, top.bottom() - h, top.w, h);
            r.fill_rect(flap, COLOR_CARD_TOP);
            r.blend_rect(flap, [0, 0, 0, 255], (FLAP_SHADE_ALPHA * progress * 2.0) as u8);
        } else {
            let h = (bottom.h as f32 * (2.0 - progress * 2.0)) as u32;
            let flap = Rect::new(bottom.x, bottom.y, bottom.w, h);
            r.fill_rect(flap, COLOR_CARD_BOTTOM);
            r.blend_rect(flap, [0, 0, 0, 255], (FLAP_SHADE_ALPHA * (2.0 - progress * 2.0)) as u8);
        }
    }

    let seam_h = (rect.h / 60).max(1);
    r.fill_rect(
        Rect::new(rect.x, top.bottom().saturating_sub(seam_h / 2), rect.w, seam_h),
        COLOR_CARD_SEAM,
    );
}

fn draw_controls(r: &mut dyn Renderer2d, ui: &UiTree, scale: u32) {
    if ui.is_shown(UI_FIRE_BUTTON) {
        if let Some(button) = ui.rect(UI_FIRE_BUTTON) {
            let color = if ui.is_pressed(UI_FIRE_BUTTON) {
                COLOR_BUTTON_PRESSED
            } else if ui.is_hovered(UI_FIRE_BUTTON) {
                COLOR_BUTTON_HOVER
            } else {
                COLOR_BUTTON
            };
            r.fill_rect(button, color);
            r.rect_outline(button, COLOR_BUTTON_TEXT);
            r.draw_text_centered(button, "FIRE", COLOR_BUTTON_TEXT, scale);
        }
    }

    if ui.is_shown(UI_HINT_LABEL) {
        if let Some(hint) = ui.rect(UI_HINT_LABEL) {
            let y = hint.y + hint.h.saturating_sub(line_advance_y(scale)) / 2;
            r.draw_text_scaled(hint.x, y, HINT_TEXT, COLOR_CAPTION, scale);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::surface::{RgbaBufferSurface, SurfaceSize};

    #[test]
    fn resting_card_shows_digits_over_both_halves() {
        let mut surface = RgbaBufferSurface::new(SurfaceSize::new(60, 40));
        let mut card = FlipCard::new();
        let now = Instant::now();
        card.set("88", now);
        card.settle();

        draw_card(&mut surface.renderer(), Rect::from_size(60, 40), &card, now, 4);
        assert_eq!(surface.pixel(0, 0), Some(COLOR_CARD_TOP));
        assert_eq!(surface.pixel(0, 39), Some(COLOR_CARD_BOTTOM));
        assert!(surface.frame().chunks_exact(4).any(|px| px == COLOR_DIGIT));
    }

    #[test]
    fn flap_covers_the_top_half_when_a_flip_starts() {
        let mut surface = RgbaBufferSurface::new(SurfaceSize::new(60, 40));
        let mut card = FlipCard::new();
        let now = Instant::now();
        card.set("88", now);

        draw_card(&mut surface.renderer(), Rect::from_size(60, 40), &card, now, 4);
        let top_has_digit = (0..19)
            .flat_map(|y| (0..60).map(move |x| (x, y)))
            .any(|(x, y)| surface.pixel(x, y) == Some(COLOR_DIGIT));
        assert!(!top_has_digit);
    }
}
