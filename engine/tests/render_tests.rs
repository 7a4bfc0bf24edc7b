use engine::graphics::{CpuRenderer, Renderer2d, text_height, text_width};
use engine::surface::{RgbaBufferSurface, SurfaceSize};
use engine::ui::Rect;

const WHITE: [u8; 4] = [255, 255, 255, 255];
const NAVY: [u8; 4] = [8, 10, 28, 255];

#[test]
fn clear_paints_every_pixel() {
    let mut surface = RgbaBufferSurface::new(SurfaceSize::new(16, 9));
    surface.renderer().clear(NAVY);
    assert_eq!(surface.count_not(NAVY), 0);
}

#[test]
fn centered_text_is_centered_in_rect() {
    let size = SurfaceSize::new(64, 32);
    let mut frame = vec![0u8; size.rgba_len()];
    let mut gfx = CpuRenderer::new(&mut frame, size);

    let rect = Rect::new(10, 4, 40, 20);
    gfx.draw_text_centered(rect, "88", WHITE, 2);

    let w = text_width("88", 2);
    let h = text_height("88", 2);
    let x0 = rect.x + (rect.w - w) / 2;
    let y0 = rect.y + (rect.h - h) / 2;
    let idx = ((y0 * size.width + x0) * 4) as usize;
    // '8' has a full top row.
    assert_eq!(&frame[idx..idx + 4], &WHITE);
    let before = ((y0 * size.width + x0 - 1) * 4) as usize;
    assert_eq!(&frame[before..before + 4], &[0, 0, 0, 0]);
}

#[test]
fn rect_outline_leaves_interior_untouched() {
    let mut surface = RgbaBufferSurface::new(SurfaceSize::new(10, 10));
    surface.renderer().rect_outline(Rect::new(1, 1, 8, 8), WHITE);
    assert_eq!(surface.pixel(1, 1), Some(WHITE));
    assert_eq!(surface.pixel(8, 8), Some(WHITE));
    assert_eq!(surface.pixel(4, 4), Some([0, 0, 0, 0]));
    assert_eq!(surface.count_not([0, 0, 0, 0]), 28);
}

#[test]
fn blend_rect_mixes_over_existing_content() {
    let mut surface = RgbaBufferSurface::new(SurfaceSize::new(4, 4));
    {
        let mut gfx = surface.renderer();
        gfx.clear([0, 0, 0, 255]);
        gfx.blend_rect(Rect::new(0, 0, 2, 2), [200, 100, 0, 255], 128);
        gfx.blend_rect(Rect::new(2, 2, 2, 2), WHITE, 0);
    }
    assert_eq!(surface.pixel(0, 0), Some([100, 50, 0, 255]));
    assert_eq!(surface.pixel(3, 3), Some([0, 0, 0, 255]));
}

#[test]
fn resized_surface_renders_at_new_size() {
    let mut surface = RgbaBufferSurface::new(SurfaceSize::new(4, 4));
    surface.resize(SurfaceSize::new(8, 2));
    surface.renderer().clear(WHITE);
    assert_eq!(surface.frame().len(), 8 * 2 * 4);
    assert_eq!(surface.pixel(7, 1), Some(WHITE));
    assert_eq!(surface.pixel(0, 2), None);
}
