use engine::ui::{Anchor, Insets, Rect, Size};
use engine::ui_tree::{UiAction, UiEvent, UiId, UiInput, UiTree, Visibility};

const CANVAS: UiId = UiId(1);
const BAR: UiId = UiId(10);
const OK: UiId = UiId(11);
const CANCEL: UiId = UiId(12);
const TITLE: UiId = UiId(20);

fn tree(size: Size) -> UiTree {
    let screen = Rect::from_size(size.w, size.h);
    let bar = Rect::new(0, screen.h - 40, screen.w, 40).inset(Insets::symmetric(8, 4));
    let buttons = bar.split_columns(2, 8);

    let mut ui = UiTree::new();
    ui.insert_canvas(CANVAS, screen);
    ui.insert_label(CANVAS, TITLE, screen.place(Size::new(100, 20), Anchor::TopCenter));
    ui.insert_container(CANVAS, BAR, bar);
    ui.insert_button(BAR, OK, buttons[0], Some(UiAction(1)));
    ui.insert_button(BAR, CANCEL, buttons[1], Some(UiAction(2)));
    ui
}

fn press_release(ui: &mut UiTree, pos: (u32, u32)) -> Vec<UiEvent> {
    let mut events = ui.process_input(UiInput {
        mouse_pos: Some(pos),
        mouse_down: true,
        mouse_up: false,
    });
    events.extend(ui.process_input(UiInput {
        mouse_pos: Some(pos),
        mouse_down: false,
        mouse_up: true,
    }));
    events
}

#[test]
fn hover_and_press_state_follow_the_pointer() {
    let mut ui = tree(Size::new(200, 100));
    let ok = ui.rect(OK).expect("ok button");

    let events = ui.process_input(UiInput {
        mouse_pos: Some(ok.center()),
        ..UiInput::default()
    });
    assert!(events.contains(&UiEvent::Hover { id: OK, entered: true }));
    assert!(ui.is_hovered(OK));

    ui.process_input(UiInput {
        mouse_pos: Some(ok.center()),
        mouse_down: true,
        mouse_up: false,
    });
    assert!(ui.is_pressed(OK));
}

#[test]
fn release_outside_the_pressed_button_does_not_click() {
    let mut ui = tree(Size::new(200, 100));
    let ok = ui.rect(OK).expect("ok button");
    let cancel = ui.rect(CANCEL).expect("cancel button");

    ui.process_input(UiInput {
        mouse_pos: Some(ok.center()),
        mouse_down: true,
        mouse_up: false,
    });
    let events = ui.process_input(UiInput {
        mouse_pos: Some(cancel.center()),
        mouse_down: false,
        mouse_up: true,
    });
    assert!(!events.iter().any(|e| matches!(e, UiEvent::Click { .. })));
}

#[test]
fn hidden_container_passes_clicks_to_the_canvas() {
    let mut ui = tree(Size::new(200, 100));
    let cancel = ui.rect(CANCEL).expect("cancel button");
    assert_eq!(ui.set_visibility(BAR, Visibility::Hidden), Some(Visibility::Visible));

    let events = press_release(&mut ui, cancel.center());
    assert!(events.contains(&UiEvent::CanvasClick {
        id: CANVAS,
        pos: cancel.center()
    }));
    assert!(!ui.is_shown(CANCEL));

    ui.set_visibility(BAR, Visibility::Visible);
    let events = press_release(&mut ui, cancel.center());
    assert!(events.contains(&UiEvent::Click {
        id: CANCEL,
        action: Some(UiAction(2))
    }));
}

#[test]
fn labels_are_not_hit_targets() {
    let mut ui = tree(Size::new(200, 100));
    let title = ui.rect(TITLE).expect("title");
    let events = press_release(&mut ui, title.center());
    assert!(events.contains(&UiEvent::CanvasClick {
        id: CANVAS,
        pos: title.center()
    }));
}

#[test]
fn set_rect_moves_hit_area() {
    let mut ui = tree(Size::new(200, 100));
    let old = ui.rect(OK).expect("ok button");
    assert!(ui.set_rect(OK, Rect::new(old.x, old.y, 10, 10)));
    assert!(!ui.set_rect(UiId(999), Rect::new(0, 0, 10, 10)));

    let events = press_release(&mut ui, (old.x + 5, old.y + 5));
    assert!(events.contains(&UiEvent::Click {
        id: OK,
        action: Some(UiAction(1))
    }));
    let events = press_release(&mut ui, (old.x + 40, old.y + 20));
    assert!(!events.iter().any(|e| matches!(e, UiEvent::Click { .. })));
}
