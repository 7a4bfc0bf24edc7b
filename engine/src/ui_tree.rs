//! Retained element tree: the presentation layer widgets mutate.
//!
//! Elements are addressed by [`UiId`]. Looking up an id that was never inserted is not an error;
//! accessors return `None` and mutators report that nothing changed.

use std::collections::HashMap;

use crate::ui::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UiId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UiAction(pub u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        matches!(self, Visibility::Visible)
    }

    pub fn toggled(self) -> Self {
        match self {
            Visibility::Visible => Visibility::Hidden,
            Visibility::Hidden => Visibility::Visible,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiState {
    pub hovered: Option<UiId>,
    pub pressed: Option<UiId>,
}

impl UiState {
    pub fn is_hovered(&self, id: UiId) -> bool {
        self.hovered == Some(id)
    }

    pub fn is_pressed(&self, id: UiId) -> bool {
        self.pressed == Some(id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiInput {
    pub mouse_pos: Option<(u32, u32)>,
    pub mouse_down: bool,
    pub mouse_up: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    /// An enabled button was pressed and released under the pointer.
    Click { id: UiId, action: Option<UiAction> },
    /// A press and release landed on a canvas without hitting any button.
    CanvasClick { id: UiId, pos: (u32, u32) },
    Hover { id: UiId, entered: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiNodeKind {
    Canvas,
    Container,
    Label,
    Button { action: Option<UiAction> },
}

#[derive(Debug, Clone)]
struct UiNode {
    kind: UiNodeKind,
    rect: Rect,
    parent: Option<UiId>,
    children: Vec<UiId>,
    visibility: Visibility,
    enabled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UiTree {
    nodes: HashMap<UiId, UiNode>,
    roots: Vec<UiId>,
    state: UiState,
}

impl UiTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or replaces) an element. `parent: None` makes it a root; an unknown parent also
    /// falls back to root placement.
    pub fn insert(&mut self, parent: Option<UiId>, id: UiId, kind: UiNodeKind, rect: Rect) {
        self.detach(id);
        let parent = parent.filter(|p| self.nodes.contains_key(p));
        match parent {
            Some(p) => {
                if let Some(node) = self.nodes.get_mut(&p) {
                    node.children.push(id);
                }
            }
            None => self.roots.push(id),
        }

        let children = self
            .nodes
            .get(&id)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        self.nodes.insert(
            id,
            UiNode {
                kind,
                rect,
                parent,
                children,
                visibility: Visibility::Visible,
                enabled: true,
            },
        );
    }

    pub fn insert_canvas(&mut self, id: UiId, rect: Rect) {
        self.insert(None, id, UiNodeKind::Canvas, rect);
    }

    pub fn insert_container(&mut self, parent: UiId, id: UiId, rect: Rect) {
        self.insert(Some(parent), id, UiNodeKind::Container, rect);
    }

    pub fn insert_label(&mut self, parent: UiId, id: UiId, rect: Rect) {
        self.insert(Some(parent), id, UiNodeKind::Label, rect);
    }

    pub fn insert_button(&mut self, parent: UiId, id: UiId, rect: Rect, action: Option<UiAction>) {
        self.insert(Some(parent), id, UiNodeKind::Button { action }, rect);
    }

    pub fn contains(&self, id: UiId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn kind(&self, id: UiId) -> Option<UiNodeKind> {
        self.nodes.get(&id).map(|n| n.kind)
    }

    pub fn rect(&self, id: UiId) -> Option<Rect> {
        self.nodes.get(&id).map(|n| n.rect)
    }

    pub fn set_rect(&mut self, id: UiId, rect: Rect) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.rect = rect;
                true
            }
            None => false,
        }
    }

    pub fn children(&self, id: UiId) -> &[UiId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn visibility(&self, id: UiId) -> Option<Visibility> {
        self.nodes.get(&id).map(|n| n.visibility)
    }

    /// Sets the element's own visibility and returns the previous value, or `None` if the
    /// element does not exist.
    pub fn set_visibility(&mut self, id: UiId, visibility: Visibility) -> Option<Visibility> {
        let node = self.nodes.get_mut(&id)?;
        Some(std::mem::replace(&mut node.visibility, visibility))
    }

    /// True when the element and all of its ancestors are visible.
    pub fn is_shown(&self, id: UiId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.nodes.get(&current) else {
                return false;
            };
            if !node.visibility.is_visible() {
                return false;
            }
            cursor = node.parent;
        }
        true
    }

    pub fn set_enabled(&mut self, id: UiId, enabled: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.enabled = enabled;
        }
    }

    pub fn is_enabled(&self, id: UiId) -> bool {
        self.nodes.get(&id).is_some_and(|n| n.enabled)
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    pub fn is_hovered(&self, id: UiId) -> bool {
        self.state.is_hovered(id)
    }

    pub fn is_pressed(&self, id: UiId) -> bool {
        self.state.is_pressed(id)
    }

    pub fn process_input(&mut self, input: UiInput) -> Vec<UiEvent> {
        let mut events = Vec::new();
        if let Some(pos) = input.mouse_pos {
            let hovered = self.hit_test(pos);
            if hovered != self.state.hovered {
                if let Some(prev) = self.state.hovered {
                    events.push(UiEvent::Hover {
                        id: prev,
                        entered: false,
                    });
                }
                if let Some(next) = hovered {
                    events.push(UiEvent::Hover {
                        id: next,
                        entered: true,
                    });
                }
                self.state.hovered = hovered;
            }
        }

        if input.mouse_down {
            self.state.pressed = self.state.hovered;
        }

        if input.mouse_up {
            let pressed = self.state.pressed.take();
            if let (Some(pressed_id), Some(hovered_id)) = (pressed, self.state.hovered) {
                if pressed_id == hovered_id {
                    if let Some(event) = self.click_event(pressed_id, input.mouse_pos) {
                        events.push(event);
                    }
                }
            }
        }

        events
    }

    fn click_event(&self, id: UiId, pos: Option<(u32, u32)>) -> Option<UiEvent> {
        let node = self.nodes.get(&id)?;
        match node.kind {
            UiNodeKind::Button { action } if node.enabled => Some(UiEvent::Click { id, action }),
            UiNodeKind::Canvas => pos.map(|pos| UiEvent::CanvasClick { id, pos }),
            _ => None,
        }
    }

    fn detach(&mut self, id: UiId) {
        let Some(parent) = self.nodes.get(&id).map(|n| n.parent) else {
            return;
        };
        match parent {
            Some(p) => {
                if let Some(node) = self.nodes.get_mut(&p) {
                    node.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
    }

    /// Topmost enabled button under `pos`, else the canvas it sits on.
    fn hit_test(&self, pos: (u32, u32)) -> Option<UiId> {
        self.roots
            .iter()
            .rev()
            .find_map(|root| self.hit_test_node(*root, pos))
    }

    fn hit_test_node(&self, id: UiId, pos: (u32, u32)) -> Option<UiId> {
        let node = self.nodes.get(&id)?;
        if !node.visibility.is_visible() || !node.rect.contains(pos.0, pos.1) {
            return None;
        }
        match node.kind {
            UiNodeKind::Button { .. } => node.enabled.then_some(id),
            UiNodeKind::Label => None,
            UiNodeKind::Canvas | UiNodeKind::Container => {
                let child_hit = node
                    .children
                    .iter()
                    .rev()
                    .find_map(|child| self.hit_test_node(*child, pos));
                match (child_hit, node.kind) {
                    (Some(hit), _) => Some(hit),
                    (None, UiNodeKind::Canvas) => Some(id),
                    (None, _) => None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: UiId = UiId(1);
    const PANEL: UiId = UiId(2);
    const BUTTON: UiId = UiId(3);
    const LABEL: UiId = UiId(4);
    const GO: UiAction = UiAction(7);

    fn tree() -> UiTree {
        let mut t = UiTree::new();
        t.insert_canvas(CANVAS, Rect::from_size(100, 100));
        t.insert_container(CANVAS, PANEL, Rect::new(0, 0, 50, 50));
        t.insert_button(PANEL, BUTTON, Rect::new(10, 10, 20, 20), Some(GO));
        t.insert_label(CANVAS, LABEL, Rect::new(60, 60, 20, 20));
        t
    }

    fn click(t: &mut UiTree, pos: (u32, u32)) -> Vec<UiEvent> {
        t.process_input(UiInput {
            mouse_pos: Some(pos),
            mouse_down: true,
            mouse_up: false,
        });
        t.process_input(UiInput {
            mouse_pos: Some(pos),
            mouse_down: false,
            mouse_up: true,
        })
    }

    #[test]
    fn set_visibility_returns_previous_value() {
        let mut t = tree();
        assert_eq!(t.set_visibility(LABEL, Visibility::Hidden), Some(Visibility::Visible));
        assert_eq!(t.set_visibility(LABEL, Visibility::Hidden), Some(Visibility::Hidden));
        assert_eq!(t.set_visibility(UiId(99), Visibility::Hidden), None);
    }

    #[test]
    fn hidden_ancestor_hides_descendants() {
        let mut t = tree();
        assert!(t.is_shown(BUTTON));
        t.set_visibility(PANEL, Visibility::Hidden);
        assert!(!t.is_shown(BUTTON));
        assert_eq!(t.visibility(BUTTON), Some(Visibility::Visible));
    }

    #[test]
    fn button_click_reports_action() {
        let mut t = tree();
        let events = click(&mut t, (15, 15));
        assert!(events.contains(&UiEvent::Click {
            id: BUTTON,
            action: Some(GO)
        }));
    }

    #[test]
    fn click_on_empty_canvas_reports_position() {
        let mut t = tree();
        let events = click(&mut t, (90, 10));
        assert!(events.contains(&UiEvent::CanvasClick {
            id: CANVAS,
            pos: (90, 10)
        }));
    }

    #[test]
    fn hidden_or_disabled_button_is_not_clickable() {
        let mut t = tree();
        t.set_enabled(BUTTON, false);
        let events = click(&mut t, (15, 15));
        assert!(!events.iter().any(|e| matches!(e, UiEvent::Click { .. })));

        t.set_enabled(BUTTON, true);
        t.set_visibility(PANEL, Visibility::Hidden);
        let events = click(&mut t, (15, 15));
        assert!(!events.iter().any(|e| matches!(e, UiEvent::Click { .. })));
    }

    #[test]
    fn reinserting_keeps_single_parent_link() {
        let mut t = tree();
        t.insert_label(PANEL, LABEL, Rect::new(0, 0, 5, 5));
        assert!(t.children(PANEL).contains(&LABEL));
        assert!(!t.children(CANVAS).contains(&LABEL));
    }
}
