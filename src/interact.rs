use glam::Vec2;

use crate::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    WheelUp,
    WheelDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    /// A platform key code with no variant of its own.
    Other(u32),
}

/// Returns true if the key was consumed. Otherwise it goes on to the parent.
pub type KeyHandler = Box<dyn FnMut(&mut Ui, WidgetI, bool, Key) -> bool>;
/// Gets the position in the widget's own space. Returns true if the click was consumed.
pub type MouseButtonHandler = Box<dyn FnMut(&mut Ui, WidgetI, bool, Vec2, MouseButton) -> bool>;
pub type HoverHandler = Box<dyn FnMut(&mut Ui, WidgetI, bool)>;
pub type FocusHandler = Box<dyn FnMut(&mut Ui, WidgetI, bool)>;

#[derive(Default)]
pub struct Handlers {
    pub(crate) key: Option<KeyHandler>,
    pub(crate) mouse_button: Option<MouseButtonHandler>,
    pub(crate) hover_changed: Option<HoverHandler>,
    pub(crate) focus_changed: Option<FocusHandler>,
}

fn key_slot(h: &mut Handlers) -> &mut Option<KeyHandler> {
    return &mut h.key;
}
fn mouse_button_slot(h: &mut Handlers) -> &mut Option<MouseButtonHandler> {
    return &mut h.mouse_button;
}
fn hover_slot(h: &mut Handlers) -> &mut Option<HoverHandler> {
    return &mut h.hover_changed;
}
fn focus_slot(h: &mut Handlers) -> &mut Option<FocusHandler> {
    return &mut h.focus_changed;
}

impl Ui {
    pub fn set_key_handler(&mut self, w: WidgetI, handler: impl FnMut(&mut Ui, WidgetI, bool, Key) -> bool + 'static) {
        self[w].handlers.key = Some(Box::new(handler));
    }

    pub fn set_mouse_button_handler(
        &mut self,
        w: WidgetI,
        handler: impl FnMut(&mut Ui, WidgetI, bool, Vec2, MouseButton) -> bool + 'static,
    ) {
        self[w].handlers.mouse_button = Some(Box::new(handler));
    }

    pub fn set_hover_changed_handler(&mut self, w: WidgetI, handler: impl FnMut(&mut Ui, WidgetI, bool) + 'static) {
        self[w].handlers.hover_changed = Some(Box::new(handler));
    }

    pub fn set_focus_changed_handler(&mut self, w: WidgetI, handler: impl FnMut(&mut Ui, WidgetI, bool) + 'static) {
        self[w].handlers.focus_changed = Some(Box::new(handler));
    }

    pub fn clear_handlers(&mut self, w: WidgetI) {
        self[w].handlers = Handlers::default();
    }

    // Handlers get `&mut Ui`, so they're moved out of the widget while they run.
    // They go back only if the widget still exists and the handler didn't install a replacement.
    fn take_handler<H>(&mut self, w: WidgetI, slot: fn(&mut Handlers) -> &mut Option<H>) -> Option<H> {
        let widget = self.widgets.get_mut(w.as_usize())?;
        return slot(&mut widget.handlers).take();
    }

    fn put_handler<H>(&mut self, w: WidgetI, slot: fn(&mut Handlers) -> &mut Option<H>, handler: H) {
        if let Some(widget) = self.widgets.get_mut(w.as_usize()) {
            let slot = slot(&mut widget.handlers);
            if slot.is_none() {
                *slot = Some(handler);
            }
        }
    }

    pub fn focused(&self) -> Option<WidgetI> {
        return self.focused;
    }

    pub fn is_focused(&self, w: WidgetI) -> bool {
        return self.focused == Some(w);
    }

    /// Give `w` the keyboard focus, taking it away from the previously focused widget.
    pub fn focus(&mut self, w: WidgetI) {
        if self.focused == Some(w) {
            return;
        }
        if let Some(old) = self.focused {
            self.unfocus(old);
        }
        self.focused = Some(w);
        self.fire_focus_changed(w, true);
    }

    /// Remove the focus from `w`, if it has it.
    pub fn unfocus(&mut self, w: WidgetI) {
        if self.focused != Some(w) {
            return;
        }
        self.focused = None;
        self.fire_focus_changed(w, false);
    }

    fn fire_focus_changed(&mut self, w: WidgetI, focused: bool) {
        if let Some(mut handler) = self.take_handler(w, focus_slot) {
            handler(self, w, focused);
            self.put_handler(w, focus_slot, handler);
        }
    }

    /// Deliver a key event to the focused widget. If its handler doesn't consume it, it bubbles up through the parents.
    ///
    /// Returns true if some widget consumed it.
    pub fn on_key(&mut self, is_down: bool, key: Key) -> bool {
        let mut current = self.focused;
        while let Some(w) = current {
            if let Some(mut handler) = self.take_handler(w, key_slot) {
                let consumed = handler(self, w, is_down, key);
                self.put_handler(w, key_slot, handler);
                if consumed {
                    return true;
                }
            }
            current = self.widgets.get(w.as_usize()).and_then(|widget| widget.parent);
        }
        return false;
    }

    /// Deliver a mouse button event to the tree under `root`. `pos` is in the space of `root`'s parent.
    ///
    /// Children get the event before their parent, topmost first. Hidden and disabled widgets are skipped along with their subtrees.
    pub fn on_mouse_button(&mut self, root: WidgetI, is_down: bool, pos: Vec2, button: MouseButton) -> bool {
        let widget = &self[root];
        if !widget.is_visible() || !widget.is_enabled() || !widget.rect.contains(pos) {
            return false;
        }
        let local = pos - widget.rect.pos;

        for child in self[root].children.clone().into_iter().rev() {
            if !self.contains(child) || self[child].parent != Some(root) {
                continue;
            }
            if self.on_mouse_button(child, is_down, local, button) {
                return true;
            }
        }

        if let Some(mut handler) = self.take_handler(root, mouse_button_slot) {
            let consumed = handler(self, root, is_down, local, button);
            self.put_handler(root, mouse_button_slot, handler);
            return consumed;
        }
        return false;
    }

    /// Update the hover state of the tree under `root` for a cursor at `pos`, in the space of `root`'s parent.
    pub fn on_mouse_move(&mut self, root: WidgetI, pos: Vec2) {
        let widget = &self[root];
        if !widget.is_visible() || !widget.rect.contains(pos) {
            self.clear_hover(root);
            return;
        }
        let local = pos - widget.rect.pos;

        self.set_hovered(root, true);
        if !self.contains(root) {
            return;
        }
        for child in self[root].children.clone() {
            if self.contains(child) && self[child].parent == Some(root) {
                self.on_mouse_move(child, local);
            }
        }
    }

    fn set_hovered(&mut self, w: WidgetI, hovered: bool) {
        if self[w].hovered == hovered {
            return;
        }
        self[w].hovered = hovered;
        if let Some(mut handler) = self.take_handler(w, hover_slot) {
            handler(self, w, hovered);
            self.put_handler(w, hover_slot, handler);
        }
    }

    /// Unhover `w` and its whole subtree.
    pub(crate) fn clear_hover(&mut self, w: WidgetI) {
        if !self.contains(w) {
            return;
        }
        self.set_hovered(w, false);
        if !self.contains(w) {
            return;
        }
        for child in self[w].children.clone() {
            self.clear_hover(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    // root 100x100 > panel (at 10,10, 50x50) > button (at 5,5, 10x10)
    fn tree() -> (Ui, WidgetI, WidgetI, WidgetI) {
        let mut ui = Ui::new();
        let root = ui.insert(Widget::container(AbsoluteLayout));
        let panel = ui.insert(Widget::container(AbsoluteLayout).with_rect(Vec2::new(10.0, 10.0), Vec2::ZERO));
        let button = ui.insert(Widget::plain().with_rect(Vec2::new(5.0, 5.0), Vec2::ZERO));
        ui.add(root, panel).unwrap();
        ui.add(panel, button).unwrap();
        ui.resize(root, Vec2::new(100.0, 100.0));
        ui.resize(panel, Vec2::new(50.0, 50.0));
        ui.resize(button, Vec2::new(10.0, 10.0));
        return (ui, root, panel, button);
    }

    #[test]
    fn test_key_bubbles_to_parent() {
        let (mut ui, root, panel, button) = tree();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = log.clone();
        ui.set_key_handler(button, move |_, w, _, _| {
            l.borrow_mut().push(w);
            return false;
        });
        let l = log.clone();
        ui.set_key_handler(panel, move |_, w, is_down, key| {
            l.borrow_mut().push(w);
            return is_down && key == Key::Enter;
        });

        assert!(ui.on_key(true, Key::Enter) == false);

        ui.focus(button);
        assert!(ui.on_key(true, Key::Enter));
        assert_eq!(*log.borrow(), vec![button, panel]);

        log.borrow_mut().clear();
        assert!(ui.on_key(true, Key::Escape) == false);
        assert_eq!(*log.borrow(), vec![button, panel]);
        let _ = root;
    }

    #[test]
    fn test_focus_changes() {
        let (mut ui, _root, panel, button) = tree();
        let log = Rc::new(RefCell::new(Vec::new()));
        for w in [panel, button] {
            let l = log.clone();
            ui.set_focus_changed_handler(w, move |_, w, focused| l.borrow_mut().push((w, focused)));
        }

        ui.focus(panel);
        ui.focus(button);
        assert!(ui.is_focused(button));
        assert_eq!(*log.borrow(), vec![(panel, true), (panel, false), (button, true)]);

        // taking the focused widget out of the tree unfocuses it
        ui.remove_from_parent(button).unwrap();
        assert_eq!(ui.focused(), None);
        assert_eq!(log.borrow().last(), Some(&(button, false)));
    }

    #[test]
    fn test_mouse_button_dispatch() {
        let (mut ui, root, panel, button) = tree();
        let hits = Rc::new(RefCell::new(Vec::new()));

        let h = hits.clone();
        ui.set_mouse_button_handler(button, move |_, w, _, pos, _| {
            h.borrow_mut().push((w, pos));
            return true;
        });
        let h = hits.clone();
        ui.set_mouse_button_handler(panel, move |_, w, _, pos, _| {
            h.borrow_mut().push((w, pos));
            return true;
        });

        // on the button, in its own coordinates
        assert!(ui.on_mouse_button(root, true, Vec2::new(17.0, 18.0), MouseButton::Left));
        // on the panel only
        assert!(ui.on_mouse_button(root, true, Vec2::new(50.0, 50.0), MouseButton::Left));
        // outside everything
        assert!(ui.on_mouse_button(root, true, Vec2::new(90.0, 90.0), MouseButton::Left) == false);
        assert_eq!(
            *hits.borrow(),
            vec![(button, Vec2::new(2.0, 3.0)), (panel, Vec2::new(40.0, 40.0))]
        );

        // disabled widgets don't get clicks, their parents do
        hits.borrow_mut().clear();
        ui.set_enabled(button, false);
        assert!(ui.on_mouse_button(root, true, Vec2::new(17.0, 18.0), MouseButton::Left));
        assert_eq!(*hits.borrow(), vec![(panel, Vec2::new(7.0, 8.0))]);
    }

    #[test]
    fn test_topmost_gets_the_click() {
        let mut ui = Ui::new();
        let root = ui.insert(Widget::container(AbsoluteLayout));
        let a = ui.insert(Widget::plain());
        let b = ui.insert(Widget::plain());
        ui.add(root, a).unwrap();
        ui.add(root, b).unwrap();
        ui.resize(root, Vec2::new(10.0, 10.0));
        ui.resize(a, Vec2::new(10.0, 10.0));
        ui.resize(b, Vec2::new(10.0, 10.0));

        let hits = Rc::new(RefCell::new(Vec::new()));
        for w in [a, b] {
            let h = hits.clone();
            ui.set_mouse_button_handler(w, move |_, w, _, _, _| {
                h.borrow_mut().push(w);
                return true;
            });
        }

        ui.on_mouse_button(root, true, Vec2::new(5.0, 5.0), MouseButton::Left);
        ui.make_topmost(a);
        ui.on_mouse_button(root, true, Vec2::new(5.0, 5.0), MouseButton::Left);
        assert_eq!(*hits.borrow(), vec![b, a]);
    }

    #[test]
    fn test_hover() {
        let (mut ui, root, panel, button) = tree();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let c = changes.clone();
        ui.set_hover_changed_handler(button, move |_, _, hovered| c.borrow_mut().push(hovered));

        ui.on_mouse_move(root, Vec2::new(17.0, 18.0));
        assert!(ui[panel].is_hovered());
        assert!(ui[button].is_hovered());

        ui.on_mouse_move(root, Vec2::new(17.0, 18.0));
        ui.on_mouse_move(root, Vec2::new(50.0, 50.0));
        assert!(ui[panel].is_hovered());
        assert!(ui[button].is_hovered() == false);

        ui.on_mouse_move(root, Vec2::new(17.0, 18.0));
        ui.set_visible(panel, false);
        assert!(ui[panel].is_hovered() == false);
        assert!(ui[button].is_hovered() == false);

        assert_eq!(*changes.borrow(), vec![true, false, true, false]);
    }

    #[test]
    fn test_hover_handler_can_destroy_its_widget() {
        let (mut ui, root, panel, button) = tree();
        ui.set_hover_changed_handler(panel, |ui, w, hovered| {
            if hovered {
                ui.destroy(w);
            }
        });
        ui.on_mouse_move(root, Vec2::new(17.0, 18.0));
        assert!(ui.contains(panel) == false);
        assert!(ui.contains(button) == false);
        assert!(ui[root].is_hovered());
        assert!(ui.children(root).is_empty());
    }

    #[test]
    fn test_handler_can_mutate_the_tree() {
        let (mut ui, root, panel, button) = tree();
        ui.set_mouse_button_handler(button, |ui, w, _, _, _| {
            ui.destroy(w);
            return true;
        });
        assert!(ui.on_mouse_button(root, true, Vec2::new(17.0, 18.0), MouseButton::Left));
        assert!(ui.contains(button) == false);
        assert!(ui.children(panel).is_empty());
    }
}
