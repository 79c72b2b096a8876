use std::ops::{Index, IndexMut};

use slab::Slab;

use crate::*;

/// The central struct of the library: an arena holding every widget.
///
/// Widgets are created with [`Ui::insert`], arranged into trees with [`Ui::add`], and freed with [`Ui::destroy`].
/// A tree is laid out by calling [`Ui::resize`] on its root, and drawn with [`Ui::render`].
///
/// Everything happens on one thread, synchronously. `Ui` is not `Send`.
pub struct Ui {
    pub(crate) widgets: Slab<Widget>,
    pub(crate) focused: Option<WidgetI>,
    // textures of invalidated render caches, handed back to the backend on the next render.
    pub(crate) released_textures: Vec<TextureHandle>,
}

impl Index<WidgetI> for Ui {
    type Output = Widget;
    fn index(&self, i: WidgetI) -> &Self::Output {
        return &self.widgets[i.as_usize()];
    }
}

impl IndexMut<WidgetI> for Ui {
    fn index_mut(&mut self, i: WidgetI) -> &mut Self::Output {
        return &mut self.widgets[i.as_usize()];
    }
}

impl Default for Ui {
    fn default() -> Self {
        Ui::new()
    }
}

impl Ui {
    pub fn new() -> Self {
        return Ui {
            widgets: Slab::with_capacity(100),
            focused: None,
            released_textures: Vec::new(),
        };
    }

    /// Move a widget into the arena. It starts detached.
    pub fn insert(&mut self, widget: Widget) -> WidgetI {
        debug_assert!(widget.parent.is_none());
        return WidgetI::from(self.widgets.insert(widget));
    }

    pub fn contains(&self, w: WidgetI) -> bool {
        return self.widgets.contains(w.as_usize());
    }

    /// Number of live widgets, attached or not.
    pub fn len(&self) -> usize {
        return self.widgets.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.widgets.is_empty();
    }

    pub fn children(&self, w: WidgetI) -> &[WidgetI] {
        return &self[w].children;
    }

    pub fn parent(&self, w: WidgetI) -> Option<WidgetI> {
        return self[w].parent;
    }

    pub fn set_name(&mut self, w: WidgetI, name: Option<String>) {
        self[w].name = name;
    }

    pub fn set_visible(&mut self, w: WidgetI, visible: bool) {
        if self[w].is_visible() == visible {
            return;
        }
        self[w].flags.set(WidgetFlags::VISIBLE, visible);
        if !visible {
            self.clear_hover(w);
        }
        self.clear_cache(w);
    }

    pub fn set_enabled(&mut self, w: WidgetI, enabled: bool) {
        self[w].flags.set(WidgetFlags::ENABLED, enabled);
    }

    pub fn set_clip(&mut self, w: WidgetI, clip: bool) {
        self[w].flags.set(WidgetFlags::CLIP, clip);
        self.clear_cache(w);
    }

    pub fn set_cache(&mut self, w: WidgetI, cache: bool) {
        self[w].flags.set(WidgetFlags::CACHE, cache);
        if !cache {
            self.drop_cache(w);
        }
    }

    /// The first widget named `name` in the subtree of `w`, searching depth-first with `w` itself first.
    pub fn find_by_name(&self, w: WidgetI, name: &str) -> Option<WidgetI> {
        if self[w].name() == Some(name) {
            return Some(w);
        }
        for &child in &self[w].children {
            if let Some(found) = self.find_by_name(child, name) {
                return Some(found);
            }
        }
        return None;
    }

    /// Whether `w` is `ancestor` or somewhere below it.
    pub fn is_in_subtree(&self, w: WidgetI, ancestor: WidgetI) -> bool {
        let mut current = Some(w);
        while let Some(i) = current {
            if i == ancestor {
                return true;
            }
            current = self[i].parent;
        }
        return false;
    }

    /// Translate `pos` from the space of `w` into the space of `ancestor`, or into the space of the root's parent if `ancestor` is `None` or not above `w`.
    pub fn pos_in_ancestor(&self, w: WidgetI, pos: glam::Vec2, ancestor: Option<WidgetI>) -> glam::Vec2 {
        let mut pos = pos;
        let mut current = w;
        loop {
            if Some(current) == ancestor {
                return pos;
            }
            pos += self[current].rect.pos;
            match self[current].parent {
                Some(parent) => current = parent,
                None => return pos,
            }
        }
    }
}
