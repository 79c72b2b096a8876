use crate::*;

impl Ui {
    /// Add `child` at the end of `container`'s children, on top of its siblings.
    ///
    /// The child's layout params are rebuilt from its `layout{}` description, and the container is marked for relayout.
    pub fn add(&mut self, container: WidgetI, child: WidgetI) -> Result<()> {
        let index = self[container].children.len();
        return self.insert_child(container, child, index);
    }

    /// Add `child` so that it ends up at position `index` among the children of `container`.
    pub fn insert_child(&mut self, container: WidgetI, child: WidgetI, index: usize) -> Result<()> {
        if self[container].is_list() {
            return Err(Error::ListChildren);
        }
        return self.attach(container, child, index);
    }

    pub(crate) fn attach(&mut self, container: WidgetI, child: WidgetI, index: usize) -> Result<()> {
        let params = LayoutParams::from_desc(self[child].layout_desc.as_ref())?;
        self.link(container, child, index, params)?;
        self.set_relayout_needed(container);
        return Ok(());
    }

    // Tree bookkeeping only. Lists use this directly while scrolling, where a new child doesn't change the list's own size.
    pub(crate) fn link(&mut self, container: WidgetI, child: WidgetI, index: usize, params: LayoutParams) -> Result<()> {
        if !self[container].is_container() {
            return Err(Error::NotAContainer);
        }
        if self[child].parent.is_some() {
            return Err(Error::AlreadyParented);
        }
        debug_assert!(
            !self.is_in_subtree(container, child),
            "adding a widget to its own subtree"
        );

        self[child].layout_params = params;
        self[child].parent = Some(container);
        let index = index.min(self[container].children.len());
        self[container].children.insert(index, child);
        return Ok(());
    }

    /// Remove `child` from `container` and hand it back to the caller, who now owns it.
    pub fn remove(&mut self, container: WidgetI, child: WidgetI) -> Result<WidgetI> {
        if self[container].is_list() {
            return Err(Error::ListChildren);
        }
        return self.detach(container, child);
    }

    pub(crate) fn detach(&mut self, container: WidgetI, child: WidgetI) -> Result<WidgetI> {
        self.unlink(container, child)?;
        self.set_relayout_needed(container);
        return Ok(child);
    }

    pub(crate) fn unlink(&mut self, container: WidgetI, child: WidgetI) -> Result<WidgetI> {
        let Some(index) = self[container].children.iter().position(|&c| c == child) else {
            return Err(Error::NotAChild);
        };
        debug_assert_eq!(self[child].parent, Some(container));

        self[container].children.remove(index);
        self[child].parent = None;
        self[child].layout_params = LayoutParams::DEFAULT;

        if let Some(focused) = self.focused {
            if self.is_in_subtree(focused, child) {
                self.unfocus(focused);
            }
        }
        self.clear_hover(child);
        return Ok(child);
    }

    /// Remove every child of `container`, returning them in order. The caller owns the returned widgets.
    pub fn remove_all(&mut self, container: WidgetI) -> Result<Vec<WidgetI>> {
        if self[container].is_list() {
            return Err(Error::ListChildren);
        }
        return Ok(self.detach_all(container));
    }

    pub(crate) fn detach_all(&mut self, container: WidgetI) -> Vec<WidgetI> {
        let children = self[container].children.clone();
        for &child in &children {
            let _ = self.detach(container, child);
        }
        return children;
    }

    /// Detach `w` from its parent. Fails with [`Error::NoParent`] if it has none.
    pub fn remove_from_parent(&mut self, w: WidgetI) -> Result<WidgetI> {
        let Some(parent) = self[w].parent else {
            return Err(Error::NoParent);
        };
        return self.remove(parent, w);
    }

    /// Free `w` and its whole subtree, detaching it first if needed.
    ///
    /// Lists in the subtree hand their materialized widgets back to their providers before the providers are dropped.
    pub fn destroy(&mut self, w: WidgetI) {
        if let Some(parent) = self[w].parent {
            let _ = self.detach(parent, w);
        }
        self.destroy_subtree(w);
    }

    fn destroy_subtree(&mut self, w: WidgetI) {
        if self[w].is_list() {
            drop(self.unbind_provider(w));
        }

        let children = std::mem::take(&mut self[w].children);
        for child in children {
            self[child].parent = None;
            self.destroy_subtree(child);
        }

        if self.focused == Some(w) {
            self.focused = None;
        }

        let widget = self.widgets.remove(w.as_usize());
        if let Some(texture) = widget.cache {
            self.released_textures.push(texture);
        }
    }

    /// Whether `w` is drawn on top of all its siblings.
    pub fn is_topmost(&self, w: WidgetI) -> bool {
        let Some(parent) = self[w].parent else {
            return false;
        };
        return self[parent].children.last() == Some(&w);
    }

    /// Move `w` to the end of its parent's children, so that it is drawn above its siblings.
    pub fn make_topmost(&mut self, w: WidgetI) {
        let Some(parent) = self[w].parent else {
            return;
        };
        if self[parent].is_list() || self.is_topmost(w) {
            return;
        }
        let children = &mut self[parent].children;
        if let Some(index) = children.iter().position(|&c| c == w) {
            children.remove(index);
            children.push(w);
        }
        self.clear_cache(parent);
    }
}
