use std::ops::Range;

use glam::Vec2;

use crate::*;

/// The source of items for a list.
///
/// The list asks for widgets as they scroll into view and hands them back through [`ItemsProvider::recycle`] once they scroll out.
/// Items can be requested in increasing and in decreasing index order, and an item can be requested more than once while it is measured.
pub trait ItemsProvider {
    fn count(&self) -> usize;

    /// Produce a detached widget for item `index`. The list takes ownership of it until it's recycled.
    fn get_widget(&mut self, ui: &mut Ui, index: usize) -> WidgetI;

    /// Take back the widget of item `index`. It is detached when this is called.
    ///
    /// The default implementation destroys it. Providers that pool widgets can keep it instead.
    fn recycle(&mut self, ui: &mut Ui, index: usize, widget: WidgetI) {
        let _ = index;
        ui.destroy(widget);
    }

    /// Called with `Some(list)` when the provider is bound to a list and with `None` when it's unbound.
    ///
    /// Providers that change their data set call [`Ui::notify_data_set_changed`] on the list they're bound to.
    fn on_bind(&mut self, list: Option<WidgetI>) {
        let _ = list;
    }
}

pub type DataSetChanged = Box<dyn FnMut(&mut Ui, WidgetI)>;

/// Scroll state of a virtualized list.
///
/// `(pos_index, pos_offset)` is the authoritative scroll position: item `pos_index` is the first materialized item, and the leading edge of the viewport is `pos_offset` pixels into it.
/// The materialized children are a contiguous range of items starting at `added_index`, and can always be rebuilt from the scroll position.
pub struct ListState {
    pub(crate) provider: Option<Box<dyn ItemsProvider>>,
    pub(crate) is_vertical: bool,

    pub(crate) pos_index: usize,
    pub(crate) pos_offset: f32,
    // None means nothing is materialized
    pub(crate) added_index: Option<usize>,

    // layout of the last items when scrolled to the end. 0 tail items means it has to be recomputed.
    pub(crate) num_tail_items: usize,
    pub(crate) first_tail_item_index: usize,
    // -1 if the tail items don't fill the viewport
    pub(crate) first_tail_item_offset: f32,

    pub(crate) data_set_changed: Option<DataSetChanged>,
}

impl ListState {
    pub(crate) fn new(is_vertical: bool) -> Self {
        return ListState {
            provider: None,
            is_vertical,
            pos_index: 0,
            pos_offset: 0.0,
            added_index: None,
            num_tail_items: 0,
            first_tail_item_index: 0,
            first_tail_item_offset: 0.0,
            data_set_changed: None,
        };
    }

    fn main(&self) -> Axis {
        return Axis::main(self.is_vertical);
    }

    // Runs `f` with the provider taken out of the state. Returns false if there is no provider.
    fn with_provider(&mut self, f: impl FnOnce(&mut ListState, &mut dyn ItemsProvider)) -> bool {
        let Some(mut provider) = self.provider.take() else {
            return false;
        };
        f(self, provider.as_mut());
        self.provider = Some(provider);
        return true;
    }

    fn update_children_list(&mut self, ui: &mut Ui, list: WidgetI) {
        let updated = self.with_provider(|state, provider| state.reconcile(ui, list, provider));
        if !updated {
            self.pos_index = 0;
            self.pos_offset = 0.0;
            self.num_tail_items = 0;
            for child in ui[list].children.clone() {
                let _ = ui.unlink(list, child);
                ui.destroy(child);
            }
            self.added_index = None;
            ui.clear_cache(list);
        }
    }

    fn reconcile(&mut self, ui: &mut Ui, list: WidgetI, provider: &mut dyn ItemsProvider) {
        let count = provider.count();

        if self.is_tail_stale(count) {
            self.update_tail_items_info(ui, list, provider);
        }

        let max_offset = self.first_tail_item_offset.max(0.0);
        if self.pos_index > self.first_tail_item_index {
            self.pos_index = self.first_tail_item_index;
            self.pos_offset = max_offset;
        } else if self.pos_index == self.first_tail_item_index {
            self.pos_offset = self.pos_offset.min(max_offset);
        }

        let own_main = ui[list].rect.dim[self.main().i()];
        let mut pos = if self.is_vertical {
            own_main + self.pos_offset
        } else {
            -self.pos_offset
        };

        // items that scrolled past the leading edge
        while let Some(added_index) = self.added_index {
            if added_index >= self.pos_index {
                break;
            }
            let Some(&first) = ui[list].children.first() else {
                self.added_index = None;
                break;
            };
            let _ = ui.unlink(list, first);
            provider.recycle(ui, added_index, first);
            self.added_index = Some(added_index + 1);
        }
        if ui[list].children.is_empty() {
            self.added_index = None;
        }

        // `cursor` is the position in the children of the next materialized widget, whose item index is `iter_index`
        let mut cursor = 0;
        let mut iter_index = self.added_index.unwrap_or(self.pos_index);
        let iter_end = iter_index + ui[list].children.len();

        if own_main > 0.0 {
            let mut index = self.pos_index;
            while index < count {
                let reuse = iter_index <= index && index < iter_end && cursor < ui[list].children.len();
                let (w, added) = if reuse {
                    let w = ui[list].children[cursor];
                    cursor += 1;
                    iter_index += 1;
                    (w, true)
                } else {
                    (provider.get_widget(ui, index), false)
                };

                let is_last = self.arrange_widget(ui, list, provider, w, &mut pos, added, index, &mut cursor);
                index += 1;
                if is_last {
                    break;
                }
            }
        }

        // whatever is left after the trailing edge
        let rest = ui[list].children[cursor..].to_vec();
        for (k, w) in rest.into_iter().enumerate() {
            let _ = ui.unlink(list, w);
            provider.recycle(ui, iter_index + k, w);
        }

        if ui[list].children.is_empty() {
            self.added_index = None;
        }

        log::trace!(
            "list {list:?}: pos ({}, {}), materialized {:?}+{}",
            self.pos_index,
            self.pos_offset,
            self.added_index,
            ui[list].children.len()
        );

        ui.clear_cache(list);
    }

    // Size and place one item at `pos`, then either keep it in the list or recycle it if it's entirely before the viewport.
    // Returns true if the item reaches the trailing edge of the viewport.
    #[allow(clippy::too_many_arguments)]
    fn arrange_widget(
        &mut self,
        ui: &mut Ui,
        list: WidgetI,
        provider: &mut dyn ItemsProvider,
        w: WidgetI,
        pos: &mut f32,
        added: bool,
        index: usize,
        cursor: &mut usize,
    ) -> bool {
        let params = if added {
            ui[w].layout_params
        } else {
            item_params(ui, w)
        };
        let dim = ui.dim_for_widget(list, w, &params);
        ui.resize(w, dim);

        let dim = ui[w].rect.dim;
        let own = ui[list].rect.dim;

        let keep;
        let is_last;
        if self.is_vertical {
            *pos -= dim.y;
            ui.move_to(w, Vec2::new(0.0, *pos));
            keep = *pos < own.y;
            is_last = *pos <= 0.0;
        } else {
            ui.move_to(w, Vec2::new(*pos, 0.0));
            *pos += dim.x;
            keep = *pos > 0.0;
            is_last = *pos >= own.x;
        }

        if keep {
            if !added {
                if let Err(err) = ui.link(list, w, *cursor, params) {
                    log::error!("list {list:?}: can't add the widget for item {index}: {err}");
                    return is_last;
                }
                *cursor += 1;
            }
            self.added_index = Some(self.added_index.map_or(index, |i| i.min(index)));
        } else {
            self.pos_index += 1;
            self.pos_offset -= dim[self.main().i()];
            if added {
                let _ = ui.unlink(list, w);
                *cursor -= 1;
                self.added_index = self.added_index.map(|i| i + 1);
            }
            provider.recycle(ui, index, w);
        }

        return is_last;
    }

    // The provider's count can shrink before anyone calls notify_data_set_changed.
    fn is_tail_stale(&self, count: usize) -> bool {
        return self.num_tail_items == 0 || self.num_tail_items > count || self.first_tail_item_index > count;
    }

    // Walk back from the last item, measuring throwaway widgets, until the viewport is full.
    fn update_tail_items_info(&mut self, ui: &mut Ui, list: WidgetI, provider: &mut dyn ItemsProvider) {
        self.num_tail_items = 0;

        let count = provider.count();
        if count == 0 {
            self.first_tail_item_index = 0;
            self.first_tail_item_offset = 0.0;
            return;
        }

        let main = self.main().i();
        let mut dim = ui[list].rect.dim[main];

        let mut i = count;
        while i != 0 && dim > 0.0 {
            i -= 1;
            self.num_tail_items += 1;

            let w = provider.get_widget(ui, i);
            let params = item_params(ui, w);
            dim -= ui.dim_for_widget(list, w, &params)[main];
            provider.recycle(ui, i, w);
        }

        self.first_tail_item_index = count - self.num_tail_items;
        self.first_tail_item_offset = if dim > 0.0 { -1.0 } else { -dim };
    }

    fn set_scroll_pos_as_factor(&mut self, ui: &mut Ui, list: WidgetI, provider: &mut dyn ItemsProvider, factor: f32) {
        let count = provider.count();
        if count == 0 {
            return;
        }
        let factor = factor.clamp(0.0, 1.0);

        if self.is_tail_stale(count) {
            self.update_tail_items_info(ui, list, provider);
        }

        let max_offset = self.first_tail_item_offset.max(0.0);
        let scrollable = count.saturating_sub(self.num_tail_items);

        if scrollable != 0 {
            self.pos_index = (factor * scrollable as f32) as usize;
            let int_factor = self.pos_index as f32 / scrollable as f32;

            // the size of the first materialized item stands in for the size of every item
            self.pos_offset = match ui[list].children.first() {
                Some(&first) => {
                    let d = ui[first].rect.dim[self.main().i()];
                    (d * (factor - int_factor) * scrollable as f32 + factor * max_offset).round()
                }
                None => 0.0,
            };
        } else {
            self.pos_index = 0;
            self.pos_offset = (factor * max_offset).round();
        }

        self.reconcile(ui, list, provider);
    }

    // Hand every materialized widget back to the provider.
    fn recycle_children(&mut self, ui: &mut Ui, list: WidgetI, provider: &mut dyn ItemsProvider) {
        let first = self.added_index.unwrap_or(self.pos_index);
        for (k, w) in ui[list].children.clone().into_iter().enumerate() {
            let _ = ui.unlink(list, w);
            provider.recycle(ui, first + k, w);
        }
        self.added_index = None;
    }

    fn unbind(&mut self, ui: &mut Ui, list: WidgetI) -> Option<Box<dyn ItemsProvider>> {
        let mut provider = self.provider.take()?;
        self.recycle_children(ui, list, provider.as_mut());
        self.num_tail_items = 0;
        provider.on_bind(None);
        ui.clear_cache(list);
        return Some(provider);
    }
}

fn item_params(ui: &Ui, w: WidgetI) -> LayoutParams {
    match LayoutParams::from_desc(ui[w].layout_desc.as_ref()) {
        Ok(params) => return params,
        Err(err) => {
            log::error!("list item {w:?} has invalid layout params: {err}");
            return LayoutParams::DEFAULT;
        }
    }
}

impl Ui {
    // The list state is moved out of the widget while the list algorithm runs, so that providers get a plain `&mut Ui`.
    // Returns None if `list` isn't a list, or if its state is already in use further up the stack.
    fn with_list_state<R>(&mut self, list: WidgetI, f: impl FnOnce(&mut Ui, &mut ListState) -> R) -> Option<R> {
        let Kind::List(slot) = &mut self[list].kind else {
            return None;
        };
        let mut state = slot.take()?;

        let ret = f(self, &mut state);

        if let Some(widget) = self.widgets.get_mut(list.as_usize()) {
            if let Kind::List(slot) = &mut widget.kind {
                *slot = Some(state);
            }
        }
        return Some(ret);
    }

    fn list_state(&self, list: WidgetI) -> Option<&ListState> {
        match &self[list].kind {
            Kind::List(Some(state)) => return Some(&**state),
            _ => return None,
        }
    }

    /// Bind `provider` to `list`, replacing and returning the previous one.
    ///
    /// The old provider gets its materialized widgets back and is unbound before the new one is bound, then the list is rebuilt as in [`Ui::notify_data_set_changed`].
    pub fn set_items_provider(
        &mut self,
        list: WidgetI,
        provider: Option<Box<dyn ItemsProvider>>,
    ) -> Option<Box<dyn ItemsProvider>> {
        let old = self.unbind_provider(list);

        let bound = self.with_list_state(list, |_ui, state| {
            let mut provider = provider;
            if let Some(provider) = provider.as_mut() {
                provider.on_bind(Some(list));
            }
            state.provider = provider;
        });
        if bound.is_none() {
            log::error!("set_items_provider: {list:?} is not a list, or it's busy laying itself out");
            return old;
        }

        self.notify_data_set_changed(list);
        return old;
    }

    pub(crate) fn unbind_provider(&mut self, list: WidgetI) -> Option<Box<dyn ItemsProvider>> {
        return self.with_list_state(list, |ui, state| state.unbind(ui, list)).flatten();
    }

    /// Rebuild the list from scratch after the provider's items changed, then fire the data-set-changed callback.
    pub fn notify_data_set_changed(&mut self, list: WidgetI) {
        let callback = self.with_list_state(list, |ui, state| {
            state.num_tail_items = 0;
            state.with_provider(|state, provider| state.recycle_children(ui, list, provider));
            state.update_children_list(ui, list);
            return state.data_set_changed.take();
        });

        let Some(Some(mut callback)) = callback else {
            return;
        };
        callback(self, list);
        self.with_list_state(list, move |_ui, state| {
            if state.data_set_changed.is_none() {
                state.data_set_changed = Some(callback);
            }
        });
    }

    /// Set a callback that runs every time the list was rebuilt because its data set changed.
    pub fn set_data_set_changed(&mut self, list: WidgetI, callback: Option<DataSetChanged>) {
        self.with_list_state(list, move |_ui, state| state.data_set_changed = callback);
    }

    /// Current scroll position as a factor in `[0, 1]`.
    pub fn scroll_factor(&self, list: WidgetI) -> f32 {
        let Some(state) = self.list_state(list) else {
            return 0.0;
        };
        let Some(provider) = &state.provider else {
            return 0.0;
        };
        let count = provider.count();
        let visible = self.visible_count(list);
        if count == 0 || count <= visible {
            return 0.0;
        }
        return (state.pos_index as f32 / (count - visible) as f32).clamp(0.0, 1.0);
    }

    /// Scroll so that `factor` 0 shows the first item at the leading edge and 1 shows the last item at the trailing edge.
    ///
    /// The fractional part of the position is converted to pixels using the size of the first materialized item, so it's only exact when items have the same size.
    pub fn set_scroll_pos_as_factor(&mut self, list: WidgetI, factor: f32) {
        self.with_list_state(list, |ui, state| {
            state.with_provider(|state, provider| state.set_scroll_pos_as_factor(ui, list, provider, factor));
        });
    }

    /// Bring the materialized widgets in line with the current scroll position, reusing the ones that are still visible.
    pub fn update_children_list(&mut self, list: WidgetI) {
        self.with_list_state(list, |ui, state| state.update_children_list(ui, list));
    }

    pub(crate) fn list_lay_out(&mut self, list: WidgetI) {
        let done = self.with_list_state(list, |ui, state| {
            state.num_tail_items = 0;
            state.update_children_list(ui, list);
        });
        if done.is_none() {
            log::trace!("list {list:?} is already laying itself out");
        }
    }

    /// Number of materialized items, including partially visible ones.
    pub fn visible_count(&self, list: WidgetI) -> usize {
        return self[list].children.len();
    }

    /// The scroll position as `(first item index, pixel offset into it)`.
    pub fn list_pos(&self, list: WidgetI) -> (usize, f32) {
        let Some(state) = self.list_state(list) else {
            return (0, 0.0);
        };
        return (state.pos_index, state.pos_offset);
    }

    /// Item indices of the materialized children, in child order.
    pub fn materialized_range(&self, list: WidgetI) -> Option<Range<usize>> {
        let first = self.list_state(list)?.added_index?;
        return Some(first..first + self[list].children.len());
    }
}

/// Builds list items on demand from a fixed set of descriptions.
///
/// This is what an inflated `VerticalList` or `HorizontalList` uses for the widget nodes listed inside it.
pub struct StaticProvider {
    inflater: Inflater,
    descs: Vec<Desc>,
}

impl StaticProvider {
    pub fn new(inflater: Inflater, descs: Vec<Desc>) -> Self {
        return StaticProvider { inflater, descs };
    }
}

impl ItemsProvider for StaticProvider {
    fn count(&self) -> usize {
        return self.descs.len();
    }

    fn get_widget(&mut self, ui: &mut Ui, index: usize) -> WidgetI {
        match self.inflater.inflate(ui, &self.descs[index]) {
            Ok(w) => return w,
            Err(err) => {
                log::error!("list item {index} failed to inflate: {err}");
                return ui.insert(Widget::plain());
            }
        }
    }
}
