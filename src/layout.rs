use std::rc::Rc;

use glam::Vec2;
use Axis::{X, Y};

use crate::*;

/// A size hint for one axis of a child in its parent container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dim {
    /// A fixed length in pixels.
    Length(f32),
    /// As small as the content allows.
    #[default]
    Min,
    /// As big as the parent on that axis.
    Max,
}

impl Dim {
    pub fn from_desc(desc: &Desc) -> Option<Dim> {
        match desc.as_str() {
            "min" => return Some(Dim::Min),
            "max" => return Some(Dim::Max),
            _ => return desc.as_f32().map(Dim::Length),
        }
    }
}

/// Per-child layout hints, attached by the parent when the child is added.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub dim: Xy<Dim>,
    /// Share of the leftover space in a [`LinearLayout`].
    pub weight: f32,
}

impl LayoutParams {
    pub const DEFAULT: LayoutParams = LayoutParams {
        dim: Xy::new_symm(Dim::Min),
        weight: 0.0,
    };

    /// Build params from a `layout{ dimX{..} dimY{..} weight{..} }` block.
    pub fn from_desc(layout: Option<&Desc>) -> Result<LayoutParams> {
        let mut params = LayoutParams::DEFAULT;
        let Some(layout) = layout else {
            return Ok(params);
        };

        for (property, axis) in [("dimX", X), ("dimY", Y)] {
            if let Some(value) = layout.property_value(property) {
                params.dim[axis] = Dim::from_desc(value)
                    .ok_or_else(|| invalid_property("layout", property, value))?;
            }
        }

        if let Some(value) = layout.property_value("weight") {
            params.weight = value
                .as_f32()
                .ok_or_else(|| invalid_property("layout", "weight", value))?;
        }

        return Ok(params);
    }
}

impl Default for LayoutParams {
    fn default() -> Self {
        LayoutParams::DEFAULT
    }
}

/// A strategy for sizing and positioning the children of a container.
pub trait Layout {
    /// Given the container's final size, resize and move every child.
    fn arrange_widgets(&self, ui: &mut Ui, container: WidgetI);

    /// The smallest size that fits the children.
    fn compute_min_dim(&self, ui: &Ui, container: WidgetI) -> Vec2;
}

/// Children keep the position they were given and are sized according to their layout params.
#[derive(Debug, Default, Clone, Copy)]
pub struct AbsoluteLayout;

impl Layout for AbsoluteLayout {
    fn arrange_widgets(&self, ui: &mut Ui, container: WidgetI) {
        for child in ui[container].children.clone() {
            let params = ui[child].layout_params;
            let dim = ui.dim_for_widget(container, child, &params);
            ui.resize(child, dim);
        }
    }

    fn compute_min_dim(&self, ui: &Ui, container: WidgetI) -> Vec2 {
        let mut min_dim = Vec2::ZERO;
        for &child in &ui[container].children {
            let extent = ui[child].rect.pos + ui.min_dim_for_widget(child);
            min_dim = min_dim.max(extent);
        }
        return min_dim;
    }
}

impl Ui {
    /// Change the size of a widget and lay out its content.
    ///
    /// Negative components are clamped to zero. If the size doesn't change and no relayout was requested, nothing happens.
    pub fn resize(&mut self, w: WidgetI, new_dim: Vec2) {
        let new_dim = new_dim.max(Vec2::ZERO);

        if self[w].rect.dim == new_dim {
            if self[w].relayout_needed {
                self.clear_cache(w);
                self.lay_out(w);
                self[w].relayout_needed = false;
            }
            return;
        }

        self.clear_cache(w);
        self[w].rect.dim = new_dim;
        self.on_resize(w);
        self[w].relayout_needed = false;
    }

    pub fn move_to(&mut self, w: WidgetI, pos: Vec2) {
        self[w].rect.pos = pos;
    }

    /// The size the widget wants, given `quotum` as the available space.
    ///
    /// A negative component means "no constraint": the widget should report its minimum size on that axis.
    pub fn measure(&self, w: WidgetI, quotum: Vec2) -> Vec2 {
        match &self[w].kind {
            Kind::Leaf(content) => return content.measure(quotum),
            Kind::Container(layout) => {
                if quotum.x >= 0.0 && quotum.y >= 0.0 {
                    return quotum;
                }
                let min_dim = layout.compute_min_dim(self, w);
                let mut ret = quotum;
                for axis in [X, Y] {
                    if ret[axis.i()] < 0.0 {
                        ret[axis.i()] = min_dim[axis.i()];
                    }
                }
                return ret;
            }
            Kind::Plain | Kind::List(_) => return quotum.max(Vec2::ZERO),
        }
    }

    /// Re-arrange the content of `w` within its current size.
    pub fn lay_out(&mut self, w: WidgetI) {
        match &self[w].kind {
            Kind::Container(layout) => {
                let layout = Rc::clone(layout);
                layout.arrange_widgets(self, w);
            }
            Kind::List(_) => self.list_lay_out(w),
            Kind::Plain | Kind::Leaf(_) => {}
        }
    }

    fn on_resize(&mut self, w: WidgetI) {
        let dim = self[w].rect.dim;
        if let Kind::Leaf(content) = &mut self[w].kind {
            content.on_resize(dim);
            return;
        }
        self.lay_out(w);
    }

    /// Mark `w` and its ancestors as needing a relayout on the next [`Ui::resize`], dropping their render caches.
    ///
    /// Stops at the first ancestor that is already marked.
    pub fn set_relayout_needed(&mut self, w: WidgetI) {
        let mut current = Some(w);
        while let Some(i) = current {
            if self[i].relayout_needed {
                return;
            }
            self[i].relayout_needed = true;
            self.drop_cache(i);
            current = self[i].parent;
        }
    }

    /// Drop the render cache of `w` and of every ancestor, since their cached images contain it.
    pub fn clear_cache(&mut self, w: WidgetI) {
        let mut current = Some(w);
        while let Some(i) = current {
            self.drop_cache(i);
            current = self[i].parent;
        }
    }

    pub(crate) fn drop_cache(&mut self, w: WidgetI) {
        if let Some(texture) = self[w].cache.take() {
            self.released_textures.push(texture);
        }
    }

    /// Swap the layout params of `w`, returning the old ones.
    pub fn reset_layout_params(&mut self, w: WidgetI, params: LayoutParams) -> LayoutParams {
        let old = std::mem::replace(&mut self[w].layout_params, params);
        self.set_relayout_needed(w);
        return old;
    }

    /// The size `container` gives to `child` under `params`.
    ///
    /// `Max` takes the container's own size on that axis, `Min` asks the child for its minimum.
    pub fn dim_for_widget(&self, container: WidgetI, child: WidgetI, params: &LayoutParams) -> Vec2 {
        let own = self[container].rect.dim;
        let mut quotum = Vec2::ZERO;
        for axis in [X, Y] {
            quotum[axis.i()] = match params.dim[axis] {
                Dim::Length(length) => length,
                Dim::Min => -1.0,
                Dim::Max => own[axis.i()],
            };
        }
        return self.measure(child, quotum);
    }

    /// The minimum size of `child` under its own layout params, ignoring `Max`.
    pub fn min_dim_for_widget(&self, child: WidgetI) -> Vec2 {
        let params = &self[child].layout_params;
        let mut quotum = Vec2::ZERO;
        for axis in [X, Y] {
            quotum[axis.i()] = match params.dim[axis] {
                Dim::Length(length) => length,
                Dim::Min | Dim::Max => -1.0,
            };
        }
        return self.measure(child, quotum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counting {
        resizes: Rc<Cell<u32>>,
        min: Vec2,
    }
    impl Content for Counting {
        fn measure(&self, quotum: Vec2) -> Vec2 {
            return Vec2::select(quotum.cmplt(Vec2::ZERO), self.min, quotum);
        }
        fn on_resize(&mut self, _dim: Vec2) {
            self.resizes.set(self.resizes.get() + 1);
        }
    }

    fn counting_leaf(ui: &mut Ui) -> (WidgetI, Rc<Cell<u32>>) {
        let resizes = Rc::new(Cell::new(0));
        let leaf = ui.insert(Widget::leaf(Counting {
            resizes: resizes.clone(),
            min: Vec2::new(7.0, 3.0),
        }));
        return (leaf, resizes);
    }

    #[test]
    fn test_resize_clamps_and_calls_on_resize() {
        let mut ui = Ui::new();
        let (leaf, resizes) = counting_leaf(&mut ui);

        ui.resize(leaf, Vec2::new(-5.0, 10.0));
        assert_eq!(ui[leaf].rect().dim, Vec2::new(0.0, 10.0));
        assert_eq!(resizes.get(), 1);
    }

    #[test]
    fn test_resize_same_dim_is_noop() {
        let mut ui = Ui::new();
        let (leaf, resizes) = counting_leaf(&mut ui);
        ui.resize(leaf, Vec2::new(10.0, 10.0));
        ui[leaf].cache = Some(TextureHandle(1));

        ui.resize(leaf, Vec2::new(10.0, 10.0));
        assert_eq!(resizes.get(), 1);
        assert!(ui[leaf].has_render_cache());
        assert!(ui.released_textures.is_empty());
    }

    #[test]
    fn test_resize_same_dim_with_pending_relayout() {
        let mut ui = Ui::new();
        let root = ui.insert(Widget::container(AbsoluteLayout));
        let (leaf, _) = counting_leaf(&mut ui);
        ui.add(root, leaf).unwrap();
        ui.resize(root, Vec2::new(50.0, 50.0));
        assert!(ui[root].is_relayout_needed() == false);

        ui.move_to(leaf, Vec2::new(1.0, 2.0));
        ui.reset_layout_params(leaf, LayoutParams { dim: Xy::new(Dim::Length(20.0), Dim::Max), weight: 0.0 });
        assert!(ui[root].is_relayout_needed());

        ui.resize(root, Vec2::new(50.0, 50.0));
        assert!(ui[root].is_relayout_needed() == false);
        assert_eq!(ui[leaf].rect(), Rect::new(Vec2::new(1.0, 2.0), Vec2::new(20.0, 50.0)));
    }

    #[test]
    fn test_set_relayout_needed_propagates_once() {
        let mut ui = Ui::new();
        let root = ui.insert(Widget::container(AbsoluteLayout));
        let middle = ui.insert(Widget::container(AbsoluteLayout));
        let leaf = ui.insert(Widget::plain());
        ui.add(root, middle).unwrap();
        ui.add(middle, leaf).unwrap();
        ui.resize(root, Vec2::new(10.0, 10.0));
        ui.resize(middle, Vec2::new(5.0, 5.0));
        for w in [root, middle, leaf] {
            assert!(ui[w].is_relayout_needed() == false);
            ui[w].cache = Some(TextureHandle(w.as_usize() as u64));
        }

        ui.set_relayout_needed(leaf);
        let once: Vec<bool> = [root, middle, leaf].iter().map(|&w| ui[w].is_relayout_needed()).collect();
        let released_once = ui.released_textures.len();

        ui.set_relayout_needed(leaf);
        let twice: Vec<bool> = [root, middle, leaf].iter().map(|&w| ui[w].is_relayout_needed()).collect();

        assert_eq!(once, vec![true, true, true]);
        assert_eq!(once, twice);
        assert_eq!(released_once, 3);
        assert_eq!(ui.released_textures.len(), released_once);
    }

    #[test]
    fn test_set_relayout_needed_stops_at_dirty_ancestor() {
        let mut ui = Ui::new();
        let root = ui.insert(Widget::container(AbsoluteLayout));
        let middle = ui.insert(Widget::container(AbsoluteLayout));
        let leaf = ui.insert(Widget::plain());
        ui.add(root, middle).unwrap();
        ui.add(middle, leaf).unwrap();
        ui.resize(root, Vec2::new(10.0, 10.0));

        // middle is already dirty from the add, so the root keeps its cache
        ui[middle].relayout_needed = true;
        ui[root].relayout_needed = false;
        ui[root].cache = Some(TextureHandle(9));
        ui.set_relayout_needed(leaf);
        assert!(ui[root].has_render_cache());
        assert!(ui[root].is_relayout_needed() == false);
    }

    #[test]
    fn test_clear_cache_reaches_root() {
        let mut ui = Ui::new();
        let root = ui.insert(Widget::container(AbsoluteLayout));
        let middle = ui.insert(Widget::container(AbsoluteLayout));
        let leaf = ui.insert(Widget::plain());
        let sibling = ui.insert(Widget::plain());
        ui.add(root, middle).unwrap();
        ui.add(middle, leaf).unwrap();
        ui.add(root, sibling).unwrap();
        for w in [root, middle, leaf, sibling] {
            ui[w].cache = Some(TextureHandle(w.as_usize() as u64));
        }

        ui.clear_cache(middle);
        assert!(ui[root].has_render_cache() == false);
        assert!(ui[middle].has_render_cache() == false);
        // invalidation flows upwards only
        assert!(ui[leaf].has_render_cache());
        assert!(ui[sibling].has_render_cache());
    }

    #[test]
    fn test_measure() {
        let mut ui = Ui::new();
        let plain = ui.insert(Widget::plain());
        assert_eq!(ui.measure(plain, Vec2::new(-1.0, 4.0)), Vec2::new(0.0, 4.0));

        let root = ui.insert(Widget::container(AbsoluteLayout));
        let (leaf, _) = counting_leaf(&mut ui);
        ui.add(root, leaf).unwrap();
        ui.move_to(leaf, Vec2::new(10.0, 1.0));
        assert_eq!(ui.measure(root, Vec2::new(-1.0, 100.0)), Vec2::new(17.0, 100.0));
        assert_eq!(ui.measure(root, Vec2::new(-1.0, -1.0)), Vec2::new(17.0, 4.0));
    }

    #[test]
    fn test_dim_for_widget() {
        let mut ui = Ui::new();
        let root = ui.insert(Widget::container(AbsoluteLayout).with_rect(Vec2::ZERO, Vec2::new(80.0, 60.0)));
        let (leaf, _) = counting_leaf(&mut ui);
        let params = LayoutParams { dim: Xy::new(Dim::Max, Dim::Min), weight: 0.0 };
        assert_eq!(ui.dim_for_widget(root, leaf, &params), Vec2::new(80.0, 3.0));
        let params = LayoutParams { dim: Xy::new(Dim::Length(12.0), Dim::Max), weight: 0.0 };
        assert_eq!(ui.dim_for_widget(root, leaf, &params), Vec2::new(12.0, 60.0));
    }

    #[test]
    fn test_layout_params_from_desc() {
        let layout = Desc::parse_one("layout{ dimX{max} dimY{25} weight{2} }").unwrap();
        let params = LayoutParams::from_desc(Some(&layout)).unwrap();
        assert_eq!(params.dim, Xy::new(Dim::Max, Dim::Length(25.0)));
        assert_eq!(params.weight, 2.0);

        assert_eq!(LayoutParams::from_desc(None).unwrap(), LayoutParams::DEFAULT);

        let layout = Desc::parse_one("layout{ dimX{wide} }").unwrap();
        assert!(matches!(LayoutParams::from_desc(Some(&layout)), Err(Error::InvalidProperty { .. })));
    }
}
