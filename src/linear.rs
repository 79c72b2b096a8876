use glam::Vec2;

use crate::*;

/// Stacks children along one axis, top to bottom or left to right, centering them on the other axis.
///
/// Children first get their fixed or minimum size along the main axis. Whatever space is left is then shared among them in proportion to their `weight`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearLayout {
    pub is_vertical: bool,
}

impl LinearLayout {
    pub const fn vertical() -> Self {
        return LinearLayout { is_vertical: true };
    }

    pub const fn horizontal() -> Self {
        return LinearLayout { is_vertical: false };
    }

    /// Reads `orientation{horizontal}`. Anything else, or nothing, means vertical.
    pub fn from_desc(desc: &Desc) -> Self {
        let horizontal = desc
            .property_value("orientation")
            .is_some_and(|o| o.as_str() == "horizontal");
        return LinearLayout { is_vertical: !horizontal };
    }

    fn main(&self) -> Axis {
        return Axis::main(self.is_vertical);
    }
}

impl Default for LinearLayout {
    fn default() -> Self {
        LinearLayout::vertical()
    }
}

impl Layout for LinearLayout {
    fn compute_min_dim(&self, ui: &Ui, container: WidgetI) -> Vec2 {
        let main = self.main().i();
        let cross = self.main().other().i();

        let mut min_dim = Vec2::ZERO;
        for &child in &ui[container].children {
            let child_min = ui.min_dim_for_widget(child);
            min_dim[main] += child_min[main];
            min_dim[cross] = min_dim[cross].max(child_min[cross]);
        }
        return min_dim;
    }

    fn arrange_widgets(&self, ui: &mut Ui, container: WidgetI) {
        let main = self.main();
        let cross = main.other();
        let own = ui[container].rect.dim;
        let children = ui[container].children.clone();

        let mut weights = Vec::with_capacity(children.len());
        let mut net_weight = 0.0;
        for &child in &children {
            let weight = ui[child].layout_params.weight.max(0.0);
            weights.push(weight);
            net_weight += weight;
        }

        // fixed sizes first: Max on the main axis would swallow everything, so it counts as Min here
        let mut dims = Vec::with_capacity(children.len());
        let mut fixed = 0.0;
        for &child in &children {
            let params = ui[child].layout_params;
            let mut quotum = Vec2::ZERO;
            quotum[main.i()] = match params.dim[main] {
                Dim::Length(length) => length,
                Dim::Min | Dim::Max => -1.0,
            };
            quotum[cross.i()] = match params.dim[cross] {
                Dim::Length(length) => length,
                Dim::Min => -1.0,
                Dim::Max => own[cross.i()],
            };
            let dim = ui.measure(child, quotum);
            fixed += dim[main.i()];
            dims.push(dim);
        }

        let free = (own[main.i()] - fixed).max(0.0);
        if net_weight > 0.0 {
            for (dim, weight) in dims.iter_mut().zip(&weights) {
                dim[main.i()] += free * weight / net_weight;
            }
        }

        let mut cursor = if self.is_vertical { own.y } else { 0.0 };
        for (&child, &dim) in children.iter().zip(&dims) {
            ui.resize(child, dim);
            let dim = ui[child].rect.dim;

            let mut pos = Vec2::ZERO;
            pos[cross.i()] = ((own[cross.i()] - dim[cross.i()]) / 2.0).round();
            if self.is_vertical {
                cursor -= dim.y;
                pos.y = cursor;
            } else {
                pos.x = cursor;
                cursor += dim.x;
            }
            ui.move_to(child, pos);
        }

        log::trace!("linear layout: {} children, free space {free}", children.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(ui: &mut Ui, parent: WidgetI, layout: &str) -> WidgetI {
        let layout = Desc::parse_one(layout).unwrap();
        let w = ui.insert(Widget::plain().with_layout(layout));
        ui.add(parent, w).unwrap();
        return w;
    }

    #[test]
    fn test_vertical_weights() {
        let mut ui = Ui::new();
        let root = ui.insert(Widget::container(LinearLayout::vertical()));
        let a = child(&mut ui, root, "layout{ dimX{max} dimY{20} }");
        let b = child(&mut ui, root, "layout{ dimX{50} weight{1} }");
        let c = child(&mut ui, root, "layout{ dimY{10} weight{3} }");

        ui.resize(root, Vec2::new(100.0, 100.0));

        assert_eq!(ui[a].rect(), Rect::new(Vec2::new(0.0, 80.0), Vec2::new(100.0, 20.0)));
        assert_eq!(ui[b].rect(), Rect::new(Vec2::new(25.0, 62.5), Vec2::new(50.0, 17.5)));
        assert_eq!(ui[c].rect(), Rect::new(Vec2::new(50.0, 0.0), Vec2::new(0.0, 62.5)));
    }

    #[test]
    fn test_horizontal_stacking() {
        let mut ui = Ui::new();
        let desc = Desc::new("LinearContainer").prop("orientation", "horizontal");
        let root = ui.insert(Widget::container(LinearLayout::from_desc(&desc)));
        let a = child(&mut ui, root, "layout{ dimX{30} dimY{10} }");
        let b = child(&mut ui, root, "layout{ dimX{20} dimY{max} }");

        ui.resize(root, Vec2::new(100.0, 40.0));

        assert_eq!(ui[a].rect(), Rect::new(Vec2::new(0.0, 15.0), Vec2::new(30.0, 10.0)));
        assert_eq!(ui[b].rect(), Rect::new(Vec2::new(30.0, 0.0), Vec2::new(20.0, 40.0)));
    }

    #[test]
    fn test_no_leftover_when_overfull() {
        let mut ui = Ui::new();
        let root = ui.insert(Widget::container(LinearLayout::vertical()));
        let a = child(&mut ui, root, "layout{ dimY{80} }");
        let b = child(&mut ui, root, "layout{ dimY{40} weight{1} }");

        ui.resize(root, Vec2::new(10.0, 100.0));
        assert_eq!(ui[a].rect().dim.y, 80.0);
        assert_eq!(ui[b].rect().dim.y, 40.0);
        assert_eq!(ui[b].rect().pos.y, -20.0);
    }

    #[test]
    fn test_min_dim_is_additive() {
        let mut ui = Ui::new();
        let root = ui.insert(Widget::container(LinearLayout::vertical()));
        child(&mut ui, root, "layout{ dimX{max} dimY{20} }");
        child(&mut ui, root, "layout{ dimX{50} weight{1} }");
        child(&mut ui, root, "layout{ dimY{10} }");

        assert_eq!(ui.measure(root, Vec2::new(-1.0, -1.0)), Vec2::new(50.0, 30.0));
        assert_eq!(LinearLayout::from_desc(&Desc::new("LinearContainer")), LinearLayout::vertical());
    }
}
