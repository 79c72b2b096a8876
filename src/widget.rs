use std::rc::Rc;

use glam::Vec2;

use crate::*;

/// An index for widgets in the [`Ui`] arena.
///
/// This has the same guarantees as a slab key: after the widget is destroyed, a stale `WidgetI` can point to an unrelated widget that took its slot, or to nothing, in which case indexing the `Ui` with it panics.
///
/// A `WidgetI` is also how ownership of a detached widget is expressed: whoever holds the index of a widget without a parent is responsible for adding it somewhere or calling [`Ui::destroy`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct WidgetI(usize);

impl WidgetI {
    pub(crate) const fn from(value: usize) -> Self {
        WidgetI(value)
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WidgetFlags: u8 {
        const VISIBLE = 1 << 0;
        const ENABLED = 1 << 1;
        /// Clip rendering of the widget and its subtree to its rectangle.
        const CLIP    = 1 << 2;
        /// Render the subtree once into an offscreen texture and reuse it until invalidated.
        const CACHE   = 1 << 3;

        const DEFAULT = Self::VISIBLE.bits() | Self::ENABLED.bits();
    }
}

impl Default for WidgetFlags {
    fn default() -> Self {
        WidgetFlags::DEFAULT
    }
}

pub(crate) enum Kind {
    Plain,
    Leaf(Box<dyn Content>),
    Container(Rc<dyn Layout>),
    // None only while the list algorithm holds the state.
    List(Option<Box<ListState>>),
}

pub struct Widget {
    pub(crate) rect: Rect,
    pub(crate) flags: WidgetFlags,
    pub(crate) name: Option<String>,

    // Non-owning: the parent owns us through its `children`.
    pub(crate) parent: Option<WidgetI>,
    pub(crate) children: Vec<WidgetI>,

    pub(crate) relayout_needed: bool,
    pub(crate) cache: Option<TextureHandle>,

    // the raw `layout{}` block, kept until the next parent turns it into layout params.
    pub(crate) layout_desc: Option<Desc>,
    pub(crate) layout_params: LayoutParams,

    pub(crate) kind: Kind,

    pub(crate) handlers: Handlers,
    pub(crate) hovered: bool,
}

impl Widget {
    fn with_kind(kind: Kind) -> Self {
        return Widget {
            rect: Rect::ZERO,
            flags: WidgetFlags::DEFAULT,
            name: None,
            parent: None,
            children: Vec::new(),
            relayout_needed: false,
            cache: None,
            layout_desc: None,
            layout_params: LayoutParams::DEFAULT,
            kind,
            handlers: Handlers::default(),
            hovered: false,
        };
    }

    /// A widget that draws nothing and has no children.
    pub fn plain() -> Self {
        return Widget::with_kind(Kind::Plain);
    }

    pub fn leaf(content: impl Content + 'static) -> Self {
        return Widget::with_kind(Kind::Leaf(Box::new(content)));
    }

    pub fn container(layout: impl Layout + 'static) -> Self {
        return Widget::with_kind(Kind::Container(Rc::new(layout)));
    }

    pub fn vertical_list() -> Self {
        return Widget::with_kind(Kind::List(Some(Box::new(ListState::new(true)))));
    }

    pub fn horizontal_list() -> Self {
        return Widget::with_kind(Kind::List(Some(Box::new(ListState::new(false)))));
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        return self;
    }

    pub fn with_rect(mut self, pos: Vec2, dim: Vec2) -> Self {
        self.rect = Rect::new(pos, dim.max(Vec2::ZERO));
        return self;
    }

    pub fn with_flags(mut self, flags: WidgetFlags) -> Self {
        self.flags = flags;
        return self;
    }

    /// Layout hints for the parent this widget will be added to.
    pub fn with_layout(mut self, layout: Desc) -> Self {
        self.layout_desc = Some(layout);
        return self;
    }

    /// Read the common widget properties (`posX`, `posY`, `dimX`, `dimY`, `name`, `clip`, `cache`, `visible`, `enabled`, `layout`) from `desc`.
    pub fn configure(mut self, desc: &Desc) -> Result<Self> {
        let widget_name = desc.value.as_str();

        let float = |property: &str| -> Result<Option<f32>> {
            let Some(value) = desc.property_value(property) else {
                return Ok(None);
            };
            return value
                .as_f32()
                .map(Some)
                .ok_or_else(|| invalid_property(widget_name, property, value));
        };
        let flag = |property: &str| -> Result<Option<bool>> {
            let Some(value) = desc.property_value(property) else {
                return Ok(None);
            };
            return value
                .as_bool()
                .map(Some)
                .ok_or_else(|| invalid_property(widget_name, property, value));
        };

        let pos = Vec2::new(float("posX")?.unwrap_or(0.0), float("posY")?.unwrap_or(0.0));
        let dim = Vec2::new(float("dimX")?.unwrap_or(0.0), float("dimY")?.unwrap_or(0.0));
        self.rect = Rect::new(pos, dim.max(Vec2::ZERO));

        if let Some(name) = desc.property_value("name") {
            self.name = Some(name.value.clone());
        }

        for (property, bit, default) in [
            ("visible", WidgetFlags::VISIBLE, true),
            ("enabled", WidgetFlags::ENABLED, true),
            ("clip", WidgetFlags::CLIP, false),
            ("cache", WidgetFlags::CACHE, false),
        ] {
            self.flags.set(bit, flag(property)?.unwrap_or(default));
        }

        if let Some(layout) = desc.property("layout") {
            // validate now, so that a broken layout block fails at inflation time
            LayoutParams::from_desc(Some(layout))?;
            self.layout_desc = Some(layout.clone());
        }

        return Ok(self);
    }

    pub fn rect(&self) -> Rect {
        return self.rect;
    }

    pub fn flags(&self) -> WidgetFlags {
        return self.flags;
    }

    pub fn name(&self) -> Option<&str> {
        return self.name.as_deref();
    }

    pub fn parent(&self) -> Option<WidgetI> {
        return self.parent;
    }

    pub fn children(&self) -> &[WidgetI] {
        return &self.children;
    }

    pub fn layout_params(&self) -> &LayoutParams {
        return &self.layout_params;
    }

    pub fn is_visible(&self) -> bool {
        return self.flags.contains(WidgetFlags::VISIBLE);
    }

    pub fn is_enabled(&self) -> bool {
        return self.flags.contains(WidgetFlags::ENABLED);
    }

    pub fn is_relayout_needed(&self) -> bool {
        return self.relayout_needed;
    }

    pub fn has_render_cache(&self) -> bool {
        return self.cache.is_some();
    }

    pub fn is_hovered(&self) -> bool {
        return self.hovered;
    }

    pub fn is_container(&self) -> bool {
        return matches!(self.kind, Kind::Container(_) | Kind::List(_));
    }

    pub fn is_list(&self) -> bool {
        return matches!(self.kind, Kind::List(_));
    }
}

pub(crate) fn invalid_property(widget: &str, property: &str, value: &Desc) -> Error {
    return Error::InvalidProperty {
        widget: widget.to_string(),
        property: property.to_string(),
        value: value.value.clone(),
    };
}
