use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;

use crate::*;

/// Builds a widget from a description node. Container factories inflate their child nodes through the `&Inflater` they receive.
pub type Factory = Rc<dyn Fn(&Inflater, &mut Ui, &Desc) -> Result<WidgetI>>;

/// Turns descriptions into widget trees, looking up each node's name in a registry of factories.
///
/// `Inflater` is a cheap handle: clones share the same registry.
/// Types should be registered during setup, before the inflater is handed to lists that inflate items lazily.
#[derive(Clone)]
pub struct Inflater {
    registry: Rc<RefCell<AHashMap<String, Factory>>>,
}

impl Default for Inflater {
    fn default() -> Self {
        Inflater::new()
    }
}

impl Inflater {
    /// An inflater with the built-in widget types registered.
    pub fn new() -> Self {
        let inflater = Inflater {
            registry: Rc::new(RefCell::new(AHashMap::with_capacity(16))),
        };

        inflater.register("Widget", |_, ui, desc| {
            let widget = Widget::plain().configure(desc)?;
            return Ok(ui.insert(widget));
        });
        inflater.register("Container", |inflater, ui, desc| {
            return inflater.inflate_container(ui, desc, AbsoluteLayout);
        });
        inflater.register("VerticalContainer", |inflater, ui, desc| {
            return inflater.inflate_container(ui, desc, LinearLayout::vertical());
        });
        inflater.register("HorizontalContainer", |inflater, ui, desc| {
            return inflater.inflate_container(ui, desc, LinearLayout::horizontal());
        });
        inflater.register("LinearContainer", |inflater, ui, desc| {
            return inflater.inflate_container(ui, desc, LinearLayout::from_desc(desc));
        });
        inflater.register("VerticalList", |inflater, ui, desc| {
            return inflater.inflate_list(ui, desc, Widget::vertical_list());
        });
        inflater.register("HorizontalList", |inflater, ui, desc| {
            return inflater.inflate_list(ui, desc, Widget::horizontal_list());
        });
        inflater.register_widget_type::<ColorBox>("ColorBox");

        return inflater;
    }

    /// Register `factory` under `name`. An existing entry with the same name is replaced.
    pub fn register(
        &self,
        name: impl Into<String>,
        factory: impl Fn(&Inflater, &mut Ui, &Desc) -> Result<WidgetI> + 'static,
    ) {
        let name = name.into();
        let factory: Factory = Rc::new(factory);
        if self.registry.borrow_mut().insert(name.clone(), factory).is_some() {
            log::warn!("Inflater: widget type \"{name}\" was already registered, replacing it");
        }
    }

    /// Register a leaf widget type whose content is built with [`Inflatable::from_desc`].
    pub fn register_widget_type<T: Inflatable>(&self, name: &str) {
        self.register(name, |_, ui, desc| {
            let content = T::from_desc(desc)?;
            let widget = Widget::leaf(content).configure(desc)?;
            return Ok(ui.insert(widget));
        });
    }

    /// Returns false if nothing was registered under `name`.
    pub fn unregister(&self, name: &str) -> bool {
        return self.registry.borrow_mut().remove(name).is_some();
    }

    pub fn is_registered(&self, name: &str) -> bool {
        return self.registry.borrow().contains_key(name);
    }

    /// Build the widget tree described by `desc`. The root comes back detached, owned by the caller.
    ///
    /// On error, every widget created so far is destroyed.
    pub fn inflate(&self, ui: &mut Ui, desc: &Desc) -> Result<WidgetI> {
        // clone the factory out, so that it can register types or inflate recursively
        let factory = self.registry.borrow().get(desc.as_str()).cloned();
        let Some(factory) = factory else {
            return Err(Error::UnknownWidgetType {
                name: desc.value.clone(),
            });
        };
        return factory(self, ui, desc);
    }

    /// Parse `text` as a single description node and inflate it.
    pub fn inflate_str(&self, ui: &mut Ui, text: &str) -> Result<WidgetI> {
        let desc = Desc::parse_one(text)?;
        return self.inflate(ui, &desc);
    }

    /// Check that every widget node in `desc` has a registered type, without building anything.
    pub fn validate(&self, desc: &Desc) -> Result<()> {
        if !self.is_registered(desc.as_str()) {
            return Err(Error::UnknownWidgetType {
                name: desc.value.clone(),
            });
        }
        for child in desc.widgets() {
            self.validate(child)?;
        }
        return Ok(());
    }

    /// Inflate the widget nodes of `desc` and add them to `container`, in order.
    pub fn inflate_children(&self, ui: &mut Ui, container: WidgetI, desc: &Desc) -> Result<()> {
        for child_desc in desc.widgets() {
            let child = self.inflate(ui, child_desc)?;
            if let Err(err) = ui.add(container, child) {
                ui.destroy(child);
                return Err(err);
            }
        }
        return Ok(());
    }

    fn inflate_container(&self, ui: &mut Ui, desc: &Desc, layout: impl Layout + 'static) -> Result<WidgetI> {
        let widget = Widget::container(layout).configure(desc)?;
        let container = ui.insert(widget);
        if let Err(err) = self.inflate_children(ui, container, desc) {
            ui.destroy(container);
            return Err(err);
        }
        return Ok(container);
    }

    fn inflate_list(&self, ui: &mut Ui, desc: &Desc, list: Widget) -> Result<WidgetI> {
        let list = list.configure(desc)?;

        // items are inflated lazily, so check their types now
        let items: Vec<Desc> = desc.widgets().cloned().collect();
        for item in &items {
            self.validate(item)?;
        }

        let list = ui.insert(list);
        if !items.is_empty() {
            let provider = StaticProvider::new(self.clone(), items);
            ui.set_items_provider(list, Some(Box::new(provider)));
        }
        return Ok(list);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_inflate_tree() {
        let mut ui = Ui::new();
        let inflater = Inflater::new();
        let root = inflater
            .inflate_str(
                &mut ui,
                "VerticalContainer{
                    dimX{100} dimY{100} name{root}
                    ColorBox{ name{header} color{ff0000} layout{ dimX{max} dimY{20} } }
                    Container{ name{body} layout{ dimX{max} dimY{max} weight{1} } }
                }",
            )
            .unwrap();

        let header = ui.find_by_name(root, "header").unwrap();
        let body = ui.find_by_name(root, "body").unwrap();
        assert_eq!(ui.children(root), &[header, body]);
        assert_eq!(ui.parent(header), Some(root));
        assert!(ui[body].is_container());

        ui.resize(root, Vec2::new(100.0, 100.0));
        assert_eq!(ui[header].rect(), Rect::new(Vec2::new(0.0, 80.0), Vec2::new(100.0, 20.0)));
        assert_eq!(ui[body].rect(), Rect::new(Vec2::new(0.0, 0.0), Vec2::new(100.0, 80.0)));
    }

    #[test]
    fn test_unknown_type() {
        let mut ui = Ui::new();
        let inflater = Inflater::new();
        assert_eq!(
            inflater.inflate_str(&mut ui, "Nope{}"),
            Err(Error::UnknownWidgetType {
                name: "Nope".to_string()
            })
        );

        // no partial tree is left behind
        let nested = "VerticalContainer{ Widget{} Container{ Widget{} Nope{} } }";
        assert!(matches!(
            inflater.inflate_str(&mut ui, nested),
            Err(Error::UnknownWidgetType { .. })
        ));
        assert!(ui.is_empty());
    }

    #[test]
    fn test_configuration_errors() {
        let mut ui = Ui::new();
        let inflater = Inflater::new();
        let missing = "Container{ ColorBox{ layout{ dimX{max} } } }";
        assert!(matches!(
            inflater.inflate_str(&mut ui, missing),
            Err(Error::MissingProperty { .. })
        ));
        let bad_layout = "Container{ Widget{ layout{ dimY{tall} } } }";
        assert!(matches!(
            inflater.inflate_str(&mut ui, bad_layout),
            Err(Error::InvalidProperty { .. })
        ));
        assert!(matches!(inflater.inflate_str(&mut ui, "Container{"), Err(Error::Parse { .. })));
        assert!(ui.is_empty());
    }

    struct Dot;
    impl Content for Dot {}
    impl Inflatable for Dot {
        fn from_desc(_desc: &Desc) -> Result<Self> {
            return Ok(Dot);
        }
    }

    #[test]
    fn test_register_and_unregister() {
        let mut ui = Ui::new();
        let inflater = Inflater::new();

        inflater.register_widget_type::<Dot>("Dot");
        let dot = inflater.inflate_str(&mut ui, "Dot{ posX{3} }").unwrap();
        assert_eq!(ui[dot].rect().pos, Vec2::new(3.0, 0.0));

        assert!(inflater.unregister("Dot"));
        assert!(inflater.unregister("Dot") == false);
        assert!(inflater.inflate_str(&mut ui, "Dot{}").is_err());
    }

    #[test]
    fn test_reregistering_replaces() {
        let mut ui = Ui::new();
        let inflater = Inflater::new();
        inflater.register("Widget", |_, ui, _| {
            return Ok(ui.insert(Widget::plain().with_name("replaced")));
        });

        // clones share the registry
        let other = inflater.clone();
        let w = other.inflate_str(&mut ui, "Widget{}").unwrap();
        assert_eq!(ui[w].name(), Some("replaced"));
    }

    #[test]
    fn test_list_from_description() {
        let mut ui = Ui::new();
        let inflater = Inflater::new();
        let list = inflater
            .inflate_str(
                &mut ui,
                "VerticalList{
                    dimX{50} dimY{40}
                    ColorBox{ name{0} color{ff0000} layout{ dimX{max} dimY{20} } }
                    ColorBox{ name{1} color{00ff00} layout{ dimX{max} dimY{20} } }
                    ColorBox{ name{2} color{0000ff} layout{ dimX{max} dimY{20} } }
                }",
            )
            .unwrap();

        assert!(ui[list].is_list());
        assert_eq!(ui.visible_count(list), 2);
        let names: Vec<&str> = ui.children(list).iter().map(|&w| ui[w].name().unwrap()).collect();
        assert_eq!(names, vec!["0", "1"]);

        ui.set_scroll_pos_as_factor(list, 1.0);
        let names: Vec<&str> = ui.children(list).iter().map(|&w| ui[w].name().unwrap()).collect();
        assert_eq!(names, vec!["1", "2"]);

        let bad_item = "VerticalList{ ColorBox{ color{ff0000} } Nope{} }";
        assert!(matches!(
            inflater.inflate_str(&mut ui, bad_item),
            Err(Error::UnknownWidgetType { .. })
        ));
    }
}
