//! Trellis is a retained-mode widget toolkit core: a widget tree, container layouts, virtualized lists, and a render pass that caches and clips subtrees.
//!
//! It doesn't open windows or talk to the GPU. Drawing goes through the [`RenderBackend`] trait, and input comes in through [`Ui::on_mouse_button`], [`Ui::on_mouse_move`] and [`Ui::on_key`].
//!
//! ## Example
//!
//! ```rust
//! # use trellis::*;
//! # use glam::{UVec2, Vec2};
//! let mut ui = Ui::new();
//! let inflater = Inflater::new();
//!
//! let list = inflater.inflate_str(&mut ui, "
//!     VerticalList{
//!         dimX{50} dimY{40}
//!         ColorBox{ name{0} color{ff0000} layout{ dimX{max} dimY{20} } }
//!         ColorBox{ name{1} color{00ff00} layout{ dimX{max} dimY{20} } }
//!         ColorBox{ name{2} color{0000ff} layout{ dimX{max} dimY{20} } }
//!     }
//! ").unwrap();
//!
//! // only the items that fit are built
//! assert_eq!(ui.visible_count(list), 2);
//!
//! ui.set_scroll_pos_as_factor(list, 1.0);
//! assert_eq!(ui[ui.children(list)[0]].name(), Some("1"));
//!
//! let mut draw_list = DrawList::new(UVec2::new(50, 40));
//! ui.render(list, &mut draw_list, &DrawList::pixel_matrix(Vec2::new(50.0, 40.0)));
//! assert_eq!(draw_list.rects().len(), 2);
//! ```
//!
//! ## Descriptions
//!
//! Widget trees can be built by hand with [`Ui::insert`] and [`Ui::add`], or from a text description with an [`Inflater`].
//! A description node is a name followed by braces. Nodes that start with an uppercase letter are widgets, the others are properties.
//!
//! ```text
//! VerticalContainer{
//!     dimX{200} dimY{100}
//!     ColorBox{ color{336699} layout{ dimX{max} dimY{20} } }
//!     HorizontalList{ name{strip} layout{ dimX{max} dimY{max} weight{1} } }
//! }
//! ```
//!
//! New widget types are added with [`Inflater::register`] or [`Inflater::register_widget_type`].
//!
//! ## Coordinates
//!
//! Positions are relative to the parent, in pixels, with the y axis pointing up. Vertical layouts and lists start at the top edge and go down.

mod math;
pub use math::*;

mod error;
pub use error::*;

mod desc;
pub use desc::*;

mod color;
pub use color::*;

mod widget;
pub use widget::*;

mod ui;
pub use ui::*;

mod tree;

mod layout;
pub use layout::*;

mod linear;
pub use linear::*;

mod list;
pub use list::*;

mod content;
pub use content::*;

mod inflater;
pub use inflater::*;

mod render;
pub use render::*;

mod interact;
pub use interact::*;
