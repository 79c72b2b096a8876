use glam::{Mat4, Vec2};

use crate::*;

/// What a leaf widget shows, and how big it wants to be.
pub trait Content {
    /// The size wanted within `quotum`. Negative components of `quotum` ask for the minimum size on that axis.
    fn measure(&self, quotum: Vec2) -> Vec2 {
        return quotum.max(Vec2::ZERO);
    }

    fn on_resize(&mut self, dim: Vec2) {
        let _ = dim;
    }

    /// Draw into `backend`. `matrix` maps the widget's own pixel space, with the origin at its bottom-left corner, to clip space.
    fn render(&self, backend: &mut dyn RenderBackend, matrix: &Mat4, dim: Vec2) {
        let _ = (backend, matrix, dim);
    }
}

/// A leaf content type that can be built by the [`Inflater`] from a description.
pub trait Inflatable: Content + Sized + 'static {
    fn from_desc(desc: &Desc) -> Result<Self>;
}

/// A plain colored rectangle.
///
/// ```text
/// ColorBox{ color{ff0000} minDimX{10} minDimY{10} }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorBox {
    pub color: Color,
    pub min_dim: Vec2,
}

impl ColorBox {
    pub const fn new(color: Color) -> Self {
        return ColorBox {
            color,
            min_dim: Vec2::ZERO,
        };
    }
}

impl Content for ColorBox {
    fn measure(&self, quotum: Vec2) -> Vec2 {
        return Vec2::select(quotum.cmplt(Vec2::ZERO), self.min_dim, quotum);
    }

    fn render(&self, backend: &mut dyn RenderBackend, matrix: &Mat4, dim: Vec2) {
        backend.draw_rect(&scaled(matrix, dim), self.color);
    }
}

impl Inflatable for ColorBox {
    fn from_desc(desc: &Desc) -> Result<Self> {
        let Some(value) = desc.property_value("color") else {
            return Err(Error::MissingProperty {
                widget: desc.value.clone(),
                property: "color".to_string(),
            });
        };
        let color = Color::from_hex(value.as_str())
            .ok_or_else(|| invalid_property(&desc.value, "color", value))?;

        let mut min_dim = Vec2::ZERO;
        for (property, axis) in [("minDimX", Axis::X), ("minDimY", Axis::Y)] {
            if let Some(value) = desc.property_value(property) {
                let v = value
                    .as_f32()
                    .ok_or_else(|| invalid_property(&desc.value, property, value))?;
                min_dim[axis.i()] = v.max(0.0);
            }
        }

        return Ok(ColorBox { color, min_dim });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_box_from_desc() {
        let desc = Desc::parse_one("ColorBox{ color{00ff00} minDimY{12} }").unwrap();
        let color_box = ColorBox::from_desc(&desc).unwrap();
        assert_eq!(color_box.color, Color::GREEN);
        assert_eq!(color_box.measure(Vec2::new(30.0, -1.0)), Vec2::new(30.0, 12.0));
        assert_eq!(color_box.measure(Vec2::new(-1.0, -1.0)), Vec2::new(0.0, 12.0));
    }

    #[test]
    fn test_color_box_errors() {
        let missing = ColorBox::from_desc(&Desc::new("ColorBox"));
        assert_eq!(
            missing,
            Err(Error::MissingProperty {
                widget: "ColorBox".to_string(),
                property: "color".to_string(),
            })
        );

        let bad = ColorBox::from_desc(&Desc::new("ColorBox").prop("color", "red"));
        assert!(matches!(bad, Err(Error::InvalidProperty { .. })));
    }
}
