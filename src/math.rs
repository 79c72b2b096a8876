use glam::{IVec2, Mat4, Vec2, Vec3};
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}
impl Axis {
    pub fn other(&self) -> Self {
        match self {
            Axis::X => return Axis::Y,
            Axis::Y => return Axis::X,
        }
    }

    /// The axis along which a list or a linear layout stacks its children.
    pub fn main(is_vertical: bool) -> Self {
        if is_vertical {
            return Axis::Y;
        } else {
            return Axis::X;
        }
    }

    /// Component index into glam vectors.
    pub const fn i(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }
}

/// A pair of values, one per axis.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Xy<T> {
    pub x: T,
    pub y: T,
}

impl<T: Copy> Xy<T> {
    pub const fn new(x: T, y: T) -> Self {
        return Self { x, y };
    }

    pub const fn new_symm(v: T) -> Self {
        return Self { x: v, y: v };
    }
}

impl<T> Index<Axis> for Xy<T> {
    type Output = T;
    fn index(&self, axis: Axis) -> &Self::Output {
        match axis {
            Axis::X => return &self.x,
            Axis::Y => return &self.y,
        }
    }
}
impl<T> IndexMut<Axis> for Xy<T> {
    fn index_mut(&mut self, axis: Axis) -> &mut Self::Output {
        match axis {
            Axis::X => return &mut self.x,
            Axis::Y => return &mut self.y,
        }
    }
}

/// A widget rectangle: `pos` is the bottom-left corner in the parent's space (y grows upwards), `dim` is the size.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Rect {
    pub pos: Vec2,
    pub dim: Vec2,
}
impl Rect {
    pub const ZERO: Rect = Rect::new(Vec2::ZERO, Vec2::ZERO);

    pub const fn new(pos: Vec2, dim: Vec2) -> Self {
        return Self { pos, dim };
    }

    pub fn right(&self) -> f32 {
        return self.pos.x + self.dim.x;
    }

    pub fn top(&self) -> f32 {
        return self.pos.y + self.dim.y;
    }

    pub fn contains(&self, point: Vec2) -> bool {
        return point.x >= self.pos.x
            && point.y >= self.pos.y
            && point.x < self.right()
            && point.y < self.top();
    }
}

/// Integer rectangle in framebuffer pixels, used for viewports and scissor boxes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RectI {
    pub pos: IVec2,
    pub dim: IVec2,
}
impl RectI {
    pub const fn new(pos: IVec2, dim: IVec2) -> Self {
        return Self { pos, dim };
    }

    pub fn right(&self) -> i32 {
        return self.pos.x + self.dim.x;
    }

    pub fn top(&self) -> i32 {
        return self.pos.y + self.dim.y;
    }

    /// The overlapping part of the two rectangles. Disjoint rectangles give a zero-sized result.
    pub fn intersect(&self, other: &RectI) -> RectI {
        let pos = self.pos.max(other.pos);
        let end = IVec2::new(self.right(), self.top()).min(IVec2::new(other.right(), other.top()));
        return RectI::new(pos, (end - pos).max(IVec2::ZERO));
    }
}

pub(crate) fn translated(matrix: &Mat4, offset: Vec2) -> Mat4 {
    return *matrix * Mat4::from_translation(offset.extend(0.0));
}

pub(crate) fn scaled(matrix: &Mat4, dim: Vec2) -> Mat4 {
    return *matrix * Mat4::from_scale(Vec3::new(dim.x, dim.y, 1.0));
}
