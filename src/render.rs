use std::ops::{Deref, DerefMut};

use ahash::AHashMap;
use bytemuck::{Pod, Zeroable};
use glam::{IVec2, Mat4, UVec2, Vec2, Vec3, Vec4};

use crate::*;

/// An offscreen render target owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// The drawing operations the widget tree needs from a graphics backend.
///
/// Matrices map the unit square `[0, 1]²` to clip space, so a quad drawn with them covers exactly the widget.
pub trait RenderBackend {
    /// The current viewport, in framebuffer pixels.
    fn viewport(&self) -> RectI;
    fn set_viewport(&mut self, viewport: RectI);

    /// The current scissor box in framebuffer pixels, or `None` if scissoring is disabled.
    fn scissor(&self) -> Option<RectI>;
    fn set_scissor(&mut self, scissor: Option<RectI>);

    /// Redirect drawing into a new offscreen target of size `dim`, until the matching [`RenderBackend::end_offscreen`].
    fn begin_offscreen(&mut self, dim: UVec2);
    fn end_offscreen(&mut self) -> TextureHandle;
    fn release_texture(&mut self, texture: TextureHandle);

    fn draw_texture(&mut self, texture: TextureHandle, matrix: &Mat4);
    fn draw_rect(&mut self, matrix: &Mat4, color: Color);
}

/// Saves the viewport and scissor state of a backend and puts it back when dropped, also when a panic unwinds through it.
pub struct RenderStateGuard<'a, B: ?Sized + RenderBackend> {
    backend: &'a mut B,
    viewport: RectI,
    scissor: Option<RectI>,
}

impl<'a, B: ?Sized + RenderBackend> RenderStateGuard<'a, B> {
    pub fn new(backend: &'a mut B) -> Self {
        let viewport = backend.viewport();
        let scissor = backend.scissor();
        return RenderStateGuard {
            backend,
            viewport,
            scissor,
        };
    }
}

impl<B: ?Sized + RenderBackend> Deref for RenderStateGuard<'_, B> {
    type Target = B;
    fn deref(&self) -> &Self::Target {
        return &*self.backend;
    }
}

impl<B: ?Sized + RenderBackend> DerefMut for RenderStateGuard<'_, B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        return &mut *self.backend;
    }
}

impl<B: ?Sized + RenderBackend> Drop for RenderStateGuard<'_, B> {
    fn drop(&mut self) {
        self.backend.set_scissor(self.scissor);
        self.backend.set_viewport(self.viewport);
    }
}

/// The framebuffer rectangle covered by a widget of size `dim` drawn with `matrix`, where `matrix` maps the widget's pixel space to clip space.
pub fn compute_viewport_rect(viewport: RectI, matrix: &Mat4, dim: Vec2) -> RectI {
    let to_pixels = |p: Vec4| -> Vec2 {
        let ndc = p.truncate().truncate();
        return ((ndc + Vec2::ONE) / 2.0 * viewport.dim.as_vec2() + viewport.pos.as_vec2()).round();
    };
    let a = to_pixels(*matrix * Vec4::new(0.0, 0.0, 0.0, 1.0));
    let b = to_pixels(*matrix * Vec4::new(dim.x, dim.y, 0.0, 1.0));
    let min = a.min(b).as_ivec2();
    let max = a.max(b).as_ivec2();
    return RectI::new(min, max - min);
}

impl Ui {
    /// Draw the tree rooted at `root`. `matrix` maps the root's parent space, in pixels, to clip space.
    ///
    /// Textures of render caches that were invalidated since the last call are released first.
    pub fn render(&mut self, root: WidgetI, backend: &mut dyn RenderBackend, matrix: &Mat4) {
        for texture in self.released_textures.drain(..) {
            backend.release_texture(texture);
        }

        if !self[root].is_visible() {
            return;
        }
        let matrix = translated(matrix, self[root].rect.pos);
        self.render_widget(root, backend, &matrix);
    }

    fn render_widget(&mut self, w: WidgetI, backend: &mut dyn RenderBackend, matrix: &Mat4) {
        let rect = self[w].rect;
        let flags = self[w].flags;

        if flags.contains(WidgetFlags::CACHE) && rect.dim.x > 0.0 && rect.dim.y > 0.0 {
            let texture = match self[w].cache {
                Some(texture) => texture,
                None => {
                    let texture = self.render_to_texture(w, backend);
                    self[w].cache = Some(texture);
                    texture
                }
            };
            backend.draw_texture(texture, &scaled(matrix, rect.dim));
            return;
        }

        if flags.contains(WidgetFlags::CLIP) {
            let clip = compute_viewport_rect(backend.viewport(), matrix, rect.dim);
            let scissor = match backend.scissor() {
                Some(old) => old.intersect(&clip),
                None => clip,
            };

            let mut guard = RenderStateGuard::new(backend);
            guard.set_scissor(Some(scissor));
            self.render_content(w, &mut *guard, matrix);
            return;
        }

        self.render_content(w, backend, matrix);
    }

    fn render_content(&mut self, w: WidgetI, backend: &mut dyn RenderBackend, matrix: &Mat4) {
        if let Kind::Leaf(content) = &self[w].kind {
            content.render(backend, matrix, self[w].rect.dim);
            return;
        }

        for child in self[w].children.clone() {
            if !self[child].is_visible() {
                continue;
            }
            let child_matrix = translated(matrix, self[child].rect.pos);
            self.render_widget(child, backend, &child_matrix);
        }
    }

    fn render_to_texture(&mut self, w: WidgetI, backend: &mut dyn RenderBackend) -> TextureHandle {
        let dim = self[w].rect.dim;
        let pixels = dim.ceil().as_uvec2();

        let mut guard = RenderStateGuard::new(backend);
        guard.set_scissor(None);
        guard.begin_offscreen(pixels);
        guard.set_viewport(RectI::new(IVec2::ZERO, pixels.as_ivec2()));

        // pixel space of the widget to clip space of the texture
        let matrix = Mat4::from_translation(Vec3::new(-1.0, -1.0, 0.0))
            * Mat4::from_scale(Vec3::new(2.0 / dim.x, 2.0 / dim.y, 1.0));
        self.render_content(w, &mut *guard, &matrix);

        let texture = guard.end_offscreen();
        log::trace!("cached {w:?} into {texture:?}");
        return texture;
    }
}

/// A rectangle recorded by [`DrawList`], laid out for direct upload to a GPU vertex buffer.
#[repr(C)]
#[derive(Default, Debug, Pod, Copy, Clone, Zeroable, PartialEq)]
pub struct RenderRect {
    pub min: [f32; 2],     // framebuffer pixels, snapped
    pub max: [f32; 2],
    pub color: Color,
    pub texture: u32,      // only meaningful with TEXTURED
    pub scissor: [i32; 4], // x, y, w, h. only meaningful with SCISSORED
    pub flags: u32,
}

impl RenderRect {
    pub const TEXTURED: u32 = 1 << 0;
    pub const SCISSORED: u32 = 1 << 1;
}

/// A backend that records rectangles instead of drawing them. Useful for tests, and as the source of a vertex buffer for a real renderer.
pub struct DrawList {
    viewport: RectI,
    scissor: Option<RectI>,
    // the screen is layer 0, offscreen targets are pushed on top
    layers: Vec<Vec<RenderRect>>,
    textures: AHashMap<u64, Vec<RenderRect>>,
    last_texture: u64,
    released: Vec<TextureHandle>,
}

impl DrawList {
    pub fn new(size: UVec2) -> Self {
        return DrawList {
            viewport: RectI::new(IVec2::ZERO, size.as_ivec2()),
            scissor: None,
            layers: vec![Vec::new()],
            textures: AHashMap::default(),
            last_texture: 0,
            released: Vec::new(),
        };
    }

    /// A matrix mapping pixels of a window of `size` to clip space, origin at the bottom-left.
    pub fn pixel_matrix(size: Vec2) -> Mat4 {
        return Mat4::from_translation(Vec3::new(-1.0, -1.0, 0.0))
            * Mat4::from_scale(Vec3::new(2.0 / size.x, 2.0 / size.y, 1.0));
    }

    /// Rectangles drawn to the screen.
    pub fn rects(&self) -> &[RenderRect] {
        return &self.layers[0];
    }

    /// Rectangles drawn into an offscreen texture, if it's still alive.
    pub fn texture_rects(&self, texture: TextureHandle) -> Option<&[RenderRect]> {
        return self.textures.get(&texture.0).map(|rects| rects.as_slice());
    }

    pub fn released(&self) -> &[TextureHandle] {
        return &self.released;
    }

    pub fn live_textures(&self) -> usize {
        return self.textures.len();
    }

    pub fn as_bytes(&self) -> &[u8] {
        return bytemuck::cast_slice(self.rects());
    }

    /// Forget the screen rectangles, keeping textures alive.
    pub fn clear(&mut self) {
        self.layers[0].clear();
    }

    fn push(&mut self, matrix: &Mat4, color: Color, texture: Option<TextureHandle>) {
        let to_pixels = |p: Vec4| -> [f32; 2] {
            let ndc = p.truncate().truncate();
            let px = (ndc + Vec2::ONE) / 2.0 * self.viewport.dim.as_vec2() + self.viewport.pos.as_vec2();
            return px.round().to_array();
        };
        let mut rect = RenderRect {
            min: to_pixels(*matrix * Vec4::new(0.0, 0.0, 0.0, 1.0)),
            max: to_pixels(*matrix * Vec4::new(1.0, 1.0, 0.0, 1.0)),
            color,
            ..Default::default()
        };
        if let Some(texture) = texture {
            rect.flags |= RenderRect::TEXTURED;
            rect.texture = texture.0 as u32;
        }
        if let Some(scissor) = self.scissor {
            rect.flags |= RenderRect::SCISSORED;
            rect.scissor = [scissor.pos.x, scissor.pos.y, scissor.dim.x, scissor.dim.y];
        }

        if let Some(layer) = self.layers.last_mut() {
            layer.push(rect);
        }
    }
}

impl RenderBackend for DrawList {
    fn viewport(&self) -> RectI {
        return self.viewport;
    }

    fn set_viewport(&mut self, viewport: RectI) {
        self.viewport = viewport;
    }

    fn scissor(&self) -> Option<RectI> {
        return self.scissor;
    }

    fn set_scissor(&mut self, scissor: Option<RectI>) {
        self.scissor = scissor;
    }

    fn begin_offscreen(&mut self, _dim: UVec2) {
        self.layers.push(Vec::new());
    }

    fn end_offscreen(&mut self) -> TextureHandle {
        debug_assert!(self.layers.len() > 1, "end_offscreen without begin_offscreen");
        let rects = if self.layers.len() > 1 {
            self.layers.pop().unwrap_or_default()
        } else {
            log::error!("DrawList: end_offscreen without begin_offscreen");
            Vec::new()
        };
        self.last_texture += 1;
        self.textures.insert(self.last_texture, rects);
        return TextureHandle(self.last_texture);
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture.0);
        self.released.push(texture);
    }

    fn draw_texture(&mut self, texture: TextureHandle, matrix: &Mat4) {
        self.push(matrix, Color::WHITE, Some(texture));
    }

    fn draw_rect(&mut self, matrix: &Mat4, color: Color) {
        self.push(matrix, color, None);
    }
}
