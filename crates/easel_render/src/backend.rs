//! Rendering backend interface
//!
//! [`RenderBackend`] is the set of primitives the drain pass needs from a
//! concrete 2D renderer. Resources the backend hands out (surfaces,
//! textures) are released explicitly through the trait so backends that
//! wrap foreign handles can free them at a well-defined point.

use easel_core::{Point, Rect, Size};

use crate::error::RenderResult;

/// Vertex submitted through [`RenderBackend::render_geometry`]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
    pub position: Point,
    /// Normalized RGBA, modulates the texture sample
    pub color: [f32; 4],
    pub tex_coord: Point,
}

impl Vertex {
    pub const fn new(position: Point, color: [f32; 4]) -> Self {
        Self {
            position,
            color,
            tex_coord: Point::ZERO,
        }
    }
}

/// A hardware or software 2D renderer the canvas can drain into
pub trait RenderBackend {
    /// A renderable texture
    type Texture;
    /// CPU-side pixel surface (text rasterization output)
    type Surface;
    /// Font resource used for text commands
    type Font;

    /// Set the color used by subsequent line and rect operations
    fn set_draw_color(&mut self, r: u8, g: u8, b: u8, a: u8);

    /// Draw connected line segments through `points`
    fn draw_lines(&mut self, points: &[Point]) -> RenderResult<()>;

    /// Draw a single line segment
    fn draw_line(&mut self, from: Point, to: Point) -> RenderResult<()>;

    /// Fill an axis-aligned rectangle
    fn fill_rect(&mut self, rect: Rect) -> RenderResult<()>;

    /// Draw an indexed triangle list, optionally textured
    fn render_geometry(
        &mut self,
        texture: Option<&Self::Texture>,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> RenderResult<()>;

    /// Copy `src` of `texture` (whole texture if `None`) into `dst`
    fn render_texture(
        &mut self,
        texture: &Self::Texture,
        src: Option<Rect>,
        dst: Rect,
    ) -> RenderResult<()>;

    /// Rasterize `text` into a new surface
    fn render_text(&mut self, font: &Self::Font, text: &str, color: [u8; 4])
        -> RenderResult<Self::Surface>;

    fn surface_size(&self, surface: &Self::Surface) -> Size;

    /// Upload a surface as a renderable texture
    fn create_texture_from_surface(&mut self, surface: &Self::Surface)
        -> RenderResult<Self::Texture>;

    fn release_texture(&mut self, texture: Self::Texture);

    fn release_surface(&mut self, surface: Self::Surface);
}

/// Everything a draw pass needs from the host for one frame
///
/// Not owned by the canvas: the host builds one per draw call from its own
/// renderer, font, and the reusable white texture used for filled
/// geometry.
pub struct BackendContext<'a, B: RenderBackend> {
    pub renderer: &'a mut B,
    pub font: Option<&'a B::Font>,
    pub white_texture: Option<&'a B::Texture>,
}

impl<'a, B: RenderBackend> BackendContext<'a, B> {
    pub fn new(renderer: &'a mut B) -> Self {
        Self {
            renderer,
            font: None,
            white_texture: None,
        }
    }

    pub fn with_font(mut self, font: &'a B::Font) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_white_texture(mut self, texture: &'a B::Texture) -> Self {
        self.white_texture = Some(texture);
        self
    }
}
