//! Recording backend
//!
//! A [`RenderBackend`] that draws nothing and records every call. Used for
//! headless verification of draw passes: tests assert on the exact call
//! sequence and on transient resources being released.

use easel_core::{Point, Rect, Size};

use crate::backend::{RenderBackend, Vertex};
use crate::error::{RenderError, RenderResult};

/// One recorded backend call
#[derive(Clone, Debug, PartialEq)]
pub enum BackendCall {
    SetDrawColor([u8; 4]),
    DrawLines(Vec<Point>),
    DrawLine(Point, Point),
    FillRect(Rect),
    RenderGeometry {
        texture: Option<u32>,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
    },
    RenderTexture {
        texture: u32,
        src: Option<Rect>,
        dst: Rect,
    },
    RenderText {
        text: String,
        color: [u8; 4],
        surface: u32,
    },
    CreateTexture {
        surface: u32,
        texture: u32,
    },
    ReleaseTexture(u32),
    ReleaseSurface(u32),
}

/// Texture handle issued by [`RecordingBackend`]
#[derive(Debug, PartialEq)]
pub struct RecordedTexture {
    pub id: u32,
    pub size: Size,
}

/// Surface handle issued by [`RecordingBackend`]
#[derive(Debug, PartialEq)]
pub struct RecordedSurface {
    pub id: u32,
    pub size: Size,
}

/// Monospace stand-in font: every char is `advance` wide
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecordedFont {
    pub advance: f32,
    pub line_height: f32,
}

impl Default for RecordedFont {
    fn default() -> Self {
        Self {
            advance: 8.0,
            line_height: 16.0,
        }
    }
}

/// Backend that records calls instead of drawing
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    next_id: u32,
    live_textures: usize,
    live_surfaces: usize,
    fail_texture_upload: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }

    /// Textures issued and not yet released
    pub fn live_textures(&self) -> usize {
        self.live_textures
    }

    /// Surfaces issued and not yet released
    pub fn live_surfaces(&self) -> usize {
        self.live_surfaces
    }

    /// Make every subsequent texture upload fail
    pub fn set_fail_texture_upload(&mut self, fail: bool) {
        self.fail_texture_upload = fail;
    }

    /// A 1x1 white texture for filled geometry
    pub fn create_white_texture(&mut self) -> RecordedTexture {
        self.live_textures += 1;
        RecordedTexture {
            id: self.issue_id(),
            size: Size::new(1.0, 1.0),
        }
    }

    fn issue_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

impl RenderBackend for RecordingBackend {
    type Texture = RecordedTexture;
    type Surface = RecordedSurface;
    type Font = RecordedFont;

    fn set_draw_color(&mut self, r: u8, g: u8, b: u8, a: u8) {
        self.calls.push(BackendCall::SetDrawColor([r, g, b, a]));
    }

    fn draw_lines(&mut self, points: &[Point]) -> RenderResult<()> {
        self.calls.push(BackendCall::DrawLines(points.to_vec()));
        Ok(())
    }

    fn draw_line(&mut self, from: Point, to: Point) -> RenderResult<()> {
        self.calls.push(BackendCall::DrawLine(from, to));
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect) -> RenderResult<()> {
        self.calls.push(BackendCall::FillRect(rect));
        Ok(())
    }

    fn render_geometry(
        &mut self,
        texture: Option<&RecordedTexture>,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> RenderResult<()> {
        self.calls.push(BackendCall::RenderGeometry {
            texture: texture.map(|t| t.id),
            vertices: vertices.to_vec(),
            indices: indices.to_vec(),
        });
        Ok(())
    }

    fn render_texture(
        &mut self,
        texture: &RecordedTexture,
        src: Option<Rect>,
        dst: Rect,
    ) -> RenderResult<()> {
        self.calls.push(BackendCall::RenderTexture {
            texture: texture.id,
            src,
            dst,
        });
        Ok(())
    }

    fn render_text(
        &mut self,
        font: &RecordedFont,
        text: &str,
        color: [u8; 4],
    ) -> RenderResult<RecordedSurface> {
        let surface = RecordedSurface {
            id: self.issue_id(),
            size: Size::new(text.chars().count() as f32 * font.advance, font.line_height),
        };
        self.live_surfaces += 1;
        self.calls.push(BackendCall::RenderText {
            text: text.to_string(),
            color,
            surface: surface.id,
        });
        Ok(surface)
    }

    fn surface_size(&self, surface: &RecordedSurface) -> Size {
        surface.size
    }

    fn create_texture_from_surface(
        &mut self,
        surface: &RecordedSurface,
    ) -> RenderResult<RecordedTexture> {
        if self.fail_texture_upload {
            return Err(RenderError::Backend("texture upload disabled".to_string()));
        }
        let texture = RecordedTexture {
            id: self.issue_id(),
            size: surface.size,
        };
        self.live_textures += 1;
        self.calls.push(BackendCall::CreateTexture {
            surface: surface.id,
            texture: texture.id,
        });
        Ok(texture)
    }

    fn release_texture(&mut self, texture: RecordedTexture) {
        self.live_textures = self.live_textures.saturating_sub(1);
        self.calls.push(BackendCall::ReleaseTexture(texture.id));
    }

    fn release_surface(&mut self, surface: RecordedSurface) {
        self.live_surfaces = self.live_surfaces.saturating_sub(1);
        self.calls.push(BackendCall::ReleaseSurface(surface.id));
    }
}
