//! Software rendering backend
//!
//! Draws into an owned RGBA image with source-over blending. Sampling is
//! nearest-neighbor throughout; a pixel is covered when its center lies
//! inside the primitive.

use std::path::Path;

use easel_core::{Point, Rect, Size};
use easel_render::{RenderBackend, RenderError, RenderResult, Vertex};
use image::{Rgba, RgbaImage};
use swash::scale::ScaleContext;

use crate::error::Result;
use crate::font::RasterFont;

/// Largest texture edge accepted by [`RasterBackend::create_texture_from_surface`]
pub const MAX_TEXTURE_SIZE: u32 = 16384;

/// CPU-side surface produced by text rendering
#[derive(Clone, Debug)]
pub struct RasterSurface {
    pixels: RgbaImage,
}

impl RasterSurface {
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Texture sampled by geometry and blits
#[derive(Clone, Debug)]
pub struct RasterTexture {
    pixels: RgbaImage,
}

impl RasterTexture {
    pub fn from_image(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Nearest texel at normalized coordinates
    fn sample(&self, uv: Point) -> [u8; 4] {
        let (w, h) = self.pixels.dimensions();
        if w == 0 || h == 0 {
            return [0, 0, 0, 0];
        }
        let x = ((uv.x * w as f32) as i64).clamp(0, w as i64 - 1) as u32;
        let y = ((uv.y * h as f32) as i64).clamp(0, h as i64 - 1) as u32;
        self.pixels.get_pixel(x, y).0
    }
}

/// Source-over blend of straight-alpha `src` onto `dst`
fn blend(dst: &mut Rgba<u8>, src: [u8; 4]) {
    let sa = src[3] as f32 / 255.0;
    if sa <= 0.0 {
        return;
    }
    if sa >= 1.0 {
        dst.0 = src;
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let mut out = [0u8; 4];
    for c in 0..3 {
        let value = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        out[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    dst.0 = out;
}

fn modulate(texel: [u8; 4], tint: [f32; 4]) -> [u8; 4] {
    let mut out = [0u8; 4];
    for c in 0..4 {
        out[c] = (texel[c] as f32 * tint[c].clamp(0.0, 1.0)).round() as u8;
    }
    out
}

/// Twice the signed area of triangle `a b c`
fn edge(a: Point, b: Point, c: Point) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Liang-Barsky clip of segment `from to` against `[0, width] x [0, height]`
///
/// Returns `None` when no part of the segment lies inside.
fn clip_segment(from: Point, to: Point, width: f64, height: f64) -> Option<(Point, Point)> {
    let (x0, y0) = (from.x as f64, from.y as f64);
    let (dx, dy) = (to.x as f64 - x0, to.y as f64 - y0);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);

    for (p, q) in [(-dx, x0), (dx, width - x0), (-dy, y0), (dy, height - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    let at = |t: f64| Point::new((x0 + dx * t) as f32, (y0 + dy * t) as f32);
    Some((at(t0), at(t1)))
}

/// Software [`RenderBackend`] over an [`RgbaImage`]
pub struct RasterBackend {
    target: RgbaImage,
    draw_color: [u8; 4],
    scale_context: ScaleContext,
}

impl RasterBackend {
    /// A transparent target of `width` x `height`
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            target: RgbaImage::new(width, height),
            draw_color: [0, 0, 0, 255],
            scale_context: ScaleContext::new(),
        }
    }

    /// Fill the whole target with `color`, ignoring blending
    pub fn clear(&mut self, color: [u8; 4]) {
        for pixel in self.target.pixels_mut() {
            pixel.0 = color;
        }
    }

    /// 1x1 opaque white texture for filled geometry
    pub fn white_texture(&self) -> RasterTexture {
        RasterTexture::from_image(RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255])))
    }

    pub fn draw_color(&self) -> [u8; 4] {
        self.draw_color
    }

    pub fn target(&self) -> &RgbaImage {
        &self.target
    }

    pub fn into_image(self) -> RgbaImage {
        self.target
    }

    /// Write the target as PNG
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.target
            .save_with_format(path, image::ImageFormat::Png)?;
        tracing::info!(
            path = %path.display(),
            width = self.target.width(),
            height = self.target.height(),
            "wrote image"
        );
        Ok(())
    }

    fn plot(&mut self, x: i64, y: i64, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.target.width() as i64 || y >= self.target.height() as i64 {
            return;
        }
        blend(self.target.get_pixel_mut(x as u32, y as u32), color);
    }

    /// Pixel range `[lo, hi)` whose centers fall in `[min, max)`, clipped
    fn span(min: f32, max: f32, limit: u32) -> (u32, u32) {
        let lo = (min - 0.5).ceil().max(0.0);
        let hi = (max - 0.5).ceil().clamp(0.0, limit as f32);
        (lo as u32, (hi as u32).max(lo as u32))
    }
}

impl RenderBackend for RasterBackend {
    type Texture = RasterTexture;
    type Surface = RasterSurface;
    type Font = RasterFont;

    fn set_draw_color(&mut self, r: u8, g: u8, b: u8, a: u8) {
        self.draw_color = [r, g, b, a];
    }

    fn draw_lines(&mut self, points: &[Point]) -> RenderResult<()> {
        match points {
            [] => {}
            [single] => self.plot(single.x.floor() as i64, single.y.floor() as i64, self.draw_color),
            _ => {
                for pair in points.windows(2) {
                    self.draw_line(pair[0], pair[1])?;
                }
            }
        }
        Ok(())
    }

    fn draw_line(&mut self, from: Point, to: Point) -> RenderResult<()> {
        let (width, height) = self.target.dimensions();
        let Some((from, to)) = clip_segment(from, to, width as f64, height as f64) else {
            return Ok(());
        };
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i64;
        let color = self.draw_color;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = (from.x + dx * t).floor() as i64;
            let y = (from.y + dy * t).floor() as i64;
            self.plot(x, y, color);
        }
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect) -> RenderResult<()> {
        let (x0, x1) = (rect.x().min(rect.x() + rect.width()), rect.x().max(rect.x() + rect.width()));
        let (y0, y1) = (rect.y().min(rect.y() + rect.height()), rect.y().max(rect.y() + rect.height()));
        let (px0, px1) = Self::span(x0, x1, self.target.width());
        let (py0, py1) = Self::span(y0, y1, self.target.height());
        let color = self.draw_color;
        for y in py0..py1 {
            for x in px0..px1 {
                blend(self.target.get_pixel_mut(x, y), color);
            }
        }
        Ok(())
    }

    fn render_geometry(
        &mut self,
        texture: Option<&RasterTexture>,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> RenderResult<()> {
        let (width, height) = self.target.dimensions();
        for triangle in indices.chunks_exact(3) {
            let mut corners = [Vertex::default(); 3];
            for (corner, &index) in corners.iter_mut().zip(triangle) {
                *corner = *vertices.get(index as usize).ok_or_else(|| {
                    RenderError::Backend(format!(
                        "vertex index {index} out of range ({} vertices)",
                        vertices.len()
                    ))
                })?;
            }
            let [a, b, c] = corners;
            let area = edge(a.position, b.position, c.position);
            if area == 0.0 || !area.is_finite() {
                continue;
            }

            let xs = [a.position.x, b.position.x, c.position.x];
            let ys = [a.position.y, b.position.y, c.position.y];
            let min = |v: [f32; 3]| v[0].min(v[1]).min(v[2]);
            let max = |v: [f32; 3]| v[0].max(v[1]).max(v[2]);
            let (px0, px1) = Self::span(min(xs), max(xs) + 1.0, width);
            let (py0, py1) = Self::span(min(ys), max(ys) + 1.0, height);

            for py in py0..py1 {
                for px in px0..px1 {
                    let p = Point::new(px as f32 + 0.5, py as f32 + 0.5);
                    let w0 = edge(b.position, c.position, p) / area;
                    let w1 = edge(c.position, a.position, p) / area;
                    let w2 = edge(a.position, b.position, p) / area;
                    if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                        continue;
                    }

                    let mut tint = [0.0f32; 4];
                    for ch in 0..4 {
                        tint[ch] = a.color[ch] * w0 + b.color[ch] * w1 + c.color[ch] * w2;
                    }
                    let texel = match texture {
                        Some(texture) => {
                            let uv = Point::new(
                                a.tex_coord.x * w0 + b.tex_coord.x * w1 + c.tex_coord.x * w2,
                                a.tex_coord.y * w0 + b.tex_coord.y * w1 + c.tex_coord.y * w2,
                            );
                            texture.sample(uv)
                        }
                        None => [255, 255, 255, 255],
                    };
                    blend(self.target.get_pixel_mut(px, py), modulate(texel, tint));
                }
            }
        }
        Ok(())
    }

    fn render_texture(
        &mut self,
        texture: &RasterTexture,
        src: Option<Rect>,
        dst: Rect,
    ) -> RenderResult<()> {
        if dst.width() <= 0.0 || dst.height() <= 0.0 || texture.width() == 0 || texture.height() == 0 {
            return Ok(());
        }
        let src = src.unwrap_or_else(|| {
            Rect::new(0.0, 0.0, texture.width() as f32, texture.height() as f32)
        });

        let (px0, px1) = Self::span(dst.x(), dst.x() + dst.width(), self.target.width());
        let (py0, py1) = Self::span(dst.y(), dst.y() + dst.height(), self.target.height());
        for py in py0..py1 {
            let v = (py as f32 + 0.5 - dst.y()) / dst.height();
            let sy = src.y() + v * src.height();
            for px in px0..px1 {
                let u = (px as f32 + 0.5 - dst.x()) / dst.width();
                let sx = src.x() + u * src.width();
                let texel = texture.sample(Point::new(
                    sx / texture.width() as f32,
                    sy / texture.height() as f32,
                ));
                blend(self.target.get_pixel_mut(px, py), texel);
            }
        }
        Ok(())
    }

    fn render_text(
        &mut self,
        font: &RasterFont,
        text: &str,
        color: [u8; 4],
    ) -> RenderResult<RasterSurface> {
        let pixels = font
            .rasterize(&mut self.scale_context, text, color)
            .map_err(|err| RenderError::Backend(err.to_string()))?;
        Ok(RasterSurface { pixels })
    }

    fn surface_size(&self, surface: &RasterSurface) -> Size {
        Size::new(surface.pixels.width() as f32, surface.pixels.height() as f32)
    }

    fn create_texture_from_surface(&mut self, surface: &RasterSurface) -> RenderResult<RasterTexture> {
        let (w, h) = surface.pixels.dimensions();
        if w > MAX_TEXTURE_SIZE || h > MAX_TEXTURE_SIZE {
            return Err(RenderError::Backend(format!(
                "surface {w}x{h} exceeds the {MAX_TEXTURE_SIZE} texture limit"
            )));
        }
        Ok(RasterTexture::from_image(surface.pixels.clone()))
    }

    fn release_texture(&mut self, texture: RasterTexture) {
        drop(texture);
    }

    fn release_surface(&mut self, surface: RasterSurface) {
        drop(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::{Canvas, PackedColor};
    use easel_render::{BackendContext, CanvasRenderer, ComponentRef};

    const RED: [u8; 4] = [255, 0, 0, 255];
    const CLEAR: [u8; 4] = [0, 0, 0, 0];

    fn pixel(backend: &RasterBackend, x: u32, y: u32) -> [u8; 4] {
        backend.target().get_pixel(x, y).0
    }

    #[test]
    fn test_fill_rect_covers_exact_pixels() {
        let mut backend = RasterBackend::new(20, 20);
        backend.set_draw_color(255, 0, 0, 255);
        backend.fill_rect(Rect::new(2.0, 3.0, 4.0, 5.0)).unwrap();

        assert_eq!(pixel(&backend, 2, 3), RED);
        assert_eq!(pixel(&backend, 5, 7), RED);
        assert_eq!(pixel(&backend, 6, 7), CLEAR);
        assert_eq!(pixel(&backend, 5, 8), CLEAR);
        assert_eq!(pixel(&backend, 1, 3), CLEAR);
    }

    #[test]
    fn test_fill_rect_is_clipped() {
        let mut backend = RasterBackend::new(4, 4);
        backend.set_draw_color(0, 0, 255, 255);
        backend.fill_rect(Rect::new(-10.0, -10.0, 100.0, 100.0)).unwrap();
        assert!(backend.target().pixels().all(|p| p.0 == [0, 0, 255, 255]));
    }

    #[test]
    fn test_blending() {
        let mut backend = RasterBackend::new(1, 1);
        backend.clear([255, 255, 255, 255]);
        backend.set_draw_color(0, 0, 0, 128);
        backend.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        let [r, g, b, a] = pixel(&backend, 0, 0);
        assert_eq!(a, 255);
        assert!((126..=128).contains(&r));
        assert_eq!((r, g), (g, b));
    }

    #[test]
    fn test_line_reaches_both_ends() {
        let mut backend = RasterBackend::new(10, 10);
        backend.set_draw_color(255, 0, 0, 255);
        backend
            .draw_line(Point::new(1.0, 1.0), Point::new(8.0, 5.0))
            .unwrap();
        assert_eq!(pixel(&backend, 1, 1), RED);
        assert_eq!(pixel(&backend, 8, 5), RED);
        assert_eq!(pixel(&backend, 0, 9), CLEAR);
    }

    #[test]
    fn test_geometry_fills_triangle_interior() {
        let mut backend = RasterBackend::new(10, 10);
        let white = backend.white_texture();
        let green = [0.0, 1.0, 0.0, 1.0];
        let vertices = [
            Vertex::new(Point::new(0.0, 0.0), green),
            Vertex::new(Point::new(10.0, 0.0), green),
            Vertex::new(Point::new(0.0, 10.0), green),
        ];
        backend
            .render_geometry(Some(&white), &vertices, &[0, 1, 2])
            .unwrap();

        assert_eq!(pixel(&backend, 1, 1), [0, 255, 0, 255]);
        assert_eq!(pixel(&backend, 9, 9), CLEAR);
    }

    #[test]
    fn test_geometry_rejects_bad_index() {
        let mut backend = RasterBackend::new(4, 4);
        let vertices = [Vertex::default(); 2];
        assert!(matches!(
            backend.render_geometry(None, &vertices, &[0, 1, 5]),
            Err(RenderError::Backend(_))
        ));
    }

    #[test]
    fn test_texture_blit_scales() {
        let mut backend = RasterBackend::new(4, 4);
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba(RED));
        image.put_pixel(1, 0, Rgba([0, 0, 255, 255]));
        let texture = RasterTexture::from_image(image);

        backend
            .render_texture(&texture, None, Rect::new(0.0, 0.0, 4.0, 2.0))
            .unwrap();
        assert_eq!(pixel(&backend, 0, 0), RED);
        assert_eq!(pixel(&backend, 1, 1), RED);
        assert_eq!(pixel(&backend, 3, 0), [0, 0, 255, 255]);
        assert_eq!(pixel(&backend, 0, 2), CLEAR);
    }

    #[test]
    fn test_zero_size_blit_is_noop() {
        let mut backend = RasterBackend::new(2, 2);
        let texture = RasterTexture::from_image(RgbaImage::new(0, 4));
        backend
            .render_texture(&texture, None, Rect::new(0.0, 0.0, 0.0, 4.0))
            .unwrap();
        assert!(backend.target().pixels().all(|p| p.0 == CLEAR));
    }

    #[test]
    fn test_canvas_pass_end_to_end() {
        let mut backend = RasterBackend::new(100, 100);
        let white = backend.white_texture();
        let mut renderer = CanvasRenderer::default();
        let mut draw = |_: ComponentRef, canvas: &Canvas| {
            canvas.draw_circle(25.0, 25.0, 10.0, PackedColor::RED, true);
            canvas.draw_rect(0.0, 0.0, 5.0, 5.0, PackedColor::BLUE);
        };

        let report = {
            let mut ctx = BackendContext::new(&mut backend).with_white_texture(&white);
            renderer.render_component(
                &mut ctx,
                ComponentRef::new(10, 1),
                Rect::new(50.0, 50.0, 50.0, 50.0),
                &mut draw,
            )
        };
        assert_eq!(report.drawn, 2);
        assert_eq!(pixel(&backend, 75, 75), RED);
        assert_eq!(pixel(&backend, 52, 52), [0, 0, 255, 255]);
        assert_eq!(pixel(&backend, 25, 25), CLEAR);

        let image = backend.into_image();
        assert_eq!(image.dimensions(), (100, 100));
    }

    #[test]
    fn test_clip_segment() {
        let inside = clip_segment(Point::new(1.0, 1.0), Point::new(8.0, 5.0), 10.0, 10.0);
        assert_eq!(inside, Some((Point::new(1.0, 1.0), Point::new(8.0, 5.0))));

        let (from, to) =
            clip_segment(Point::new(-5.0, 2.0), Point::new(1.0e12, 2.0), 10.0, 10.0).unwrap();
        assert!(from.x.abs() < 1e-3 && (to.x - 10.0).abs() < 1e-3);
        assert_eq!((from.y, to.y), (2.0, 2.0));

        assert_eq!(
            clip_segment(Point::new(-5.0, -5.0), Point::new(-1.0, 20.0), 10.0, 10.0),
            None
        );
        assert_eq!(
            clip_segment(Point::new(0.0, 20.0), Point::new(1.0e12, 20.0), 10.0, 10.0),
            None
        );
    }

    #[test]
    fn test_huge_line_only_touches_visible_pixels() {
        let mut backend = RasterBackend::new(10, 10);
        let mut renderer = CanvasRenderer::default();
        let mut draw = |_: ComponentRef, canvas: &Canvas| {
            canvas.draw_line(0.0, 0.0, 1.0e12, 0.0, PackedColor::RED);
            canvas.draw_line(-1.0e12, 50.0, 1.0e12, 50.0, PackedColor::RED);
            canvas.draw_circle(0.0, 0.0, 1.0e9, PackedColor::RED, false);
        };

        let started = std::time::Instant::now();
        let report = {
            let mut ctx = BackendContext::new(&mut backend);
            renderer.render_component(
                &mut ctx,
                ComponentRef::new(10, 1),
                Rect::new(0.0, 0.0, 10.0, 10.0),
                &mut draw,
            )
        };
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
        assert_eq!(report.drawn, 3);
        assert!((0..10).all(|x| pixel(&backend, x, 0) == RED));
        assert_eq!(pixel(&backend, 5, 5), CLEAR);
    }

    #[test]
    fn test_oversized_text_fails_without_allocating() {
        let Ok(font) = RasterFont::system_default(1.0e6) else {
            println!("No system font found - skipping");
            return;
        };
        let mut backend = RasterBackend::new(10, 10);
        assert!(matches!(
            backend.render_text(&font, "W", [0, 0, 0, 255]),
            Err(RenderError::Backend(_))
        ));

        let mut renderer = CanvasRenderer::default();
        let mut draw = |_: ComponentRef, canvas: &Canvas| {
            canvas.draw_text("W", 0.0, 0.0, PackedColor::BLACK);
            canvas.draw_rect(0.0, 0.0, 2.0, 2.0, PackedColor::RED);
        };
        let report = {
            let mut ctx = BackendContext::new(&mut backend).with_font(&font);
            renderer.render_component(
                &mut ctx,
                ComponentRef::new(10, 1),
                Rect::new(0.0, 0.0, 10.0, 10.0),
                &mut draw,
            )
        };
        assert_eq!(report.failed, 1);
        assert_eq!(report.drawn, 1);
        assert_eq!(pixel(&backend, 1, 1), RED);
    }

    #[test]
    fn test_text_with_system_font() {
        let Ok(font) = RasterFont::system_default(16.0) else {
            println!("No system font found - skipping");
            return;
        };
        let mut backend = RasterBackend::new(200, 40);
        let surface = backend.render_text(&font, "Easel", [0, 0, 0, 255]).unwrap();
        let size = backend.surface_size(&surface);
        assert!(size.width > 0.0 && size.height > 0.0);

        let texture = backend.create_texture_from_surface(&surface).unwrap();
        backend
            .render_texture(&texture, None, Rect::from_origin_size(Point::new(4.0, 4.0), size))
            .unwrap();
        backend.release_texture(texture);
        backend.release_surface(surface);
        assert!(backend.target().pixels().any(|p| p[3] > 0));
    }
}
