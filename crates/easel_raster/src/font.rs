//! Font loading and glyph rasterization using swash

use std::fs;
use std::path::Path;

use image::{Rgba, RgbaImage};
use swash::scale::image::Content;
use swash::scale::{Render, ScaleContext, Source, StrikeWith};
use swash::zeno::Format;
use swash::{CacheKey, FontRef};

use crate::backend::MAX_TEXTURE_SIZE;
use crate::error::{RasterError, Result};

/// Fonts tried by [`RasterFont::system_default`], in order
#[cfg(target_os = "macos")]
const KNOWN_FONT_PATHS: &[&str] = &[
    "/System/Library/Fonts/SFNS.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "/Library/Fonts/Arial.ttf",
];

#[cfg(target_os = "windows")]
const KNOWN_FONT_PATHS: &[&str] = &[
    "C:\\Windows\\Fonts\\segoeui.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const KNOWN_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
];

/// A font face at a fixed pixel size
///
/// Owns the font bytes; swash [`FontRef`]s are rebuilt from the stored
/// offset and cache key on demand.
#[derive(Clone)]
pub struct RasterFont {
    data: Vec<u8>,
    offset: u32,
    key: CacheKey,
    size: f32,
}

impl RasterFont {
    /// Parse the first face in `data`
    pub fn from_bytes(data: Vec<u8>, size: f32) -> Result<Self> {
        if !(size.is_finite() && size > 0.0) {
            return Err(RasterError::InvalidFontSize(size));
        }
        let font = FontRef::from_index(&data, 0).ok_or(RasterError::InvalidFontData)?;
        let (offset, key) = (font.offset, font.key);
        Ok(Self {
            data,
            offset,
            key,
            size,
        })
    }

    pub fn load(path: impl AsRef<Path>, size: f32) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| RasterError::FontIo {
            path: path.to_path_buf(),
            source,
        })?;
        let font = Self::from_bytes(data, size)?;
        tracing::debug!(path = %path.display(), size, "loaded font");
        Ok(font)
    }

    /// First loadable font from the platform's well-known locations
    pub fn system_default(size: f32) -> Result<Self> {
        KNOWN_FONT_PATHS
            .iter()
            .filter(|path| Path::new(path).exists())
            .find_map(|path| Self::load(path, size).ok())
            .ok_or(RasterError::NoSystemFont)
    }

    /// Pixel size
    pub fn size(&self) -> f32 {
        self.size
    }

    fn font_ref(&self) -> FontRef<'_> {
        FontRef {
            data: &self.data,
            offset: self.offset,
            key: self.key,
        }
    }

    /// Scaled (ascent, descent, line height) in pixels
    fn vertical_metrics(&self) -> (f32, f32, f32) {
        let metrics = self.font_ref().metrics(&[]).scale(self.size);
        let line_height = metrics.ascent + metrics.descent + metrics.leading;
        (metrics.ascent, metrics.descent, line_height)
    }

    /// Width of `text` in pixels, without kerning
    pub fn measure(&self, text: &str) -> f32 {
        let font = self.font_ref();
        let charmap = font.charmap();
        let glyph_metrics = font.glyph_metrics(&[]);
        let scale = self.size / font.metrics(&[]).units_per_em as f32;
        text.chars()
            .map(|ch| glyph_metrics.advance_width(charmap.map(ch)) * scale)
            .sum()
    }

    /// Rasterize `text` into a straight-alpha RGBA image
    ///
    /// The image is as wide as the summed advances and one line tall.
    /// Empty text yields a zero-width image.
    pub(crate) fn rasterize(
        &self,
        context: &mut ScaleContext,
        text: &str,
        color: [u8; 4],
    ) -> Result<RgbaImage> {
        let (ascent, _, line_height) = self.vertical_metrics();
        let (width, height) = surface_dimensions(self.measure(text), line_height)?;
        let mut image = RgbaImage::new(width, height);

        let font = self.font_ref();
        let charmap = font.charmap();
        let glyph_metrics = font.glyph_metrics(&[]);
        let scale = self.size / font.metrics(&[]).units_per_em as f32;
        let mut scaler = context.builder(font).size(self.size).build();

        let mut render = Render::new(&[
            Source::ColorOutline(0),
            Source::ColorBitmap(StrikeWith::BestFit),
            Source::Outline,
        ]);
        render.format(Format::Alpha);

        let baseline = ascent.round() as i32;
        let mut pen = 0.0f32;
        for ch in text.chars() {
            let glyph_id = charmap.map(ch);
            if let Some(glyph) = render.render(&mut scaler, glyph_id) {
                let left = pen.round() as i32 + glyph.placement.left;
                let top = baseline - glyph.placement.top;
                let glyph_width = glyph.placement.width as usize;
                // Color glyphs come back as RGBA; only their alpha is used
                let stride = match glyph.content {
                    Content::Mask => 1,
                    Content::SubpixelMask | Content::Color => 4,
                };

                for (i, texel) in glyph.data.chunks_exact(stride).enumerate() {
                    let coverage = texel[stride - 1];
                    if coverage == 0 || glyph_width == 0 {
                        continue;
                    }
                    let x = left + (i % glyph_width) as i32;
                    let y = top + (i / glyph_width) as i32;
                    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                        continue;
                    }
                    let alpha = (coverage as u32 * color[3] as u32 / 255) as u8;
                    let pixel = image.get_pixel_mut(x as u32, y as u32);
                    // Overlapping glyphs keep the stronger coverage
                    if alpha > pixel[3] {
                        *pixel = Rgba([color[0], color[1], color[2], alpha]);
                    }
                }
            }
            pen += glyph_metrics.advance_width(glyph_id) * scale;
        }

        Ok(image)
    }
}

/// Pixel dimensions of a text surface, checked before anything is allocated
fn surface_dimensions(width: f32, height: f32) -> Result<(u32, u32)> {
    let (w, h) = (width.ceil().max(0.0), height.ceil().max(1.0));
    let limit = MAX_TEXTURE_SIZE as f32;
    let too_large = || RasterError::SurfaceTooLarge {
        width,
        height,
        limit: MAX_TEXTURE_SIZE,
    };
    if !(width.is_finite() && height.is_finite() && w <= limit && h <= limit) {
        return Err(too_large());
    }
    let (w, h) = (w as u32, h as u32);
    (w as usize)
        .checked_mul(h as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or_else(too_large)?;
    Ok((w, h))
}

impl std::fmt::Debug for RasterFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterFont")
            .field("bytes", &self.data.len())
            .field("size", &self.size)
            .finish()
    }
}
