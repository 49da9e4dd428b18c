//! Easel Software Backend
//!
//! A CPU [`RenderBackend`](easel_render::RenderBackend) that rasterizes
//! canvas passes into an RGBA image, with text rendered through swash.
//!
//! ```
//! use easel_core::{Canvas, PackedColor, Rect};
//! use easel_raster::RasterBackend;
//! use easel_render::{BackendContext, CanvasRenderer, ComponentRef};
//!
//! let mut backend = RasterBackend::new(64, 64);
//! let white = backend.white_texture();
//! let mut draw = |_: ComponentRef, canvas: &Canvas| {
//!     canvas.draw_rect(8.0, 8.0, 16.0, 16.0, PackedColor::GREEN);
//! };
//!
//! let mut ctx = BackendContext::new(&mut backend).with_white_texture(&white);
//! CanvasRenderer::default().render_component(
//!     &mut ctx,
//!     ComponentRef::new(10, 1),
//!     Rect::new(0.0, 0.0, 64.0, 64.0),
//!     &mut draw,
//! );
//! assert_eq!(backend.target().get_pixel(10, 10).0, [0, 255, 0, 255]);
//! ```

pub mod backend;
pub mod error;
pub mod font;

pub use backend::{RasterBackend, RasterSurface, RasterTexture, MAX_TEXTURE_SIZE};
pub use error::{RasterError, Result};
pub use font::RasterFont;
