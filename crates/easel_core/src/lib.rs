//! Easel Core
//!
//! The backend-agnostic half of the Easel canvas plugin:
//!
//! - **Commands**: a fixed-size, copyable [`Command`] per drawing primitive
//! - **Command Buffer**: a reusable, ordered queue of commands for one draw pass
//! - **Command Iterator**: a non-destructive cursor that yields command copies
//! - **Canvas**: the immediate-mode drawing handle handed to user code
//! - **Current binding**: thread-local free-function API for hosts that cannot
//!   pass a handle around
//!
//! Execution of commands lives in `easel_render`.
//!
//! # Example
//!
//! ```rust
//! use easel_core::{Canvas, Command, PackedColor};
//!
//! let canvas = Canvas::detached();
//! canvas.draw_rect(10.0, 10.0, 50.0, 20.0, PackedColor(0xFF0000FF));
//!
//! let buffer = canvas.buffer().borrow();
//! let mut iter = buffer.iter();
//! assert!(iter.has_next());
//! assert!(matches!(iter.next(), Some(Command::Rect { .. })));
//! ```

pub mod buffer;
pub mod canvas;
pub mod color;
pub mod command;
pub mod current;
pub mod error;
pub mod geometry;

pub use buffer::{CommandBuffer, CommandIter};
pub use canvas::{Canvas, CanvasFrame, SharedBuffer};
pub use color::PackedColor;
pub use command::{
    Command, CommandKind, InlineText, PolygonVertices, POLYGON_MAX_VERTICES, TEXT_CAPACITY,
};
pub use error::{CanvasError, Result};
pub use geometry::{Fp, Point, Rect, Size};
