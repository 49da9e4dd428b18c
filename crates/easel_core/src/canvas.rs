//! Canvas - the immediate-mode drawing handle
//!
//! A [`Canvas`] is what user drawing code receives during a draw pass. It
//! is a cheap, clonable handle over the renderer's shared command buffer
//! plus the frame (size and on-screen offset) of the component being drawn.
//!
//! All `draw_*` calls are fire-and-forget: they build a command, push it,
//! and on failure log a diagnostic and drop the command. They never panic
//! and never leave the buffer in a partially written state.
//!
//! Coordinates are component-local. The renderer applies the frame offset
//! when it drains the buffer.
//!
//! # Example
//!
//! ```
//! use easel_core::{Canvas, PackedColor};
//!
//! let canvas = Canvas::detached();
//! canvas.draw_circle(50.0, 50.0, 20.0, PackedColor::RED, true);
//! canvas.draw_line(0.0, 0.0, 100.0, 100.0, PackedColor(0x00FF00FF));
//! assert_eq!(canvas.command_count(), 2);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::buffer::CommandBuffer;
use crate::color::PackedColor;
use crate::command::{Command, InlineText, PolygonVertices, POLYGON_MAX_VERTICES};
use crate::error::{CanvasError, Result};
use crate::geometry::{Fp, Point, Rect, Size};

/// Command buffer shared between the renderer and the canvas handles it
/// hands out. Single-threaded by construction.
pub type SharedBuffer = Rc<RefCell<CommandBuffer>>;

/// On-screen placement of the component a canvas draws into
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CanvasFrame {
    /// Canvas dimensions
    pub size: Size,
    /// Screen position of the canvas origin
    pub offset: Point,
}

impl CanvasFrame {
    pub const fn new(size: Size, offset: Point) -> Self {
        Self { size, offset }
    }

    /// Frame covering the given component bounds
    pub fn from_bounds(bounds: Rect) -> Self {
        Self::new(bounds.size, bounds.origin)
    }
}

/// Immediate-mode drawing handle bound to one command buffer
#[derive(Clone)]
pub struct Canvas {
    buffer: SharedBuffer,
    frame: CanvasFrame,
}

impl Canvas {
    pub fn new(buffer: SharedBuffer, frame: CanvasFrame) -> Self {
        Self { buffer, frame }
    }

    /// Canvas over a fresh private buffer with an empty frame
    pub fn detached() -> Self {
        Self::new(
            Rc::new(RefCell::new(CommandBuffer::new())),
            CanvasFrame::default(),
        )
    }

    pub fn buffer(&self) -> &SharedBuffer {
        &self.buffer
    }

    pub fn frame(&self) -> CanvasFrame {
        self.frame
    }

    pub fn set_frame(&mut self, frame: CanvasFrame) {
        self.frame = frame;
    }

    pub fn size(&self) -> Size {
        self.frame.size
    }

    pub fn offset(&self) -> Point {
        self.frame.offset
    }

    /// Number of commands recorded so far in this pass
    pub fn command_count(&self) -> usize {
        self.buffer.try_borrow().map(|b| b.len()).unwrap_or(0)
    }

    /// Whether two handles record into the same buffer
    pub fn shares_buffer(&self, other: &Canvas) -> bool {
        Rc::ptr_eq(&self.buffer, &other.buffer)
    }

    /// Push a prebuilt command, reporting failure to the caller
    pub fn push_command(&self, command: Command) -> Result<()> {
        let mut buffer = self
            .buffer
            .try_borrow_mut()
            .map_err(|_| CanvasError::BufferBusy)?;
        buffer.push(command)
    }

    fn record(&self, command: Command) {
        match self.push_command(command) {
            Ok(()) => tracing::trace!(kind = %command.kind(), "recorded canvas command"),
            Err(err) => {
                tracing::warn!(kind = %command.kind(), error = %err, "dropping canvas command")
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Drawing API
    // ═══════════════════════════════════════════════════════════════════════

    /// Circle centered at (cx, cy)
    pub fn draw_circle(
        &self,
        cx: Fp,
        cy: Fp,
        radius: Fp,
        color: impl Into<PackedColor>,
        filled: bool,
    ) {
        self.record(Command::Circle {
            center: Point::new(cx, cy),
            radius,
            color: color.into(),
            filled,
        });
    }

    /// Axis-aligned ellipse centered at (cx, cy)
    pub fn draw_ellipse(
        &self,
        cx: Fp,
        cy: Fp,
        rx: Fp,
        ry: Fp,
        color: impl Into<PackedColor>,
        filled: bool,
    ) {
        self.record(Command::Ellipse {
            center: Point::new(cx, cy),
            rx,
            ry,
            color: color.into(),
            filled,
        });
    }

    /// Circular arc; angles in degrees, measured clockwise in screen space
    pub fn draw_arc(
        &self,
        cx: Fp,
        cy: Fp,
        radius: Fp,
        start_angle: Fp,
        end_angle: Fp,
        color: impl Into<PackedColor>,
    ) {
        self.record(Command::Arc {
            center: Point::new(cx, cy),
            radius,
            start_angle,
            end_angle,
            color: color.into(),
        });
    }

    /// Polygon through `vertices`
    ///
    /// At most [`POLYGON_MAX_VERTICES`] vertices are kept.
    pub fn draw_polygon(&self, vertices: &[Point], color: impl Into<PackedColor>, filled: bool) {
        if vertices.len() > POLYGON_MAX_VERTICES {
            tracing::warn!(
                vertices = vertices.len(),
                max = POLYGON_MAX_VERTICES,
                "polygon truncated"
            );
        }
        self.record(Command::Polygon {
            vertices: PolygonVertices::truncated(vertices),
            color: color.into(),
            filled,
        });
    }

    /// Filled axis-aligned rectangle
    pub fn draw_rect(&self, x: Fp, y: Fp, width: Fp, height: Fp, color: impl Into<PackedColor>) {
        self.record(Command::Rect {
            rect: Rect::new(x, y, width, height),
            color: color.into(),
        });
    }

    /// Single line segment
    pub fn draw_line(&self, x1: Fp, y1: Fp, x2: Fp, y2: Fp, color: impl Into<PackedColor>) {
        self.record(Command::Line {
            from: Point::new(x1, y1),
            to: Point::new(x2, y2),
            color: color.into(),
        });
    }

    /// Text with its top-left corner at (x, y)
    pub fn draw_text(&self, text: &str, x: Fp, y: Fp, color: impl Into<PackedColor>) {
        if !InlineText::fits(text) {
            tracing::debug!(bytes = text.len(), "canvas text truncated");
        }
        self.record(Command::Text {
            origin: Point::new(x, y),
            text: InlineText::truncated(text),
            color: color.into(),
        });
    }
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("frame", &self.frame)
            .field("commands", &self.command_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandKind;

    fn drained(canvas: &Canvas) -> Vec<Command> {
        canvas.buffer().borrow().iter().collect()
    }

    #[test]
    fn test_circle_round_trip() {
        let canvas = Canvas::detached();
        canvas.draw_circle(12.5, -4.0, 7.25, PackedColor(0x11223344), true);

        assert_eq!(
            drained(&canvas),
            vec![Command::Circle {
                center: Point::new(12.5, -4.0),
                radius: 7.25,
                color: PackedColor(0x11223344),
                filled: true,
            }]
        );
    }

    #[test]
    fn test_every_kind_is_recorded_in_order() {
        let canvas = Canvas::detached();
        canvas.draw_circle(0.0, 0.0, 1.0, PackedColor::RED, false);
        canvas.draw_ellipse(0.0, 0.0, 2.0, 1.0, PackedColor::RED, true);
        canvas.draw_arc(0.0, 0.0, 5.0, 0.0, 90.0, PackedColor::RED);
        canvas.draw_polygon(
            &[Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)],
            PackedColor::RED,
            true,
        );
        canvas.draw_rect(1.0, 2.0, 3.0, 4.0, PackedColor::RED);
        canvas.draw_line(0.0, 0.0, 1.0, 1.0, PackedColor::RED);
        canvas.draw_text("hello", 3.0, 3.0, PackedColor::RED);

        let kinds: Vec<CommandKind> = drained(&canvas).iter().map(Command::kind).collect();
        assert_eq!(kinds, CommandKind::ALL.to_vec());
    }

    #[test]
    fn test_non_finite_input_is_dropped() {
        let canvas = Canvas::detached();
        canvas.draw_circle(f32::NAN, 0.0, 1.0, PackedColor::RED, false);
        canvas.draw_rect(0.0, 0.0, f32::INFINITY, 1.0, PackedColor::RED);
        canvas.draw_line(0.0, 0.0, 1.0, 1.0, PackedColor::RED);
        assert_eq!(canvas.command_count(), 1);
    }

    #[test]
    fn test_negative_radius_is_recorded() {
        let canvas = Canvas::detached();
        canvas.draw_circle(0.0, 0.0, -5.0, PackedColor::RED, false);
        assert_eq!(canvas.command_count(), 1);
    }

    #[test]
    fn test_busy_buffer_drops_command() {
        let canvas = Canvas::detached();
        let guard = canvas.buffer().borrow();
        assert_eq!(
            canvas.push_command(Command::Rect {
                rect: Rect::new(0.0, 0.0, 1.0, 1.0),
                color: PackedColor::RED,
            }),
            Err(CanvasError::BufferBusy)
        );
        canvas.draw_rect(0.0, 0.0, 1.0, 1.0, PackedColor::RED);
        drop(guard);
        assert_eq!(canvas.command_count(), 0);
    }

    #[test]
    fn test_long_polygon_is_truncated() {
        let canvas = Canvas::detached();
        let points: Vec<Point> = (0..(POLYGON_MAX_VERTICES + 5))
            .map(|i| Point::new(i as f32, 1.0))
            .collect();
        canvas.draw_polygon(&points, PackedColor::BLUE, false);

        match drained(&canvas).as_slice() {
            [Command::Polygon { vertices, .. }] => {
                assert_eq!(vertices.as_slice(), &points[..POLYGON_MAX_VERTICES])
            }
            other => panic!("unexpected commands: {other:?}"),
        }
    }

    #[test]
    fn test_clones_share_buffer() {
        let canvas = Canvas::detached();
        let mut other = canvas.clone();
        other.set_frame(CanvasFrame::from_bounds(Rect::new(5.0, 6.0, 7.0, 8.0)));
        other.draw_rect(0.0, 0.0, 1.0, 1.0, PackedColor::GREEN);

        assert!(canvas.shares_buffer(&other));
        assert_eq!(canvas.command_count(), 1);
        assert_eq!(other.offset(), Point::new(5.0, 6.0));
        assert_eq!(other.size(), Size::new(7.0, 8.0));
        assert_eq!(canvas.frame(), CanvasFrame::default());
    }
}
