//! Draw command model
//!
//! A [`Command`] is one recorded drawing instruction. Every variant has a
//! fixed payload size: polygon vertices and text live in inline,
//! bounded storage so a command never owns heap memory and can be copied
//! freely out of the buffer while the buffer is reused.

use std::fmt;

use crate::color::PackedColor;
use crate::geometry::{Fp, Point, Rect};

/// Maximum number of vertices a polygon command can carry
pub const POLYGON_MAX_VERTICES: usize = 32;

/// Maximum number of UTF-8 bytes a text command can carry
pub const TEXT_CAPACITY: usize = 128;

// ─────────────────────────────────────────────────────────────────────────────
// Command kinds
// ─────────────────────────────────────────────────────────────────────────────

/// Kind tag of a canvas command
///
/// The discriminants are the numeric command IDs the canvas plugin claims
/// in the host registry. They form one contiguous range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum CommandKind {
    Circle = 0x0100,
    Ellipse = 0x0101,
    Arc = 0x0102,
    Polygon = 0x0103,
    Rect = 0x0104,
    Line = 0x0105,
    Text = 0x0106,
}

impl CommandKind {
    /// Every kind, in ID order
    pub const ALL: [CommandKind; 7] = [
        CommandKind::Circle,
        CommandKind::Ellipse,
        CommandKind::Arc,
        CommandKind::Polygon,
        CommandKind::Rect,
        CommandKind::Line,
        CommandKind::Text,
    ];

    /// First command ID of the canvas range
    pub const FIRST_ID: u16 = CommandKind::Circle as u16;
    /// Last command ID of the canvas range (inclusive)
    pub const LAST_ID: u16 = CommandKind::Text as u16;

    pub const fn id(self) -> u16 {
        self as u16
    }

    pub fn from_id(id: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    pub const fn name(self) -> &'static str {
        match self {
            CommandKind::Circle => "circle",
            CommandKind::Ellipse => "ellipse",
            CommandKind::Arc => "arc",
            CommandKind::Polygon => "polygon",
            CommandKind::Rect => "rect",
            CommandKind::Line => "line",
            CommandKind::Text => "text",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inline payload storage
// ─────────────────────────────────────────────────────────────────────────────

/// Fixed-capacity UTF-8 text stored inside a command
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct InlineText {
    bytes: [u8; TEXT_CAPACITY],
    len: u8,
}

impl InlineText {
    pub const EMPTY: InlineText = InlineText {
        bytes: [0; TEXT_CAPACITY],
        len: 0,
    };

    /// Copy `text`, truncating on a char boundary if it exceeds
    /// [`TEXT_CAPACITY`] bytes
    pub fn truncated(text: &str) -> Self {
        let mut end = text.len().min(TEXT_CAPACITY);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let mut bytes = [0; TEXT_CAPACITY];
        bytes[..end].copy_from_slice(&text.as_bytes()[..end]);
        Self {
            bytes,
            len: end as u8,
        }
    }

    /// Whether `text` fits without truncation
    pub fn fits(text: &str) -> bool {
        text.len() <= TEXT_CAPACITY
    }

    pub fn as_str(&self) -> &str {
        // Construction only ever stores whole chars
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for InlineText {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for InlineText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

/// Fixed-capacity polygon vertex list stored inside a command
#[derive(Clone, Copy, PartialEq)]
pub struct PolygonVertices {
    points: [Point; POLYGON_MAX_VERTICES],
    len: u8,
}

impl PolygonVertices {
    /// Copy `points`, keeping at most [`POLYGON_MAX_VERTICES`]
    pub fn truncated(points: &[Point]) -> Self {
        let len = points.len().min(POLYGON_MAX_VERTICES);
        let mut storage = [Point::ZERO; POLYGON_MAX_VERTICES];
        storage[..len].copy_from_slice(&points[..len]);
        Self {
            points: storage,
            len: len as u8,
        }
    }

    pub fn as_slice(&self) -> &[Point] {
        &self.points[..self.len as usize]
    }

    pub fn as_mut_slice(&mut self) -> &mut [Point] {
        &mut self.points[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for PolygonVertices {
    fn default() -> Self {
        Self::truncated(&[])
    }
}

impl fmt::Debug for PolygonVertices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command
// ─────────────────────────────────────────────────────────────────────────────

/// A single recorded canvas drawing instruction
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    Circle {
        center: Point,
        radius: Fp,
        color: PackedColor,
        filled: bool,
    },
    Ellipse {
        center: Point,
        rx: Fp,
        ry: Fp,
        color: PackedColor,
        filled: bool,
    },
    /// Angles are in degrees
    Arc {
        center: Point,
        radius: Fp,
        start_angle: Fp,
        end_angle: Fp,
        color: PackedColor,
    },
    Polygon {
        vertices: PolygonVertices,
        color: PackedColor,
        filled: bool,
    },
    Rect {
        rect: Rect,
        color: PackedColor,
    },
    Line {
        from: Point,
        to: Point,
        color: PackedColor,
    },
    Text {
        origin: Point,
        text: InlineText,
        color: PackedColor,
    },
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Circle { .. } => CommandKind::Circle,
            Command::Ellipse { .. } => CommandKind::Ellipse,
            Command::Arc { .. } => CommandKind::Arc,
            Command::Polygon { .. } => CommandKind::Polygon,
            Command::Rect { .. } => CommandKind::Rect,
            Command::Line { .. } => CommandKind::Line,
            Command::Text { .. } => CommandKind::Text,
        }
    }

    pub fn color(&self) -> PackedColor {
        match *self {
            Command::Circle { color, .. }
            | Command::Ellipse { color, .. }
            | Command::Arc { color, .. }
            | Command::Polygon { color, .. }
            | Command::Rect { color, .. }
            | Command::Line { color, .. }
            | Command::Text { color, .. } => color,
        }
    }

    /// True when every numeric field is finite
    pub fn is_finite(&self) -> bool {
        match self {
            Command::Circle { center, radius, .. } => center.is_finite() && radius.is_finite(),
            Command::Ellipse { center, rx, ry, .. } => {
                center.is_finite() && rx.is_finite() && ry.is_finite()
            }
            Command::Arc {
                center,
                radius,
                start_angle,
                end_angle,
                ..
            } => {
                center.is_finite()
                    && radius.is_finite()
                    && start_angle.is_finite()
                    && end_angle.is_finite()
            }
            Command::Polygon { vertices, .. } => vertices.as_slice().iter().all(Point::is_finite),
            Command::Rect { rect, .. } => {
                rect.origin.is_finite()
                    && rect.size.width.is_finite()
                    && rect.size.height.is_finite()
            }
            Command::Line { from, to, .. } => from.is_finite() && to.is_finite(),
            Command::Text { origin, .. } => origin.is_finite(),
        }
    }

    /// Copy of this command with every position moved by `offset`
    pub fn translated(&self, offset: Point) -> Command {
        let mut cmd = *self;
        match &mut cmd {
            Command::Circle { center, .. }
            | Command::Ellipse { center, .. }
            | Command::Arc { center, .. } => *center = center.offset(offset),
            Command::Polygon { vertices, .. } => {
                for point in vertices.as_mut_slice() {
                    *point = point.offset(offset);
                }
            }
            Command::Rect { rect, .. } => *rect = rect.offset(offset),
            Command::Line { from, to, .. } => {
                *from = from.offset(offset);
                *to = to.offset(offset);
            }
            Command::Text { origin, .. } => *origin = origin.offset(offset),
        }
        cmd
    }
}
