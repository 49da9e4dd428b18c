//! Scene files
//!
//! A scene is a TOML document describing one canvas and the draw calls to
//! replay into it:
//!
//! ```toml
//! [canvas]
//! width = 320
//! height = 240
//! background = "#ffffff"
//!
//! [[draw]]
//! kind = "circle"
//! cx = 60.0
//! cy = 60.0
//! radius = 40.0
//! color = "#ff0000"
//! filled = true
//!
//! [[draw]]
//! kind = "text"
//! text = "hello"
//! x = 10.0
//! y = 200.0
//! color = 0x000000FF
//! ```
//!
//! Colors are `#RRGGBB`, `#RRGGBBAA`, or a packed `0xRRGGBBAA` integer.

use anyhow::{Context, Result};
use easel_core::{Canvas, PackedColor, Point, Rect};
use easel_render::{CallbackBridge, ComponentRef};
use serde::Deserialize;
use std::fs;
use std::path::Path;

// =============================================================================
// Colors
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Packed(u32),
    Hex(String),
}

/// Color as written in a scene file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "ColorRepr")]
pub struct SceneColor(pub PackedColor);

impl TryFrom<ColorRepr> for SceneColor {
    type Error = String;

    fn try_from(repr: ColorRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            ColorRepr::Packed(value) => Ok(SceneColor(PackedColor(value))),
            ColorRepr::Hex(text) => parse_hex(&text).map(SceneColor),
        }
    }
}

fn parse_hex(text: &str) -> std::result::Result<PackedColor, String> {
    let digits = text.strip_prefix('#').unwrap_or(text);
    let value = u32::from_str_radix(digits, 16)
        .map_err(|_| format!("invalid color '{text}'"))?;
    match digits.len() {
        6 => Ok(PackedColor((value << 8) | 0xFF)),
        8 => Ok(PackedColor(value)),
        _ => Err(format!("invalid color '{text}': expected #RRGGBB or #RRGGBBAA")),
    }
}

// =============================================================================
// Scene
// =============================================================================

fn default_width() -> u32 {
    400
}

fn default_height() -> u32 {
    300
}

/// `[canvas]` section
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanvasSection {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub background: Option<SceneColor>,
    /// Component bounds `[x, y, width, height]`; the whole image if unset
    #[serde(default)]
    pub bounds: Option<[f32; 4]>,
}

impl Default for CanvasSection {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            background: None,
            bounds: None,
        }
    }
}

impl CanvasSection {
    /// Component bounds within an image of `width` x `height`
    pub fn bounds_in(&self, width: u32, height: u32) -> Rect {
        match self.bounds {
            Some([x, y, w, h]) => Rect::new(x, y, w, h),
            None => Rect::new(0.0, 0.0, width as f32, height as f32),
        }
    }
}

/// One `[[draw]]` entry
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum DrawOp {
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        color: SceneColor,
        #[serde(default)]
        filled: bool,
    },
    Ellipse {
        cx: f32,
        cy: f32,
        rx: f32,
        ry: f32,
        color: SceneColor,
        #[serde(default)]
        filled: bool,
    },
    Arc {
        cx: f32,
        cy: f32,
        radius: f32,
        start: f32,
        end: f32,
        color: SceneColor,
    },
    Polygon {
        points: Vec<[f32; 2]>,
        color: SceneColor,
        #[serde(default)]
        filled: bool,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: SceneColor,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: SceneColor,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        color: SceneColor,
    },
}

impl DrawOp {
    /// Issue this draw call on `canvas`
    pub fn apply(&self, canvas: &Canvas) {
        match self {
            DrawOp::Circle {
                cx,
                cy,
                radius,
                color,
                filled,
            } => canvas.draw_circle(*cx, *cy, *radius, color.0, *filled),
            DrawOp::Ellipse {
                cx,
                cy,
                rx,
                ry,
                color,
                filled,
            } => canvas.draw_ellipse(*cx, *cy, *rx, *ry, color.0, *filled),
            DrawOp::Arc {
                cx,
                cy,
                radius,
                start,
                end,
                color,
            } => canvas.draw_arc(*cx, *cy, *radius, *start, *end, color.0),
            DrawOp::Polygon {
                points,
                color,
                filled,
            } => {
                let vertices: Vec<Point> = points.iter().map(|&[x, y]| Point::new(x, y)).collect();
                canvas.draw_polygon(&vertices, color.0, *filled)
            }
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                color,
            } => canvas.draw_rect(*x, *y, *width, *height, color.0),
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                color,
            } => canvas.draw_line(*x1, *y1, *x2, *y2, color.0),
            DrawOp::Text { text, x, y, color } => canvas.draw_text(text, *x, *y, color.0),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, DrawOp::Text { .. })
    }
}

/// A parsed scene file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    #[serde(default)]
    pub canvas: CanvasSection,
    #[serde(default)]
    pub draw: Vec<DrawOp>,
}

impl Scene {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse scene")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene {}", path.display()))?;
        Self::from_toml_str(&source).with_context(|| format!("In {}", path.display()))
    }

    pub fn has_text(&self) -> bool {
        self.draw.iter().any(DrawOp::is_text)
    }
}

// =============================================================================
// Bridge
// =============================================================================

/// Callback bridge that replays a scene's draw calls every pass
pub struct SceneBridge {
    ops: Vec<DrawOp>,
}

impl SceneBridge {
    pub fn new(ops: Vec<DrawOp>) -> Self {
        Self { ops }
    }
}

impl CallbackBridge for SceneBridge {
    fn invoke(&mut self, component: ComponentRef, canvas: &Canvas) {
        tracing::debug!(%component, ops = self.ops.len(), "replaying scene");
        for op in &self.ops {
            op.apply(canvas);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::Command;

    const SAMPLE: &str = r##"
        [canvas]
        width = 200
        height = 100
        background = "#ffffff"

        [[draw]]
        kind = "circle"
        cx = 50.0
        cy = 50.0
        radius = 20.0
        color = "#ff0000"
        filled = true

        [[draw]]
        kind = "polygon"
        points = [[0.0, 0.0], [10.0, 0.0], [5.0, 8.0]]
        color = 0x00FF00FF

        [[draw]]
        kind = "text"
        text = "hi"
        x = 1.0
        y = 2.0
        color = "#00000080"
    "##;

    #[test]
    fn test_parse_sample() {
        let scene = Scene::from_toml_str(SAMPLE).unwrap();
        assert_eq!(scene.canvas.width, 200);
        assert_eq!(scene.canvas.background, Some(SceneColor(PackedColor::WHITE)));
        assert_eq!(scene.draw.len(), 3);
        assert!(scene.has_text());
        assert_eq!(
            scene.draw[0],
            DrawOp::Circle {
                cx: 50.0,
                cy: 50.0,
                radius: 20.0,
                color: SceneColor(PackedColor::RED),
                filled: true,
            }
        );
        assert!(matches!(
            &scene.draw[1],
            DrawOp::Polygon { filled: false, color, .. } if color.0 == PackedColor::GREEN
        ));
        assert!(matches!(
            &scene.draw[2],
            DrawOp::Text { color, .. } if color.0 == PackedColor(0x00000080)
        ));
    }

    #[test]
    fn test_defaults() {
        let scene = Scene::from_toml_str("").unwrap();
        assert_eq!(scene.canvas.width, 400);
        assert_eq!(scene.canvas.height, 300);
        assert!(scene.draw.is_empty());
        assert_eq!(
            scene.canvas.bounds_in(400, 300),
            Rect::new(0.0, 0.0, 400.0, 300.0)
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Scene::from_toml_str("[[draw]]\nkind = \"star\"").is_err());
        assert!(Scene::from_toml_str(
            "[[draw]]\nkind = \"line\"\nx1 = 0.0\ny1 = 0.0\nx2 = 1.0\ny2 = 1.0\ncolor = \"#12\""
        )
        .is_err());
        assert!(Scene::from_toml_str("[canvas]\ndepth = 3").is_err());
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#0000ff"), Ok(PackedColor::BLUE));
        assert_eq!(parse_hex("11223344"), Ok(PackedColor(0x11223344)));
        assert!(parse_hex("#zzzzzz").is_err());
    }

    #[test]
    fn test_bridge_replays_ops() {
        let scene = Scene::from_toml_str(SAMPLE).unwrap();
        let mut bridge = SceneBridge::new(scene.draw);
        let canvas = Canvas::detached();

        bridge.invoke(ComponentRef::new(10, 1), &canvas);
        assert_eq!(canvas.command_count(), 3);

        let buffer = canvas.buffer().borrow();
        match buffer.as_slice()[1] {
            Command::Polygon { ref vertices, .. } => {
                assert_eq!(vertices.as_slice()[2], Point::new(5.0, 8.0))
            }
            ref other => panic!("unexpected command {other:?}"),
        }
    }
}
