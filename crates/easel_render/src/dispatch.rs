//! Renderer dispatch - the per-component draw pass
//!
//! [`CanvasRenderer`] runs one pass per component per frame:
//!
//! ```text
//! bind      reuse (clear) or create the command buffer, bind it as current
//! configure frame the canvas to the component's on-screen bounds
//! invoke    hand the canvas to user drawing code through the bridge
//! drain     iterate the buffer and execute every command on the backend
//! ```
//!
//! Commands are executed independently. A command that cannot be drawn
//! (missing font, missing white texture, backend error, scratch allocation
//! failure) is skipped with a diagnostic and the pass moves on. Every
//! routine sets the draw color itself, so a skipped command never leaves
//! stale color state for the next one.

use std::cell::RefCell;
use std::rc::Rc;

use easel_core::current;
use easel_core::{
    Canvas, CanvasFrame, Command, CommandBuffer, Fp, PackedColor, Point, Rect, SharedBuffer,
};
use smallvec::SmallVec;

use crate::backend::{BackendContext, RenderBackend, Vertex};
use crate::bridge::{CallbackBridge, ComponentRef};
use crate::config::{CanvasConfig, FillStrategy};
use crate::error::{RenderError, RenderResult};
use crate::tessellate::{
    arc_polyline, closed_polyline, ellipse_outline, ellipse_wedges, fan_indices,
};

/// Why a command was not drawn
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Text command with no font bound
    NoFont,
    /// Filled polygon with no white texture bound
    NoWhiteTexture,
    /// Polygon with too few vertices to draw
    DegeneratePolygon,
}

/// Result of executing one command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Execution {
    Drawn,
    /// Filled circle or ellipse drawn as stroked wedge outlines
    ApproximatedFill,
    Skipped(SkipReason),
}

/// Per-pass counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Commands found in the buffer
    pub recorded: usize,
    pub drawn: usize,
    pub approximated: usize,
    pub skipped: usize,
    /// Commands dropped because of a backend or allocation error
    pub failed: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Per-command execution
// ─────────────────────────────────────────────────────────────────────────────

fn apply_color<B: RenderBackend>(renderer: &mut B, color: PackedColor) {
    let [r, g, b, a] = color.channels();
    renderer.set_draw_color(r, g, b, a);
}

fn colored_vertices(
    points: impl Iterator<Item = Point>,
    count: usize,
    color: PackedColor,
) -> RenderResult<SmallVec<[Vertex; 128]>> {
    let mut vertices = SmallVec::new();
    vertices
        .try_reserve_exact(count)
        .map_err(|_| RenderError::Allocation {
            what: "vertices",
            count,
        })?;
    let rgba = color.to_f32_array();
    vertices.extend(points.map(|p| Vertex::new(p, rgba)));
    Ok(vertices)
}

fn execute_ellipse<B: RenderBackend>(
    ctx: &mut BackendContext<'_, B>,
    config: &CanvasConfig,
    center: Point,
    (rx, ry): (Fp, Fp),
    color: PackedColor,
    filled: bool,
) -> RenderResult<Execution> {
    apply_color(ctx.renderer, color);
    let segments = config.circle_segments;

    if !filled {
        let points = ellipse_outline(center, rx, ry, segments)?;
        ctx.renderer.draw_lines(&points)?;
        return Ok(Execution::Drawn);
    }

    match (config.fill_strategy, ctx.white_texture) {
        (FillStrategy::Geometry, Some(white)) => {
            let ring = ellipse_outline(center, rx, ry, segments)?;
            let vertices = colored_vertices(
                std::iter::once(center).chain(ring.iter().copied()),
                ring.len() + 1,
                color,
            )?;
            let indices = fan_indices(vertices.len())?;
            ctx.renderer
                .render_geometry(Some(white), &vertices, &indices)?;
            Ok(Execution::Drawn)
        }
        _ => {
            for wedge in ellipse_wedges(center, rx, ry, segments)? {
                ctx.renderer.draw_lines(&wedge)?;
            }
            Ok(Execution::ApproximatedFill)
        }
    }
}

fn execute_polygon<B: RenderBackend>(
    ctx: &mut BackendContext<'_, B>,
    points: &[Point],
    color: PackedColor,
    filled: bool,
) -> RenderResult<Execution> {
    if !filled {
        if points.len() < 2 {
            return Ok(Execution::Skipped(SkipReason::DegeneratePolygon));
        }
        apply_color(ctx.renderer, color);
        let outline = closed_polyline(points)?;
        ctx.renderer.draw_lines(&outline)?;
        return Ok(Execution::Drawn);
    }

    if points.len() < 3 {
        return Ok(Execution::Skipped(SkipReason::DegeneratePolygon));
    }
    let Some(white) = ctx.white_texture else {
        tracing::warn!("no white texture bound, skipping filled polygon");
        return Ok(Execution::Skipped(SkipReason::NoWhiteTexture));
    };

    apply_color(ctx.renderer, color);
    let vertices = colored_vertices(points.iter().copied(), points.len(), color)?;
    let indices = fan_indices(points.len())?;
    ctx.renderer
        .render_geometry(Some(white), &vertices, &indices)?;
    Ok(Execution::Drawn)
}

fn execute_text<B: RenderBackend>(
    ctx: &mut BackendContext<'_, B>,
    origin: Point,
    text: &str,
    color: PackedColor,
) -> RenderResult<Execution> {
    let Some(font) = ctx.font else {
        return Ok(Execution::Skipped(SkipReason::NoFont));
    };

    apply_color(ctx.renderer, color);
    let surface = ctx.renderer.render_text(font, text, color.channels())?;
    let texture = match ctx.renderer.create_texture_from_surface(&surface) {
        Ok(texture) => texture,
        Err(err) => {
            ctx.renderer.release_surface(surface);
            return Err(err);
        }
    };

    let dst = Rect::from_origin_size(origin, ctx.renderer.surface_size(&surface));
    let blit = ctx.renderer.render_texture(&texture, None, dst);

    // Transient: never cached across commands
    ctx.renderer.release_texture(texture);
    ctx.renderer.release_surface(surface);

    blit.map(|()| Execution::Drawn)
}

/// Execute one command against the backend
///
/// Positions are used as given; the caller applies any frame offset.
pub fn execute_command<B: RenderBackend>(
    ctx: &mut BackendContext<'_, B>,
    config: &CanvasConfig,
    command: &Command,
) -> RenderResult<Execution> {
    match *command {
        Command::Circle {
            center,
            radius,
            color,
            filled,
        } => execute_ellipse(ctx, config, center, (radius, radius), color, filled),
        Command::Ellipse {
            center,
            rx,
            ry,
            color,
            filled,
        } => execute_ellipse(ctx, config, center, (rx, ry), color, filled),
        Command::Arc {
            center,
            radius,
            start_angle,
            end_angle,
            color,
        } => {
            apply_color(ctx.renderer, color);
            let points = arc_polyline(center, radius, start_angle, end_angle, config.arc_segments)?;
            ctx.renderer.draw_lines(&points)?;
            Ok(Execution::Drawn)
        }
        Command::Polygon {
            ref vertices,
            color,
            filled,
        } => execute_polygon(ctx, vertices.as_slice(), color, filled),
        Command::Rect { rect, color } => {
            apply_color(ctx.renderer, color);
            ctx.renderer.fill_rect(rect)?;
            Ok(Execution::Drawn)
        }
        Command::Line { from, to, color } => {
            apply_color(ctx.renderer, color);
            ctx.renderer.draw_line(from, to)?;
            Ok(Execution::Drawn)
        }
        Command::Text {
            origin,
            ref text,
            color,
        } => execute_text(ctx, origin, text.as_str(), color),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CanvasRenderer
// ─────────────────────────────────────────────────────────────────────────────

/// Component renderer owning the reusable command buffer
pub struct CanvasRenderer {
    config: CanvasConfig,
    buffer: Option<SharedBuffer>,
    fill_fallback_reported: bool,
}

impl CanvasRenderer {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            config,
            buffer: None,
            fill_fallback_reported: false,
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// The reusable buffer, once the first pass has created it
    pub fn buffer(&self) -> Option<&SharedBuffer> {
        self.buffer.as_ref()
    }

    /// Create the buffer on first use, otherwise clear it for reuse
    fn prepare_buffer(&mut self) -> SharedBuffer {
        if let Some(buffer) = &self.buffer {
            match buffer.try_borrow_mut() {
                Ok(mut commands) => {
                    commands.clear();
                    return buffer.clone();
                }
                Err(_) => {
                    tracing::warn!("canvas command buffer still borrowed, allocating a new one")
                }
            }
        }
        let buffer = Rc::new(RefCell::new(CommandBuffer::new()));
        tracing::debug!("initialized canvas command buffer");
        self.buffer = Some(buffer.clone());
        buffer
    }

    /// Run one full draw pass for `component`
    pub fn render_component<B: RenderBackend>(
        &mut self,
        ctx: &mut BackendContext<'_, B>,
        component: ComponentRef,
        bounds: Rect,
        bridge: &mut dyn CallbackBridge,
    ) -> PassReport {
        let _span = tracing::debug_span!("canvas_pass", %component).entered();

        let buffer = self.prepare_buffer();
        let canvas = Canvas::new(buffer.clone(), CanvasFrame::from_bounds(bounds));
        {
            let _binding = current::bind(canvas.clone());
            bridge.invoke(component, &canvas);
        }

        let Ok(commands) = buffer.try_borrow() else {
            tracing::warn!("canvas command buffer unavailable, skipping pass");
            return PassReport::default();
        };
        let report = self.drain(ctx, &commands, canvas.offset());
        tracing::debug!(?report, "canvas pass complete");
        report
    }

    /// Execute every command in `buffer`, translated by `offset`
    pub fn drain<B: RenderBackend>(
        &mut self,
        ctx: &mut BackendContext<'_, B>,
        buffer: &CommandBuffer,
        offset: Point,
    ) -> PassReport {
        let mut report = PassReport {
            recorded: buffer.len(),
            ..PassReport::default()
        };

        for command in buffer.iter() {
            let command = if offset == Point::ZERO {
                command
            } else {
                command.translated(offset)
            };

            match execute_command(ctx, &self.config, &command) {
                Ok(Execution::Drawn) => report.drawn += 1,
                Ok(Execution::ApproximatedFill) => {
                    report.approximated += 1;
                    self.report_fill_fallback();
                }
                Ok(Execution::Skipped(reason)) => {
                    report.skipped += 1;
                    tracing::trace!(kind = %command.kind(), ?reason, "skipped canvas command");
                }
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(kind = %command.kind(), error = %err, "canvas command failed");
                }
            }
        }
        report
    }

    fn report_fill_fallback(&mut self) {
        if self.fill_fallback_reported {
            return;
        }
        self.fill_fallback_reported = true;
        match self.config.fill_strategy {
            FillStrategy::Geometry => tracing::warn!(
                "no white texture bound, filled circles and ellipses are drawn as wedge outlines"
            ),
            FillStrategy::WedgeOutlines => {
                tracing::debug!("filled circles and ellipses are drawn as wedge outlines")
            }
        }
    }
}

impl Default for CanvasRenderer {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}
