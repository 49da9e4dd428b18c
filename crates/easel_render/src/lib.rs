//! Easel Renderer Dispatch
//!
//! Drains canvas command buffers into a 2D rendering backend.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │        PluginRegistry        │  handlers, renderers, bridges by slot
//! └──────────────┬───────────────┘
//!                │ render_component(slot, ..)
//!                ▼
//! ┌──────────────────────────────┐      ┌────────────────────┐
//! │        CanvasRenderer        │─────▶│   CallbackBridge   │ user drawing
//! │  bind → configure → invoke   │◀─────│  (records into the │
//! │         → drain              │      │   bound Canvas)    │
//! └──────────────┬───────────────┘      └────────────────────┘
//!                │ execute_command
//!                ▼
//! ┌──────────────────────────────┐
//! │        RenderBackend         │  lines, rects, geometry, text
//! └──────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use easel_core::{Canvas, PackedColor, Rect};
//! use easel_render::recording::RecordingBackend;
//! use easel_render::{BackendContext, CanvasRenderer, ComponentRef};
//!
//! let mut backend = RecordingBackend::new();
//! let mut renderer = CanvasRenderer::default();
//! let mut draw = |_: ComponentRef, canvas: &Canvas| {
//!     canvas.draw_circle(50.0, 50.0, 20.0, PackedColor::RED, false);
//! };
//!
//! let mut ctx = BackendContext::new(&mut backend);
//! let report = renderer.render_component(
//!     &mut ctx,
//!     ComponentRef::new(10, 1),
//!     Rect::new(0.0, 0.0, 100.0, 100.0),
//!     &mut draw,
//! );
//! assert_eq!(report.drawn, 1);
//! ```

pub mod backend;
pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod plugin;
pub mod recording;
pub mod registry;
pub mod tessellate;

pub use backend::{BackendContext, RenderBackend, Vertex};
pub use bridge::{CallbackBridge, ComponentRef};
pub use config::{CanvasConfig, FillStrategy, DEFAULT_COMPONENT_SLOT, MAX_SEGMENTS};
pub use dispatch::{execute_command, CanvasRenderer, Execution, PassReport, SkipReason};
pub use error::{ConfigError, PluginError, RegistryError, RenderError, RenderResult};
pub use plugin::{
    canvas_metadata, CanvasPlugin, CANVAS_CAPABILITIES, CANVAS_COMMAND_RANGE, CANVAS_PLUGIN_NAME,
};
pub use registry::{
    Capabilities, CommandHandler, CommandRange, ComponentRenderer, PluginMetadata, PluginRegistry,
};
