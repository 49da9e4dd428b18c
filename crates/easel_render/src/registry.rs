//! Plugin registry
//!
//! The host side of the plugin contract. Plugins claim a contiguous range
//! of command IDs, then register handlers for IDs inside it, component
//! renderers and callback bridges keyed by component slot, and the backend
//! capabilities they provide.
//!
//! The registry is owned by the host and passed explicitly; it is not a
//! global.

use std::fmt;

use easel_core::{Command, Rect};
use rustc_hash::FxHashMap;

use crate::backend::{BackendContext, RenderBackend};
use crate::bridge::{CallbackBridge, ComponentRef};
use crate::dispatch::PassReport;
use crate::error::{RegistryError, RenderResult};

// ============================================================================
// Metadata
// ============================================================================

/// Inclusive range of command IDs claimed by a plugin
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CommandRange {
    start: u16,
    end: u16,
}

impl CommandRange {
    pub fn new(start: u16, end: u16) -> Result<Self, RegistryError> {
        if start > end {
            return Err(RegistryError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub(crate) const fn from_bounds(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    pub fn contains(&self, id: u16) -> bool {
        (self.start..=self.end).contains(&id)
    }

    pub fn overlaps(&self, other: &CommandRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for CommandRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}..={:#06x}", self.start, self.end)
    }
}

/// Backend feature flags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub shapes_2d: bool,
    pub transforms: bool,
    pub hardware_accelerated: bool,
    pub blend_modes: bool,
    pub antialiasing: bool,
    pub gradients: bool,
    pub text: bool,
    pub rendering_3d: bool,
}

/// Plugin identity and claims
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginMetadata {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Oldest host version the plugin works with
    pub host_version_min: String,
    pub command_range: CommandRange,
    pub required_capabilities: Capabilities,
}

// ============================================================================
// Registry
// ============================================================================

/// Executes one command kind
pub type CommandHandler<B> =
    Box<dyn Fn(&mut BackendContext<'_, B>, &Command) -> RenderResult<()>>;

/// Runs a full draw pass for one component
pub type ComponentRenderer<B> = Box<
    dyn FnMut(&mut BackendContext<'_, B>, ComponentRef, Rect, &mut dyn CallbackBridge) -> PassReport,
>;

/// Host registry of plugins and their handlers
pub struct PluginRegistry<B: RenderBackend> {
    plugins: FxHashMap<String, PluginMetadata>,
    handlers: FxHashMap<u16, CommandHandler<B>>,
    renderers: FxHashMap<u32, ComponentRenderer<B>>,
    bridges: FxHashMap<u32, Box<dyn CallbackBridge>>,
    capabilities: Option<Capabilities>,
}

impl<B: RenderBackend> Default for PluginRegistry<B> {
    fn default() -> Self {
        Self {
            plugins: FxHashMap::default(),
            handlers: FxHashMap::default(),
            renderers: FxHashMap::default(),
            bridges: FxHashMap::default(),
            capabilities: None,
        }
    }
}

impl<B: RenderBackend> PluginRegistry<B> {
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Plugins
    // ─────────────────────────────────────────────────────────────────────────

    /// Register plugin metadata, claiming its command range
    pub fn register_plugin(&mut self, metadata: PluginMetadata) -> Result<(), RegistryError> {
        if self.plugins.contains_key(&metadata.name) {
            return Err(RegistryError::DuplicatePlugin(metadata.name));
        }
        if let Some(other) = self
            .plugins
            .values()
            .find(|other| other.command_range.overlaps(&metadata.command_range))
        {
            return Err(RegistryError::RangeOverlap {
                plugin: metadata.name,
                range: metadata.command_range,
                other: other.name.clone(),
                other_range: other.command_range,
            });
        }

        tracing::debug!(
            plugin = %metadata.name,
            version = %metadata.version,
            range = %metadata.command_range,
            "registered plugin"
        );
        self.plugins.insert(metadata.name.clone(), metadata);
        Ok(())
    }

    pub fn unregister_plugin(&mut self, name: &str) -> bool {
        self.plugins.remove(name).is_some()
    }

    pub fn plugin(&self, name: &str) -> Option<&PluginMetadata> {
        self.plugins.get(name)
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Command handlers
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a handler for `id`, which must lie in a claimed range
    pub fn register_handler(
        &mut self,
        id: u16,
        handler: CommandHandler<B>,
    ) -> Result<(), RegistryError> {
        if !self
            .plugins
            .values()
            .any(|plugin| plugin.command_range.contains(id))
        {
            return Err(RegistryError::UnclaimedCommand(id));
        }
        if self.handlers.contains_key(&id) {
            return Err(RegistryError::DuplicateHandler(id));
        }
        self.handlers.insert(id, handler);
        Ok(())
    }

    pub fn unregister_handler(&mut self, id: u16) -> bool {
        self.handlers.remove(&id).is_some()
    }

    pub fn has_handler(&self, id: u16) -> bool {
        self.handlers.contains_key(&id)
    }

    /// Route `command` to the handler for its kind
    ///
    /// Returns `Ok(false)` when no handler is registered.
    pub fn dispatch_command(
        &self,
        ctx: &mut BackendContext<'_, B>,
        command: &Command,
    ) -> RenderResult<bool> {
        match self.handlers.get(&command.kind().id()) {
            Some(handler) => handler(ctx, command).map(|()| true),
            None => Ok(false),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Component renderers and bridges
    // ─────────────────────────────────────────────────────────────────────────

    pub fn register_component_renderer(
        &mut self,
        slot: u32,
        renderer: ComponentRenderer<B>,
    ) -> Result<(), RegistryError> {
        if self.renderers.contains_key(&slot) {
            return Err(RegistryError::DuplicateRenderer(slot));
        }
        self.renderers.insert(slot, renderer);
        Ok(())
    }

    pub fn unregister_component_renderer(&mut self, slot: u32) -> bool {
        self.renderers.remove(&slot).is_some()
    }

    pub fn has_component_renderer(&self, slot: u32) -> bool {
        self.renderers.contains_key(&slot)
    }

    pub fn register_callback_bridge(
        &mut self,
        slot: u32,
        bridge: Box<dyn CallbackBridge>,
    ) -> Result<(), RegistryError> {
        if self.bridges.contains_key(&slot) {
            return Err(RegistryError::DuplicateBridge(slot));
        }
        self.bridges.insert(slot, bridge);
        Ok(())
    }

    pub fn unregister_callback_bridge(&mut self, slot: u32) -> bool {
        self.bridges.remove(&slot).is_some()
    }

    pub fn has_callback_bridge(&self, slot: u32) -> bool {
        self.bridges.contains_key(&slot)
    }

    /// Run the slot's renderer with the slot's bridge
    pub fn render_component(
        &mut self,
        slot: u32,
        ctx: &mut BackendContext<'_, B>,
        component: ComponentRef,
        bounds: Rect,
    ) -> Result<PassReport, RegistryError> {
        let renderer = self
            .renderers
            .get_mut(&slot)
            .ok_or(RegistryError::MissingRenderer(slot))?;
        let bridge = self
            .bridges
            .get_mut(&slot)
            .ok_or(RegistryError::MissingBridge(slot))?;
        Ok(renderer(ctx, component, bounds, bridge.as_mut()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Capabilities
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_capabilities(&mut self, capabilities: Capabilities) {
        self.capabilities = Some(capabilities);
    }

    pub fn clear_capabilities(&mut self) -> bool {
        self.capabilities.take().is_some()
    }

    pub fn capabilities(&self) -> Option<Capabilities> {
        self.capabilities
    }
}
