//! Canvas plugin lifecycle
//!
//! [`CanvasPlugin::init`] wires the canvas into a [`PluginRegistry`]:
//! metadata claiming the canvas command range, one handler per command
//! kind, the component renderer and the callback bridge for the
//! configured slot, then the capability descriptor. Activation is
//! all-or-nothing: if any step fails, the steps that already succeeded
//! are unregistered before the error is returned.

use easel_core::{Command, CommandKind};
use smallvec::SmallVec;

use crate::backend::{BackendContext, RenderBackend};
use crate::bridge::{CallbackBridge, ComponentRef};
use crate::config::CanvasConfig;
use crate::dispatch::{execute_command, CanvasRenderer, Execution};
use crate::error::{PluginError, RegistryError};
use crate::registry::{Capabilities, CommandHandler, CommandRange, PluginMetadata, PluginRegistry};

/// Registry name of the canvas plugin
pub const CANVAS_PLUGIN_NAME: &str = "canvas";

/// Command IDs claimed by the canvas
pub const CANVAS_COMMAND_RANGE: CommandRange =
    CommandRange::from_bounds(CommandKind::FIRST_ID, CommandKind::LAST_ID);

/// Capabilities advertised once the canvas is active
pub const CANVAS_CAPABILITIES: Capabilities = Capabilities {
    shapes_2d: true,
    transforms: false,
    hardware_accelerated: true,
    blend_modes: true,
    antialiasing: true,
    gradients: false,
    text: true,
    rendering_3d: false,
};

pub fn canvas_metadata() -> PluginMetadata {
    PluginMetadata {
        name: CANVAS_PLUGIN_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Immediate-mode 2D canvas drawing".to_string(),
        host_version_min: "0.1.0".to_string(),
        command_range: CANVAS_COMMAND_RANGE,
        required_capabilities: Capabilities {
            shapes_2d: true,
            ..Capabilities::default()
        },
    }
}

#[derive(Clone, Copy, Debug)]
enum Step {
    Plugin,
    Handler(u16),
    Renderer,
    Bridge,
}

fn command_handler<B: RenderBackend + 'static>(config: CanvasConfig) -> CommandHandler<B> {
    Box::new(move |ctx: &mut BackendContext<'_, B>, command: &Command| {
        if let Execution::Skipped(reason) = execute_command(ctx, &config, command)? {
            tracing::trace!(kind = %command.kind(), ?reason, "skipped canvas command");
        }
        Ok(())
    })
}

/// The canvas plugin
#[derive(Clone, Debug, Default)]
pub struct CanvasPlugin {
    config: CanvasConfig,
}

impl CanvasPlugin {
    pub fn new(config: CanvasConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn slot(&self) -> u32 {
        self.config.component_slot
    }

    /// Register the canvas with `registry`
    ///
    /// On error nothing registered by this call remains in the registry.
    pub fn init<B: RenderBackend + 'static>(
        &self,
        registry: &mut PluginRegistry<B>,
        bridge: Box<dyn CallbackBridge>,
    ) -> Result<(), PluginError> {
        let mut done: SmallVec<[Step; 16]> = SmallVec::new();

        if let Err(err) = self.register_all(registry, bridge, &mut done) {
            for step in done.iter().rev() {
                self.undo(registry, *step);
            }
            tracing::warn!(error = %err, rolled_back = done.len(), "canvas plugin init failed");
            return Err(err);
        }

        tracing::info!(
            slot = self.slot(),
            range = %CANVAS_COMMAND_RANGE,
            "canvas plugin initialized"
        );
        Ok(())
    }

    fn register_all<B: RenderBackend + 'static>(
        &self,
        registry: &mut PluginRegistry<B>,
        bridge: Box<dyn CallbackBridge>,
        done: &mut SmallVec<[Step; 16]>,
    ) -> Result<(), PluginError> {
        let fail = |step: &str| {
            let step = step.to_string();
            move |source: RegistryError| PluginError { step, source }
        };

        registry
            .register_plugin(canvas_metadata())
            .map_err(fail("plugin metadata"))?;
        done.push(Step::Plugin);

        for kind in CommandKind::ALL {
            registry
                .register_handler(kind.id(), command_handler(self.config.clone()))
                .map_err(fail(&format!("{kind} handler")))?;
            done.push(Step::Handler(kind.id()));
        }

        let mut renderer = CanvasRenderer::new(self.config.clone());
        registry
            .register_component_renderer(
                self.slot(),
                Box::new(
                    move |ctx: &mut BackendContext<'_, B>,
                          component: ComponentRef,
                          bounds,
                          bridge: &mut dyn CallbackBridge| {
                        renderer.render_component(ctx, component, bounds, bridge)
                    },
                ),
            )
            .map_err(fail("component renderer"))?;
        done.push(Step::Renderer);

        registry
            .register_callback_bridge(self.slot(), bridge)
            .map_err(fail("callback bridge"))?;
        done.push(Step::Bridge);

        registry.set_capabilities(CANVAS_CAPABILITIES);
        Ok(())
    }

    fn undo<B: RenderBackend>(&self, registry: &mut PluginRegistry<B>, step: Step) {
        match step {
            Step::Plugin => {
                registry.unregister_plugin(CANVAS_PLUGIN_NAME);
            }
            Step::Handler(id) => {
                registry.unregister_handler(id);
            }
            Step::Renderer => {
                registry.unregister_component_renderer(self.slot());
            }
            Step::Bridge => {
                registry.unregister_callback_bridge(self.slot());
            }
        }
    }

    /// Reverse every registration made by [`CanvasPlugin::init`]
    pub fn shutdown<B: RenderBackend>(&self, registry: &mut PluginRegistry<B>) {
        registry.clear_capabilities();
        registry.unregister_callback_bridge(self.slot());
        registry.unregister_component_renderer(self.slot());
        for kind in CommandKind::ALL {
            registry.unregister_handler(kind.id());
        }
        registry.unregister_plugin(CANVAS_PLUGIN_NAME);
        tracing::info!("canvas plugin shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{BackendCall, RecordingBackend};
    use easel_core::{Canvas, PackedColor, Rect};

    type Registry = PluginRegistry<RecordingBackend>;

    fn drawing_bridge() -> Box<dyn CallbackBridge> {
        Box::new(|_: ComponentRef, canvas: &Canvas| {
            canvas.draw_rect(1.0, 2.0, 3.0, 4.0, PackedColor::RED);
        })
    }

    fn assert_nothing_from_canvas(registry: &Registry, slot: u32) {
        assert!(registry.plugin(CANVAS_PLUGIN_NAME).is_none());
        assert!(CommandKind::ALL.iter().all(|k| !registry.has_handler(k.id())));
        assert!(!registry.has_component_renderer(slot));
        assert_eq!(registry.capabilities(), None);
    }

    #[test]
    fn test_metadata() {
        let metadata = canvas_metadata();
        assert_eq!(metadata.command_range.start(), 0x0100);
        assert_eq!(metadata.command_range.end(), 0x0106);
        assert!(CANVAS_CAPABILITIES.text);
        assert!(!CANVAS_CAPABILITIES.rendering_3d);
    }

    #[test]
    fn test_init_registers_everything() {
        let mut registry = Registry::new();
        let plugin = CanvasPlugin::default();
        plugin.init(&mut registry, drawing_bridge()).unwrap();

        assert!(registry.plugin(CANVAS_PLUGIN_NAME).is_some());
        assert!(CommandKind::ALL.iter().all(|k| registry.has_handler(k.id())));
        assert!(registry.has_component_renderer(10));
        assert!(registry.has_callback_bridge(10));
        assert_eq!(registry.capabilities(), Some(CANVAS_CAPABILITIES));
    }

    #[test]
    fn test_registered_pass_draws_through_bridge() {
        let mut registry = Registry::new();
        CanvasPlugin::default()
            .init(&mut registry, drawing_bridge())
            .unwrap();

        let mut backend = RecordingBackend::new();
        let report = {
            let mut ctx = BackendContext::new(&mut backend);
            registry
                .render_component(
                    10,
                    &mut ctx,
                    ComponentRef::new(10, 1),
                    Rect::new(10.0, 10.0, 50.0, 50.0),
                )
                .unwrap()
        };
        assert_eq!(report.drawn, 1);
        assert_eq!(
            backend.calls().last(),
            Some(&BackendCall::FillRect(Rect::new(11.0, 12.0, 3.0, 4.0)))
        );
    }

    #[test]
    fn test_handlers_execute_commands() {
        let mut registry = Registry::new();
        CanvasPlugin::default()
            .init(&mut registry, drawing_bridge())
            .unwrap();

        let mut backend = RecordingBackend::new();
        let mut ctx = BackendContext::new(&mut backend);
        let command = Command::Rect {
            rect: Rect::new(0.0, 0.0, 2.0, 2.0),
            color: PackedColor::GREEN,
        };
        assert_eq!(registry.dispatch_command(&mut ctx, &command), Ok(true));
    }

    #[test]
    fn test_failed_init_rolls_back() {
        let mut registry = Registry::new();
        registry
            .register_callback_bridge(10, Box::new(|_: ComponentRef, _: &Canvas| {}))
            .unwrap();

        let err = CanvasPlugin::default()
            .init(&mut registry, drawing_bridge())
            .unwrap_err();
        assert_eq!(err.step, "callback bridge");
        assert_eq!(err.source, RegistryError::DuplicateBridge(10));

        assert_nothing_from_canvas(&registry, 10);
        // The pre-existing bridge is not ours to remove
        assert!(registry.has_callback_bridge(10));
    }

    #[test]
    fn test_overlapping_plugin_blocks_init() {
        let mut registry = Registry::new();
        let mut other = canvas_metadata();
        other.name = "shapes".to_string();
        other.command_range = CommandRange::new(0x0106, 0x0110).unwrap();
        registry.register_plugin(other).unwrap();

        let err = CanvasPlugin::default()
            .init(&mut registry, drawing_bridge())
            .unwrap_err();
        assert_eq!(err.step, "plugin metadata");
        assert_nothing_from_canvas(&registry, 10);
        assert!(registry.plugin("shapes").is_some());
    }

    #[test]
    fn test_shutdown_reverses_init() {
        let mut registry = Registry::new();
        let plugin = CanvasPlugin::new(CanvasConfig {
            component_slot: 3,
            ..CanvasConfig::default()
        });
        plugin.init(&mut registry, drawing_bridge()).unwrap();
        plugin.shutdown(&mut registry);

        assert_nothing_from_canvas(&registry, 3);
        assert!(!registry.has_callback_bridge(3));

        // And can be activated again
        plugin.init(&mut registry, drawing_bridge()).unwrap();
    }
}
